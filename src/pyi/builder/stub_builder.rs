//! Default builder
//!
//! Builds [`Module`] values, resolves `if` blocks against a [`TargetConfig`] and checks
//! the few invariants the grammar cannot express (TypeVar naming, duplicate fields,
//! keyword arguments, parameter names).

use std::collections::HashSet;

use log::debug;

use super::conditions::ConditionEvaluator;
use super::{BuildError, BuildResult, Builder, ConstantValue, TypeVarArg};
use crate::pyi::ast::{
    Alias, AliasValue, BodyStmt, ClassDef, Condition, Constant, Definition, FuncDef, Import,
    ImportItem, Module, Number, Param, ParamKind, Parent, Position, Type, TypeVarDef,
};
use crate::pyi::config::TargetConfig;

/// State of one `if` chain
#[derive(Debug)]
struct ConditionScope {
    /// Whether the enclosing code is live at all
    parent_active: bool,
    /// Index of the branch currently being parsed
    branch: usize,
    /// Branch picked so far
    selected: Option<usize>,
}

impl ConditionScope {
    fn active(&self) -> bool {
        self.selected == Some(self.branch)
    }
}

pub struct StubBuilder {
    version: Vec<i64>,
    platform: String,
    scopes: Vec<ConditionScope>,
    class_names: Vec<String>,
    aliases: Vec<Alias>,
    imports: Vec<Import>,
    type_vars: Vec<TypeVarDef>,
    /// `x = True` / `x = False` at module level
    bool_constants: Vec<Definition>,
    error_location: Option<Position>,
}

impl StubBuilder {
    pub fn new(target: &TargetConfig) -> Self {
        Self {
            version: target.version(),
            platform: target.platform.clone(),
            scopes: Vec::new(),
            class_names: Vec::new(),
            aliases: Vec::new(),
            imports: Vec::new(),
            type_vars: Vec::new(),
            bool_constants: Vec::new(),
            error_location: None,
        }
    }

    /// Whether definitions seen right now end up in the module
    fn active(&self) -> bool {
        self.scopes.last().map_or(true, ConditionScope::active)
    }

    fn evaluate(&self, condition: &Condition) -> BuildResult<bool> {
        ConditionEvaluator::new(&self.version, &self.platform).eval(condition)
    }

    /// Class names registered so far, in source order
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Where the last failing production started, if any
    pub fn error_location(&self) -> Option<Position> {
        self.error_location
    }
}

impl Default for StubBuilder {
    fn default() -> Self {
        Self::new(&TargetConfig::default())
    }
}

fn alias_to_definition(name: &str, value: AliasValue) -> Definition {
    if bool_literal(&value) {
        Definition::Constant(Constant {
            name: name.to_string(),
            ty: Type::named("bool"),
        })
    } else {
        Definition::Alias(Alias {
            name: name.to_string(),
            value,
        })
    }
}

fn bool_literal(value: &AliasValue) -> bool {
    matches!(value, AliasValue::Type(Type::Named(name)) if name == "True" || name == "False")
}

fn check_unique_fields(name: &str, fields: &[(String, Type)]) -> BuildResult<()> {
    let mut seen = HashSet::new();
    for (field, _) in fields {
        if !seen.insert(field.as_str()) {
            return Err(BuildError::DuplicateField {
                name: name.to_string(),
                field: field.clone(),
            });
        }
    }
    Ok(())
}

fn is_true(ty: &Type) -> bool {
    matches!(ty, Type::Named(name) if name == "True")
}

impl Builder for StubBuilder {
    fn new_type(&mut self, name: &str, parameters: Option<Vec<Type>>) -> BuildResult<Type> {
        Ok(match parameters {
            None if name == "Any" || name == "typing.Any" => Type::Anything,
            None => Type::named(name),
            Some(parameters) => Type::Generic {
                base: name.to_string(),
                parameters,
            },
        })
    }

    fn new_union_type(&mut self, members: Vec<Type>) -> BuildResult<Type> {
        Ok(Type::Union(members))
    }

    fn new_intersection_type(&mut self, members: Vec<Type>) -> BuildResult<Type> {
        Ok(Type::Intersection(members))
    }

    fn new_named_tuple(&mut self, name: &str, fields: Vec<(String, Type)>) -> BuildResult<Type> {
        check_unique_fields(name, &fields)?;
        Ok(Type::NamedTuple {
            name: name.to_string(),
            fields,
        })
    }

    fn new_typed_dict(
        &mut self,
        name: &str,
        fields: Vec<(String, Type)>,
        kwarg: Option<(String, Type)>,
    ) -> BuildResult<Type> {
        check_unique_fields(name, &fields)?;
        let total = match kwarg {
            None => true,
            Some((key, _)) if key != "total" => {
                return Err(BuildError::InvalidTypedDictArgument(key));
            }
            Some((_, Type::Named(value))) if value == "True" || value == "False" => {
                value == "True"
            }
            Some((_, value)) => return Err(BuildError::InvalidTotal(value.to_string())),
        };
        Ok(Type::TypedDict {
            name: name.to_string(),
            fields,
            total,
        })
    }

    fn new_class(
        &mut self,
        decorators: Vec<String>,
        name: &str,
        bases: Vec<Parent>,
        members: Vec<Definition>,
    ) -> BuildResult<Definition> {
        let mut keywords = HashSet::new();
        for base in &bases {
            if let Parent::Keyword { name: keyword, .. } = base {
                if keyword != "metaclass" && keyword != "total" {
                    return Err(BuildError::InvalidClassKeyword(keyword.clone()));
                }
                if !keywords.insert(keyword.as_str()) {
                    return Err(BuildError::DuplicateClassKeyword(keyword.clone()));
                }
            }
        }
        debug!("class {} with {} members", name, members.len());
        Ok(Definition::Class(ClassDef {
            decorators,
            name: name.to_string(),
            bases,
            members,
        }))
    }

    fn new_function(
        &mut self,
        decorators: Vec<String>,
        is_async: bool,
        name: &str,
        params: Vec<Param>,
        return_type: Type,
        body: Vec<BodyStmt>,
    ) -> BuildResult<Definition> {
        let mut seen = HashSet::new();
        for param in &params {
            if matches!(
                param.kind,
                ParamKind::KeywordOnlyMarker | ParamKind::Ellipsis
            ) {
                continue;
            }
            if !seen.insert(param.bare_name()) {
                return Err(BuildError::DuplicateParameter {
                    function: name.to_string(),
                    name: param.bare_name().to_string(),
                });
            }
        }
        Ok(Definition::Function(FuncDef {
            decorators,
            is_async,
            name: name.to_string(),
            params,
            return_type,
            body,
        }))
    }

    fn new_constant(&mut self, name: &str, value: ConstantValue) -> BuildResult<Definition> {
        let ty = match value {
            ConstantValue::Type(ty) => ty,
            ConstantValue::Number(Number::Int(_)) => Type::named("int"),
            ConstantValue::Number(Number::Float(_)) => Type::named("float"),
            ConstantValue::String(_) => Type::named("str"),
        };
        Ok(Definition::Constant(Constant {
            name: name.to_string(),
            ty,
        }))
    }

    fn add_import(&mut self, from: Option<String>, items: Vec<ImportItem>) -> BuildResult<()> {
        if self.active() {
            self.imports.push(Import { from, items });
        }
        Ok(())
    }

    fn add_type_var(
        &mut self,
        name: &str,
        param_name: &str,
        constraints: Vec<Type>,
        kwargs: Vec<(String, TypeVarArg)>,
    ) -> BuildResult<()> {
        if !self.active() {
            return Ok(());
        }
        if name != param_name {
            return Err(BuildError::TypeVarNameMismatch {
                expected: name.to_string(),
                found: param_name.to_string(),
            });
        }
        if self.type_vars.iter().any(|tv| tv.name == name) {
            return Err(BuildError::DuplicateTypeVar(name.to_string()));
        }

        let mut type_var = TypeVarDef {
            name: name.to_string(),
            constraints,
            bound: None,
            covariant: false,
            contravariant: false,
        };
        for (key, value) in kwargs {
            let ty = match value {
                TypeVarArg::Type(ty) => ty,
                TypeVarArg::String(forward_ref) => Type::named(forward_ref),
            };
            match key.as_str() {
                "bound" => type_var.bound = Some(ty),
                "covariant" => type_var.covariant = is_true(&ty),
                "contravariant" => type_var.contravariant = is_true(&ty),
                _ => return Err(BuildError::InvalidTypeVarArgument(key)),
            }
        }
        self.type_vars.push(type_var);
        Ok(())
    }

    fn register_class_name(&mut self, name: &str) -> BuildResult<()> {
        if self.active() {
            self.class_names.push(name.to_string());
        }
        Ok(())
    }

    fn add_alias_or_constant(&mut self, name: &str, value: AliasValue) -> BuildResult<()> {
        if !self.active() {
            return Ok(());
        }
        match alias_to_definition(name, value) {
            Definition::Alias(alias) => self.aliases.push(alias),
            constant => self.bool_constants.push(constant),
        }
        Ok(())
    }

    fn new_alias_or_constant(
        &mut self,
        name: &str,
        value: AliasValue,
    ) -> BuildResult<Definition> {
        Ok(alias_to_definition(name, value))
    }

    fn if_begin(&mut self, condition: Condition) -> BuildResult<()> {
        let parent_active = self.active();
        let selected = if parent_active && self.evaluate(&condition)? {
            Some(0)
        } else {
            None
        };
        debug!("if {} -> {:?}", condition, selected);
        self.scopes.push(ConditionScope {
            parent_active,
            branch: 0,
            selected,
        });
        Ok(())
    }

    fn if_elif(&mut self, condition: Condition) -> BuildResult<()> {
        let needs_eval = self
            .scopes
            .last()
            .is_some_and(|scope| scope.parent_active && scope.selected.is_none());
        let value = needs_eval && self.evaluate(&condition)?;
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| BuildError::Custom("elif without if".to_string()))?;
        scope.branch += 1;
        if value {
            scope.selected = Some(scope.branch);
        }
        Ok(())
    }

    fn if_else(&mut self) -> BuildResult<()> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| BuildError::Custom("else without if".to_string()))?;
        scope.branch += 1;
        if scope.parent_active && scope.selected.is_none() {
            scope.selected = Some(scope.branch);
        }
        Ok(())
    }

    fn if_end(&mut self, branches: Vec<Vec<Definition>>) -> BuildResult<Vec<Definition>> {
        let scope = self
            .scopes
            .pop()
            .ok_or_else(|| BuildError::Custom("if_end without if".to_string()))?;
        Ok(scope
            .selected
            .and_then(|index| branches.into_iter().nth(index))
            .unwrap_or_default())
    }

    fn build_module(&mut self, mut definitions: Vec<Definition>) -> BuildResult<Module> {
        definitions.append(&mut self.bool_constants);
        Ok(Module {
            definitions,
            aliases: std::mem::take(&mut self.aliases),
            imports: std::mem::take(&mut self.imports),
            type_vars: std::mem::take(&mut self.type_vars),
        })
    }

    fn set_error_location(&mut self, location: Position) {
        self.error_location = Some(location);
    }
}
