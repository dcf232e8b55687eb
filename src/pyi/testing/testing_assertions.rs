//! Fluent assertion API for parsed modules

use super::testing_matchers::StubMatch;
use crate::pyi::ast::{
    Alias, ClassDef, Constant, Definition, FuncDef, Module, Param, ParamKind, TypeVarDef,
};

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for a module
pub fn assert_module(module: &Module) -> ModuleAssertion<'_> {
    ModuleAssertion { module }
}

fn summarize(definitions: &[Definition]) -> String {
    definitions
        .iter()
        .map(|d| format!("{} {}", node_kind(d), d.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn node_kind(definition: &Definition) -> &'static str {
    match definition {
        Definition::Constant(_) => "Constant",
        Definition::Alias(_) => "Alias",
        Definition::Function(_) => "Function",
        Definition::Class(_) => "Class",
    }
}

fn names(definitions: &[Definition]) -> Vec<&str> {
    definitions.iter().map(|d| d.name()).collect()
}

// ============================================================================
// Module Assertions
// ============================================================================

pub struct ModuleAssertion<'a> {
    module: &'a Module,
}

impl<'a> ModuleAssertion<'a> {
    /// Assert the number of top-level definitions
    pub fn definition_count(self, expected: usize) -> Self {
        let actual = self.module.definitions.len();
        assert_eq!(
            actual,
            expected,
            "Expected {} definitions, found {}: [{}]",
            expected,
            actual,
            summarize(&self.module.definitions)
        );
        self
    }

    /// Assert the names of the top-level definitions, in order
    pub fn definition_names(self, expected: &[&str]) -> Self {
        assert_eq!(
            names(&self.module.definitions),
            expected,
            "Unexpected top-level definitions"
        );
        self
    }

    /// Assert on a definition by index
    pub fn definition<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(DefinitionAssertion<'a>),
    {
        assert!(
            index < self.module.definitions.len(),
            "Definition index {} out of bounds (module has {} definitions)",
            index,
            self.module.definitions.len()
        );
        assertion(DefinitionAssertion {
            definition: &self.module.definitions[index],
            context: format!("definitions[{}]", index),
        });
        self
    }

    /// Assert on the first top-level definition called `name`
    pub fn named<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(DefinitionAssertion<'a>),
    {
        let definition = self.module.find(name).unwrap_or_else(|| {
            panic!(
                "No definition named '{}' in module: [{}]",
                name,
                summarize(&self.module.definitions)
            )
        });
        assertion(DefinitionAssertion {
            definition,
            context: name.to_string(),
        });
        self
    }

    pub fn alias<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(AliasAssertion<'a>),
    {
        let alias = self
            .module
            .find_alias(name)
            .unwrap_or_else(|| panic!("No alias named '{}'", name));
        assertion(AliasAssertion {
            alias,
            context: format!("alias {}", name),
        });
        self
    }

    pub fn alias_count(self, expected: usize) -> Self {
        assert_eq!(
            self.module.aliases.len(),
            expected,
            "Expected {} aliases",
            expected
        );
        self
    }

    pub fn import_count(self, expected: usize) -> Self {
        assert_eq!(
            self.module.imports.len(),
            expected,
            "Expected {} imports",
            expected
        );
        self
    }

    /// Assert the package of each import statement; `None` for plain `import`
    pub fn import_sources(self, expected: &[Option<&str>]) -> Self {
        let actual: Vec<Option<&str>> = self
            .module
            .imports
            .iter()
            .map(|import| import.from.as_deref())
            .collect();
        assert_eq!(actual, expected, "Unexpected import sources");
        self
    }

    pub fn type_var<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(TypeVarAssertion<'a>),
    {
        let type_var = self
            .module
            .type_vars
            .iter()
            .find(|tv| tv.name == name)
            .unwrap_or_else(|| panic!("No TypeVar named '{}'", name));
        assertion(TypeVarAssertion {
            type_var,
            context: format!("TypeVar {}", name),
        });
        self
    }
}

// ============================================================================
// Definition Assertions
// ============================================================================

pub struct DefinitionAssertion<'a> {
    definition: &'a Definition,
    context: String,
}

impl<'a> DefinitionAssertion<'a> {
    pub fn assert_constant(self) -> ConstantAssertion<'a> {
        match self.definition {
            Definition::Constant(constant) => ConstantAssertion {
                constant,
                context: self.context,
            },
            other => panic!(
                "{}: Expected Constant, found {} '{}'",
                self.context,
                node_kind(other),
                other.name()
            ),
        }
    }

    pub fn assert_alias(self) -> AliasAssertion<'a> {
        match self.definition {
            Definition::Alias(alias) => AliasAssertion {
                alias,
                context: self.context,
            },
            other => panic!(
                "{}: Expected Alias, found {} '{}'",
                self.context,
                node_kind(other),
                other.name()
            ),
        }
    }

    pub fn assert_function(self) -> FunctionAssertion<'a> {
        match self.definition {
            Definition::Function(function) => FunctionAssertion {
                function,
                context: self.context,
            },
            other => panic!(
                "{}: Expected Function, found {} '{}'",
                self.context,
                node_kind(other),
                other.name()
            ),
        }
    }

    pub fn assert_class(self) -> ClassAssertion<'a> {
        match self.definition {
            Definition::Class(class) => ClassAssertion {
                class,
                context: self.context,
            },
            other => panic!(
                "{}: Expected Class, found {} '{}'",
                self.context,
                node_kind(other),
                other.name()
            ),
        }
    }

    /// Check if this definition is a function (non-panicking)
    pub fn is_function(&self) -> bool {
        matches!(self.definition, Definition::Function(_))
    }

    /// Check if this definition is a class (non-panicking)
    pub fn is_class(&self) -> bool {
        matches!(self.definition, Definition::Class(_))
    }
}

// ============================================================================
// Constant and Alias Assertions
// ============================================================================

pub struct ConstantAssertion<'a> {
    constant: &'a Constant,
    context: String,
}

impl<'a> ConstantAssertion<'a> {
    pub fn name(self, expected: &str) -> Self {
        StubMatch::Name(expected.to_string()).check(&self.constant.name, &self.context);
        self
    }

    /// Assert the rendered type
    pub fn type_str(self, expected: &str) -> Self {
        StubMatch::Type(expected.to_string()).check(&self.constant.ty.to_string(), &self.context);
        self
    }
}

pub struct AliasAssertion<'a> {
    alias: &'a Alias,
    context: String,
}

impl<'a> AliasAssertion<'a> {
    /// Assert the rendered value
    pub fn value_str(self, expected: &str) -> Self {
        StubMatch::Type(expected.to_string()).check(&self.alias.value.to_string(), &self.context);
        self
    }
}

// ============================================================================
// Function Assertions
// ============================================================================

pub struct FunctionAssertion<'a> {
    function: &'a FuncDef,
    context: String,
}

impl<'a> FunctionAssertion<'a> {
    pub fn is_async(self, expected: bool) -> Self {
        assert_eq!(
            self.function.is_async, expected,
            "{}: Expected is_async = {}",
            self.context, expected
        );
        self
    }

    pub fn decorators(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.function.decorators, expected,
            "{}: Unexpected decorators",
            self.context
        );
        self
    }

    pub fn param_count(self, expected: usize) -> Self {
        let actual = self.function.params.len();
        assert_eq!(
            actual, expected,
            "{}: Expected {} params, found {} ({})",
            self.context,
            expected,
            actual,
            self.signature()
        );
        self
    }

    /// Assert the parameter names as written, stars included
    pub fn param_names(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.function.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(actual, expected, "{}: Unexpected parameter names", self.context);
        self
    }

    pub fn param<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ParamAssertion<'a>),
    {
        let param = self.function.params.get(index).unwrap_or_else(|| {
            panic!(
                "{}: Param index {} out of bounds ({})",
                self.context,
                index,
                self.signature()
            )
        });
        assertion(ParamAssertion {
            param,
            context: format!("{}.params[{}]", self.context, index),
        });
        self
    }

    pub fn return_type(self, expected: &str) -> Self {
        StubMatch::Type(expected.to_string()).check(
            &self.function.return_type.to_string(),
            &format!("{} return type", self.context),
        );
        self
    }

    /// Assert the full rendered signature, e.g. `f(x: int) -> str`
    pub fn signature_contains(self, substring: &str) -> Self {
        StubMatch::InSignature(substring.to_string()).check(&self.signature(), &self.context);
        self
    }

    pub fn body_len(self, expected: usize) -> Self {
        assert_eq!(
            self.function.body.len(),
            expected,
            "{}: Expected {} body statements",
            self.context,
            expected
        );
        self
    }

    fn signature(&self) -> String {
        let params: Vec<String> = self.function.params.iter().map(|p| p.to_string()).collect();
        format!(
            "{}({}) -> {}",
            self.function.name,
            params.join(", "),
            self.function.return_type
        )
    }
}

pub struct ParamAssertion<'a> {
    param: &'a Param,
    context: String,
}

impl<'a> ParamAssertion<'a> {
    pub fn name(self, expected: &str) -> Self {
        StubMatch::Name(expected.to_string()).check(&self.param.name, &self.context);
        self
    }

    pub fn kind(self, expected: ParamKind) -> Self {
        assert_eq!(
            self.param.kind, expected,
            "{}: Unexpected parameter kind",
            self.context
        );
        self
    }

    pub fn type_str(self, expected: &str) -> Self {
        StubMatch::Type(expected.to_string()).check(&self.param.ty.to_string(), &self.context);
        self
    }

    /// Assert the rendered default; `None` asserts there is no default
    pub fn default(self, expected: Option<&str>) -> Self {
        let actual = self.param.default.as_ref().map(|d| d.to_string());
        assert_eq!(
            actual.as_deref(),
            expected,
            "{}: Unexpected default value",
            self.context
        );
        self
    }
}

// ============================================================================
// Class Assertions
// ============================================================================

pub struct ClassAssertion<'a> {
    class: &'a ClassDef,
    context: String,
}

impl<'a> ClassAssertion<'a> {
    /// Assert the rendered bases, keywords included (`metaclass=M`)
    pub fn bases(self, expected: &[&str]) -> Self {
        let actual: Vec<String> = self.class.bases.iter().map(|b| b.to_string()).collect();
        assert_eq!(actual, expected, "{}: Unexpected bases", self.context);
        self
    }

    pub fn decorators(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.class.decorators, expected,
            "{}: Unexpected decorators",
            self.context
        );
        self
    }

    pub fn member_count(self, expected: usize) -> Self {
        let actual = self.class.members.len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} members, found {}: [{}]",
            self.context,
            expected,
            actual,
            summarize(&self.class.members)
        );
        self
    }

    pub fn member_names(self, expected: &[&str]) -> Self {
        assert_eq!(
            names(&self.class.members),
            expected,
            "{}: Unexpected members",
            self.context
        );
        self
    }

    pub fn member<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(DefinitionAssertion<'a>),
    {
        let definition = self.class.find(name).unwrap_or_else(|| {
            panic!(
                "{}: No member named '{}': [{}]",
                self.context,
                name,
                summarize(&self.class.members)
            )
        });
        assertion(DefinitionAssertion {
            definition,
            context: format!("{}.{}", self.context, name),
        });
        self
    }
}

// ============================================================================
// TypeVar Assertions
// ============================================================================

pub struct TypeVarAssertion<'a> {
    type_var: &'a TypeVarDef,
    context: String,
}

impl<'a> TypeVarAssertion<'a> {
    pub fn constraints(self, expected: &[&str]) -> Self {
        let actual: Vec<String> = self
            .type_var
            .constraints
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(actual, expected, "{}: Unexpected constraints", self.context);
        self
    }

    pub fn bound(self, expected: Option<&str>) -> Self {
        let actual = self.type_var.bound.as_ref().map(|b| b.to_string());
        assert_eq!(actual.as_deref(), expected, "{}: Unexpected bound", self.context);
        self
    }

    pub fn variance(self, covariant: bool, contravariant: bool) -> Self {
        assert_eq!(
            (self.type_var.covariant, self.type_var.contravariant),
            (covariant, contravariant),
            "{}: Unexpected variance (covariant, contravariant)",
            self.context
        );
        self
    }
}
