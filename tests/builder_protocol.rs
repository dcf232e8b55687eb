//! The parser/builder protocol, observed through a recording builder

use pyi::pyi::ast::{
    AliasValue, BodyStmt, Condition, Definition, ImportItem, Module, Param, Parent, Position,
    Type,
};
use pyi::pyi::builder::{BuildError, BuildResult, Builder, ConstantValue, StubBuilder, TypeVarArg};
use pyi::pyi::parser::{parse_with, ErrorKind};

/// Delegates to [`StubBuilder`] and logs every callback
#[derive(Default)]
struct RecordingBuilder {
    inner: StubBuilder,
    events: Vec<String>,
    fail_on_constant: Option<&'static str>,
    error_location: Option<Position>,
}

impl RecordingBuilder {
    fn failing_on(name: &'static str) -> Self {
        Self {
            fail_on_constant: Some(name),
            ..Self::default()
        }
    }
}

impl Builder for RecordingBuilder {
    fn new_type(&mut self, name: &str, parameters: Option<Vec<Type>>) -> BuildResult<Type> {
        let count = parameters.as_ref().map(|p| p.len());
        self.events.push(format!("new_type {} {:?}", name, count));
        self.inner.new_type(name, parameters)
    }

    fn new_union_type(&mut self, members: Vec<Type>) -> BuildResult<Type> {
        self.events.push(format!("union {}", members.len()));
        self.inner.new_union_type(members)
    }

    fn new_intersection_type(&mut self, members: Vec<Type>) -> BuildResult<Type> {
        self.events.push(format!("intersection {}", members.len()));
        self.inner.new_intersection_type(members)
    }

    fn new_named_tuple(&mut self, name: &str, fields: Vec<(String, Type)>) -> BuildResult<Type> {
        self.events.push(format!("named_tuple {}", name));
        self.inner.new_named_tuple(name, fields)
    }

    fn new_typed_dict(
        &mut self,
        name: &str,
        fields: Vec<(String, Type)>,
        kwarg: Option<(String, Type)>,
    ) -> BuildResult<Type> {
        self.events.push(format!("typed_dict {}", name));
        self.inner.new_typed_dict(name, fields, kwarg)
    }

    fn new_class(
        &mut self,
        decorators: Vec<String>,
        name: &str,
        bases: Vec<Parent>,
        members: Vec<Definition>,
    ) -> BuildResult<Definition> {
        self.events.push(format!("class {}", name));
        self.inner.new_class(decorators, name, bases, members)
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
        self.events.push(format!("function {}", name));
        self.inner
            .new_function(decorators, is_async, name, params, return_type, body)
    }

    fn new_constant(&mut self, name: &str, value: ConstantValue) -> BuildResult<Definition> {
        self.events.push(format!("constant {}", name));
        if self.fail_on_constant == Some(name) {
            return Err(BuildError::Custom(format!("refusing {}", name)));
        }
        self.inner.new_constant(name, value)
    }

    fn add_import(&mut self, from: Option<String>, items: Vec<ImportItem>) -> BuildResult<()> {
        self.events.push(format!("import {:?}", from));
        self.inner.add_import(from, items)
    }

    fn add_type_var(
        &mut self,
        name: &str,
        param_name: &str,
        constraints: Vec<Type>,
        kwargs: Vec<(String, TypeVarArg)>,
    ) -> BuildResult<()> {
        self.events.push(format!("type_var {}", name));
        self.inner.add_type_var(name, param_name, constraints, kwargs)
    }

    fn register_class_name(&mut self, name: &str) -> BuildResult<()> {
        self.events.push(format!("register {}", name));
        self.inner.register_class_name(name)
    }

    fn add_alias_or_constant(&mut self, name: &str, value: AliasValue) -> BuildResult<()> {
        self.events.push(format!("add_alias {}", name));
        self.inner.add_alias_or_constant(name, value)
    }

    fn new_alias_or_constant(
        &mut self,
        name: &str,
        value: AliasValue,
    ) -> BuildResult<Definition> {
        self.events.push(format!("new_alias {}", name));
        self.inner.new_alias_or_constant(name, value)
    }

    fn if_begin(&mut self, condition: Condition) -> BuildResult<()> {
        self.events.push(format!("if_begin {}", condition));
        self.inner.if_begin(condition)
    }

    fn if_elif(&mut self, condition: Condition) -> BuildResult<()> {
        self.events.push(format!("if_elif {}", condition));
        self.inner.if_elif(condition)
    }

    fn if_else(&mut self) -> BuildResult<()> {
        self.events.push("if_else".to_string());
        self.inner.if_else()
    }

    fn if_end(&mut self, branches: Vec<Vec<Definition>>) -> BuildResult<Vec<Definition>> {
        let sizes: Vec<usize> = branches.iter().map(|b| b.len()).collect();
        self.events.push(format!("if_end {:?}", sizes));
        self.inner.if_end(branches)
    }

    fn build_module(&mut self, definitions: Vec<Definition>) -> BuildResult<Module> {
        self.events.push(format!("build_module {}", definitions.len()));
        self.inner.build_module(definitions)
    }

    fn set_error_location(&mut self, location: Position) {
        self.error_location = Some(location);
    }
}

/// Always splices the last branch, whatever the conditions say
#[derive(Default)]
struct LastBranchBuilder {
    inner: StubBuilder,
}

impl Builder for LastBranchBuilder {
    fn new_type(&mut self, name: &str, parameters: Option<Vec<Type>>) -> BuildResult<Type> {
        self.inner.new_type(name, parameters)
    }
    fn new_union_type(&mut self, members: Vec<Type>) -> BuildResult<Type> {
        self.inner.new_union_type(members)
    }
    fn new_intersection_type(&mut self, members: Vec<Type>) -> BuildResult<Type> {
        self.inner.new_intersection_type(members)
    }
    fn new_named_tuple(&mut self, name: &str, fields: Vec<(String, Type)>) -> BuildResult<Type> {
        self.inner.new_named_tuple(name, fields)
    }
    fn new_typed_dict(
        &mut self,
        name: &str,
        fields: Vec<(String, Type)>,
        kwarg: Option<(String, Type)>,
    ) -> BuildResult<Type> {
        self.inner.new_typed_dict(name, fields, kwarg)
    }
    fn new_class(
        &mut self,
        decorators: Vec<String>,
        name: &str,
        bases: Vec<Parent>,
        members: Vec<Definition>,
    ) -> BuildResult<Definition> {
        self.inner.new_class(decorators, name, bases, members)
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
        self.inner
            .new_function(decorators, is_async, name, params, return_type, body)
    }
    fn new_constant(&mut self, name: &str, value: ConstantValue) -> BuildResult<Definition> {
        self.inner.new_constant(name, value)
    }
    fn add_import(&mut self, from: Option<String>, items: Vec<ImportItem>) -> BuildResult<()> {
        self.inner.add_import(from, items)
    }
    fn add_type_var(
        &mut self,
        name: &str,
        param_name: &str,
        constraints: Vec<Type>,
        kwargs: Vec<(String, TypeVarArg)>,
    ) -> BuildResult<()> {
        self.inner.add_type_var(name, param_name, constraints, kwargs)
    }
    fn register_class_name(&mut self, name: &str) -> BuildResult<()> {
        self.inner.register_class_name(name)
    }
    fn add_alias_or_constant(&mut self, name: &str, value: AliasValue) -> BuildResult<()> {
        self.inner.add_alias_or_constant(name, value)
    }
    fn new_alias_or_constant(
        &mut self,
        name: &str,
        value: AliasValue,
    ) -> BuildResult<Definition> {
        self.inner.new_alias_or_constant(name, value)
    }
    fn if_begin(&mut self, _condition: Condition) -> BuildResult<()> {
        Ok(())
    }
    fn if_elif(&mut self, _condition: Condition) -> BuildResult<()> {
        Ok(())
    }
    fn if_else(&mut self) -> BuildResult<()> {
        Ok(())
    }
    fn if_end(&mut self, branches: Vec<Vec<Definition>>) -> BuildResult<Vec<Definition>> {
        Ok(branches.into_iter().last().unwrap_or_default())
    }
    fn build_module(&mut self, definitions: Vec<Definition>) -> BuildResult<Module> {
        self.inner.build_module(definitions)
    }
}

fn record(source: &str) -> Vec<String> {
    let mut builder = RecordingBuilder::default();
    parse_with(source, &mut builder).unwrap();
    builder.events
}

#[test]
fn test_class_name_is_registered_before_parents() {
    assert_eq!(
        record("class A(B):\n    x: int\n"),
        vec![
            "register A",
            "new_type B None",
            "new_type int None",
            "constant x",
            "class A",
            "build_module 1",
        ]
    );
}

#[test]
fn test_if_callbacks_bracket_each_branch() {
    let events = record(
        "if sys.version_info >= (3,):\n  x: int\nelif sys.platform == 'linux':\n  y: str\nelse:\n  z: int\n",
    );
    assert_eq!(
        events,
        vec![
            "if_begin sys.version_info >= (3,)",
            "new_type int None",
            "constant x",
            "if_elif sys.platform == \"linux\"",
            "new_type str None",
            "constant y",
            "if_else",
            "new_type int None",
            "constant z",
            "if_end [1, 1, 1]",
            "build_module 1",
        ]
    );
}

#[test]
fn test_same_operator_runs_make_one_call() {
    let events = record("x: int or str or None\n");
    assert_eq!(events.iter().filter(|e| e.starts_with("union")).count(), 1);
    assert!(events.contains(&"union 3".to_string()));

    let events = record("x: A or B and C\n");
    let combined: Vec<&String> = events
        .iter()
        .filter(|e| e.starts_with("union") || e.starts_with("intersection"))
        .collect();
    assert_eq!(combined, vec!["union 2", "intersection 2"]);
}

#[test]
fn test_module_side_effects_are_not_definitions() {
    let events = record("import os\nT = TypeVar('T')\nX = int\n");
    assert_eq!(
        events,
        vec![
            "import None",
            "type_var T",
            "new_type int None",
            "add_alias X",
            "build_module 0",
        ]
    );
}

#[test]
fn test_class_aliases_become_members() {
    let events = record("class A:\n    X = int\n");
    assert!(events.contains(&"new_alias X".to_string()));
    assert!(!events.iter().any(|e| e.starts_with("add_alias")));
}

#[test]
fn test_if_end_result_is_spliced_in_place() {
    let mut builder = LastBranchBuilder::default();
    let source = "a: int\nif sys.version_info >= (3,):\n  b: int\nelse:\n  c: int\n  d: int\ne: int\n";
    let module = parse_with(source, &mut builder).unwrap();
    let names: Vec<&str> = module.definitions.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["a", "c", "d", "e"]);
}

#[test]
fn test_failing_callback_stops_the_parse() {
    let mut builder = RecordingBuilder::failing_on("bad");
    let error = parse_with("ok: int\n\nbad: int\nlater: int\n", &mut builder).unwrap_err();

    assert_eq!(error.kind, ErrorKind::Build);
    assert_eq!(error.message, "refusing bad");
    assert_eq!((error.line, error.column), (3, 1));
    assert_eq!(builder.error_location, Some(Position::new(2, 0)));
    assert_eq!(builder.events.last().map(String::as_str), Some("constant bad"));
    assert!(!builder.events.iter().any(|e| e.contains("later")));
}

#[test]
fn test_function_errors_are_located_at_def() {
    let mut builder = RecordingBuilder::default();
    let error = parse_with("@overload\ndef f(a, a) -> None: ...\n", &mut builder).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Build);
    assert_eq!(error.message, "Duplicate parameter name \"a\" in function f");
    assert_eq!(builder.error_location, Some(Position::new(1, 0)));
}
