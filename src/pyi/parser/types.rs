//! Type expressions
//!
//! `or` and `and` share one precedence level and associate to the left. A run of
//! operands joined by the same operator becomes a single union or intersection; when
//! the operator changes, the run so far becomes the first operand of the next one.

use super::{ParseResult, Parser};
use crate::pyi::ast::{Literal, Type};
use crate::pyi::builder::Builder;
use crate::pyi::lexer::{Token, TokenKind};

const PRIMARY_STARTS: &[TokenKind] = &[
    TokenKind::Name,
    TokenKind::NamedTuple,
    TokenKind::CollNamedTuple,
    TokenKind::TypedDict,
    TokenKind::LParen,
    TokenKind::Question,
    TokenKind::Nothing,
];

impl<B: Builder> Parser<'_, '_, B> {
    pub(super) fn parse_type(&mut self) -> ParseResult<Type> {
        let start = self.cursor.offset();
        let first = self.primary()?;
        self.type_chain(first, start)
    }

    /// Continue a type expression whose first operand has already been parsed
    pub(super) fn type_chain(&mut self, first: Type, start: usize) -> ParseResult<Type> {
        let mut head = first;
        let mut run = Vec::new();
        let mut operator = None;
        while let Some(next) = self.cursor.at_any(&[TokenKind::Or, TokenKind::And]) {
            if let Some(current) = operator {
                if current != next {
                    head = self.combine(current, head, std::mem::take(&mut run), start)?;
                }
            }
            operator = Some(next);
            self.cursor.bump();
            run.push(self.primary()?);
        }
        match operator {
            Some(current) => self.combine(current, head, run, start),
            None => Ok(head),
        }
    }

    fn combine(
        &mut self,
        operator: TokenKind,
        head: Type,
        rest: Vec<Type>,
        start: usize,
    ) -> ParseResult<Type> {
        let mut members = Vec::with_capacity(rest.len() + 1);
        members.push(head);
        members.extend(rest);
        if operator == TokenKind::Or {
            self.call(start, |b| b.new_union_type(members))
        } else {
            self.call(start, |b| b.new_intersection_type(members))
        }
    }

    fn primary(&mut self) -> ParseResult<Type> {
        self.nested(Self::atom)
    }

    fn atom(&mut self) -> ParseResult<Type> {
        let start = self.cursor.offset();
        match self.cursor.at_any(PRIMARY_STARTS) {
            Some(TokenKind::Name) => {
                let name = self.dotted_name()?;
                if !self.cursor.eat(TokenKind::LBracket) {
                    return self.call(start, |b| b.new_type(&name, None));
                }
                let parameters = self.type_parameters()?;
                self.call(start, |b| b.new_type(&name, Some(parameters)))
            }
            Some(TokenKind::NamedTuple) => self.named_tuple(start),
            Some(TokenKind::CollNamedTuple) => self.coll_named_tuple(start),
            Some(TokenKind::TypedDict) => self.typed_dict(start),
            Some(TokenKind::LParen) => {
                self.cursor.bump();
                let inner = self.parse_type()?;
                self.cursor.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            Some(TokenKind::Question) => {
                self.cursor.bump();
                Ok(self.builder.anything())
            }
            Some(_) => {
                self.cursor.bump();
                Ok(self.builder.nothing())
            }
            None => Err(self.cursor.unexpected()),
        }
    }

    /// `a.b.c`
    pub(super) fn dotted_name(&mut self) -> ParseResult<String> {
        let mut name = self.cursor.expect_name()?;
        while self.cursor.eat(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.cursor.expect_name()?);
        }
        Ok(name)
    }

    /// Parameters after `Name[`, up to and including the closing bracket
    fn type_parameters(&mut self) -> ParseResult<Vec<Type>> {
        if self.cursor.kind() == TokenKind::LParen && self.cursor.nth_kind(1) == TokenKind::RParen
        {
            self.cursor.bump();
            self.cursor.bump();
            self.cursor.expect(TokenKind::RBracket)?;
            return Ok(Vec::new());
        }
        let mut parameters = vec![self.type_parameter()?];
        while self.cursor.eat(TokenKind::Comma) {
            if self.cursor.at(TokenKind::RBracket) {
                break;
            }
            parameters.push(self.type_parameter()?);
        }
        self.cursor.expect(TokenKind::RBracket)?;
        Ok(parameters)
    }

    fn type_parameter(&mut self) -> ParseResult<Type> {
        self.nested(Self::type_argument)
    }

    fn type_argument(&mut self) -> ParseResult<Type> {
        let start = self.cursor.offset();
        match self.cursor.current() {
            (Token::Ellipsis, _) => {
                self.cursor.bump();
                Ok(self.builder.ellipsis())
            }
            (Token::Number(value), _) => {
                self.cursor.bump();
                Ok(Type::Literal(Literal::Number(value)))
            }
            (Token::String(value), _) => {
                self.cursor.bump();
                Ok(Type::Literal(Literal::String(value)))
            }
            (Token::LBracket, _) => {
                self.cursor.bump();
                let elements = self.type_list_until(TokenKind::RBracket)?;
                self.cursor.expect(TokenKind::RBracket)?;
                self.call(start, |b| b.new_type("tuple", Some(elements)))
            }
            _ => self.parse_type(),
        }
    }

    /// Comma-separated types with an optional trailing comma, stopping before `close`
    pub(super) fn type_list_until(&mut self, close: TokenKind) -> ParseResult<Vec<Type>> {
        let mut types = Vec::new();
        if self.cursor.at(close) {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if !self.cursor.eat(TokenKind::Comma) || self.cursor.at(close) {
                break;
            }
        }
        Ok(types)
    }

    /// `NamedTuple('Name', [('field', type), ...])`
    fn named_tuple(&mut self, start: usize) -> ParseResult<Type> {
        self.cursor.expect(TokenKind::NamedTuple)?;
        let name = self.call_head()?;
        self.cursor.expect(TokenKind::LBracket)?;
        let mut fields = Vec::new();
        while !self.cursor.at(TokenKind::RBracket) {
            self.cursor.expect(TokenKind::LParen)?;
            let field = self.cursor.expect_string()?;
            self.cursor.expect(TokenKind::Comma)?;
            let ty = self.parse_type()?;
            self.cursor.eat(TokenKind::Comma);
            self.cursor.expect(TokenKind::RParen)?;
            fields.push((field, ty));
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RBracket)?;
        self.call_tail()?;
        self.call(start, |b| b.new_named_tuple(&name, fields))
    }

    /// `namedtuple('Name', ['field', ...])`; fields are untyped
    fn coll_named_tuple(&mut self, start: usize) -> ParseResult<Type> {
        self.cursor.expect(TokenKind::CollNamedTuple)?;
        let name = self.call_head()?;
        self.cursor.expect(TokenKind::LBracket)?;
        let mut fields = Vec::new();
        while !self.cursor.at(TokenKind::RBracket) {
            let field = self.cursor.expect_string()?;
            fields.push((field, self.builder.anything()));
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RBracket)?;
        self.call_tail()?;
        self.call(start, |b| b.new_named_tuple(&name, fields))
    }

    /// `TypedDict('Name', {'key': type_name, ...}, total=False)`
    fn typed_dict(&mut self, start: usize) -> ParseResult<Type> {
        self.cursor.expect(TokenKind::TypedDict)?;
        let name = self.call_head()?;
        self.cursor.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.cursor.at(TokenKind::RBrace) {
            let key = self.cursor.expect_string()?;
            self.cursor.expect(TokenKind::Colon)?;
            let value_start = self.cursor.offset();
            let value_name = self.cursor.expect_name()?;
            let value = self.call(value_start, |b| b.new_type(&value_name, None))?;
            fields.push((key, value));
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RBrace)?;

        let mut kwarg = None;
        if self.cursor.eat(TokenKind::Comma) && self.cursor.at(TokenKind::Name) {
            let key = self.cursor.expect_name()?;
            self.cursor.expect(TokenKind::Assign)?;
            kwarg = Some((key, self.parse_type()?));
            self.cursor.eat(TokenKind::Comma);
        }
        self.cursor.expect(TokenKind::RParen)?;
        self.call(start, |b| b.new_typed_dict(&name, fields, kwarg))
    }

    /// `'(' STRING ','`, shared by the functional type forms
    fn call_head(&mut self) -> ParseResult<String> {
        self.cursor.expect(TokenKind::LParen)?;
        let name = self.cursor.expect_string()?;
        self.cursor.expect(TokenKind::Comma)?;
        Ok(name)
    }

    /// `','? ')'`
    fn call_tail(&mut self) -> ParseResult<()> {
        self.cursor.eat(TokenKind::Comma);
        self.cursor.expect(TokenKind::RParen)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pyi::ast::{Literal, Number, Type};
    use crate::pyi::config::TargetConfig;
    use crate::pyi::parser::{parse_for_target, ErrorKind, ParseError};

    /// Parse `x: <source>` and return the constant's type
    fn parse_type(source: &str) -> Type {
        let module = parse_for_target(&format!("x: {}\n", source), &TargetConfig::default())
            .unwrap();
        let ty = module.constants().next().unwrap().ty.clone();
        ty
    }

    fn type_err(source: &str) -> ParseError {
        parse_for_target(&format!("x: {}\n", source), &TargetConfig::default()).unwrap_err()
    }

    fn named(name: &str) -> Type {
        Type::named(name)
    }

    fn generic(base: &str, parameters: Vec<Type>) -> Type {
        Type::Generic {
            base: base.to_string(),
            parameters,
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(parse_type("int"), named("int"));
        assert_eq!(parse_type("os.path.PathLike"), named("os.path.PathLike"));
        assert_eq!(parse_type("typing.Any"), Type::Anything);
        assert_eq!(parse_type("?"), Type::Anything);
        assert_eq!(parse_type("nothing"), Type::Nothing);
    }

    #[test]
    fn test_generics() {
        assert_eq!(
            parse_type("Dict[str, List[int]]"),
            generic("Dict", vec![named("str"), generic("List", vec![named("int")])])
        );
        assert_eq!(parse_type("Tuple[()]"), generic("Tuple", vec![]));
        assert_eq!(
            parse_type("Tuple[int, ...]"),
            generic("Tuple", vec![named("int"), Type::Ellipsis])
        );
        assert_eq!(parse_type("List[int,]"), generic("List", vec![named("int")]));
    }

    #[test]
    fn test_bracketed_parameter_list_is_a_tuple() {
        assert_eq!(
            parse_type("Callable[[int, str], None]"),
            generic(
                "Callable",
                vec![generic("tuple", vec![named("int"), named("str")]), named("None")]
            )
        );
        assert_eq!(
            parse_type("Callable[[], None]"),
            generic("Callable", vec![generic("tuple", vec![]), named("None")])
        );
    }

    #[test]
    fn test_literal_parameters() {
        assert_eq!(
            parse_type("Literal[1, 'r']"),
            generic(
                "Literal",
                vec![
                    Type::Literal(Literal::Number(Number::Int(1))),
                    Type::Literal(Literal::String("r".to_string()))
                ]
            )
        );
    }

    #[test]
    fn test_same_operator_runs_are_flattened() {
        assert_eq!(
            parse_type("int or str or None"),
            Type::Union(vec![named("int"), named("str"), named("None")])
        );
        assert_eq!(
            parse_type("A and B and C"),
            Type::Intersection(vec![named("A"), named("B"), named("C")])
        );
    }

    #[test]
    fn test_operator_change_wraps_the_chain() {
        assert_eq!(
            parse_type("A or B and C"),
            Type::Intersection(vec![Type::Union(vec![named("A"), named("B")]), named("C")])
        );
        assert_eq!(
            parse_type("A and B or C or D"),
            Type::Union(vec![
                Type::Intersection(vec![named("A"), named("B")]),
                named("C"),
                named("D")
            ])
        );
    }

    #[test]
    fn test_parenthesized_operands_are_not_merged() {
        assert_eq!(
            parse_type("(A or B) or C"),
            Type::Union(vec![Type::Union(vec![named("A"), named("B")]), named("C")])
        );
        assert_eq!(parse_type("(int)"), named("int"));
    }

    #[test]
    fn test_named_tuples() {
        assert_eq!(
            parse_type("NamedTuple('P', [('x', int), ('y', str),])"),
            Type::NamedTuple {
                name: "P".to_string(),
                fields: vec![("x".to_string(), named("int")), ("y".to_string(), named("str"))]
            }
        );
        assert_eq!(
            parse_type("namedtuple('Q', ['a', 'b'])"),
            Type::NamedTuple {
                name: "Q".to_string(),
                fields: vec![
                    ("a".to_string(), Type::Anything),
                    ("b".to_string(), Type::Anything)
                ]
            }
        );
        assert_eq!(
            parse_type("NamedTuple('E', [])"),
            Type::NamedTuple {
                name: "E".to_string(),
                fields: vec![]
            }
        );
    }

    #[test]
    fn test_typed_dicts() {
        assert_eq!(
            parse_type("TypedDict('D', {'a': int, 'b': str}, total=False)"),
            Type::TypedDict {
                name: "D".to_string(),
                fields: vec![("a".to_string(), named("int")), ("b".to_string(), named("str"))],
                total: false
            }
        );
        assert_eq!(
            parse_type("TypedDict('D', {},)"),
            Type::TypedDict {
                name: "D".to_string(),
                fields: vec![],
                total: true
            }
        );
    }

    #[test]
    fn test_duplicate_fields_are_build_errors() {
        let error = type_err("NamedTuple('P', [('x', int), ('x', str)])");
        assert_eq!(error.kind, ErrorKind::Build);
        assert_eq!((error.line, error.column), (1, 4));
    }

    #[test]
    fn test_incomplete_types() {
        let error = type_err("List[int");
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.line, 1);
        assert_eq!(type_err("int or").kind, ErrorKind::Syntax);
    }
}
