//! Statement grammar
//!
//! Module and class bodies are parsed by the same loop; [`Scope`] decides which
//! statements may start there and where aliases and type variables are allowed.

use log::{debug, trace};

use super::condition::parse_condition;
use super::{ParseResult, Parser, MAX_DEPTH};
use crate::pyi::ast::{
    AliasValue, BodyStmt, Condition, Definition, ImportItem, Module, Param, ParamDefault,
    ParamKind, Parent, Type,
};
use crate::pyi::builder::{Builder, ConstantValue, TypeVarArg};
use crate::pyi::lexer::{Token, TokenKind};

const MODULE_STARTS: &[TokenKind] = &[
    TokenKind::Name,
    TokenKind::At,
    TokenKind::Async,
    TokenKind::Def,
    TokenKind::Class,
    TokenKind::If,
    TokenKind::Import,
    TokenKind::From,
    TokenKind::TypedDict,
];

const CLASS_STARTS: &[TokenKind] = &[
    TokenKind::Name,
    TokenKind::At,
    TokenKind::Async,
    TokenKind::Def,
    TokenKind::Class,
    TokenKind::If,
    TokenKind::TypedDict,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Module,
    Class,
}

impl Scope {
    fn starts(self) -> &'static [TokenKind] {
        match self {
            Scope::Module => MODULE_STARTS,
            Scope::Class => CLASS_STARTS,
        }
    }
}

impl<B: Builder> Parser<'_, '_, B> {
    /// `TRIPLEQUOTED? alldefs EOF`
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        self.cursor.eat(TokenKind::TripleQuoted);
        let definitions = self.definitions(Scope::Module)?;
        if !self.cursor.at(TokenKind::Eof) {
            return Err(self.cursor.unexpected());
        }
        debug!("parsed {} top-level definitions", definitions.len());
        self.call(0, |b| b.build_module(definitions))
    }

    fn definitions(&mut self, scope: Scope) -> ParseResult<Vec<Definition>> {
        let mut definitions = Vec::new();
        while let Some(kind) = self.cursor.at_any(scope.starts()) {
            match kind {
                TokenKind::At | TokenKind::Async | TokenKind::Def | TokenKind::Class => {
                    definitions.push(self.decorated()?);
                }
                TokenKind::If => definitions.extend(self.if_stmt(scope)?),
                TokenKind::Import | TokenKind::From => self.import_def()?,
                _ => definitions.extend(self.name_statement(scope)?),
            }
        }
        Ok(definitions)
    }

    /// Classes and functions, with any leading `@decorator` lines
    fn decorated(&mut self) -> ParseResult<Definition> {
        let mut decorators = Vec::new();
        while self.cursor.eat(TokenKind::At) {
            decorators.push(self.dotted_name()?);
            self.maybe_type_ignore()?;
        }
        match self
            .cursor
            .at_any(&[TokenKind::Class, TokenKind::Async, TokenKind::Def])
        {
            Some(TokenKind::Class) => self.class_def(decorators),
            Some(_) => self.func_def(decorators),
            None => Err(self.cursor.unexpected()),
        }
    }

    fn class_def(&mut self, decorators: Vec<String>) -> ParseResult<Definition> {
        self.cursor.expect(TokenKind::Class)?;
        let start = self.cursor.offset();
        let name = self.cursor.expect_name()?;
        self.call(start, |b| b.register_class_name(&name))?;

        let bases = self.parents()?;
        self.cursor.expect(TokenKind::Colon)?;
        self.maybe_type_ignore()?;
        let members = self.class_body()?;

        trace!("class {}: {} bases, {} members", name, bases.len(), members.len());
        self.call(start, |b| b.new_class(decorators, &name, bases, members))
    }

    fn parents(&mut self) -> ParseResult<Vec<Parent>> {
        let mut parents = Vec::new();
        if !self.cursor.eat(TokenKind::LParen) || self.cursor.eat(TokenKind::RParen) {
            return Ok(parents);
        }
        loop {
            parents.push(self.parent()?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RParen)?;
        Ok(parents)
    }

    fn parent(&mut self) -> ParseResult<Parent> {
        let start = self.cursor.offset();
        let calls = self.cursor.nth_kind(1) == TokenKind::LParen;
        match self.cursor.kind() {
            TokenKind::Name if self.cursor.nth_kind(1) == TokenKind::Assign => {
                let name = self.cursor.expect_name()?;
                self.cursor.bump();
                let value = self.parse_type()?;
                Ok(Parent::Keyword { name, value })
            }
            TokenKind::NamedTuple if !calls => {
                self.cursor.bump();
                Ok(Parent::Type(Type::named("NamedTuple")))
            }
            TokenKind::TypedDict if !calls => {
                self.cursor.bump();
                let ty = self.call(start, |b| b.new_type("TypedDict", None))?;
                Ok(Parent::Type(ty))
            }
            _ => Ok(Parent::Type(self.parse_type()?)),
        }
    }

    fn class_body(&mut self) -> ParseResult<Vec<Definition>> {
        if self.pass_or_ellipsis() {
            self.maybe_type_ignore()?;
            return Ok(Vec::new());
        }
        self.cursor.expect(TokenKind::Indent)?;
        self.nested(|p| {
            p.cursor.eat(TokenKind::TripleQuoted);
            let members = if p.pass_or_ellipsis() {
                Vec::new()
            } else {
                p.definitions(Scope::Class)?
            };
            p.cursor.expect(TokenKind::Dedent)?;
            Ok(members)
        })
    }

    fn func_def(&mut self, decorators: Vec<String>) -> ParseResult<Definition> {
        let is_async = self.cursor.eat(TokenKind::Async);
        let start = self.cursor.offset();
        self.cursor.expect(TokenKind::Def)?;
        let name = self.func_name()?;

        self.cursor.expect(TokenKind::LParen)?;
        self.maybe_type_ignore()?;
        let params = self.params()?;
        self.cursor.expect(TokenKind::RParen)?;

        let return_type = if self.cursor.eat(TokenKind::Arrow) {
            self.parse_type()?
        } else {
            self.builder.anything()
        };
        let body = self.maybe_body()?;

        trace!("def {} with {} params", name, params.len());
        self.call(start, |b| {
            b.new_function(decorators, is_async, &name, params, return_type, body)
        })
    }

    fn func_name(&mut self) -> ParseResult<String> {
        match self.cursor.at_any(&[
            TokenKind::Name,
            TokenKind::CollNamedTuple,
            TokenKind::TypedDict,
        ]) {
            Some(TokenKind::Name) => self.cursor.expect_name(),
            Some(TokenKind::CollNamedTuple) => {
                self.cursor.bump();
                Ok("namedtuple".to_string())
            }
            Some(_) => {
                self.cursor.bump();
                Ok("TypedDict".to_string())
            }
            None => Err(self.cursor.unexpected()),
        }
    }

    /// A trailing comma is accepted unless a type-ignore comment follows it
    fn params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.cursor.at(TokenKind::RParen) {
            return Ok(params);
        }
        params.push(self.param()?);
        while self.cursor.eat(TokenKind::Comma) {
            let ignored = self.maybe_type_ignore()?;
            if !ignored && self.cursor.at(TokenKind::RParen) {
                break;
            }
            params.push(self.param()?);
        }
        Ok(params)
    }

    fn param(&mut self) -> ParseResult<Param> {
        let kind = self
            .cursor
            .at_any(&[TokenKind::Name, TokenKind::Star, TokenKind::Ellipsis]);
        match kind {
            Some(TokenKind::Name) => {
                let name = self.cursor.expect_name()?;
                let ty = self.param_type()?;
                let default = if self.cursor.eat(TokenKind::Assign) {
                    Some(self.param_default()?)
                } else {
                    None
                };
                Ok(Param {
                    name,
                    kind: ParamKind::Positional,
                    ty,
                    default,
                })
            }
            Some(TokenKind::Star) => {
                self.cursor.bump();
                if self.cursor.eat(TokenKind::Star) {
                    let name = self.cursor.expect_name()?;
                    return Ok(Param {
                        name: format!("**{}", name),
                        kind: ParamKind::KwArgs,
                        ty: self.param_type()?,
                        default: None,
                    });
                }
                if self.cursor.at(TokenKind::Name) {
                    let name = self.cursor.expect_name()?;
                    return Ok(Param {
                        name: format!("*{}", name),
                        kind: ParamKind::VarArgs,
                        ty: self.param_type()?,
                        default: None,
                    });
                }
                Ok(Param {
                    name: "*".to_string(),
                    kind: ParamKind::KeywordOnlyMarker,
                    ty: self.builder.anything(),
                    default: None,
                })
            }
            Some(_) => {
                self.cursor.bump();
                Ok(Param {
                    name: "...".to_string(),
                    kind: ParamKind::Ellipsis,
                    ty: self.builder.anything(),
                    default: None,
                })
            }
            None => Err(self.cursor.unexpected()),
        }
    }

    fn param_type(&mut self) -> ParseResult<Type> {
        if self.cursor.eat(TokenKind::Colon) {
            self.parse_type()
        } else {
            Ok(self.builder.anything())
        }
    }

    fn param_default(&mut self) -> ParseResult<ParamDefault> {
        match self
            .cursor
            .at_any(&[TokenKind::Name, TokenKind::Number, TokenKind::Ellipsis])
        {
            Some(TokenKind::Name) => Ok(ParamDefault::Name(self.cursor.expect_name()?)),
            Some(TokenKind::Number) => Ok(ParamDefault::Number(self.cursor.expect_number()?)),
            Some(_) => {
                self.cursor.bump();
                Ok(ParamDefault::Ellipsis)
            }
            None => Err(self.cursor.unexpected()),
        }
    }

    /// Function bodies. Only `pass`, `...` and a docstring produce empty bodies;
    /// a missing body is empty as well.
    fn maybe_body(&mut self) -> ParseResult<Vec<BodyStmt>> {
        if !self.cursor.eat(TokenKind::Colon) {
            return Ok(Vec::new());
        }
        if self.pass_or_ellipsis() {
            self.maybe_type_ignore()?;
            return Ok(Vec::new());
        }
        let ignored = self.maybe_type_ignore()?;
        if ignored && self.pass_or_ellipsis() {
            return Ok(Vec::new());
        }

        self.cursor.expect(TokenKind::Indent)?;
        if self.pass_or_ellipsis() || (!ignored && self.cursor.eat(TokenKind::TripleQuoted)) {
            self.cursor.expect(TokenKind::Dedent)?;
            return Ok(Vec::new());
        }
        let mut body = vec![self.body_stmt()?];
        while !self.cursor.eat(TokenKind::Dedent) {
            body.push(self.body_stmt()?);
        }
        Ok(body)
    }

    fn body_stmt(&mut self) -> ParseResult<BodyStmt> {
        match self.cursor.at_any(&[TokenKind::Name, TokenKind::Raise]) {
            Some(TokenKind::Name) => {
                let name = self.cursor.expect_name()?;
                self.cursor.expect(TokenKind::Assign)?;
                let value = self.parse_type()?;
                Ok(BodyStmt::Assign { name, value })
            }
            Some(_) => {
                self.cursor.bump();
                let exception = self.parse_type()?;
                if self.cursor.eat(TokenKind::LParen) {
                    self.cursor.expect(TokenKind::RParen)?;
                }
                Ok(BodyStmt::Raise(exception))
            }
            None => Err(self.cursor.unexpected()),
        }
    }

    fn pass_or_ellipsis(&mut self) -> bool {
        if self
            .cursor
            .at_any(&[TokenKind::Pass, TokenKind::Ellipsis])
            .is_some()
        {
            self.cursor.bump();
            true
        } else {
            false
        }
    }

    /// `# type: ignore`, or any other type comment in a position where it can only be
    /// an annotation for a checker. Returns whether one was consumed.
    fn maybe_type_ignore(&mut self) -> ParseResult<bool> {
        if self.cursor.eat(TokenKind::TypeIgnore) {
            return Ok(true);
        }
        if !self.cursor.eat(TokenKind::TypeComment) {
            return Ok(false);
        }
        self.cursor.expect_name()?;
        if self.cursor.eat(TokenKind::LBracket) {
            self.type_list_until(TokenKind::RBracket)?;
            self.cursor.expect(TokenKind::RBracket)?;
        }
        Ok(true)
    }

    /// Statements starting with a name: constants, aliases and type variables
    fn name_statement(&mut self, scope: Scope) -> ParseResult<Option<Definition>> {
        let start = self.cursor.offset();
        if self.cursor.eat(TokenKind::TypedDict) {
            self.cursor.expect(TokenKind::Colon)?;
            return self.annotated_constant("TypedDict", start).map(Some);
        }

        let name = self.cursor.expect_name()?;
        match self
            .cursor
            .at_any(&[TokenKind::Colon, TokenKind::Assign])
        {
            Some(TokenKind::Colon) => {
                self.cursor.bump();
                self.annotated_constant(&name, start).map(Some)
            }
            Some(_) => {
                self.cursor.bump();
                self.assignment(&name, start, scope)
            }
            None => Err(self.cursor.unexpected()),
        }
    }

    /// `NAME ':' type ('=' ELLIPSIS)?`, after the colon
    fn annotated_constant(&mut self, name: &str, start: usize) -> ParseResult<Definition> {
        let ty = self.parse_type()?;
        if self.cursor.eat(TokenKind::Assign) {
            self.cursor.expect(TokenKind::Ellipsis)?;
        }
        self.maybe_type_ignore()?;
        self.call(start, |b| b.new_constant(name, ConstantValue::Type(ty)))
    }

    /// Everything after `NAME =`
    fn assignment(
        &mut self,
        name: &str,
        start: usize,
        scope: Scope,
    ) -> ParseResult<Option<Definition>> {
        let (token, _) = self.cursor.current();
        let value = match token {
            Token::Number(number) => {
                self.cursor.bump();
                ConstantValue::Number(number)
            }
            Token::String(value) => {
                self.cursor.bump();
                ConstantValue::String(value)
            }
            Token::Ellipsis => {
                self.cursor.bump();
                let ty = if self.cursor.eat(TokenKind::TypeComment) {
                    self.parse_type()?
                } else {
                    self.builder.anything()
                };
                ConstantValue::Type(ty)
            }
            Token::TypeVar if scope == Scope::Module => {
                self.type_var_def(name, start)?;
                return Ok(None);
            }
            Token::LBracket => {
                let strings = self.string_list()?;
                self.maybe_type_ignore()?;
                return self.alias(name, AliasValue::StringList(strings), start, scope);
            }
            Token::LParen => {
                let paren_start = self.cursor.offset();
                self.cursor.bump();
                let first = self.parse_type()?;
                if self.cursor.eat(TokenKind::Comma) {
                    self.tuple_rest(TokenKind::RParen)?;
                    self.cursor.expect(TokenKind::RParen)?;
                    ConstantValue::Type(self.builder.tuple())
                } else {
                    self.cursor.expect(TokenKind::RParen)?;
                    let ty = self.type_chain(first, paren_start)?;
                    return self.alias_or_tuple(name, ty, start, scope);
                }
            }
            _ => {
                let ty = self.parse_type()?;
                return self.alias_or_tuple(name, ty, start, scope);
            }
        };
        self.maybe_type_ignore()?;
        self.call(start, |b| b.new_constant(name, value)).map(Some)
    }

    /// `NAME = type` is an alias, `NAME = type ','` a tuple constant
    fn alias_or_tuple(
        &mut self,
        name: &str,
        ty: Type,
        start: usize,
        scope: Scope,
    ) -> ParseResult<Option<Definition>> {
        if self.cursor.eat(TokenKind::Comma) {
            let tuple = self.builder.tuple();
            self.maybe_type_ignore()?;
            return self
                .call(start, |b| b.new_constant(name, ConstantValue::Type(tuple)))
                .map(Some);
        }
        self.maybe_type_ignore()?;
        self.alias(name, AliasValue::Type(ty), start, scope)
    }

    fn alias(
        &mut self,
        name: &str,
        value: AliasValue,
        start: usize,
        scope: Scope,
    ) -> ParseResult<Option<Definition>> {
        match scope {
            Scope::Module => {
                self.call(start, |b| b.add_alias_or_constant(name, value))?;
                Ok(None)
            }
            Scope::Class => self
                .call(start, |b| b.new_alias_or_constant(name, value))
                .map(Some),
        }
    }

    /// Remaining elements of a tuple literal after `'(' type ','`. Either the tuple
    /// closes at once or at least one more element follows.
    fn tuple_rest(&mut self, close: TokenKind) -> ParseResult<()> {
        if self.cursor.at(close) {
            return Ok(());
        }
        self.parse_type()?;
        while self.cursor.eat(TokenKind::Comma) {
            if self.cursor.at(close) {
                break;
            }
            self.parse_type()?;
        }
        Ok(())
    }

    /// `'[' (STRING (',' STRING)* ','?)? ']'`
    fn string_list(&mut self) -> ParseResult<Vec<String>> {
        self.cursor.expect(TokenKind::LBracket)?;
        let mut strings = Vec::new();
        while !self.cursor.at(TokenKind::RBracket) {
            strings.push(self.cursor.expect_string()?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RBracket)?;
        Ok(strings)
    }

    /// `TYPEVAR '(' STRING (',' type)* (',' NAME '=' (type | STRING))* ')'`
    fn type_var_def(&mut self, name: &str, start: usize) -> ParseResult<()> {
        self.cursor.expect(TokenKind::TypeVar)?;
        self.cursor.expect(TokenKind::LParen)?;
        let param_name = self.cursor.expect_string()?;

        let mut constraints = Vec::new();
        let mut kwargs = Vec::new();
        while self.cursor.eat(TokenKind::Comma) {
            let keyword = self.cursor.at(TokenKind::Name)
                && self.cursor.nth_kind(1) == TokenKind::Assign;
            if !keyword && kwargs.is_empty() {
                constraints.push(self.parse_type()?);
                continue;
            }
            let key = self.cursor.expect_name()?;
            self.cursor.expect(TokenKind::Assign)?;
            let value = match self.cursor.current() {
                (Token::String(value), _) => {
                    self.cursor.bump();
                    TypeVarArg::String(value)
                }
                _ => TypeVarArg::Type(self.parse_type()?),
            };
            kwargs.push((key, value));
        }
        self.cursor.expect(TokenKind::RParen)?;
        self.maybe_type_ignore()?;

        self.call(start, |b| b.add_type_var(name, &param_name, constraints, kwargs))
    }

    fn import_def(&mut self) -> ParseResult<()> {
        let start = self.cursor.offset();
        if self.cursor.eat(TokenKind::Import) {
            let mut items = vec![self.import_item()?];
            while self.cursor.eat(TokenKind::Comma) {
                items.push(self.import_item()?);
            }
            self.maybe_type_ignore()?;
            return self.call(start, |b| b.add_import(None, items));
        }

        self.cursor.expect(TokenKind::From)?;
        let package = self.import_source()?;
        self.cursor.expect(TokenKind::Import)?;
        let items = self.from_list()?;
        self.maybe_type_ignore()?;
        self.call(start, |b| b.add_import(Some(package), items))
    }

    fn import_item(&mut self) -> ParseResult<ImportItem> {
        let name = self.dotted_name()?;
        let alias = if self.cursor.eat(TokenKind::As) {
            Some(self.cursor.expect_name()?)
        } else {
            None
        };
        Ok(ImportItem::new(name, alias))
    }

    /// The package of a `from` import, relative dots included. A bare `.` or `..`
    /// names the current or parent package.
    fn import_source(&mut self) -> ParseResult<String> {
        let mut dots = 0;
        loop {
            if self.cursor.eat(TokenKind::Dot) {
                dots += 1;
            } else if self.cursor.eat(TokenKind::Ellipsis) {
                dots += 3;
            } else {
                break;
            }
        }
        if self.cursor.at(TokenKind::Name) || !matches!(dots, 1 | 2) {
            let name = self.dotted_name()?;
            return Ok(format!("{}{}", ".".repeat(dots), name));
        }
        Ok(if dots == 1 { "__PACKAGE__" } else { "__PARENT__" }.to_string())
    }

    fn from_list(&mut self) -> ParseResult<Vec<ImportItem>> {
        let parenthesized = self.cursor.eat(TokenKind::LParen);
        let mut items = vec![self.from_item()?];
        while self.cursor.eat(TokenKind::Comma) {
            if parenthesized && self.cursor.at(TokenKind::RParen) {
                break;
            }
            items.push(self.from_item()?);
        }
        if parenthesized {
            self.cursor.expect(TokenKind::RParen)?;
        }
        Ok(items)
    }

    fn from_item(&mut self) -> ParseResult<ImportItem> {
        let keyword = match self.cursor.kind() {
            TokenKind::NamedTuple => Some("NamedTuple"),
            TokenKind::CollNamedTuple => Some("namedtuple"),
            TokenKind::TypedDict => Some("TypedDict"),
            TokenKind::TypeVar => Some("TypeVar"),
            TokenKind::Star => Some("*"),
            _ => None,
        };
        if let Some(name) = keyword {
            self.cursor.bump();
            return Ok(ImportItem::new(name, None));
        }
        let name = self.cursor.expect_name()?;
        let alias = if self.cursor.eat(TokenKind::As) {
            Some(self.cursor.expect_name()?)
        } else {
            None
        };
        Ok(ImportItem::new(name, alias))
    }

    /// An `if`/`elif`/`else` chain. Branch bodies are parsed in `scope` and the
    /// builder decides which one, if any, is spliced in.
    fn if_stmt(&mut self, scope: Scope) -> ParseResult<Vec<Definition>> {
        let start = self.cursor.offset();
        self.cursor.expect(TokenKind::If)?;
        let condition = self.condition()?;
        self.call(start, |b| b.if_begin(condition))?;
        let mut branches = vec![self.block(scope)?];

        loop {
            let clause = self.cursor.offset();
            if self.cursor.eat(TokenKind::Elif) {
                let condition = self.condition()?;
                self.call(clause, |b| b.if_elif(condition))?;
                branches.push(self.block(scope)?);
            } else if self.cursor.eat(TokenKind::Else) {
                self.call(clause, |b| b.if_else())?;
                branches.push(self.block(scope)?);
                break;
            } else {
                break;
            }
        }

        trace!("if chain with {} branches", branches.len());
        self.call(start, |b| b.if_end(branches))
    }

    fn block(&mut self, scope: Scope) -> ParseResult<Vec<Definition>> {
        self.cursor.expect(TokenKind::Colon)?;
        self.cursor.expect(TokenKind::Indent)?;
        self.nested(|p| {
            let definitions = p.definitions(scope)?;
            p.cursor.expect(TokenKind::Dedent)?;
            Ok(definitions)
        })
    }

    /// Collect the tokens up to the block colon and hand them to the condition grammar
    fn condition(&mut self) -> ParseResult<Condition> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.cursor.kind() {
                TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof | TokenKind::LexError => {
                    break
                }
                TokenKind::Colon if depth == 0 => break,
                _ => {}
            }
            if self.cursor.nth(0).is_open_bracket() && self.depth + depth >= MAX_DEPTH {
                return Err(self.depth_exceeded());
            }
            let spanned = self.cursor.bump();
            if spanned.0.is_open_bracket() {
                depth += 1;
            } else if spanned.0.is_close_bracket() {
                depth = depth.saturating_sub(1);
            }
            tokens.push(spanned);
        }

        let stop = self.cursor.current();
        parse_condition(tokens, &stop)
            .map_err(|error| self.cursor.error_at(error.kind, error.message, error.offset))
    }
}

#[cfg(test)]
mod tests {
    use crate::pyi::ast::{
        AliasValue, BodyStmt, Definition, ImportItem, Module, ParamDefault, ParamKind, Parent,
        Type,
    };
    use crate::pyi::config::TargetConfig;
    use crate::pyi::parser::{parse_for_target, ErrorKind, ParseError, MAX_DEPTH};

    fn parse(source: &str) -> Module {
        parse_for_target(source, &TargetConfig::default()).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        parse_for_target(source, &TargetConfig::default()).unwrap_err()
    }

    #[test]
    fn test_empty_and_docstring_only() {
        assert_eq!(parse(""), Module::default());
        assert_eq!(parse("\"\"\"Module docs.\"\"\"\n"), Module::default());
    }

    #[test]
    fn test_constants() {
        let module = parse("x: int\ny = 3\nz = 'a'\nw = ...\nv = ...  # type: float\nu: str = ...\n");
        let types: Vec<String> = module.constants().map(|c| format!("{}: {}", c.name, c.ty)).collect();
        assert_eq!(
            types,
            vec!["x: int", "y: int", "z: str", "w: Any", "v: float", "u: str"]
        );
    }

    #[test]
    fn test_tuple_constants() {
        let module = parse("a = (int,)\nb = (int, str)\nc = int,\n");
        assert!(module.constants().all(|c| c.ty == Type::named("tuple")));
        assert_eq!(module.constants().count(), 3);
    }

    #[test]
    fn test_aliases_stay_out_of_definitions() {
        let module = parse("X = List[int]\n__all__ = ['a', 'b',]\n");
        assert!(module.definitions.is_empty());
        assert_eq!(module.aliases.len(), 2);
        assert_eq!(
            module.find_alias("__all__").map(|a| &a.value),
            Some(&AliasValue::StringList(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_class_level_alias_is_a_member() {
        let module = parse("class A:\n    X = int\n");
        let class = module.classes().next().unwrap();
        assert!(matches!(class.members[0], Definition::Alias(_)));
    }

    #[test]
    fn test_function_signature() {
        let module = parse("async def f(a, b: int = 3, *args: str, **kw) -> bool: ...\n");
        let func = module.functions().next().unwrap();
        assert!(func.is_async);
        assert_eq!(func.return_type, Type::named("bool"));
        let kinds: Vec<ParamKind> = func.params.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParamKind::Positional,
                ParamKind::Positional,
                ParamKind::VarArgs,
                ParamKind::KwArgs
            ]
        );
        assert_eq!(func.params[0].ty, Type::Anything);
        assert_eq!(
            func.params[1].default,
            Some(ParamDefault::Number(crate::pyi::ast::Number::Int(3)))
        );
        assert_eq!(func.params[2].name, "*args");
        assert_eq!(func.params[3].name, "**kw");
    }

    #[test]
    fn test_keyword_only_marker_and_ellipsis_params() {
        let module = parse("def f(x, *, y) -> None: ...\ndef g(...) -> None: ...\n");
        let funcs: Vec<_> = module.functions().collect();
        assert_eq!(funcs[0].params[1].kind, ParamKind::KeywordOnlyMarker);
        assert_eq!(funcs[1].params[0].kind, ParamKind::Ellipsis);
    }

    #[test]
    fn test_missing_return_type_is_anything() {
        let module = parse("def f()\n");
        assert_eq!(module.functions().next().unwrap().return_type, Type::Anything);
    }

    #[test]
    fn test_function_body_statements() {
        let module = parse("def f(x) -> int:\n    x = int\n    raise ValueError()\n");
        let func = module.functions().next().unwrap();
        assert_eq!(
            func.body,
            vec![
                BodyStmt::Assign {
                    name: "x".to_string(),
                    value: Type::named("int")
                },
                BodyStmt::Raise(Type::named("ValueError")),
            ]
        );
    }

    #[test]
    fn test_empty_body_forms() {
        let sources = [
            "def f() -> int: pass\n",
            "def f() -> int: ...  # type: ignore\n",
            "def f() -> int:  # type: ignore\n    pass\n",
            "def f() -> int:\n    ...\n",
            "def f() -> int:\n    \"\"\"Docs.\"\"\"\n",
        ];
        for source in sources {
            let module = parse(source);
            assert!(module.functions().next().unwrap().body.is_empty(), "{}", source);
        }
    }

    #[test]
    fn test_trailing_comma_after_type_ignore_is_rejected() {
        assert!(parse_for_target("def f(x,)\n", &TargetConfig::default()).is_ok());
        let error = parse_err("def f(x,  # type: ignore\n)\n");
        assert_eq!(error.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_decorators() {
        let module = parse("@property\n@abc.abstractmethod\ndef f(self) -> int: ...\n");
        assert_eq!(
            module.functions().next().unwrap().decorators,
            vec!["property", "abc.abstractmethod"]
        );
    }

    #[test]
    fn test_class_with_parents_and_members() {
        let source = "class A(B, metaclass=M):\n    \"\"\"Docs.\"\"\"\n    x: int\n    def f(self) -> None: ...\n";
        let module = parse(source);
        let class = module.classes().next().unwrap();
        assert_eq!(
            class.bases,
            vec![
                Parent::Type(Type::named("B")),
                Parent::Keyword {
                    name: "metaclass".to_string(),
                    value: Type::named("M")
                }
            ]
        );
        assert_eq!(class.members.len(), 2);
    }

    #[test]
    fn test_class_special_parents() {
        let module = parse("class A(NamedTuple): ...\nclass B(TypedDict, total=False): pass\n");
        let classes: Vec<_> = module.classes().collect();
        assert_eq!(classes[0].bases, vec![Parent::Type(Type::named("NamedTuple"))]);
        assert_eq!(classes[1].bases[0], Parent::Type(Type::named("TypedDict")));
    }

    #[test]
    fn test_class_pass_bodies() {
        let module = parse("class A: pass\nclass B:\n    ...\nclass C():\n    pass\n");
        assert_eq!(module.classes().count(), 3);
        assert!(module.classes().all(|c| c.members.is_empty()));
    }

    #[test]
    fn test_imports() {
        let module = parse(
            "import a.b as c, d\nfrom . import x\nfrom .. import y\nfrom .pkg.mod import (NamedTuple, z as w,)\nfrom typing import *\n",
        );
        let froms: Vec<Option<&str>> = module.imports.iter().map(|i| i.from.as_deref()).collect();
        assert_eq!(
            froms,
            vec![
                None,
                Some("__PACKAGE__"),
                Some("__PARENT__"),
                Some(".pkg.mod"),
                Some("typing")
            ]
        );
        assert_eq!(
            module.imports[0].items,
            vec![
                ImportItem::new("a.b", Some("c".to_string())),
                ImportItem::new("d", None)
            ]
        );
        assert_eq!(
            module.imports[3].items,
            vec![
                ImportItem::new("NamedTuple", None),
                ImportItem::new("z", Some("w".to_string()))
            ]
        );
    }

    #[test]
    fn test_type_vars() {
        let module = parse("T = TypeVar('T')\nS = TypeVar('S', int, str)\nU = TypeVar('U', bound=int, covariant=True)\n");
        assert_eq!(module.type_vars.len(), 3);
        assert_eq!(module.type_vars[1].constraints.len(), 2);
        assert_eq!(module.type_vars[2].bound, Some(Type::named("int")));
        assert!(module.type_vars[2].covariant);
    }

    #[test]
    fn test_constraints_after_keywords_are_rejected() {
        let error = parse_err("T = TypeVar('T', bound=int, str)\n");
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert!(error.message.contains("expecting '='"), "{}", error.message);
    }

    #[test]
    fn test_type_var_inside_class_is_rejected() {
        let error = parse_err("class A:\n    T = TypeVar('T')\n");
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert!(error.message.starts_with("syntax error, unexpected TYPEVAR"));
    }

    #[test]
    fn test_if_selects_matching_branch() {
        let source = "if sys.version_info >= (3,):\n  x: int\nelif sys.version_info >= (2,):\n  y: int\nelse:\n  z: int\n";
        let module = parse(source);
        let names: Vec<&str> = module.definitions.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["x"]);
    }

    #[test]
    fn test_if_inside_class_splices_members() {
        let source = "class A:\n  if sys.platform == 'win32':\n    def f(self) -> None: ...\n  else:\n    def g(self) -> None: ...\n";
        let module = parse(source);
        let class = module.classes().next().unwrap();
        let names: Vec<&str> = class.members.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["g"]);
    }

    #[test]
    fn test_condition_errors_point_into_the_condition() {
        let error = parse_err("if sys.version_info >= :\n  x: int\n");
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!((error.line, error.column), (1, 24));
    }

    #[test]
    fn test_unsupported_condition_is_a_build_error() {
        let error = parse_err("if foo.bar == 'x':\n  x: int\n");
        assert_eq!(error.kind, ErrorKind::Build);
        assert_eq!(error.message, "Unsupported condition: 'foo.bar'");
        assert_eq!((error.line, error.column), (1, 1));
    }

    #[test]
    fn test_unexpected_indent() {
        let error = parse_err("x: int\n    y: int\n");
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.message, "syntax error, unexpected INDENT");
        assert_eq!(error.line, 2);
    }

    #[test]
    fn test_lex_error_is_reported() {
        let error = parse_err("x: int\ny = $\n");
        assert_eq!(error.kind, ErrorKind::Lex);
        assert_eq!(error.line, 2);
    }

    #[test]
    fn test_nesting_below_the_limit_parses() {
        let depth = MAX_DEPTH / 2;
        let source = format!("x: {}int{}\n", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&source), parse("x: int\n"));
    }

    #[test]
    fn test_deep_parentheses_exhaust_the_parser() {
        let depth = 1000;
        let source = format!("x: {}int{}\n", "(".repeat(depth), ")".repeat(depth));
        let error = parse_err(&source);
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.message, "memory exhausted");
        assert_eq!((error.line, error.column), (1, MAX_DEPTH + 4));
    }

    #[test]
    fn test_deep_type_parameters_exhaust_the_parser() {
        let depth = 1000;
        let source = format!("x: {}int{}\n", "List[".repeat(depth), "]".repeat(depth));
        let error = parse_err(&source);
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.message, "memory exhausted");
    }

    #[test]
    fn test_deep_blocks_exhaust_the_parser() {
        let depth = MAX_DEPTH + 10;
        let mut source = String::new();
        for level in 0..depth {
            source.push_str(&format!("{}class C{}:\n", " ".repeat(level), level));
        }
        source.push_str(&format!("{}x: int\n", " ".repeat(depth)));
        let error = parse_err(&source);
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.message, "memory exhausted");
    }

    #[test]
    fn test_deep_condition_is_rejected_before_evaluation() {
        let depth = 1000;
        let source = format!(
            "if {}sys.platform == 'linux'{}:\n  x: int\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let error = parse_err(&source);
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.message, "memory exhausted");
        assert_eq!((error.line, error.column), (1, MAX_DEPTH + 4));
    }
}
