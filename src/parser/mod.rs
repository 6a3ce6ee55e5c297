pub mod node;

use crate::diagnostics::HarnessError;
use crate::level::{LanguageFeature, LanguageLevelChecker};
use crate::lexer::{self, token::Token};
use crate::span::{Span, Spanned};
use crate::version::JavaVersion;
use node::{Node, NodeKind};

/// Parses a complete compilation unit for one Java version.
pub trait ParseInvoker {
    fn parse(&self, source: &str, version: JavaVersion) -> Result<Node, HarnessError>;
}

impl<F> ParseInvoker for F
where
    F: Fn(&str, JavaVersion) -> Result<Node, HarnessError>,
{
    fn parse(&self, source: &str, version: JavaVersion) -> Result<Node, HarnessError> {
        self(source, version)
    }
}

/// The built-in parser for the supported Java subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaParser;

impl ParseInvoker for JavaParser {
    fn parse(&self, source: &str, version: JavaVersion) -> Result<Node, HarnessError> {
        parse_compilation_unit(source, version)
    }
}

/// Lex and parse `source` as a compilation unit under `version`.
pub fn parse_compilation_unit(source: &str, version: JavaVersion) -> Result<Node, HarnessError> {
    let level = LanguageLevelChecker::new(version);
    let tokens = lexer::lex(source, &level)?;
    let mut parser = Parser::new(&tokens, source, level);
    let unit = parser.parse_compilation_unit()?;
    tracing::debug!(%version, tokens = tokens.len(), "parsed compilation unit");
    Ok(unit)
}

/// Deepest nesting the parser follows before giving up with a parse error
/// instead of exhausting the stack.
pub const MAX_NESTING: u32 = 128;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
    level: LanguageLevelChecker,
    /// Nesting depth of lookahead attempts; level checks are deferred
    /// while it is non-zero.
    speculative: u32,
    /// Current nesting of blocks, statements, expressions and type
    /// arguments, capped at `MAX_NESTING`.
    depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str, level: LanguageLevelChecker) -> Self {
        Self {
            tokens,
            source,
            pos: 0,
            level,
            speculative: 0,
            depth: 0,
        }
    }

    // ── Token plumbing ──────────────────────────────────────────────

    fn peek(&self) -> Option<Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.pos + offset).map(|t| t.node)
    }

    fn at(&self, tok: Token) -> bool {
        self.peek() == Some(tok)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| self.eof_span())
    }

    fn eof_span(&self) -> Span {
        Span::new(self.source.len(), self.source.len())
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    fn advance(&mut self) -> Option<&Spanned<Token>> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn eat(&mut self, tok: Token) -> bool {
        if self.at(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Span, HarnessError> {
        match self.tokens.get(self.pos) {
            Some(tok) if tok.node == expected => {
                self.pos += 1;
                Ok(tok.span)
            }
            _ => Err(self.unexpected(&expected.to_string())),
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), HarnessError> {
        match self.tokens.get(self.pos) {
            Some(tok) if tok.node == Token::Ident => {
                self.pos += 1;
                Ok((self.text(tok.span).to_string(), tok.span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn text(&self, span: Span) -> &'a str {
        span.slice(self.source).unwrap_or("")
    }

    fn ident_is(&self, offset: usize, word: &str) -> bool {
        match self.tokens.get(self.pos + offset) {
            Some(tok) if tok.node == Token::Ident => self.text(tok.span) == word,
            _ => false,
        }
    }

    /// True if the tokens at `offset` and `offset + 1` touch.
    fn adjacent(&self, offset: usize) -> bool {
        match (self.tokens.get(self.pos + offset), self.tokens.get(self.pos + offset + 1)) {
            (Some(a), Some(b)) => a.span.end == b.span.start,
            _ => false,
        }
    }

    fn error(&self, msg: impl Into<String>, span: Span) -> HarnessError {
        HarnessError::parse(self.level.version(), msg, span, self.source)
    }

    fn unexpected(&self, expected: &str) -> HarnessError {
        match self.tokens.get(self.pos) {
            Some(tok) => self.error(format!("expected {expected}, found {}", tok.node), tok.span),
            None => self.error(format!("expected {expected}, found end of input"), self.eof_span()),
        }
    }

    fn require(&self, feature: LanguageFeature, span: Span) -> Result<(), HarnessError> {
        if self.speculative > 0 {
            return Ok(());
        }
        self.level.check(feature, span, self.source)
    }

    fn finish(&self, kind: NodeKind, start: usize) -> Node {
        Node::new(kind, Span::new(start, self.prev_end().max(start)))
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, HarnessError>) -> Result<T, HarnessError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(
                format!("nesting too deep (more than {MAX_NESTING} levels)"),
                self.peek_span(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Run `attempt` as lookahead: the position is restored afterwards and
    /// any error counts as `false`.
    fn speculate(&mut self, attempt: impl FnOnce(&mut Self) -> Result<bool, HarnessError>) -> bool {
        let saved = self.pos;
        self.speculative += 1;
        let result = attempt(self).unwrap_or(false);
        self.speculative -= 1;
        self.pos = saved;
        result
    }

    // ── Compilation unit ────────────────────────────────────────────

    pub fn parse_compilation_unit(&mut self) -> Result<Node, HarnessError> {
        let mut children = Vec::new();

        if self.at(Token::Package) {
            children.push(self.parse_package()?);
        }
        while self.at(Token::Import) {
            children.push(self.parse_import()?);
        }

        if self.at_module_declaration() {
            children.push(self.parse_module()?);
            if self.peek().is_some() {
                return Err(self.unexpected("end of input after module declaration"));
            }
        } else {
            while self.peek().is_some() {
                if self.eat(Token::Semi) {
                    continue;
                }
                children.push(self.parse_type_declaration()?);
            }
        }

        Ok(Node::new(NodeKind::CompilationUnit, Span::new(0, self.source.len())).with_children(children))
    }

    fn parse_package(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Package)?.start;
        let (name, _) = self.parse_qualified_name()?;
        self.expect(Token::Semi)?;
        Ok(self.finish(NodeKind::PackageDeclaration, start).with_image(name))
    }

    fn parse_import(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Import)?.start;
        let mut image = String::new();
        if self.at(Token::Static) {
            let span = self.peek_span();
            self.require(LanguageFeature::StaticImports, span)?;
            self.advance();
            image.push_str("static ");
        }
        let (name, _) = self.expect_ident()?;
        image.push_str(&name);
        while self.at(Token::Dot) {
            if self.peek_at(1) == Some(Token::Star) {
                self.pos += 2;
                image.push_str(".*");
                break;
            }
            self.advance();
            let (segment, _) = self.expect_ident()?;
            image.push('.');
            image.push_str(&segment);
        }
        self.expect(Token::Semi)?;
        Ok(self.finish(NodeKind::ImportDeclaration, start).with_image(image))
    }

    fn parse_qualified_name(&mut self) -> Result<(String, Span), HarnessError> {
        let (mut name, first) = self.expect_ident()?;
        while self.at(Token::Dot) && self.peek_at(1) == Some(Token::Ident) {
            self.advance();
            let (segment, _) = self.expect_ident()?;
            name.push('.');
            name.push_str(&segment);
        }
        Ok((name, Span::new(first.start, self.prev_end())))
    }

    // ── Modules ─────────────────────────────────────────────────────

    fn at_module_declaration(&self) -> bool {
        (self.ident_is(0, "module") && self.peek_at(1) == Some(Token::Ident))
            || (self.ident_is(0, "open") && self.ident_is(1, "module"))
    }

    fn parse_module(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        if self.ident_is(0, "open") {
            self.advance();
        }
        let module_span = self.peek_span();
        self.require(LanguageFeature::Modules, module_span)?;
        self.advance();
        let (name, _) = self.parse_qualified_name()?;
        self.expect(Token::LBrace)?;

        let mut directives = Vec::new();
        while !self.at(Token::RBrace) && self.peek().is_some() {
            directives.push(self.parse_module_directive()?);
        }
        self.expect(Token::RBrace)?;
        Ok(self
            .finish(NodeKind::ModuleDeclaration, start)
            .with_image(name)
            .with_children(directives))
    }

    fn parse_module_directive(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let keyword = ["requires", "exports", "opens", "uses", "provides"]
            .into_iter()
            .find(|k| self.ident_is(0, k))
            .ok_or_else(|| self.unexpected("module directive"))?;
        self.advance();

        match keyword {
            "requires" => {
                while (self.ident_is(0, "transitive") && self.peek_at(1) == Some(Token::Ident)) || self.at(Token::Static) {
                    self.advance();
                }
                self.parse_qualified_name()?;
            }
            "exports" | "opens" => {
                self.parse_qualified_name()?;
                if self.ident_is(0, "to") {
                    self.advance();
                    self.parse_qualified_name()?;
                    while self.eat(Token::Comma) {
                        self.parse_qualified_name()?;
                    }
                }
            }
            "uses" => {
                self.parse_qualified_name()?;
            }
            _ => {
                self.parse_qualified_name()?;
                if !self.ident_is(0, "with") {
                    return Err(self.unexpected("'with'"));
                }
                self.advance();
                self.parse_qualified_name()?;
                while self.eat(Token::Comma) {
                    self.parse_qualified_name()?;
                }
            }
        }

        let end = self.prev_end();
        self.expect(Token::Semi)?;
        let image = self.source[start..end].split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(self.finish(NodeKind::ModuleDirective, start).with_image(image))
    }

    // ── Declarations ────────────────────────────────────────────────

    /// Annotations and modifier keywords. `default` counts as a modifier
    /// only where interface methods may appear.
    fn parse_modifiers(&mut self, allow_default: bool) -> Result<(Vec<Node>, Vec<Token>), HarnessError> {
        let mut annotations = Vec::new();
        let mut modifiers = Vec::new();
        loop {
            match self.peek() {
                Some(Token::At) if self.peek_at(1) != Some(Token::Interface) => {
                    annotations.push(self.parse_annotation()?);
                }
                Some(tok) if tok.is_modifier() => {
                    // `static {` opens an initializer, not a member
                    if tok == Token::Static && self.peek_at(1) == Some(Token::LBrace) {
                        break;
                    }
                    modifiers.push(tok);
                    self.advance();
                }
                Some(Token::Default) if allow_default && self.peek_at(1) != Some(Token::Colon) => {
                    modifiers.push(Token::Default);
                    self.advance();
                }
                _ => break,
            }
        }
        Ok((annotations, modifiers))
    }

    fn parse_annotation(&mut self) -> Result<Node, HarnessError> {
        let at = self.expect(Token::At)?;
        self.require(LanguageFeature::Annotations, at)?;
        let (name, _) = self.parse_qualified_name()?;
        let mut values = Vec::new();
        if self.eat(Token::LParen) {
            while !self.at(Token::RParen) {
                if !values.is_empty() {
                    self.expect(Token::Comma)?;
                }
                // `key = value` pairs parse as assignments
                values.push(if self.at(Token::LBrace) {
                    self.parse_array_initializer()?
                } else {
                    self.parse_expression()?
                });
            }
            self.expect(Token::RParen)?;
        }
        Ok(self
            .finish(NodeKind::Annotation, at.start)
            .with_image(name)
            .with_children(values))
    }

    fn parse_type_declaration(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let (mut children, _) = self.parse_modifiers(false)?;
        children.push(self.parse_class_like()?);
        Ok(self.finish(NodeKind::TypeDeclaration, start).with_children(children))
    }

    fn parse_class_like(&mut self) -> Result<Node, HarnessError> {
        match self.peek() {
            Some(Token::Class) => self.parse_class(false),
            Some(Token::Interface) => self.parse_class(true),
            Some(Token::Enum) => self.parse_enum(),
            _ => Err(self.unexpected("class, interface or enum declaration")),
        }
    }

    fn parse_class(&mut self, is_interface: bool) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        self.advance();
        let (name, _) = self.expect_ident()?;
        if self.at(Token::Lt) {
            self.parse_type_parameters()?;
        }
        if self.eat(Token::Extends) {
            self.parse_type()?;
            while is_interface && self.eat(Token::Comma) {
                self.parse_type()?;
            }
        }
        if self.eat(Token::Implements) {
            self.parse_type()?;
            while self.eat(Token::Comma) {
                self.parse_type()?;
            }
        }
        let body = self.parse_class_body(is_interface)?;
        Ok(self
            .finish(NodeKind::ClassOrInterfaceDeclaration, start)
            .with_image(name)
            .with_children(vec![body]))
    }

    fn parse_type_parameters(&mut self) -> Result<(), HarnessError> {
        let lt = self.expect(Token::Lt)?;
        self.require(LanguageFeature::Generics, lt)?;
        loop {
            self.expect_ident()?;
            if self.eat(Token::Extends) {
                self.parse_type()?;
                while self.eat(Token::Amp) {
                    self.parse_type()?;
                }
            }
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Gt)?;
        Ok(())
    }

    fn parse_class_body(&mut self, in_interface: bool) -> Result<Node, HarnessError> {
        self.nested(|p| p.parse_class_body_members(in_interface))
    }

    fn parse_class_body_members(&mut self, in_interface: bool) -> Result<Node, HarnessError> {
        let start = self.expect(Token::LBrace)?.start;
        let mut members = Vec::new();
        while !self.at(Token::RBrace) && self.peek().is_some() {
            if self.eat(Token::Semi) {
                continue;
            }
            members.push(self.parse_body_declaration(in_interface)?);
        }
        self.expect(Token::RBrace)?;
        Ok(self.finish(NodeKind::ClassOrInterfaceBody, start).with_children(members))
    }

    fn parse_body_declaration(&mut self, in_interface: bool) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;

        if self.at(Token::LBrace) || (self.at(Token::Static) && self.peek_at(1) == Some(Token::LBrace)) {
            let is_static = self.eat(Token::Static);
            let block = self.parse_block()?;
            let mut init = self.finish(NodeKind::Initializer, start).with_children(vec![block]);
            if is_static {
                init = init.with_image("static");
            }
            return Ok(self.finish(NodeKind::ClassOrInterfaceBodyDeclaration, start).with_children(vec![init]));
        }

        let (mut children, modifiers) = self.parse_modifiers(in_interface)?;

        let member = if matches!(self.peek(), Some(Token::Class | Token::Interface | Token::Enum)) {
            self.parse_class_like()?
        } else {
            if self.at(Token::Lt) {
                self.parse_type_parameters()?;
            }
            if self.at(Token::Ident) && self.peek_at(1) == Some(Token::LParen) {
                self.parse_constructor()?
            } else {
                let member_start = self.peek_span().start;
                let ty = if self.eat(Token::Void) {
                    "void".to_string()
                } else {
                    self.parse_type()?.0
                };
                let (name, name_span) = self.expect_ident()?;
                if self.at(Token::LParen) {
                    self.parse_method_rest(member_start, name, name_span, in_interface, &modifiers)?
                } else {
                    let mut declarators = vec![self.parse_variable_declarator_rest(name, name_span)?];
                    while self.eat(Token::Comma) {
                        declarators.push(self.parse_variable_declarator()?);
                    }
                    self.expect(Token::Semi)?;
                    self.finish(NodeKind::FieldDeclaration, member_start)
                        .with_image(ty)
                        .with_children(declarators)
                }
            }
        };

        children.push(member);
        Ok(self.finish(NodeKind::ClassOrInterfaceBodyDeclaration, start).with_children(children))
    }

    fn parse_constructor(&mut self) -> Result<Node, HarnessError> {
        let (name, name_span) = self.expect_ident()?;
        let params = self.parse_formal_parameters()?;
        self.parse_throws()?;
        let body = self.parse_block()?;
        Ok(self
            .finish(NodeKind::ConstructorDeclaration, name_span.start)
            .with_image(name)
            .with_children(vec![params, body]))
    }

    fn parse_method_rest(
        &mut self,
        start: usize,
        name: String,
        name_span: Span,
        in_interface: bool,
        modifiers: &[Token],
    ) -> Result<Node, HarnessError> {
        let params = self.parse_formal_parameters()?;
        while self.at(Token::LBracket) && self.peek_at(1) == Some(Token::RBracket) {
            self.pos += 2;
        }
        self.parse_throws()?;

        let body = if self.eat(Token::Semi) {
            None
        } else {
            Some(self.parse_block()?)
        };

        if in_interface {
            let has = |m: Token| modifiers.contains(&m);
            match (&body, has(Token::Default), has(Token::Static), has(Token::Private)) {
                (Some(_), true, _, _) => self.require(LanguageFeature::DefaultMethods, name_span)?,
                (Some(_), _, true, _) => self.require(LanguageFeature::StaticInterfaceMethods, name_span)?,
                (Some(_), _, _, true) => self.require(LanguageFeature::PrivateInterfaceMethods, name_span)?,
                (Some(_), false, false, false) => {
                    return Err(self.error("interface abstract methods cannot have a body", name_span));
                }
                (None, true, _, _) | (None, _, true, _) | (None, _, _, true) => {
                    return Err(self.error("missing method body", name_span));
                }
                (None, false, false, false) => {}
            }
        }

        let mut children = vec![params];
        children.extend(body);
        Ok(self
            .finish(NodeKind::MethodDeclaration, start)
            .with_image(name)
            .with_children(children))
    }

    fn parse_throws(&mut self) -> Result<(), HarnessError> {
        if self.eat(Token::Throws) {
            self.parse_type()?;
            while self.eat(Token::Comma) {
                self.parse_type()?;
            }
        }
        Ok(())
    }

    fn parse_formal_parameters(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::LParen)?.start;
        let mut params = Vec::new();
        while !self.at(Token::RParen) {
            if !params.is_empty() {
                self.expect(Token::Comma)?;
            }
            params.push(self.parse_formal_parameter()?);
        }
        self.expect(Token::RParen)?;
        Ok(self.finish(NodeKind::FormalParameters, start).with_children(params))
    }

    fn parse_formal_parameter(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let (mut children, _) = self.parse_modifiers(false)?;
        let (mut ty, _) = self.parse_type()?;
        if self.at(Token::Ellipsis) {
            let span = self.peek_span();
            self.require(LanguageFeature::VarArgs, span)?;
            self.advance();
            ty.push_str("...");
        }
        let (name, name_span) = self.expect_ident()?;
        self.skip_dims();
        children.push(Node::new(NodeKind::VariableDeclaratorId, name_span).with_image(name));
        Ok(self
            .finish(NodeKind::FormalParameter, start)
            .with_image(ty)
            .with_children(children))
    }

    fn parse_enum(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Enum)?;
        self.require(LanguageFeature::Enums, start)?;
        let (name, _) = self.expect_ident()?;
        if self.eat(Token::Implements) {
            self.parse_type()?;
            while self.eat(Token::Comma) {
                self.parse_type()?;
            }
        }
        self.expect(Token::LBrace)?;

        let mut children = Vec::new();
        while self.at(Token::Ident) || self.at(Token::At) {
            let constant_start = self.peek_span().start;
            let (mut parts, _) = self.parse_modifiers(false)?;
            let (constant, _) = self.expect_ident()?;
            if self.at(Token::LParen) {
                parts.push(self.parse_arguments()?);
            }
            if self.at(Token::LBrace) {
                parts.push(self.parse_class_body(false)?);
            }
            children.push(
                self.finish(NodeKind::EnumConstant, constant_start)
                    .with_image(constant)
                    .with_children(parts),
            );
            if !self.eat(Token::Comma) {
                break;
            }
        }

        if self.eat(Token::Semi) {
            while !self.at(Token::RBrace) && self.peek().is_some() {
                if self.eat(Token::Semi) {
                    continue;
                }
                children.push(self.parse_body_declaration(false)?);
            }
        }
        self.expect(Token::RBrace)?;
        Ok(self
            .finish(NodeKind::EnumDeclaration, start.start)
            .with_image(name)
            .with_children(children))
    }

    // ── Types ───────────────────────────────────────────────────────

    /// A type, rendered back to text: `int[]`, `Map<String, ?>`.
    fn parse_type(&mut self) -> Result<(String, Span), HarnessError> {
        let start = self.peek_span().start;
        let mut text = match self.peek() {
            Some(tok) if tok.is_primitive_type() => {
                self.advance();
                tok.to_string()
            }
            Some(Token::Ident) => self.parse_class_type()?,
            _ => return Err(self.unexpected("type")),
        };
        while self.at(Token::LBracket) && self.peek_at(1) == Some(Token::RBracket) {
            self.pos += 2;
            text.push_str("[]");
        }
        Ok((text, Span::new(start, self.prev_end())))
    }

    fn parse_class_type(&mut self) -> Result<String, HarnessError> {
        let (mut text, _) = self.expect_ident()?;
        loop {
            if self.at(Token::Lt) {
                text.push_str(&self.parse_type_arguments()?);
            }
            if self.at(Token::Dot) && self.peek_at(1) == Some(Token::Ident) {
                self.advance();
                let (segment, _) = self.expect_ident()?;
                text.push('.');
                text.push_str(&segment);
            } else {
                break;
            }
        }
        Ok(text)
    }

    fn parse_type_arguments(&mut self) -> Result<String, HarnessError> {
        self.nested(Self::parse_type_arguments_body)
    }

    fn parse_type_arguments_body(&mut self) -> Result<String, HarnessError> {
        let lt = self.expect(Token::Lt)?;
        self.require(LanguageFeature::Generics, lt)?;
        let mut args = Vec::new();
        loop {
            if self.eat(Token::Question) {
                let mut arg = "?".to_string();
                if self.eat(Token::Extends) {
                    arg.push_str(" extends ");
                    arg.push_str(&self.parse_type()?.0);
                } else if self.eat(Token::Super) {
                    arg.push_str(" super ");
                    arg.push_str(&self.parse_type()?.0);
                }
                args.push(arg);
            } else {
                args.push(self.parse_type()?.0);
            }
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Gt)?;
        Ok(format!("<{}>", args.join(", ")))
    }

    fn skip_dims(&mut self) {
        while self.at(Token::LBracket) && self.peek_at(1) == Some(Token::RBracket) {
            self.pos += 2;
        }
    }

    // ── Blocks and statements ───────────────────────────────────────

    fn parse_block(&mut self) -> Result<Node, HarnessError> {
        self.nested(Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::LBrace)?.start;
        let mut stmts = Vec::new();
        while !self.at(Token::RBrace) && self.peek().is_some() {
            stmts.push(self.parse_block_statement()?);
        }
        self.expect(Token::RBrace)?;
        Ok(self.finish(NodeKind::Block, start).with_children(stmts))
    }

    fn parse_block_statement(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let inner = if self.at_local_variable_declaration() {
            let decl = self.parse_local_variable_declaration()?;
            self.expect(Token::Semi)?;
            decl
        } else if self.at(Token::Class) {
            self.parse_class(false)?
        } else {
            self.parse_statement()?
        };
        Ok(self.finish(NodeKind::BlockStatement, start).with_children(vec![inner]))
    }

    fn at_local_variable_declaration(&mut self) -> bool {
        match self.peek() {
            Some(Token::Final) => true,
            Some(Token::At) => true,
            Some(tok) if tok.is_primitive_type() => self.peek_at(1) != Some(Token::Dot),
            Some(Token::Ident) => self.speculate(|p| {
                p.parse_type()?;
                Ok(p.at(Token::Ident)
                    && matches!(
                        p.peek_at(1),
                        Some(Token::Eq | Token::Semi | Token::Comma | Token::LBracket | Token::Colon)
                    ))
            }),
            _ => false,
        }
    }

    fn parse_local_variable_declaration(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let (mut children, _) = self.parse_modifiers(false)?;
        let (ty, ty_span) = self.parse_type()?;
        if ty == "var" {
            self.require(LanguageFeature::LocalVariableTypeInference, ty_span)?;
        }
        children.push(self.parse_variable_declarator()?);
        while self.eat(Token::Comma) {
            children.push(self.parse_variable_declarator()?);
        }
        Ok(self
            .finish(NodeKind::LocalVariableDeclaration, start)
            .with_image(ty)
            .with_children(children))
    }

    fn parse_variable_declarator(&mut self) -> Result<Node, HarnessError> {
        let (name, span) = self.expect_ident()?;
        self.parse_variable_declarator_rest(name, span)
    }

    fn parse_variable_declarator_rest(&mut self, name: String, name_span: Span) -> Result<Node, HarnessError> {
        self.skip_dims();
        let id = Node::new(NodeKind::VariableDeclaratorId, Span::new(name_span.start, self.prev_end()))
            .with_image(name.clone());
        let mut children = vec![id];
        if self.eat(Token::Eq) {
            children.push(self.parse_variable_initializer()?);
        }
        Ok(self
            .finish(NodeKind::VariableDeclarator, name_span.start)
            .with_image(name)
            .with_children(children))
    }

    fn parse_variable_initializer(&mut self) -> Result<Node, HarnessError> {
        let inner = if self.at(Token::LBrace) {
            self.parse_array_initializer()?
        } else {
            self.parse_expression()?
        };
        Ok(Node::wrap(NodeKind::VariableInitializer, inner))
    }

    fn parse_array_initializer(&mut self) -> Result<Node, HarnessError> {
        self.nested(Self::parse_array_initializer_body)
    }

    fn parse_array_initializer_body(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::LBrace)?.start;
        let mut elements = Vec::new();
        while !self.at(Token::RBrace) {
            elements.push(self.parse_variable_initializer()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(self.finish(NodeKind::ArrayInitializer, start).with_children(elements))
    }

    fn parse_statement(&mut self) -> Result<Node, HarnessError> {
        self.nested(Self::parse_statement_body)
    }

    fn parse_statement_body(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let inner = match self.peek() {
            Some(Token::LBrace) => self.parse_block()?,
            Some(Token::Semi) => {
                let span = self.expect(Token::Semi)?;
                Node::new(NodeKind::EmptyStatement, span)
            }
            Some(Token::If) => self.parse_if()?,
            Some(Token::While) => self.parse_while()?,
            Some(Token::Do) => self.parse_do()?,
            Some(Token::For) => self.parse_for()?,
            Some(Token::Return) => self.parse_return()?,
            Some(Token::Break) => self.parse_jump(Token::Break, NodeKind::BreakStatement)?,
            Some(Token::Continue) => self.parse_jump(Token::Continue, NodeKind::ContinueStatement)?,
            Some(Token::Throw) => {
                self.advance();
                let value = self.parse_expression()?;
                self.expect(Token::Semi)?;
                self.finish(NodeKind::ThrowStatement, start).with_children(vec![value])
            }
            Some(Token::Assert) => self.parse_assert()?,
            Some(Token::Switch) => self.parse_switch()?,
            Some(Token::Try) => self.parse_try()?,
            _ => {
                let expr = self.parse_statement_expression()?;
                self.expect(Token::Semi)?;
                expr
            }
        };
        Ok(self.finish(NodeKind::Statement, start).with_children(vec![inner]))
    }

    fn parse_paren_expression(&mut self) -> Result<Node, HarnessError> {
        self.expect(Token::LParen)?;
        let expr = self.parse_expression()?;
        self.expect(Token::RParen)?;
        Ok(expr)
    }

    fn parse_if(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::If)?.start;
        let mut children = vec![self.parse_paren_expression()?, self.parse_statement()?];
        if self.eat(Token::Else) {
            children.push(self.parse_statement()?);
        }
        Ok(self.finish(NodeKind::IfStatement, start).with_children(children))
    }

    fn parse_while(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::While)?.start;
        let cond = self.parse_paren_expression()?;
        let body = self.parse_statement()?;
        Ok(self.finish(NodeKind::WhileStatement, start).with_children(vec![cond, body]))
    }

    fn parse_do(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Do)?.start;
        let body = self.parse_statement()?;
        self.expect(Token::While)?;
        let cond = self.parse_paren_expression()?;
        self.expect(Token::Semi)?;
        Ok(self.finish(NodeKind::DoStatement, start).with_children(vec![body, cond]))
    }

    fn parse_for(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::For)?.start;
        self.expect(Token::LParen)?;

        let enhanced = self.speculate(|p| {
            p.parse_modifiers(false)?;
            p.parse_type()?;
            p.expect_ident()?;
            Ok(p.at(Token::Colon))
        });

        let mut children = Vec::new();
        if enhanced {
            let decl_start = self.peek_span().start;
            self.require(LanguageFeature::EnhancedFor, Span::new(start, start + 3))?;
            let (mut parts, _) = self.parse_modifiers(false)?;
            let (ty, _) = self.parse_type()?;
            parts.push(self.parse_variable_declarator()?);
            children.push(
                self.finish(NodeKind::LocalVariableDeclaration, decl_start)
                    .with_image(ty)
                    .with_children(parts),
            );
            self.expect(Token::Colon)?;
            children.push(self.parse_expression()?);
        } else {
            if !self.at(Token::Semi) {
                let init_start = self.peek_span().start;
                let init = if self.at_local_variable_declaration() {
                    vec![self.parse_local_variable_declaration()?]
                } else {
                    self.parse_statement_expression_list()?
                };
                children.push(self.finish(NodeKind::ForInit, init_start).with_children(init));
            }
            self.expect(Token::Semi)?;
            if !self.at(Token::Semi) {
                children.push(self.parse_expression()?);
            }
            self.expect(Token::Semi)?;
            if !self.at(Token::RParen) {
                let update_start = self.peek_span().start;
                let update = self.parse_statement_expression_list()?;
                children.push(self.finish(NodeKind::ForUpdate, update_start).with_children(update));
            }
        }

        self.expect(Token::RParen)?;
        children.push(self.parse_statement()?);
        Ok(self.finish(NodeKind::ForStatement, start).with_children(children))
    }

    fn parse_statement_expression_list(&mut self) -> Result<Vec<Node>, HarnessError> {
        let mut list = vec![self.parse_statement_expression()?];
        while self.eat(Token::Comma) {
            list.push(self.parse_statement_expression()?);
        }
        Ok(list)
    }

    /// An expression allowed on its own as a statement: an assignment,
    /// increment, decrement, method call or instance creation.
    fn parse_statement_expression(&mut self) -> Result<Node, HarnessError> {
        let expr = self.parse_expr_inner()?;
        let allowed = match expr.kind {
            NodeKind::AssignmentExpression
            | NodeKind::PreIncrementExpression
            | NodeKind::PreDecrementExpression
            | NodeKind::PostfixExpression => true,
            NodeKind::PrimaryExpression => is_call_or_allocation(&expr),
            _ => false,
        };
        if !allowed {
            return Err(self.error("not a statement", expr.span));
        }
        Ok(Node::wrap(NodeKind::StatementExpression, expr))
    }

    fn parse_return(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Return)?.start;
        let mut children = Vec::new();
        if !self.at(Token::Semi) {
            children.push(self.parse_expression()?);
        }
        self.expect(Token::Semi)?;
        Ok(self.finish(NodeKind::ReturnStatement, start).with_children(children))
    }

    fn parse_jump(&mut self, keyword: Token, kind: NodeKind) -> Result<Node, HarnessError> {
        let start = self.expect(keyword)?.start;
        let label = if self.at(Token::Ident) {
            Some(self.expect_ident()?.0)
        } else {
            None
        };
        self.expect(Token::Semi)?;
        let node = self.finish(kind, start);
        Ok(match label {
            Some(label) => node.with_image(label),
            None => node,
        })
    }

    fn parse_assert(&mut self) -> Result<Node, HarnessError> {
        let span = self.expect(Token::Assert)?;
        self.require(LanguageFeature::AssertStatements, span)?;
        let mut children = vec![self.parse_expression()?];
        if self.eat(Token::Colon) {
            children.push(self.parse_expression()?);
        }
        self.expect(Token::Semi)?;
        Ok(self.finish(NodeKind::AssertStatement, span.start).with_children(children))
    }

    fn parse_switch(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Switch)?.start;
        let mut children = vec![self.parse_paren_expression()?];
        self.expect(Token::LBrace)?;
        while !self.at(Token::RBrace) && self.peek().is_some() {
            match self.peek() {
                Some(Token::Case) => {
                    let label_start = self.expect(Token::Case)?.start;
                    let value = self.parse_expression()?;
                    self.expect(Token::Colon)?;
                    children.push(
                        self.finish(NodeKind::SwitchLabel, label_start)
                            .with_children(vec![value]),
                    );
                }
                Some(Token::Default) => {
                    let label_start = self.expect(Token::Default)?.start;
                    self.expect(Token::Colon)?;
                    children.push(self.finish(NodeKind::SwitchLabel, label_start).with_image("default"));
                }
                _ => children.push(self.parse_block_statement()?),
            }
        }
        self.expect(Token::RBrace)?;
        Ok(self.finish(NodeKind::SwitchStatement, start).with_children(children))
    }

    fn parse_try(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Try)?.start;
        let mut children = Vec::new();

        if self.at(Token::LParen) {
            let spec_span = self.peek_span();
            self.require(LanguageFeature::TryWithResources, spec_span)?;
            children.push(self.parse_resource_specification()?);
        }
        children.push(self.parse_block()?);

        while self.at(Token::Catch) {
            children.push(self.parse_catch()?);
        }
        if self.at(Token::Finally) {
            let finally_start = self.expect(Token::Finally)?.start;
            let block = self.parse_block()?;
            children.push(self.finish(NodeKind::FinallyStatement, finally_start).with_children(vec![block]));
        }

        if children.len() == 1 {
            return Err(self.error(
                "'try' without 'catch', 'finally' or resource declarations",
                Span::new(start, start + 3),
            ));
        }
        Ok(self.finish(NodeKind::TryStatement, start).with_children(children))
    }

    fn parse_resource_specification(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::LParen)?.start;
        let mut resources = Vec::new();
        while !self.at(Token::RParen) {
            let resource_start = self.peek_span().start;
            let (mut parts, _) = self.parse_modifiers(false)?;
            let (ty, ty_span) = self.parse_type()?;
            if ty == "var" {
                self.require(LanguageFeature::LocalVariableTypeInference, ty_span)?;
            }
            let (name, name_span) = self.expect_ident()?;
            parts.push(Node::new(NodeKind::VariableDeclaratorId, name_span).with_image(name));
            self.expect(Token::Eq)?;
            parts.push(self.parse_expression()?);
            resources.push(
                self.finish(NodeKind::Resource, resource_start)
                    .with_image(ty)
                    .with_children(parts),
            );
            if !self.eat(Token::Semi) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(self.finish(NodeKind::ResourceSpecification, start).with_children(resources))
    }

    fn parse_catch(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::Catch)?.start;
        self.expect(Token::LParen)?;
        self.parse_modifiers(false)?;
        let (first, first_span) = self.parse_type()?;
        let mut types = vec![first];
        while self.at(Token::Pipe) {
            self.advance();
            types.push(self.parse_type()?.0);
        }
        if types.len() > 1 {
            self.require(LanguageFeature::MultiCatch, Span::new(first_span.start, self.prev_end()))?;
        }
        let (name, name_span) = self.expect_ident()?;
        self.expect(Token::RParen)?;
        let block = self.parse_block()?;
        Ok(self
            .finish(NodeKind::CatchStatement, start)
            .with_image(types.join(" | "))
            .with_children(vec![Node::new(NodeKind::VariableDeclaratorId, name_span).with_image(name), block]))
    }

    // ── Expressions ─────────────────────────────────────────────────

    /// A full expression under an `Expression` node.
    pub fn parse_expression(&mut self) -> Result<Node, HarnessError> {
        let inner = self.parse_expr_inner()?;
        Ok(Node::wrap(NodeKind::Expression, inner))
    }

    fn parse_expr_inner(&mut self) -> Result<Node, HarnessError> {
        self.nested(Self::parse_assignment_or_lambda)
    }

    fn parse_assignment_or_lambda(&mut self) -> Result<Node, HarnessError> {
        if self.at_lambda() {
            return self.parse_lambda();
        }
        let lhs = self.parse_conditional()?;
        match self.assignment_operator() {
            Some(op) => {
                let rhs = self.parse_expr_inner()?;
                let span = lhs.span.to(rhs.span);
                Ok(Node::new(NodeKind::AssignmentExpression, span)
                    .with_image(op)
                    .with_children(vec![lhs, rhs]))
            }
            None => Ok(lhs),
        }
    }

    /// Consume an assignment operator, if one is next.
    fn assignment_operator(&mut self) -> Option<&'static str> {
        let (op, width) = match self.peek()? {
            Token::Eq => ("=", 1),
            Token::PlusEq => ("+=", 1),
            Token::MinusEq => ("-=", 1),
            Token::StarEq => ("*=", 1),
            Token::SlashEq => ("/=", 1),
            Token::PercentEq => ("%=", 1),
            Token::AmpEq => ("&=", 1),
            Token::PipeEq => ("|=", 1),
            Token::CaretEq => ("^=", 1),
            Token::ShlEq => ("<<=", 1),
            Token::Gt if self.adjacent(0) => match (self.peek_at(1), self.peek_at(2)) {
                (Some(Token::GtEq), _) => (">>=", 2),
                (Some(Token::Gt), Some(Token::GtEq)) if self.adjacent(1) => (">>>=", 3),
                _ => return None,
            },
            _ => return None,
        };
        self.pos += width;
        Some(op)
    }

    fn parse_conditional(&mut self) -> Result<Node, HarnessError> {
        let cond = self.parse_binary(0)?;
        if !self.eat(Token::Question) {
            return Ok(cond);
        }
        let then = self.parse_expr_inner()?;
        self.expect(Token::Colon)?;
        let otherwise = if self.at_lambda() {
            self.parse_lambda()?
        } else {
            self.parse_conditional()?
        };
        let span = cond.span.to(otherwise.span);
        Ok(Node::new(NodeKind::ConditionalExpression, span).with_children(vec![cond, then, otherwise]))
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<Node, HarnessError> {
        let mut lhs = self.parse_unary()?;

        while let Some((op, kind, bp, width)) = self.peek_binary_operator() {
            if bp < min_bp {
                break;
            }
            self.pos += width;

            if kind == NodeKind::InstanceOfExpression {
                let (ty, ty_span) = self.parse_type()?;
                let span = lhs.span.to(ty_span);
                lhs = Node::new(kind, span).with_image(ty).with_children(vec![lhs]);
                continue;
            }

            let rhs = self.parse_binary(bp + 1)?;
            let span = lhs.span.to(rhs.span);
            lhs = Node::new(kind, span).with_image(op).with_children(vec![lhs, rhs]);
        }

        Ok(lhs)
    }

    /// Operator text, node kind, binding power and token count of the
    /// binary operator at the cursor.
    fn peek_binary_operator(&self) -> Option<(&'static str, NodeKind, u8, usize)> {
        use NodeKind::*;
        let op = match self.peek()? {
            Token::PipePipe => ("||", ConditionalOrExpression, 1, 1),
            Token::AmpAmp => ("&&", ConditionalAndExpression, 2, 1),
            Token::Pipe => ("|", InclusiveOrExpression, 3, 1),
            Token::Caret => ("^", ExclusiveOrExpression, 4, 1),
            Token::Amp => ("&", AndExpression, 5, 1),
            Token::EqEq => ("==", EqualityExpression, 6, 1),
            Token::BangEq => ("!=", EqualityExpression, 6, 1),
            Token::Lt => ("<", RelationalExpression, 7, 1),
            Token::LtEq => ("<=", RelationalExpression, 7, 1),
            Token::GtEq => (">=", RelationalExpression, 7, 1),
            Token::Instanceof => ("instanceof", InstanceOfExpression, 7, 1),
            Token::Gt => {
                if self.adjacent(0) {
                    match (self.peek_at(1), self.peek_at(2)) {
                        // compound assignments, not operators
                        (Some(Token::GtEq), _) => return None,
                        (Some(Token::Gt), Some(Token::GtEq)) if self.adjacent(1) => return None,
                        (Some(Token::Gt), Some(Token::Gt)) if self.adjacent(1) => (">>>", ShiftExpression, 8, 3),
                        (Some(Token::Gt), _) => (">>", ShiftExpression, 8, 2),
                        _ => (">", RelationalExpression, 7, 1),
                    }
                } else {
                    (">", RelationalExpression, 7, 1)
                }
            }
            Token::Shl => ("<<", ShiftExpression, 8, 1),
            Token::Plus => ("+", AdditiveExpression, 9, 1),
            Token::Minus => ("-", AdditiveExpression, 9, 1),
            Token::Star => ("*", MultiplicativeExpression, 10, 1),
            Token::Slash => ("/", MultiplicativeExpression, 10, 1),
            Token::Percent => ("%", MultiplicativeExpression, 10, 1),
            _ => return None,
        };
        Some(op)
    }

    fn parse_unary(&mut self) -> Result<Node, HarnessError> {
        self.nested(Self::parse_unary_body)
    }

    fn parse_unary_body(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span();
        let (kind, image) = match self.peek() {
            Some(Token::Plus) => (NodeKind::UnaryExpression, Some("+")),
            Some(Token::Minus) => (NodeKind::UnaryExpression, Some("-")),
            Some(Token::PlusPlus) => (NodeKind::PreIncrementExpression, None),
            Some(Token::MinusMinus) => (NodeKind::PreDecrementExpression, None),
            Some(Token::Bang) => (NodeKind::UnaryExpressionNotPlusMinus, Some("!")),
            Some(Token::Tilde) => (NodeKind::UnaryExpressionNotPlusMinus, Some("~")),
            Some(Token::LParen) if self.at_cast() => return self.parse_cast(),
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        let node = Node::new(kind, start.to(operand.span)).with_children(vec![operand]);
        Ok(match image {
            Some(op) => node.with_image(op),
            None => node,
        })
    }

    fn at_cast(&mut self) -> bool {
        if self.peek_at(1).is_some_and(Token::is_primitive_type) {
            return self.speculate(|p| {
                p.expect(Token::LParen)?;
                p.parse_type()?;
                p.expect(Token::RParen)?;
                Ok(true)
            });
        }
        self.speculate(|p| {
            p.expect(Token::LParen)?;
            p.parse_type()?;
            p.expect(Token::RParen)?;
            Ok(match p.peek() {
                Some(tok) if tok.is_literal() => true,
                Some(
                    Token::Ident
                    | Token::LParen
                    | Token::Bang
                    | Token::Tilde
                    | Token::This
                    | Token::Super
                    | Token::New,
                ) => true,
                Some(tok) => tok.is_primitive_type(),
                None => false,
            })
        })
    }

    fn parse_cast(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::LParen)?.start;
        let (ty, _) = self.parse_type()?;
        self.expect(Token::RParen)?;
        let operand = if self.at_lambda() {
            self.parse_lambda()?
        } else {
            self.parse_unary()?
        };
        Ok(self
            .finish(NodeKind::CastExpression, start)
            .with_image(ty)
            .with_children(vec![operand]))
    }

    fn parse_postfix(&mut self) -> Result<Node, HarnessError> {
        let primary = self.parse_primary()?;
        let op = match self.peek() {
            Some(Token::PlusPlus) => "++",
            Some(Token::MinusMinus) => "--",
            _ => return Ok(primary),
        };
        self.advance();
        let start = primary.span.start;
        Ok(self
            .finish(NodeKind::PostfixExpression, start)
            .with_image(op)
            .with_children(vec![primary]))
    }

    fn parse_primary(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let mut children = vec![self.parse_primary_prefix()?];

        loop {
            let suffix_start = self.peek_span().start;
            let suffix = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Dot), Some(Token::Ident)) => {
                    self.advance();
                    let (name, _) = self.expect_ident()?;
                    self.finish(NodeKind::PrimarySuffix, suffix_start).with_image(name)
                }
                (Some(Token::Dot), Some(Token::This)) => {
                    self.pos += 2;
                    self.finish(NodeKind::PrimarySuffix, suffix_start).with_image("this")
                }
                (Some(Token::Dot), Some(Token::Class)) => {
                    self.pos += 2;
                    self.finish(NodeKind::PrimarySuffix, suffix_start).with_image("class")
                }
                (Some(Token::LParen), _) => {
                    let args = self.parse_arguments()?;
                    Node::wrap(NodeKind::PrimarySuffix, args)
                }
                (Some(Token::LBracket), _) => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    self.finish(NodeKind::PrimarySuffix, suffix_start).with_children(vec![index])
                }
                (Some(Token::ColonColon), _) => {
                    let span = self.expect(Token::ColonColon)?;
                    self.require(LanguageFeature::MethodReferences, span)?;
                    let name = if self.eat(Token::New) {
                        "new".to_string()
                    } else {
                        self.expect_ident()?.0
                    };
                    let reference = self.finish(NodeKind::MethodReference, span.start).with_image(name);
                    Node::wrap(NodeKind::PrimarySuffix, reference)
                }
                _ => break,
            };
            children.push(suffix);
        }

        Ok(self.finish(NodeKind::PrimaryExpression, start).with_children(children))
    }

    fn parse_primary_prefix(&mut self) -> Result<Node, HarnessError> {
        let span = self.peek_span();
        match self.peek() {
            Some(tok) if tok.is_literal() => {
                self.advance();
                let literal = Node::new(NodeKind::Literal, span).with_image(self.text(span));
                Ok(Node::wrap(NodeKind::PrimaryPrefix, literal))
            }
            Some(Token::This) => {
                self.advance();
                Ok(Node::new(NodeKind::PrimaryPrefix, span).with_image("this"))
            }
            Some(Token::Super) => {
                self.advance();
                let mut image = "super".to_string();
                if self.at(Token::Dot) && self.peek_at(1) == Some(Token::Ident) {
                    self.advance();
                    image.push('.');
                    image.push_str(&self.expect_ident()?.0);
                }
                Ok(self.finish(NodeKind::PrimaryPrefix, span.start).with_image(image))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(self.finish(NodeKind::PrimaryPrefix, span.start).with_children(vec![inner]))
            }
            Some(Token::New) => {
                let allocation = self.parse_allocation()?;
                Ok(Node::wrap(NodeKind::PrimaryPrefix, allocation))
            }
            Some(Token::Ident) => {
                let (name, name_span) = self.parse_qualified_name()?;
                let name = Node::new(NodeKind::Name, name_span).with_image(name);
                Ok(Node::wrap(NodeKind::PrimaryPrefix, name))
            }
            Some(tok) if tok.is_primitive_type() || tok == Token::Void => {
                // `int.class`, `int[].class`
                self.advance();
                let mut image = tok.to_string();
                while self.at(Token::LBracket) && self.peek_at(1) == Some(Token::RBracket) {
                    self.pos += 2;
                    image.push_str("[]");
                }
                self.expect(Token::Dot)?;
                self.expect(Token::Class)?;
                image.push_str(".class");
                Ok(self.finish(NodeKind::PrimaryPrefix, span.start).with_image(image))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::LParen)?.start;
        if self.eat(Token::RParen) {
            return Ok(self.finish(NodeKind::Arguments, start));
        }
        let list_start = self.peek_span().start;
        let mut args = vec![self.parse_expression()?];
        while self.eat(Token::Comma) {
            args.push(self.parse_expression()?);
        }
        let list = self.finish(NodeKind::ArgumentList, list_start).with_children(args);
        self.expect(Token::RParen)?;
        Ok(self.finish(NodeKind::Arguments, start).with_children(vec![list]))
    }

    fn parse_allocation(&mut self) -> Result<Node, HarnessError> {
        let start = self.expect(Token::New)?.start;

        let ty = match self.peek() {
            Some(tok) if tok.is_primitive_type() => {
                self.advance();
                let ty = tok.to_string();
                let dims = self.parse_array_dims_and_inits()?;
                return Ok(self
                    .finish(NodeKind::AllocationExpression, start)
                    .with_image(ty)
                    .with_children(vec![dims]));
            }
            Some(Token::Ident) => self.parse_allocated_class_type()?,
            _ => return Err(self.unexpected("type after 'new'")),
        };

        let mut children = Vec::new();
        if self.at(Token::LBracket) {
            children.push(self.parse_array_dims_and_inits()?);
        } else {
            children.push(self.parse_arguments()?);
            if self.at(Token::LBrace) {
                children.push(self.parse_class_body(false)?);
            }
        }
        Ok(self
            .finish(NodeKind::AllocationExpression, start)
            .with_image(ty)
            .with_children(children))
    }

    /// Class type after `new`, where `<>` is allowed.
    fn parse_allocated_class_type(&mut self) -> Result<String, HarnessError> {
        let (mut text, _) = self.expect_ident()?;
        loop {
            if self.at(Token::Lt) && self.peek_at(1) == Some(Token::Gt) {
                let span = self.peek_span().to(self.tokens[self.pos + 1].span);
                self.require(LanguageFeature::DiamondOperator, span)?;
                self.pos += 2;
                text.push_str("<>");
            } else if self.at(Token::Lt) {
                text.push_str(&self.parse_type_arguments()?);
            }
            if self.at(Token::Dot) && self.peek_at(1) == Some(Token::Ident) {
                self.advance();
                text.push('.');
                text.push_str(&self.expect_ident()?.0);
            } else {
                break;
            }
        }
        Ok(text)
    }

    fn parse_array_dims_and_inits(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span().start;
        let mut dims = String::new();
        let mut sizes = Vec::new();
        while self.at(Token::LBracket) {
            self.advance();
            if self.eat(Token::RBracket) {
                dims.push_str("[]");
                continue;
            }
            if dims.len() > sizes.len() * 2 {
                return Err(self.error("array dimension missing", self.peek_span()));
            }
            sizes.push(self.parse_expression()?);
            self.expect(Token::RBracket)?;
            dims.push_str("[]");
        }
        if dims.is_empty() {
            return Err(self.unexpected("["));
        }
        if sizes.is_empty() {
            let init = self.parse_array_initializer()?;
            return Ok(self
                .finish(NodeKind::ArrayDimsAndInits, start)
                .with_image(dims)
                .with_children(vec![init]));
        }
        Ok(self
            .finish(NodeKind::ArrayDimsAndInits, start)
            .with_image(dims)
            .with_children(sizes))
    }

    // ── Lambdas ─────────────────────────────────────────────────────

    fn at_lambda(&self) -> bool {
        match self.peek() {
            Some(Token::Ident) => self.peek_at(1) == Some(Token::Arrow),
            Some(Token::LParen) => {
                let mut depth = 0usize;
                for (i, tok) in self.tokens[self.pos..].iter().enumerate() {
                    match tok.node {
                        Token::LParen => depth += 1,
                        Token::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                return self.peek_at(i + 1) == Some(Token::Arrow);
                            }
                        }
                        _ => {}
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn parse_lambda(&mut self) -> Result<Node, HarnessError> {
        let start = self.peek_span();
        self.require(LanguageFeature::LambdaExpressions, start)?;

        let mut children = Vec::new();
        if self.at(Token::Ident) {
            let (name, span) = self.expect_ident()?;
            children.push(Node::new(NodeKind::VariableDeclaratorId, span).with_image(name));
        } else {
            self.expect(Token::LParen)?;
            let untyped = self.at(Token::Ident) && matches!(self.peek_at(1), Some(Token::Comma | Token::RParen));
            while !self.at(Token::RParen) {
                if !children.is_empty() {
                    self.expect(Token::Comma)?;
                }
                if untyped {
                    let (name, span) = self.expect_ident()?;
                    children.push(Node::new(NodeKind::VariableDeclaratorId, span).with_image(name));
                } else {
                    let param_start = self.peek_span().start;
                    let (mut parts, _) = self.parse_modifiers(false)?;
                    let (ty, ty_span) = self.parse_type()?;
                    if ty == "var" {
                        self.require(LanguageFeature::VarInLambdaParameters, ty_span)?;
                    }
                    let (name, span) = self.expect_ident()?;
                    parts.push(Node::new(NodeKind::VariableDeclaratorId, span).with_image(name));
                    children.push(
                        self.finish(NodeKind::FormalParameter, param_start)
                            .with_image(ty)
                            .with_children(parts),
                    );
                }
            }
            self.expect(Token::RParen)?;
        }

        self.expect(Token::Arrow)?;
        children.push(if self.at(Token::LBrace) {
            self.parse_block()?
        } else {
            self.parse_expression()?
        });
        Ok(self.finish(NodeKind::LambdaExpression, start.start).with_children(children))
    }
}

/// A primary expression that ends in a call, or is a bare `new`.
fn is_call_or_allocation(expr: &Node) -> bool {
    let ends_in_call = expr
        .children
        .last()
        .is_some_and(|s| s.is(NodeKind::PrimarySuffix) && s.child(0).is_some_and(|a| a.is(NodeKind::Arguments)));
    let is_allocation = expr.num_children() == 1
        && expr
            .child(0)
            .and_then(|prefix| prefix.child(0))
            .is_some_and(|n| n.is(NodeKind::AllocationExpression));
    ends_in_call || is_allocation
}
