//! Per-test parsing state: version, imports and the wrap/parse/locate
//! helpers test bodies call.

use std::rc::Rc;

use crate::config::HarnessConfig;
use crate::diagnostics::HarnessError;
use crate::locate::find_on_straight_line;
use crate::matcher::{NodeWrapper, match_node};
use crate::parser::node::{Node, NodeKind};
use crate::parser::{JavaParser, ParseInvoker};
use crate::version::JavaVersion;
use crate::wrap::{FragmentKind, check_embeddable, wrap_expression, wrap_statement};

/// A type a test imports by reference rather than by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    simple: String,
    canonical: Option<String>,
}

impl TypeRef {
    /// A top-level or member type with a fully qualified name. An empty
    /// package means the default package.
    pub fn new(package: &str, simple: &str) -> Self {
        let canonical = if package.is_empty() {
            simple.to_string()
        } else {
            format!("{package}.{simple}")
        };
        Self {
            simple: simple.to_string(),
            canonical: Some(canonical),
        }
    }

    /// A local or anonymous type. It has no canonical name and is never
    /// turned into an import line.
    pub fn local(simple: &str) -> Self {
        Self {
            simple: simple.to_string(),
            canonical: None,
        }
    }

    pub fn simple_name(&self) -> &str {
        &self.simple
    }

    pub fn canonical_name(&self) -> Option<&str> {
        self.canonical.as_deref()
    }
}

/// State for one generated test instance.
///
/// The version is fixed at construction. Imports can be added until the
/// first parse; afterwards they are frozen so every parse in the instance
/// sees the same unit header.
pub struct ParsingContext {
    version: JavaVersion,
    config: HarnessConfig,
    parser: Rc<dyn ParseInvoker>,
    imported_types: Vec<TypeRef>,
    other_imports: Vec<String>,
    parsed: bool,
}

impl ParsingContext {
    pub fn new(version: JavaVersion) -> Self {
        Self {
            version,
            config: HarnessConfig::default(),
            parser: Rc::new(JavaParser),
            imported_types: Vec::new(),
            other_imports: Vec::new(),
            parsed: false,
        }
    }

    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_parser(mut self, parser: Rc<dyn ParseInvoker>) -> Self {
        self.parser = parser;
        self
    }

    pub fn version(&self) -> JavaVersion {
        self.version
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn import_type(&mut self, ty: TypeRef) -> Result<(), HarnessError> {
        self.ensure_imports_open("type import")?;
        self.imported_types.push(ty);
        Ok(())
    }

    /// Add a raw import, written as it follows the `import` keyword:
    /// `java.util.*` or `static java.lang.Math.max`.
    pub fn import(&mut self, name: impl Into<String>) -> Result<(), HarnessError> {
        self.ensure_imports_open("import")?;
        self.other_imports.push(name.into());
        Ok(())
    }

    fn ensure_imports_open(&self, what: &str) -> Result<(), HarnessError> {
        if self.parsed {
            return Err(HarnessError::malformed(format!(
                "cannot add {what} after the first parse in this test"
            )));
        }
        Ok(())
    }

    /// Import declarations for the wrapped unit, typed imports first.
    pub fn imports(&self) -> Vec<String> {
        self.imported_types
            .iter()
            .filter_map(TypeRef::canonical_name)
            .chain(self.other_imports.iter().map(String::as_str))
            .map(|name| format!("import {name};"))
            .collect()
    }

    /// Parse a complete unit under this context's version.
    pub fn parse_unit(&mut self, source: &str) -> Result<Node, HarnessError> {
        self.parsed = true;
        tracing::debug!(version = %self.version, "parsing unit");
        self.parser.parse(source, self.version)
    }

    /// The `Expression` node holding `expr` once wrapped and parsed.
    pub fn parse_ast_expression(&mut self, expr: &str) -> Result<Node, HarnessError> {
        check_embeddable(expr, FragmentKind::Expression)?;
        let source = wrap_expression(expr, &self.imports());
        let unit = self.parse_unit(&source)?;
        unit.first_descendant(NodeKind::VariableInitializer)
            .and_then(|init| init.child(0))
            .cloned()
            .ok_or_else(|| HarnessError::node_not_found(NodeKind::VariableInitializer, expr))
    }

    /// The `BlockStatement` holding `stmt` once wrapped and parsed.
    pub fn parse_ast_statement(&mut self, stmt: &str) -> Result<Node, HarnessError> {
        check_embeddable(stmt, FragmentKind::Statement)?;
        let source = wrap_statement(stmt, &self.imports());
        let unit = self.parse_unit(&source)?;
        unit.first_descendant(NodeKind::BlockStatement)
            .cloned()
            .ok_or_else(|| HarnessError::node_not_found(NodeKind::BlockStatement, stmt))
    }

    /// Parse `expr` and descend to the first `kind` node on its straight
    /// line.
    pub fn parse_expression(&mut self, expr: &str, kind: NodeKind) -> Result<Node, HarnessError> {
        self.parse_expression_where(expr, kind.name(), |n| n.is(kind))
    }

    /// Like [`parse_expression`](Self::parse_expression) with an arbitrary
    /// predicate; `what` names the target in errors.
    pub fn parse_expression_where<P>(&mut self, expr: &str, what: &str, predicate: P) -> Result<Node, HarnessError>
    where
        P: Fn(&Node) -> bool,
    {
        let root = self.parse_ast_expression(expr)?;
        self.locate(&root, expr, what, predicate)
    }

    pub fn parse_statement(&mut self, stmt: &str, kind: NodeKind) -> Result<Node, HarnessError> {
        self.parse_statement_where(stmt, kind.name(), |n| n.is(kind))
    }

    pub fn parse_statement_where<P>(&mut self, stmt: &str, what: &str, predicate: P) -> Result<Node, HarnessError>
    where
        P: Fn(&Node) -> bool,
    {
        let root = self.parse_ast_statement(stmt)?;
        self.locate(&root, stmt, what, predicate)
    }

    fn locate<P>(&self, root: &Node, fragment: &str, what: &str, predicate: P) -> Result<Node, HarnessError>
    where
        P: Fn(&Node) -> bool,
    {
        find_on_straight_line(root, self.config.max_descent_depth, predicate)
            .cloned()
            .ok_or_else(|| {
                tracing::debug!(target_kind = what, fragment, "node not on straight line");
                HarnessError::node_not_found(what, fragment)
            })
    }

    /// Structural matcher over expression fragments whose located node is
    /// a `kind`.
    pub fn match_expr(&mut self, kind: NodeKind) -> FragmentMatcher<'_> {
        FragmentMatcher {
            ctx: self,
            fragment_kind: FragmentKind::Expression,
            kind,
            ignore_children: false,
        }
    }

    /// Structural matcher over statement fragments.
    pub fn match_stmt(&mut self, kind: NodeKind) -> FragmentMatcher<'_> {
        FragmentMatcher {
            ctx: self,
            fragment_kind: FragmentKind::Statement,
            kind,
            ignore_children: false,
        }
    }
}

/// Adapter returned by [`ParsingContext::match_expr`] and
/// [`ParsingContext::match_stmt`].
pub struct FragmentMatcher<'c> {
    ctx: &'c mut ParsingContext,
    fragment_kind: FragmentKind,
    kind: NodeKind,
    ignore_children: bool,
}

impl FragmentMatcher<'_> {
    /// Leave the located node's children unconstrained beyond what the
    /// spec checks.
    pub fn ignoring_children(mut self) -> Self {
        self.ignore_children = true;
        self
    }

    /// Wrap, parse and locate `fragment`, then match the located node.
    pub fn test<F>(self, fragment: &str, spec: F) -> Result<(), HarnessError>
    where
        F: FnOnce(&mut NodeWrapper<'_>) -> Result<(), HarnessError>,
    {
        let kind = self.kind;
        let node = match self.fragment_kind {
            FragmentKind::Expression => self.ctx.parse_expression(fragment, kind)?,
            FragmentKind::Statement => self.ctx.parse_statement(fragment, kind)?,
        };
        match_node(&node, kind, self.ignore_children, spec)
    }
}
