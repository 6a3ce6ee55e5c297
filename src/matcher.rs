//! Child-by-child structural assertions on parsed nodes.
//!
//! A spec closure receives a [`NodeWrapper`] for the node under test and
//! describes its children in order:
//!
//! ```rust
//! use jfrag::matcher::match_node;
//! use jfrag::parser::node::{Node, NodeKind};
//! use jfrag::span::Span;
//!
//! let lit = |text: &str| {
//!     Node::wrap(NodeKind::PrimaryExpression, Node::new(NodeKind::Literal, Span::dummy()).with_image(text))
//! };
//! let sum = Node::new(NodeKind::AdditiveExpression, Span::dummy())
//!     .with_image("+")
//!     .with_children(vec![lit("1"), lit("2")]);
//!
//! match_node(&sum, NodeKind::AdditiveExpression, false, |n| {
//!     n.image_is("+")?;
//!     n.child(NodeKind::PrimaryExpression, |p| p.child(NodeKind::Literal, |l| l.image_is("1")))?;
//!     n.child(NodeKind::PrimaryExpression, |p| p.child(NodeKind::Literal, |l| l.image_is("2")))
//! })
//! .unwrap();
//! ```

use crate::diagnostics::HarnessError;
use crate::parser::node::{Node, NodeKind};

/// Check that `node` is a `kind` and satisfies `spec`. Unless
/// `ignore_children` is set, `spec` must account for every child.
pub fn match_node<F>(node: &Node, kind: NodeKind, ignore_children: bool, spec: F) -> Result<(), HarnessError>
where
    F: FnOnce(&mut NodeWrapper<'_>) -> Result<(), HarnessError>,
{
    match_at(node, kind, ignore_children, spec, kind.name().to_string())
}

fn match_at<F>(node: &Node, kind: NodeKind, ignore_children: bool, spec: F, path: String) -> Result<(), HarnessError>
where
    F: FnOnce(&mut NodeWrapper<'_>) -> Result<(), HarnessError>,
{
    if !node.is(kind) {
        return Err(HarnessError::mismatch(path, format!("expected {kind}, found {}", node.kind)));
    }

    let mut wrapper = NodeWrapper {
        node,
        path,
        next_child: 0,
    };
    spec(&mut wrapper)?;

    let remaining = node.num_children() - wrapper.next_child;
    if !ignore_children && remaining > 0 {
        let next = &node.children[wrapper.next_child];
        return Err(HarnessError::mismatch(
            wrapper.path,
            format!("{remaining} unmatched child node(s), starting with {}", next.kind),
        ));
    }
    Ok(())
}

/// The node under test inside a [`match_node`] spec.
pub struct NodeWrapper<'n> {
    node: &'n Node,
    path: String,
    next_child: usize,
}

impl<'n> NodeWrapper<'n> {
    pub fn node(&self) -> &'n Node {
        self.node
    }

    /// Slash-separated kinds from the matched root to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Match the next unmatched child, which must account for all of its
    /// own children.
    pub fn child<F>(&mut self, kind: NodeKind, spec: F) -> Result<(), HarnessError>
    where
        F: FnOnce(&mut NodeWrapper<'_>) -> Result<(), HarnessError>,
    {
        self.next(kind, false, spec)
    }

    /// Match the next unmatched child without constraining its children
    /// beyond what `spec` checks.
    pub fn child_ignoring_rest<F>(&mut self, kind: NodeKind, spec: F) -> Result<(), HarnessError>
    where
        F: FnOnce(&mut NodeWrapper<'_>) -> Result<(), HarnessError>,
    {
        self.next(kind, true, spec)
    }

    /// Consume the next child, checking only its kind.
    pub fn any_child(&mut self, kind: NodeKind) -> Result<(), HarnessError> {
        self.next(kind, true, |_| Ok(()))
    }

    fn next<F>(&mut self, kind: NodeKind, ignore_children: bool, spec: F) -> Result<(), HarnessError>
    where
        F: FnOnce(&mut NodeWrapper<'_>) -> Result<(), HarnessError>,
    {
        let index = self.next_child;
        let child = self.node.child(index).ok_or_else(|| {
            HarnessError::mismatch(
                self.path.clone(),
                format!("expected child #{index} of kind {kind}, but there are only {index}"),
            )
        })?;
        self.next_child += 1;
        match_at(child, kind, ignore_children, spec, format!("{}/{kind}", self.path))
    }

    pub fn image_is(&self, expected: &str) -> Result<(), HarnessError> {
        match self.node.image() {
            Some(image) if image == expected => Ok(()),
            Some(image) => Err(self.mismatch(format!("expected image {expected:?}, found {image:?}"))),
            None => Err(self.mismatch(format!("expected image {expected:?}, node has none"))),
        }
    }

    pub fn num_children_is(&self, expected: usize) -> Result<(), HarnessError> {
        let actual = self.node.num_children();
        if actual == expected {
            Ok(())
        } else {
            Err(self.mismatch(format!("expected {expected} children, found {actual}")))
        }
    }

    /// Arbitrary condition on the node, failing with `msg`.
    pub fn check(&self, cond: bool, msg: impl Into<String>) -> Result<(), HarnessError> {
        if cond { Ok(()) } else { Err(self.mismatch(msg)) }
    }

    fn mismatch(&self, msg: impl Into<String>) -> HarnessError {
        HarnessError::mismatch(self.path.clone(), msg)
    }
}
