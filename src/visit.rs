//! Tree visitor infrastructure.
//!
//! Implement [`Visitor`] and override `visit_node`; call [`walk_node`] inside
//! the override to keep recursing into children. Plain closures can use
//! [`walk`] instead.
//!
//! ```rust
//! use jfrag::parser::node::{Node, NodeKind};
//! use jfrag::visit::{Visitor, walk_node};
//!
//! struct LiteralCounter {
//!     count: usize,
//! }
//!
//! impl<'a> Visitor<'a> for LiteralCounter {
//!     fn visit_node(&mut self, node: &'a Node) {
//!         if node.is(NodeKind::Literal) {
//!             self.count += 1;
//!         }
//!         walk_node(self, node);
//!     }
//! }
//! ```

use crate::parser::node::Node;

pub trait Visitor<'a> {
    fn visit_node(&mut self, node: &'a Node) {
        walk_node(self, node);
    }
}

/// Visit every child of `node` in order.
pub fn walk_node<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, node: &'a Node) {
    for child in &node.children {
        visitor.visit_node(child);
    }
}

struct FnVisitor<'f, F>(&'f mut F);

impl<'a, F: FnMut(&'a Node)> Visitor<'a> for FnVisitor<'_, F> {
    fn visit_node(&mut self, node: &'a Node) {
        (self.0)(node);
        walk_node(self, node);
    }
}

/// Call `f` on `node` and every descendant, pre-order.
pub fn walk<'a, F: FnMut(&'a Node)>(node: &'a Node, mut f: F) {
    FnVisitor(&mut f).visit_node(node);
}
