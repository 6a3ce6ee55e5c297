//! Straight-line descent: find the node a fragment was wrapped to isolate.
//!
//! Grammars put several single-child layers between a statement or
//! expression boundary and the node a test cares about (`Expression` →
//! `PrimaryExpression` → `PrimaryPrefix` → `Literal`). The locator walks
//! down through those layers only while the path is unambiguous: the first
//! node on the chain that satisfies the predicate wins, and a node with zero
//! or several children that does not satisfy it ends the search. Siblings are
//! never searched and nothing is backtracked, so a fragment whose tree
//! branches before the requested node fails instead of matching some nested
//! node by accident.

/// Minimal tree contract the locator needs.
pub trait SyntaxNode {
    fn num_children(&self) -> usize;
    fn child(&self, index: usize) -> Option<&Self>;
}

/// Default cap on the number of single-child steps.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Nearest node satisfying `predicate` on the single-child chain starting
/// at `start` (inclusive). Gives up after `max_depth` steps down.
pub fn find_on_straight_line<'a, N, P>(start: &'a N, max_depth: usize, predicate: P) -> Option<&'a N>
where
    N: SyntaxNode,
    P: Fn(&N) -> bool,
{
    let mut current = start;
    let mut depth = 0;
    loop {
        if predicate(current) {
            tracing::trace!(depth, "straight-line match");
            return Some(current);
        }
        if current.num_children() != 1 || depth >= max_depth {
            tracing::trace!(depth, children = current.num_children(), "straight line ends");
            return None;
        }
        current = current.child(0)?;
        depth += 1;
    }
}
