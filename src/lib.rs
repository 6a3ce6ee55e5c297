//! Parser-conformance harness for Java source fragments.
//!
//! A test names a fragment, the node kind it should produce and the Java
//! versions it applies to. The harness wraps the fragment into a minimal
//! compilation unit, parses it under each version and walks down the
//! fragment's single-child chain to the requested node:
//!
//! ```rust
//! use jfrag::{JavaVersion, NodeKind, ParsingContext};
//!
//! let mut ctx = ParsingContext::new(JavaVersion::J1_8);
//! let sum = ctx.parse_expression("1 + 1", NodeKind::AdditiveExpression).unwrap();
//! assert_eq!(sum.num_children(), 2);
//! ```

pub mod span;
pub mod diagnostics;
pub mod version;
pub mod level;
pub mod lexer;
pub mod parser;
pub mod locate;
pub mod wrap;
pub mod visit;
pub mod pretty;
pub mod matcher;
pub mod context;
pub mod generator;
pub mod suite;
pub mod config;

pub use config::HarnessConfig;
pub use context::{FragmentMatcher, ParsingContext, TypeRef};
pub use diagnostics::HarnessError;
pub use generator::{Generator, TestBody, TestRegistry, parser_test, parser_test_for, parser_test_latest};
pub use locate::{DEFAULT_MAX_DEPTH, SyntaxNode, find_on_straight_line};
pub use matcher::{NodeWrapper, match_node};
pub use parser::node::{Node, NodeKind};
pub use parser::{JavaParser, ParseInvoker};
pub use suite::{SuiteReport, TestSuite};
pub use version::{JavaVersion, range};
