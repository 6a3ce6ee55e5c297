#![allow(dead_code)]

use std::process::{Command, Output};

use jfrag::matcher::NodeWrapper;
use jfrag::{HarnessError, JavaVersion, Node, NodeKind, ParsingContext};

pub fn jfrag() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jfrag"))
}

pub fn run_jfrag(args: &[&str]) -> Output {
    jfrag().args(args).env_remove("RUST_LOG").output().unwrap()
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Locate `kind` in an expression fragment, panicking with the harness
/// error on failure.
pub fn expr(version: JavaVersion, fragment: &str, kind: NodeKind) -> Node {
    ParsingContext::new(version)
        .parse_expression(fragment, kind)
        .unwrap_or_else(|e| panic!("{e}"))
}

pub fn stmt(version: JavaVersion, fragment: &str, kind: NodeKind) -> Node {
    ParsingContext::new(version)
        .parse_statement(fragment, kind)
        .unwrap_or_else(|e| panic!("{e}"))
}

pub fn expr_err(version: JavaVersion, fragment: &str, kind: NodeKind) -> HarnessError {
    match ParsingContext::new(version).parse_expression(fragment, kind) {
        Ok(node) => panic!("expected failure, located:\n{}", node.dump()),
        Err(e) => e,
    }
}

pub fn stmt_err(version: JavaVersion, fragment: &str, kind: NodeKind) -> HarnessError {
    match ParsingContext::new(version).parse_statement(fragment, kind) {
        Ok(node) => panic!("expected failure, located:\n{}", node.dump()),
        Err(e) => e,
    }
}

/// Match `PrimaryExpression > PrimaryPrefix > Literal` with the given text.
pub fn literal(n: &mut NodeWrapper<'_>, text: &str) -> Result<(), HarnessError> {
    n.child(NodeKind::PrimaryExpression, |p| {
        p.child(NodeKind::PrimaryPrefix, |pp| pp.child(NodeKind::Literal, |l| l.image_is(text)))
    })
}

/// Match `PrimaryExpression > PrimaryPrefix > Name` with the given text.
pub fn name(n: &mut NodeWrapper<'_>, text: &str) -> Result<(), HarnessError> {
    n.child(NodeKind::PrimaryExpression, |p| {
        p.child(NodeKind::PrimaryPrefix, |pp| pp.child(NodeKind::Name, |l| l.image_is(text)))
    })
}
