mod common;
use common::{run_jfrag, stderr_of, stdout_of};

use std::fs;

#[test]
fn versions_are_listed_ascending_either_way() {
    for args in [["versions", "1.4", "1.6"], ["versions", "1.6", "1.4"]] {
        let output = run_jfrag(&args);
        assert!(output.status.success());
        assert_eq!(stdout_of(&output).trim(), "1.4 1.5 1.6");
    }
}

#[test]
fn unknown_version_is_a_usage_error() {
    let output = run_jfrag(&["versions", "1.2", "11"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("1.2"));
}

#[test]
fn locate_prints_the_subtree() {
    let output = run_jfrag(&["expr", "1 + 1", "--java", "1.8", "--locate", "AdditiveExpression"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("AdditiveExpression \"+\""), "{stdout}");
    assert_eq!(stdout.matches("Literal \"1\"").count(), 2);
}

#[test]
fn statement_locate() {
    let output = run_jfrag(&["stmt", "int x = 5;", "--locate", "VariableDeclarator"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(stdout_of(&output).starts_with("VariableDeclarator \"x\""));
}

#[test]
fn without_locate_the_whole_unit_is_printed() {
    let output = run_jfrag(&["expr", "x", "--import", "java.util.List"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("CompilationUnit"));
    assert!(stdout.contains("ImportDeclaration \"java.util.List\""));
}

#[test]
fn json_output() {
    let output = run_jfrag(&["expr", "42", "--locate", "Literal", "--json"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(value["kind"], "Literal");
    assert_eq!(value["image"], "42");
}

#[test]
fn parse_failure_exits_nonzero_and_names_the_version() {
    let output = run_jfrag(&["expr", "x -> x", "--java", "1.7"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr_of(&output).contains("Java 1.7"));
}

#[test]
fn not_found_is_reported() {
    let output = run_jfrag(&["expr", "a + b", "--locate", "Literal"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("error[locate]"));
}

#[test]
fn config_sets_the_default_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jfrag.toml");
    fs::write(&path, "[harness]\ndefault_version = \"1.7\"\n").unwrap();
    let config = path.to_str().unwrap();

    let rejected = run_jfrag(&["--config", config, "expr", "x -> x"]);
    assert!(!rejected.status.success());

    let explicit = run_jfrag(&["--config", config, "expr", "x -> x", "--java", "1.8"]);
    assert!(explicit.status.success(), "{}", stderr_of(&explicit));
}

#[test]
fn missing_config_file_fails() {
    let output = run_jfrag(&["--config", "/nonexistent/jfrag.toml", "versions", "1.3", "1.4"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("error[config]"));
}
