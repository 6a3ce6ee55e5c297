//! Whole-tree shapes for a handful of fragments, pinned as inline
//! snapshots of the text dump.

use insta::assert_snapshot;
use jfrag::wrap::wrap_expression;
use jfrag::{JavaVersion, ParsingContext};

fn expression_tree(fragment: &str) -> String {
    ParsingContext::new(JavaVersion::J1_8)
        .parse_ast_expression(fragment)
        .unwrap()
        .dump()
}

#[test]
fn sum_of_literal_and_name() {
    assert_snapshot!(expression_tree("1 + x"), @r#"
    Expression
      AdditiveExpression "+"
        PrimaryExpression
          PrimaryPrefix
            Literal "1"
        PrimaryExpression
          PrimaryPrefix
            Name "x"
    "#);
}

#[test]
fn qualified_call() {
    assert_snapshot!(expression_tree("foo.bar(1)"), @r#"
    Expression
      PrimaryExpression
        PrimaryPrefix
          Name "foo.bar"
        PrimarySuffix
          Arguments
            ArgumentList
              Expression
                PrimaryExpression
                  PrimaryPrefix
                    Literal "1"
    "#);
}

#[test]
fn two_parameter_lambda() {
    assert_snapshot!(expression_tree("(a, b) -> a"), @r#"
    Expression
      LambdaExpression
        VariableDeclaratorId "a"
        VariableDeclaratorId "b"
        Expression
          PrimaryExpression
            PrimaryPrefix
              Name "a"
    "#);
}

#[test]
fn local_variable_statement() {
    let tree = ParsingContext::new(JavaVersion::J1_3)
        .parse_ast_statement("int x = 5;")
        .unwrap();
    assert_snapshot!(tree.dump(), @r#"
    BlockStatement
      LocalVariableDeclaration "int"
        VariableDeclarator "x"
          VariableDeclaratorId "x"
          VariableInitializer
            Expression
              PrimaryExpression
                PrimaryPrefix
                  Literal "5"
    "#);
}

#[test]
fn wrapped_unit_with_import() {
    let source = wrap_expression("x", &["import java.util.List;".to_string()]);
    let unit = ParsingContext::new(JavaVersion::J11).parse_unit(&source).unwrap();
    assert_snapshot!(unit.dump(), @r#"
    CompilationUnit
      ImportDeclaration "java.util.List"
      TypeDeclaration
        ClassOrInterfaceDeclaration "Foo"
          ClassOrInterfaceBody
            ClassOrInterfaceBodyDeclaration
              Initializer
                Block
                  BlockStatement
                    LocalVariableDeclaration "Object"
                      VariableDeclarator "o"
                        VariableDeclaratorId "o"
                        VariableInitializer
                          Expression
                            PrimaryExpression
                              PrimaryPrefix
                                Name "x"
    "#);
}
