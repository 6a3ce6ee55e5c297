//! Constructs newer than the selected version are rejected as parse
//! failures naming that version; from their introduction on they parse.

use jfrag::wrap::FragmentKind;
use jfrag::{HarnessError, JavaVersion, NodeKind, ParsingContext, TestSuite, parser_test, range};
use JavaVersion::*;

struct Case {
    name: &'static str,
    fragment: &'static str,
    kind: FragmentKind,
    since: JavaVersion,
}

const CASES: &[Case] = &[
    Case { name: "assert", fragment: "assert ready;", kind: FragmentKind::Statement, since: J1_4 },
    Case {
        name: "generic local",
        fragment: "java.util.List<String> names = null;",
        kind: FragmentKind::Statement,
        since: J1_5,
    },
    Case {
        name: "enhanced for",
        fragment: "for (String s : names) {}",
        kind: FragmentKind::Statement,
        since: J1_5,
    },
    Case {
        name: "varargs in anonymous class",
        fragment: "new Object() { void log(String... parts) {} }",
        kind: FragmentKind::Expression,
        since: J1_5,
    },
    Case { name: "binary literal", fragment: "0b1010", kind: FragmentKind::Expression, since: J1_7 },
    Case { name: "underscore literal", fragment: "1_000_000", kind: FragmentKind::Expression, since: J1_7 },
    Case {
        name: "diamond",
        fragment: "new java.util.ArrayList<>()",
        kind: FragmentKind::Expression,
        since: J1_7,
    },
    Case {
        name: "multi-catch",
        fragment: "try { run(); } catch (IOException | RuntimeException e) {}",
        kind: FragmentKind::Statement,
        since: J1_7,
    },
    Case {
        name: "try-with-resources",
        fragment: "try (Reader r = open()) {}",
        kind: FragmentKind::Statement,
        since: J1_7,
    },
    Case { name: "lambda", fragment: "x -> x", kind: FragmentKind::Expression, since: J1_8 },
    Case { name: "method reference", fragment: "String::valueOf", kind: FragmentKind::Expression, since: J1_8 },
    Case { name: "var local", fragment: "var n = 1;", kind: FragmentKind::Statement, since: J10 },
    Case { name: "var lambda parameter", fragment: "(var x) -> x", kind: FragmentKind::Expression, since: J11 },
];

fn parse(ctx: &mut ParsingContext, fragment: &str, kind: FragmentKind) -> Result<(), HarnessError> {
    match kind {
        FragmentKind::Expression => ctx.parse_ast_expression(fragment).map(drop),
        FragmentKind::Statement => ctx.parse_ast_statement(fragment).map(drop),
    }
}

fn previous(version: JavaVersion) -> JavaVersion {
    JavaVersion::ALL[version.ordinal() - 1]
}

#[test]
fn feature_table_partitions_the_domain() {
    let mut suite = TestSuite::new();
    let mut expected = 0;

    for case in CASES {
        let (fragment, kind) = (case.fragment, case.kind);

        parser_test(&mut suite, &format!("{} accepted", case.name), &case.since.and_later(), move |ctx| {
            parse(ctx, fragment, kind)
        })
        .unwrap();
        expected += case.since.and_later().len();

        if case.since > J1_3 {
            let rejected = range(J1_3, previous(case.since));
            expected += rejected.len();
            parser_test(&mut suite, &format!("{} rejected", case.name), &rejected, move |ctx| {
                match parse(ctx, fragment, kind) {
                    Err(HarnessError::Parse { version, .. }) if version == ctx.version() => Ok(()),
                    other => Err(HarnessError::malformed(format!(
                        "expected a parse failure under Java {}, got {other:?}",
                        ctx.version()
                    ))),
                }
            })
            .unwrap();
        }
    }

    assert_eq!(suite.len(), expected);
    suite.run().assert_all_passed();
}

#[test]
fn lambda_under_java_7_names_both_versions() {
    let err = ParsingContext::new(J1_7)
        .parse_expression("x -> x + 1", NodeKind::LambdaExpression)
        .unwrap_err();
    match err {
        HarnessError::Parse { version, msg, .. } => {
            assert_eq!(version, J1_7);
            assert!(msg.contains("Java 1.8"), "{msg}");
            assert!(msg.contains("selected: Java 1.7"), "{msg}");
        }
        other => panic!("expected parse failure, got {other:?}"),
    }
}

#[test]
fn module_declaration_needs_java_9() {
    let unit = "module com.example.app {\n    requires java.sql;\n    exports com.example.api;\n}\n";

    let err = ParsingContext::new(J1_8).parse_unit(unit).unwrap_err();
    assert_eq!(err.version(), Some(J1_8));

    let tree = ParsingContext::new(J9).parse_unit(unit).unwrap();
    let module = tree.first_descendant(NodeKind::ModuleDeclaration).unwrap();
    assert_eq!(module.image(), Some("com.example.app"));
    assert_eq!(module.num_children(), 2);
}

#[test]
fn interface_method_bodies_by_version() {
    let default_method = "interface Greeter { default String greet() { return \"hi\"; } }";
    assert!(ParsingContext::new(J1_7).parse_unit(default_method).is_err());
    assert!(ParsingContext::new(J1_8).parse_unit(default_method).is_ok());

    let private_method = "interface Greeter { private String name() { return \"n\"; } }";
    assert!(ParsingContext::new(J1_8).parse_unit(private_method).is_err());
    assert!(ParsingContext::new(J9).parse_unit(private_method).is_ok());
}

#[test]
fn static_import_needs_java_5() {
    for (version, ok) in [(J1_4, false), (J1_5, true)] {
        let mut ctx = ParsingContext::new(version);
        ctx.import("static java.lang.Math.max").unwrap();
        let result = ctx.parse_expression("max(1, 2)", NodeKind::PrimaryExpression);
        assert_eq!(result.is_ok(), ok, "Java {version}: {result:?}");
    }
}

#[test]
fn enum_and_annotation_need_java_5() {
    assert!(ParsingContext::new(J1_4).parse_unit("enum Color { RED }").is_err());
    assert!(ParsingContext::new(J1_5).parse_unit("enum Color { RED }").is_ok());

    let annotated = "@Deprecated class Old { @Override public String toString() { return null; } }";
    assert!(ParsingContext::new(J1_4).parse_unit(annotated).is_err());
    assert!(ParsingContext::new(J1_5).parse_unit(annotated).is_ok());
}
