use std::cell::RefCell;
use std::rc::Rc;

use jfrag::span::Span;
use jfrag::suite::FailureCause;
use jfrag::{
    Generator, HarnessConfig, HarnessError, JavaVersion, Node, NodeKind, ParseInvoker, TestSuite, TypeRef,
    parser_test, parser_test_for, parser_test_latest, range,
};
use JavaVersion::*;

#[test]
fn one_test_per_version_in_order() {
    let mut suite = TestSuite::new();
    parser_test(&mut suite, "sum", &range(J1_6, J1_8), |ctx| {
        ctx.parse_expression("1 + 1", NodeKind::AdditiveExpression).map(drop)
    })
    .unwrap();

    assert_eq!(suite.names(), vec!["sum (Java 1.6)", "sum (Java 1.7)", "sum (Java 1.8)"]);
    let report = suite.run();
    assert_eq!(report.passed.len(), 3);
    assert!(report.failures.is_empty());
}

#[test]
fn duplicate_versions_give_duplicate_tests() {
    let mut suite = TestSuite::new();
    parser_test(&mut suite, "dup", &[J1_8, J1_8], |_| Ok(())).unwrap();
    assert_eq!(suite.names(), vec!["dup (Java 1.8)", "dup (Java 1.8)"]);
    assert_eq!(suite.run().passed.len(), 2);
}

#[test]
fn empty_version_list_is_rejected() {
    let mut suite = TestSuite::new();
    let err = parser_test(&mut suite, "nothing", &[], |_| Ok(())).unwrap_err();
    assert!(matches!(err, HarnessError::Malformed { .. }), "{err:?}");
    assert!(suite.is_empty());
}

#[test]
fn single_version_shortcuts() {
    let mut suite = TestSuite::new();
    parser_test_for(&mut suite, "pinned", J1_4, |ctx| {
        ctx.parse_statement("assert ok;", NodeKind::AssertStatement).map(drop)
    })
    .unwrap();
    parser_test_latest(&mut suite, "newest", |ctx| {
        ctx.parse_expression("(var x) -> x", NodeKind::LambdaExpression).map(drop)
    })
    .unwrap();

    assert_eq!(suite.names(), vec!["pinned (Java 1.4)", "newest (Java 11)"]);
    suite.run().assert_all_passed();
}

#[test]
fn every_test_gets_a_fresh_context() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&seen);

    let mut suite = TestSuite::new();
    parser_test(&mut suite, "imports", &range(J1_5, J1_7), move |ctx| {
        record.borrow_mut().push((ctx.version(), ctx.imports().len()));
        ctx.import_type(TypeRef::new("java.util", "List"))?;
        ctx.parse_expression("new ArrayList<String>()", NodeKind::AllocationExpression)?;
        Ok(())
    })
    .unwrap();
    suite.run().assert_all_passed();

    assert_eq!(*seen.borrow(), vec![(J1_5, 0), (J1_6, 0), (J1_7, 0)]);
}

#[test]
fn failures_are_reported_per_version() {
    let mut suite = TestSuite::new();
    parser_test(&mut suite, "lambda", &range(J1_7, J1_8), |ctx| {
        ctx.parse_expression("x -> x", NodeKind::LambdaExpression).map(drop)
    })
    .unwrap();

    let report = suite.run();
    assert_eq!(report.passed.len(), 1);
    assert_eq!(report.total(), 2);
    let failure = report.failure("lambda (Java 1.7)").unwrap();
    match &failure.cause {
        FailureCause::Error(err) => assert_eq!(err.version(), Some(J1_7)),
        other => panic!("expected a harness error, got {other:?}"),
    }
    assert!(report.failure("lambda (Java 1.8)").is_none());
}

#[test]
fn generator_uses_its_parser() {
    struct Fixed(Rc<RefCell<Vec<String>>>);

    impl ParseInvoker for Fixed {
        fn parse(&self, source: &str, _version: JavaVersion) -> Result<Node, HarnessError> {
            self.0.borrow_mut().push(source.to_string());
            Ok(Node::new(NodeKind::CompilationUnit, Span::dummy()))
        }
    }

    let sources = Rc::new(RefCell::new(Vec::new()));
    let generator = Generator::default().with_parser(Rc::new(Fixed(Rc::clone(&sources))));

    let mut suite = TestSuite::new();
    generator
        .parser_test(&mut suite, "stubbed", &[J1_3, J11], |ctx| {
            let unit = ctx.parse_unit("class A {}")?;
            assert!(unit.is(NodeKind::CompilationUnit));
            Ok(())
        })
        .unwrap();
    suite.run().assert_all_passed();

    assert_eq!(*sources.borrow(), vec!["class A {}".to_string(), "class A {}".to_string()]);
}

#[test]
fn generator_passes_its_config_down() {
    let config = HarnessConfig {
        default_version: J1_6,
        max_descent_depth: 1,
    };
    let generator = Generator::new(config.clone());
    assert_eq!(generator.config(), &config);

    let mut suite = TestSuite::new();
    generator
        .parser_test_default(&mut suite, "shallow", |ctx| {
            assert_eq!(ctx.version(), J1_6);
            assert_eq!(ctx.config().max_descent_depth, 1);
            match ctx.parse_expression("1", NodeKind::Literal) {
                Err(HarnessError::NodeNotFound { .. }) => Ok(()),
                other => Err(HarnessError::malformed(format!("descent was not bounded: {other:?}"))),
            }
        })
        .unwrap();

    assert_eq!(suite.names(), vec!["shallow (Java 1.6)"]);
    suite.run().assert_all_passed();
}

#[test]
fn panicking_body_is_a_failure_not_an_abort() {
    let mut suite = TestSuite::new();
    parser_test(&mut suite, "boom", &[J1_8], |_| panic!("assertion inside body")).unwrap();
    parser_test(&mut suite, "fine", &[J1_8], |_| Ok(())).unwrap();

    let report = suite.run();
    assert_eq!(report.passed.len(), 1);
    match &report.failure("boom (Java 1.8)").unwrap().cause {
        FailureCause::Panic(msg) => assert!(msg.contains("assertion inside body")),
        other => panic!("expected a panic, got {other:?}"),
    }
}
