// Property tests for the fragment parser.
//
// 1. Integer sums always locate an AdditiveExpression
// 2. A lone identifier is a Name carrying its spelling
// 3. Arbitrary short input never panics, it parses or returns an error
// 4. Version-neutral fragments produce the same tree on every version

use jfrag::{JavaVersion, NodeKind, ParsingContext};
use proptest::prelude::*;

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const", "continue",
    "default", "do", "double", "else", "enum", "extends", "final", "finally", "float", "for", "goto", "if",
    "implements", "import", "instanceof", "int", "interface", "long", "native", "new", "package", "private",
    "protected", "public", "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,8}".prop_filter("keyword", |s| !KEYWORDS.contains(&s.as_str()))
}

fn arb_sum() -> impl Strategy<Value = String> {
    prop::collection::vec(0..10_000u32, 2..6).prop_map(|terms| {
        terms
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" + ")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn sums_locate_an_addition(source in arb_sum()) {
        let mut ctx = ParsingContext::new(JavaVersion::J1_3);
        let add = ctx.parse_expression(&source, NodeKind::AdditiveExpression).unwrap();
        prop_assert_eq!(add.image(), Some("+"));
        prop_assert_eq!(add.num_children(), 2);
    }

    #[test]
    fn identifier_is_a_name(ident in arb_identifier()) {
        let mut ctx = ParsingContext::new(JavaVersion::J1_8);
        let name = ctx.parse_expression(&ident, NodeKind::Name).unwrap();
        prop_assert_eq!(name.image(), Some(ident.as_str()));
    }

    #[test]
    fn arbitrary_fragments_never_panic(source in "[ -~]{0,24}") {
        let mut ctx = ParsingContext::new(JavaVersion::LATEST);
        let _ = ctx.parse_ast_expression(&source);
        let mut ctx = ParsingContext::new(JavaVersion::J1_3);
        let _ = ctx.parse_ast_statement(&source);
    }

    #[test]
    fn neutral_fragment_tree_is_version_independent(source in arb_sum()) {
        let trees: Vec<String> = JavaVersion::ALL
            .iter()
            .map(|&v| ParsingContext::new(v).parse_ast_expression(&source).unwrap().dump())
            .collect();
        for tree in &trees[1..] {
            prop_assert_eq!(tree, &trees[0]);
        }
    }
}
