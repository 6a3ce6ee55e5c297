use jfrag::span::Span;
use jfrag::{DEFAULT_MAX_DEPTH, JavaVersion, Node, NodeKind, ParsingContext, find_on_straight_line};

fn leaf(kind: NodeKind, image: &str) -> Node {
    Node::new(kind, Span::dummy()).with_image(image)
}

fn chain(kinds: &[NodeKind], tail: Node) -> Node {
    kinds
        .iter()
        .rev()
        .fold(tail, |child, &kind| Node::wrap(kind, child))
}

#[test]
fn start_node_is_a_candidate() {
    let root = leaf(NodeKind::Literal, "1");
    let found = find_on_straight_line(&root, DEFAULT_MAX_DEPTH, |n| n.is(NodeKind::Literal)).unwrap();
    assert!(std::ptr::eq(found, &root));
}

#[test]
fn descends_single_child_chain() {
    let root = chain(
        &[NodeKind::Expression, NodeKind::PrimaryExpression, NodeKind::PrimaryPrefix],
        leaf(NodeKind::Literal, "42"),
    );
    let found = find_on_straight_line(&root, DEFAULT_MAX_DEPTH, |n| n.is(NodeKind::Literal)).unwrap();
    assert_eq!(found.image(), Some("42"));

    let prefix = find_on_straight_line(&root, DEFAULT_MAX_DEPTH, |n| n.is(NodeKind::PrimaryPrefix)).unwrap();
    assert_eq!(prefix.num_children(), 1);
}

#[test]
fn nearest_match_wins() {
    let root = chain(
        &[NodeKind::Expression, NodeKind::Expression],
        leaf(NodeKind::Literal, "1"),
    );
    let found = find_on_straight_line(&root, DEFAULT_MAX_DEPTH, |n| n.is(NodeKind::Expression)).unwrap();
    assert!(std::ptr::eq(found, &root));
}

#[test]
fn branching_node_stops_the_search() {
    let sum = Node::new(NodeKind::AdditiveExpression, Span::dummy())
        .with_image("+")
        .with_children(vec![leaf(NodeKind::Literal, "1"), leaf(NodeKind::Literal, "2")]);
    let root = Node::wrap(NodeKind::Expression, sum);

    assert!(find_on_straight_line(&root, DEFAULT_MAX_DEPTH, |n| n.is(NodeKind::Literal)).is_none());
    let found = find_on_straight_line(&root, DEFAULT_MAX_DEPTH, |n| n.image() == Some("+")).unwrap();
    assert!(found.is(NodeKind::AdditiveExpression));
}

#[test]
fn depth_bound_is_honoured() {
    let root = chain(&[NodeKind::Expression, NodeKind::PrimaryExpression], leaf(NodeKind::Literal, "1"));
    assert!(find_on_straight_line(&root, 1, |n| n.is(NodeKind::Literal)).is_none());
    assert!(find_on_straight_line(&root, 2, |n| n.is(NodeKind::Literal)).is_some());
    assert!(find_on_straight_line(&root, 0, |n| n.is(NodeKind::Expression)).is_some());
}

#[test]
fn redundant_parentheses_stay_on_the_line() {
    let mut ctx = ParsingContext::new(JavaVersion::J1_8);
    let lit = ctx.parse_expression("((1))", NodeKind::Literal).unwrap();
    assert_eq!(lit.image(), Some("1"));
}

#[test]
fn predicate_can_select_by_image() {
    let mut ctx = ParsingContext::new(JavaVersion::J1_8);
    let node = ctx
        .parse_expression_where("a * b + c", "'+' node", |n| n.image() == Some("+"))
        .unwrap();
    assert!(node.is(NodeKind::AdditiveExpression));

    let err = ctx
        .parse_expression_where("a * b + c", "'*' node", |n| n.image() == Some("*"))
        .unwrap_err();
    assert!(err.to_string().contains("'*' node"), "{err}");
}

#[test]
fn statement_search_starts_at_block_statement() {
    let mut ctx = ParsingContext::new(JavaVersion::J1_8);
    let root = ctx.parse_ast_statement("return;").unwrap();
    assert!(root.is(NodeKind::BlockStatement));
    let ret = ctx.parse_statement("return;", NodeKind::ReturnStatement).unwrap();
    assert_eq!(ret.num_children(), 0);
}
