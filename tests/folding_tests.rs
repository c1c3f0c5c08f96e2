use astfold::{fold_tree, BinaryOp, Extern, FoldOptions, Node, UnaryOp};
use proptest::prelude::*;

fn fold(mut node: Node) -> Node {
    fold_tree(&mut node, &FoldOptions::new());
    node
}

#[test]
fn arithmetic_and_string_folding_through_the_public_api() {
    assert_eq!(
        fold(Node::binary(
            BinaryOp::Add,
            Node::binary(BinaryOp::Add, Node::num(1.0), Node::num(2.0)),
            Node::num(4.0),
        )),
        Node::num(7.0)
    );

    assert_eq!(
        fold(Node::binary(
            BinaryOp::Add,
            Node::str("a"),
            Node::binary(BinaryOp::Add, Node::str("b"), Node::str("c")),
        )),
        Node::str("abc")
    );
}

#[test]
fn unknown_references_block_folding_but_not_their_siblings() {
    let tree = Node::call(
        Node::ident("render"),
        vec![
            Node::binary(BinaryOp::Mul, Node::num(6.0), Node::num(7.0)),
            Node::ident("state"),
        ],
    );
    assert_eq!(
        fold(tree),
        Node::call(
            Node::ident("render"),
            vec![Node::num(42.0), Node::ident("state")],
        )
    );
}

#[test]
fn builtin_method_pipelines_fold_end_to_end() {
    // [1,2].concat([3]).join("-")
    let tree = Node::method_call(
        Node::method_call(
            Node::array(vec![Node::num(1.0), Node::num(2.0)]),
            "concat",
            vec![Node::array(vec![Node::num(3.0)])],
        ),
        "join",
        vec![Node::str("-")],
    );
    assert_eq!(fold(tree), Node::str("1-2-3"));
}

#[test]
fn math_expressions_fold_end_to_end() {
    // Math.pow(2, 10) / Math.max(2, 4)
    let tree = Node::binary(
        BinaryOp::Div,
        Node::call(
            Node::member(Node::ident("Math"), "pow"),
            vec![Node::num(2.0), Node::num(10.0)],
        ),
        Node::call(
            Node::member(Node::ident("Math"), "max"),
            vec![Node::num(2.0), Node::num(4.0)],
        ),
    );
    assert_eq!(fold(tree), Node::num(256.0));
}

#[test]
fn extern_markers_are_accepted_without_changing_behaviour() {
    let options = FoldOptions::new().with_extern("pureHelper", Extern::Pure);

    // Declared externs are not consulted yet: the call stays put
    let mut tree = Node::call(Node::ident("pureHelper"), vec![Node::num(1.0)]);
    fold_tree(&mut tree, &options);
    assert_eq!(
        tree,
        Node::call(Node::ident("pureHelper"), vec![Node::num(1.0)])
    );
}

#[test]
fn decompute_then_fold_recognizes_rewritten_members() {
    // {a: 1}["a"] + x["b"]
    let mut tree = Node::binary(
        BinaryOp::Add,
        Node::computed_member(
            Node::object(vec![("a", Node::num(1.0))]),
            Node::str("a"),
        ),
        Node::computed_member(Node::ident("x"), Node::str("b")),
    );
    fold_tree(&mut tree, &FoldOptions::new().with_decompute(true));
    assert_eq!(
        tree,
        Node::binary(
            BinaryOp::Add,
            Node::num(1.0),
            Node::member(Node::ident("x"), "b"),
        )
    );
}

fn arb_literal_tree() -> impl Strategy<Value = Node> {
    let leaf = (-100i32..=100).prop_map(|n| {
        if n < 0 {
            Node::unary(UnaryOp::Minus, Node::num(-n as f64))
        } else {
            Node::num(n as f64)
        }
    });
    leaf.prop_recursive(4, 32, 2, |inner| {
        (
            prop_oneof![
                Just(BinaryOp::Add),
                Just(BinaryOp::Sub),
                Just(BinaryOp::Mul),
            ],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, left, right)| Node::binary(op, left, right))
    })
}

fn arb_opaque_tree() -> impl Strategy<Value = Node> {
    let leaf = "[a-z]{1,4}".prop_map(|name| Node::ident(name));
    leaf.prop_recursive(3, 16, 2, |inner| {
        (
            prop_oneof![
                Just(BinaryOp::Add),
                Just(BinaryOp::Sub),
                Just(BinaryOp::Mul),
            ],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, left, right)| Node::binary(op, left, right))
    })
}

proptest! {
    #[test]
    fn integer_arithmetic_folds_to_a_single_spelling(tree in arb_literal_tree()) {
        let folded = fold(tree);
        let is_number_spelling = matches!(
            &folded,
            Node::Literal(_)
        ) || matches!(
            &folded,
            Node::Unary { op: UnaryOp::Minus, operand }
                if matches!(operand.as_ref(), Node::Literal(_))
        );
        prop_assert!(is_number_spelling, "unexpected result shape: {:?}", folded);
    }

    #[test]
    fn folding_is_idempotent(tree in arb_literal_tree()) {
        let once = fold(tree);
        let twice = fold(once.clone());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn trees_of_unknown_references_are_untouched(tree in arb_opaque_tree()) {
        prop_assert_eq!(fold(tree.clone()), tree);
    }
}
