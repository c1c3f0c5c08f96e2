#![cfg(test)]

use crate::ast::nodes::{BinaryOp, Node, UnaryOp, UpdateOp};
use crate::fold::transform::{fold_tree, FoldOptions};

fn fold(mut node: Node) -> Node {
    fold_tree(&mut node, &FoldOptions::new());
    node
}

fn add(left: Node, right: Node) -> Node {
    Node::binary(BinaryOp::Add, left, right)
}

#[test]
fn arithmetic_folds_to_a_literal() {
    let tree = add(
        Node::num(1.0),
        Node::binary(BinaryOp::Mul, Node::num(2.0), Node::num(3.0)),
    );
    assert_eq!(fold(tree), Node::num(7.0));
}

#[test]
fn string_concatenation_folds() {
    let tree = add(add(Node::str("a"), Node::str("b")), Node::num(1.0));
    assert_eq!(fold(tree), Node::str("ab1"));
}

#[test]
fn safe_subtrees_fold_inside_an_unsafe_parent() {
    // foo(1 + 2) cannot fold, but its argument can
    let tree = Node::call(Node::ident("foo"), vec![add(Node::num(1.0), Node::num(2.0))]);
    assert_eq!(
        fold(tree),
        Node::call(Node::ident("foo"), vec![Node::num(3.0)])
    );
}

#[test]
fn unsafe_trees_come_back_untouched() {
    let tree = add(Node::ident("foo"), Node::ident("bar"));
    assert_eq!(fold(tree.clone()), tree);

    let member = Node::member(Node::ident("config"), "value");
    assert_eq!(fold(member.clone()), member);
}

#[test]
fn update_expressions_are_left_alone() {
    let tree = Node::update(UpdateOp::Incr, false, Node::num(5.0));
    assert_eq!(fold(tree.clone()), tree);
}

#[test]
fn concat_folds_through_the_driver() {
    // [1,2].concat([3], 4)
    let tree = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "concat",
        vec![Node::array(vec![Node::num(3.0)]), Node::num(4.0)],
    );
    assert_eq!(
        fold(tree),
        Node::array(vec![
            Node::num(1.0),
            Node::num(2.0),
            Node::num(3.0),
            Node::num(4.0),
        ])
    );
}

#[test]
fn concat_replacements_are_folded_again() {
    // [1+1].concat(2): the rule keeps the receiver element verbatim, the
    // driver then folds the replacement array down to [2, 2].
    let tree = Node::method_call(
        Node::array(vec![add(Node::num(1.0), Node::num(1.0))]),
        "concat",
        vec![Node::num(2.0)],
    );
    assert_eq!(fold(tree), Node::array(vec![Node::num(2.0), Node::num(2.0)]));
}

#[test]
fn call_and_apply_indirections_fold() {
    // [1,2].concat.call(null, 3)
    let call_form = Node::call(
        Node::member(
            Node::member(Node::array(vec![Node::num(1.0), Node::num(2.0)]), "concat"),
            "call",
        ),
        vec![Node::null(), Node::num(3.0)],
    );
    assert_eq!(
        fold(call_form),
        Node::array(vec![Node::num(1.0), Node::num(2.0), Node::num(3.0)])
    );

    // [1,2].concat.apply(null, [[3], 4])
    let apply_form = Node::call(
        Node::member(
            Node::member(Node::array(vec![Node::num(1.0), Node::num(2.0)]), "concat"),
            "apply",
        ),
        vec![
            Node::null(),
            Node::array(vec![Node::array(vec![Node::num(3.0)]), Node::num(4.0)]),
        ],
    );
    assert_eq!(
        fold(apply_form),
        Node::array(vec![
            Node::num(1.0),
            Node::num(2.0),
            Node::num(3.0),
            Node::num(4.0),
        ])
    );
}

#[test]
fn parents_fold_after_their_children() {
    // ("a" + "b").toUpperCase(): the receiver only becomes a literal once
    // its own fold lands
    let tree = Node::method_call(
        add(Node::str("a"), Node::str("b")),
        "toUpperCase",
        vec![],
    );
    assert_eq!(fold(tree), Node::str("AB"));
}

#[test]
fn chained_builtin_calls_fold_in_one_pass() {
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
fn mutator_calls_fold_with_new_expression_arguments() {
    // [].push(new Date()) is the new length; the constructed value itself
    // is never evaluated
    let tree = Node::method_call(
        Node::array(vec![]),
        "push",
        vec![Node::new_expr(Node::ident("Date"), vec![])],
    );
    assert_eq!(fold(tree), Node::num(1.0));
}

#[test]
fn computed_literal_indexing_folds() {
    let char_at = Node::computed_member(Node::str("abc"), Node::num(0.0));
    assert_eq!(fold(char_at), Node::str("a"));

    let element = Node::computed_member(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        Node::num(1.0),
    );
    assert_eq!(fold(element), Node::num(2.0));

    // Indexing counts UTF-16 units, so astral strings stay put
    let astral = Node::computed_member(Node::str("😀"), Node::num(0.0));
    assert_eq!(fold(astral.clone()), astral);
}

#[test]
fn search_calls_fold_with_position_arguments() {
    let last = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0), Node::num(1.0)]),
        "lastIndexOf",
        vec![Node::num(1.0), Node::num(1.0)],
    );
    assert_eq!(fold(last), Node::num(0.0));

    let index = Node::method_call(
        Node::str("abab"),
        "indexOf",
        vec![Node::str("ab"), Node::num(1.0)],
    );
    assert_eq!(fold(index), Node::num(2.0));
}

#[test]
fn math_members_fold_by_static_and_computed_key_alike() {
    let static_form = fold(Node::member(Node::ident("Math"), "PI"));
    let computed_form = fold(Node::computed_member(
        Node::ident("Math"),
        add(Node::str("P"), Node::str("I")),
    ));
    assert_eq!(static_form, Node::num(std::f64::consts::PI));
    assert_eq!(computed_form, static_form);
}

#[test]
fn math_calls_fold() {
    let tree = Node::call(
        Node::member(Node::ident("Math"), "max"),
        vec![Node::num(1.0), add(Node::num(2.0), Node::num(3.0))],
    );
    assert_eq!(fold(tree), Node::num(5.0));
}

#[test]
fn object_member_access_folds() {
    let tree = Node::member(Node::object(vec![("a", Node::num(1.0))]), "a");
    assert_eq!(fold(tree), Node::num(1.0));
}

#[test]
fn builtin_member_collisions_do_not_fold() {
    let tree = Node::member(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "push",
    );
    assert_eq!(fold(tree.clone()), tree);
}

#[test]
fn mapping_methods_fold_with_isolated_functions() {
    let double = Node::function(
        vec!["x"],
        Node::binary(BinaryOp::Mul, Node::ident("x"), Node::num(2.0)),
    );
    let tree = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0), Node::num(3.0)]),
        "map",
        vec![double],
    );
    assert_eq!(
        fold(tree),
        Node::array(vec![Node::num(2.0), Node::num(4.0), Node::num(6.0)])
    );
}

#[test]
fn mapping_with_a_leaky_function_does_not_fold() {
    let leaky = Node::function(vec!["x"], Node::ident("y"));
    let tree = Node::method_call(
        Node::array(vec![Node::num(1.0)]),
        "map",
        vec![leaky],
    );
    assert_eq!(fold(tree.clone()), tree);
}

#[test]
fn mutator_calls_fold_with_function_arguments_riding_through() {
    // [1,2].push(function (x) { return y }) is the new length
    let tree = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "push",
        vec![Node::function(vec!["x"], Node::ident("y"))],
    );
    assert_eq!(fold(tree), Node::num(3.0));
}

#[test]
fn concat_carries_isolated_functions_as_elements() {
    let isolated = Node::function(vec!["x"], Node::ident("x"));
    let tree = Node::method_call(
        Node::array(vec![]),
        "concat",
        vec![isolated.clone()],
    );
    assert_eq!(fold(tree), Node::array(vec![isolated]));
}

#[test]
fn failed_evaluations_still_fold_sibling_subtrees() {
    // Math.random() refuses evaluation, the neighbouring sum still folds
    let tree = Node::array(vec![
        Node::call(Node::member(Node::ident("Math"), "random"), vec![]),
        add(Node::num(1.0), Node::num(1.0)),
    ]);
    assert_eq!(
        fold(tree),
        Node::array(vec![
            Node::call(Node::member(Node::ident("Math"), "random"), vec![]),
            Node::num(2.0),
        ])
    );
}

#[test]
fn results_without_literal_spellings_use_expressible_forms() {
    // [1,2].indexOf(5) is -1, spelled as unary minus
    let negative = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "indexOf",
        vec![Node::num(5.0)],
    );
    assert_eq!(
        fold(negative),
        Node::unary(UnaryOp::Minus, Node::num(1.0))
    );

    let nan = Node::binary(BinaryOp::Div, Node::num(0.0), Node::num(0.0));
    assert_eq!(fold(nan), Node::ident("NaN"));

    let infinity = Node::binary(BinaryOp::Div, Node::num(1.0), Node::num(0.0));
    assert_eq!(fold(infinity), Node::ident("Infinity"));

    // [1].find(...) misses: undefined, spelled as void 0
    let miss = Node::method_call(
        Node::array(vec![Node::num(1.0)]),
        "find",
        vec![Node::function(vec!["x"], Node::bool(false))],
    );
    assert_eq!(
        fold(miss),
        Node::unary(UnaryOp::Void, Node::num(0.0))
    );
}

#[test]
fn decomputation_rewrites_literal_string_keys() {
    let options = FoldOptions::new().with_decompute(true);

    let mut tree = Node::computed_member(Node::ident("x"), Node::str("key"));
    fold_tree(&mut tree, &options);
    assert_eq!(tree, Node::member(Node::ident("x"), "key"));

    // Keys without a dot-form spelling stay computed
    let mut awkward = Node::computed_member(Node::ident("x"), Node::str("two words"));
    fold_tree(&mut awkward, &options);
    assert_eq!(
        awkward,
        Node::computed_member(Node::ident("x"), Node::str("two words"))
    );

    // Decomputation is off by default
    let mut untouched = Node::computed_member(Node::ident("x"), Node::str("key"));
    fold_tree(&mut untouched, &FoldOptions::new());
    assert_eq!(
        untouched,
        Node::computed_member(Node::ident("x"), Node::str("key"))
    );
}

#[test]
fn folding_is_idempotent() {
    let trees = vec![
        add(Node::num(1.0), Node::num(2.0)),
        Node::method_call(
            Node::array(vec![add(Node::num(1.0), Node::num(1.0))]),
            "concat",
            vec![Node::num(2.0)],
        ),
        Node::binary(BinaryOp::Div, Node::num(0.0), Node::num(0.0)),
        Node::call(Node::ident("foo"), vec![add(Node::num(1.0), Node::num(2.0))]),
    ];
    for tree in trees {
        let once = fold(tree);
        let twice = fold(once.clone());
        assert_eq!(twice, once);
    }
}

#[test]
fn options_round_trip_through_serde() {
    let options = FoldOptions::new()
        .with_decompute(true)
        .with_optimize(true);
    let json = serde_json::to_string(&options).expect("options should serialize");
    let back: FoldOptions = serde_json::from_str(&json).expect("options should deserialize");
    assert_eq!(back.decompute, options.decompute);
    assert_eq!(back.optimize, options.optimize);
}

#[test]
fn trees_round_trip_through_serde() {
    let tree = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::str("a")]),
        "concat",
        vec![Node::object(vec![("k", Node::bool(true))])],
    );
    let json = serde_json::to_string(&tree).expect("tree should serialize");
    let back: Node = serde_json::from_str(&json).expect("tree should deserialize");
    assert_eq!(back, tree);
}
