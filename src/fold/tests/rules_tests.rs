#![cfg(test)]

use crate::ast::nodes::{BinaryOp, Node, UnaryOp};
use crate::fold::rules::{is_transferable, Rule, RULES};

fn rule(name: &str) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| rule.name == name)
        .unwrap_or_else(|| panic!("no rule named '{}'", name))
}

#[test]
fn rule_table_order_is_fixed() {
    let names: Vec<&str> = RULES.iter().map(|rule| rule.name).collect();
    assert_eq!(
        names,
        vec!["concat_associativity", "mapping_methods", "safe_mutators"]
    );
}

#[test]
fn transferable_nodes_are_scalar_literals() {
    assert!(is_transferable(&Node::num(1.0)));
    assert!(is_transferable(&Node::str("x")));
    assert!(is_transferable(&Node::bool(true)));
    assert!(is_transferable(&Node::null()));
    assert!(is_transferable(&Node::unary(UnaryOp::Minus, Node::num(5.0))));
    assert!(is_transferable(&Node::unary(UnaryOp::Plus, Node::num(5.0))));

    // Arrays splice under concat, so they must be evaluated instead
    assert!(!is_transferable(&Node::array(vec![Node::num(1.0)])));
    assert!(!is_transferable(&Node::object(vec![])));
    assert!(!is_transferable(&Node::ident("x")));
    assert!(!is_transferable(&Node::unary(UnaryOp::Minus, Node::str("x"))));
}

#[test]
fn concat_rule_splices_array_arguments() {
    let concat = rule("concat_associativity");
    // [1,2].concat([3], [4,5])
    let call = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "concat",
        vec![
            Node::array(vec![Node::num(3.0)]),
            Node::array(vec![Node::num(4.0), Node::num(5.0)]),
        ],
    );

    assert!((concat.test)(&call));
    let folded = (concat.eval)(&call).expect("concat should fold");
    assert_eq!(
        folded,
        Node::array(vec![
            Node::num(1.0),
            Node::num(2.0),
            Node::num(3.0),
            Node::num(4.0),
            Node::num(5.0),
        ])
    );
}

#[test]
fn concat_with_no_arguments_is_the_identity() {
    let concat = rule("concat_associativity");
    let call = Node::method_call(
        Node::array(vec![Node::num(1.0)]),
        "concat",
        vec![],
    );
    assert!((concat.test)(&call));
    assert_eq!(
        (concat.eval)(&call).expect("identity concat should fold"),
        Node::array(vec![Node::num(1.0)])
    );
}

#[test]
fn concat_keeps_receiver_elements_verbatim() {
    let concat = rule("concat_associativity");
    // [1+1].concat(2): the receiver element is carried over unevaluated,
    // the transferable argument is appended directly.
    let call = Node::method_call(
        Node::array(vec![Node::binary(
            BinaryOp::Add,
            Node::num(1.0),
            Node::num(1.0),
        )]),
        "concat",
        vec![Node::num(2.0)],
    );

    assert!((concat.test)(&call));
    let folded = (concat.eval)(&call).expect("concat should fold");
    assert_eq!(
        folded,
        Node::array(vec![
            Node::binary(BinaryOp::Add, Node::num(1.0), Node::num(1.0)),
            Node::num(2.0),
        ])
    );
}

#[test]
fn concat_rule_rejects_other_methods_and_receivers() {
    let concat = rule("concat_associativity");

    let join = Node::method_call(Node::array(vec![]), "join", vec![]);
    assert!(!(concat.test)(&join));

    let string_concat = Node::method_call(Node::str("a"), "concat", vec![Node::str("b")]);
    assert!(!(concat.test)(&string_concat));

    let unknown_arg = Node::method_call(
        Node::array(vec![]),
        "concat",
        vec![Node::ident("x")],
    );
    assert!(!(concat.test)(&unknown_arg));
}

#[test]
fn mapping_rule_folds_builtin_methods_on_literal_receivers() {
    let mapping = rule("mapping_methods");

    let upper = Node::method_call(Node::str("ab"), "toUpperCase", vec![]);
    assert!((mapping.test)(&upper));
    assert_eq!(
        (mapping.eval)(&upper).expect("string method should fold"),
        Node::str("AB")
    );

    let join = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "join",
        vec![Node::str("-")],
    );
    assert!((mapping.test)(&join));
    assert_eq!(
        (mapping.eval)(&join).expect("join should fold"),
        Node::str("1-2")
    );

    let unknown_method = Node::method_call(Node::str("ab"), "frobnicate", vec![]);
    assert!(!(mapping.test)(&unknown_method));

    let unknown_receiver = Node::method_call(Node::ident("x"), "join", vec![]);
    assert!(!(mapping.test)(&unknown_receiver));
}

#[test]
fn mutator_rule_accepts_function_and_new_arguments() {
    let mutator = rule("safe_mutators");

    // [1,2].push(function (x) { return y }) folds to the new length even
    // though the function itself could never evaluate.
    let push = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "push",
        vec![Node::function(vec!["x"], Node::ident("y"))],
    );
    assert!((mutator.test)(&push));
    assert_eq!(
        (mutator.eval)(&push).expect("push should fold"),
        Node::num(3.0)
    );

    let push_new = Node::method_call(
        Node::array(vec![]),
        "push",
        vec![Node::new_expr(Node::ident("Date"), vec![])],
    );
    assert!((mutator.test)(&push_new));
    assert_eq!(
        (mutator.eval)(&push_new).expect("push should fold"),
        Node::num(1.0)
    );

    // Unknown arguments outside those two shapes stay rejected
    let push_unknown = Node::method_call(
        Node::array(vec![]),
        "push",
        vec![Node::ident("x")],
    );
    assert!(!(mutator.test)(&push_unknown));
}

#[test]
fn mutator_rule_covers_pop_and_shift_return_values() {
    let mutator = rule("safe_mutators");

    let pop = Node::method_call(
        Node::array(vec![Node::num(1.0), Node::num(2.0)]),
        "pop",
        vec![],
    );
    assert!((mutator.test)(&pop));
    assert_eq!(
        (mutator.eval)(&pop).expect("pop should fold"),
        Node::num(2.0)
    );

    let shift = Node::method_call(
        Node::array(vec![Node::str("a"), Node::str("b")]),
        "shift",
        vec![],
    );
    assert!((mutator.test)(&shift));
    assert_eq!(
        (mutator.eval)(&shift).expect("shift should fold"),
        Node::str("a")
    );
}
