use crate::ast::nodes::{Literal, Node, UnaryOp};
use crate::fold::builtins;
use crate::fold::call_shape::resolve_call_shape;
use crate::fold::errors::EvalError;
use crate::fold::evaluator::eval_node;
use crate::fold::safety::is_simple;
use crate::return_eval_error;

// Priority-ordered fold rules for built-in method call shapes.
//
// The table is static configuration: the traversal driver walks it in
// order at each safe Call node and the first rule whose test passes
// produces the replacement. New built-in foldings slot in here without
// touching the driver.
pub struct Rule {
    pub name: &'static str,
    pub test: fn(&Node) -> bool,
    pub eval: fn(&Node) -> Result<Node, EvalError>,
}

pub static RULES: &[Rule] = &[
    // Concatenation is associative: `[].concat(a, b) === [].concat(a).concat(b)`.
    // Folding argument-by-argument bounds each evaluation to the smallest
    // unit, so one stubborn argument cannot spoil the rest.
    Rule {
        name: "concat_associativity",
        test: test_concat,
        eval: eval_concat,
    },
    // Generic mapping methods on a safe receiver with safe arguments fold
    // in one evaluator step.
    Rule {
        name: "mapping_methods",
        test: test_mapping,
        eval: eval_node,
    },
    // Deterministic array/string methods; function and new-expression
    // arguments ride through unevaluated.
    Rule {
        name: "safe_mutators",
        test: test_mutator,
        eval: eval_node,
    },
];

// A node that can be copied into a result structure without re-evaluation:
// a scalar literal (or its negated spelling). Array and object literals are
// deliberately not transferable as concat arguments, because concat splices
// arrays instead of copying them whole.
pub fn is_transferable(node: &Node) -> bool {
    match node {
        Node::Literal(_) => true,
        Node::Unary {
            op: UnaryOp::Minus | UnaryOp::Plus,
            operand,
        } => matches!(operand.as_ref(), Node::Literal(Literal::Num(_))),
        _ => false,
    }
}

fn test_concat(node: &Node) -> bool {
    let Some(shape) = resolve_call_shape(node) else {
        return false;
    };
    if shape.method != "concat" {
        return false;
    }
    let Node::Array(elements) = shape.receiver else {
        return false;
    };
    elements
        .iter()
        .all(|element| is_transferable(element) || is_simple(element))
        && shape
            .args
            .iter()
            .all(|arg| is_transferable(arg) || is_simple(arg))
}

// Build the result array incrementally, preserving left-to-right order:
// transferable arguments are appended as single elements, anything else is
// folded in isolation as `[].concat(arg)` and its elements spliced in.
// Concatenating zero arguments is the identity transform.
fn eval_concat(node: &Node) -> Result<Node, EvalError> {
    let Some(shape) = resolve_call_shape(node) else {
        return_eval_error!(Execution, "concat rule applied to an unrecognized call");
    };
    let Node::Array(elements) = shape.receiver else {
        return_eval_error!(Execution, "concat rule applied to a non-array receiver");
    };

    let mut result = elements.clone();
    for arg in shape.args {
        if is_transferable(arg) {
            result.push(arg.clone());
            continue;
        }
        let folded = eval_node(&Node::method_call(
            Node::Array(Vec::new()),
            "concat",
            vec![arg.clone()],
        ))?;
        match folded {
            Node::Array(spliced) => result.extend(spliced),
            other => {
                return_eval_error!(
                    Execution,
                    "concat of a single argument produced a non-array: {:?}",
                    other
                )
            }
        }
    }
    Ok(Node::Array(result))
}

fn test_mapping(node: &Node) -> bool {
    let Some(shape) = resolve_call_shape(node) else {
        return false;
    };
    literal_receiver(shape.receiver)
        && is_simple(shape.receiver)
        && builtins::is_builtin_call_method(shape.method)
        && shape.args.iter().all(is_simple)
}

fn test_mutator(node: &Node) -> bool {
    let Some(shape) = resolve_call_shape(node) else {
        return false;
    };
    literal_receiver(shape.receiver)
        && is_simple(shape.receiver)
        && builtins::is_mutator_method(shape.method)
        && builtins::is_builtin_call_method(shape.method)
        && shape.args.iter().all(|arg| {
            matches!(arg, Node::Function { .. } | Node::New { .. }) || is_simple(arg)
        })
}

fn literal_receiver(node: &Node) -> bool {
    matches!(node, Node::Array(_)) || node.is_string_literal()
}
