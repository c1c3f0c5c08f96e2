use crate::ast::nodes::{Node, Property, UnaryOp};
use crate::fold::errors::EvalError;
use crate::fold::interpreter;
use crate::fold::value::Value;
use crate::return_eval_error;

// Evaluate a proven-safe node and rebuild an equivalent literal/structural
// node from the result. The caller must leave the original subtree alone on
// error; a failed fold never aborts the whole transform.
pub fn eval_node(node: &Node) -> Result<Node, EvalError> {
    let value = interpreter::eval(node)?;
    node_from_value(&value)
}

// Reconstruction of values as nodes.
//
// The grammar has no literals for negative numbers, NaN, infinity or
// undefined, so those come back in the spelled-out forms a generator can
// print: unary minus, the `NaN`/`Infinity` names, `void 0`. Function and
// opaque values re-emit the node they carry, verbatim and unevaluated; a
// function that captured bindings has no node-grammar equivalent.
pub fn node_from_value(value: &Value) -> Result<Node, EvalError> {
    match value {
        Value::Num(n) => Ok(number_node(*n)),
        Value::Str(s) => Ok(Node::str(s.clone())),
        Value::Bool(b) => Ok(Node::bool(*b)),
        Value::Null => Ok(Node::null()),
        Value::Undefined => Ok(Node::unary(UnaryOp::Void, Node::num(0.0))),

        Value::Array(elements) => {
            let mut nodes = Vec::with_capacity(elements.len());
            for element in elements {
                nodes.push(node_from_value(element)?);
            }
            Ok(Node::Array(nodes))
        }

        Value::Object(pairs) => {
            let mut props = Vec::with_capacity(pairs.len());
            for (key, val) in pairs {
                props.push(Property {
                    key: key.clone(),
                    value: node_from_value(val)?,
                });
            }
            Ok(Node::Object(props))
        }

        Value::Function(function) => {
            if !function.captured.is_empty() {
                return_eval_error!(
                    Unrepresentable,
                    "function value carrying captured state"
                );
            }
            Ok(function.node.clone())
        }

        Value::Opaque(node) => Ok(node.clone()),
    }
}

fn number_node(n: f64) -> Node {
    if n.is_nan() {
        return Node::ident("NaN");
    }
    if n.is_infinite() {
        let inf = Node::ident("Infinity");
        return if n > 0.0 {
            inf
        } else {
            Node::unary(UnaryOp::Minus, inf)
        };
    }
    if n < 0.0 {
        return Node::unary(UnaryOp::Minus, Node::num(-n));
    }
    // Fold negative zero to plain zero
    Node::num(if n == 0.0 { 0.0 } else { n })
}
