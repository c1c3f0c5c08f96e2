use crate::ast::nodes::{Literal, Node};
use crate::fold::builtins;
use crate::fold::call_shape::resolve_call_shape;
use crate::fold::interpreter;
use crate::fold::scope::is_isolated;
use crate::fold::value::{number_to_string, Value};
use crate::safety_log;

// The safety classifier: decides whether a subtree is foldable.
//
// A pure predicate, never raises; unrecognized shapes are simply not safe.
// Compound call/member patterns are tried before the generic structural
// recursion so the better-understood shapes take precedence.
//
// Two deliberate over-approximations are carried from the original design
// and documented rather than fixed: the generic call fallback assumes a
// safe callee with safe arguments is pure, and binary operators may invoke
// value coercion on object operands. The interpreter's closed world keeps
// both from reaching arbitrary behaviour at fold time.
pub fn is_simple(node: &Node) -> bool {
    match node {
        Node::Call { callee, args } => {
            // Built-in method call on an array/string literal receiver;
            // arguments may be safe values or bare function expressions
            // (function identity passes through to higher-order methods).
            if let Some(shape) = resolve_call_shape(node) {
                if is_literal_receiver(shape.receiver)
                    && is_simple(shape.receiver)
                    && builtins::is_builtin_call_method(shape.method)
                    && shape
                        .args
                        .iter()
                        .all(|arg| is_simple(arg) || matches!(arg, Node::Function { .. }))
                {
                    return true;
                }
            }

            // Fallback: callee and arguments all safe. An explicit,
            // deliberately unsound assumption that such calls are pure.
            is_simple(callee) && args.iter().all(is_simple)
        }

        Node::Member {
            object,
            property,
            computed,
        } => {
            if is_math_namespace(object) {
                return is_safe_math_access(property, *computed);
            }

            if !is_simple(object) {
                safety_log!("member object is not simple");
                return false;
            }

            // Name-based collision check: the access must not dispatch
            // into the built-in method table for the receiver's kind, and
            // that requires a statically known property key.
            let Some(name) = static_member_key(node) else {
                return false;
            };
            match object.as_ref() {
                Node::Object(_) => !builtins::is_object_member(&name),
                Node::Array(_) => !builtins::is_array_member(&name),
                Node::Function { .. } => !builtins::is_function_member(&name),
                Node::Literal(Literal::Str(_)) => !builtins::is_string_member(&name),
                Node::Literal(Literal::Num(_)) => !builtins::is_number_member(&name),
                _ => false,
            }
        }

        // Simple structural shapes go last so the patterns above win.
        Node::Literal(_) => true,
        Node::Array(elements) => elements.iter().all(is_simple),
        Node::Object(props) => props.iter().all(|prop| is_simple(&prop.value)),

        Node::Unary { operand, .. } => is_simple(operand),

        // Known soundness gap carried from the original: the operand is
        // checked, the mutation is not. Evaluation rejects these anyway.
        Node::Update { operand, .. } => is_simple(operand),

        // Short-circuit sides may be object-like values that never coerce.
        Node::Logical { left, right, .. } => {
            (left.is_object_like() || is_simple(left))
                && (right.is_object_like() || is_simple(right))
        }

        Node::Binary { left, right, .. } => is_simple(left) && is_simple(right),

        Node::Conditional {
            test,
            consequent,
            alternate,
        } => is_simple(test) && is_simple(consequent) && is_simple(alternate),

        Node::Sequence(expressions) => expressions.iter().all(is_simple),

        // An isolated function is safe to preserve verbatim (and for the
        // interpreter to call), never to fold by itself.
        Node::Function { .. } => is_isolated(node),

        Node::Ident(_) | Node::This | Node::New { .. } => false,
    }
}

// The statically known property key of a member access: a dot-form name, a
// computed string-literal key, or any other computed literal key spelled
// the way property lookup spells it (numeric indices in particular).
fn static_member_key(node: &Node) -> Option<String> {
    if let Some(name) = node.static_member_name() {
        return Some(name.to_string());
    }
    let Node::Member {
        property,
        computed: true,
        ..
    } = node
    else {
        return None;
    };
    match property.as_ref() {
        Node::Literal(Literal::Num(n)) => Some(number_to_string(*n)),
        Node::Literal(Literal::Bool(b)) => Some(b.to_string()),
        Node::Literal(Literal::Null) => Some("null".to_string()),
        _ => None,
    }
}

// Receivers the built-in call allow-list applies to.
fn is_literal_receiver(node: &Node) -> bool {
    matches!(node, Node::Array(_)) || node.is_string_literal()
}

fn is_math_namespace(node: &Node) -> bool {
    matches!(node, Node::Ident(name) if name == builtins::MATH_NAMESPACE)
}

// Accessing the reserved numeric namespace by a static name, or by a
// computed property that itself folds to one of its known member names.
fn is_safe_math_access(property: &Node, computed: bool) -> bool {
    if !computed {
        return matches!(property, Node::Ident(name) if builtins::is_math_member(name));
    }
    if !is_simple(property) {
        return false;
    }
    match interpreter::eval(property) {
        Ok(Value::Str(name)) => builtins::is_math_member(&name),
        _ => false,
    }
}
