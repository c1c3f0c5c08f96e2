use crate::ast::nodes::Node;
use rustc_hash::FxHashSet;

// Free-variable analysis over function bodies.
//
// A function is isolated when its body references no identifier from an
// enclosing scope and never touches the implicit call receiver. Isolated
// functions are the only ones the folder will pass through to higher-order
// built-ins, and the only ones the interpreter will ever call.

// Identifier names referenced, but not bound, by a function's body.
// Global names (`undefined`, `NaN`, the math namespace, ...) count as free:
// the folder refuses to assume anything about the enclosing environment.
pub fn free_variables(func: &Node) -> FxHashSet<String> {
    let mut free = FxHashSet::default();
    if let Node::Function { params, body } = func {
        let mut bound: FxHashSet<String> = params.iter().cloned().collect();
        collect_free(body, &mut bound, &mut free);
    }
    free
}

pub fn references_this(node: &Node) -> bool {
    match node {
        Node::This => true,
        Node::Literal(_) | Node::Ident(_) => false,
        Node::Array(elements) | Node::Sequence(elements) => {
            elements.iter().any(references_this)
        }
        Node::Object(props) => props.iter().any(|prop| references_this(&prop.value)),
        Node::Member {
            object,
            property,
            computed,
        } => references_this(object) || (*computed && references_this(property)),
        Node::Call { callee, args } | Node::New { callee, args } => {
            references_this(callee) || args.iter().any(references_this)
        }
        Node::Unary { operand, .. } | Node::Update { operand, .. } => references_this(operand),
        Node::Binary { left, right, .. } | Node::Logical { left, right, .. } => {
            references_this(left) || references_this(right)
        }
        Node::Conditional {
            test,
            consequent,
            alternate,
        } => references_this(test) || references_this(consequent) || references_this(alternate),
        Node::Function { body, .. } => references_this(body),
    }
}

pub fn is_isolated(node: &Node) -> bool {
    if !matches!(node, Node::Function { .. }) {
        return false;
    }
    free_variables(node).is_empty() && !references_this(node)
}

fn collect_free(node: &Node, bound: &mut FxHashSet<String>, free: &mut FxHashSet<String>) {
    match node {
        Node::Ident(name) => {
            if !bound.contains(name) {
                free.insert(name.clone());
            }
        }
        Node::Literal(_) | Node::This => {}
        Node::Array(elements) | Node::Sequence(elements) => {
            for element in elements {
                collect_free(element, bound, free);
            }
        }
        Node::Object(props) => {
            // Keys are names, not references
            for prop in props {
                collect_free(&prop.value, bound, free);
            }
        }
        Node::Member {
            object,
            property,
            computed,
        } => {
            collect_free(object, bound, free);
            if *computed {
                collect_free(property, bound, free);
            }
        }
        Node::Call { callee, args } | Node::New { callee, args } => {
            collect_free(callee, bound, free);
            for arg in args {
                collect_free(arg, bound, free);
            }
        }
        Node::Unary { operand, .. } | Node::Update { operand, .. } => {
            collect_free(operand, bound, free);
        }
        Node::Binary { left, right, .. } | Node::Logical { left, right, .. } => {
            collect_free(left, bound, free);
            collect_free(right, bound, free);
        }
        Node::Conditional {
            test,
            consequent,
            alternate,
        } => {
            collect_free(test, bound, free);
            collect_free(consequent, bound, free);
            collect_free(alternate, bound, free);
        }
        Node::Function { params, body } => {
            // Nested function: its params shadow, everything else leaks out
            let shadowed: Vec<&String> =
                params.iter().filter(|p| !bound.contains(*p)).collect();
            for param in &shadowed {
                bound.insert((*param).clone());
            }
            collect_free(body, bound, free);
            for param in shadowed {
                bound.remove(param);
            }
        }
    }
}
