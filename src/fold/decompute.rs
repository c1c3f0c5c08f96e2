use crate::ast::nodes::{Literal, Node};

// Decomputation: rewrite `a["b"]` into `a.b` wherever the key is a literal
// string that can be spelled as a static name. Pure normalization,
// independent of foldability; it widens what the classifier's name-based
// collision checks can recognize. Innermost accesses rewrite first.
pub fn decompute(node: &mut Node) {
    for_each_child_mut(node, decompute);

    if let Node::Member {
        property, computed, ..
    } = node
    {
        if !*computed {
            return;
        }
        if let Node::Literal(Literal::Str(key)) = property.as_ref() {
            // Keys like "two words" have no dot-form spelling
            if is_identifier_name(key) {
                *property = Box::new(Node::Ident(key.clone()));
                *computed = false;
            }
        }
    }
}

fn is_identifier_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// Apply `visit` to every direct child expression of a node.
pub fn for_each_child_mut(node: &mut Node, mut visit: impl FnMut(&mut Node)) {
    match node {
        Node::Literal(_) | Node::Ident(_) | Node::This => {}
        Node::Array(elements) | Node::Sequence(elements) => {
            for element in elements {
                visit(element);
            }
        }
        Node::Object(props) => {
            for prop in props {
                visit(&mut prop.value);
            }
        }
        Node::Member {
            object,
            property,
            computed,
        } => {
            visit(object);
            if *computed {
                visit(property);
            }
        }
        Node::Call { callee, args } | Node::New { callee, args } => {
            visit(callee);
            for arg in args {
                visit(arg);
            }
        }
        Node::Unary { operand, .. } | Node::Update { operand, .. } => visit(operand),
        Node::Binary { left, right, .. } | Node::Logical { left, right, .. } => {
            visit(left);
            visit(right);
        }
        Node::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visit(test);
            visit(consequent);
            visit(alternate);
        }
        Node::Function { body, .. } => visit(body),
    }
}
