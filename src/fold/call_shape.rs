use crate::ast::nodes::Node;

// Canonical shape of a built-in method call: the receiver the method runs
// against, the method name, and the effective argument list. Covers direct
// calls plus the `call`/`apply` indirection forms. Anything else is
// unrecognized, which every caller treats as "do not fold via the rules".
#[derive(Debug)]
pub struct CallShape<'a> {
    pub receiver: &'a Node,
    pub method: &'a str,
    pub args: &'a [Node],
}

// Normalize a Call node into a CallShape.
//
// - `a.b(args...)` where `a` is not itself a member chain and `b` is a
//   static property.
// - `a.b.call(ctx, args...)` drops `ctx` and takes the remaining args.
//   The context operand is discarded without validating it against `a`.
// - `a.b.apply(ctx, argsArray)` only when `argsArray` is a literal array
//   node; its elements become the argument list.
pub fn resolve_call_shape(node: &Node) -> Option<CallShape<'_>> {
    let Node::Call { callee, args } = node else {
        return None;
    };
    let Node::Member {
        object,
        property,
        computed,
    } = callee.as_ref()
    else {
        return None;
    };

    match object.as_ref() {
        // a.b(args...)
        receiver if !matches!(receiver, Node::Member { .. }) => {
            if *computed {
                return None;
            }
            let Node::Ident(method) = property.as_ref() else {
                return None;
            };
            Some(CallShape {
                receiver,
                method,
                args,
            })
        }

        // a.b.call(...) / a.b.apply(...)
        Node::Member {
            object: receiver,
            property: method,
            computed: method_computed,
        } => {
            if *computed || *method_computed || matches!(receiver.as_ref(), Node::Member { .. }) {
                return None;
            }
            let Node::Ident(method) = method.as_ref() else {
                return None;
            };
            match property.as_ref() {
                Node::Ident(indirection) if indirection == "call" => Some(CallShape {
                    receiver,
                    method,
                    args: if args.is_empty() { args } else { &args[1..] },
                }),
                Node::Ident(indirection) if indirection == "apply" => match args.get(1) {
                    Some(Node::Array(elements)) => Some(CallShape {
                        receiver,
                        method,
                        args: elements,
                    }),
                    _ => None,
                },
                _ => None,
            }
        }

        _ => None,
    }
}

// Leftmost object of a member chain: `a.b.c` resolves to `a`.
pub fn member_root(node: &Node) -> Option<&Node> {
    let Node::Member { .. } = node else {
        return None;
    };
    let mut current = node;
    while let Node::Member { object, .. } = current {
        current = object;
    }
    Some(current)
}
