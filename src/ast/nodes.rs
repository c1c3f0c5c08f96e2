use serde::{Deserialize, Serialize};

// Expression trees for a dynamically-typed, C-family scripting language.
// A parent exclusively owns its children; well-formed input has no sharing
// and no cycles. Literal values carry their runtime representation directly
// so the folder can rebuild them without a source round-trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    Incr,
    Decr,
}

// One key/value pair of an object literal.
// Identifier keys and string-literal keys are the same thing semantically,
// so both are stored as a plain string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: Node,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Literal(Literal),
    Ident(String),
    This,
    Array(Vec<Node>),
    Object(Vec<Property>),
    Member {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    New {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Conditional {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    Sequence(Vec<Node>),
    // Function bodies are a single result expression. Statement bodies are
    // out of scope for the folder, which never optimizes statements.
    Function {
        params: Vec<String>,
        body: Box<Node>,
    },
}

impl Node {
    pub fn num(value: f64) -> Node {
        Node::Literal(Literal::Num(value))
    }

    pub fn str(value: impl Into<String>) -> Node {
        Node::Literal(Literal::Str(value.into()))
    }

    pub fn bool(value: bool) -> Node {
        Node::Literal(Literal::Bool(value))
    }

    pub fn null() -> Node {
        Node::Literal(Literal::Null)
    }

    pub fn ident(name: impl Into<String>) -> Node {
        Node::Ident(name.into())
    }

    pub fn array(elements: Vec<Node>) -> Node {
        Node::Array(elements)
    }

    pub fn object(pairs: Vec<(&str, Node)>) -> Node {
        Node::Object(
            pairs
                .into_iter()
                .map(|(key, value)| Property {
                    key: key.to_string(),
                    value,
                })
                .collect(),
        )
    }

    // Static (dot) member access: `object.name`
    pub fn member(object: Node, name: impl Into<String>) -> Node {
        Node::Member {
            object: Box::new(object),
            property: Box::new(Node::Ident(name.into())),
            computed: false,
        }
    }

    // Computed member access: `object[property]`
    pub fn computed_member(object: Node, property: Node) -> Node {
        Node::Member {
            object: Box::new(object),
            property: Box::new(property),
            computed: true,
        }
    }

    pub fn call(callee: Node, args: Vec<Node>) -> Node {
        Node::Call {
            callee: Box::new(callee),
            args,
        }
    }

    // Method call shorthand: `receiver.name(args)`
    pub fn method_call(receiver: Node, name: impl Into<String>, args: Vec<Node>) -> Node {
        Node::call(Node::member(receiver, name), args)
    }

    pub fn new_expr(callee: Node, args: Vec<Node>) -> Node {
        Node::New {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Node {
        Node::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn update(op: UpdateOp, prefix: bool, operand: Node) -> Node {
        Node::Update {
            op,
            prefix,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(op: LogicalOp, left: Node, right: Node) -> Node {
        Node::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(test: Node, consequent: Node, alternate: Node) -> Node {
        Node::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn function(params: Vec<&str>, body: Node) -> Node {
        Node::Function {
            params: params.into_iter().map(str::to_string).collect(),
            body: Box::new(body),
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self, Node::Literal(Literal::Str(_)))
    }

    pub fn is_number_literal(&self) -> bool {
        matches!(self, Node::Literal(Literal::Num(_)))
    }

    // Object-valued in the object language: arrays, plain objects,
    // functions and the implicit receiver are all truthy reference values.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Node::Array(_) | Node::Object(_) | Node::Function { .. } | Node::This
        )
    }

    // The statically known property name of a member access, if any:
    // a non-computed identifier property or a computed string-literal key.
    pub fn static_member_name(&self) -> Option<&str> {
        match self {
            Node::Member {
                property, computed, ..
            } => match (property.as_ref(), computed) {
                (Node::Ident(name), false) => Some(name),
                (Node::Literal(Literal::Str(key)), true) => Some(key),
                _ => None,
            },
            _ => None,
        }
    }
}
