//! # astfold
//!
//! Static partial evaluator for expression trees of a dynamically-typed,
//! C-family scripting language: subtrees that are provably computable
//! without observing unknown external state are rewritten in place to an
//! equivalent literal form, and everything else is left untouched.
//!
//! ```
//! use astfold::{fold_tree, FoldOptions, BinaryOp, Node};
//!
//! // 1 + 2 + 4
//! let mut tree = Node::binary(
//!     BinaryOp::Add,
//!     Node::binary(BinaryOp::Add, Node::num(1.0), Node::num(2.0)),
//!     Node::num(4.0),
//! );
//! fold_tree(&mut tree, &FoldOptions::new());
//! assert_eq!(tree, Node::num(7.0));
//! ```
//!
//! Parsing source text into trees and printing trees back out are the
//! caller's collaborators; this crate only ever sees and returns nodes.

pub mod ast {
    pub mod nodes;
}

pub mod fold {
    pub mod builtins;
    pub mod call_shape;
    pub mod decompute;
    pub mod dev_logging;
    pub mod errors;
    pub mod evaluator;
    pub mod interpreter;
    pub mod rules;
    pub mod safety;
    pub mod scope;
    pub mod transform;
    pub mod value;

    pub(crate) mod tests {
        pub(crate) mod call_shape_tests;
        pub(crate) mod interpreter_tests;
        pub(crate) mod rules_tests;
        pub(crate) mod safety_tests;
        pub(crate) mod transform_tests;
    }
}

pub use ast::nodes::{BinaryOp, Literal, LogicalOp, Node, Property, UnaryOp, UpdateOp};
pub use fold::errors::{EvalError, EvalErrorKind};
pub use fold::transform::{fold_tree, Extern, FoldOptions};
pub use fold::value::Value;
