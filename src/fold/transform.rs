use crate::ast::nodes::Node;
use crate::fold::decompute::{decompute, for_each_child_mut};
use crate::fold::errors::EvalError;
use crate::fold::evaluator::eval_node;
use crate::fold::rules::RULES;
use crate::fold::safety::is_simple;
use crate::fold_log;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// Marker for an externally-known-pure binding. Declared for callers that
// already know their environment; the classifier does not consult these yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extern {
    Pure,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FoldOptions {
    // Reserved: only accept a fold when the serialized replacement is no
    // longer than the original. Currently a no-op placeholder.
    pub optimize: bool,

    // Run the decomputation pass before folding.
    pub decompute: bool,

    // Assumed-safe external bindings. Declared, currently inert.
    pub externs: FxHashMap<String, Extern>,
}

impl FoldOptions {
    pub fn new() -> FoldOptions {
        FoldOptions::default()
    }

    pub fn with_optimize(mut self, optimize: bool) -> FoldOptions {
        self.optimize = optimize;
        self
    }

    pub fn with_decompute(mut self, decompute: bool) -> FoldOptions {
        self.decompute = decompute;
        self
    }

    pub fn with_extern(mut self, name: impl Into<String>, marker: Extern) -> FoldOptions {
        self.externs.insert(name.into(), marker);
        self
    }
}

// The transform entry point: fold every provably-safe subtree of the tree
// in place. A pure function of the input tree and its options; the caller
// keeps ownership of the tree throughout.
pub fn fold_tree(tree: &mut Node, options: &FoldOptions) {
    if options.decompute {
        decompute(tree);
    }
    fold_node(tree, options);
}

// Depth-first driver, children before parents: a parent that only becomes
// foldable once its children are literal still gets its attempt in the same
// pass. A successful replacement is re-visited until it settles; rejected
// or failed nodes are simply left as their (already folded) children stand.
fn fold_node(node: &mut Node, options: &FoldOptions) {
    if matches!(node, Node::Literal(_) | Node::Ident(_)) {
        return;
    }

    for_each_child_mut(node, |child| fold_node(child, options));

    match attempt_fold(node) {
        Ok(Some(replacement)) => {
            fold_log!("folded subtree via ", replacement_kind(&replacement));
            *node = replacement;
            // The replacement is new material; give it the same chance
            fold_node(node, options);
        }
        Ok(None) => {}
        Err(error) => {
            // Scoped to this fold attempt only: leave the subtree
            // unmodified.
            fold_log!("fold attempt failed: ", error.to_string());
            let _ = error;
        }
    }
}

// Calls get rule-table dispatch first; each rule's test is its own safety
// gate, which is what lets the mutator rule carry function/new-expression
// arguments the classifier would reject. Unclaimed calls and every other
// node kind stay behind the classifier.
fn attempt_fold(node: &Node) -> Result<Option<Node>, EvalError> {
    let result = if let Node::Call { .. } = node {
        match RULES.iter().find(|rule| (rule.test)(node)) {
            Some(rule) => {
                fold_log!("dispatching fold rule ", rule.name);
                (rule.eval)(node)?
            }
            None if is_simple(node) => eval_node(node)?,
            None => return Ok(None),
        }
    } else if is_simple(node) {
        eval_node(node)?
    } else {
        return Ok(None);
    };

    if result == *node {
        Ok(None)
    } else {
        Ok(Some(result))
    }
}

#[cfg(feature = "show_fold")]
fn replacement_kind(node: &Node) -> &'static str {
    match node {
        Node::Literal(_) => "literal",
        Node::Array(_) => "array",
        Node::Object(_) => "object",
        _ => "expression",
    }
}

#[cfg(not(feature = "show_fold"))]
#[allow(dead_code)]
fn replacement_kind(_node: &Node) -> &'static str {
    ""
}
