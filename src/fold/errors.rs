use std::fmt;

// The evaluator is the only part of the folder that raises.
// Classifier and resolver functions return sentinel results instead, so a
// static-analysis miss is only ever observable as under-folding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Evaluation itself failed the way the object language would fail
    // (type errors, unknown identifiers, out-of-range arguments).
    Execution,

    // The resulting value has no equivalent in the node grammar
    // (builtin function values, closures carrying captured state).
    Unrepresentable,

    // The subtree uses an operation the scoped interpreter does not carry.
    Unsupported,
}

#[derive(Clone, Debug)]
pub struct EvalError {
    pub msg: String,
    pub kind: EvalErrorKind,
}

impl EvalError {
    pub fn new(msg: impl Into<String>, kind: EvalErrorKind) -> EvalError {
        EvalError {
            msg: msg.into(),
            kind,
        }
    }

    pub fn execution(msg: impl Into<String>) -> EvalError {
        EvalError::new(msg, EvalErrorKind::Execution)
    }

    pub fn unrepresentable(msg: impl Into<String>) -> EvalError {
        EvalError::new(msg, EvalErrorKind::Unrepresentable)
    }

    pub fn unsupported(msg: impl Into<String>) -> EvalError {
        EvalError::new(msg, EvalErrorKind::Unsupported)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EvalErrorKind::Execution => write!(f, "evaluation failed: {}", self.msg),
            EvalErrorKind::Unrepresentable => {
                write!(f, "result not representable as a node: {}", self.msg)
            }
            EvalErrorKind::Unsupported => write!(f, "unsupported operation: {}", self.msg),
        }
    }
}

impl std::error::Error for EvalError {}

// Early-return helper in the style of the compiler error macros.
// `return_eval_error!(Execution, "unknown identifier '{}'", name)`
#[macro_export]
macro_rules! return_eval_error {
    ($kind:ident, $($arg:tt)*) => {
        return Err($crate::fold::errors::EvalError::new(
            format!($($arg)*),
            $crate::fold::errors::EvalErrorKind::$kind,
        ))
    };
}
