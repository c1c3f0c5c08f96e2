use crate::ast::nodes::Node;
use crate::fold::errors::EvalError;
use crate::return_eval_error;
use serde::{Deserialize, Serialize};

// Runtime values of the object language, limited to the literal-constructible
// subset the folder can rebuild into nodes. Function values carry the
// original node verbatim (plus any captured bindings when created inside a
// call); Opaque carries a node the interpreter refuses to evaluate but is
// allowed to move around unchanged (new-expressions in mutator arguments).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
    Function(FunctionValue),
    Opaque(Node),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionValue {
    pub node: Node,
    // (name, value) bindings captured at creation. Non-empty captures make
    // the value unrepresentable as a node.
    pub captured: Vec<(String, Value)>,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            // typeof null is "object" in the object language
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Opaque(_) => "object",
            Value::Undefined => "undefined",
            Value::Function(_) => "function",
        }
    }

    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Opaque(_)
        )
    }

    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Null | Value::Undefined => false,
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Opaque(_) => true,
        }
    }

    pub fn to_number(&self) -> Result<f64, EvalError> {
        match self {
            Value::Num(n) => Ok(*n),
            Value::Bool(true) => Ok(1.0),
            Value::Bool(false) | Value::Null => Ok(0.0),
            Value::Undefined => Ok(f64::NAN),
            Value::Str(s) => Ok(string_to_number(s)),
            Value::Array(_) => Ok(string_to_number(&self.to_string_value()?)),
            Value::Object(_) => Ok(f64::NAN),
            Value::Function(_) | Value::Opaque(_) => {
                return_eval_error!(Unsupported, "cannot coerce {} to a number", self.type_name())
            }
        }
    }

    pub fn to_string_value(&self) -> Result<String, EvalError> {
        match self {
            Value::Num(n) => Ok(number_to_string(*n)),
            Value::Str(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok("null".to_string()),
            Value::Undefined => Ok("undefined".to_string()),
            Value::Array(elements) => {
                let mut parts = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Value::Null | Value::Undefined => parts.push(String::new()),
                        other => parts.push(other.to_string_value()?),
                    }
                }
                Ok(parts.join(","))
            }
            Value::Object(_) => Ok("[object Object]".to_string()),
            Value::Function(_) | Value::Opaque(_) => {
                return_eval_error!(Unsupported, "cannot coerce {} to a string", self.type_name())
            }
        }
    }

    // ToPrimitive for the operators that need it: reference values collapse
    // to their string form, primitives pass through.
    pub fn to_primitive(&self) -> Result<Value, EvalError> {
        match self {
            Value::Array(_) | Value::Object(_) => Ok(Value::Str(self.to_string_value()?)),
            Value::Function(_) | Value::Opaque(_) => {
                return_eval_error!(
                    Unsupported,
                    "cannot coerce {} to a primitive",
                    self.type_name()
                )
            }
            primitive => Ok(primitive.clone()),
        }
    }
}

// `===`. Reference values in the object language compare by identity, and
// every value here is freshly constructed, so they never compare equal.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        (Value::Undefined, Value::Undefined) => true,
        _ => false,
    }
}

// SameValueZero, used by membership tests: like `===` but NaN matches NaN.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    if let (Value::Num(x), Value::Num(y)) = (a, b) {
        return x == y || (x.is_nan() && y.is_nan());
    }
    strict_eq(a, b)
}

// `==` with the object language's abstract-equality coercions.
pub fn loose_eq(a: &Value, b: &Value) -> Result<bool, EvalError> {
    match (a, b) {
        (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => Ok(true),
        (Value::Null | Value::Undefined, _) | (_, Value::Null | Value::Undefined) => Ok(false),
        _ if a.is_object_like() && b.is_object_like() => Ok(false),
        _ if a.is_object_like() => loose_eq(&a.to_primitive()?, b),
        _ if b.is_object_like() => loose_eq(a, &b.to_primitive()?),
        (Value::Num(x), Value::Num(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        // Mixed primitives compare numerically
        _ => Ok(a.to_number()? == b.to_number()?),
    }
}

pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return match i64::from_str_radix(hex, 16) {
            Ok(n) => n as f64,
            Err(_) => f64::NAN,
        };
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

// Code points above the basic plane split into surrogate pairs in the
// object language's UTF-16 strings; callers that index, measure or order
// strings refuse such input rather than miscount.
pub fn has_supplementary(s: &str) -> bool {
    s.chars().any(|c| c as u32 > 0xFFFF)
}

// The object language prints numbers in decimal for magnitudes within
// [1e-6, 1e21) and in exponent notation outside, always with the shortest
// round-tripping digit string.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Negative zero prints as plain zero
        return "0".to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // `{:e}` yields the shortest mantissa with a single leading digit
    let shortest = format!("{:e}", n);
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return shortest;
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the digit string
    let point = exponent + 1;

    if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        format!("{}.{}", &digits[..point as usize], &digits[point as usize..])
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat(-point as usize), digits)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        if k == 1 {
            format!("{}e{}{}", digits, sign, exponent.abs())
        } else {
            format!("{}.{}e{}{}", &digits[..1], &digits[1..], sign, exponent.abs())
        }
    }
}

// Integer conversions for the bitwise operators.
pub fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    let modulo = n.trunc().rem_euclid(4_294_967_296.0);
    if modulo >= 2_147_483_648.0 {
        (modulo - 4_294_967_296.0) as i32
    } else {
        modulo as i32
    }
}

pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}
