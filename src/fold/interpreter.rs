use crate::ast::nodes::{BinaryOp, Literal, LogicalOp, Node, UnaryOp};
use crate::fold::builtins;
use crate::fold::call_shape::resolve_call_shape;
use crate::fold::errors::EvalError;
use crate::fold::scope::free_variables;
use crate::fold::value::{
    has_supplementary, loose_eq, same_value_zero, strict_eq, to_int32, to_uint32, FunctionValue,
    Value,
};
use crate::return_eval_error;
use rustc_hash::FxHashMap;

// Narrowly scoped interpreter for proven-safe subtrees.
//
// This is the host-execution collaborator realized in-crate: it carries the
// object language's real semantics for the literal-constructible value
// subset plus the fixed math namespace and the built-in array/string
// methods, and nothing else. It has no I/O capability and no ambient
// environment; anything outside its closed world fails with an EvalError,
// which the traversal driver treats as "leave the subtree alone".

type Env = FxHashMap<String, Value>;

pub fn eval(node: &Node) -> Result<Value, EvalError> {
    eval_in_env(node, &Env::default())
}

fn eval_in_env(node: &Node, env: &Env) -> Result<Value, EvalError> {
    match node {
        Node::Literal(lit) => Ok(match lit {
            Literal::Num(n) => Value::Num(*n),
            Literal::Str(s) => Value::Str(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
        }),

        Node::Ident(name) => match env.get(name) {
            Some(value) => Ok(value.clone()),
            None => return_eval_error!(Execution, "unknown identifier '{}'", name),
        },

        Node::This => {
            return_eval_error!(Execution, "implicit call receiver is not available")
        }

        Node::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(eval_in_env(element, env)?);
            }
            Ok(Value::Array(values))
        }

        Node::Object(props) => {
            let mut pairs = Vec::with_capacity(props.len());
            for prop in props {
                pairs.push((prop.key.clone(), eval_in_env(&prop.value, env)?));
            }
            Ok(Value::Object(pairs))
        }

        Node::Function { .. } => {
            // Capture only the bindings the body actually reaches. A
            // top-level isolated function captures nothing.
            let captured: Vec<(String, Value)> = free_variables(node)
                .into_iter()
                .filter_map(|name| env.get(&name).map(|value| (name, value.clone())))
                .collect();
            Ok(Value::Function(FunctionValue {
                node: node.clone(),
                captured,
            }))
        }

        // New-expressions are never evaluated, only moved around verbatim
        // by the mutator fold rule.
        Node::New { .. } => Ok(Value::Opaque(node.clone())),

        Node::Unary { op, operand } => eval_unary(*op, operand, env),

        Node::Update { .. } => {
            // A foldable operand is a value, not a reference; the real
            // language rejects this at runtime and so do we.
            return_eval_error!(Execution, "update target is not a reference")
        }

        Node::Binary { op, left, right } => {
            let lhs = eval_in_env(left, env)?;
            let rhs = eval_in_env(right, env)?;
            eval_binary(*op, &lhs, &rhs)
        }

        Node::Logical { op, left, right } => {
            let lhs = eval_in_env(left, env)?;
            match op {
                LogicalOp::And if !lhs.to_boolean() => Ok(lhs),
                LogicalOp::Or if lhs.to_boolean() => Ok(lhs),
                _ => eval_in_env(right, env),
            }
        }

        Node::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if eval_in_env(test, env)?.to_boolean() {
                eval_in_env(consequent, env)
            } else {
                eval_in_env(alternate, env)
            }
        }

        Node::Sequence(expressions) => {
            let mut last = None;
            for expression in expressions {
                last = Some(eval_in_env(expression, env)?);
            }
            match last {
                Some(value) => Ok(value),
                None => return_eval_error!(Execution, "empty sequence expression"),
            }
        }

        Node::Member {
            object,
            property,
            computed,
        } => eval_member(object, property, *computed, env),

        Node::Call { callee, args } => eval_call(node, callee, args, env),
    }
}

fn eval_unary(op: UnaryOp, operand: &Node, env: &Env) -> Result<Value, EvalError> {
    let value = eval_in_env(operand, env)?;
    match op {
        UnaryOp::Minus => Ok(Value::Num(-value.to_number()?)),
        UnaryOp::Plus => Ok(Value::Num(value.to_number()?)),
        UnaryOp::Not => Ok(Value::Bool(!value.to_boolean())),
        UnaryOp::BitNot => Ok(Value::Num(!to_int32(value.to_number()?) as f64)),
        UnaryOp::TypeOf => Ok(Value::Str(value.type_name().to_string())),
        UnaryOp::Void => Ok(Value::Undefined),
    }
}

fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => {
            let left = lhs.to_primitive()?;
            let right = rhs.to_primitive()?;
            if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                let mut out = left.to_string_value()?;
                out.push_str(&right.to_string_value()?);
                Ok(Value::Str(out))
            } else {
                Ok(Value::Num(left.to_number()? + right.to_number()?))
            }
        }
        BinaryOp::Sub => Ok(Value::Num(lhs.to_number()? - rhs.to_number()?)),
        BinaryOp::Mul => Ok(Value::Num(lhs.to_number()? * rhs.to_number()?)),
        BinaryOp::Div => Ok(Value::Num(lhs.to_number()? / rhs.to_number()?)),
        BinaryOp::Mod => Ok(Value::Num(lhs.to_number()? % rhs.to_number()?)),
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(lhs, rhs)?)),
        BinaryOp::NotEq => Ok(Value::Bool(!loose_eq(lhs, rhs)?)),
        BinaryOp::StrictEq => Ok(Value::Bool(strict_eq(lhs, rhs))),
        BinaryOp::StrictNotEq => Ok(Value::Bool(!strict_eq(lhs, rhs))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            eval_relational(op, lhs, rhs)
        }
        BinaryOp::BitAnd => Ok(Value::Num(
            (to_int32(lhs.to_number()?) & to_int32(rhs.to_number()?)) as f64,
        )),
        BinaryOp::BitOr => Ok(Value::Num(
            (to_int32(lhs.to_number()?) | to_int32(rhs.to_number()?)) as f64,
        )),
        BinaryOp::BitXor => Ok(Value::Num(
            (to_int32(lhs.to_number()?) ^ to_int32(rhs.to_number()?)) as f64,
        )),
        BinaryOp::Shl => Ok(Value::Num(
            (to_int32(lhs.to_number()?) << (to_uint32(rhs.to_number()?) & 31)) as f64,
        )),
        BinaryOp::Shr => Ok(Value::Num(
            (to_int32(lhs.to_number()?) >> (to_uint32(rhs.to_number()?) & 31)) as f64,
        )),
        BinaryOp::UShr => Ok(Value::Num(
            (to_uint32(lhs.to_number()?) >> (to_uint32(rhs.to_number()?) & 31)) as f64,
        )),
    }
}

fn eval_relational(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let left = lhs.to_primitive()?;
    let right = rhs.to_primitive()?;
    if let (Value::Str(a), Value::Str(b)) = (&left, &right) {
        // String ordering is by UTF-16 unit in the object language
        if has_supplementary(a) || has_supplementary(b) {
            return_eval_error!(Unsupported, "string with supplementary-plane characters");
        }
        return Ok(Value::Bool(match op {
            BinaryOp::Lt => a < b,
            BinaryOp::LtEq => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::GtEq => a >= b,
            _ => unreachable!(),
        }));
    }
    let a = left.to_number()?;
    let b = right.to_number()?;
    if a.is_nan() || b.is_nan() {
        return Ok(Value::Bool(false));
    }
    Ok(Value::Bool(match op {
        BinaryOp::Lt => a < b,
        BinaryOp::LtEq => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::GtEq => a >= b,
        _ => unreachable!(),
    }))
}

fn eval_member(
    object: &Node,
    property: &Node,
    computed: bool,
    env: &Env,
) -> Result<Value, EvalError> {
    // The math namespace is a static table, not a value.
    if matches!(object, Node::Ident(name) if name == builtins::MATH_NAMESPACE && !env.contains_key(name))
    {
        let key = member_key(property, computed, env)?;
        if let Some(constant) = builtins::math_constant(&key) {
            return Ok(Value::Num(constant));
        }
        if builtins::MATH_FUNCTIONS.contains(&key.as_str()) {
            return_eval_error!(Unrepresentable, "builtin function value 'Math.{}'", key);
        }
        return_eval_error!(Execution, "unknown math namespace member '{}'", key);
    }

    let receiver = eval_in_env(object, env)?;
    let key = member_key(property, computed, env)?;
    property_of(&receiver, &key)
}

fn member_key(property: &Node, computed: bool, env: &Env) -> Result<String, EvalError> {
    if computed {
        eval_in_env(property, env)?.to_string_value()
    } else {
        match property {
            Node::Ident(name) => Ok(name.clone()),
            _ => return_eval_error!(Execution, "static member property is not a name"),
        }
    }
}

fn property_of(receiver: &Value, key: &str) -> Result<Value, EvalError> {
    match receiver {
        Value::Object(pairs) => Ok(pairs
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Undefined)),
        Value::Array(elements) => {
            if key == "length" {
                return Ok(Value::Num(elements.len() as f64));
            }
            match array_index(key) {
                Some(index) => Ok(elements.get(index).cloned().unwrap_or(Value::Undefined)),
                None => Ok(Value::Undefined),
            }
        }
        Value::Str(s) => {
            // Length and indexing count UTF-16 units in the object language
            if has_supplementary(s) {
                return_eval_error!(Unsupported, "string with supplementary-plane characters");
            }
            let chars: Vec<char> = s.chars().collect();
            if key == "length" {
                return Ok(Value::Num(chars.len() as f64));
            }
            match array_index(key) {
                Some(index) => Ok(chars
                    .get(index)
                    .map(|c| Value::Str(c.to_string()))
                    .unwrap_or(Value::Undefined)),
                None => Ok(Value::Undefined),
            }
        }
        Value::Num(_) | Value::Bool(_) => Ok(Value::Undefined),
        Value::Null | Value::Undefined => {
            return_eval_error!(
                Execution,
                "cannot read property '{}' of {}",
                key,
                receiver.type_name()
            )
        }
        Value::Function(_) | Value::Opaque(_) => {
            return_eval_error!(Unsupported, "property access on {}", receiver.type_name())
        }
    }
}

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<usize>().ok()
}

fn eval_call(call: &Node, callee: &Node, args: &[Node], env: &Env) -> Result<Value, EvalError> {
    // Math namespace calls dispatch on the table, not on a receiver value.
    if let Node::Member {
        object,
        property,
        computed,
    } = callee
    {
        if matches!(object.as_ref(), Node::Ident(name) if name == builtins::MATH_NAMESPACE && !env.contains_key(name))
        {
            let name = member_key(property, *computed, env)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_in_env(arg, env)?.to_number()?);
            }
            return eval_math_call(&name, &values);
        }
    }

    // Built-in method call against an array/string receiver.
    if let Some(shape) = resolve_call_shape(call) {
        let receiver = eval_in_env(shape.receiver, env)?;
        let mut values = Vec::with_capacity(shape.args.len());
        for arg in shape.args {
            values.push(eval_in_env(arg, env)?);
        }
        return match receiver {
            Value::Array(elements) => eval_array_method(elements, shape.method, values),
            Value::Str(s) => eval_string_method(&s, shape.method, values),
            other => {
                return_eval_error!(
                    Unsupported,
                    "method '{}' on {} receiver",
                    shape.method,
                    other.type_name()
                )
            }
        };
    }

    // Fallback: the callee itself evaluates to a callable value
    // (an isolated function expression, or a parameter bound to one).
    let callable = eval_in_env(callee, env)?;
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(eval_in_env(arg, env)?);
    }
    call_value(&callable, values)
}

pub fn call_value(callable: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
    let Value::Function(function) = callable else {
        return_eval_error!(Execution, "{} is not callable", callable.type_name());
    };
    let Node::Function { params, body } = &function.node else {
        return_eval_error!(Execution, "malformed function value");
    };
    let mut env = Env::default();
    for (name, value) in &function.captured {
        env.insert(name.clone(), value.clone());
    }
    let mut args = args.into_iter();
    for param in params {
        env.insert(param.clone(), args.next().unwrap_or(Value::Undefined));
    }
    eval_in_env(body, &env)
}

fn eval_math_call(name: &str, args: &[f64]) -> Result<Value, EvalError> {
    let first = args.first().copied().unwrap_or(f64::NAN);
    let second = args.get(1).copied().unwrap_or(f64::NAN);
    let result = match name {
        "abs" => first.abs(),
        "acos" => first.acos(),
        "acosh" => first.acosh(),
        "asin" => first.asin(),
        "asinh" => first.asinh(),
        "atan" => first.atan(),
        "atan2" => first.atan2(second),
        "atanh" => first.atanh(),
        "cbrt" => first.cbrt(),
        "ceil" => first.ceil(),
        "clz32" => to_uint32(first).leading_zeros() as f64,
        "cos" => first.cos(),
        "cosh" => first.cosh(),
        "exp" => first.exp(),
        "expm1" => first.exp_m1(),
        "floor" => first.floor(),
        "fround" => first as f32 as f64,
        "hypot" => args.iter().fold(0.0f64, |acc, n| acc.hypot(*n)),
        "log" => first.ln(),
        "log10" => first.log10(),
        "log1p" => first.ln_1p(),
        "log2" => first.log2(),
        "max" => {
            if args.iter().any(|n| n.is_nan()) {
                f64::NAN
            } else {
                args.iter().fold(f64::NEG_INFINITY, |acc, n| acc.max(*n))
            }
        }
        "min" => {
            if args.iter().any(|n| n.is_nan()) {
                f64::NAN
            } else {
                args.iter().fold(f64::INFINITY, |acc, n| acc.min(*n))
            }
        }
        "pow" => first.powf(second),
        "random" => {
            return_eval_error!(Execution, "math namespace 'random' is nondeterministic")
        }
        // Half-way cases round toward positive infinity
        "round" => (first + 0.5).floor(),
        "sign" => {
            if first.is_nan() || first == 0.0 {
                first
            } else if first > 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        "sin" => first.sin(),
        "sinh" => first.sinh(),
        "sqrt" => first.sqrt(),
        "tan" => first.tan(),
        "tanh" => first.tanh(),
        "trunc" => first.trunc(),
        _ => return_eval_error!(Execution, "unknown math namespace function '{}'", name),
    };
    Ok(Value::Num(result))
}

fn eval_array_method(
    elements: Vec<Value>,
    method: &str,
    args: Vec<Value>,
) -> Result<Value, EvalError> {
    match method {
        "concat" => {
            let mut result = elements;
            for arg in args {
                match arg {
                    Value::Array(inner) => result.extend(inner),
                    other => result.push(other),
                }
            }
            Ok(Value::Array(result))
        }

        "includes" => {
            let needle = args.first().cloned().unwrap_or(Value::Undefined);
            let from = normalize_index(args.get(1), 0.0, elements.len())?;
            Ok(Value::Bool(
                elements
                    .iter()
                    .skip(from)
                    .any(|e| same_value_zero(e, &needle)),
            ))
        }

        "indexOf" => {
            let needle = args.first().cloned().unwrap_or(Value::Undefined);
            let from = normalize_index(args.get(1), 0.0, elements.len())?;
            let found = elements
                .iter()
                .enumerate()
                .skip(from)
                .find(|(_, e)| strict_eq(e, &needle));
            Ok(Value::Num(found.map(|(i, _)| i as f64).unwrap_or(-1.0)))
        }

        "lastIndexOf" => {
            // The position operand caps the search: non-negative clamps to
            // the last index, negative counts back from the end.
            let needle = args.first().cloned().unwrap_or(Value::Undefined);
            let len = elements.len() as f64;
            let from = match args.get(1) {
                None | Some(Value::Undefined) => len - 1.0,
                Some(value) => {
                    let n = value.to_number()?;
                    let n = if n.is_nan() { 0.0 } else { n.trunc() };
                    if n >= 0.0 { n.min(len - 1.0) } else { len + n }
                }
            };
            if from < 0.0 {
                return Ok(Value::Num(-1.0));
            }
            let found = elements
                .iter()
                .enumerate()
                .take(from as usize + 1)
                .rev()
                .find(|(_, e)| strict_eq(e, &needle));
            Ok(Value::Num(found.map(|(i, _)| i as f64).unwrap_or(-1.0)))
        }

        "join" => {
            let sep = match args.first() {
                None | Some(Value::Undefined) => ",".to_string(),
                Some(value) => value.to_string_value()?,
            };
            let mut parts = Vec::with_capacity(elements.len());
            for element in &elements {
                match element {
                    Value::Null | Value::Undefined => parts.push(String::new()),
                    other => parts.push(other.to_string_value()?),
                }
            }
            Ok(Value::Str(parts.join(&sep)))
        }

        // Mutator return values follow the real language: pop/shift yield
        // the removed element, push/unshift the new length.
        "pop" => Ok(elements.into_iter().last().unwrap_or(Value::Undefined)),
        "shift" => Ok(elements.into_iter().next().unwrap_or(Value::Undefined)),
        "push" => Ok(Value::Num((elements.len() + args.len()) as f64)),
        "unshift" => Ok(Value::Num((elements.len() + args.len()) as f64)),

        "reverse" | "toReversed" => {
            let mut result = elements;
            result.reverse();
            Ok(Value::Array(result))
        }

        "slice" => {
            let len = elements.len();
            let start = normalize_index(args.first(), 0.0, len)?;
            let end = normalize_index(args.get(1), len as f64, len)?;
            if start >= end {
                return Ok(Value::Array(Vec::new()));
            }
            Ok(Value::Array(elements[start..end].to_vec()))
        }

        "splice" => {
            // Value of the call is the removed slice
            let len = elements.len();
            let start = normalize_index(args.first(), 0.0, len)?;
            let delete_count = match args.get(1) {
                None => len - start,
                Some(value) => (value.to_number()?.max(0.0) as usize).min(len - start),
            };
            Ok(Value::Array(
                elements[start..start + delete_count].to_vec(),
            ))
        }

        "toString" => Ok(Value::Str(Value::Array(elements).to_string_value()?)),

        "at" => {
            let index = args.first().map(|v| v.to_number()).transpose()?.unwrap_or(0.0);
            let index = if index < 0.0 {
                elements.len() as f64 + index.trunc()
            } else {
                index.trunc()
            };
            if index < 0.0 || index >= elements.len() as f64 {
                return Ok(Value::Undefined);
            }
            Ok(elements[index as usize].clone())
        }

        "map" => {
            let callback = callback_arg(&args, method)?;
            let mut result = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                result.push(call_value(
                    callback,
                    vec![element.clone(), Value::Num(index as f64)],
                )?);
            }
            Ok(Value::Array(result))
        }

        "filter" => {
            let callback = callback_arg(&args, method)?;
            let mut result = Vec::new();
            for (index, element) in elements.iter().enumerate() {
                if call_value(callback, vec![element.clone(), Value::Num(index as f64)])?
                    .to_boolean()
                {
                    result.push(element.clone());
                }
            }
            Ok(Value::Array(result))
        }

        "every" | "some" => {
            let callback = callback_arg(&args, method)?;
            let mut all = true;
            let mut any = false;
            for (index, element) in elements.iter().enumerate() {
                let passed = call_value(
                    callback,
                    vec![element.clone(), Value::Num(index as f64)],
                )?
                .to_boolean();
                all &= passed;
                any |= passed;
                if method == "every" && !all {
                    break;
                }
                if method == "some" && any {
                    break;
                }
            }
            Ok(Value::Bool(if method == "every" { all } else { any }))
        }

        "find" | "findIndex" => {
            let callback = callback_arg(&args, method)?;
            for (index, element) in elements.iter().enumerate() {
                if call_value(callback, vec![element.clone(), Value::Num(index as f64)])?
                    .to_boolean()
                {
                    return Ok(if method == "find" {
                        element.clone()
                    } else {
                        Value::Num(index as f64)
                    });
                }
            }
            Ok(if method == "find" {
                Value::Undefined
            } else {
                Value::Num(-1.0)
            })
        }

        "forEach" => {
            let callback = callback_arg(&args, method)?;
            for (index, element) in elements.iter().enumerate() {
                call_value(callback, vec![element.clone(), Value::Num(index as f64)])?;
            }
            Ok(Value::Undefined)
        }

        "reduce" => {
            let callback = callback_arg(&args, method)?;
            let mut iter = elements.iter().enumerate();
            let mut acc = match args.get(1) {
                Some(initial) => initial.clone(),
                None => match iter.next() {
                    Some((_, first)) => first.clone(),
                    None => {
                        return_eval_error!(Execution, "reduce of empty array with no initial value")
                    }
                },
            };
            for (index, element) in iter {
                acc = call_value(
                    callback,
                    vec![acc, element.clone(), Value::Num(index as f64)],
                )?;
            }
            Ok(acc)
        }

        "fill" => {
            let value = args.first().cloned().unwrap_or(Value::Undefined);
            let len = elements.len();
            let start = normalize_index(args.get(1), 0.0, len)?;
            let end = normalize_index(args.get(2), len as f64, len)?;
            let mut result = elements;
            for slot in result.iter_mut().take(end).skip(start) {
                *slot = value.clone();
            }
            Ok(Value::Array(result))
        }

        "flat" => {
            let depth = match args.first() {
                None | Some(Value::Undefined) => 1.0,
                Some(value) => value.to_number()?,
            };
            Ok(Value::Array(flatten(elements, depth)))
        }

        "sort" | "toSorted" => {
            if args.first().is_some_and(|arg| !matches!(arg, Value::Undefined)) {
                return_eval_error!(Unsupported, "sort with a comparator");
            }
            // Default ordering compares string forms, undefined goes last
            let mut keyed = Vec::with_capacity(elements.len());
            for element in elements {
                let key = match &element {
                    Value::Undefined => None,
                    other => Some(other.to_string_value()?),
                };
                keyed.push((key, element));
            }
            keyed.sort_by(|(a, _), (b, _)| match (a, b) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            Ok(Value::Array(keyed.into_iter().map(|(_, v)| v).collect()))
        }

        _ => return_eval_error!(Unsupported, "array method '{}'", method),
    }
}

fn callback_arg<'a>(args: &'a [Value], method: &str) -> Result<&'a Value, EvalError> {
    match args.first() {
        Some(callback @ Value::Function(_)) => Ok(callback),
        _ => return_eval_error!(Execution, "'{}' expects a function argument", method),
    }
}

fn flatten(elements: Vec<Value>, depth: f64) -> Vec<Value> {
    let mut result = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Value::Array(inner) if depth >= 1.0 => {
                result.extend(flatten(inner, depth - 1.0));
            }
            other => result.push(other),
        }
    }
    result
}

// Relative index normalization shared by slice-style methods:
// negative counts from the end, results clamp to [0, len].
fn normalize_index(arg: Option<&Value>, default: f64, len: usize) -> Result<usize, EvalError> {
    let raw = match arg {
        None | Some(Value::Undefined) => default,
        Some(value) => value.to_number()?,
    };
    let raw = if raw.is_nan() { 0.0 } else { raw.trunc() };
    let resolved = if raw < 0.0 { len as f64 + raw } else { raw };
    Ok(resolved.clamp(0.0, len as f64) as usize)
}

fn eval_string_method(s: &str, method: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    // The object language measures strings in UTF-16 units; code points
    // above the basic plane split into surrogate pairs there and do not
    // line up with the scalar values handled here.
    if has_supplementary(s)
        || args
            .iter()
            .any(|arg| matches!(arg, Value::Str(v) if has_supplementary(v)))
    {
        return_eval_error!(Unsupported, "string with supplementary-plane characters");
    }
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    match method {
        "charAt" => {
            let index = index_arg(&args, 0)?;
            Ok(Value::Str(match index {
                Some(i) if i < len => chars[i].to_string(),
                _ => String::new(),
            }))
        }

        "charCodeAt" | "codePointAt" => {
            let index = index_arg(&args, 0)?;
            match index {
                Some(i) if i < len => Ok(Value::Num(chars[i] as u32 as f64)),
                _ => {
                    if method == "charCodeAt" {
                        Ok(Value::Num(f64::NAN))
                    } else {
                        Ok(Value::Undefined)
                    }
                }
            }
        }

        "concat" => {
            let mut out = s.to_string();
            for arg in &args {
                out.push_str(&arg.to_string_value()?);
            }
            Ok(Value::Str(out))
        }

        "includes" => {
            let needle: Vec<char> = string_arg(&args, 0)?.chars().collect();
            let start = position_arg(&args, 1, 0.0, len)?;
            Ok(Value::Bool(find_chars(&chars, &needle, start, false) >= 0.0))
        }

        "startsWith" => {
            let needle: Vec<char> = string_arg(&args, 0)?.chars().collect();
            let start = position_arg(&args, 1, 0.0, len)?;
            Ok(Value::Bool(
                start + needle.len() <= len && chars[start..start + needle.len()] == needle[..],
            ))
        }

        "endsWith" => {
            let needle: Vec<char> = string_arg(&args, 0)?.chars().collect();
            let end = position_arg(&args, 1, len as f64, len)?;
            Ok(Value::Bool(
                end >= needle.len() && chars[end - needle.len()..end] == needle[..],
            ))
        }

        "indexOf" => {
            let needle: Vec<char> = string_arg(&args, 0)?.chars().collect();
            let start = position_arg(&args, 1, 0.0, len)?;
            Ok(Value::Num(find_chars(&chars, &needle, start, false)))
        }

        "lastIndexOf" => {
            // An absent or NaN position searches the whole string
            let needle: Vec<char> = string_arg(&args, 0)?.chars().collect();
            let start = match args.get(1) {
                None | Some(Value::Undefined) => len,
                Some(value) => {
                    let n = value.to_number()?;
                    if n.is_nan() {
                        len
                    } else {
                        n.trunc().clamp(0.0, len as f64) as usize
                    }
                }
            };
            Ok(Value::Num(find_chars(&chars, &needle, start, true)))
        }

        "slice" => {
            let start = normalize_index(args.first(), 0.0, len)?;
            let end = normalize_index(args.get(1), len as f64, len)?;
            if start >= end {
                return Ok(Value::Str(String::new()));
            }
            Ok(Value::Str(chars[start..end].iter().collect()))
        }

        "substring" => {
            // Negative operands clamp to zero and the bounds swap if needed
            let a = normalize_index(args.first(), 0.0, len)?;
            let b = normalize_index(args.get(1), len as f64, len)?;
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            Ok(Value::Str(chars[start..end].iter().collect()))
        }

        "substr" => {
            let start = normalize_index(args.first(), 0.0, len)?;
            let count = match args.get(1) {
                None | Some(Value::Undefined) => len - start,
                Some(value) => (value.to_number()?.max(0.0) as usize).min(len - start),
            };
            Ok(Value::Str(chars[start..start + count].iter().collect()))
        }

        "split" => {
            let limit = match args.get(1) {
                None | Some(Value::Undefined) => u32::MAX as usize,
                Some(value) => to_uint32(value.to_number()?) as usize,
            };
            let mut parts: Vec<Value> = match args.first() {
                None | Some(Value::Undefined) => vec![Value::Str(s.to_string())],
                Some(sep) => {
                    let sep = sep.to_string_value()?;
                    if sep.is_empty() {
                        chars.iter().map(|c| Value::Str(c.to_string())).collect()
                    } else {
                        s.split(&sep).map(|p| Value::Str(p.to_string())).collect()
                    }
                }
            };
            parts.truncate(limit);
            Ok(Value::Array(parts))
        }

        "repeat" => {
            let count = match args.first() {
                None | Some(Value::Undefined) => 0.0,
                Some(value) => value.to_number()?,
            };
            if count < 0.0 || !count.is_finite() {
                return_eval_error!(Execution, "invalid repeat count");
            }
            Ok(Value::Str(s.repeat(count as usize)))
        }

        "toLowerCase" | "toLocaleLowerCase" => Ok(Value::Str(s.to_lowercase())),
        "toUpperCase" | "toLocaleUpperCase" => Ok(Value::Str(s.to_uppercase())),
        "trim" => Ok(Value::Str(s.trim().to_string())),
        "trimStart" => Ok(Value::Str(s.trim_start().to_string())),
        "trimEnd" => Ok(Value::Str(s.trim_end().to_string())),

        "padStart" | "padEnd" => {
            let target = match args.first() {
                None | Some(Value::Undefined) => 0.0,
                Some(value) => value.to_number()?,
            };
            let pad = match args.get(1) {
                None | Some(Value::Undefined) => " ".to_string(),
                Some(value) => value.to_string_value()?,
            };
            let target = if target.is_finite() && target > 0.0 {
                target as usize
            } else {
                0
            };
            if target <= len || pad.is_empty() {
                return Ok(Value::Str(s.to_string()));
            }
            let fill: String = pad.chars().cycle().take(target - len).collect();
            Ok(Value::Str(if method == "padStart" {
                format!("{}{}", fill, s)
            } else {
                format!("{}{}", s, fill)
            }))
        }

        "at" => {
            let index = match args.first() {
                None | Some(Value::Undefined) => 0.0,
                Some(value) => value.to_number()?.trunc(),
            };
            let index = if index < 0.0 { len as f64 + index } else { index };
            if index < 0.0 || index >= len as f64 {
                return Ok(Value::Undefined);
            }
            Ok(Value::Str(chars[index as usize].to_string()))
        }

        "replace" | "replaceAll" => {
            // Plain string patterns only; pattern objects and replacement
            // functions are outside the interpreter's closed world.
            let (Some(pattern), Some(replacement)) = (args.first(), args.get(1)) else {
                return_eval_error!(Unsupported, "replace without string operands");
            };
            let (Value::Str(pattern), Value::Str(replacement)) = (pattern, replacement) else {
                return_eval_error!(Unsupported, "replace with non-string operands");
            };
            Ok(Value::Str(if method == "replaceAll" {
                s.replace(pattern.as_str(), replacement)
            } else {
                s.replacen(pattern.as_str(), replacement, 1)
            }))
        }

        "toString" | "valueOf" => Ok(Value::Str(s.to_string())),

        _ => return_eval_error!(Unsupported, "string method '{}'", method),
    }
}

fn index_arg(args: &[Value], default: usize) -> Result<Option<usize>, EvalError> {
    let raw = match args.first() {
        None | Some(Value::Undefined) => default as f64,
        Some(value) => value.to_number()?,
    };
    if raw.is_nan() || raw < 0.0 {
        return Ok(None);
    }
    Ok(Some(raw.trunc() as usize))
}

fn string_arg(args: &[Value], index: usize) -> Result<String, EvalError> {
    match args.get(index) {
        None => Ok("undefined".to_string()),
        Some(value) => value.to_string_value(),
    }
}

// Clamped position operand of the string search methods.
fn position_arg(
    args: &[Value],
    index: usize,
    default: f64,
    len: usize,
) -> Result<usize, EvalError> {
    let raw = match args.get(index) {
        None | Some(Value::Undefined) => default,
        Some(value) => {
            let n = value.to_number()?;
            if n.is_nan() { 0.0 } else { n.trunc() }
        }
    };
    Ok(raw.clamp(0.0, len as f64) as usize)
}

// Forward search from `start`, or backward search for the last match at or
// before `start`.
fn find_chars(haystack: &[char], needle: &[char], start: usize, last: bool) -> f64 {
    if needle.is_empty() {
        return start.min(haystack.len()) as f64;
    }
    if needle.len() > haystack.len() {
        return -1.0;
    }
    let max_pos = haystack.len() - needle.len();
    let matches = |pos: usize| haystack[pos..pos + needle.len()] == *needle;
    let found = if last {
        (0..=start.min(max_pos)).rev().find(|&pos| matches(pos))
    } else {
        (start..=max_pos).find(|&pos| matches(pos))
    };
    found.map(|i| i as f64).unwrap_or(-1.0)
}
