use std::f64::consts;

// Explicit registry of known built-in member names per literal kind.
//
// The collision checks in the safety classifier must not depend on whatever
// prototype chain the platform happens to expose at runtime, so the member
// tables are spelled out here and versioned with the crate. A member access
// whose name appears in the table for its receiver's kind would dispatch
// into opaque built-in behaviour and is never folded as a plain lookup.

// Members every plain object inherits.
pub const OBJECT_MEMBERS: &[&str] = &[
    "constructor",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toLocaleString",
    "toString",
    "valueOf",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

pub const ARRAY_MEMBERS: &[&str] = &[
    "at",
    "concat",
    "copyWithin",
    "entries",
    "every",
    "fill",
    "filter",
    "find",
    "findIndex",
    "findLast",
    "findLastIndex",
    "flat",
    "flatMap",
    "forEach",
    "includes",
    "indexOf",
    "join",
    "keys",
    "lastIndexOf",
    "length",
    "map",
    "pop",
    "push",
    "reduce",
    "reduceRight",
    "reverse",
    "shift",
    "slice",
    "some",
    "sort",
    "splice",
    "toReversed",
    "toSorted",
    "toSpliced",
    "unshift",
    "values",
    "with",
];

pub const STRING_MEMBERS: &[&str] = &[
    "at",
    "charAt",
    "charCodeAt",
    "codePointAt",
    "concat",
    "endsWith",
    "includes",
    "indexOf",
    "lastIndexOf",
    "length",
    "localeCompare",
    "match",
    "matchAll",
    "normalize",
    "padEnd",
    "padStart",
    "repeat",
    "replace",
    "replaceAll",
    "search",
    "slice",
    "split",
    "startsWith",
    "substr",
    "substring",
    "toLocaleLowerCase",
    "toLocaleUpperCase",
    "toLowerCase",
    "toUpperCase",
    "trim",
    "trimEnd",
    "trimStart",
];

pub const NUMBER_MEMBERS: &[&str] = &[
    "toExponential",
    "toFixed",
    "toLocaleString",
    "toPrecision",
    "toString",
    "valueOf",
];

pub const FUNCTION_MEMBERS: &[&str] = &[
    "apply",
    "arguments",
    "bind",
    "call",
    "caller",
    "length",
    "name",
    "prototype",
];

// Deterministic array/string methods the default-mutator fold rule accepts.
// Matches the original allow-list minus the non-standard `toSource`.
pub const MUTATOR_METHODS: &[&str] = &[
    "concat",
    "includes",
    "indexOf",
    "join",
    "lastIndexOf",
    "pop",
    "push",
    "reverse",
    "shift",
    "slice",
    "splice",
    "toString",
    "unshift",
];

// The reserved global numeric namespace.
pub const MATH_NAMESPACE: &str = "Math";

pub const MATH_CONSTANTS: &[(&str, f64)] = &[
    ("E", consts::E),
    ("LN10", consts::LN_10),
    ("LN2", consts::LN_2),
    ("LOG10E", consts::LOG10_E),
    ("LOG2E", consts::LOG2_E),
    ("PI", consts::PI),
    ("SQRT1_2", consts::FRAC_1_SQRT_2),
    ("SQRT2", consts::SQRT_2),
];

// `random` is a known member for classification purposes, but calling it is
// refused by the interpreter as nondeterministic.
pub const MATH_FUNCTIONS: &[&str] = &[
    "abs", "acos", "acosh", "asin", "asinh", "atan", "atan2", "atanh", "cbrt", "ceil", "clz32",
    "cos", "cosh", "exp", "expm1", "floor", "fround", "hypot", "log", "log10", "log1p", "log2",
    "max", "min", "pow", "random", "round", "sign", "sin", "sinh", "sqrt", "tan", "tanh", "trunc",
];

pub fn math_constant(name: &str) -> Option<f64> {
    MATH_CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == name)
        .map(|(_, value)| *value)
}

pub fn is_math_member(name: &str) -> bool {
    math_constant(name).is_some() || MATH_FUNCTIONS.contains(&name)
}

// Per-kind collision checks. Inherited object members count for every kind.
pub fn is_object_member(name: &str) -> bool {
    OBJECT_MEMBERS.contains(&name)
}

pub fn is_array_member(name: &str) -> bool {
    ARRAY_MEMBERS.contains(&name) || is_object_member(name)
}

pub fn is_string_member(name: &str) -> bool {
    STRING_MEMBERS.contains(&name) || is_object_member(name)
}

pub fn is_number_member(name: &str) -> bool {
    NUMBER_MEMBERS.contains(&name) || is_object_member(name)
}

pub fn is_function_member(name: &str) -> bool {
    FUNCTION_MEMBERS.contains(&name) || is_object_member(name)
}

// The allow-list for built-in method calls on array/string receivers.
pub fn is_builtin_call_method(name: &str) -> bool {
    ARRAY_MEMBERS.contains(&name) || STRING_MEMBERS.contains(&name)
}

pub fn is_mutator_method(name: &str) -> bool {
    MUTATOR_METHODS.contains(&name)
}
