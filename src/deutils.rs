// src/deutils.rs
//
// Lenient coercion of loosely typed option values. Add-on front ends write
// numbers as strings and booleans as "yes"/"1", so accept those forms but
// nothing else.

use serde_json::Value;

/// Booleans: true/false, 1/0, and the usual string spellings.
pub fn value_as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "t" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "f" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Integers: JSON integers, or strings that parse as one.
pub fn value_as_i64(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Strings: plain strings, with numbers and booleans rendered as text.
pub fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Human readable form of a value for error messages.
pub fn describe(v: &Value) -> String {
    v.to_string().trim_matches('"').to_string()
}
