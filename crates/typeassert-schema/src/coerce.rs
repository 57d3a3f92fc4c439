//! # Type Coercion
//!
//! Rewrites a value in place so that it satisfies a schema `type` keyword.
//!
//! | target    | accepted sources                                           |
//! |-----------|------------------------------------------------------------|
//! | `string`  | number → decimal text, boolean → `"true"`/`"false"`, null → `""` |
//! | `number`  | numeric string, boolean → 1/0, null → 0                    |
//! | `integer` | integral numeric string, boolean → 1/0, null → 0           |
//! | `boolean` | `"true"`/`"false"`, 1/0, null → false                      |
//! | `null`    | `""`, 0, false                                             |
//!
//! With [`CoerceTypes::Array`] a one-element array is unwrapped when its
//! element matches or coerces to a scalar target, and a scalar is wrapped into a one-element array when
//! `array` is an accepted type. Values that already match any listed type
//! are left alone; values no rule applies to are left for the validator to
//! reject.

use serde_json::{Number, Value};
use typeassert_core::CoerceTypes;

/// Coerce `data` toward the type(s) named by `types` (a string or an array
/// of strings). Returns `true` if `data` was rewritten.
pub fn coerce(data: &mut Value, types: &Value, mode: CoerceTypes) -> bool {
    if !mode.is_enabled() {
        return false;
    }
    let targets: Vec<&str> = match types {
        Value::String(t) => vec![t.as_str()],
        Value::Array(ts) => ts.iter().filter_map(Value::as_str).collect(),
        _ => return false,
    };
    if targets.is_empty() || targets.iter().any(|t| matches_type(data, t)) {
        return false;
    }

    if mode == CoerceTypes::Array && targets.iter().any(|t| is_scalar_type(t)) {
        let unwrapped = match &*data {
            Value::Array(items) if items.len() == 1 => {
                let only = &items[0];
                if targets.iter().any(|t| matches_type(only, t)) {
                    Some(only.clone())
                } else {
                    targets.iter().find_map(|t| coerce_scalar(only, t))
                }
            }
            _ => None,
        };
        if let Some(value) = unwrapped {
            *data = value;
            return true;
        }
    }

    for target in &targets {
        if let Some(coerced) = coerce_scalar(data, target) {
            *data = coerced;
            return true;
        }
    }

    if mode == CoerceTypes::Array && targets.contains(&"array") && is_scalar(data) {
        let scalar = data.take();
        *data = Value::Array(vec![scalar]);
        return true;
    }
    false
}

/// Whether `data` already satisfies the JSON Schema type name `ty`.
pub fn matches_type(data: &Value, ty: &str) -> bool {
    match (ty, data) {
        ("null", Value::Null)
        | ("boolean", Value::Bool(_))
        | ("string", Value::String(_))
        | ("number", Value::Number(_))
        | ("array", Value::Array(_))
        | ("object", Value::Object(_)) => true,
        ("integer", Value::Number(n)) => is_integral(n),
        _ => false,
    }
}

fn is_scalar_type(ty: &str) -> bool {
    matches!(ty, "null" | "boolean" | "string" | "number" | "integer")
}

fn is_scalar(data: &Value) -> bool {
    !matches!(data, Value::Array(_) | Value::Object(_))
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn coerce_scalar(data: &Value, target: &str) -> Option<Value> {
    match target {
        "string" => match data {
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            Value::Null => Some(Value::String(String::new())),
            _ => None,
        },
        "number" => match data {
            Value::String(s) => parse_number(s).map(number_value),
            Value::Bool(b) => Some(Value::from(u8::from(*b))),
            Value::Null => Some(Value::from(0)),
            _ => None,
        },
        "integer" => match data {
            Value::String(s) => parse_number(s)
                .filter(|f| f.fract() == 0.0)
                .map(number_value),
            Value::Bool(b) => Some(Value::from(u8::from(*b))),
            Value::Null => Some(Value::from(0)),
            _ => None,
        },
        "boolean" => match data {
            Value::String(s) if s == "true" => Some(Value::Bool(true)),
            Value::String(s) if s == "false" => Some(Value::Bool(false)),
            Value::Number(n) if n.as_f64() == Some(1.0) => Some(Value::Bool(true)),
            Value::Number(n) if n.as_f64() == Some(0.0) => Some(Value::Bool(false)),
            Value::Null => Some(Value::Bool(false)),
            _ => None,
        },
        "null" => match data {
            Value::String(s) if s.is_empty() => Some(Value::Null),
            Value::Number(n) if n.as_f64() == Some(0.0) => Some(Value::Null),
            Value::Bool(false) => Some(Value::Null),
            _ => None,
        },
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Integral floats inside the `i64` range become integer numbers so that
/// `"42"` coerces to `42`, not `42.0`.
fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}
