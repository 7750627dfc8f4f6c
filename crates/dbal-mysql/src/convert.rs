//! Parameter coercion.
//!
//! Every bound value is reduced to one of the primitives the client sends:
//! NULL, a 64-bit integer, a string (or byte string) or a boolean, chosen by
//! the declared [`ParameterType`]. Numeric strings follow loose-typed rules:
//! the leading number is taken and the rest ignored, a string without one
//! is 0. Floats become text with 14 significant digits, switching to
//! exponent form for very large or very small magnitudes.

use dbal_core::{ParameterType, Value};
use regex::Regex;
use std::sync::OnceLock;

/// Coerce `value` to the primitive its declared type travels as.
pub fn convert(value: Value, ty: ParameterType) -> Value {
    match ty {
        ParameterType::Null => Value::Null,
        ParameterType::Integer => Value::BigInt(to_integer(&value)),
        ParameterType::Boolean => Value::Bool(truthy(&value)),
        ParameterType::String
        | ParameterType::Ascii
        | ParameterType::Binary
        | ParameterType::LargeObject => match value {
            Value::Bytes(bytes) => Value::Bytes(bytes),
            other => Value::Text(to_text(&other)),
        },
    }
}

/// Integer interpretation of any value.
pub fn to_integer(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(v) => i64::from(*v),
        Value::TinyInt(v) => i64::from(*v),
        Value::SmallInt(v) => i64::from(*v),
        Value::Int(v) => i64::from(*v),
        Value::BigInt(v) => *v,
        Value::Float(v) => truncate(f64::from(*v)),
        Value::Double(v) => truncate(*v),
        Value::Decimal(s) | Value::Text(s) => leading_integer(s),
        Value::Bytes(b) => leading_integer(&String::from_utf8_lossy(b)),
    }
}

/// Text interpretation of any value.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Float(v) => float_text(f64::from(*v)),
        Value::Double(v) => float_text(*v),
        Value::Decimal(s) | Value::Text(s) => s.clone(),
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        other => other.to_string(),
    }
}

/// Truthiness: zero, the empty string, `"0"` and NULL are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(v) => *v,
        Value::Float(v) => *v != 0.0,
        Value::Double(v) => *v != 0.0,
        Value::Decimal(s) | Value::Text(s) => !(s.is_empty() || s == "0"),
        Value::Bytes(b) => !(b.is_empty() || b.as_slice() == b"0"),
        other => other.as_i64().is_some_and(|v| v != 0),
    }
}

fn truncate(v: f64) -> i64 {
    if v.is_nan() {
        0
    } else {
        // `as` saturates at the i64 bounds.
        v.trunc() as i64
    }
}

/// Significant digits kept when a float becomes text.
const FLOAT_PRECISION: usize = 14;

/// Shortest text with at most 14 significant digits; exponent form
/// (`1.0E+25`, `1.5E-7`) below 1e-4 and from 1e14 up.
fn float_text(v: f64) -> String {
    if v.is_nan() {
        return "NAN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", FLOAT_PRECISION - 1, v.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return v.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return v.to_string();
    };
    let digits = mantissa.replace('.', "");
    let digits = digits.trim_end_matches('0');
    let sign = if v < 0.0 { "-" } else { "" };

    if exponent < -4 || exponent >= FLOAT_PRECISION as i32 {
        let (lead, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{lead}.{rest}E{exp_sign}{}", exponent.unsigned_abs())
    } else if exponent < 0 {
        let zeros = "0".repeat(exponent.unsigned_abs() as usize - 1);
        format!("{sign}0.{zeros}{digits}")
    } else {
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            format!("{sign}{digits}{}", "0".repeat(int_len - digits.len()))
        } else {
            let (int_part, frac_part) = digits.split_at(int_len);
            format!("{sign}{int_part}.{frac_part}")
        }
    }
}

fn numeric_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[ \t\n\r\x0B\x0C]*([+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
            .expect("static numeric prefix pattern")
    })
}

fn leading_integer(s: &str) -> i64 {
    let Some(number) = numeric_prefix().captures(s).and_then(|c| c.get(1)) else {
        return 0;
    };
    let number = number.as_str();
    if number.contains(['.', 'e', 'E']) {
        number.parse::<f64>().map_or(0, truncate)
    } else {
        number.parse::<i64>().unwrap_or_else(|_| {
            if number.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        })
    }
}
