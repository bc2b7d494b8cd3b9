//! Total coercions for loosely typed request values
//!
//! Every function here maps any JSON value (or its absence) to a usable
//! result; malformed input degrades to the supplied fallback instead of
//! failing. Values are first rendered to text the way a script host would
//! stringify them, then read by their leading numeric prefix, so `"42px"`
//! reads as `42`, `"1.9"` reads as the integer `1`, `[5]` reads as `5` and
//! `1e21` (text `1e+21`) reads as `1`.

use serde_json::Value;

/// Lowest accepted command priority
pub const PRIORITY_MIN: i64 = -100;
/// Highest accepted command priority
pub const PRIORITY_MAX: i64 = 100;

/// Parse an integer and clamp it to `[min, max]`
///
/// Missing, `null` and unparseable values use `fallback`, which is clamped
/// as well.
pub fn parse_integer(value: Option<&Value>, fallback: i64, min: i64, max: i64) -> i64 {
    let parsed = match value {
        None | Some(Value::Null) => Some(fallback),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Some(n.as_i64().unwrap_or(i64::MAX))
        }
        Some(other) => leading_integer(&js_text(other)),
    };
    parsed.unwrap_or(fallback).clamp(min, max)
}

/// Parse a finite float; anything else yields `fallback`
pub fn parse_float(value: Option<&Value>, fallback: f64) -> f64 {
    let parsed = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => leading_float(&js_text(other)),
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(fallback)
}

/// Trimmed string option with a named default
///
/// Falsy values (`null`, `false`, `0`, `""`) and blank text yield the
/// default. Numbers, `true` and arrays are rendered as text, with whole
/// floats written without a fraction (`5.0` becomes `"5"`). Objects have no
/// meaningful text form and yield the default.
pub fn string_option(value: Option<&Value>, default: &str) -> String {
    let text = match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::Object(_)) => {
            String::new()
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(other) => js_text(other).trim().to_string(),
    };
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

/// Coerce a priority to an integer in `[-100, 100]`, defaulting to 0
pub fn clamp_priority(value: Option<&Value>) -> i64 {
    parse_integer(value, 0, PRIORITY_MIN, PRIORITY_MAX)
}

/// Script-host text form of a JSON value
///
/// Array elements are joined with `,` and `null` elements render empty.
fn js_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !(n.is_i64() || n.is_u64()) => number_text(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip decimal, switching to exponent form outside
/// `[1e-6, 1e21)`
fn number_text(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{f:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        format!("{f}")
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let prefix_len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if prefix_len == 0 {
        return None;
    }
    let magnitude = digits[..prefix_len]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}

fn leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end += 1;
    }
    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-') | Some(b'+')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}
