/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Truthiness and text conversion for template values.
//!
//! Template data is a [`serde_json::Value`]. The renderer never mutates it and
//! only ever holds references into it; this module decides how a resolved
//! value behaves as a section condition and how it is written as text.

use serde_json::{Number, Value};
use std::borrow::Cow;

/// Check whether a value counts as "true" for a section.
///
/// - Null is false
/// - Bool is its own value
/// - Numbers are true when nonzero
/// - Strings and arrays are true when non-empty
/// - Objects are always true
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => number_is_nonzero(n),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn number_is_nonzero(n: &Number) -> bool {
    if let Some(i) = n.as_i64() {
        i != 0
    } else if let Some(u) = n.as_u64() {
        u != 0
    } else {
        n.as_f64().is_some_and(|f| f != 0.0)
    }
}

/// Convert a value to the text written by an interpolation tag.
///
/// Strings are borrowed as-is; arrays and objects become compact JSON.
pub fn format_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => Cow::Owned(format_double(f)),
            None => Cow::Owned(n.to_string()),
        },
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::String(s) => Cow::Borrowed(s),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Format a double with the shortest digits that round-trip.
///
/// The decimal separator is always `.` and exponents carry an explicit sign,
/// so `1.7e38` is written as `1.7e+38`.
pub fn format_double(value: f64) -> String {
    let text = match Number::from_f64(value) {
        Some(n) => n.to_string(),
        None => value.to_string(),
    };
    normalize_float_text(&text)
}

fn normalize_float_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ',' => out.push('.'),
            'e' | 'E' => {
                out.push('e');
                if chars.peek().is_some_and(|next| next.is_ascii_digit()) {
                    out.push('+');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Replace `<`, `>`, `"` and `&` with their named character references.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '"', '&']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
