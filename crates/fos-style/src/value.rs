//! Value Formatting
//!
//! Converts individual style values into CSS value text and property names
//! into their kebab-case CSS spelling.

use crate::style::StyleValue;

/// Format a property value as CSS text.
///
/// Numbers become pixel lengths unless they are zero, arrays are joined with
/// single spaces (`["1px", "solid", "black"]` → `1px solid black`).
/// Returns `None` for `null`, objects, and arrays holding objects.
pub fn format_value(value: &StyleValue) -> Option<String> {
    match value {
        StyleValue::Null | StyleValue::Object(_) => None,
        StyleValue::Number(number) if *number == 0.0 => Some("0".to_string()),
        StyleValue::Number(number) => Some(format!("{}px", format_number(*number))),
        StyleValue::String(text) => Some(text.clone()),
        StyleValue::Bool(flag) => Some(flag.to_string()),
        StyleValue::Array(items) => join_array(items),
    }
}

/// Array items are stringified without units, like a JavaScript `join(' ')`.
fn join_array(items: &[StyleValue]) -> Option<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        match item {
            StyleValue::Null => {}
            StyleValue::Object(_) => return None,
            StyleValue::Number(number) => parts.push(format_number(*number)),
            StyleValue::String(text) => parts.push(text.clone()),
            StyleValue::Bool(flag) => parts.push(flag.to_string()),
            StyleValue::Array(inner) => parts.push(join_array(inner)?),
        }
    }
    Some(parts.join(" "))
}

/// Print a number without a trailing `.0` for integral values
pub fn format_number(number: f64) -> String {
    if number == 0.0 {
        // Covers -0.0 as well
        return "0".to_string();
    }
    format!("{}", number)
}

/// Convert a camelCase property name to kebab-case.
///
/// Custom properties keep their `--` prefix: `--colorPrimary` →
/// `--color-primary`. Vendor prefixes fall out naturally:
/// `WebkitTransition` → `-webkit-transition`.
pub fn to_kebab_case(name: &str) -> String {
    match name.strip_prefix("--") {
        Some(rest) => format!("--{}", kebab(rest)),
        None => kebab(name),
    }
}

fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            out.push('-');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
