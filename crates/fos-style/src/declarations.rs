//! Declaration Rendering
//!
//! Turns the plain (non-object) entries of a style object into
//! `name: value;` declarations.

use std::fmt;

use crate::style::{CLASS_NAME_KEY, StyleObject, StyleValue};
use crate::value::{format_value, to_kebab_case};

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Kebab-case property name
    pub property: String,
    pub value: String,
}

impl Declaration {
    /// Build from a raw style key and value.
    /// Returns `None` when the value has no CSS form (null, object).
    pub fn from_entry(key: &str, value: &StyleValue) -> Option<Self> {
        let value = format_value(value)?;
        Some(Self {
            property: to_kebab_case(key),
            value,
        })
    }

    /// Render as one indented line
    pub fn to_line(&self, indent: &str) -> String {
        format!("{indent}{}: {};", self.property, self.value)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {};", self.property, self.value)
    }
}

/// Collect declarations from a flat map, in insertion order.
///
/// Null values, object values and the `className` field are skipped.
pub fn collect_declarations(style: &StyleObject) -> Vec<Declaration> {
    style
        .iter()
        .filter(|(key, _)| *key != CLASS_NAME_KEY)
        .filter_map(|(key, value)| Declaration::from_entry(key, value))
        .collect()
}

/// Render declarations one per line with a two-space indent.
/// Empty input yields an empty string.
pub fn render_declarations(style: &StyleObject) -> String {
    render_lines(&collect_declarations(style), "  ")
}

pub(crate) fn render_lines(declarations: &[Declaration], indent: &str) -> String {
    declarations
        .iter()
        .map(|declaration| declaration.to_line(indent))
        .collect::<Vec<_>>()
        .join("\n")
}
