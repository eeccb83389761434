//! Token Flattening
//!
//! Turns nested design-token tables into flat custom-property maps:
//! `{ neutral: { 100: "#fff" } }` with prefix `color-` becomes
//! `--color-neutral-100: #fff`. No selector or at-rule awareness.

use crate::style::{StyleObject, StyleValue};
use crate::value::to_kebab_case;

/// Options for [`flatten`]
#[derive(Debug, Clone, Copy)]
pub struct FlattenOptions {
    /// Convert camelCase keys to kebab-case
    pub kebab_case: bool,
    /// Custom key formatter; overrides `kebab_case`
    pub format_key: Option<fn(&str) -> String>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            kebab_case: true,
            format_key: None,
        }
    }
}

impl FlattenOptions {
    fn format(&self, key: &str) -> String {
        // Shade indices like "100" or "2xl" are not words
        if key.starts_with(|ch: char| ch.is_ascii_digit()) {
            return key.to_string();
        }
        match self.format_key {
            Some(format_key) => format_key(key),
            None if self.kebab_case => to_kebab_case(key),
            None => key.to_string(),
        }
    }
}

/// Flat, ordered map of custom-property name → value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomProperties {
    properties: StyleObject,
}

impl CustomProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.properties.get(name)
    }

    /// Later values replace earlier ones under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: StyleValue) {
        self.properties.insert(name, value);
    }

    pub fn extend(&mut self, other: CustomProperties) {
        for (name, value) in other.properties {
            self.properties.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Declarations-only style object, e.g. for a `:root` rule
    pub fn into_style_object(self) -> StyleObject {
        self.properties
    }
}

/// Flatten a token tree into custom properties.
///
/// Leaves under the current prefix become `--{prefix}{key}`; objects recurse
/// with `{prefix}{key}-`. Null leaves are dropped.
pub fn flatten(tree: &StyleObject, prefix: &str, options: &FlattenOptions) -> CustomProperties {
    let mut properties = CustomProperties::new();
    flatten_into(tree, prefix, options, &mut properties);
    tracing::trace!(prefix, count = properties.len(), "flattened token tree");
    properties
}

fn flatten_into(tree: &StyleObject, prefix: &str, options: &FlattenOptions, out: &mut CustomProperties) {
    for (key, value) in tree.iter() {
        let key = options.format(key);
        match value {
            StyleValue::Null => {}
            StyleValue::Object(child) => {
                flatten_into(child, &format!("{prefix}{key}-"), options, out);
            }
            leaf => out.insert(format!("--{prefix}{key}"), leaf.clone()),
        }
    }
}

/// A token tree with the prefix its custom properties live under
#[derive(Debug, Clone, Default)]
pub struct TokenGroup {
    pub prefix: String,
    pub tree: StyleObject,
    pub options: FlattenOptions,
}

impl TokenGroup {
    pub fn new(prefix: impl Into<String>, tree: StyleObject) -> Self {
        Self {
            prefix: prefix.into(),
            tree,
            options: FlattenOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FlattenOptions) -> Self {
        self.options = options;
        self
    }

    pub fn flatten(&self) -> CustomProperties {
        flatten(&self.tree, &self.prefix, &self.options)
    }
}

/// Flatten several groups into one map, later groups winning on collisions
pub fn flatten_groups(groups: &[TokenGroup]) -> CustomProperties {
    let mut properties = CustomProperties::new();
    for group in groups {
        properties.extend(group.flatten());
    }
    properties
}
