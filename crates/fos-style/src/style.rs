//! Style Object Tree
//!
//! Ordered, typed representation of the nested style objects authored for
//! the design system. Key order is significant: declarations are emitted in
//! insertion order.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// Reserved key naming the classes of the enclosing selector
pub const CLASS_NAME_KEY: &str = "className";

/// Reserved key holding declarations for the current selector
pub const SELF_KEY: &str = "self";

/// A single value inside a style object
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<StyleValue>),
    Object(StyleObject),
}

impl StyleValue {
    pub fn is_null(&self) -> bool {
        matches!(self, StyleValue::Null)
    }

    pub fn as_object(&self) -> Option<&StyleObject> {
        match self {
            StyleValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(text) => Some(text),
            _ => None,
        }
    }

    /// Convert a JSON value, keeping object key order.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => StyleValue::Null,
            Value::Bool(flag) => StyleValue::Bool(*flag),
            Value::Number(number) => number
                .as_f64()
                .map(StyleValue::Number)
                .unwrap_or(StyleValue::Null),
            Value::String(text) => StyleValue::String(text.clone()),
            Value::Array(items) => StyleValue::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => StyleValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::String(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::String(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<u32> for StyleValue {
    fn from(value: u32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        StyleValue::Bool(value)
    }
}

impl From<StyleObject> for StyleValue {
    fn from(value: StyleObject) -> Self {
        StyleValue::Object(value)
    }
}

impl<T: Into<StyleValue>> From<Vec<T>> for StyleValue {
    fn from(values: Vec<T>) -> Self {
        StyleValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(StyleValue::Null)
    }
}

/// Ordered property map. Re-inserting a key replaces its value in place,
/// matching object-literal semantics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleObject {
    entries: Vec<(String, StyleValue)>,
}

impl StyleObject {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Builder form of [`StyleObject::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<StyleValue> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    /// The `className` field, if present
    pub fn class_name(&self) -> Option<&StyleValue> {
        self.get(CLASS_NAME_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert a JSON object. Returns `None` for any other JSON value.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match StyleValue::from_json(value) {
            StyleValue::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = StyleObject::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl IntoIterator for StyleObject {
    type Item = (String, StyleValue);
    type IntoIter = std::vec::IntoIter<(String, StyleValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Ordered map of selector → style object, the input of the assembler
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSheet {
    rules: Vec<(String, StyleObject)>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with(mut self, selector: impl Into<String>, style: StyleObject) -> Self {
        self.insert(selector, style);
        self
    }

    pub fn insert(&mut self, selector: impl Into<String>, style: StyleObject) {
        let selector = selector.into();
        match self.rules.iter_mut().find(|(existing, _)| *existing == selector) {
            Some((_, slot)) => *slot = style,
            None => self.rules.push((selector, style)),
        }
    }

    pub fn get(&self, selector: &str) -> Option<&StyleObject> {
        self.rules
            .iter()
            .find(|(existing, _)| existing == selector)
            .map(|(_, style)| style)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleObject)> {
        self.rules.iter().map(|(selector, style)| (selector.as_str(), style))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build from a style object whose keys are selectors.
    /// Entries that are not objects cannot carry rules and are dropped.
    pub fn from_object(object: StyleObject) -> Self {
        let mut sheet = StyleSheet::new();
        for (selector, value) in object {
            match value {
                StyleValue::Object(style) => sheet.insert(selector, style),
                _ => tracing::warn!(%selector, "stylesheet entry is not a style object; dropped"),
            }
        }
        sheet
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        StyleObject::from_json(value).map(Self::from_object)
    }
}

impl FromIterator<(String, StyleObject)> for StyleSheet {
    fn from_iter<I: IntoIterator<Item = (String, StyleObject)>>(iter: I) -> Self {
        let mut sheet = StyleSheet::new();
        for (selector, style) in iter {
            sheet.insert(selector, style);
        }
        sheet
    }
}

struct StyleValueVisitor;

impl<'de> Visitor<'de> for StyleValueVisitor {
    type Value = StyleValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a style value (string, number, boolean, array, object or null)")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<StyleValue, E> {
        Ok(StyleValue::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<StyleValue, E> {
        Ok(StyleValue::Number(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<StyleValue, E> {
        Ok(StyleValue::Number(value as f64))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<StyleValue, E> {
        Ok(StyleValue::Number(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<StyleValue, E> {
        Ok(StyleValue::String(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<StyleValue, E> {
        Ok(StyleValue::String(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<StyleValue, E> {
        Ok(StyleValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<StyleValue, E> {
        Ok(StyleValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<StyleValue, D::Error> {
        StyleValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<StyleValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(StyleValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StyleValue, A::Error> {
        let mut object = StyleObject::new();
        while let Some((key, value)) = map.next_entry::<String, StyleValue>()? {
            object.insert(key, value);
        }
        Ok(StyleValue::Object(object))
    }
}

impl<'de> Deserialize<'de> for StyleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StyleValueVisitor)
    }
}

impl<'de> Deserialize<'de> for StyleObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StyleValue::deserialize(deserializer)? {
            StyleValue::Object(object) => Ok(object),
            _ => Err(de::Error::custom("expected a style object")),
        }
    }
}

impl<'de> Deserialize<'de> for StyleSheet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StyleObject::deserialize(deserializer).map(StyleSheet::from_object)
    }
}
