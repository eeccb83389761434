//! Conditional Rules
//!
//! Classifies `@media` / `@container` / `@supports` keys, normalizes them and
//! AND-merges nested conditions of the same kind.

use std::fmt;

use crate::selector::split_top_level;

/// Kind of conditional rule introduced by a style key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Media,
    Container,
    Supports,
}

impl RuleKind {
    pub const ALL: [RuleKind; 3] = [RuleKind::Media, RuleKind::Container, RuleKind::Supports];

    /// At-rule keyword including the `@`
    pub fn introducer(self) -> &'static str {
        match self {
            RuleKind::Media => "@media",
            RuleKind::Container => "@container",
            RuleKind::Supports => "@supports",
        }
    }

    /// Classify a style key by prefix. `None` means the key is not a
    /// conditional rule.
    pub fn classify(key: &str) -> Option<RuleKind> {
        let key = key.trim_start();
        Self::ALL.into_iter().find(|kind| {
            key.strip_prefix(kind.introducer())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('('))
        })
    }
}

/// A normalized conditional rule: kind plus bare condition text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    kind: RuleKind,
    condition: String,
}

impl Query {
    /// Parse a conditional-rule key such as `@media(min-width: 768px)`
    pub fn parse(key: &str) -> Option<Self> {
        let kind = RuleKind::classify(key)?;
        let rest = &key.trim_start()[kind.introducer().len()..];
        Some(Self::with_condition(kind, rest))
    }

    /// Wrap a bare condition with its introducer
    pub fn with_condition(kind: RuleKind, condition: &str) -> Self {
        Self {
            kind,
            condition: collapse_spaces(condition),
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Condition text without the introducer (may be empty)
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Merge a condition nested inside this one.
    ///
    /// Same kind: `@media (A)` + `@media (B)` → `@media (A) and (B)`.
    /// Different kinds are not merged; the inner condition is returned as is.
    pub fn merge(&self, inner: &Query) -> Query {
        if self.kind != inner.kind {
            tracing::debug!(
                outer = %self,
                inner = %inner,
                "conditional rules of different kinds are not merged"
            );
            return inner.clone();
        }
        if self.condition.is_empty() {
            return inner.clone();
        }
        if inner.condition.is_empty() {
            return self.clone();
        }

        // Comma lists are OR-ed, so AND distributes over them
        let mut combined = Vec::new();
        for outer_part in split_top_level(&self.condition, ',') {
            for inner_part in split_top_level(&inner.condition, ',') {
                combined.push(merge_part(self.kind, outer_part.trim(), inner_part.trim()));
            }
        }

        Query {
            kind: self.kind,
            condition: combined.join(", "),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.condition.is_empty() {
            f.write_str(self.kind.introducer())
        } else {
            write!(f, "{} {}", self.kind.introducer(), self.condition)
        }
    }
}

/// Canonical form of a conditional-rule key; other keys pass through.
pub fn normalize(key: &str) -> String {
    match Query::parse(key) {
        Some(query) => query.to_string(),
        None => key.to_string(),
    }
}

/// String form of [`Query::merge`]. If `outer` is not a conditional rule the
/// inner key is returned normalized.
pub fn merge_conditions(outer: &str, inner: &str) -> String {
    match (Query::parse(outer), Query::parse(inner)) {
        (Some(outer), Some(inner)) => outer.merge(&inner).to_string(),
        _ => normalize(inner),
    }
}

/// AND-join one alternative of each side.
///
/// A container name may only lead the condition, so at most one name
/// survives. Two different names cannot be combined; the inner one wins.
fn merge_part(kind: RuleKind, outer: &str, inner: &str) -> String {
    if kind == RuleKind::Container {
        let (outer_name, outer_rest) = split_container_name(outer);
        let (inner_name, inner_rest) = split_container_name(inner);
        match (outer_name, inner_name) {
            (Some(outer_name), Some(inner_name)) if outer_name != inner_name => {
                tracing::debug!(outer, inner, "differently named containers are not merged");
                return inner.to_string();
            }
            (Some(name), _) | (None, Some(name)) => {
                let conditions: Vec<&str> = [outer_rest, inner_rest]
                    .into_iter()
                    .filter(|rest| !rest.is_empty())
                    .collect();
                if conditions.is_empty() {
                    return name.to_string();
                }
                return format!("{name} {}", conditions.join(" and "));
            }
            (None, None) => {}
        }
    }
    format!("{outer} and {inner}")
}

/// Split `card (min-width: 20rem)` into `(Some("card"), "(min-width: 20rem)")`
fn split_container_name(part: &str) -> (Option<&str>, &str) {
    let (first, rest) = part.split_once(char::is_whitespace).unwrap_or((part, ""));
    let is_name = !first.is_empty() && !first.contains('(') && !first.eq_ignore_ascii_case("not");
    if is_name {
        (Some(first), rest.trim())
    } else {
        (None, part)
    }
}

fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
