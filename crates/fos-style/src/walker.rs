//! Tree Walker / Block Emitter
//!
//! Recursively walks a style object, emitting one rule per selector that has
//! declarations. Rules under a conditional are wrapped in its at-rule;
//! nested conditionals of the same kind are merged into a single standalone
//! at-rule instead of being nested in the output.
//!
//! Emission order at every level: own declarations, nested selectors (source
//! order), then conditional rules (source order).

use std::fmt;

use crate::declarations::{Declaration, render_lines};
use crate::query::{Query, RuleKind};
use crate::selector::compose_child;
use crate::style::{CLASS_NAME_KEY, SELF_KEY, StyleObject, StyleValue};

/// Why an entry contributed no output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `@media`/`@container`/`@supports` key whose value is not an object
    ConditionalNotObject,
    /// `self` key whose value is not an object
    SelfNotObject,
    /// Nested rule with an empty selector fragment
    EmptySelector,
    /// At-rule other than media, container and supports
    UnsupportedAtRule,
    /// Value with no CSS form (e.g. an array holding objects)
    InvalidValue,
    /// Content directly under a bare `@container` or `@supports`
    MissingCondition,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::ConditionalNotObject => "conditional rule value is not an object",
            SkipReason::SelfNotObject => "`self` value is not an object",
            SkipReason::EmptySelector => "empty selector fragment",
            SkipReason::UnsupportedAtRule => "unsupported at-rule",
            SkipReason::InvalidValue => "value has no CSS representation",
            SkipReason::MissingCondition => "at-rule has no condition",
        };
        f.write_str(text)
    }
}

/// A style entry dropped during emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Selector the entry was found under
    pub selector: String,
    pub key: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` under `{}`: {}", self.key, self.selector, self.reason)
    }
}

/// Classified style entry
enum Entry<'a> {
    /// `className` or a null value
    Ignored,
    Declaration(Declaration),
    Nested(&'a str, &'a StyleObject),
    Conditional(Query, &'a StyleObject),
    /// `self` block: entries apply to the current selector
    SelfBlock(&'a StyleObject),
    Skipped(SkipReason),
}

impl<'a> Entry<'a> {
    fn classify(key: &'a str, value: &'a StyleValue) -> Self {
        if key == CLASS_NAME_KEY || value.is_null() {
            return Entry::Ignored;
        }

        let trimmed = key.trim();
        let query = Query::parse(trimmed);
        match value {
            StyleValue::Object(object) => {
                if let Some(query) = query {
                    Entry::Conditional(query, object)
                } else if trimmed == SELF_KEY {
                    Entry::SelfBlock(object)
                } else if trimmed.starts_with('@') {
                    Entry::Skipped(SkipReason::UnsupportedAtRule)
                } else if trimmed.is_empty() {
                    Entry::Skipped(SkipReason::EmptySelector)
                } else {
                    Entry::Nested(trimmed, object)
                }
            }
            _ if query.is_some() => Entry::Skipped(SkipReason::ConditionalNotObject),
            _ if trimmed == SELF_KEY => Entry::Skipped(SkipReason::SelfNotObject),
            _ if trimmed.starts_with('@') => Entry::Skipped(SkipReason::UnsupportedAtRule),
            _ => match Declaration::from_entry(trimmed, value) {
                Some(declaration) => Entry::Declaration(declaration),
                None => Entry::Skipped(SkipReason::InvalidValue),
            },
        }
    }
}

/// Entries of one level, bucketed
#[derive(Default)]
struct Partition<'a> {
    declarations: Vec<Declaration>,
    nested: Vec<(&'a str, &'a StyleObject)>,
    conditional: Vec<(Query, &'a StyleObject)>,
}

/// A rule ready for printing
#[derive(Debug, Clone, PartialEq)]
struct EmittedRule {
    condition: Option<Query>,
    selector: String,
    declarations: Vec<Declaration>,
}

/// Collects emitted rules and skipped entries for one compilation
#[derive(Debug, Default)]
pub(crate) struct Walker {
    rules: Vec<EmittedRule>,
    skipped: Vec<SkippedEntry>,
}

impl Walker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Walk `style` under `selector`, optionally inside an active condition
    pub(crate) fn walk(&mut self, style: &StyleObject, selector: &str, condition: Option<&Query>) {
        let mut partition = Partition::default();
        self.partition_into(style, selector, &mut partition);

        if !partition.declarations.is_empty() {
            self.rules.push(EmittedRule {
                condition: condition.cloned(),
                selector: selector.to_string(),
                declarations: partition.declarations,
            });
        }

        for (fragment, child) in partition.nested {
            let composed = compose_child(selector, fragment);
            self.walk(child, &composed, condition);
        }

        for (query, body) in partition.conditional {
            if query.condition().is_empty() {
                self.walk_bare(&query, body, selector, condition);
            } else {
                self.walk_conditional(&query, body, selector, condition);
            }
        }
    }

    fn walk_conditional(&mut self, query: &Query, body: &StyleObject, selector: &str, outer: Option<&Query>) {
        let effective = match outer {
            Some(outer) => outer.merge(query),
            None => query.clone(),
        };
        tracing::trace!(selector, condition = %effective, "entering conditional rule");
        self.walk(body, selector, Some(&effective));
    }

    /// Bare introducer (`"@media": { "(min-width: 768px)": {...} }`): child
    /// keys starting with `(` are its conditions. Remaining content applies
    /// unconditionally for `@media` and is skipped for the other kinds,
    /// which are invalid without a condition.
    fn walk_bare(&mut self, query: &Query, body: &StyleObject, selector: &str, outer: Option<&Query>) {
        let mut rest = StyleObject::new();
        let mut conditions = Vec::new();

        for (key, value) in body.iter() {
            let trimmed = key.trim();
            if !trimmed.starts_with('(') {
                if key != CLASS_NAME_KEY && !value.is_null() {
                    rest.insert(key, value.clone());
                }
                continue;
            }
            match value.as_object() {
                Some(child) => conditions.push((Query::with_condition(query.kind(), trimmed), child)),
                None => self.skip(selector, key, SkipReason::ConditionalNotObject),
            }
        }

        if !rest.is_empty() {
            if query.kind() == RuleKind::Media {
                self.walk_conditional(query, &rest, selector, outer);
            } else {
                for (key, _) in rest.iter() {
                    self.skip(selector, key, SkipReason::MissingCondition);
                }
            }
        }

        for (wrapped, child) in conditions {
            self.walk_conditional(&wrapped, child, selector, outer);
        }
    }

    fn partition_into<'a>(&mut self, style: &'a StyleObject, selector: &str, partition: &mut Partition<'a>) {
        for (key, value) in style.iter() {
            match Entry::classify(key, value) {
                Entry::Ignored => {}
                Entry::Declaration(declaration) => partition.declarations.push(declaration),
                Entry::Nested(fragment, child) => partition.nested.push((fragment, child)),
                Entry::Conditional(query, body) => partition.conditional.push((query, body)),
                // Flattened in place so `self` and direct forms emit identically
                Entry::SelfBlock(body) => self.partition_into(body, selector, partition),
                Entry::Skipped(reason) => self.skip(selector, key, reason),
            }
        }
    }

    fn skip(&mut self, selector: &str, key: &str, reason: SkipReason) {
        tracing::warn!(selector, key, %reason, "skipping malformed style entry");
        self.skipped.push(SkippedEntry {
            selector: selector.to_string(),
            key: key.to_string(),
            reason,
        });
    }

    /// Print the collected rules and hand back the skipped entries.
    ///
    /// Consecutive rules under the same condition share one at-rule block.
    /// Top-level blocks are separated by a blank line.
    pub(crate) fn finish(self) -> (String, Vec<SkippedEntry>) {
        let mut blocks: Vec<String> = Vec::new();
        let mut rules = self.rules.into_iter().peekable();

        while let Some(rule) = rules.next() {
            match rule.condition {
                None => blocks.push(render_rule(&rule.selector, &rule.declarations, "")),
                Some(condition) => {
                    let mut inner = vec![render_rule(&rule.selector, &rule.declarations, "  ")];
                    while let Some(next) = rules.next_if(|next| next.condition.as_ref() == Some(&condition)) {
                        inner.push(render_rule(&next.selector, &next.declarations, "  "));
                    }
                    blocks.push(format!("{condition} {{\n{}\n}}", inner.join("\n")));
                }
            }
        }

        (blocks.join("\n\n"), self.skipped)
    }
}

fn render_rule(selector: &str, declarations: &[Declaration], indent: &str) -> String {
    let body = render_lines(declarations, &format!("{indent}  "));
    format!("{indent}{selector} {{\n{body}\n{indent}}}")
}

/// Emit CSS for `style` under `selector`, ignoring diagnostics.
pub fn emit(style: &StyleObject, selector: &str) -> String {
    let mut walker = Walker::new();
    walker.walk(style, selector, None);
    walker.finish().0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(style: &StyleObject, selector: &str) -> (String, Vec<SkippedEntry>) {
        let mut walker = Walker::new();
        walker.walk(style, selector, None);
        walker.finish()
    }

    #[test]
    fn test_main_block_only() {
        let style = StyleObject::new().with("color", "red").with("fontSize", 14);
        assert_eq!(emit(&style, ".btn"), ".btn {\n  color: red;\n  font-size: 14px;\n}");
    }

    #[test]
    fn test_empty_object_emits_nothing() {
        assert_eq!(emit(&StyleObject::new(), ".btn"), "");
        let only_nested_empty = StyleObject::new().with("&:hover", StyleObject::new());
        assert_eq!(emit(&only_nested_empty, ".btn"), "");
    }

    #[test]
    fn test_order_is_main_nested_conditional() {
        let style = StyleObject::new()
            .with("@media print", StyleObject::new().with("display", "none"))
            .with("img", StyleObject::new().with("width", "100%"))
            .with("color", "red");

        assert_eq!(
            emit(&style, ".card"),
            ".card {\n  color: red;\n}\n\n.card img {\n  width: 100%;\n}\n\n@media print {\n  .card {\n    display: none;\n  }\n}"
        );
    }

    #[test]
    fn test_nested_selectors_inside_conditional() {
        let style = StyleObject::new().with(
            "@media (min-width: 768px)",
            StyleObject::new()
                .with("padding", 16)
                .with("&:hover", StyleObject::new().with("color", "blue")),
        );

        assert_eq!(
            emit(&style, ".btn"),
            "@media (min-width: 768px) {\n  .btn {\n    padding: 16px;\n  }\n  .btn:hover {\n    color: blue;\n  }\n}"
        );
    }

    #[test]
    fn test_same_kind_nesting_is_merged() {
        let style = StyleObject::new().with(
            "@media (min-width: 768px)",
            StyleObject::new()
                .with("color", "blue")
                .with("@media (min-width: 1024px)", StyleObject::new().with("color", "green")),
        );

        assert_eq!(
            emit(&style, ".btn"),
            "@media (min-width: 768px) {\n  .btn {\n    color: blue;\n  }\n}\n\n\
             @media (min-width: 768px) and (min-width: 1024px) {\n  .btn {\n    color: green;\n  }\n}"
        );
    }

    #[test]
    fn test_mixed_kind_nesting_keeps_inner() {
        let style = StyleObject::new().with(
            "@media (min-width: 768px)",
            StyleObject::new().with("@container (min-width: 300px)", StyleObject::new().with("gap", 8)),
        );

        assert_eq!(
            emit(&style, ".grid"),
            "@container (min-width: 300px) {\n  .grid {\n    gap: 8px;\n  }\n}"
        );
    }

    #[test]
    fn test_self_and_direct_forms_match() {
        let direct = StyleObject::new().with(
            "@media (max-width: 600px)",
            StyleObject::new()
                .with("display", "block")
                .with("span", StyleObject::new().with("margin", 0)),
        );
        let self_form = StyleObject::new().with(
            "@media (max-width: 600px)",
            StyleObject::new()
                .with("self", StyleObject::new().with("display", "block"))
                .with("span", StyleObject::new().with("margin", 0)),
        );

        assert_eq!(emit(&direct, ".menu"), emit(&self_form, ".menu"));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let style = StyleObject::new()
            .with("color", "red")
            .with("@media (min-width: 1px)", "oops")
            .with("@layer base", StyleObject::new().with("color", "blue"))
            .with("", StyleObject::new().with("color", "green"))
            .with("self", 4);

        let (css, skipped) = walk(&style, ".btn");
        assert_eq!(css, ".btn {\n  color: red;\n}");

        let reasons: Vec<_> = skipped.iter().map(|entry| entry.reason).collect();
        assert_eq!(
            reasons,
            [
                SkipReason::ConditionalNotObject,
                SkipReason::UnsupportedAtRule,
                SkipReason::EmptySelector,
                SkipReason::SelfNotObject,
            ]
        );
        assert_eq!(skipped[0].selector, ".btn");
    }

    #[test]
    fn test_bare_media_takes_condition_from_child_keys() {
        let style = StyleObject::new().with(
            "@media",
            StyleObject::new()
                .with("color", "blue")
                .with("(min-width: 768px)", StyleObject::new().with("color", "red")),
        );

        assert_eq!(
            emit(&style, ".a"),
            "@media {\n  .a {\n    color: blue;\n  }\n}\n\n\
             @media (min-width: 768px) {\n  .a {\n    color: red;\n  }\n}"
        );
    }

    #[test]
    fn test_bare_media_condition_merges_with_outer() {
        let style = StyleObject::new().with(
            "@media screen",
            StyleObject::new().with(
                "@media",
                StyleObject::new().with("(min-width: 768px)", StyleObject::new().with("gap", 4)),
            ),
        );

        assert_eq!(
            emit(&style, ".a"),
            "@media screen and (min-width: 768px) {\n  .a {\n    gap: 4px;\n  }\n}"
        );
    }

    #[test]
    fn test_bare_container_skips_unconditioned_content() {
        let style = StyleObject::new().with(
            "@container",
            StyleObject::new()
                .with("color", "red")
                .with("(min-width: 300px)", StyleObject::new().with("gap", 8))
                .with("(max-width: 10px)", "oops"),
        );

        let (css, skipped) = walk(&style, ".a");
        assert_eq!(css, "@container (min-width: 300px) {\n  .a {\n    gap: 8px;\n  }\n}");

        let reasons: Vec<_> = skipped.iter().map(|entry| (entry.key.as_str(), entry.reason)).collect();
        assert_eq!(
            reasons,
            [
                ("(max-width: 10px)", SkipReason::ConditionalNotObject),
                ("color", SkipReason::MissingCondition),
            ]
        );
    }

    #[test]
    fn test_supports_rules_merge() {
        let style = StyleObject::new().with(
            "@supports (display: grid)",
            StyleObject::new()
                .with("display", "grid")
                .with("@supports (gap: 1px)", StyleObject::new().with("gap", 4)),
        );

        assert_eq!(
            emit(&style, ".a"),
            "@supports (display: grid) {\n  .a {\n    display: grid;\n  }\n}\n\n\
             @supports (display: grid) and (gap: 1px) {\n  .a {\n    gap: 4px;\n  }\n}"
        );
    }

    #[test]
    fn test_property_keys_are_trimmed() {
        let style = StyleObject::new().with(" color ", "red");
        assert_eq!(emit(&style, ".a"), ".a {\n  color: red;\n}");
    }

    #[test]
    fn test_class_name_is_never_a_declaration() {
        let style = StyleObject::new()
            .with("className", "btn")
            .with("&:hover", StyleObject::new().with("className", "ignored").with("color", "blue"));

        assert_eq!(emit(&style, ".btn"), ".btn:hover {\n  color: blue;\n}");
    }
}
