//! Selector Composition
//!
//! Purely syntactic: selectors are combined by string substitution and never
//! inspected for specificity or validity.

use crate::style::StyleValue;

/// Explicit parent reference inside a selector fragment
pub const PARENT_MARKER: char = '&';

/// Build the selector for a `className` field.
///
/// `"btn"` → `.btn`, `["a", "b"]` → `.a, .b`. A leading `.` is not doubled.
/// Returns `None` when no usable class name is present.
pub fn class_selector(class_name: &StyleValue) -> Option<String> {
    let names: Vec<&str> = match class_name {
        StyleValue::String(name) => vec![name.as_str()],
        StyleValue::Array(items) => items.iter().filter_map(StyleValue::as_str).collect(),
        _ => return None,
    };

    let selectors: Vec<String> = names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| match name.strip_prefix('.') {
            Some(_) => name.to_string(),
            None => format!(".{name}"),
        })
        .collect();

    if selectors.is_empty() {
        None
    } else {
        Some(selectors.join(", "))
    }
}

/// Combine a parent selector with a child fragment.
///
/// - fragments containing `&` have every `&` replaced by the parent
/// - fragments starting with `:` are appended directly (`.btn:hover`)
/// - anything else is a descendant (`.card img`)
///
/// Comma lists on either side are expanded parent-major:
/// `compose_child(".a, .b", "&:hover, &:focus")` →
/// `.a:hover, .a:focus, .b:hover, .b:focus`.
pub fn compose_child(parent: &str, fragment: &str) -> String {
    let parents: Vec<&str> = split_top_level(parent, ',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let children: Vec<&str> = split_top_level(fragment, ',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parents.is_empty() {
        return children.join(", ");
    }

    let mut composed = Vec::with_capacity(parents.len() * children.len());
    for parent in &parents {
        for child in &children {
            composed.push(compose_one(parent, child));
        }
    }
    composed.join(", ")
}

fn compose_one(parent: &str, child: &str) -> String {
    if child.contains(PARENT_MARKER) {
        child.replace(PARENT_MARKER, parent)
    } else if child.starts_with(':') {
        format!("{parent}{child}")
    } else {
        format!("{parent} {child}")
    }
}

/// Split on `separator` where it is not nested inside `()`, `[]` or quotes.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if ch == separator && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_selector() {
        assert_eq!(class_selector(&StyleValue::from("btn")), Some(".btn".to_string()));
        assert_eq!(
            class_selector(&StyleValue::from(vec!["a", "b"])),
            Some(".a, .b".to_string())
        );
        assert_eq!(class_selector(&StyleValue::from(".card")), Some(".card".to_string()));
    }

    #[test]
    fn test_class_selector_rejects_unusable_values() {
        assert_eq!(class_selector(&StyleValue::from("")), None);
        assert_eq!(class_selector(&StyleValue::from(3)), None);
        assert_eq!(class_selector(&StyleValue::Array(Vec::new())), None);
    }

    #[test]
    fn test_pseudo_and_descendant() {
        assert_eq!(compose_child(".btn", ":hover"), ".btn:hover");
        assert_eq!(compose_child(".btn", "::before"), ".btn::before");
        assert_eq!(compose_child(".card", "img"), ".card img");
        assert_eq!(compose_child(".list", "> li"), ".list > li");
    }

    #[test]
    fn test_parent_reference_replaces_every_marker() {
        assert_eq!(compose_child(".btn", "&:hover"), ".btn:hover");
        assert_eq!(compose_child(".btn", "& + &"), ".btn + .btn");
        assert_eq!(compose_child(".btn", ".dark &"), ".dark .btn");

        let composed = compose_child(".x", "&.active &-icon");
        assert!(!composed.contains('&'));
        assert_eq!(composed, ".x.active .x-icon");
    }

    #[test]
    fn test_comma_fragments() {
        assert_eq!(compose_child(".btn", "&:hover, &:focus"), ".btn:hover, .btn:focus");
        assert_eq!(compose_child(".nav", "a,button"), ".nav a, .nav button");
    }

    #[test]
    fn test_comma_parents_expand() {
        assert_eq!(compose_child(".a, .b", "&:hover"), ".a:hover, .b:hover");
        assert_eq!(
            compose_child(".a, .b", "span, em"),
            ".a span, .a em, .b span, .b em"
        );
    }

    #[test]
    fn test_nested_commas_are_not_split() {
        assert_eq!(compose_child(".btn", "&:is(.a, .b)"), ".btn:is(.a, .b)");
        assert_eq!(
            split_top_level(r#"[data-x="a,b"], .c"#, ','),
            vec![r#"[data-x="a,b"]"#, " .c"]
        );
    }

    #[test]
    fn test_composition_is_repeatable() {
        let first = compose_child(".menu", "&:hover, li");
        let second = compose_child(".menu", "&:hover, li");
        assert_eq!(first, second);
    }
}
