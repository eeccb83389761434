//! Duplicate Removal
//!
//! Removes declarations that a later declaration for the same selector and
//! property (within the same at-rule context) overrides anyway, so the
//! cascade result is unchanged. The scan is structural only: braces,
//! semicolons, quotes and parentheses; values are never interpreted.

use std::collections::HashSet;

/// One node of a scanned stylesheet
#[derive(Debug, Clone, PartialEq)]
enum Node {
    /// `@import ...;` and other block-less statements
    Statement(String),
    /// `selector{decl;decl}`
    Rule { selector: String, declarations: Vec<String> },
    /// At-rule holding declarations (`@font-face{...}`), compared as a whole
    Opaque(String),
    /// At-rule holding rules (`@media ...{...}`)
    Block { prelude: String, children: Vec<Node> },
}

impl Node {
    fn is_empty(&self) -> bool {
        match self {
            Node::Rule { declarations, .. } => declarations.is_empty(),
            Node::Block { children, .. } => children.is_empty(),
            Node::Statement(text) | Node::Opaque(text) => text.is_empty(),
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Node::Statement(text) | Node::Opaque(text) => out.push_str(text),
            Node::Rule { selector, declarations } => {
                out.push_str(selector);
                out.push('{');
                out.push_str(&declarations.join(";"));
                out.push('}');
            }
            Node::Block { prelude, children } => {
                out.push_str(prelude);
                out.push('{');
                for child in children {
                    child.render(out);
                }
                out.push('}');
            }
        }
    }
}

/// Remove overridden declarations and duplicate rules, keeping the last
/// occurrence. Output is minified.
///
/// An `!important` declaration is only removed by a later `!important`
/// declaration of the same property. Rules left empty are dropped; the
/// remaining rules keep their relative order.
pub fn dedupe(css: &str) -> String {
    let mut nodes = parse_nodes(css);
    let mut seen = Seen::default();
    prune(&mut nodes, "", &mut seen);

    let mut statements = HashSet::new();
    nodes.retain(|node| match node {
        Node::Statement(text) => statements.insert(text.clone()),
        _ => true,
    });

    let mut out = String::with_capacity(css.len());
    for node in &nodes {
        node.render(&mut out);
    }

    tracing::trace!(before = css.len(), after = out.len(), "deduplicated stylesheet");
    out
}

/// Keys already seen while scanning backwards
#[derive(Default)]
struct Seen {
    normal: HashSet<(String, String, String)>,
    important: HashSet<(String, String, String)>,
    opaque: HashSet<(String, String)>,
}

impl Seen {
    /// Whether a declaration survives, given everything after it
    fn keep_declaration(&mut self, context: &str, selector: &str, declaration: &str) -> bool {
        let Some((property, value)) = declaration.split_once(':') else {
            return true;
        };
        let key = (context.to_string(), selector.to_string(), property.trim().to_string());

        if is_important(value) {
            self.important.insert(key)
        } else {
            let overridden = self.important.contains(&key);
            self.normal.insert(key) && !overridden
        }
    }
}

fn is_important(value: &str) -> bool {
    let value = value.trim_end().to_ascii_lowercase();
    value
        .strip_suffix("important")
        .is_some_and(|rest| rest.trim_end().ends_with('!'))
}

/// Walk nodes last-to-first, dropping everything a later node overrides
fn prune(nodes: &mut Vec<Node>, context: &str, seen: &mut Seen) {
    let mut keep = vec![true; nodes.len()];

    for (index, node) in nodes.iter_mut().enumerate().rev() {
        match node {
            Node::Rule { selector, declarations } => {
                let mut kept: Vec<String> = Vec::with_capacity(declarations.len());
                for declaration in declarations.drain(..).rev() {
                    if seen.keep_declaration(context, selector, &declaration) {
                        kept.push(declaration);
                    }
                }
                kept.reverse();
                *declarations = kept;
            }
            Node::Block { prelude, children } => {
                let nested = format!("{context}{prelude}\u{1f}");
                prune(children, &nested, seen);
            }
            Node::Opaque(text) => {
                keep[index] = seen.opaque.insert((context.to_string(), text.clone()));
            }
            Node::Statement(_) => {}
        }
    }

    let mut flags = keep.into_iter();
    nodes.retain(|node| flags.next().unwrap_or(true) && !node.is_empty());
}

fn parse_nodes(src: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut pos = 0;

    while pos < src.len() {
        let rest = &src[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }
        if trimmed.starts_with('}') {
            // Stray closing brace
            pos += 1;
            continue;
        }

        let Some(offset) = find_top_level(trimmed, &[b'{', b';']) else {
            nodes.push(Node::Statement(trimmed.trim().to_string()));
            break;
        };

        if trimmed.as_bytes()[offset] == b';' {
            nodes.push(Node::Statement(trimmed[..=offset].trim().to_string()));
            pos += offset + 1;
            continue;
        }

        let prelude = trimmed[..offset].trim();
        let close = matching_brace(trimmed, offset);
        let body = &trimmed[offset + 1..close];
        pos += (close + 1).min(trimmed.len());

        let has_rules = find_top_level(body, &[b'{']).is_some();
        if prelude.starts_with('@') && has_rules {
            nodes.push(Node::Block {
                prelude: prelude.to_string(),
                children: parse_nodes(body),
            });
        } else if prelude.starts_with('@') || has_rules {
            nodes.push(Node::Opaque(format!("{prelude}{{{}}}", body.trim())));
        } else {
            nodes.push(Node::Rule {
                selector: prelude.to_string(),
                declarations: split_declarations(body),
            });
        }
    }

    nodes
}

fn split_declarations(body: &str) -> Vec<String> {
    let mut declarations = Vec::new();
    let mut rest = body;
    loop {
        let end = find_top_level(rest, &[b';']).unwrap_or(rest.len());
        let declaration = rest[..end].trim();
        if !declaration.is_empty() {
            declarations.push(declaration.to_string());
        }
        if end >= rest.len() {
            break;
        }
        rest = &rest[end + 1..];
    }
    declarations
}

/// Byte offset of the first target outside quotes and parentheses
fn find_top_level(text: &str, targets: &[u8]) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];
        if let Some(open) = quote {
            if byte == b'\\' {
                index += 1;
            } else if byte == open {
                quote = None;
            }
        } else {
            match byte {
                b'"' | b'\'' => quote = Some(byte),
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                _ if depth == 0 && targets.contains(&byte) => return Some(index),
                _ => {}
            }
        }
        index += 1;
    }
    None
}

/// Offset of the `}` closing the brace at `open`, or the end of input
fn matching_brace(text: &str, open: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut index = open;

    while index < bytes.len() {
        let byte = bytes[index];
        if let Some(q) = quote {
            if byte == b'\\' {
                index += 1;
            } else if byte == q {
                quote = None;
            }
        } else {
            match byte {
                b'"' | b'\'' => quote = Some(byte),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return index;
                    }
                }
                _ => {}
            }
        }
        index += 1;
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_value_wins() {
        assert_eq!(
            dedupe(".a{color:red}.b{color:green}.a{color:blue}"),
            ".b{color:green}.a{color:blue}"
        );
    }

    #[test]
    fn test_partial_rule_survives() {
        assert_eq!(
            dedupe(".a{color:red;margin:0}.a{color:blue}"),
            ".a{margin:0}.a{color:blue}"
        );
    }

    #[test]
    fn test_identical_rules_collapse() {
        assert_eq!(dedupe(".a{color:red}.a{color:red}"), ".a{color:red}");
    }

    #[test]
    fn test_repeated_property_in_one_rule() {
        assert_eq!(dedupe(".a{color:red;color:blue}"), ".a{color:blue}");
    }

    #[test]
    fn test_unique_rules_unchanged() {
        let css = ".a{color:red}.b{color:blue}@media (min-width:1px){.a{color:green}}";
        assert_eq!(dedupe(css), css);
    }

    #[test]
    fn test_important_is_not_overridden_by_normal() {
        let css = ".a{color:red!important}.a{color:blue}";
        assert_eq!(dedupe(css), css);
        assert_eq!(
            dedupe(".a{color:red}.a{color:blue !important}"),
            ".a{color:blue !important}"
        );
    }

    #[test]
    fn test_contexts_are_separate() {
        let css = "@media print{.a{color:red}}.a{color:blue}";
        assert_eq!(dedupe(css), css);
    }

    #[test]
    fn test_same_condition_blocks_dedupe() {
        assert_eq!(
            dedupe("@media print{.a{color:red}}@media print{.a{color:blue}}"),
            "@media print{.a{color:blue}}"
        );
    }

    #[test]
    fn test_font_faces_are_compared_whole() {
        let css = "@font-face{font-family:A;src:url(a.woff)}@font-face{font-family:B;src:url(b.woff)}";
        assert_eq!(dedupe(css), css);
        assert_eq!(
            dedupe("@font-face{font-family:A}@font-face{font-family:A}"),
            "@font-face{font-family:A}"
        );
    }

    #[test]
    fn test_semicolons_in_strings_and_urls() {
        let css = ".a{content:\";\";background:url(data:image/png;base64,AA)}";
        assert_eq!(dedupe(css), css);
    }

    #[test]
    fn test_statements_keep_first() {
        assert_eq!(
            dedupe("@import url(a.css);@import url(a.css);.a{color:red}"),
            "@import url(a.css);.a{color:red}"
        );
    }

    #[test]
    fn test_keyframes() {
        let css = "@keyframes fade{from{opacity:0}to{opacity:1}}";
        assert_eq!(dedupe(css), css);
    }
}
