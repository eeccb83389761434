//! CSS Minification
//!
//! The default minifier is a pure string rewrite that never parses CSS.
//! [`LightningMinifier`] runs the output through lightningcss instead, which
//! also rejects structurally broken stylesheets.

use std::fmt;

use crate::MinifyError;

/// Post-processing step applied to assembled CSS
pub trait Minifier: fmt::Debug + Send + Sync {
    fn minify(&self, css: &str) -> Result<String, MinifyError>;
}

/// Whitespace-collapsing minifier (see [`collapse_whitespace`])
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceMinifier;

impl Minifier for WhitespaceMinifier {
    fn minify(&self, css: &str) -> Result<String, MinifyError> {
        Ok(collapse_whitespace(css))
    }
}

/// Minifier backed by lightningcss's parser and printer
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningMinifier;

impl Minifier for LightningMinifier {
    fn minify(&self, css: &str) -> Result<String, MinifyError> {
        use lightningcss::printer::PrinterOptions;
        use lightningcss::stylesheet::{ParserOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| MinifyError::Rejected { message: e.to_string() })?;

        let printed = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| MinifyError::Print { message: e.to_string() })?;

        Ok(printed.code)
    }
}

/// Collapse whitespace without touching string literals.
///
/// Line breaks and runs of whitespace become single spaces; spaces next to
/// `{`, `}`, `;` and `,` and after `:` are removed, as is the last `;` of a
/// block. A space before `:` is kept since `.a :hover` differs from
/// `.a:hover`.
pub fn collapse_whitespace(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars();
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    while let Some(ch) = chars.next() {
        if let Some(open) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space {
            pending_space = false;
            let tight_before = out.ends_with(['{', '}', ';', ',', ':']);
            let tight_after = matches!(ch, '{' | '}' | ';' | ',');
            if !out.is_empty() && !tight_before && !tight_after {
                out.push(' ');
            }
        }

        if ch == '}' && out.ends_with(';') {
            out.pop();
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
        }
        out.push(ch);
    }

    out
}
