//! Stylesheet Assembly
//!
//! Compiles every selector of a [`StyleSheet`] and joins the results.
//! Unless prettified output is requested, the joined CSS is minified and
//! deduplicated.

use std::sync::Arc;

use crate::compile::{Compiler, CompilerOptions};
use crate::dedup::dedupe;
use crate::minify::{Minifier, WhitespaceMinifier};
use crate::style::{CLASS_NAME_KEY, StyleObject, StyleSheet, StyleValue};
use crate::{AssembleError, CompileError};

/// Assembler configuration
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Keep readable output; skips minification and deduplication
    pub prettify: bool,
    pub compiler: CompilerOptions,
    pub minifier: Arc<dyn Minifier>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            prettify: false,
            compiler: CompilerOptions::default(),
            minifier: Arc::new(WhitespaceMinifier),
        }
    }
}

impl AssembleOptions {
    pub fn prettified() -> Self {
        Self {
            prettify: true,
            ..Self::default()
        }
    }

    pub fn with_minifier(mut self, minifier: impl Minifier + 'static) -> Self {
        self.minifier = Arc::new(minifier);
        self
    }
}

/// Compile every entry of `sheet` and join the non-empty results with a
/// blank line. No minification.
///
/// Keys starting with `.` go through the class entry point with the rest of
/// the key as `className` (a `className` in the props takes precedence);
/// any other key is used as the selector verbatim.
pub fn compile_sheet(sheet: &StyleSheet, options: CompilerOptions) -> Result<String, CompileError> {
    let compiler = Compiler::new(options);
    let mut blocks = Vec::with_capacity(sheet.len());

    for (selector, props) in sheet.iter() {
        let compilation = match selector.strip_prefix('.') {
            Some(class_name) => compiler.compile_class_rule(&class_entry(class_name, props))?,
            None => compiler.compile_selector_rule(props, selector)?,
        };

        if !compilation.is_empty() {
            blocks.push(compilation.css);
        }
    }

    Ok(blocks.join("\n\n"))
}

/// Assemble synchronously, minifying on the calling thread.
pub fn assemble(sheet: &StyleSheet, options: &AssembleOptions) -> Result<String, AssembleError> {
    let css = compile_sheet(sheet, options.compiler)?;
    if options.prettify {
        return Ok(css);
    }
    let minified = options.minifier.minify(&css)?;
    Ok(dedupe(&minified))
}

/// Assemble, running the minifier on smol's blocking pool.
///
/// The minifier call is the only suspension point.
pub async fn assemble_async(sheet: &StyleSheet, options: &AssembleOptions) -> Result<String, AssembleError> {
    let css = compile_sheet(sheet, options.compiler)?;
    if options.prettify {
        return Ok(css);
    }

    let minifier = Arc::clone(&options.minifier);
    let minified = smol::unblock(move || minifier.minify(&css)).await?;
    Ok(dedupe(&minified))
}

/// Style object for a `.class` key: `{ className, ...props }`
pub fn class_entry(class_name: &str, props: &StyleObject) -> StyleObject {
    let mut style = StyleObject::new().with(CLASS_NAME_KEY, StyleValue::from(class_name));
    for (key, value) in props.iter() {
        style.insert(key, value.clone());
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MinifyError;
    use crate::minify::LightningMinifier;
    use serde_json::json;

    fn sheet(value: serde_json::Value) -> StyleSheet {
        StyleSheet::from_json(&value).unwrap()
    }

    #[test]
    fn test_class_and_arbitrary_selectors() {
        let input = sheet(json!({
            ".btn": { "color": "red", "&:hover": { "color": "blue" } },
            ":root": { "--gap": "4px" },
            "h1, h2": { "margin": 0 }
        }));

        assert_eq!(
            compile_sheet(&input, CompilerOptions::default()).unwrap(),
            ".btn {\n  color: red;\n}\n\n.btn:hover {\n  color: blue;\n}\n\n\
             :root {\n  --gap: 4px;\n}\n\nh1, h2 {\n  margin: 0;\n}"
        );
    }

    #[test]
    fn test_empty_entries_are_skipped() {
        let input = sheet(json!({ ".empty": {}, "p": { "margin": 0 } }));
        assert_eq!(
            compile_sheet(&input, CompilerOptions::default()).unwrap(),
            "p {\n  margin: 0;\n}"
        );
    }

    #[test]
    fn test_props_class_name_wins() {
        let input = sheet(json!({ ".ignored": { "className": ["x", "y"], "gap": 2 } }));
        assert_eq!(
            compile_sheet(&input, CompilerOptions::default()).unwrap(),
            ".x, .y {\n  gap: 2px;\n}"
        );
    }

    #[test]
    fn test_assemble_minifies_and_dedupes() {
        let input = sheet(json!({
            ".a": { "color": "red" },
            "p": { "margin": 0 },
            "a.link, .a": { "color": "green" },
            ".a:hover": { "color": "blue" }
        }));

        assert_eq!(
            assemble(&input, &AssembleOptions::default()).unwrap(),
            ".a{color:red}p{margin:0}a.link,.a{color:green}.a:hover{color:blue}"
        );
    }

    #[test]
    fn test_dedupe_keeps_later_value() {
        let input = sheet(json!({
            ".a": { "color": "red", "margin": 0 },
            "p": { "color": "gray" },
            ".b": { "className": "a", "color": "blue" }
        }));

        assert_eq!(
            assemble(&input, &AssembleOptions::default()).unwrap(),
            ".a{margin:0}p{color:gray}.a{color:blue}"
        );
    }

    #[test]
    fn test_prettify_skips_minification() {
        let input = sheet(json!({ ".a": { "color": "red" } }));
        assert_eq!(
            assemble(&input, &AssembleOptions::prettified()).unwrap(),
            ".a {\n  color: red;\n}"
        );
    }

    #[test]
    fn test_strict_compile_error_propagates() {
        let input = sheet(json!({ ".a": { "@media print": 1 } }));
        let options = AssembleOptions {
            compiler: CompilerOptions { strict: true },
            ..AssembleOptions::default()
        };

        assert!(matches!(
            assemble(&input, &options),
            Err(AssembleError::Compile(CompileError::SkippedEntries { .. }))
        ));
    }

    #[test]
    fn test_async_matches_sync() {
        let input = sheet(json!({
            ".card": { "padding": 8, "@media (min-width: 600px)": { "padding": 16 } }
        }));
        let options = AssembleOptions::default();

        let sync = assemble(&input, &options).unwrap();
        let async_css = smol::block_on(assemble_async(&input, &options)).unwrap();
        assert_eq!(sync, async_css);
        assert_eq!(sync, ".card{padding:8px}@media (min-width:600px){.card{padding:16px}}");
    }

    #[test]
    fn test_minifier_failure_is_reported() {
        let input = sheet(json!({ "p..x": { "color": "red" } }));
        let options = AssembleOptions::default().with_minifier(LightningMinifier);

        let result = smol::block_on(assemble_async(&input, &options));
        assert!(matches!(result, Err(AssembleError::Minify(MinifyError::Rejected { .. }))));
    }

    #[test]
    fn test_class_entry() {
        let style = class_entry("btn", &StyleObject::new().with("color", "red"));
        let keys: Vec<_> = style.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["className", "color"]);
    }
}
