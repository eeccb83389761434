//! Compiler Entry Points
//!
//! `compile_class_rule` derives the selector from a `className` field;
//! `compile_selector_rule` takes any selector (`:root`, `h1, h2, h3`, ...).

use crate::CompileError;
use crate::selector::class_selector;
use crate::style::StyleObject;
use crate::walker::{SkippedEntry, Walker};

/// Compiler configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Fail instead of silently skipping malformed entries
    pub strict: bool,
}

/// Result of one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    pub css: String,
    /// Entries that contributed no output
    pub skipped: Vec<SkippedEntry>,
}

impl Compilation {
    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
    }
}

/// Style-object compiler.
///
/// Lenient by default: invalid input produces empty output and skipped
/// entries are only reported through [`Compilation::skipped`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compiler that rejects malformed input
    pub fn strict() -> Self {
        Self::new(CompilerOptions { strict: true })
    }

    pub fn options(&self) -> CompilerOptions {
        self.options
    }

    /// Compile a style object whose selector comes from its `className`
    pub fn compile_class_rule(&self, style: &StyleObject) -> Result<Compilation, CompileError> {
        let Some(selector) = style.class_name().and_then(class_selector) else {
            tracing::debug!("style object has no usable className");
            return self.reject(CompileError::MissingClassName);
        };
        self.emit(style, &selector)
    }

    /// Compile a style object under an explicit selector
    pub fn compile_selector_rule(&self, style: &StyleObject, selector: &str) -> Result<Compilation, CompileError> {
        let selector = selector.trim();
        if selector.is_empty() {
            return self.reject(CompileError::EmptySelector);
        }
        self.emit(style, selector)
    }

    /// Walk `style` under `selector`
    pub fn emit(&self, style: &StyleObject, selector: &str) -> Result<Compilation, CompileError> {
        let mut walker = Walker::new();
        walker.walk(style, selector, None);
        let (css, skipped) = walker.finish();

        if self.options.strict && !skipped.is_empty() {
            return Err(CompileError::SkippedEntries { entries: skipped });
        }
        Ok(Compilation { css, skipped })
    }

    fn reject(&self, error: CompileError) -> Result<Compilation, CompileError> {
        if self.options.strict {
            Err(error)
        } else {
            Ok(Compilation::default())
        }
    }
}

/// Compile with the lenient compiler; `""` when there is no usable `className`.
pub fn compile_class_rule(style: &StyleObject) -> String {
    Compiler::default()
        .compile_class_rule(style)
        .map(|compilation| compilation.css)
        .unwrap_or_default()
}

/// Compile with the lenient compiler; `""` for a blank selector.
pub fn compile_selector_rule(style: &StyleObject, selector: &str) -> String {
    Compiler::default()
        .compile_selector_rule(style, selector)
        .map(|compilation| compilation.css)
        .unwrap_or_default()
}
