//! fOS Style Compiler
//!
//! Compiles nested style objects into CSS for the fOS design system.
//! Handles selector nesting (`&`, pseudo shorthand, descendants), media /
//! container / supports rules with AND-merging, design-token flattening,
//! minification and last-wins deduplication.
//!
//! # Example
//! ```rust
//! use fos_style::{StyleObject, compile_class_rule};
//!
//! let button = StyleObject::new()
//!     .with("className", "btn")
//!     .with("color", "red")
//!     .with("&:hover", StyleObject::new().with("color", "blue"));
//!
//! assert_eq!(
//!     compile_class_rule(&button),
//!     ".btn {\n  color: red;\n}\n\n.btn:hover {\n  color: blue;\n}"
//! );
//! ```

pub mod style;
pub mod value;
pub mod declarations;
pub mod selector;
pub mod query;
pub mod walker;
pub mod compile;
pub mod tokens;
pub mod minify;
pub mod dedup;
pub mod assemble;
pub mod bundle;
pub mod theme;

pub use style::{StyleObject, StyleSheet, StyleValue, CLASS_NAME_KEY, SELF_KEY};
pub use value::{format_value, to_kebab_case};
pub use declarations::{Declaration, collect_declarations, render_declarations};
pub use selector::{class_selector, compose_child};
pub use query::{Query, RuleKind, merge_conditions, normalize};
pub use walker::{SkipReason, SkippedEntry, emit};
pub use compile::{Compilation, Compiler, CompilerOptions, compile_class_rule, compile_selector_rule};
pub use tokens::{CustomProperties, FlattenOptions, TokenGroup, flatten, flatten_groups};
pub use minify::{LightningMinifier, Minifier, WhitespaceMinifier, collapse_whitespace};
pub use dedup::dedupe;
pub use assemble::{AssembleOptions, assemble, assemble_async, compile_sheet};
pub use bundle::{Bundle, BundleInputs, Domain, Orchestrator};
pub use theme::emit_theme;

/// Style compilation error (strict mode only)
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("style object has no usable className")]
    MissingClassName,

    #[error("selector is empty")]
    EmptySelector,

    #[error("{} malformed style entries skipped", .entries.len())]
    SkippedEntries { entries: Vec<SkippedEntry> },
}

/// Minifier error
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    #[error("minifier rejected stylesheet: {message}")]
    Rejected { message: String },

    #[error("minifier could not print stylesheet: {message}")]
    Print { message: String },
}

/// Stylesheet assembly error
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Minify(#[from] MinifyError),
}

/// Failure while building one domain of a bundle
#[derive(Debug, thiserror::Error)]
#[error("failed to build `{domain}` styles: {source}")]
pub struct BundleError {
    pub domain: String,
    #[source]
    pub source: AssembleError,
}
