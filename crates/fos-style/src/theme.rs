//! Theme variables for the utility-CSS build target.

use crate::declarations::{collect_declarations, render_lines};
use crate::tokens::{TokenGroup, flatten_groups};

/// Render token groups as an `@theme` block. Empty input yields `""`.
pub fn emit_theme(groups: &[TokenGroup]) -> String {
    let properties = flatten_groups(groups);
    let declarations = collect_declarations(&properties.into_style_object());
    if declarations.is_empty() {
        return String::new();
    }
    format!("@theme {{\n{}\n}}", render_lines(&declarations, "  "))
}
