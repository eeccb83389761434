//! fOS Style Build - writes the design-system stylesheets
//!
//! Usage: `fos-style-build <manifest.json>`

mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fos_style::{Bundle, Orchestrator, emit_theme};
use tracing_subscriber::EnvFilter;

use manifest::Manifest;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let manifest_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: fos-style-build <manifest.json>")?;

    let manifest = Manifest::load(&manifest_path)?;
    let inputs = manifest.load_inputs()?;
    let theme = manifest.theme.then(|| emit_theme(&inputs.tokens));

    let orchestrator = Orchestrator::new(manifest.assemble_options());
    let bundle = smol::block_on(orchestrator.build(inputs))?;

    let out_dir = manifest.out_dir();
    write_outputs(&out_dir, &bundle, theme.as_deref())?;

    tracing::info!(out_dir = %out_dir.display(), "stylesheets written");
    Ok(())
}

/// Write `{domain}.css`, `components/{name}.css`, `bundle.css` and, when
/// given, `theme.css` under `out_dir`.
fn write_outputs(out_dir: &Path, bundle: &Bundle, theme: Option<&str>) -> Result<()> {
    for (domain, css) in bundle.domains() {
        write_file(&out_dir.join(format!("{domain}.css")), css)?;
    }
    for (name, css) in bundle.components() {
        write_file(&out_dir.join("components").join(format!("{name}.css")), css)?;
    }
    if let Some(theme) = theme {
        write_file(&out_dir.join("theme.css"), theme)?;
    }
    write_file(&out_dir.join("bundle.css"), bundle.full())
}

fn write_file(path: &Path, css: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, css).with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = css.len(), "wrote stylesheet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_style::{BundleInputs, StyleObject, StyleSheet, TokenGroup};

    fn read(path: PathBuf) -> String {
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
    }

    #[test]
    fn test_write_outputs_layout() {
        let out_dir = std::env::temp_dir().join(format!("fos-style-build-out-{}", std::process::id()));
        let inputs = BundleInputs {
            tokens: vec![TokenGroup::new("space-", StyleObject::new().with("sm", "4px"))],
            base: StyleSheet::new().with("body", StyleObject::new().with("margin", 0)),
            components: vec![(
                "fos-card".to_string(),
                StyleSheet::new().with(":host", StyleObject::new().with("display", "block")),
            )],
            ..BundleInputs::default()
        };
        let theme = emit_theme(&inputs.tokens);
        let bundle = Orchestrator::default().build_blocking(inputs).unwrap();

        write_outputs(&out_dir, &bundle, Some(theme.as_str())).unwrap();

        assert_eq!(read(out_dir.join("tokens.css")), ":root{--space-sm:4px}");
        assert_eq!(read(out_dir.join("base.css")), "body{margin:0}");
        assert_eq!(read(out_dir.join("layout.css")), "");
        assert_eq!(read(out_dir.join("components").join("fos-card.css")), ":host{display:block}");
        assert_eq!(read(out_dir.join("bundle.css")), ":root{--space-sm:4px}body{margin:0}");
        assert_eq!(read(out_dir.join("theme.css")), "@theme {\n  --space-sm: 4px;\n}");

        fs::remove_dir_all(out_dir).unwrap();
    }

    #[test]
    fn test_theme_is_optional() {
        let out_dir = std::env::temp_dir().join(format!("fos-style-build-no-theme-{}", std::process::id()));
        let bundle = Orchestrator::default().build_blocking(BundleInputs::default()).unwrap();

        write_outputs(&out_dir, &bundle, None).unwrap();

        assert!(out_dir.join("bundle.css").exists());
        assert!(!out_dir.join("theme.css").exists());
        assert!(!out_dir.join("components").exists());

        fs::remove_dir_all(out_dir).unwrap();
    }
}
