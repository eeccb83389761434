//! Build manifest
//!
//! A JSON file naming the output directory, minification settings and the
//! style/token source files of every domain. Source paths are relative to
//! the manifest's own directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use fos_style::{
    AssembleOptions, BundleInputs, CompilerOptions, FlattenOptions, LightningMinifier, Minifier,
    StyleObject, StyleSheet, TokenGroup, WhitespaceMinifier,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifierKind {
    #[default]
    Whitespace,
    Lightning,
}

impl MinifierKind {
    fn build(self) -> Arc<dyn Minifier> {
        match self {
            MinifierKind::Whitespace => Arc::new(WhitespaceMinifier),
            MinifierKind::Lightning => Arc::new(LightningMinifier),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSource {
    pub prefix: String,
    pub file: PathBuf,
    #[serde(default = "default_kebab_case")]
    pub kebab_case: bool,
}

fn default_kebab_case() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSource {
    pub name: String,
    pub file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default)]
    pub prettify: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub minifier: MinifierKind,
    /// Also write `theme.css` with the tokens as an `@theme` block
    #[serde(default)]
    pub theme: bool,
    #[serde(default)]
    pub tokens: Vec<TokenSource>,
    pub base: Option<PathBuf>,
    pub typography: Option<PathBuf>,
    pub layout: Option<PathBuf>,
    pub elements: Option<PathBuf>,
    pub animation: Option<PathBuf>,
    pub accessibility: Option<PathBuf>,
    #[serde(default)]
    pub components: Vec<ComponentSource>,

    #[serde(skip)]
    root: PathBuf,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let mut manifest: Manifest = serde_json::from_str(&text)
            .with_context(|| format!("parsing manifest {}", path.display()))?;
        manifest.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            prettify: self.prettify,
            compiler: CompilerOptions { strict: self.strict },
            minifier: self.minifier.build(),
        }
    }

    /// Output directory, resolved against the manifest directory
    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.out_dir)
    }

    pub fn token_groups(&self) -> Result<Vec<TokenGroup>> {
        self.tokens
            .iter()
            .map(|source| {
                let tree: StyleObject = self.read_json(&source.file)?;
                let options = FlattenOptions {
                    kebab_case: source.kebab_case,
                    ..FlattenOptions::default()
                };
                Ok(TokenGroup::new(source.prefix.clone(), tree).with_options(options))
            })
            .collect()
    }

    pub fn load_inputs(&self) -> Result<BundleInputs> {
        let components = self
            .components
            .iter()
            .map(|source| Ok((source.name.clone(), self.read_json(&source.file)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(BundleInputs {
            tokens: self.token_groups()?,
            base: self.read_sheet(self.base.as_deref())?,
            typography: self.read_sheet(self.typography.as_deref())?,
            layout: self.read_sheet(self.layout.as_deref())?,
            elements: self.read_sheet(self.elements.as_deref())?,
            animation: self.read_sheet(self.animation.as_deref())?,
            accessibility: self.read_sheet(self.accessibility.as_deref())?,
            components,
        })
    }

    fn read_sheet(&self, file: Option<&Path>) -> Result<StyleSheet> {
        match file {
            Some(file) => self.read_json(file),
            None => Ok(StyleSheet::new()),
        }
    }

    fn read_json<T: DeserializeOwned>(&self, file: &Path) -> Result<T> {
        let path = self.root.join(file);
        tracing::debug!(path = %path.display(), "reading style source");
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
