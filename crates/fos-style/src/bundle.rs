//! Bundle Orchestration
//!
//! Builds every design-system domain into its own CSS string and joins the
//! global domains into one full bundle. Domains are independent and are
//! assembled concurrently; only the concatenation order is fixed.

use std::fmt;

use smol::Task;

use crate::assemble::{AssembleOptions, assemble_async};
use crate::dedup::dedupe;
use crate::style::StyleSheet;
use crate::tokens::{TokenGroup, flatten_groups};
use crate::{AssembleError, BundleError};

/// Selector the token custom properties are declared on
pub const TOKENS_SELECTOR: &str = ":root";

/// Global stylesheet domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Tokens,
    Base,
    Typography,
    Layout,
    Elements,
    Animation,
    Accessibility,
}

impl Domain {
    /// Concatenation order of the full bundle
    pub const BUNDLE_ORDER: [Domain; 7] = [
        Domain::Tokens,
        Domain::Base,
        Domain::Typography,
        Domain::Layout,
        Domain::Elements,
        Domain::Animation,
        Domain::Accessibility,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Domain::Tokens => "tokens",
            Domain::Base => "base",
            Domain::Typography => "typography",
            Domain::Layout => "layout",
            Domain::Elements => "elements",
            Domain::Animation => "animation",
            Domain::Accessibility => "accessibility",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the orchestrator compiles, passed in explicitly
#[derive(Debug, Clone, Default)]
pub struct BundleInputs {
    pub tokens: Vec<TokenGroup>,
    /// Reset and root styles
    pub base: StyleSheet,
    pub typography: StyleSheet,
    pub layout: StyleSheet,
    pub elements: StyleSheet,
    pub animation: StyleSheet,
    pub accessibility: StyleSheet,
    /// Web-component scoped sheets, by component name. Not part of the full bundle.
    pub components: Vec<(String, StyleSheet)>,
}

impl BundleInputs {
    /// The token groups as a `:root` stylesheet
    pub fn token_sheet(&self) -> StyleSheet {
        let properties = flatten_groups(&self.tokens);
        if properties.is_empty() {
            return StyleSheet::new();
        }
        StyleSheet::new().with(TOKENS_SELECTOR, properties.into_style_object())
    }

    fn into_domains(self) -> (Vec<(Domain, StyleSheet)>, Vec<(String, StyleSheet)>) {
        let tokens = self.token_sheet();
        let domains = vec![
            (Domain::Tokens, tokens),
            (Domain::Base, self.base),
            (Domain::Typography, self.typography),
            (Domain::Layout, self.layout),
            (Domain::Elements, self.elements),
            (Domain::Animation, self.animation),
            (Domain::Accessibility, self.accessibility),
        ];
        (domains, self.components)
    }
}

/// Compiled output of every domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    domains: Vec<(Domain, String)>,
    components: Vec<(String, String)>,
    full: String,
}

impl Bundle {
    /// CSS of one domain (`""` if it produced nothing)
    pub fn domain(&self, domain: Domain) -> &str {
        self.domains
            .iter()
            .find(|(existing, _)| *existing == domain)
            .map(|(_, css)| css.as_str())
            .unwrap_or_default()
    }

    pub fn domains(&self) -> impl Iterator<Item = (Domain, &str)> {
        self.domains.iter().map(|(domain, css)| (*domain, css.as_str()))
    }

    pub fn component(&self, name: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, css)| css.as_str())
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, &str)> {
        self.components.iter().map(|(name, css)| (name.as_str(), css.as_str()))
    }

    /// All global domains concatenated in [`Domain::BUNDLE_ORDER`]
    pub fn full(&self) -> &str {
        &self.full
    }
}

/// Builds [`Bundle`]s
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    options: AssembleOptions,
}

impl Orchestrator {
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Assemble every domain concurrently.
    ///
    /// Fails with the name of the first domain (in bundle order, then
    /// components) whose minification failed.
    pub async fn build(&self, inputs: BundleInputs) -> Result<Bundle, BundleError> {
        let (domains, components) = inputs.into_domains();

        let domain_tasks: Vec<_> = domains
            .into_iter()
            .map(|(domain, sheet)| (domain, self.spawn(sheet)))
            .collect();
        let component_tasks: Vec<_> = components
            .into_iter()
            .map(|(name, sheet)| (name, self.spawn(sheet)))
            .collect();

        let mut bundle = Bundle::default();
        for (domain, task) in domain_tasks {
            let css = task.await.map_err(|source| BundleError {
                domain: domain.name().to_string(),
                source,
            })?;
            tracing::debug!(%domain, bytes = css.len(), "built domain");
            bundle.domains.push((domain, css));
        }
        for (name, task) in component_tasks {
            let css = task.await.map_err(|source| BundleError {
                domain: format!("components/{name}"),
                source,
            })?;
            tracing::debug!(component = %name, bytes = css.len(), "built component styles");
            bundle.components.push((name, css));
        }

        bundle.full = self.concatenate(&bundle);
        tracing::info!(
            domains = bundle.domains.len(),
            components = bundle.components.len(),
            bytes = bundle.full.len(),
            "style bundle ready"
        );
        Ok(bundle)
    }

    /// Blocking wrapper around [`Orchestrator::build`]
    pub fn build_blocking(&self, inputs: BundleInputs) -> Result<Bundle, BundleError> {
        smol::block_on(self.build(inputs))
    }

    fn spawn(&self, sheet: StyleSheet) -> Task<Result<String, AssembleError>> {
        let options = self.options.clone();
        smol::spawn(async move { assemble_async(&sheet, &options).await })
    }

    fn concatenate(&self, bundle: &Bundle) -> String {
        let parts: Vec<&str> = Domain::BUNDLE_ORDER
            .iter()
            .map(|domain| bundle.domain(*domain))
            .filter(|css| !css.is_empty())
            .collect();

        if self.options.prettify {
            parts.join("\n\n")
        } else {
            dedupe(&parts.concat())
        }
    }
}
