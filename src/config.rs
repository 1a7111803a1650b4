//! Import configuration.
//!
//! One [`Config`] value is read at startup and passed to the coordinator.
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! strict_mode = false
//! threads = 4
//!
//! [providers.springer]
//! priority = 2
//! agency_code = "DE-He213"
//! may_delete = false
//! ```

use crate::error::{IngestError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Settings of one record provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Lower values win when two providers claim one record downstream.
    pub priority: u32,
    /// Agency code found in field `003`.
    pub agency_code: String,
    /// Whether delete imports are honoured.
    #[serde(default)]
    pub may_delete: bool,
}

impl ProviderConfig {
    /// Provider settings.
    #[must_use]
    pub fn new(priority: u32, agency_code: &str, may_delete: bool) -> Self {
        ProviderConfig {
            priority,
            agency_code: agency_code.to_string(),
            may_delete,
        }
    }
}

/// Importer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Providers by name.
    pub providers: IndexMap<String, ProviderConfig>,
    /// Extensions accepted by [`Config::allowed_file`], dot included.
    pub allowed_file_extensions: Vec<String>,
    /// DOI resolver URL template containing `{doi}`.
    pub doi_resolver_prefix: String,
    /// Prefix of proxied links, stripped from proxy electronic items.
    pub proxy_prefix: String,
    /// Escalate every field-level error.
    pub strict_mode: bool,
    /// Language of documents that declare none.
    pub default_language: String,
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        let providers = [
            ("cds", ProviderConfig::new(1, "SzGeCERN", false)),
            ("springer", ProviderConfig::new(2, "DE-He213", true)),
            ("ebl", ProviderConfig::new(3, "MiAaPQ", true)),
            ("safari", ProviderConfig::new(4, "CaSebORM", true)),
            ("snv", ProviderConfig::new(3, "SNV", false)),
        ]
        .into_iter()
        .map(|(name, provider)| (name.to_string(), provider))
        .collect();
        Config {
            providers,
            allowed_file_extensions: vec![".xml".to_string()],
            doi_resolver_prefix: "http://dx.doi.org/{doi}".to_string(),
            proxy_prefix: "https://ezproxy.cern.ch/login?url=".to_string(),
            strict_mode: true,
            default_language: "ENG".to_string(),
            threads: 0,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// `Configuration` on a syntax error or a failed [`Config::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(source).map_err(|e| IngestError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    ///
    /// # Errors
    ///
    /// `Configuration` when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            IngestError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Config::from_toml_str(&source)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// `Configuration` for an empty provider table, duplicate agency codes,
    /// an empty prefix or a resolver template without `{doi}`.
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(IngestError::Configuration("no providers configured".into()));
        }
        let mut seen = HashSet::new();
        for (name, provider) in &self.providers {
            if !seen.insert(provider.agency_code.as_str()) {
                return Err(IngestError::Configuration(format!(
                    "agency code {} of provider {name} is used twice",
                    provider.agency_code
                )));
            }
        }
        if self.proxy_prefix.trim().is_empty() {
            return Err(IngestError::Configuration("proxy_prefix is empty".into()));
        }
        if !self.doi_resolver_prefix.contains("{doi}") {
            return Err(IngestError::Configuration(
                "doi_resolver_prefix must contain {doi}".into(),
            ));
        }
        Ok(())
    }

    /// Provider settings by name.
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Provider name and settings for an agency code.
    #[must_use]
    pub fn provider_for_agency(&self, agency_code: &str) -> Option<(&str, &ProviderConfig)> {
        self.providers
            .iter()
            .find(|(_, p)| p.agency_code == agency_code)
            .map(|(name, p)| (name.as_str(), p))
    }

    /// Whether `path` has an allowed extension (case-insensitive).
    #[must_use]
    pub fn allowed_file(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let extension = format!(".{}", extension.to_lowercase());
        self.allowed_file_extensions
            .iter()
            .any(|allowed| allowed.to_lowercase() == extension)
    }

    /// Set the strict flag.
    #[must_use]
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Add or replace a provider.
    #[must_use]
    pub fn with_provider(mut self, name: &str, provider: ProviderConfig) -> Self {
        self.providers.insert(name.to_string(), provider);
        self
    }

    /// Set the DOI resolver template.
    #[must_use]
    pub fn with_doi_resolver_prefix(mut self, prefix: &str) -> Self {
        self.doi_resolver_prefix = prefix.to_string();
        self
    }

    /// Set the proxy prefix.
    #[must_use]
    pub fn with_proxy_prefix(mut self, prefix: &str) -> Self {
        self.proxy_prefix = prefix.to_string();
        self
    }

    /// Set the fallback language.
    #[must_use]
    pub fn with_default_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }

    /// Replace the extension allowlist.
    #[must_use]
    pub fn with_allowed_file_extensions(mut self, extensions: &[&str]) -> Self {
        self.allowed_file_extensions = extensions.iter().map(|e| (*e).to_string()).collect();
        self
    }
}
