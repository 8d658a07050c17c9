//! Migration configuration from `ferry.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                            |
//! |----------------|----------------------------------------------------|
//! | `[source]`     | Content root, file extensions                      |
//! | `[target]`     | Store URL, API key, collections, paging, timeout   |
//! | `[run]`        | Concurrency, report path, verification settings    |
//! | `[components]` | Component name -> rule table, required categories  |

mod error;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::component::{ComponentRule, ComponentTable};

/// Root configuration structure representing ferry.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateConfig {
    pub source: SourceConfig,
    pub target: TargetConfig,
    pub run: RunConfig,
    pub components: ComponentsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Content root directory (relative to the config file).
    pub root: PathBuf,
    /// Content file extensions to migrate.
    pub extensions: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content"),
            extensions: vec!["mdx".to_string(), "md".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Base URL of the Payload instance.
    pub base_url: String,
    /// API key; falls back to the FERRY_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Collection migrated documents are upserted into.
    pub collection: String,
    /// Collection holding reusable registry entries (phone numbers etc.).
    pub registry_collection: String,
    /// Store page size cap.
    pub page_limit: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Local directory hero-image paths resolve against for upload.
    /// When unset, image references are stored as-is.
    pub media_dir: Option<PathBuf>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_key: None,
            collection: "pages".to_string(),
            registry_collection: "registry".to_string(),
            page_limit: 100,
            timeout_secs: 30,
            media_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Files processed concurrently per chunk.
    pub concurrency: usize,
    /// Run report output path.
    pub report: PathBuf,
    /// Expected total record count after migration (0 = skip the check).
    pub expected_count: usize,
    /// Sample size for the deep-field verification pass.
    pub verify_sample: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            report: PathBuf::from("ferry-report.json"),
            expected_count: 0,
            verify_sample: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentsConfig {
    /// Component name -> rule mapping.
    pub map: std::collections::BTreeMap<String, ComponentRule>,
    /// Categories whose resolution failure fails the whole document
    /// (mirrors required fields in the target schema).
    pub required: Vec<String>,
}

impl MigrateConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// Relative source/report paths resolve against the config file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: Self = toml::from_str(&raw)?;

        if let Some(root) = path.parent() {
            if config.source.root.is_relative() {
                config.source.root = root.join(&config.source.root);
            }
            if config.run.report.is_relative() {
                config.run.report = root.join(&config.run.report);
            }
            if let Some(media) = &config.target.media_dir
                && media.is_relative()
            {
                config.target.media_dir = Some(root.join(media));
            }
        }

        if config.target.api_key.is_none() {
            config.target.api_key = std::env::var("FERRY_API_KEY").ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate field values, collecting all problems before failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diagnostics = ConfigDiagnostics::new();

        if self.source.extensions.is_empty() {
            diagnostics.push(
                ConfigDiagnostic::new("source.extensions", "no content extensions configured")
                    .with_hint("use e.g. extensions = [\"mdx\", \"md\"]"),
            );
        }
        if self.target.base_url.is_empty() {
            diagnostics.push(ConfigDiagnostic::new(
                "target.base_url",
                "base_url must not be empty",
            ));
        }
        if self.target.page_limit == 0 {
            diagnostics.push(ConfigDiagnostic::new(
                "target.page_limit",
                "page_limit must be at least 1",
            ));
        }
        if self.run.concurrency == 0 {
            diagnostics.push(
                ConfigDiagnostic::new("run.concurrency", "concurrency must be at least 1")
                    .with_hint("use concurrency = 1 for strictly sequential processing"),
            );
        }
        for category in &self.components.required {
            let known = self.components.map.values().any(|rule| match rule {
                ComponentRule::Registry { category: c, .. } => c == category,
                ComponentRule::Direct { block } => block == category,
            });
            if !known {
                diagnostics.push(ConfigDiagnostic::new(
                    "components.required",
                    format!("required category `{category}` matches no component rule"),
                ));
            }
        }

        diagnostics.into_result()
    }

    /// Build the resolver's component table from the config map.
    pub fn component_table(&self) -> ComponentTable {
        ComponentTable::from_entries(
            self.components
                .map
                .iter()
                .map(|(name, rule)| (name.clone(), rule.clone())),
        )
    }
}
