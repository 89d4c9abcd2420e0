//! # Configuration Management
//!
//! Loads [`AppConfig`] from an optional file (TOML, YAML or JSON, chosen by
//! extension) overlaid with `QUERYGATE_` environment variables, using `__` to
//! separate nested keys (`QUERYGATE_DATABASE__URL`). The result is validated
//! before it is returned.

pub mod settings;

pub use settings::{AppConfig, DatabaseConfig, InclusionConfig, ObservabilityConfig};

use crate::errors::{QueryGateError, Result};
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "QUERYGATE";

impl AppConfig {
    /// Load configuration from `path` (if given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            file = ?path,
            inclusion_policy = ?config.inclusion.as_ref().map(policy_name),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).map_err(|e| {
            QueryGateError::config_with_source("Invalid TOML configuration", Box::new(e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document without consulting the environment
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents).map_err(|e| {
            QueryGateError::config_with_source("Invalid YAML configuration", Box::new(e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn policy_name(inclusion: &InclusionConfig) -> &'static str {
    match inclusion {
        InclusionConfig::ByName { .. } => "by_name",
        InclusionConfig::ByType { .. } => "by_type",
    }
}
