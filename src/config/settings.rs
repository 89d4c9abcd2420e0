//! # Configuration Settings
//!
//! Defines the configuration structure for querygate.

use crate::domain::{AssemblyId, TypeId, TypeRegistry};
use crate::errors::{QueryGateError, Result};
use crate::serialization::{InclusionRules, NameInclusionFilter, TypeInclusionFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Serialization inclusion rules
    pub inclusion: Option<InclusionConfig>,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(QueryGateError::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.database.min_connections > self.database.max_connections {
            return Err(QueryGateError::config(
                "min_connections cannot be greater than max_connections",
            ));
        }

        if let Some(InclusionConfig::ByType {
            home_assembly: Some(home),
            ..
        }) = &self.inclusion
        {
            if home.trim().is_empty() {
                return Err(QueryGateError::config("home_assembly cannot be empty"));
            }
        }

        Ok(())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(
        min = 1,
        max = 100,
        message = "Max connections must be between 1 and 100"
    ))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(
        min = 0,
        max = 50,
        message = "Min connections must be between 0 and 50"
    ))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/querygate".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600, // 10 minutes
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Check if this is a PostgreSQL configuration
    pub fn is_postgresql(&self) -> bool {
        self.url.starts_with("postgresql://") || self.url.starts_with("postgres://")
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "querygate".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

/// Serialization inclusion rules, named by fully-qualified type names.
///
/// Exactly one policy is chosen per configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum InclusionConfig {
    /// Allow-lists of member names
    ByName {
        #[serde(default)]
        global: Vec<String>,
        #[serde(default)]
        per_type: BTreeMap<String, Vec<String>>,
    },
    /// Allow-list of member types scoped to a home assembly
    ByType {
        #[serde(default)]
        home_assembly: Option<String>,
        #[serde(default)]
        types: Vec<String>,
    },
}

impl InclusionConfig {
    /// Resolve type names against `registry` and build the rule set.
    /// Unknown type names fail here rather than at first use.
    pub fn build(&self, registry: &TypeRegistry) -> Result<InclusionRules> {
        match self {
            InclusionConfig::ByName { global, per_type } => {
                let mut filter = NameInclusionFilter::with_global_names(global.iter().cloned());
                for (type_name, names) in per_type {
                    let type_id = resolve_type(registry, type_name)?;
                    filter = filter.and_type_names(type_id, names.iter().cloned());
                }
                Ok(InclusionRules::ByName(filter))
            }
            InclusionConfig::ByType {
                home_assembly,
                types,
            } => {
                let types = types
                    .iter()
                    .map(|name| resolve_type(registry, name))
                    .collect::<Result<Vec<_>>>()?;

                let filter = match home_assembly {
                    Some(home) => TypeInclusionFilter::new(AssemblyId::new(home.as_str()), types)?,
                    None => TypeInclusionFilter::from_types(types),
                };
                Ok(InclusionRules::ByType(filter))
            }
        }
    }
}

fn resolve_type(registry: &TypeRegistry, name: &str) -> Result<TypeId> {
    registry.resolve_name(name).cloned().ok_or_else(|| {
        QueryGateError::config(format!("Inclusion rule names unregistered type '{}'", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Describe, EntityMembers, MemberInfo, TypeRef};
    use crate::serialization::InclusionPolicy;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register_members(
                EntityMembers::new(TypeId::new("shop", "Customer", AssemblyId::new("shop")))
                    .member::<i64>("id"),
            )
            .register_members(
                EntityMembers::new(TypeId::new("shop", "Order", AssemblyId::new("shop")))
                    .member::<i64>("id"),
            );
        registry
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let config = AppConfig {
            database: DatabaseConfig {
                max_connections: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(QueryGateError::Config { .. })));
    }

    #[test]
    fn test_empty_home_assembly_rejected() {
        let config = AppConfig {
            inclusion: Some(InclusionConfig::ByType {
                home_assembly: Some(" ".to_string()),
                types: vec![],
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_by_name_rules() {
        let config = InclusionConfig::ByName {
            global: vec!["id".to_string()],
            per_type: BTreeMap::from([("shop::Customer".to_string(), vec!["orders".to_string()])]),
        };
        let rules = config.build(&registry()).unwrap();

        let orders = MemberInfo::new(
            TypeId::new("shop", "Customer", AssemblyId::new("shop")),
            "orders",
            Vec::<i64>::type_ref(),
        );
        assert!(rules.is_included(&orders));
    }

    #[test]
    fn test_build_by_type_rules_infers_home() {
        let config = InclusionConfig::ByType {
            home_assembly: None,
            types: vec!["shop::Order".to_string()],
        };
        let InclusionRules::ByType(filter) = config.build(&registry()).unwrap() else {
            panic!("expected type rules");
        };

        assert_eq!(filter.home_assembly(), &AssemblyId::new("shop"));
        let customer = TypeRef::object(TypeId::new("shop", "Customer", AssemblyId::new("shop")));
        assert!(!filter.is_type_included(&customer));
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let config = InclusionConfig::ByType {
            home_assembly: Some("shop".to_string()),
            types: vec!["shop::Refund".to_string()],
        };
        assert!(matches!(config.build(&registry()), Err(QueryGateError::Config { .. })));
    }

    #[test]
    fn test_deserialize_tagged_policy() {
        let config: InclusionConfig =
            serde_json::from_str(r#"{"policy": "by_type", "types": ["shop::Order"]}"#).unwrap();
        assert_eq!(
            config,
            InclusionConfig::ByType {
                home_assembly: None,
                types: vec!["shop::Order".to_string()],
            }
        );
    }
}
