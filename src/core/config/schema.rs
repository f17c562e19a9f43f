//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$ACTIONWORK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/actionwork/config.toml`
//! 3. `~/.actionwork/config.toml`
//!
//! # Project Config
//!
//! Located at `actionwork.toml` in the working directory.
//!
//! # Validation
//!
//! Values are validated after parsing: abbreviation and namespace keys must
//! be well-formed namespace prefixes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::validate_prefix;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// trace = false
/// color = true
/// debug = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Trace every action by default
    pub trace: Option<bool>,

    /// Colorize diagnostics
    pub color: Option<bool>,

    /// Debug logging by default
    pub debug: Option<bool>,
}

/// Project configuration.
///
/// # Example
///
/// ```toml
/// [abbreviations]
/// "g:" = "git:"
///
/// [namespaces]
/// "db:" = "Database maintenance"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Short prefix -> long prefix
    pub abbreviations: BTreeMap<String, String>,

    /// Namespace prefix -> description
    pub namespaces: BTreeMap<String, String>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for malformed prefixes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (short, long) in &self.abbreviations {
            for prefix in [short, long] {
                validate_prefix(prefix).map_err(|e| {
                    ConfigError::InvalidValue(format!("abbreviation '{}': {}", short, e))
                })?;
            }
        }

        for prefix in self.namespaces.keys() {
            validate_prefix(prefix)
                .map_err(|e| ConfigError::InvalidValue(format!("namespace: {}", e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.trace.is_none());
            assert!(config.color.is_none());
            assert!(config.debug.is_none());
        }

        #[test]
        fn parse() {
            let config: GlobalConfig = toml::from_str("trace = true\ncolor = false\n").unwrap();
            assert_eq!(config.trace, Some(true));
            assert_eq!(config.color, Some(false));
        }

        #[test]
        fn unknown_fields_rejected() {
            let parsed: Result<GlobalConfig, _> = toml::from_str("colour = true\n");
            assert!(parsed.is_err());
        }
    }

    mod project_config {
        use super::*;

        #[test]
        fn parse_tables() {
            let config: ProjectConfig = toml::from_str(
                r#"
                [abbreviations]
                "g:" = "git:"

                [namespaces]
                "db:" = "Database maintenance"
                "#,
            )
            .unwrap();
            assert_eq!(config.abbreviations["g:"], "git:");
            assert_eq!(config.namespaces["db:"], "Database maintenance");
            assert!(config.validate().is_ok());
        }

        #[test]
        fn malformed_abbreviation() {
            let mut config = ProjectConfig::default();
            config.abbreviations.insert("g".into(), "git:".into());
            assert!(config.validate().is_err());
        }

        #[test]
        fn malformed_namespace() {
            let mut config = ProjectConfig::default();
            config.namespaces.insert("db".into(), "Database".into());
            assert!(config.validate().is_err());
        }
    }
}
