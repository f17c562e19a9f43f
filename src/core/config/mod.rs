//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! actionwork has two configuration scopes:
//! - **Global**: User-level mode defaults (trace, color, debug)
//! - **Project**: Abbreviations and namespace descriptions for the actions
//!   defined in a working directory
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$ACTIONWORK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/actionwork/config.toml`
//! 3. `~/.actionwork/config.toml`
//!
//! # Project Config Locations
//!
//! Searched in order:
//! 1. `actionwork.toml` (canonical)
//! 2. `.actionwork/config.toml` (compatibility, warns)
//!
//! # Example
//!
//! ```no_run
//! use actionwork::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! let config = result.config;
//! println!("Trace: {}", config.trace());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, ProjectConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::index::{DefinitionError, Index};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Project configuration (if one was found)
    pub project: Option<ProjectConfig>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads project config from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(Self::find_global().as_deref(), project_dir)
    }

    /// Load configuration from an explicit global file and project directory.
    pub fn load_from(
        global_file: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = match global_file {
            Some(path) if path.exists() => (read_toml::<GlobalConfig>(path)?, Some(path.to_path_buf())),
            _ => (GlobalConfig::default(), None),
        };

        let (project, project_path) = match project_dir {
            Some(dir) => Self::load_project(dir, &mut warnings)?,
            None => (None, None),
        };

        if let Some(ref p) = project {
            p.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
            warnings,
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $ACTIONWORK_CONFIG
        if let Ok(path) = std::env::var("ACTIONWORK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/actionwork/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("actionwork/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.actionwork/config.toml
        dirs::home_dir()
            .map(|home| home.join(".actionwork/config.toml"))
            .filter(|path| path.exists())
    }

    fn load_project(
        dir: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<ProjectConfig>, Option<PathBuf>), ConfigError> {
        // 1. Check actionwork.toml (canonical)
        let canonical = dir.join("actionwork.toml");
        if canonical.exists() {
            let config = read_toml(&canonical)?;
            return Ok((Some(config), Some(canonical)));
        }

        // 2. Check .actionwork/config.toml (compatibility)
        let compat = dir.join(".actionwork/config.toml");
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Using deprecated config location. Please move to '{}'",
                    canonical.display()
                ),
                path: compat.clone(),
            });
            let config = read_toml(&compat)?;
            return Ok((Some(config), Some(compat)));
        }

        Ok((None, None))
    }

    /// Register configured abbreviations and namespace descriptions.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] the index raises.
    pub fn apply_to(&self, index: &mut Index) -> Result<(), DefinitionError> {
        let Some(project) = &self.project else {
            return Ok(());
        };

        for (prefix, description) in &project.namespaces {
            index.add_prefix(prefix, Some(description.clone()))?;
        }
        for (short, long) in &project.abbreviations {
            index.add_abbreviation(short, long)?;
        }

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Check if tracing is enabled by default.
    ///
    /// Defaults to `false` if not configured.
    pub fn trace(&self) -> bool {
        self.global.trace.unwrap_or(false)
    }

    /// Configured color preference, if any.
    pub fn color(&self) -> Option<bool> {
        self.global.color
    }

    /// Check if debug logging is enabled by default.
    ///
    /// Defaults to `false` if not configured.
    pub fn debug(&self) -> bool {
        self.global.debug.unwrap_or(false)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(None, Some(temp.path())).unwrap();
        let config = result.config;

        assert!(!config.trace());
        assert!(!config.debug());
        assert_eq!(config.color(), None);
        assert!(config.project.is_none());
        assert!(config.global_config_loaded_from().is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "trace = true\ncolor = false\n").unwrap();

        let result = Config::load_from(Some(&path), None).unwrap();
        let config = result.config;

        assert!(config.trace());
        assert_eq!(config.color(), Some(false));
        assert_eq!(config.global_config_loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn missing_global_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");
        let result = Config::load_from(Some(&path), None).unwrap();
        assert!(!result.config.trace());
    }

    #[test]
    fn load_project_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("actionwork.toml"),
            r#"
            [abbreviations]
            "g:" = "git:"
            "#,
        )
        .unwrap();

        let result = Config::load_from(None, Some(temp.path())).unwrap();
        assert_eq!(
            result.config.project_config_loaded_from(),
            Some(temp.path().join("actionwork.toml").as_path())
        );
        let project = result.config.project.unwrap();
        assert_eq!(project.abbreviations["g:"], "git:");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn load_project_compat_warns() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".actionwork")).unwrap();
        fs::write(temp.path().join(".actionwork/config.toml"), "").unwrap();

        let result = Config::load_from(None, Some(temp.path())).unwrap();
        assert!(result.config.project.is_some());
        assert_eq!(
            result.config.project_config_loaded_from(),
            Some(temp.path().join(".actionwork/config.toml").as_path())
        );
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("deprecated"));
    }

    #[test]
    fn parse_error_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "trace = [").unwrap();

        let err = Config::load_from(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn invalid_project_values_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("actionwork.toml"),
            "[namespaces]\n\"db\" = \"no delimiter\"\n",
        )
        .unwrap();

        let err = Config::load_from(None, Some(temp.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn apply_registers_into_index() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("actionwork.toml"),
            r#"
            [abbreviations]
            "g:" = "git:"

            [namespaces]
            "db:" = "Database maintenance"
            "#,
        )
        .unwrap();

        let config = Config::load_from(None, Some(temp.path())).unwrap().config;
        let mut index = Index::new();
        config.apply_to(&mut index).unwrap();

        assert_eq!(index.abbreviation("g:"), Some("git:"));
        assert_eq!(index.prefix_description("db:"), Some("Database maintenance"));
        assert_eq!(index.expand("g:log"), "git:log");
    }
}
