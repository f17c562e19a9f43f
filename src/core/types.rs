//! core::types
//!
//! Strong types for action names and namespaces.
//!
//! # Types
//!
//! - [`ActionName`] - Validated action or alias name
//!
//! # Namespaces
//!
//! Names are split into segments by [`NAMESPACE_DELIMITER`]. Everything up to
//! and including the last delimiter is the name's namespace: `git:status:here`
//! lives in `git:status:`, which itself lives in `git:`.
//!
//! # Examples
//!
//! ```
//! use actionwork::core::types::{ActionName, namespace_of};
//!
//! let name = ActionName::new("git:status").unwrap();
//! assert_eq!(name.as_str(), "git:status");
//! assert_eq!(namespace_of("git:status"), Some("git:"));
//!
//! assert!(ActionName::new("").is_err());
//! assert!(ActionName::new("git::status").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between namespace segments.
pub const NAMESPACE_DELIMITER: char = ':';

/// Errors from name validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid action name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid namespace prefix '{prefix}': {reason}")]
    InvalidPrefix {
        prefix: String,
        reason: &'static str,
    },
}

/// A validated action name.
///
/// Names must:
/// - Be non-empty
/// - Contain no whitespace or control characters
/// - Not start or end with the delimiter
/// - Not contain an empty segment (`a::b`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionName(String);

impl ActionName {
    /// Create a new validated action name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidName` if the name is malformed.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace this name lives in, including the trailing delimiter.
    pub fn namespace(&self) -> Option<&str> {
        namespace_of(&self.0)
    }

    /// Whether the name carries a namespace.
    pub fn is_namespaced(&self) -> bool {
        self.0.contains(NAMESPACE_DELIMITER)
    }
}

impl TryFrom<String> for ActionName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActionName> for String {
    fn from(name: ActionName) -> Self {
        name.0
    }
}

impl AsRef<str> for ActionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check a raw name without constructing an [`ActionName`].
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason| TypeError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid("name cannot contain whitespace"));
    }
    if name.starts_with(NAMESPACE_DELIMITER) {
        return Err(invalid("name cannot start with the namespace delimiter"));
    }
    if name.ends_with(NAMESPACE_DELIMITER) {
        return Err(invalid("name cannot end with the namespace delimiter"));
    }
    if name.split(NAMESPACE_DELIMITER).any(str::is_empty) {
        return Err(invalid("name cannot contain an empty namespace segment"));
    }

    Ok(())
}

/// Check a namespace prefix such as `git:` or `git:status:`.
///
/// A prefix is a valid name followed by exactly one delimiter.
pub fn validate_prefix(prefix: &str) -> Result<(), TypeError> {
    match prefix.strip_suffix(NAMESPACE_DELIMITER) {
        Some(stem) => validate_name(stem).map_err(|_| TypeError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "prefix segments must form a valid name",
        }),
        None => Err(TypeError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "prefix must end with the namespace delimiter",
        }),
    }
}

/// The namespace of `name`, including the trailing delimiter.
///
/// Returns `None` for names without a delimiter.
pub fn namespace_of(name: &str) -> Option<&str> {
    name.rfind(NAMESPACE_DELIMITER).map(|i| &name[..=i])
}

/// Every leading namespace of `name`, outermost first.
///
/// `a:b:c` yields `a:` and `a:b:`.
pub fn prefixes_of(name: &str) -> Vec<&str> {
    name.char_indices()
        .filter(|&(_, c)| c == NAMESPACE_DELIMITER)
        .map(|(i, _)| &name[..=i])
        .collect()
}

/// Number of segments in a prefix (`git:` is 1, `git:status:` is 2).
pub fn segment_count(prefix: &str) -> usize {
    prefix.matches(NAMESPACE_DELIMITER).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod action_name {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(ActionName::new("build").is_ok());
            assert!(ActionName::new("git:status").is_ok());
            assert!(ActionName::new("git:status:here").is_ok());
            assert!(ActionName::new("db-migrate_v2").is_ok());
        }

        #[test]
        fn rejects_empty() {
            assert!(matches!(
                ActionName::new(""),
                Err(TypeError::InvalidName { .. })
            ));
        }

        #[test]
        fn rejects_whitespace() {
            assert!(ActionName::new("has space").is_err());
            assert!(ActionName::new("tab\there").is_err());
        }

        #[test]
        fn rejects_bad_delimiters() {
            assert!(ActionName::new(":build").is_err());
            assert!(ActionName::new("build:").is_err());
            assert!(ActionName::new("git::status").is_err());
        }

        #[test]
        fn namespace_accessors() {
            let name = ActionName::new("git:status").unwrap();
            assert_eq!(name.namespace(), Some("git:"));
            assert!(name.is_namespaced());

            let plain = ActionName::new("build").unwrap();
            assert_eq!(plain.namespace(), None);
            assert!(!plain.is_namespaced());
        }

        #[test]
        fn serde_validates() {
            let ok: Result<ActionName, _> = serde_json::from_str("\"a:b\"");
            assert!(ok.is_ok());
            let bad: Result<ActionName, _> = serde_json::from_str("\"a::b\"");
            assert!(bad.is_err());
        }
    }

    mod prefixes {
        use super::*;

        #[test]
        fn validate_prefix_shapes() {
            assert!(validate_prefix("git:").is_ok());
            assert!(validate_prefix("git:status:").is_ok());
            assert!(validate_prefix("git").is_err());
            assert!(validate_prefix(":").is_err());
            assert!(validate_prefix("git::").is_err());
        }

        #[test]
        fn leading_prefixes() {
            assert_eq!(prefixes_of("a:b:c"), vec!["a:", "a:b:"]);
            assert!(prefixes_of("plain").is_empty());
        }

        #[test]
        fn namespace_of_innermost() {
            assert_eq!(namespace_of("a:b:c"), Some("a:b:"));
            assert_eq!(namespace_of("c"), None);
        }

        #[test]
        fn segment_counts() {
            assert_eq!(segment_count("git:"), 1);
            assert_eq!(segment_count("git:status:"), 2);
        }
    }
}
