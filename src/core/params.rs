//! core::params
//!
//! Declared parameter shapes and argument validation.
//!
//! # Overview
//!
//! Every action declares how many positional arguments it accepts and which
//! keyword arguments it understands. The shape is supplied explicitly at
//! registration time; the engine checks each invocation against it before
//! running the body.
//!
//! # Validation Order
//!
//! Only the first failing check is reported:
//! 1. Too few positional arguments
//! 2. Too many positional arguments
//! 3. Unknown keyword arguments (in key order)

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::record::Keywords;

/// An argument mismatch between an invocation and a [`ParameterShape`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ArgumentError {
    /// Human-readable description of the mismatch.
    pub message: String,
}

impl ArgumentError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The positional and keyword parameters an action accepts.
///
/// # Example
///
/// ```
/// use actionwork::core::params::ParameterShape;
///
/// let shape = ParameterShape::new().min(1).max(2).keyword("force");
/// assert!(shape.validate(&["a".to_string()], &Default::default()).is_ok());
/// assert!(shape.validate(&[], &Default::default()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterShape {
    min_positional: usize,
    /// `None` means unbounded.
    max_positional: Option<usize>,
    keyword_names: BTreeSet<String>,
    keyword_catch_all: bool,
}

impl ParameterShape {
    /// A shape accepting no arguments at all.
    pub fn new() -> Self {
        Self {
            min_positional: 0,
            max_positional: Some(0),
            keyword_names: BTreeSet::new(),
            keyword_catch_all: false,
        }
    }

    /// A shape requiring exactly `n` positional arguments.
    pub fn exact(n: usize) -> Self {
        Self::new().min(n).max(n)
    }

    /// A shape accepting `min` or more positional arguments.
    pub fn variadic(min: usize) -> Self {
        Self::new().min(min).unbounded()
    }

    /// Set the minimum positional count, raising the maximum if needed.
    pub fn min(mut self, min: usize) -> Self {
        self.min_positional = min;
        if let Some(max) = self.max_positional {
            self.max_positional = Some(max.max(min));
        }
        self
    }

    /// Set the maximum positional count.
    pub fn max(mut self, max: usize) -> Self {
        self.max_positional = Some(max);
        self
    }

    /// Accept any number of positional arguments beyond the minimum.
    pub fn unbounded(mut self) -> Self {
        self.max_positional = None;
        self
    }

    /// Declare a keyword argument.
    pub fn keyword(mut self, name: impl Into<String>) -> Self {
        self.keyword_names.insert(name.into());
        self
    }

    /// Declare several keyword arguments.
    pub fn keywords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyword_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Accept keyword arguments of any name.
    pub fn keyword_catch_all(mut self) -> Self {
        self.keyword_catch_all = true;
        self
    }

    pub fn min_positional(&self) -> usize {
        self.min_positional
    }

    pub fn max_positional(&self) -> Option<usize> {
        self.max_positional
    }

    pub fn keyword_names(&self) -> &BTreeSet<String> {
        &self.keyword_names
    }

    pub fn has_keyword_catch_all(&self) -> bool {
        self.keyword_catch_all
    }

    /// Whether a keyword of this name would pass validation.
    pub fn accepts_keyword(&self, name: &str) -> bool {
        self.keyword_catch_all || self.keyword_names.contains(name)
    }

    /// Check an invocation's arguments against this shape.
    ///
    /// # Errors
    ///
    /// Returns the first mismatch found, in the order documented on the
    /// module.
    pub fn validate(&self, positional: &[String], keywords: &Keywords) -> Result<(), ArgumentError> {
        let count = positional.len();

        if count < self.min_positional {
            return Err(if count == 0 {
                ArgumentError::new("argument required")
            } else {
                ArgumentError::new(format!(
                    "too few arguments (at least {})",
                    self.min_positional
                ))
            });
        }

        if let Some(max) = self.max_positional {
            if count > max {
                return Err(if max == 0 {
                    ArgumentError::new("unexpected argument")
                } else {
                    ArgumentError::new(format!("too many arguments (at most {})", max))
                });
            }
        }

        if let Some(key) = keywords.keys().find(|key| !self.accepts_keyword(key)) {
            return Err(ArgumentError::new(format!(
                "{}: unknown keyword argument",
                key
            )));
        }

        Ok(())
    }
}

impl Default for ParameterShape {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParameterShape {
    /// Compact usage form, e.g. `<1..2> [force, verbose]` or `<0..> [**]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_positional {
            Some(max) if max == self.min_positional => write!(f, "<{}>", max)?,
            Some(max) => write!(f, "<{}..{}>", self.min_positional, max)?,
            None => write!(f, "<{}..>", self.min_positional)?,
        }

        if !self.keyword_names.is_empty() || self.keyword_catch_all {
            let mut names: Vec<&str> = self.keyword_names.iter().map(String::as_str).collect();
            if self.keyword_catch_all {
                names.push("**");
            }
            write!(f, " [{}]", names.join(", "))?;
        }

        Ok(())
    }
}
