//! core::index
//!
//! The metadata index: every registered action and alias, the namespace
//! prefix table, and the abbreviation table.
//!
//! # Architecture
//!
//! The index is filled once at startup through the registration API
//! ([`Index::register_action`], [`Index::register_alias`]) and then only
//! read. Invoking an action never mutates it; per-invocation state lives in
//! the engine's [`Context`](crate::engine::Context).
//!
//! A process-wide instance can be installed with [`install_global`] and
//! retrieved with [`global`]. Tests replace or tear it down freely.
//!
//! # Invariants
//!
//! - A name identifies exactly one record, action or alias
//! - An alias target must already resolve to an action when the alias is
//!   registered, so alias chains are acyclic and resolution terminates
//! - Registering a namespaced action records every leading prefix
//!
//! # Example
//!
//! ```
//! use actionwork::core::index::Index;
//! use actionwork::core::options::OptionSchema;
//! use actionwork::core::params::ParameterShape;
//! use actionwork::core::record::ActionFlags;
//!
//! let mut index = Index::new();
//! index
//!     .register_action(
//!         "git:status",
//!         "Show status",
//!         ParameterShape::new(),
//!         OptionSchema::new(),
//!         ActionFlags::default(),
//!         |_, _| Ok(()),
//!     )
//!     .unwrap();
//! index.register_alias("st", "git:status", &[], ActionFlags::default()).unwrap();
//!
//! let (action, args) = index.resolve("st").unwrap();
//! assert_eq!(action.name.as_str(), "git:status");
//! assert!(args.is_empty());
//! assert!(index.prefix_exists("git:"));
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use super::options::OptionSchema;
use super::params::ParameterShape;
use super::record::{ActionFlags, ActionRecord, AliasRecord, Invocation, Record};
use super::types::{prefixes_of, segment_count, validate_prefix, ActionName, TypeError};
use crate::engine::ActionHandle;

/// Registration-time contract violations.
///
/// These are raised while the index is being built and abort startup; the
/// engine never produces or catches them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("'{0}' is already defined")]
    Duplicate(String),

    #[error("alias '{name}' targets '{target}', which is not defined")]
    MissingTarget { name: String, target: String },

    #[error(transparent)]
    InvalidName(TypeError),

    #[error(transparent)]
    InvalidPrefix(TypeError),

    #[error("'{0}' is not defined")]
    NotFound(String),

    #[error("'{name}' is not an {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("action '{name}': {message}")]
    InvalidOptions { name: String, message: String },

    #[error("action '{name}': option '--{option}' has no matching keyword parameter")]
    OptionWithoutKeyword { name: String, option: String },

    #[error("invalid abbreviation '{short}' -> '{long}': {reason}")]
    InvalidAbbreviation {
        short: String,
        long: String,
        reason: &'static str,
    },
}

impl From<TypeError> for DefinitionError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidName { .. } => DefinitionError::InvalidName(err),
            TypeError::InvalidPrefix { .. } => DefinitionError::InvalidPrefix(err),
        }
    }
}

/// Registry of actions, aliases, namespace prefixes and abbreviations.
#[derive(Debug, Default)]
pub struct Index {
    records: BTreeMap<String, Record>,
    prefixes: BTreeMap<String, Option<String>>,
    abbreviations: BTreeMap<String, String>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Registration API
    // =========================================================================

    /// Register an action.
    ///
    /// # Errors
    ///
    /// - [`DefinitionError::InvalidName`] for a malformed name
    /// - [`DefinitionError::Duplicate`] if the name is taken
    /// - [`DefinitionError::InvalidOptions`] for a malformed option schema
    /// - [`DefinitionError::OptionWithoutKeyword`] if an option could never
    ///   pass the parameter shape's keyword check
    pub fn register_action<F>(
        &mut self,
        name: &str,
        description: impl Into<String>,
        shape: ParameterShape,
        options: OptionSchema,
        flags: ActionFlags,
        body: F,
    ) -> Result<Arc<ActionRecord>, DefinitionError>
    where
        F: Fn(&mut ActionHandle<'_>, &Invocation) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let record = Arc::new(ActionRecord::new(
            ActionName::new(name)?,
            description,
            shape,
            options,
            flags,
            Arc::new(body),
        ));
        self.add(Record::Action(Arc::clone(&record)))?;
        Ok(record)
    }

    /// Register an alias for an existing name.
    ///
    /// # Errors
    ///
    /// - [`DefinitionError::InvalidName`] for a malformed name or target
    /// - [`DefinitionError::Duplicate`] if the name is taken
    /// - [`DefinitionError::MissingTarget`] if the target does not already
    ///   resolve to an action
    pub fn register_alias(
        &mut self,
        name: &str,
        target: &str,
        fixed_args: &[&str],
        flags: ActionFlags,
    ) -> Result<Arc<AliasRecord>, DefinitionError> {
        let record = Arc::new(AliasRecord {
            name: ActionName::new(name)?,
            target: ActionName::new(target)?,
            fixed_args: fixed_args.iter().map(|a| a.to_string()).collect(),
            flags,
        });
        self.add(Record::Alias(Arc::clone(&record)))?;
        Ok(record)
    }

    /// Remove a record of either kind.
    pub fn undefine(&mut self, name: &str) -> Result<Record, DefinitionError> {
        self.delete(name)
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Insert a prepared record.
    pub fn add(&mut self, record: Record) -> Result<(), DefinitionError> {
        let name = record.name().as_str().to_string();
        if self.records.contains_key(&name) {
            return Err(DefinitionError::Duplicate(name));
        }

        match &record {
            Record::Action(action) => {
                check_options(action)?;
                for prefix in prefixes_of(&name) {
                    self.prefixes.entry(prefix.to_string()).or_insert(None);
                }
            }
            Record::Alias(alias) => {
                if self.resolve(alias.target.as_str()).is_none() {
                    return Err(DefinitionError::MissingTarget {
                        name,
                        target: alias.target.to_string(),
                    });
                }
            }
        }

        tracing::debug!(name = %name, kind = record.kind(), "registered");
        self.records.insert(name, record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Record> {
        self.records.get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Remove and return the record stored under `name`.
    pub fn delete(&mut self, name: &str) -> Result<Record, DefinitionError> {
        let record = self
            .records
            .remove(name)
            .ok_or_else(|| DefinitionError::NotFound(name.to_string()))?;
        tracing::debug!(name, kind = record.kind(), "undefined");
        Ok(record)
    }

    /// Remove an action, refusing to touch aliases.
    pub fn delete_action(&mut self, name: &str) -> Result<Arc<ActionRecord>, DefinitionError> {
        match self.records.get(name) {
            None => Err(DefinitionError::NotFound(name.to_string())),
            Some(Record::Alias(_)) => Err(DefinitionError::WrongKind {
                name: name.to_string(),
                expected: "action",
            }),
            Some(Record::Action(action)) => {
                let action = Arc::clone(action);
                self.delete(name)?;
                Ok(action)
            }
        }
    }

    /// Remove an alias, refusing to touch actions.
    pub fn delete_alias(&mut self, name: &str) -> Result<Arc<AliasRecord>, DefinitionError> {
        match self.records.get(name) {
            None => Err(DefinitionError::NotFound(name.to_string())),
            Some(Record::Action(_)) => Err(DefinitionError::WrongKind {
                name: name.to_string(),
                expected: "alias",
            }),
            Some(Record::Alias(alias)) => {
                let alias = Arc::clone(alias);
                self.delete(name)?;
                Ok(alias)
            }
        }
    }

    /// All records sorted by name.
    pub fn each(&self, include_hidden: bool) -> Vec<Record> {
        self.records
            .values()
            .filter(|r| include_hidden || !r.is_hidden())
            .cloned()
            .collect()
    }

    /// Records whose name starts with `prefix`, sorted by name.
    pub fn each_in(&self, prefix: &str, include_hidden: bool) -> Vec<Record> {
        self.records
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(_, r)| r)
            .filter(|r| include_hidden || !r.is_hidden())
            .cloned()
            .collect()
    }

    /// Visible records flagged as important.
    pub fn important(&self) -> Vec<Record> {
        self.records
            .values()
            .filter(|r| r.is_important() && !r.is_hidden())
            .cloned()
            .collect()
    }

    /// Records carrying `tag`, hidden ones included.
    pub fn tagged(&self, tag: &str) -> Vec<Record> {
        self.records
            .values()
            .filter(|r| r.tag() == Some(tag))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Follow aliases from `name` to an action.
    ///
    /// Fixed arguments accumulate outer alias first: for `A -> B -> C` the
    /// result is `(C, A.fixed_args + B.fixed_args)`. Returns `None` if any
    /// link in the chain is missing.
    pub fn resolve(&self, name: &str) -> Option<(Arc<ActionRecord>, Vec<String>)> {
        let mut args = Vec::new();
        let mut current = name;

        loop {
            match self.records.get(current)? {
                Record::Action(action) => return Some((Arc::clone(action), args)),
                Record::Alias(alias) => {
                    args.extend(alias.fixed_args.iter().cloned());
                    current = alias.target.as_str();
                }
            }
        }
    }

    // =========================================================================
    // Namespace prefixes
    // =========================================================================

    /// Declare a namespace prefix such as `db:`.
    ///
    /// A description replaces any earlier one; `None` keeps the existing
    /// description.
    pub fn add_prefix(
        &mut self,
        prefix: &str,
        description: Option<String>,
    ) -> Result<(), DefinitionError> {
        validate_prefix(prefix)?;
        for outer in prefixes_of(prefix) {
            self.prefixes.entry(outer.to_string()).or_insert(None);
        }
        let entry = self.prefixes.entry(prefix.to_string()).or_insert(None);
        if description.is_some() {
            *entry = description;
        }
        Ok(())
    }

    pub fn prefix_exists(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    pub fn prefix_description(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).and_then(|d| d.as_deref())
    }

    /// All prefixes sorted, with their descriptions.
    pub fn each_prefix(&self) -> Vec<(&str, Option<&str>)> {
        self.prefixes
            .iter()
            .map(|(p, d)| (p.as_str(), d.as_deref()))
            .collect()
    }

    /// Number of prefixes with exactly `depth` segments.
    pub fn count_at_depth(&self, depth: usize) -> usize {
        self.prefixes
            .keys()
            .filter(|p| segment_count(p) == depth)
            .count()
    }

    // =========================================================================
    // Abbreviations
    // =========================================================================

    /// Map a short prefix onto a long one, e.g. `g:` -> `git:`.
    pub fn add_abbreviation(&mut self, short: &str, long: &str) -> Result<(), DefinitionError> {
        let invalid = |reason| DefinitionError::InvalidAbbreviation {
            short: short.to_string(),
            long: long.to_string(),
            reason,
        };

        if validate_prefix(short).is_err() || validate_prefix(long).is_err() {
            return Err(invalid("both sides must be namespace prefixes"));
        }
        if short == long {
            return Err(invalid("abbreviation maps to itself"));
        }
        if self.abbreviations.contains_key(short) {
            return Err(invalid("abbreviation already defined"));
        }

        self.abbreviations
            .insert(short.to_string(), long.to_string());
        Ok(())
    }

    pub fn abbreviation(&self, short: &str) -> Option<&str> {
        self.abbreviations.get(short).map(String::as_str)
    }

    pub fn abbreviation_exists(&self, short: &str) -> bool {
        self.abbreviations.contains_key(short)
    }

    pub fn each_abbreviation(&self) -> Vec<(&str, &str)> {
        self.abbreviations
            .iter()
            .map(|(s, l)| (s.as_str(), l.as_str()))
            .collect()
    }

    /// Apply the longest matching abbreviation to `name`, once.
    pub fn expand<'a>(&self, name: &'a str) -> Cow<'a, str> {
        let hit = self
            .abbreviations
            .iter()
            .filter(|(short, _)| name.starts_with(short.as_str()))
            .max_by_key(|(short, _)| short.len());

        match hit {
            Some((short, long)) => Cow::Owned(format!("{}{}", long, &name[short.len()..])),
            None => Cow::Borrowed(name),
        }
    }
}

fn check_options(action: &ActionRecord) -> Result<(), DefinitionError> {
    action
        .options
        .check()
        .map_err(|message| DefinitionError::InvalidOptions {
            name: action.name.to_string(),
            message,
        })?;

    for spec in action.options.specs() {
        if !action.shape.accepts_keyword(&spec.keyword()) {
            return Err(DefinitionError::OptionWithoutKeyword {
                name: action.name.to_string(),
                option: spec.long.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Process-wide instance
// =============================================================================

static GLOBAL: RwLock<Option<Arc<Index>>> = RwLock::new(None);

/// Install `index` as the process-wide index, returning the previous one.
pub fn install_global(index: Index) -> Option<Arc<Index>> {
    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    slot.replace(Arc::new(index))
}

/// The process-wide index, if one is installed.
pub fn global() -> Option<Arc<Index>> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Remove the process-wide index.
pub fn teardown_global() -> Option<Arc<Index>> {
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}
