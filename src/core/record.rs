//! core::record
//!
//! Action and alias records stored in the metadata index.
//!
//! # Records
//!
//! - [`ActionRecord`] - An invokable unit: description, parameter shape,
//!   option schema, flags and the body itself
//! - [`AliasRecord`] - A named redirect to another name plus fixed leading
//!   arguments
//! - [`Record`] - Either of the above, as stored under one name
//!
//! Records are immutable once registered. They are shared through `Arc` so
//! the engine can hold one across a body invocation while the body itself
//! reads the index.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::options::OptionSchema;
use super::params::ParameterShape;
use super::types::ActionName;
use crate::engine::ActionHandle;

/// Keyword arguments passed to an action body, keyed by keyword name.
pub type Keywords = BTreeMap<String, Value>;

/// The callable part of an action.
///
/// Bodies receive a fresh [`ActionHandle`] for invoking other actions and
/// registering cleanup, plus the arguments of this invocation.
pub type ActionBody =
    Arc<dyn Fn(&mut ActionHandle<'_>, &Invocation) -> anyhow::Result<()> + Send + Sync>;

/// Flags attached to a record at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFlags {
    /// Omit from default listings.
    pub hidden: bool,
    /// Highlight in listings. `None` leaves the decision to the front end.
    pub important: Option<bool>,
    /// Free-form grouping label.
    pub tag: Option<String>,
}

impl ActionFlags {
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::default()
        }
    }

    pub fn important() -> Self {
        Self {
            important: Some(true),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Arguments for one body invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Resolved name of the running action.
    pub name: ActionName,
    pub positional: Vec<String>,
    pub keywords: Keywords,
}

impl Invocation {
    /// Positional argument at `index`, if supplied.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Whether a boolean keyword is set to true.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.keywords.get(name), Some(Value::Bool(true)))
    }

    /// A string keyword value.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.keywords.get(name).and_then(Value::as_str)
    }

    /// All string values of a repeated keyword.
    pub fn values(&self, name: &str) -> Vec<&str> {
        match self.keywords.get(name) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Static description of one invokable action.
#[derive(Clone)]
pub struct ActionRecord {
    pub name: ActionName,
    pub description: String,
    pub shape: ParameterShape,
    pub options: OptionSchema,
    pub flags: ActionFlags,
    pub(crate) body: ActionBody,
}

impl ActionRecord {
    pub fn new(
        name: ActionName,
        description: impl Into<String>,
        shape: ParameterShape,
        options: OptionSchema,
        flags: ActionFlags,
        body: ActionBody,
    ) -> Self {
        Self {
            name,
            description: description.into(),
            shape,
            options,
            flags,
            body,
        }
    }
}

impl fmt::Debug for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRecord")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("shape", &self.shape)
            .field("options", &self.options)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// A named redirect to another record plus fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecord {
    pub name: ActionName,
    pub target: ActionName,
    pub fixed_args: Vec<String>,
    pub flags: ActionFlags,
}

impl AliasRecord {
    /// Derived description, e.g. `alias of 'deploy prod'`.
    pub fn description(&self) -> String {
        if self.fixed_args.is_empty() {
            format!("alias of '{}'", self.target)
        } else {
            format!("alias of '{} {}'", self.target, self.fixed_args.join(" "))
        }
    }
}

/// Whatever is stored under a name.
#[derive(Debug, Clone)]
pub enum Record {
    Action(Arc<ActionRecord>),
    Alias(Arc<AliasRecord>),
}

impl Record {
    pub fn name(&self) -> &ActionName {
        match self {
            Record::Action(a) => &a.name,
            Record::Alias(a) => &a.name,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Record::Action(a) => a.description.clone(),
            Record::Alias(a) => a.description(),
        }
    }

    pub fn flags(&self) -> &ActionFlags {
        match self {
            Record::Action(a) => &a.flags,
            Record::Alias(a) => &a.flags,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Record::Alias(_))
    }

    pub fn is_hidden(&self) -> bool {
        self.flags().hidden
    }

    pub fn is_important(&self) -> bool {
        self.flags().important.unwrap_or(false)
    }

    pub fn tag(&self) -> Option<&str> {
        self.flags().tag.as_deref()
    }

    /// Short label for the record kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Action(_) => "action",
            Record::Alias(_) => "alias",
        }
    }

    pub fn as_action(&self) -> Option<&Arc<ActionRecord>> {
        match self {
            Record::Action(a) => Some(a),
            Record::Alias(_) => None,
        }
    }

    pub fn as_alias(&self) -> Option<&Arc<AliasRecord>> {
        match self {
            Record::Alias(a) => Some(a),
            Record::Action(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ActionName {
        ActionName::new(s).unwrap()
    }

    fn alias(fixed: &[&str]) -> AliasRecord {
        AliasRecord {
            name: name("ship"),
            target: name("deploy"),
            fixed_args: fixed.iter().map(|s| s.to_string()).collect(),
            flags: ActionFlags::default(),
        }
    }

    mod alias_record {
        use super::*;

        #[test]
        fn description_without_args() {
            assert_eq!(alias(&[]).description(), "alias of 'deploy'");
        }

        #[test]
        fn description_with_args() {
            assert_eq!(
                alias(&["prod", "--force"]).description(),
                "alias of 'deploy prod --force'"
            );
        }

        #[test]
        fn record_reports_alias_kind() {
            let record = Record::Alias(Arc::new(alias(&[])));
            assert!(record.is_alias());
            assert_eq!(record.kind(), "alias");
            assert!(record.as_action().is_none());
        }
    }

    mod flags {
        use super::*;

        #[test]
        fn defaults() {
            let flags = ActionFlags::default();
            assert!(!flags.hidden);
            assert_eq!(flags.important, None);
            assert_eq!(flags.tag, None);
        }

        #[test]
        fn builders() {
            assert!(ActionFlags::hidden().hidden);
            assert_eq!(ActionFlags::important().important, Some(true));
            assert_eq!(
                ActionFlags::default().with_tag("db").tag.as_deref(),
                Some("db")
            );
        }
    }

    mod invocation {
        use super::*;

        #[test]
        fn accessors() {
            let mut keywords = Keywords::new();
            keywords.insert("force".into(), Value::Bool(true));
            keywords.insert("target".into(), Value::String("prod".into()));
            keywords.insert("include".into(), serde_json::json!(["a", "b"]));

            let inv = Invocation {
                name: name("deploy"),
                positional: vec!["app".into()],
                keywords,
            };

            assert_eq!(inv.arg(0), Some("app"));
            assert_eq!(inv.arg(1), None);
            assert!(inv.flag("force"));
            assert!(!inv.flag("missing"));
            assert_eq!(inv.value("target"), Some("prod"));
            assert_eq!(inv.values("include"), vec!["a", "b"]);
            assert_eq!(inv.values("target"), vec!["prod"]);
        }
    }
}
