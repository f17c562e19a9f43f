//! core::options
//!
//! Per-action option schemas.
//!
//! # Overview
//!
//! An [`OptionSchema`] describes the `-x` / `--name=value` options an action
//! accepts from the command line. Parsing splits raw arguments into keyword
//! values and the remaining positional arguments:
//!
//! ```text
//! ["--force", "-t", "prod", "app"]  ->  ({force: true, target: "prod"}, ["app"])
//! ```
//!
//! Parsing is delegated to clap: the schema is turned into a
//! `clap::Command` on demand, so tokenizing rules (`--`, `--name=value`,
//! bundled short flags) match the rest of the CLI.
//!
//! # Keyword Names
//!
//! Long option names map to keyword names with `-` replaced by `_`, so
//! `--dry-run` arrives in the action body as `dry_run`. Only options present
//! on the command line appear in the parsed keywords.

use std::collections::BTreeSet;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ColorChoice};
use serde_json::Value;
use thiserror::Error;

use super::record::Keywords;

/// Id of the catch-all positional arg. `check` rejects `<` in option
/// names, so no declared option can share it.
const POSITIONAL_ID: &str = "<positional>";

/// Errors from option parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    /// A token could not be parsed against the schema.
    #[error("{0}")]
    Malformed(String),
}

/// How an option consumes values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Boolean switch, no value.
    Flag,
    /// Takes exactly one value; the last occurrence wins.
    Value,
    /// Takes one value per occurrence; all values are collected.
    Multiple,
}

/// A single declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Long name without leading dashes.
    pub long: String,
    /// Optional single-character short form.
    pub short: Option<char>,
    pub kind: OptionKind,
    pub help: String,
}

impl OptionSpec {
    /// Keyword name this option is delivered under.
    pub fn keyword(&self) -> String {
        self.long.replace('-', "_")
    }

    /// Usage form such as `-f, --force` or `--target <VALUE>`.
    pub fn usage(&self) -> String {
        let mut out = match self.short {
            Some(c) => format!("-{}, --{}", c, self.long),
            None => format!("--{}", self.long),
        };
        match self.kind {
            OptionKind::Flag => {}
            OptionKind::Value => out.push_str(" <VALUE>"),
            OptionKind::Multiple => out.push_str(" <VALUE>..."),
        }
        out
    }
}

/// The options an action accepts.
///
/// # Example
///
/// ```
/// use actionwork::core::options::OptionSchema;
///
/// let schema = OptionSchema::new()
///     .flag("force", Some('f'), "Overwrite existing output")
///     .value("target", None, "Deployment target");
///
/// let (keywords, rest) = schema.parse(&["-f".into(), "app".into()]).unwrap();
/// assert_eq!(keywords["force"], serde_json::Value::Bool(true));
/// assert_eq!(rest, vec!["app".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSchema {
    specs: Vec<OptionSpec>,
}

impl OptionSchema {
    /// An empty schema: every argument is positional.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boolean flag.
    pub fn flag(self, long: impl Into<String>, short: Option<char>, help: impl Into<String>) -> Self {
        self.option(long, short, OptionKind::Flag, help)
    }

    /// Add an option taking a single value.
    pub fn value(self, long: impl Into<String>, short: Option<char>, help: impl Into<String>) -> Self {
        self.option(long, short, OptionKind::Value, help)
    }

    /// Add an option that may repeat, collecting every value.
    pub fn multiple(
        self,
        long: impl Into<String>,
        short: Option<char>,
        help: impl Into<String>,
    ) -> Self {
        self.option(long, short, OptionKind::Multiple, help)
    }

    /// Add an option of any kind.
    pub fn option(
        mut self,
        long: impl Into<String>,
        short: Option<char>,
        kind: OptionKind,
        help: impl Into<String>,
    ) -> Self {
        self.specs.push(OptionSpec {
            long: long.into(),
            short,
            kind,
            help: help.into(),
        });
        self
    }

    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Check the schema itself for shape problems.
    ///
    /// Returns a description of the first problem found: an empty or
    /// malformed long name, a non-alphanumeric short form, or two options
    /// sharing a long name, keyword, or short form.
    pub fn check(&self) -> Result<(), String> {
        let mut longs = BTreeSet::new();
        let mut shorts = BTreeSet::new();

        for spec in &self.specs {
            let long = spec.long.as_str();
            if long.is_empty()
                || long.starts_with('-')
                || !long
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(format!("invalid option name '{}'", long));
            }
            if !longs.insert(spec.keyword()) {
                return Err(format!("duplicate option '--{}'", long));
            }
            if let Some(c) = spec.short {
                if !c.is_ascii_alphanumeric() {
                    return Err(format!("invalid short option '-{}'", c));
                }
                if !shorts.insert(c) {
                    return Err(format!("duplicate short option '-{}'", c));
                }
            }
        }

        Ok(())
    }

    /// Split raw arguments into keyword values and remaining positionals.
    ///
    /// # Errors
    ///
    /// Returns `OptionError::Malformed` for unknown options, missing values,
    /// or any other token clap rejects.
    pub fn parse(&self, args: &[String]) -> Result<(Keywords, Vec<String>), OptionError> {
        let matches = self
            .command()
            .try_get_matches_from(args)
            .map_err(|e| OptionError::Malformed(first_line(&e.render().to_string())))?;

        let mut keywords = Keywords::new();
        for spec in &self.specs {
            let id = spec.keyword();
            if matches.value_source(&id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let value = match spec.kind {
                OptionKind::Flag => Value::Bool(matches.get_flag(&id)),
                OptionKind::Value => matches
                    .get_one::<String>(&id)
                    .map(|v| Value::String(v.clone()))
                    .unwrap_or(Value::Null),
                OptionKind::Multiple => Value::Array(
                    matches
                        .get_many::<String>(&id)
                        .into_iter()
                        .flatten()
                        .map(|v| Value::String(v.clone()))
                        .collect(),
                ),
            };
            keywords.insert(id, value);
        }

        let positional = matches
            .get_many::<String>(POSITIONAL_ID)
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        Ok((keywords, positional))
    }

    fn command(&self) -> clap::Command {
        let mut cmd = clap::Command::new("action")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .color(ColorChoice::Never)
            .allow_negative_numbers(true)
            .arg(
                Arg::new(POSITIONAL_ID)
                    .value_name("ARGS")
                    .num_args(1..)
                    .action(ArgAction::Append)
                    .value_parser(clap::value_parser!(String)),
            );

        for spec in &self.specs {
            let mut arg = Arg::new(spec.keyword()).long(spec.long.clone());
            if let Some(c) = spec.short {
                arg = arg.short(c);
            }
            arg = match spec.kind {
                OptionKind::Flag => arg.action(ArgAction::SetTrue),
                OptionKind::Value => arg
                    .action(ArgAction::Set)
                    .num_args(1)
                    .value_parser(clap::value_parser!(String)),
                OptionKind::Multiple => arg
                    .action(ArgAction::Append)
                    .num_args(1)
                    .value_parser(clap::value_parser!(String)),
            };
            cmd = cmd.arg(arg);
        }

        cmd
    }
}

fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).trim().to_string()
}
