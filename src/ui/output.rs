//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Listings
//! align descriptions into a column after the widest name.

use std::fmt::Display;

use crate::core::record::Record;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format records as `name  description` lines with aligned descriptions.
///
/// Important records are marked with `*`.
pub fn format_records(records: &[Record]) -> String {
    let width = records
        .iter()
        .map(|r| r.name().as_str().len())
        .max()
        .unwrap_or(0);

    records
        .iter()
        .map(|r| {
            let marker = if r.is_important() { '*' } else { ' ' };
            let line = format!(
                "{}{:width$}  {}",
                marker,
                r.name().as_str(),
                r.description(),
                width = width
            );
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
