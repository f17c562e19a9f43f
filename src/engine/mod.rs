//! engine
//!
//! Runs actions: name resolution, argument checking, once semantics, loop
//! detection, tracing and deferred cleanup.
//!
//! # Architecture
//!
//! ```text
//! front end --start(name, args)--> Context --body(handle, invocation)--> action
//!                                     ^                                    |
//!                                     +------ handle.run / run_once -------+
//! ```
//!
//! A [`Context`] serves one top-level invocation at a time. Each body gets a
//! fresh [`ActionHandle`] bound to that context; nested runs re-enter the
//! context rather than starting a new one, which is what makes once
//! semantics and loop detection hold across the whole session.
//!
//! # Invariants
//!
//! - Execution is synchronous and single-threaded
//! - The index is never mutated by running actions
//! - Errors from nested runs propagate unchanged up to `start`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use actionwork::core::index::Index;
//! use actionwork::core::options::OptionSchema;
//! use actionwork::core::params::ParameterShape;
//! use actionwork::core::record::ActionFlags;
//! use actionwork::engine::{Context, Settings};
//!
//! let mut index = Index::new();
//! index
//!     .register_action("hello", "Say hello", ParameterShape::variadic(0),
//!         OptionSchema::new(), ActionFlags::default(), |_, _| Ok(()))
//!     .unwrap();
//!
//! let mut ctx = Context::new(Arc::new(index), Settings::default());
//! ctx.start("hello", &["world".to_string()]).unwrap();
//! ```

pub mod context;
pub mod errors;
pub mod handle;
pub mod trace;

pub use context::{Cleanup, Context, Status};
pub use errors::{CommandError, ExecutionError};
pub use handle::ActionHandle;
pub use trace::Tracer;

use crate::ui::output::Verbosity;

/// Mode flags for a run, derived from CLI flags and configuration.
///
/// Passed explicitly to every [`Context`] instead of living in globals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Emit `enter:` / `exit:` lines for every action.
    pub trace: bool,
    /// Colorize diagnostic output.
    pub color: bool,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Settings {
    /// Output verbosity implied by these settings.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
