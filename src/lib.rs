//! actionwork - named-action dispatch
//!
//! actionwork keeps a registry of named actions and aliases, resolves a
//! requested name to an action, checks its arguments, and runs it inside a
//! session that tracks which actions already ran, refuses re-entrant
//! cycles, and runs deferred cleanup when the session ends.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line front end (parses flags, delegates to engine)
//! - [`engine`] - Execution context, action handles, tracing
//! - [`core`] - Names, parameter shapes, options, records and the index
//! - [`builtins`] - Actions every binary ships with
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. Every alias chain ends at an action
//! 2. A once-run action body executes at most once per session
//! 3. An action never runs while it is already running
//! 4. Deferred cleanup always runs when a session ends, in reverse order

pub mod builtins;
pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
