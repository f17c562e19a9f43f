//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing output goes through this module so quiet and debug
//! modes are honored consistently. Trace lines are the engine's concern and
//! live in [`crate::engine::trace`].

pub mod output;
