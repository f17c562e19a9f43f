//! core
//!
//! Domain types and the action registry.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ActionName, namespace helpers
//! - [`params`] - Parameter shapes and argument validation
//! - [`options`] - Per-action option schemas and parsing
//! - [`record`] - Action and alias records
//! - [`index`] - The metadata index
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid names at construction
//! - Definitions are checked when registered, not when run

pub mod config;
pub mod index;
pub mod options;
pub mod params;
pub mod record;
pub mod types;
