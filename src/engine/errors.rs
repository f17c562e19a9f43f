//! engine::errors
//!
//! Runtime error taxonomy.
//!
//! # Layers
//!
//! - [`ExecutionError`] - raised by nested `run` calls; these usually point
//!   at a mistake in an action body, so front ends show the full chain
//! - [`CommandError`] - what [`Context::start`](super::Context::start)
//!   returns; wraps execution errors and adds the user-facing cases
//!   (unknown command-line action, malformed options)
//!
//! Registration problems are [`DefinitionError`](crate::core::index::DefinitionError)s
//! and never reach the engine.

use thiserror::Error;

use crate::core::options::OptionError;

/// Errors from running an action inside a session.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The requested name is not a valid identifier.
    #[error("invalid action name '{0}'")]
    InvalidName(String),

    /// No record under the requested name.
    #[error("action not found: {0}")]
    NotFound(String),

    /// The name refers to an alias; nested runs only accept actions.
    #[error("'{0}' is an alias; only actions can be run from an action")]
    AliasNotAllowed(String),

    /// The action is already on the call stack.
    #[error("loop detected: '{0}' is already running")]
    LoopDetected(String),

    /// Arguments do not match the action's parameter shape.
    #[error("{name}: {message}")]
    Arguments { name: String, message: String },

    /// The action body returned an error.
    #[error("action '{name}' failed")]
    Failed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ExecutionError {
    /// The action name this error is about.
    pub fn name(&self) -> &str {
        match self {
            ExecutionError::InvalidName(name)
            | ExecutionError::NotFound(name)
            | ExecutionError::AliasNotAllowed(name)
            | ExecutionError::LoopDetected(name) => name,
            ExecutionError::Arguments { name, .. } | ExecutionError::Failed { name, .. } => name,
        }
    }
}

/// Errors from a top-level invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command-line name does not resolve to an action.
    #[error("unknown action '{0}'")]
    NotFound(String),

    /// Option parsing failed.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// The action, or something it ran, failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The action succeeded but a cleanup callback failed.
    #[error("cleanup failed")]
    Cleanup(#[source] anyhow::Error),
}

impl CommandError {
    /// Whether a front end should report the full error chain.
    ///
    /// Unknown names and bad options are ordinary user mistakes; everything
    /// else usually indicates a problem in an action definition.
    pub fn wants_backtrace(&self) -> bool {
        !matches!(self, CommandError::NotFound(_) | CommandError::Option(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod display {
        use super::*;

        #[test]
        fn not_found_texts_differ() {
            let nested = ExecutionError::NotFound("build".into()).to_string();
            let top = CommandError::NotFound("build".into()).to_string();
            assert_ne!(nested, top);
            assert!(nested.contains("build"));
            assert!(top.contains("build"));
        }

        #[test]
        fn loop_mentions_name() {
            let err = ExecutionError::LoopDetected("task1".into());
            assert!(err.to_string().contains("task1"));
        }

        #[test]
        fn arguments_embed_name_and_message() {
            let err = ExecutionError::Arguments {
                name: "deploy".into(),
                message: "argument required".into(),
            };
            assert_eq!(err.to_string(), "deploy: argument required");
        }

        #[test]
        fn execution_is_transparent() {
            let err = CommandError::from(ExecutionError::LoopDetected("a".into()));
            assert_eq!(err.to_string(), "loop detected: 'a' is already running");
        }
    }

    mod backtrace_policy {
        use super::*;

        #[test]
        fn user_errors_skip_backtrace() {
            assert!(!CommandError::NotFound("x".into()).wants_backtrace());
            assert!(!CommandError::Option(OptionError::Malformed("bad".into())).wants_backtrace());
        }

        #[test]
        fn execution_errors_want_backtrace() {
            let err = CommandError::from(ExecutionError::NotFound("x".into()));
            assert!(err.wants_backtrace());
            assert!(CommandError::Cleanup(anyhow::anyhow!("boom")).wants_backtrace());
        }
    }

    #[test]
    fn name_accessor() {
        let err = ExecutionError::Failed {
            name: "build".into(),
            source: anyhow::anyhow!("compiler exploded"),
        };
        assert_eq!(err.name(), "build");
    }
}
