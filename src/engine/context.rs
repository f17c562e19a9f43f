//! engine::context
//!
//! The execution context for one top-level invocation.
//!
//! # Architecture
//!
//! A [`Context`] owns the per-session state: the status of every action
//! name touched so far, the innermost running action, and the queue of
//! cleanup callbacks. Bodies reach it only through the
//! [`ActionHandle`](super::ActionHandle) they are given, which re-enters
//! [`Context::run`] for nested invocations.
//!
//! # Status Machine
//!
//! ```text
//! NotStarted --run--> InProgress --body ok--> Done
//! InProgress --run same name--> LoopDetected
//! Done --run_once--> no-op (false)
//! Done --run--> InProgress --> Done
//! ```
//!
//! Status is keyed by resolved name, not by stack frame, so once semantics
//! and loop detection hold across any nesting depth and across unrelated
//! branches of the same session.
//!
//! # Invariants
//!
//! - Only [`Context::start`] drains cleanup; nested runs never do
//! - Cleanup runs exactly once per registration, in reverse order, whether
//!   the top-level body succeeds or fails
//! - After `start` returns, all session state is cleared and the context
//!   can be reused
//! - The context is single-threaded; it is not `Sync` and must not be shared

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use super::errors::{CommandError, ExecutionError};
use super::handle::ActionHandle;
use super::trace::Tracer;
use super::Settings;
use crate::core::index::Index;
use crate::core::record::{ActionRecord, Invocation, Keywords, Record};
use crate::core::types::{validate_name, ActionName, NAMESPACE_DELIMITER};

/// A deferred cleanup callback.
pub type Cleanup = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// Per-session status of one action name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    InProgress,
    Done,
}

/// Runtime state for one top-level invocation.
pub struct Context {
    index: Arc<Index>,
    settings: Settings,
    tracer: Tracer,
    status: HashMap<String, Status>,
    current: Option<ActionName>,
    depth: usize,
    cleanup: Vec<Cleanup>,
}

impl Context {
    /// Create a context over `index`, tracing to stderr when enabled.
    pub fn new(index: Arc<Index>, settings: Settings) -> Self {
        let tracer = Tracer::stderr(settings.color);
        Self {
            index,
            settings,
            tracer,
            status: HashMap::new(),
            current: None,
            depth: 0,
            cleanup: Vec::new(),
        }
    }

    /// Send trace output somewhere other than stderr.
    pub fn with_trace_writer(mut self, out: impl Write + 'static) -> Self {
        self.tracer = Tracer::new(out, self.settings.color);
        self
    }

    pub fn index(&self) -> &Arc<Index> {
        &self.index
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Status of `name` in the current session.
    pub fn status(&self, name: &str) -> Status {
        self.status
            .get(name)
            .copied()
            .unwrap_or(Status::NotStarted)
    }

    /// The innermost running action, if any.
    pub fn current(&self) -> Option<&ActionName> {
        self.current.as_ref()
    }

    /// Current nesting depth; 0 outside any action.
    pub fn session_depth(&self) -> usize {
        self.depth
    }

    /// Number of cleanup callbacks waiting for the session to end.
    pub fn pending_cleanup(&self) -> usize {
        self.cleanup.len()
    }

    /// Run `name` as a top-level command with raw command-line arguments.
    ///
    /// Aliases are followed and their fixed arguments prepended, options are
    /// parsed with the action's schema, then the action runs. Cleanup is
    /// drained and session state cleared however the run ends.
    ///
    /// # Errors
    ///
    /// - [`CommandError::NotFound`] if `name` does not resolve
    /// - [`CommandError::Option`] for malformed options
    /// - [`CommandError::Execution`] if the action or anything it ran failed
    /// - [`CommandError::Cleanup`] if the action succeeded but a cleanup
    ///   callback failed
    pub fn start(&mut self, name: &str, args: &[String]) -> Result<(), CommandError> {
        tracing::debug!(action = name, ?args, "starting session");

        let result = self.start_session(name, args);
        let cleanup = self.finish_session();

        match (result, cleanup) {
            (Err(err), _) => Err(err),
            (Ok(()), Err(err)) => Err(CommandError::Cleanup(err)),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    fn start_session(&mut self, name: &str, args: &[String]) -> Result<(), CommandError> {
        let requested = self.index.expand(name).into_owned();
        let (action, mut argv) = self
            .index
            .resolve(&requested)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

        argv.extend_from_slice(args);
        let (keywords, positional) = action.options.parse(&argv)?;

        self.dispatch(&action, positional, keywords, false)?;
        Ok(())
    }

    /// Drain cleanup in reverse order and reset session state.
    ///
    /// Every callback runs; the first failure is returned.
    fn finish_session(&mut self) -> anyhow::Result<()> {
        let callbacks = std::mem::take(&mut self.cleanup);
        let mut first_err = None;

        for callback in callbacks.into_iter().rev() {
            if let Err(err) = callback() {
                tracing::warn!(error = %err, "cleanup callback failed");
                first_err.get_or_insert(err);
            }
        }

        self.status.clear();
        self.current = None;
        self.depth = 0;

        first_err.map_or(Ok(()), Err)
    }

    /// Run an action from inside a running body.
    ///
    /// Returns `Ok(false)` when `once` is set and the action already
    /// completed in this session, `Ok(true)` after running it.
    pub(crate) fn run(
        &mut self,
        name: &str,
        positional: Vec<String>,
        keywords: Keywords,
        once: bool,
    ) -> Result<bool, ExecutionError> {
        validate_name(name).map_err(|_| ExecutionError::InvalidName(name.to_string()))?;

        let action = match self.lookup(name) {
            None => return Err(ExecutionError::NotFound(name.to_string())),
            Some(Record::Alias(alias)) => {
                return Err(ExecutionError::AliasNotAllowed(alias.name.to_string()))
            }
            Some(Record::Action(action)) => action,
        };

        self.dispatch(&action, positional, keywords, once)
    }

    /// Find `name`, trying the running action's namespace first for bare
    /// names.
    fn lookup(&self, name: &str) -> Option<Record> {
        let name = self.index.expand(name);

        if !name.contains(NAMESPACE_DELIMITER) {
            let namespace = self.current.as_ref().and_then(ActionName::namespace);
            if let Some(namespace) = namespace {
                if let Some(record) = self.index.get(&format!("{}{}", namespace, name)) {
                    return Some(record);
                }
            }
        }

        self.index.get(&name)
    }

    fn dispatch(
        &mut self,
        action: &Arc<ActionRecord>,
        positional: Vec<String>,
        keywords: Keywords,
        once: bool,
    ) -> Result<bool, ExecutionError> {
        let name = action.name.as_str();

        match self.status(name) {
            Status::Done if once => {
                tracing::trace!(action = name, "already done, skipping");
                return Ok(false);
            }
            Status::InProgress => return Err(ExecutionError::LoopDetected(name.to_string())),
            _ => {}
        }

        action
            .shape
            .validate(&positional, &keywords)
            .map_err(|err| ExecutionError::Arguments {
                name: name.to_string(),
                message: err.message,
            })?;

        self.status.insert(name.to_string(), Status::InProgress);
        let saved = self.current.replace(action.name.clone());
        let depth = self.depth;
        self.depth += 1;

        if self.settings.trace {
            self.tracer.enter(name, depth);
        }
        tracing::debug!(action = name, depth, "enter");

        let invocation = Invocation {
            name: action.name.clone(),
            positional,
            keywords,
        };
        let result = {
            let mut handle = ActionHandle::new(self);
            (action.body)(&mut handle, &invocation)
        };

        if result.is_ok() && self.settings.trace {
            self.tracer.exit(name, depth);
        }

        self.depth = depth;
        self.current = saved;

        match result {
            Ok(()) => {
                self.status.insert(name.to_string(), Status::Done);
                tracing::debug!(action = name, "done");
                Ok(true)
            }
            Err(err) => {
                // A failed action is not done; a caller that recovers may run it again.
                self.status.remove(name);
                Err(match err.downcast::<ExecutionError>() {
                    Ok(nested) => nested,
                    Err(source) => ExecutionError::Failed {
                        name: name.to_string(),
                        source,
                    },
                })
            }
        }
    }

    /// Queue a cleanup callback for the end of the session.
    pub(crate) fn defer(&mut self, callback: Cleanup) {
        self.cleanup.push(callback);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("status", &self.status)
            .field("current", &self.current)
            .field("depth", &self.depth)
            .field("pending_cleanup", &self.cleanup.len())
            .finish_non_exhaustive()
    }
}
