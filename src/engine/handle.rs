//! engine::handle
//!
//! The capability an action body receives.
//!
//! A fresh [`ActionHandle`] is built for every body invocation and borrows
//! the owning [`Context`] mutably, so it cannot outlive the call that
//! created it.

use super::context::{Context, Status};
use super::errors::ExecutionError;
use super::Settings;
use crate::core::index::Index;
use crate::core::record::Keywords;
use crate::core::types::ActionName;

/// Lets a running action invoke other actions and register cleanup.
///
/// # Example
///
/// ```
/// use actionwork::core::index::Index;
/// use actionwork::core::options::OptionSchema;
/// use actionwork::core::params::ParameterShape;
/// use actionwork::core::record::ActionFlags;
///
/// let mut index = Index::new();
/// index
///     .register_action("setup", "", ParameterShape::new(), OptionSchema::new(),
///         ActionFlags::default(), |_, _| Ok(()))
///     .unwrap();
/// index
///     .register_action("test", "", ParameterShape::new(), OptionSchema::new(),
///         ActionFlags::default(), |handle, _| {
///             handle.call_once("setup")?;
///             handle.defer(|| Ok(()));
///             Ok(())
///         })
///     .unwrap();
/// ```
pub struct ActionHandle<'a> {
    ctx: &'a mut Context,
}

impl<'a> ActionHandle<'a> {
    pub(crate) fn new(ctx: &'a mut Context) -> Self {
        Self { ctx }
    }

    /// Run `name` with arguments, even if it already ran this session.
    pub fn run(
        &mut self,
        name: &str,
        positional: Vec<String>,
        keywords: Keywords,
    ) -> Result<bool, ExecutionError> {
        self.ctx.run(name, positional, keywords, false)
    }

    /// Run `name` unless it already completed this session.
    ///
    /// Returns `false` without doing anything if it did.
    pub fn run_once(
        &mut self,
        name: &str,
        positional: Vec<String>,
        keywords: Keywords,
    ) -> Result<bool, ExecutionError> {
        self.ctx.run(name, positional, keywords, true)
    }

    /// [`run`](Self::run) without arguments.
    pub fn call(&mut self, name: &str) -> Result<bool, ExecutionError> {
        self.run(name, Vec::new(), Keywords::new())
    }

    /// [`run_once`](Self::run_once) without arguments.
    pub fn call_once(&mut self, name: &str) -> Result<bool, ExecutionError> {
        self.run_once(name, Vec::new(), Keywords::new())
    }

    /// Register a callback to run when the top-level invocation ends.
    ///
    /// Callbacks run in reverse registration order, whether the invocation
    /// succeeds or fails.
    pub fn defer<F>(&mut self, callback: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        self.ctx.defer(Box::new(callback));
    }

    pub fn index(&self) -> &Index {
        self.ctx.index()
    }

    pub fn settings(&self) -> &Settings {
        self.ctx.settings()
    }

    /// The action this handle was created for.
    pub fn current(&self) -> Option<&ActionName> {
        self.ctx.current()
    }

    pub fn status(&self, name: &str) -> Status {
        self.ctx.status(name)
    }

    pub fn depth(&self) -> usize {
        self.ctx.session_depth()
    }

    pub fn pending_cleanup(&self) -> usize {
        self.ctx.pending_cleanup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::OptionSchema;
    use crate::core::params::ParameterShape;
    use crate::core::record::ActionFlags;
    use std::sync::{Arc, Mutex};

    #[test]
    fn run_passes_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);

        let mut index = Index::new();
        index
            .register_action(
                "echo",
                "",
                ParameterShape::variadic(0).keyword("loud"),
                OptionSchema::new(),
                ActionFlags::default(),
                move |h, inv| {
                    s.lock().unwrap().push(format!(
                        "{} {:?} {} depth={}",
                        inv.name,
                        inv.positional,
                        inv.flag("loud"),
                        h.depth()
                    ));
                    Ok(())
                },
            )
            .unwrap();
        index
            .register_action(
                "main",
                "",
                ParameterShape::new(),
                OptionSchema::new(),
                ActionFlags::default(),
                |h, _| {
                    let mut kw = Keywords::new();
                    kw.insert("loud".into(), serde_json::Value::Bool(true));
                    assert!(h.run("echo", vec!["hi".into()], kw)?);
                    assert_eq!(h.current().map(ActionName::as_str), Some("main"));
                    assert!(h.index().exists("echo"));
                    assert!(!h.settings().trace);
                    Ok(())
                },
            )
            .unwrap();

        let mut ctx = Context::new(Arc::new(index), Settings::default());
        ctx.start("main", &[]).unwrap();

        assert_eq!(
            seen.lock().unwrap().clone(),
            vec!["echo [\"hi\"] true depth=2".to_string()]
        );
    }

    #[test]
    fn unknown_keyword_rejected_in_nested_run() {
        let mut index = Index::new();
        index
            .register_action(
                "plain",
                "",
                ParameterShape::new(),
                OptionSchema::new(),
                ActionFlags::default(),
                |_, _| Ok(()),
            )
            .unwrap();
        index
            .register_action(
                "main",
                "",
                ParameterShape::new(),
                OptionSchema::new(),
                ActionFlags::default(),
                |h, _| {
                    let mut kw = Keywords::new();
                    kw.insert("color".into(), serde_json::Value::Bool(true));
                    h.run("plain", Vec::new(), kw)?;
                    Ok(())
                },
            )
            .unwrap();

        let mut ctx = Context::new(Arc::new(index), Settings::default());
        let err = ctx.start("main", &[]).unwrap_err();
        assert_eq!(err.to_string(), "plain: color: unknown keyword argument");
    }
}
