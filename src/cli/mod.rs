//! cli
//!
//! Command-line front end for actionwork.
//!
//! # Responsibilities
//!
//! - Parse global flags and split off the action name and its arguments
//! - Build the index (built-ins plus whatever the embedding binary adds)
//!   and apply configuration
//! - Hand the action to the engine and map the result to an exit code
//!
//! # Architecture
//!
//! The CLI layer is thin. It never resolves names or runs bodies itself;
//! everything after flag parsing flows through
//! [`Context::start`](crate::engine::Context::start).
//!
//! # Exit Codes
//!
//! - `0` success
//! - `1` the action failed, or startup failed
//! - `2` unknown action or malformed options

pub mod args;

pub use args::Cli;

use std::error::Error as _;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::builtins;
use crate::core::config::Config;
use crate::core::index::Index;
use crate::engine::{CommandError, Context, Settings};
use crate::ui::output::{self, Verbosity};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "AW_LOG";

/// Run the CLI with only the built-in actions.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    run_with(Index::new())
}

/// Run the CLI over an index prepared by the caller.
///
/// Built-in actions are added to `index` before dispatch.
pub fn run_with(index: Index) -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    let (mut ctx, action, args) = match prepare(cli, index) {
        Ok(prepared) => prepared,
        Err(err) => {
            output::error(format!("{:#}", err));
            return ExitCode::from(1);
        }
    };

    match ctx.start(&action, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err, verbosity),
    }
}

/// Load config, finish the index and build the context.
fn prepare(cli: Cli, mut index: Index) -> Result<(Context, String, Vec<String>)> {
    let project_dir = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    let loaded = Config::load(Some(&project_dir))?;
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    let config = loaded.config;
    for (scope, path) in [
        ("global", config.global_config_loaded_from()),
        ("project", config.project_config_loaded_from()),
    ] {
        if let Some(path) = path {
            output::debug(format!("{} config: {}", scope, path.display()), verbosity);
        }
    }

    builtins::register(&mut index).context("failed to register built-in actions")?;
    config
        .apply_to(&mut index)
        .context("invalid project configuration")?;

    let settings = settings_for(&cli, &config);
    if cli.color_flag().is_some() {
        colored::control::set_override(settings.color);
    }
    output::debug(
        format!(
            "{} actions registered from {}",
            index.len(),
            project_dir.display()
        ),
        verbosity,
    );

    let ctx = Context::new(Arc::new(index), settings);
    Ok((ctx, cli.action_name().to_string(), cli.action_args().to_vec()))
}

/// Merge CLI flags over configured defaults.
pub fn settings_for(cli: &Cli, config: &Config) -> Settings {
    let color = cli
        .color_flag()
        .or_else(|| config.color())
        .unwrap_or_else(|| std::io::stderr().is_terminal());

    Settings {
        trace: cli.trace || config.trace(),
        color,
        debug: cli.debug || config.debug(),
        quiet: cli.quiet,
    }
}

fn report(err: &CommandError, verbosity: Verbosity) -> ExitCode {
    output::error(err);

    if err.wants_backtrace() {
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        output::debug(format!("{:?}", err), verbosity);
    }

    ExitCode::from(exit_status(err))
}

/// Process exit status for a failed invocation.
pub fn exit_status(err: &CommandError) -> u8 {
    match err {
        CommandError::NotFound(_) | CommandError::Option(_) => 2,
        CommandError::Execution(_) | CommandError::Cleanup(_) => 1,
    }
}

fn init_logging(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("aw").chain(args.iter().copied())).unwrap()
    }

    mod settings {
        use super::*;
        use crate::core::config::GlobalConfig;

        #[test]
        fn flags_override_config() {
            let mut config = Config::default();
            config.global = GlobalConfig {
                color: Some(true),
                ..GlobalConfig::default()
            };
            let settings = settings_for(&cli(&["--no-color", "--trace"]), &config);
            assert!(!settings.color);
            assert!(settings.trace);
        }

        #[test]
        fn config_supplies_defaults() {
            let mut config = Config::default();
            config.global = GlobalConfig {
                trace: Some(true),
                color: Some(false),
                debug: Some(true),
            };
            let settings = settings_for(&cli(&[]), &config);
            assert!(settings.trace);
            assert!(!settings.color);
            assert!(settings.debug);
            assert!(!settings.quiet);
        }
    }

    mod exit_codes {
        use super::*;
        use crate::core::options::OptionError;
        use crate::engine::ExecutionError;

        #[test]
        fn user_errors_exit_two() {
            assert_eq!(exit_status(&CommandError::NotFound("x".into())), 2);
            assert_eq!(
                exit_status(&CommandError::Option(OptionError::Malformed("bad".into()))),
                2
            );
        }

        #[test]
        fn execution_errors_exit_one() {
            let err = CommandError::Execution(ExecutionError::LoopDetected("a".into()));
            assert_eq!(exit_status(&err), 1);
            let err = CommandError::Cleanup(anyhow::anyhow!("disk full"));
            assert_eq!(exit_status(&err), 1);
        }
    }
}
