//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are only recognized before the action name:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Load project config from that directory
//! - `--trace`: Print `enter:` / `exit:` for every action
//! - `--color` / `--no-color`: Force diagnostic coloring on or off
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! Everything after the action name is handed to the action's own option
//! parser untouched.

use clap::Parser;
use std::path::PathBuf;

/// aw - run named actions
#[derive(Parser, Debug)]
#[command(name = "aw")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # See what can be run
    aw list

    # Run an action with its own options and arguments
    aw deploy --force app

    # Watch nested actions as they run
    aw --trace release")]
pub struct Cli {
    /// Load project configuration from this directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Print enter/exit lines for every action
    #[arg(long)]
    pub trace: bool,

    /// Always colorize diagnostics
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Never colorize diagnostics
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Action to run (defaults to `list`), then its arguments and options
    #[arg(
        value_name = "ACTION",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The action to run, falling back to `list`.
    pub fn action_name(&self) -> &str {
        self.command.first().map_or("list", String::as_str)
    }

    /// Everything after the action name, untouched.
    pub fn action_args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    /// Explicit color choice from flags, if any.
    pub fn color_flag(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }
}
