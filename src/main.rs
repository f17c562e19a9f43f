//! aw - run named actions from the command line

use std::process::ExitCode;

fn main() -> ExitCode {
    actionwork::cli::run()
}
