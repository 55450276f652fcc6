//! Themevars - command-line tool for scanning and resolving CSS custom property expressions

use std::process::ExitCode;

use themevars::cli;

fn main() -> ExitCode {
    cli::run()
}
