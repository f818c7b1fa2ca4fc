//! pxed - Command-line front end for the pxed pixel art engine

use std::process::ExitCode;

use pxed::cli;

fn main() -> ExitCode {
    cli::run()
}
