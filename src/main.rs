use clap::Parser;
use std::process::ExitCode;

use dotstash::cli::Cli;
use dotstash::{commands, logging};

fn main() -> ExitCode {
    // Best effort; older Windows consoles simply stay monochrome.
    #[cfg(windows)]
    let _ = enable_ansi_support::enable_ansi_support();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = commands::run(cli) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
