//! `augment-cleaner` binary entry point.

use std::process::ExitCode;

use augment_cleaner::cli_app::{self, Cli, EXIT_FAILURE};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli_app::run(&cli) {
        Ok(_) => {
            let _ = cli_app::wait_for_keypress(&cli);
            ExitCode::SUCCESS
        }
        Err(err) => {
            cli_app::report_fatal(&cli, &err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
