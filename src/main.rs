//! `cyp` binary entrypoint.

use std::process::ExitCode;

use clap::Parser;
use crop_yield_predictor::cli_app::{Cli, report_error, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&cli, &err);
            ExitCode::FAILURE
        }
    }
}
