//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive confirmation of a guessed location
//! - Mapping failures onto exit statuses

use std::process::ExitCode;

use clap::Parser;
use weather_core::WeatherError;

mod cli;
mod logging;
mod prompt;

/// Exit status for failures outside the core taxonomy.
const GENERIC_FAILURE: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            let code = err
                .downcast_ref::<WeatherError>()
                .map_or(GENERIC_FAILURE, WeatherError::exit_code);
            ExitCode::from(code)
        }
    }
}
