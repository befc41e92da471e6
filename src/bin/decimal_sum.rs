//! `decimal-sum`: exact sum of a file of decimal lines.
//!
//! Prints the rejected lines, if any, then `Сумма: <total>`. Diagnostics go
//! to the log file, never to stdout.

use clap::Parser;
use clap::error::ErrorKind;
use decimal_ratio::application::services::BatchSummation;
use decimal_ratio::infrastructure::telemetry::{self, DEFAULT_LOG_FILE, TelemetrySettings};
use std::path::PathBuf;
use std::process::ExitCode;

/// Sum a newline-delimited file of decimal numbers exactly.
#[derive(Debug, Parser)]
#[command(name = "decimal-sum", version, about)]
struct Cli {
    /// File with one decimal number per line.
    file: PathBuf,

    /// Append diagnostics to this file.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if let Err(e) = telemetry::init(&TelemetrySettings::file(&cli.log_file)) {
        eprintln!("{e}");
    }

    match BatchSummation::sum_file(&cli.file) {
        Ok(report) => {
            println!("{}", BatchSummation::render(&report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(path = %cli.file.display(), error = %e, "cannot read input");
            eprintln!("{}: {e}", cli.file.display());
            ExitCode::FAILURE
        }
    }
}
