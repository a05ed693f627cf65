//! Chai Khata command-line entry point.

use std::process::ExitCode;

use chai_khata::backend::io::cli::{self, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::debug!("chai-khata {} starting", env!("CARGO_PKG_VERSION"));

    match cli::run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays clean for `--json` and `export --stdout`.
/// `RUST_LOG` wins over `-v` when set.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
