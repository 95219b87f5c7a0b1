/// stltools - ASCII STL to binary STL converter
///
/// Usage:
///   stltools binary <ascii-input-stl-file> [<binary-output-stl-file>]
///   stltools info <binary-stl-file>

use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use stltools_cli::{parse_args, report, run, Invocation, USAGE};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> ExitCode {
    let (command, verbose) = match parse_args(std::env::args_os()) {
        Invocation::Run { command, verbose } => (command, verbose),
        Invocation::Usage => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Invocation::Display(help) => {
            let _ = help.print();
            return ExitCode::SUCCESS;
        }
    };

    if let Err(e) = init_logging(verbose) {
        report::print_error(&e);
    }

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    match run(command, &mut stdout.lock(), color) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr at INFO, or DEBUG with `--verbose`. `RUST_LOG` takes precedence.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}
