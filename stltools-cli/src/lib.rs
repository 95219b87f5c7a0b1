/// Command-line front end for the stltools converter
use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser, Subcommand};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use stltools_core::{convert_file, derive_output_path, read_binary_stl, ConvertOptions};
use tracing::debug;

pub mod report;

/// Printed for an unknown command or a wrong number of arguments.
pub const USAGE: &str =
    "USAGE stltools binary <ascii-input-stl-file> [<binary-output-stl-file>]";

#[derive(Parser, Debug)]
#[command(
    name = "stltools",
    version,
    about = "Convert ASCII STL meshes to binary STL",
    after_help = "EXAMPLES:\n  \
                  stltools binary part.stl              # writes part-binary.stl\n  \
                  stltools binary part.stl out.stl\n  \
                  stltools info part-binary.stl"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Convert an ASCII STL file to binary STL
    Binary {
        /// ASCII STL input
        input: PathBuf,

        /// Binary STL output [default: input with `.stl` replaced by `-binary.stl`]
        output: Option<PathBuf>,

        /// Text for the 80-byte header (truncated, zero padded)
        #[arg(long, value_name = "TEXT")]
        header: Option<String>,

        /// Write the output file directly instead of via a temporary file
        #[arg(long)]
        no_atomic: bool,
    },

    /// Show the header, triangle count and bounds of a binary STL file
    Info {
        /// Binary STL file
        path: PathBuf,
    },
}

/// Result of reading the command line
#[derive(Debug)]
pub enum Invocation {
    Run { command: Command, verbose: bool },
    /// Nothing to run; print [`USAGE`].
    Usage,
    /// `--help` or `--version` output.
    Display(clap::Error),
}

pub fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(Cli {
            command: Some(command),
            verbose,
        }) => Invocation::Run { command, verbose },
        Ok(Cli { command: None, .. }) => Invocation::Usage,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Invocation::Display(e)
        }
        Err(_) => Invocation::Usage,
    }
}

/// Execute a command, writing any report to `out`. `color` enables terminal
/// colours in that report.
pub fn run<W: Write>(command: Command, out: &mut W, color: bool) -> Result<()> {
    match command {
        Command::Binary {
            input,
            output,
            header,
            no_atomic,
        } => {
            let output = match output {
                Some(output) => output,
                None => derive_output_path(&input)?,
            };

            let mut options = ConvertOptions::default().with_atomic(!no_atomic);
            if let Some(text) = header {
                options = options.with_header_text(&text);
            }

            debug!(input = %input.display(), output = %output.display(), "converting");
            convert_file(&input, &output, &options)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            Ok(())
        }
        Command::Info { path } => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let stl = read_binary_stl(BufReader::new(file))
                .with_context(|| format!("Failed to read binary STL {}", path.display()))?;
            report::print_summary(out, &path, &stl, color)?;
            Ok(())
        }
    }
}
