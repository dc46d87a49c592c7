//! yamlock CLI - Main entry point

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod diagnostics;

use commands::OutputArgs;

#[derive(Parser)]
#[command(name = "yamlock")]
#[command(version)]
#[command(about = "Carry `## lock`-marked YAML values across regenerations", long_about = None)]
struct Cli {
    /// Show debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the locked values of SRC into DEST
    Merge {
        /// Document to update, usually the freshly generated one
        dest: PathBuf,

        /// Document whose locked values are carried over
        src: PathBuf,

        /// Keep DEST's own locked values instead of replacing them with TODO
        #[arg(long)]
        no_scrub: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the content hash of each file, ignoring locked values
    Hash {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the value at a dotted key path
    Get {
        file: PathBuf,

        /// Dotted key path, e.g. `service.image`
        path: String,
    },

    /// Replace the scalar at a dotted key path
    Set {
        file: PathBuf,

        /// Dotted key path, e.g. `service.image`
        path: String,

        /// New value
        value: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the paths of locked values
    Locks { file: PathBuf },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "yamlock=debug" } else { "yamlock=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge {
            dest,
            src,
            no_scrub,
            output,
        } => commands::merge::execute(&dest, &src, !no_scrub, &output),
        Commands::Hash { files } => commands::hash::execute(&files),
        Commands::Get { file, path } => commands::get::execute(&file, &path),
        Commands::Set {
            file,
            path,
            value,
            output,
        } => commands::set::execute(&file, &path, &value, &output),
        Commands::Locks { file } => commands::locks::execute(&file),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<diagnostics::SourceError>() {
                Some(source) => {
                    eprint!("{}", diagnostics::render(source, std::io::stderr().is_terminal()))
                }
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
