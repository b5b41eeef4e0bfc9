//! idlc command-line tool
//!
//! Reads a JSON interface definition, removes package cycles and writes the
//! rewritten definition back out.

mod commands;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "idlc")]
#[command(about = "IDL compiler package cycle tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a definition so that its package graph is acyclic
    Resolve {
        /// Input definition (JSON)
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Configuration file (defaults to idlc.toml next to the input)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print every renamed declaration to stderr
        #[arg(long)]
        report: bool,
    },

    /// Fail if the package graph of a definition has a cycle
    Check {
        /// Input definition (JSON)
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_level.as_str()));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            input,
            output,
            config,
            report,
        } => commands::resolve::execute(&input, output.as_deref(), config.as_deref(), report),

        Commands::Check { input } => commands::check::execute(&input),
    }
}
