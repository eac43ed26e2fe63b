// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `tapbatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tapbatch",
    version,
    about = "Determine batches in which it is safe to update individual formulae and taps.",
    long_about = None
)]
pub struct CliArgs {
    /// Taps (user/repo) or formulae (name or user/repo/name) to update.
    #[arg(value_name = "TAPS_OR_FORMULAE", required = true, num_args = 1..)]
    pub targets: Vec<String>,

    /// Don't limit analysis to formulae in a single tap: follow dependencies
    /// into other taps too.
    #[arg(short = 'a', long = "all")]
    pub all_taps: bool,

    /// Formulae (or whole taps) to skip.
    #[arg(short, long, value_name = "FORMULA", num_args = 1..)]
    pub skip: Vec<String>,

    /// Don't require that a detected new version has the same versioning
    /// scheme as before.
    #[arg(long)]
    pub raw_versions: bool,

    /// Path to the config file (TOML).
    ///
    /// Default: `Tapbatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of concurrent `brew` lookups.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TAPBATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Also write log records to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
