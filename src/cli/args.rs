//! Command-line arguments and subcommands for the Veritas CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "veritas",
    version,
    about = "Declarative unit and fuzz testing for registered functions."
)]
pub struct VeritasArgs {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register and run every test case in a file or directory.
    Run {
        /// A descriptor file, or a directory searched for .json/.yaml/.yml files.
        #[arg(required = true)]
        path: PathBuf,
        /// Seed for generated values; a random seed is used and reported otherwise.
        #[arg(long)]
        seed: Option<u64>,
        /// Iterations for fuzzed cases that declare none.
        #[arg(long, default_value_t = crate::fuzz::DEFAULT_ITERATIONS)]
        iterations: usize,
        /// Stop each case at its first failing iteration.
        #[arg(long)]
        fail_fast: bool,
        /// Only run cases whose name contains this text (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
        /// Disable coloured output.
        #[arg(long)]
        no_color: bool,
        /// Print results as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Validate test cases without running them.
    Check {
        #[arg(required = true)]
        path: PathBuf,
    },
    /// List the registered function names.
    Functions,
    /// List the built-in data contracts and their rule counts.
    Contracts,
}
