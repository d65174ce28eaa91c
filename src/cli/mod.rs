//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::run::RunArgs;
use crate::Verbosity;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;


// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function.
/// This is achieved with the `parse` function, which parses the command line arguments
/// from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = treesort_runner::Cli::parse();
/// ```
/// Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// use treesort_runner::{cli::Command, Cli, Verbosity};
///
/// let input = ["treesort-runner", "-v", "debug", "validate", "--job", "jobdesc.json"];
/// let args = Cli::parse_from(input);
/// assert_eq!(args.verbosity, Verbosity::Debug);
/// assert!(matches!(args.command, Command::Validate(_)));
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "treesort-runner", author, version)]
#[clap(about = "Validate and run TreeSort reassortment detection jobs.")]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants).
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to [JobConfig](crate::job::JobConfig) validation.
    #[clap(about = "Validate a job description and print the normalized job.")]
    Validate(ValidateArgs),

    /// Pass CLI arguments to the [run](crate::run::run()) method.
    #[clap(about = "Run a job: stage input, prepare the dataset, detect reassortment.")]
    Run(RunArgs),
}

/// Validate a job description.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
pub struct ValidateArgs {
    /// Job description (JSON).
    #[clap(short = 'j', long, required = true)]
    pub job: PathBuf,
}
