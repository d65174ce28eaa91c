//! `treesort-runner` validates TreeSort jobs and stages their input for reassortment detection.
//!
//! A job description (`jobdesc.json`) names the input sequences, the detection method, and
//! the options of the external tools. The runner:
//!
//! 1. [Validates](job::validate) the description into an immutable [`JobConfig`].
//! 1. [Stages](input::resolve) the input FASTA from inline data, a local file, or a workspace
//!    object, and sanitizes its headers.
//! 1. Optionally [splits](split::split) the input into one FASTA per influenza segment.
//! 1. [Plans](plan) and runs the dataset preparation and detection tools.
//!
//! Tree inference and reassortment detection themselves are delegated to those tools.

pub mod cli;
pub mod error;
pub mod input;
pub mod job;
pub mod plan;
pub mod run;
pub mod sequence;
pub mod split;
pub mod utils;

#[doc(inline)]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::job::{validate, JobConfig, JobRecord};
#[doc(inline)]
pub use crate::run::run;
#[doc(inline)]
pub use utils::verbosity::Verbosity;
