//! Argument lists for the external dataset preparation and detection tools.
//!
//! Planning is pure: it turns a [`JobConfig`] into ordered tokens and never runs anything.
//! [`Invocation::run`] is the only place a planned command is executed.

use crate::error::ToolError;
use crate::job::{InferenceType, JobConfig, MatchMode};

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;
use strum::Display as StrumDisplay;


/// File name of the dataset descriptor written by dataset preparation.
pub const DESCRIPTOR_FILE_NAME: &str = "descriptor.csv";

/// Flags understood by the dataset preparation script and the detection tool.
#[derive(Clone, Copy, Debug, PartialEq, StrumDisplay)]
pub enum ScriptOption {
    #[strum(serialize = "--clades")]
    CladesPath,
    #[strum(serialize = "-i")]
    DescriptorPath,
    #[strum(serialize = "--equal-rates")]
    EqualRates,
    #[strum(serialize = "--fast")]
    FastTree,
    #[strum(serialize = "--timetree")]
    IsTimeScaled,
    #[strum(serialize = "--match-on-epi")]
    MatchOnEpi,
    #[strum(serialize = "--match-on-regex")]
    MatchOnRegex,
    #[strum(serialize = "--match-on-strain")]
    MatchOnStrain,
    #[strum(serialize = "--no-collapse")]
    NoCollapse,
    #[strum(serialize = "-o")]
    OutputPath,
    #[strum(serialize = "--segments")]
    Segments,
}

// ----------------------------------------------------------------------------
// Planning
// ----------------------------------------------------------------------------

/// Returns the arguments of the dataset preparation tool.
///
/// Order: `[--fast]`, `[--segments A,B]`, input path, reference segment, working directory.
///
/// ## Examples
///
/// ```rust
/// use treesort_runner::job::{validate, JobRecord};
/// use treesort_runner::plan::plan_prepare;
/// use std::path::Path;
///
/// let record = JobRecord {
///     input_source: Some("fasta_file".into()),
///     input_fasta_file: Some("flu.fasta".into()),
///     method: Some("local".into()),
///     inference_type: Some("FastTree".into()),
///     segments: Some("HA,NA".into()),
///     output_path: Some("out".into()),
///     ..Default::default()
/// };
/// let config = validate(&record)?;
/// let args = plan_prepare(&config, Path::new("flu.fasta"), Path::new("work"));
/// assert_eq!(args, ["--fast", "--segments", "HA,NA", "flu.fasta", "HA", "work"]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn plan_prepare(config: &JobConfig, input: &Path, work_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();

    if config.inference_type == InferenceType::FastTree {
        args.push(ScriptOption::FastTree.to_string());
    }

    if !config.segments.is_empty() {
        args.push(ScriptOption::Segments.to_string());
        args.push(config.segments.iter().join(","));
    }

    args.push(input.display().to_string());
    args.push(config.reference_segment.to_string());
    args.push(work_dir.display().to_string());

    args
}

/// Returns the arguments of the detection tool.
///
/// Order: `[--clades path]`, `-i descriptor`, `[match mode]`, `[--no-collapse]`,
/// `-o output`, `[--equal-rates]`, `[--timetree]`.
pub fn plan_detect(config: &JobConfig, work_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(clades_path) = &config.clades_path {
        args.push(ScriptOption::CladesPath.to_string());
        args.push(clades_path.display().to_string());
    }

    args.push(ScriptOption::DescriptorPath.to_string());
    args.push(descriptor_path(config, work_dir).display().to_string());

    match &config.match_mode {
        MatchMode::ByStrainName => args.push(ScriptOption::MatchOnStrain.to_string()),
        MatchMode::ByEpiId => args.push(ScriptOption::MatchOnEpi.to_string()),
        MatchMode::ByRegex(pattern) => {
            args.push(ScriptOption::MatchOnRegex.to_string());
            args.push(pattern.clone());
        }
        MatchMode::None => (),
    }

    if config.no_collapse {
        args.push(ScriptOption::NoCollapse.to_string());
    }

    args.push(ScriptOption::OutputPath.to_string());
    args.push(config.output_path.display().to_string());

    if config.equal_rates {
        args.push(ScriptOption::EqualRates.to_string());
    }
    if config.is_time_scaled {
        args.push(ScriptOption::IsTimeScaled.to_string());
    }

    args
}

/// Returns the descriptor file the detection tool reads.
///
/// An explicit `descriptor_path` wins. Otherwise the descriptor sits in the existing dataset
/// directory, or in the working directory when the dataset is prepared by this run.
pub fn descriptor_path(config: &JobConfig, work_dir: &Path) -> PathBuf {
    match (&config.descriptor_path, config.existing_dataset_directory()) {
        (Some(path), _) => path.clone(),
        (None, Some(directory)) => directory.join(DESCRIPTOR_FILE_NAME),
        (None, None) => work_dir.join(DESCRIPTOR_FILE_NAME),
    }
}

// ----------------------------------------------------------------------------
// Invocation
// ----------------------------------------------------------------------------

/// An external program and its planned arguments.
///
/// ```rust
/// use treesort_runner::plan::Invocation;
///
/// let invocation = Invocation::new("treesort", vec!["-i".into(), "descriptor.csv".into()]);
/// assert_eq!(invocation.to_string(), "treesort -i descriptor.csv");
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Display for Invocation {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", std::iter::once(&self.program).chain(&self.args).join(" "))
    }
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Invocation { program: program.into(), args }
    }

    /// Run the program to completion, inheriting stdio. A non-zero exit is an error.
    pub fn run(&self) -> Result<(), ToolError> {
        info!("Running: {self}");
        let status = Command::new(&self.program).args(&self.args).status().map_err(|source| {
            ToolError::Spawn { tool: self.program.clone(), source }
        })?;

        if !status.success() {
            return Err(ToolError::Failed { tool: self.program.clone(), code: status.code() });
        }
        Ok(())
    }
}
