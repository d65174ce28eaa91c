//! Drive a job through validation, input staging, dataset preparation and detection.

use crate::input::{materialize, resolve, sanitize_headers, WorkspaceCopy, INPUT_FASTA_FILE_NAME};
use crate::job::{validate, InputSource, JobConfig, JobRecord};
use crate::plan::{plan_detect, plan_prepare, Invocation};
use crate::sequence::count_records;
use crate::split::{segment_path, split};
use crate::utils::create_dir;

use chrono::{DateTime, Local};
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use color_eyre::Help;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use treesort_segment::Segment;


/// File name of the run summary written to the working directory.
pub const SUMMARY_FILE_NAME: &str = "summary.json";

// ----------------------------------------------------------------------------
// Run Args
// ----------------------------------------------------------------------------

/// Run a TreeSort job.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
#[clap(verbatim_doc_comment)]
pub struct RunArgs {
    /// Job description (JSON).
    #[clap(short = 'j', long, required = true)]
    pub job: PathBuf,

    /// Directory for the staged input FASTA.
    ///
    /// If the directory does not exist, it will be created.
    #[clap(short = 'i', long, required = true)]
    pub input_dir: PathBuf,

    /// Working directory for the dataset, per-segment files and run summary.
    ///
    /// If the directory does not exist, it will be created.
    #[clap(short = 'w', long, required = true)]
    pub work_dir: PathBuf,

    /// Also write one FASTA per segment ({segment}-input.fasta) to the working directory.
    #[clap(long)]
    pub split_segments: bool,

    /// Log the planned commands without staging input or running any tool.
    #[clap(long)]
    pub dry_run: bool,

    /// Dataset preparation program.
    #[clap(long, default_value = "prepare_dataset.sh")]
    pub prepare_tool: String,

    /// Reassortment detection program.
    #[clap(long, default_value = "treesort")]
    pub detect_tool: String,

    /// Workspace copy program, used for fasta_file_id inputs.
    #[clap(long, default_value = "p3-cp")]
    pub fetch_tool: String,
}

// ----------------------------------------------------------------------------
// Run Summary
// ----------------------------------------------------------------------------

/// Provenance of one run.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub version: String,
    pub job: PathBuf,
    pub config: JobConfig,
    /// Staged input FASTA, absent when an existing dataset is used.
    pub input: Option<PathBuf>,
    /// Segments written by the splitter, in order of first appearance.
    pub segments: Vec<Segment>,
    pub prepare: Option<Invocation>,
    pub detect: Invocation,
    pub dry_run: bool,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
}

impl RunSummary {
    /// Write run summary to JSON file.
    pub fn write(&self, path: &Path) -> Result<(), Report> {
        let mut file =
            File::create(path).wrap_err_with(|| format!("Failed to create file: {path:?}"))?;
        let output = serde_json::to_string_pretty(self)
            .wrap_err_with(|| format!("Failed to parse: {self:?}"))?;
        file.write_all(format!("{}\n", output).as_bytes())
            .wrap_err_with(|| format!("Failed to write file: {path:?}"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Run
// ----------------------------------------------------------------------------

/// Run a job from its description file.
///
/// Stages run in order and the first failure stops the run. On success the [`RunSummary`]
/// is written to the working directory, except in a dry run, which touches nothing on disk.
pub fn run(args: &RunArgs) -> Result<RunSummary, Report> {
    let started = Local::now();

    info!("Reading job description: {:?}", &args.job);
    let record = JobRecord::read(&args.job)?;
    let config = validate(&record)
        .wrap_err_with(|| format!("Invalid job description: {:?}", &args.job))
        .suggestion("Run the validate subcommand to check a job description.")?;
    debug!("Job configuration: {config:?}");

    if !args.dry_run {
        create_dir(&args.input_dir)?;
        create_dir(&args.work_dir)?;
    }

    // ------------------------------------------------------------------------
    // Input and Dataset Preparation

    let mut input = None;
    let mut segments = Vec::new();
    let mut prepare = None;

    if let Some(source) = config.input_source() {
        let path = if args.dry_run {
            planned_input_path(source, &args.input_dir)
        } else {
            let (path, split_segments) = stage_input(source, &config, args)?;
            segments = split_segments;
            path
        };

        let invocation =
            Invocation::new(&args.prepare_tool, plan_prepare(&config, &path, &args.work_dir));
        execute(&invocation, args.dry_run)
            .wrap_err("Dataset preparation failed.")
            .suggestion("Check the output of the dataset preparation tool above.")?;

        input = Some(path);
        prepare = Some(invocation);
    } else if let Some(directory) = config.existing_dataset_directory() {
        info!("Using existing dataset: {directory:?}");
    }

    // ------------------------------------------------------------------------
    // Detection

    let detect = Invocation::new(&args.detect_tool, plan_detect(&config, &args.work_dir));
    execute(&detect, args.dry_run)
        .wrap_err("Reassortment detection failed.")
        .suggestion("Check the output of the detection tool above.")?;

    let summary = RunSummary {
        version: env!("CARGO_PKG_VERSION").to_string(),
        job: args.job.clone(),
        config,
        input,
        segments,
        prepare,
        detect,
        dry_run: args.dry_run,
        started,
        finished: Local::now(),
    };

    if !args.dry_run {
        let path = args.work_dir.join(SUMMARY_FILE_NAME);
        info!("Exporting summary: {path:?}");
        summary.write(&path)?;
    }

    info!("Done.");
    Ok(summary)
}

/// Materialize the input, optionally split it by segment, and sanitize the staged files.
///
/// Splitting reads the raw headers, since sanitizing removes the `|CODE|` delimiters.
fn stage_input(
    source: &InputSource,
    config: &JobConfig,
    args: &RunArgs,
) -> Result<(PathBuf, Vec<Segment>), Report> {
    let fetch = WorkspaceCopy { program: args.fetch_tool.clone() };

    if !args.split_segments {
        let path = resolve(source, &args.input_dir, &fetch)
            .wrap_err("Failed to prepare input FASTA.")
            .suggestion("Check the input_source fields of the job description.")?;
        return Ok((path, Vec::new()));
    }

    let path = materialize(source, &args.input_dir, &fetch)
        .wrap_err("Failed to prepare input FASTA.")
        .suggestion("Check the input_source fields of the job description.")?;
    let segments = split(&path, &args.work_dir).wrap_err("Failed to split input FASTA.")?;
    check_segments(config, &segments);

    sanitize_headers(&path).wrap_err("Failed to sanitize input FASTA.")?;
    for segment in &segments {
        let segment_file = segment_path(&args.work_dir, segment);
        sanitize_headers(&segment_file)
            .wrap_err_with(|| format!("Failed to sanitize segment {segment}."))?;
        let count = count_records(&segment_file)?;
        debug!("Segment {segment}: {count} sequence(s)");
    }

    Ok((path, segments))
}

/// Warn about segments the job relies on that the input does not contain.
fn check_segments(config: &JobConfig, found: &[Segment]) {
    if found.is_empty() {
        warn!("No sequence header names a segment as |CODE|, no segment files were written.");
        return;
    }
    if !found.contains(&config.reference_segment) {
        warn!("Reference segment {} was not found in the input.", config.reference_segment);
    }
    for segment in config.segments.iter().filter(|segment| !found.contains(*segment)) {
        warn!("Requested segment {segment} was not found in the input.");
    }
}

/// Where the staged input would be written, without staging it.
fn planned_input_path(source: &InputSource, input_dir: &Path) -> PathBuf {
    match source {
        InputSource::LocalFile(path) => path.clone(),
        InputSource::InlineData(_) | InputSource::RemoteFileId(_) => {
            input_dir.join(INPUT_FASTA_FILE_NAME)
        }
    }
}

fn execute(invocation: &Invocation, dry_run: bool) -> Result<(), Report> {
    if dry_run {
        info!("Dry run: {invocation}");
        return Ok(());
    }
    invocation.run()?;
    Ok(())
}
