//! Parsing and validation of a TreeSort job description into a [`JobConfig`].
//!
//! A job arrives as a flat JSON object ([`JobRecord`]) in which every field is optional and
//! untyped. [`validate`] checks it once and produces an immutable [`JobConfig`]; nothing
//! downstream looks at the raw record again.

use crate::error::ValidationError;

use color_eyre::eyre::{Report, Result, WrapErr};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use treesort_segment::Segment;

#[cfg(test)]
mod tests;

/// Prefix marking a path or object identifier in the remote workspace.
pub const WORKSPACE_PREFIX: &str = "ws:";

// ----------------------------------------------------------------------------
// Job Record
// ----------------------------------------------------------------------------

/// The job description exactly as submitted (`jobdesc.json`).
///
/// Every field is optional, `null` is treated as absent, and unknown fields are ignored.
///
/// ## Examples
///
/// ```rust
/// use treesort_runner::job::JobRecord;
///
/// let record: JobRecord = serde_json::from_str(r#"{"method": "local", "extra": 1}"#)?;
/// assert_eq!(record.method.as_deref(), Some("local"));
/// assert_eq!(record.output_path, None);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct JobRecord {
    pub input_source: Option<String>,
    pub input_fasta_data: Option<String>,
    pub input_fasta_file: Option<String>,
    pub input_fasta_file_id: Option<String>,
    pub input_existing_directory: Option<String>,
    pub prepare_dataset: Option<bool>,
    pub method: Option<String>,
    #[serde(alias = "ref_tree_inference")]
    pub inference_type: Option<String>,
    pub ref_segment: Option<String>,
    /// Comma-separated segment codes.
    pub segments: Option<String>,
    pub match_on_strain: Option<bool>,
    pub match_on_epi: Option<bool>,
    pub match_on_regex: Option<String>,
    pub no_collapse: Option<bool>,
    pub equal_rates: Option<bool>,
    pub is_time_scaled: Option<bool>,
    pub deviation: Option<f64>,
    pub p_value: Option<f64>,
    pub output_path: Option<String>,
    pub clades_path: Option<String>,
    pub descriptor_path: Option<String>,
}

impl JobRecord {
    /// Reads a [`JobRecord`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<JobRecord, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read job description: {path:?}"))?;
        let record = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize job description: {path:?}"))?;
        Ok(record)
    }
}

// ----------------------------------------------------------------------------
// Enumerations
// ----------------------------------------------------------------------------

/// Raw `input_source` discriminator of a [`JobRecord`].
#[derive(Clone, Copy, Debug, EnumIter, EnumString, PartialEq, StrumDisplay)]
pub enum InputSourceKind {
    #[strum(serialize = "fasta_data")]
    FastaData,
    #[strum(serialize = "fasta_file")]
    FastaFile,
    #[strum(serialize = "fasta_file_id")]
    FastaFileId,
    /// A dataset prepared by an earlier run, see [`DatasetSource::Existing`].
    #[strum(serialize = "prepared_files")]
    PreparedFiles,
}

/// Where the input FASTA sequences come from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum InputSource {
    /// FASTA text submitted with the job.
    InlineData(String),
    /// FASTA file already on the local filesystem.
    LocalFile(PathBuf),
    /// Workspace object identifier, stored without its `ws:` prefix.
    RemoteFileId(String),
}

/// Reassortment detection algorithm.
#[derive(Clone, Copy, Debug, EnumIter, EnumString, PartialEq, Serialize, StrumDisplay)]
pub enum Method {
    #[strum(serialize = "local")]
    #[serde(rename = "local")]
    Local,
    #[strum(serialize = "mincut")]
    #[serde(rename = "mincut")]
    MinCut,
}

/// Tree-building engine used while preparing the dataset.
#[derive(Clone, Copy, Debug, Default, EnumIter, EnumString, PartialEq, Serialize, StrumDisplay)]
pub enum InferenceType {
    #[strum(serialize = "FastTree")]
    #[serde(rename = "FastTree")]
    FastTree,
    #[default]
    #[strum(serialize = "IQ-Tree")]
    #[serde(rename = "IQ-Tree")]
    IqTree,
}

/// How the detection tool matches sequence names across segments.
///
/// The raw record carries three independent flags; only one survives, with priority
/// strain name > EPI identifier > regular expression.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub enum MatchMode {
    #[default]
    None,
    ByStrainName,
    ByEpiId,
    ByRegex(String),
}

impl MatchMode {
    /// Selects the [`MatchMode`] from the raw flags. Later flags are ignored once one wins.
    ///
    /// ```rust
    /// use treesort_runner::job::MatchMode;
    ///
    /// assert_eq!(MatchMode::from_flags(true, true, Some("x")), MatchMode::ByStrainName);
    /// assert_eq!(MatchMode::from_flags(false, true, Some("x")), MatchMode::ByEpiId);
    /// let regex = MatchMode::from_flags(false, false, Some("^A"));
    /// assert_eq!(regex, MatchMode::ByRegex("^A".into()));
    /// assert_eq!(MatchMode::from_flags(false, false, Some("")), MatchMode::None);
    /// ```
    pub fn from_flags(strain: bool, epi: bool, regex: Option<&str>) -> Self {
        if strain {
            MatchMode::ByStrainName
        } else if epi {
            MatchMode::ByEpiId
        } else {
            match regex.filter(|pattern| !pattern.is_empty()) {
                Some(pattern) => MatchMode::ByRegex(pattern.to_string()),
                None => MatchMode::None,
            }
        }
    }
}

/// Whether the run builds its dataset from input sequences or reuses a prepared one.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DatasetSource {
    /// Stage the input, then run dataset preparation before detection.
    Prepare(InputSource),
    /// Directory holding the output of an earlier dataset preparation.
    Existing(PathBuf),
}

// ----------------------------------------------------------------------------
// Job Config
// ----------------------------------------------------------------------------

/// A validated job. Construct with [`validate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JobConfig {
    pub dataset: DatasetSource,
    pub method: Method,
    pub inference_type: InferenceType,
    pub reference_segment: Segment,
    /// Segments to process, in submitted order. Empty means all.
    pub segments: Vec<Segment>,
    pub match_mode: MatchMode,
    pub no_collapse: bool,
    pub equal_rates: bool,
    pub is_time_scaled: bool,
    pub deviation: Option<f64>,
    pub p_value: Option<f64>,
    pub output_path: PathBuf,
    pub clades_path: Option<PathBuf>,
    pub descriptor_path: Option<PathBuf>,
}

impl JobConfig {
    pub fn prepare_dataset(&self) -> bool {
        matches!(self.dataset, DatasetSource::Prepare(_))
    }

    pub fn input_source(&self) -> Option<&InputSource> {
        match &self.dataset {
            DatasetSource::Prepare(input) => Some(input),
            DatasetSource::Existing(_) => None,
        }
    }

    pub fn existing_dataset_directory(&self) -> Option<&Path> {
        match &self.dataset {
            DatasetSource::Prepare(_) => None,
            DatasetSource::Existing(directory) => Some(directory),
        }
    }
}

// ----------------------------------------------------------------------------
// Validation
// ----------------------------------------------------------------------------

/// Validates a [`JobRecord`], returning the first rule it violates.
///
/// Rules are checked in order: input source, dataset preparation, method, inference type,
/// output path, reference segment, segment list.
///
/// ## Examples
///
/// ```rust
/// use treesort_runner::job::{validate, JobRecord, Method};
/// use treesort_segment::Segment;
///
/// let record = JobRecord {
///     input_source: Some("fasta_file_id".into()),
///     input_fasta_file_id: Some("ws:/user@bvbrc/home/flu.fasta".into()),
///     method: Some("mincut".into()),
///     output_path: Some("/out".into()),
///     ..Default::default()
/// };
/// let config = validate(&record)?;
/// assert_eq!(config.method, Method::MinCut);
/// assert_eq!(config.reference_segment, Segment::HA);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn validate(record: &JobRecord) -> Result<JobConfig, ValidationError> {
    let prepare_dataset = record.prepare_dataset.unwrap_or(true);

    // Input source: the discriminator must be present and known in either mode
    let kind =
        trimmed(&record.input_source).ok_or(ValidationError::MissingField("input_source"))?;
    let kind = parse_enum::<InputSourceKind>("input_source", kind)?;
    let incompatible = || ValidationError::IncompatibleInputSource {
        source_name: kind.to_string(),
        prepare_dataset,
    };

    // Dataset preparation: only prepared_files goes with an existing dataset
    let dataset = if prepare_dataset {
        let input = input_source(kind, record)?.ok_or_else(incompatible)?;
        DatasetSource::Prepare(input)
    } else {
        if kind != InputSourceKind::PreparedFiles {
            return Err(incompatible());
        }
        let directory = trimmed(&record.input_existing_directory)
            .map(strip_workspace_prefix)
            .filter(|directory| !directory.is_empty())
            .ok_or(ValidationError::MissingField("input_existing_directory"))?;
        DatasetSource::Existing(PathBuf::from(directory))
    };

    let method = trimmed(&record.method).ok_or(ValidationError::MissingField("method"))?;
    let method = parse_enum::<Method>("method", method)?;

    let inference_type = match trimmed(&record.inference_type) {
        Some(value) => parse_enum::<InferenceType>("inference_type", value)?,
        None => InferenceType::default(),
    };

    let output_path =
        trimmed(&record.output_path).ok_or(ValidationError::MissingField("output_path"))?;

    let reference_segment = match trimmed(&record.ref_segment) {
        Some(code) => parse_segment(code)?,
        None => Segment::DEFAULT_REFERENCE,
    };

    let segments = match trimmed(&record.segments) {
        Some(codes) => codes
            .split(',')
            .map(|code| parse_segment(code.trim()))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unique()
            .collect(),
        None => Vec::new(),
    };

    let match_mode = MatchMode::from_flags(
        record.match_on_strain.unwrap_or(false),
        record.match_on_epi.unwrap_or(false),
        trimmed(&record.match_on_regex),
    );

    Ok(JobConfig {
        dataset,
        method,
        inference_type,
        reference_segment,
        segments,
        match_mode,
        no_collapse: record.no_collapse.unwrap_or(false),
        equal_rates: record.equal_rates.unwrap_or(false),
        is_time_scaled: record.is_time_scaled.unwrap_or(false),
        deviation: record.deviation,
        p_value: record.p_value,
        output_path: PathBuf::from(output_path),
        clades_path: trimmed(&record.clades_path).map(PathBuf::from),
        descriptor_path: trimmed(&record.descriptor_path).map(PathBuf::from),
    })
}

/// Builds the [`InputSource`] named by `kind`, requiring its payload field.
fn input_source(
    kind: InputSourceKind,
    record: &JobRecord,
) -> Result<Option<InputSource>, ValidationError> {
    let input = match kind {
        InputSourceKind::FastaData => {
            // payload is kept verbatim, only checked for content
            let data = record
                .input_fasta_data
                .as_ref()
                .filter(|data| !data.trim().is_empty())
                .ok_or(ValidationError::MissingField("input_fasta_data"))?;
            InputSource::InlineData(data.clone())
        }
        InputSourceKind::FastaFile => {
            let path = trimmed(&record.input_fasta_file)
                .ok_or(ValidationError::MissingField("input_fasta_file"))?;
            InputSource::LocalFile(PathBuf::from(path))
        }
        InputSourceKind::FastaFileId => {
            let id = trimmed(&record.input_fasta_file_id)
                .map(strip_workspace_prefix)
                .filter(|id| !id.is_empty())
                .ok_or(ValidationError::MissingField("input_fasta_file_id"))?;
            InputSource::RemoteFileId(id.to_string())
        }
        InputSourceKind::PreparedFiles => return Ok(None),
    };
    Ok(Some(input))
}

/// Removes exactly one leading `ws:` marker.
///
/// ```rust
/// use treesort_runner::job::strip_workspace_prefix;
/// assert_eq!(strip_workspace_prefix("ws:/home/a.fasta"), "/home/a.fasta");
/// assert_eq!(strip_workspace_prefix("ws:ws:x"), "ws:x");
/// assert_eq!(strip_workspace_prefix("/home/a.fasta"), "/home/a.fasta");
/// ```
pub fn strip_workspace_prefix(value: &str) -> &str {
    value.strip_prefix(WORKSPACE_PREFIX).unwrap_or(value)
}

/// Returns the trimmed value, or [`None`] if absent or blank.
fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_segment(code: &str) -> Result<Segment, ValidationError> {
    Segment::from_str(code).map_err(|_| ValidationError::InvalidSegment(code.to_string()))
}

fn parse_enum<T>(field: &'static str, value: &str) -> Result<T, ValidationError>
where
    T: FromStr + IntoEnumIterator + Display,
{
    T::from_str(value).map_err(|_| ValidationError::InvalidEnumValue {
        field,
        value: value.to_string(),
        expected: T::iter().join(", "),
    })
}
