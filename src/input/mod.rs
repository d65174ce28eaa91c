//! Materialize the job's input FASTA on local disk and sanitize its headers.

use crate::error::{FetchFailure, InputError};
use crate::job::{InputSource, WORKSPACE_PREFIX};
use crate::plan::Invocation;

use log::{debug, info};
use std::path::{Path, PathBuf};
use treesort_segment::is_invalid_header_char;


/// File name of the staged input FASTA.
pub const INPUT_FASTA_FILE_NAME: &str = "input.fasta";

// ----------------------------------------------------------------------------
// Remote Fetch
// ----------------------------------------------------------------------------

/// Copies an object from the remote workspace to a local path.
pub trait RemoteFetch {
    /// Copy workspace object `id` (without its `ws:` prefix) to `destination`.
    fn fetch(&self, id: &str, destination: &Path) -> Result<(), FetchFailure>;
}

/// [`RemoteFetch`] through the workspace copy program (`p3-cp ws:<id> <destination>`).
#[derive(Clone, Debug, PartialEq)]
pub struct WorkspaceCopy {
    pub program: String,
}

impl Default for WorkspaceCopy {
    fn default() -> Self {
        WorkspaceCopy { program: "p3-cp".to_string() }
    }
}

impl RemoteFetch for WorkspaceCopy {
    fn fetch(&self, id: &str, destination: &Path) -> Result<(), FetchFailure> {
        let args = vec![format!("{WORKSPACE_PREFIX}{id}"), destination.display().to_string()];
        Invocation::new(&self.program, args).run()?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Resolve
// ----------------------------------------------------------------------------

/// Materialize the input FASTA in `dir` and sanitize its headers in place.
///
/// Returns the path of the local file, which for [`InputSource::LocalFile`] is the file
/// itself.
///
/// ## Examples
///
/// ```rust
/// use treesort_runner::input::{resolve, WorkspaceCopy};
/// use treesort_runner::job::InputSource;
///
/// let dir = tempfile::TempDir::new()?;
/// let input = InputSource::InlineData(">seq 1 (A)|HA|\nACGT\n".to_string());
/// let path = resolve(&input, dir.path(), &WorkspaceCopy::default())?;
/// assert_eq!(std::fs::read_to_string(path)?, ">seq_1_AHA\nACGT\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn resolve<F>(input: &InputSource, dir: &Path, fetch: &F) -> Result<PathBuf, InputError>
where
    F: RemoteFetch + ?Sized,
{
    let path = materialize(input, dir, fetch)?;
    sanitize_headers(&path)?;
    Ok(path)
}

/// Materialize the input FASTA in `dir` without modifying it.
///
/// The resulting file must exist and be non-empty.
pub fn materialize<F>(input: &InputSource, dir: &Path, fetch: &F) -> Result<PathBuf, InputError>
where
    F: RemoteFetch + ?Sized,
{
    let path = match input {
        InputSource::InlineData(data) => {
            let path = dir.join(INPUT_FASTA_FILE_NAME);
            info!("Writing input FASTA data: {path:?}");
            std::fs::write(&path, data).map_err(|source| InputError::Write {
                what: "input FASTA data".to_string(),
                path: path.clone(),
                source,
            })?;
            path
        }
        InputSource::LocalFile(path) => {
            info!("Using local input FASTA: {path:?}");
            if !path.is_file() {
                return Err(InputError::NotFound(path.clone()));
            }
            path.clone()
        }
        InputSource::RemoteFileId(id) => {
            let path = dir.join(INPUT_FASTA_FILE_NAME);
            info!("Fetching input FASTA {id:?} from the workspace: {path:?}");
            fetch.fetch(id, &path).map_err(|source| InputError::Fetch {
                id: id.clone(),
                path: path.clone(),
                source,
            })?;
            path
        }
    };

    match std::fs::metadata(&path) {
        Ok(metadata) if metadata.len() > 0 => Ok(path),
        _ => Err(InputError::EmptyFile(path)),
    }
}

// ----------------------------------------------------------------------------
// Sanitize
// ----------------------------------------------------------------------------

/// Rewrite a FASTA file with every header passed through [`sanitize_header`].
pub fn sanitize_headers(path: &Path) -> Result<(), InputError> {
    let input = std::fs::read_to_string(path)
        .map_err(|source| InputError::Read { path: path.to_path_buf(), source })?;
    let output = sanitize_fasta(&input);

    if output == input {
        debug!("Headers already sanitized: {path:?}");
        return Ok(());
    }
    std::fs::write(path, output).map_err(|source| InputError::Write {
        what: "sanitized FASTA".to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// Sanitize every header line of FASTA text. Sequence lines are returned unchanged.
///
/// ```rust
/// use treesort_runner::input::sanitize_fasta;
///
/// let fasta = ">A/duck (H5N1)|HA| \nAC GT\n>B:1|NA|";
/// assert_eq!(sanitize_fasta(fasta), ">A/duck_H5N1HA\nAC GT\n>B1NA\n");
/// ```
pub fn sanitize_fasta(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.starts_with('>') {
            output.push_str(&sanitize_header(line));
            output.push('\n');
        } else {
            output.push_str(line);
        }
    }
    output
}

/// Sanitize one FASTA header line, without its line terminator.
///
/// Trailing whitespace is stripped, invalid characters are removed, and remaining spaces
/// become underscores.
///
/// ```rust
/// use treesort_runner::input::sanitize_header;
///
/// assert_eq!(sanitize_header(">strain A,(B);test|HA|\n"), ">strain_ABtestHA");
/// assert_eq!(sanitize_header(">['x']: \"y\""), ">x_y");
/// ```
pub fn sanitize_header(line: &str) -> String {
    let header: String = line
        .trim_end()
        .chars()
        .filter(|c| !is_invalid_header_char(*c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    // removing characters can expose whitespace (e.g. a tab) at the end
    header.trim_end().to_string()
}
