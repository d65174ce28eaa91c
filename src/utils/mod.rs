pub mod verbosity;

use color_eyre::eyre::{Report, Result, WrapErr};
use log::{debug, info};
use std::fmt::Debug;
use std::path::Path;

/// Create a directory (and its parents) if it does not exist yet.
///
/// ## Examples
///
/// ```rust
/// use treesort_runner::utils::create_dir;
///
/// let tmp = tempfile::TempDir::new()?;
/// let dir = tmp.path().join("work/segments");
/// create_dir(&dir)?;
/// create_dir(&dir)?;
/// assert!(dir.is_dir());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn create_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if path.as_ref().is_dir() {
        debug!("Directory already exists: {path:?}");
    } else {
        info!("Creating directory: {path:?}");
        std::fs::create_dir_all(path)
            .wrap_err_with(|| format!("Failed to create directory: {path:?}"))?;
    }
    Ok(())
}
