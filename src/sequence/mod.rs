//! FASTA record inspection.

use color_eyre::eyre::{Report, Result, WrapErr};
use noodles::fasta;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open a FASTA file for record-wise reading.
pub fn get_reader<P>(path: &P) -> Result<fasta::Reader<BufReader<File>>, Report>
where
    P: AsRef<Path> + Debug,
{
    let reader = File::open(path)
        .map(BufReader::new)
        .map(fasta::Reader::new)
        .wrap_err_with(|| format!("Failed to read: {path:?}"))?;
    Ok(reader)
}

/// Count the records of a FASTA file.
///
/// ## Examples
///
/// ```rust
/// use treesort_runner::sequence::count_records;
///
/// let dir = tempfile::TempDir::new()?;
/// let path = dir.path().join("HA-input.fasta");
/// std::fs::write(&path, ">a|HA|\nACGT\n>b|HA|\nAC\nGT\n")?;
/// assert_eq!(count_records(&path)?, 2);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn count_records<P>(path: &P) -> Result<usize, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut reader = get_reader(path)?;
    let mut count = 0;
    for result in reader.records() {
        result.wrap_err_with(|| format!("Failed to parse FASTA record: {path:?}"))?;
        count += 1;
    }
    Ok(count)
}
