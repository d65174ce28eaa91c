//! Partition a multi-segment FASTA file into one file per genomic segment.

use crate::error::InputError;

use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use treesort_segment::Segment;


/// Returns the file name of a segment's FASTA (ex. `HA-input.fasta`).
///
/// ```rust
/// use treesort_runner::split::segment_file_name;
/// use treesort_segment::Segment;
///
/// assert_eq!(segment_file_name(&Segment::NA), "NA-input.fasta");
/// ```
pub fn segment_file_name(segment: &Segment) -> String {
    format!("{segment}-input.fasta")
}

/// Returns the path of a segment's FASTA inside `dir`.
pub fn segment_path(dir: &Path, segment: &Segment) -> PathBuf {
    dir.join(segment_file_name(segment))
}

/// Split a FASTA file by the `|CODE|` segment token in each header.
///
/// A header selects the first catalog segment whose token it contains (case-insensitive),
/// and every following line up to the next header belongs to that segment. Records whose
/// header names no segment are dropped.
///
/// Each segment with content is appended to `{segment}-input.fasta` in `dir`. Returns the
/// segments written, in order of first appearance.
///
/// ## Examples
///
/// ```rust
/// use treesort_runner::split::split;
/// use treesort_segment::Segment;
///
/// let dir = tempfile::TempDir::new()?;
/// let input = dir.path().join("input.fasta");
/// std::fs::write(&input, ">a|na|\nAC\n>b\nGG\n>c|HA|\nTT\n")?;
///
/// let segments = split(&input, dir.path())?;
/// assert_eq!(segments, [Segment::NA, Segment::HA]);
/// assert_eq!(std::fs::read_to_string(dir.path().join("NA-input.fasta"))?, ">a|na|\nAC\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn split(path: &Path, dir: &Path) -> Result<Vec<Segment>, InputError> {
    info!("Splitting {path:?} by segment into: {dir:?}");

    let file = File::open(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => InputError::NotFound(path.to_path_buf()),
        _ => InputError::Read { path: path.to_path_buf(), source },
    })?;

    let mut seen: Vec<Segment> = Vec::new();
    let mut buffers: BTreeMap<Segment, String> = BTreeMap::new();
    let mut cursor: Option<Segment> = None;
    let mut dropped = 0;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| InputError::Read { path: path.to_path_buf(), source })?;

        let line = if line.starts_with('>') {
            cursor = Segment::from_header(&line);
            match cursor {
                Some(segment) if !seen.contains(&segment) => seen.push(segment),
                Some(_) => (),
                None => dropped += 1,
            }
            line.trim_end().to_string()
        } else {
            line
        };

        if let Some(segment) = cursor {
            let buffer = buffers.entry(segment).or_default();
            buffer.push_str(&line);
            buffer.push('\n');
        }
    }

    if dropped > 0 {
        warn!("{dropped} record(s) with no recognized segment were dropped: {path:?}");
    }

    let mut written = Vec::new();
    for segment in seen {
        let content = buffers.remove(&segment).unwrap_or_default();
        if content.trim().is_empty() {
            warn!("Segment {segment} has no content, skipping.");
            continue;
        }

        let output = segment_path(dir, &segment);
        debug!("Writing segment {segment}: {output:?}");
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&output)
            .and_then(|mut file| file.write_all(content.as_bytes()))
            .map_err(|source| InputError::Write {
                what: format!("segment {segment}"),
                path: output.clone(),
                source,
            })?;
        written.push(segment);
    }

    Ok(written)
}
