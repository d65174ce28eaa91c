//! Catalog of influenza genome [`Segment`]s and the FASTA header conventions built on them.
//!
//! The catalog is closed: the eight segments are the only valid codes, and their declaration
//! order is the search order used when a header mentions more than one of them.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};


/// Characters removed from FASTA headers during sanitization.
///
/// ```rust
/// use treesort_segment::INVALID_HEADER_CHARS;
/// assert!(INVALID_HEADER_CHARS.contains(&'|'));
/// assert!(!INVALID_HEADER_CHARS.contains(&'_'));
/// ```
pub const INVALID_HEADER_CHARS: &[char] = &['[', ']', '\'', '"', '(', ')', ',', ';', ':', '|'];

// ----------------------------------------------------------------------------
// Segment
// ----------------------------------------------------------------------------

/// One of the eight genomic RNA segments of an influenza virus.
///
/// ## Examples
///
/// ```rust
/// use treesort_segment::Segment;
/// use std::str::FromStr;
///
/// assert_eq!(Segment::from_str("NA").unwrap(), Segment::NA);
/// assert_eq!(Segment::PB2.to_string(), "PB2");
/// assert!(Segment::from_str("XX").is_err());
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub enum Segment {
    /// Polymerase basic 2
    PB2,
    /// Polymerase basic 1
    PB1,
    /// Polymerase acidic
    PA,
    /// Hemagglutinin
    HA,
    /// Nucleoprotein
    NP,
    /// Neuraminidase
    NA,
    /// Matrix
    MP,
    /// Non-structural
    NS,
}

impl Segment {
    /// The reference segment used when a job does not choose one.
    pub const DEFAULT_REFERENCE: Segment = Segment::HA;

    /// Returns every [`Segment`] in catalog order.
    ///
    /// ```rust
    /// use treesort_segment::Segment;
    /// let codes: Vec<String> = Segment::catalog().map(|s| s.to_string()).collect();
    /// assert_eq!(codes, ["PB2", "PB1", "PA", "HA", "NP", "NA", "MP", "NS"]);
    /// ```
    pub fn catalog() -> impl Iterator<Item = Segment> {
        Segment::iter()
    }

    /// Returns the first catalog [`Segment`] tagged in a FASTA header as `|CODE|`.
    ///
    /// Matching ignores case. Catalog order decides when a header carries several codes.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use treesort_segment::Segment;
    ///
    /// assert_eq!(Segment::from_header(">A/duck/1/2020|ha|H5N1"), Some(Segment::HA));
    /// assert_eq!(Segment::from_header(">x|NA|y|PB2|"), Some(Segment::PB2));
    /// assert_eq!(Segment::from_header(">A/duck/1/2020 HA"), None);
    /// ```
    pub fn from_header(header: &str) -> Option<Segment> {
        let header = header.to_ascii_uppercase();
        Segment::catalog().find(|segment| header.contains(&format!("|{segment}|")))
    }
}

/// Returns true if `c` is removed from FASTA headers during sanitization.
pub fn is_invalid_header_char(c: char) -> bool {
    INVALID_HEADER_CHARS.contains(&c)
}
