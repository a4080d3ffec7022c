//! Error types for the fallible boundaries around the scanner.
//!
//! The scan routines themselves never fail; everything here is raised while
//! building, sealing or driving a table.

use thiserror::Error;

use crate::core::blast_nascan::ScanStrategy;

/// Errors raised when wrapping packed nucleotide data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// The byte buffer cannot hold `length` bases plus the trailing pad byte.
    #[error("packed buffer too short: {length} bases need {required} bytes, got {actual}")]
    BufferTooShort {
        length: usize,
        required: usize,
        actual: usize,
    },
    /// Hit offsets are `u32`, so longer subjects cannot be reported.
    #[error("subject of {length} bases exceeds the scannable limit of {max}")]
    SubjectTooLong { length: usize, max: usize },
}

/// Errors raised while building or sealing a lookup table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The table variant does not support this word length.
    #[error("word length {word_length} is outside {min}..={max} for this table")]
    UnsupportedWordLength {
        word_length: usize,
        min: usize,
        max: usize,
    },
    /// A zero stride is only meaningful for width-8 byte-aligned tables.
    #[error("scan step {scan_step} is not valid for word length {word_length}")]
    InvalidScanStep { word_length: usize, scan_step: usize },
    /// Compact tables store query offsets as 16-bit values.
    #[error("query of {length} bases exceeds the compact table limit of {max}")]
    QueryTooLong { length: usize, max: usize },
    /// Compact overflow cursors are stored as negative `i16` values.
    #[error("compact overflow of {size} entries exceeds the limit of {max}")]
    OverflowTooLarge { size: usize, max: usize },
    /// Both templates of a two-template table must have the same span and sampled-base count.
    #[error("second template {second} does not have the shape of {first}")]
    TemplateMismatch { first: String, second: String },
    /// A strategy was requested for a table it cannot scan.
    #[error("scan strategy {strategy:?} cannot scan this table")]
    StrategyNotApplicable { strategy: ScanStrategy },
}

/// Errors raised by the resumable scan driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The output buffer is smaller than the headroom the table reserves.
    #[error("output capacity {capacity} is below the required {required} hits")]
    CapacityTooSmall { capacity: usize, required: usize },
    /// A call consumed no subject positions and wrote no hits.
    #[error("scan made no progress at subject offset {offset}")]
    NoProgress { offset: usize },
}
