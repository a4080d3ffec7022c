//! BLAST API Layer
//!
//! Reference: ncbi-blast/c++/src/algo/blast/api/
//!
//! High-level entry points over the core scanner.
//!
//! # Structure
//!
//! - `scan_driver` - Resumable whole-subject scanning with a bounded buffer
//! - `local_scan` - FASTA in, parallel scan, TSV out (the `nascan` commands)

pub mod local_scan;
pub mod scan_driver;

pub use local_scan::{run_scan, run_select};
pub use scan_driver::{min_offset_array_size, ScanDriver, DEFAULT_OFFSET_ARRAY_SIZE};
