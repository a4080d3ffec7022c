//! BLAST Input Handling
//!
//! Reference: ncbi-blast/c++/src/algo/blast/blastinput/
//!
//! Command-line argument structs for the `nascan` binary.
//!
//! # Structure
//!
//! - `nascan_args` - Table shape, scan and output arguments

pub mod nascan_args;

pub use nascan_args::{ScanArgs, SelectArgs, TableArgs, TableKindArg};
