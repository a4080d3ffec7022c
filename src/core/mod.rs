//! BLAST Core: nucleotide word scanning
//!
//! Reference: ncbi-blast/c++/src/algo/blast/core/
//!
//! # Structure
//!
//! - **Encoding** (`blast_encoding`)
//!   - 2-bit packed subjects and the borrowed view scanned by the routines
//!
//! - **Lookup Tables** (`blast_lookup`, `blast_nalookup`)
//!   - Presence-vector primitives and offset pairs
//!   - Standard, compact and hashed nucleotide tables
//!   - Discontiguous templates and sealing with a scan routine
//!
//! - **Scanning** (`blast_nascan`)
//!   - Routine selection and the specialized subject scanners
//!
//! - **Diagnostics** (`blast_diagnostics`)

// Utilities
pub mod blast_encoding;

// Lookup Tables
pub mod blast_lookup;
pub mod blast_nalookup;

// Scanning
pub mod blast_nascan;

// Diagnostics
pub mod blast_diagnostics;
