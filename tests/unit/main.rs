//! Integration tests for nascan
//!
//! Tests are organized by area:
//! - `lookup` - Reference index builders
//! - `selector` - Routine selection and sealing
//! - `scenarios` - Hand-built tables with known answers
//! - `scan_equivalence` - Every applicable routine against a reference scan
//! - `resume` - Split windows and tight buffers
//! - `diagnostics`, `args`, `local_scan` - Ambient pieces

mod diagnostics;
mod helpers;
mod lookup;
mod resume;
mod scan_equivalence;
mod scenarios;
mod selector;
