//! Scan diagnostics
//!
//! Counters for understanding how subjects are consumed by the scanner.
//! Enabled via the NASCAN_DIAGNOSTICS environment variable; when disabled the
//! driver skips every counter update.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Check if diagnostics are enabled via environment variable
pub fn diagnostics_enabled() -> bool {
    std::env::var("NASCAN_DIAGNOSTICS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Counters shared by every driver scanning with one sealed table.
#[derive(Default, Debug)]
pub struct ScanDiagnosticCounters {
    pub subjects: AtomicUsize,
    pub scan_calls: AtomicUsize,
    // calls that stopped before the end of the subject
    pub capacity_stops: AtomicUsize,
    pub hits: AtomicUsize,
    pub words_scanned: AtomicUsize,
    pub bases_scanned: AtomicUsize,
}

impl ScanDiagnosticCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one scan call over `[start_offset, end_offset)`.
    pub fn record_call(
        &self,
        start_offset: usize,
        end_offset: usize,
        scan_step: usize,
        hits: usize,
        stopped_early: bool,
    ) {
        self.scan_calls.fetch_add(1, AtomicOrdering::Relaxed);
        self.hits.fetch_add(hits, AtomicOrdering::Relaxed);
        let bases = end_offset.saturating_sub(start_offset);
        self.bases_scanned.fetch_add(bases, AtomicOrdering::Relaxed);
        // a zero stride scans byte-aligned words
        let step = if scan_step == 0 { 4 } else { scan_step };
        self.words_scanned
            .fetch_add(bases.div_ceil(step), AtomicOrdering::Relaxed);
        if stopped_early {
            self.capacity_stops.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }

    pub fn record_subject(&self) {
        self.subjects.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn print_summary(&self, strategy: &str) {
        eprintln!("\n=== Subject Scan Diagnostics ===");
        eprintln!("Scan routine:                 {}", strategy);
        eprintln!(
            "  Subjects scanned:           {}",
            self.subjects.load(AtomicOrdering::Relaxed)
        );
        let calls = self.scan_calls.load(AtomicOrdering::Relaxed);
        eprintln!("  Scan calls:                 {}", calls);
        eprintln!(
            "  Capacity stops:             {}",
            self.capacity_stops.load(AtomicOrdering::Relaxed)
        );
        eprintln!(
            "  Bases covered:              {}",
            self.bases_scanned.load(AtomicOrdering::Relaxed)
        );
        eprintln!(
            "  Words scanned (approx):     {}",
            self.words_scanned.load(AtomicOrdering::Relaxed)
        );
        let hits = self.hits.load(AtomicOrdering::Relaxed);
        eprintln!("  Hits reported:              {}", hits);
        if calls > 0 {
            eprintln!(
                "  Hits per call:              {:.1}",
                hits as f64 / calls as f64
            );
        }
    }
}
