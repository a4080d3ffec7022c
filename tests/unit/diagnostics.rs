//! Unit tests for core/blast_diagnostics.rs

use nascan::api::ScanDriver;
use nascan::core::blast_diagnostics::{diagnostics_enabled, ScanDiagnosticCounters};
use nascan::core::blast_encoding::PackedSequence;
use nascan::core::blast_nalookup::{LookupTableWrap, SmallNaLookupTable};
use std::env;
use std::sync::atomic::Ordering;

#[test]
fn test_diagnostics_enabled() {
    env::remove_var("NASCAN_DIAGNOSTICS");
    assert!(!diagnostics_enabled());

    env::set_var("NASCAN_DIAGNOSTICS", "1");
    assert!(diagnostics_enabled());

    env::set_var("NASCAN_DIAGNOSTICS", "TRUE");
    assert!(diagnostics_enabled());

    env::set_var("NASCAN_DIAGNOSTICS", "0");
    assert!(!diagnostics_enabled());

    env::remove_var("NASCAN_DIAGNOSTICS");
}

#[test]
fn test_driver_counts_calls_and_capacity_stops() {
    // three AAAA words in the query, three hits per subject word
    let table = SmallNaLookupTable::build(b"AAAAAA", 4, 1).unwrap();
    let wrap = LookupTableWrap::new(table);
    let subject = PackedSequence::from_iupac(b"AAAAAAA");
    let counters = ScanDiagnosticCounters::new();

    let mut driver = ScanDriver::new(&wrap, 4).unwrap().with_diagnostics(&counters);
    let hits = driver.collect(&wrap, &subject.view()).unwrap();

    // four subject words, one per call
    assert_eq!(hits.len(), 12);
    assert_eq!(counters.subjects.load(Ordering::Relaxed), 1);
    assert_eq!(counters.scan_calls.load(Ordering::Relaxed), 4);
    assert_eq!(counters.capacity_stops.load(Ordering::Relaxed), 3);
    assert_eq!(counters.hits.load(Ordering::Relaxed), 12);
    assert_eq!(counters.bases_scanned.load(Ordering::Relaxed), 4);
}

#[test]
fn test_default_counters_are_zero() {
    let counters = ScanDiagnosticCounters::default();
    assert_eq!(counters.scan_calls.load(Ordering::Relaxed), 0);
    assert_eq!(counters.hits.load(Ordering::Relaxed), 0);
    counters.print_summary("small_na_scan_4_1");
}
