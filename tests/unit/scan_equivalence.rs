//! Every applicable routine against the position-by-position reference scan
//!
//! Each table shape is sealed with every strategy that can scan it, not just
//! the one the selector picks, and driven over seeded random subjects.

use nascan::api::{min_offset_array_size, ScanDriver};
use nascan::core::blast_encoding::PackedSequence;
use nascan::core::blast_lookup::OffsetPair;
use nascan::core::blast_nalookup::{LookupTable, LookupTableWrap};
use nascan::core::blast_nascan::ScanStrategy;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::helpers::{
    describe, disc_shapes, mb_shapes, na_shapes, planted_subject, random_query, reference_hits,
    Shape,
};

const SUBJECT_LENGTHS: [usize; 20] = [
    0, 3, 7, 8, 9, 11, 12, 15, 16, 17, 18, 21, 22, 23, 40, 63, 64, 65, 131, 257,
];

struct Fixture {
    query: Vec<u8>,
    subjects: Vec<PackedSequence>,
}

fn fixture(seed: u64) -> Fixture {
    let mut rng = SmallRng::seed_from_u64(seed);
    let query = random_query(&mut rng, 200);
    let subjects = SUBJECT_LENGTHS
        .iter()
        .map(|&len| PackedSequence::from_iupac(&planted_subject(&mut rng, &query, len)))
        .collect();
    Fixture { query, subjects }
}

fn applicable(table: &LookupTable) -> Vec<ScanStrategy> {
    ScanStrategy::ALL
        .into_iter()
        .filter(|s| s.is_applicable(table))
        .collect()
}

/// Drive every applicable routine with a roomy buffer and with the smallest
/// buffer the table allows.
fn check_shapes(shapes: &[Shape], seed: u64) {
    let fixture = fixture(seed);
    for &shape in shapes {
        let table = shape.build(&fixture.query);
        let expected: Vec<Vec<OffsetPair>> = fixture
            .subjects
            .iter()
            .map(|subject| reference_hits(&table, subject))
            .collect();
        let strategies = applicable(&table);
        assert!(!strategies.is_empty(), "{}", describe(&table));

        for strategy in strategies {
            let wrap = LookupTableWrap::with_strategy(table.clone(), strategy).unwrap();
            let min_capacity = min_offset_array_size(&wrap);
            for capacity in [min_capacity, min_capacity + 3, 4096.max(min_capacity)] {
                let mut driver = ScanDriver::new(&wrap, capacity).unwrap();
                for (subject, expected) in fixture.subjects.iter().zip(&expected) {
                    let hits = driver.collect(&wrap, &subject.view()).unwrap();
                    assert_eq!(
                        &hits,
                        expected,
                        "{} strategy={} capacity={} subject_len={}",
                        describe(&table),
                        strategy,
                        capacity,
                        subject.len()
                    );
                }
            }
        }
    }
}

#[test]
fn test_standard_and_small_routines_match_reference() {
    check_shapes(&na_shapes(), 0x5eed_0001);
}

#[test]
fn test_megablast_routines_match_reference() {
    check_shapes(&mb_shapes(), 0x5eed_0002);
}

#[test]
fn test_discontiguous_routines_match_reference() {
    check_shapes(&disc_shapes(), 0x5eed_0003);
}

/// One call per start phase and buffer size: every routine that accepts the
/// start must fill the same pairs and stop at the same `end_offset`.
fn check_single_calls(shapes: &[Shape], seed: u64) {
    let fixture = fixture(seed);
    for &shape in shapes {
        let table = shape.build(&fixture.query);
        let span = table.word_span();
        let lc = table.longest_chain();
        let wraps: Vec<LookupTableWrap> = applicable(&table)
            .into_iter()
            .map(|strategy| LookupTableWrap::with_strategy(table.clone(), strategy).unwrap())
            .collect();

        for subject in &fixture.subjects {
            let view = subject.view();
            let roomy = (subject.len() + 1) * lc + lc + 1;
            for start_offset in 0..8 {
                if start_offset + span > subject.len() {
                    continue;
                }
                for capacity in [lc + 1, lc + 2, lc + 5, roomy] {
                    let mut buffer = vec![OffsetPair::default(); capacity];
                    let mut first: Option<(ScanStrategy, Vec<OffsetPair>, usize)> = None;
                    let accepting = wraps
                        .iter()
                        .filter(|w| w.strategy().accepts_start(start_offset));
                    for wrap in accepting {
                        let mut end_offset = subject.len();
                        let n = wrap.scan_subject(
                            &view,
                            start_offset,
                            &mut buffer,
                            capacity,
                            &mut end_offset,
                        );
                        let hits = buffer[..n].to_vec();
                        match &first {
                            None => first = Some((wrap.strategy(), hits, end_offset)),
                            Some((base, base_hits, base_end)) => {
                                assert_eq!(
                                    (&hits, end_offset),
                                    (base_hits, *base_end),
                                    "{} {} vs {} start={} capacity={} subject_len={}",
                                    describe(&table),
                                    wrap.strategy(),
                                    base,
                                    start_offset,
                                    capacity,
                                    subject.len()
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_standard_and_small_single_calls_agree() {
    check_single_calls(&na_shapes(), 0x5eed_0011);
}

#[test]
fn test_megablast_single_calls_agree() {
    check_single_calls(&mb_shapes(), 0x5eed_0012);
}

#[test]
fn test_discontiguous_single_calls_agree() {
    check_single_calls(&disc_shapes(), 0x5eed_0013);
}

#[test]
fn test_selected_routine_is_applicable() {
    let fixture = fixture(7);
    let shapes = na_shapes()
        .into_iter()
        .chain(mb_shapes())
        .chain(disc_shapes());
    for shape in shapes {
        let table = shape.build(&fixture.query);
        let wrap = LookupTableWrap::new(table.clone());
        assert!(
            wrap.strategy().is_applicable(&table),
            "{} selected {}",
            describe(&table),
            wrap.strategy()
        );
        assert_eq!(wrap.strategy().table_kind(), table.kind());
    }
}
