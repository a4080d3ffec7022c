//! Resumption: split windows and tight buffers give the same hit sequence

use nascan::core::blast_encoding::PackedSequence;
use nascan::core::blast_lookup::OffsetPair;
use nascan::core::blast_nalookup::LookupTableWrap;
use nascan::core::blast_nascan::ScanStrategy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::helpers::{
    describe, disc_shapes, mb_shapes, na_shapes, planted_subject, random_query, reference_hits,
};

/// Scan `[0, len)` as a sequence of calls whose window ends are `cuts`
/// followed by the subject length.
fn scan_in_windows(
    wrap: &LookupTableWrap,
    subject: &PackedSequence,
    cuts: &[usize],
    buffer: &mut [OffsetPair],
) -> Vec<OffsetPair> {
    let view = subject.view();
    let mut hits = Vec::new();
    let mut start_offset = 0;
    for &cut in cuts.iter().chain(std::iter::once(&subject.len())) {
        let mut end_offset = cut;
        let max_hits = buffer.len();
        let n = wrap.scan_subject(&view, start_offset, buffer, max_hits, &mut end_offset);
        hits.extend_from_slice(&buffer[..n]);
        assert!(end_offset >= start_offset);
        start_offset = end_offset;
    }
    hits
}

#[test]
fn test_split_windows_match_single_scan() {
    let mut rng = SmallRng::seed_from_u64(0xc0ffee);
    let query = random_query(&mut rng, 150);
    let subject = PackedSequence::from_iupac(&planted_subject(&mut rng, &query, 203));

    let shapes = na_shapes()
        .into_iter()
        .chain(mb_shapes())
        .chain(disc_shapes());
    for shape in shapes {
        let table = shape.build(&query);
        let expected = reference_hits(&table, &subject);
        let lc = table.longest_chain();
        let mut buffer = vec![OffsetPair::default(); (subject.len() + 1) * lc + lc + 1];
        for strategy in ScanStrategy::ALL {
            if !strategy.is_applicable(&table) {
                continue;
            }
            let wrap = LookupTableWrap::with_strategy(table.clone(), strategy).unwrap();
            for _ in 0..4 {
                let mut cuts: Vec<usize> = (0..rng.random_range(1..6))
                    .map(|_| rng.random_range(0..subject.len()))
                    .collect();
                cuts.sort_unstable();
                let hits = scan_in_windows(&wrap, &subject, &cuts, &mut buffer);
                assert_eq!(
                    hits,
                    expected,
                    "{} strategy={} cuts={:?}",
                    describe(&table),
                    strategy,
                    cuts
                );
            }
        }
    }
}

#[test]
fn test_every_capacity_loses_and_duplicates_nothing() {
    let mut rng = SmallRng::seed_from_u64(42);
    let query = random_query(&mut rng, 120);
    let subject = PackedSequence::from_iupac(&planted_subject(&mut rng, &query, 150));
    let view = subject.view();

    let shapes = na_shapes().into_iter().chain(mb_shapes()).chain(disc_shapes());
    for shape in shapes {
        let table = shape.build(&query);
        let expected = reference_hits(&table, &subject);
        let wrap = LookupTableWrap::new(table.clone());
        let lc = wrap.longest_chain();
        for capacity in (lc + 1)..(lc + 12) {
            let mut buffer = vec![OffsetPair::default(); capacity];
            let mut hits = Vec::new();
            let mut start_offset = 0;
            while start_offset + wrap.word_span() <= subject.len() {
                let mut end_offset = subject.len();
                let n = wrap.scan_subject(
                    &view,
                    start_offset,
                    &mut buffer,
                    capacity,
                    &mut end_offset,
                );
                assert!(n <= capacity);
                assert!(
                    n > 0 || end_offset > start_offset,
                    "{} stalled at {}",
                    describe(&table),
                    start_offset
                );
                hits.extend_from_slice(&buffer[..n]);
                start_offset = end_offset;
            }
            assert_eq!(hits, expected, "{} capacity={}", describe(&table), capacity);
        }
    }
}

#[test]
fn test_start_past_last_word_writes_nothing() {
    let mut rng = SmallRng::seed_from_u64(9);
    let query = random_query(&mut rng, 64);
    let subject = PackedSequence::from_iupac(&planted_subject(&mut rng, &query, 30));
    let view = subject.view();
    let shapes = na_shapes().into_iter().chain(mb_shapes()).chain(disc_shapes());
    for shape in shapes {
        let wrap = LookupTableWrap::new(shape.build(&query));
        let mut buffer = vec![OffsetPair::default(); wrap.longest_chain() + 64];
        let max_hits = buffer.len();
        // the aligned routines round the start down, so test from a byte boundary
        let start_offset = (subject.len() + 4 - wrap.word_span()).next_multiple_of(4);
        let mut end_offset = subject.len();
        let n = wrap.scan_subject(&view, start_offset, &mut buffer, max_hits, &mut end_offset);
        assert_eq!(n, 0, "{:?}", shape);
        assert_eq!(end_offset, start_offset, "{:?}", shape);
    }
}
