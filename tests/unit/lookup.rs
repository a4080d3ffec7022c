//! Reference index builders

use nascan::core::blast_lookup::{pv_test, pv_test_shifted};
use nascan::core::blast_nalookup::{
    compute_discontiguous_index, compute_mb_pv_params, DiscTemplate, MbLookupTable, NaLookupTable,
    SmallNaEntry, SmallNaLookupTable, SMALL_NA_MAX_QUERY_LENGTH,
};
use nascan::error::LookupError;

// ACGT = 0b00011011
const ACGT: usize = 27;

#[test]
fn test_standard_table_inline_and_overflow() {
    let table = NaLookupTable::build(b"ACGTACGTACGTACGT", 4, 1).unwrap();
    // ACGT at 0, 4, 8, 12 spills into the overflow array
    assert_eq!(table.hits(ACGT), &[0, 4, 8, 12]);
    assert_eq!(table.thick_backbone[ACGT].num_used, 4);
    assert_eq!(table.longest_chain, 4);
    // CGTA at 1, 5, 9 stays inline
    let cgta = 0b0110_1100;
    assert_eq!(table.hits(cgta), &[1, 5, 9]);
    assert!(pv_test(&table.pv, ACGT));
    assert!(!pv_test(&table.pv, 0));
}

#[test]
fn test_ambiguous_query_words_are_skipped() {
    let table = SmallNaLookupTable::build(b"ACGTNACGT", 4, 1).unwrap();
    assert_eq!(table.hits(ACGT), vec![0, 5]);
    assert_eq!(table.entry(ACGT), SmallNaEntry::Overflow(0));
    assert_eq!(table.overflow, vec![0, 5, -1]);
}

#[test]
fn test_small_table_single_hits_inline() {
    let table = SmallNaLookupTable::build(b"ACGTT", 4, 1).unwrap();
    assert_eq!(table.entry(ACGT), SmallNaEntry::Single(0));
    assert_eq!(table.entry(0), SmallNaEntry::Empty);
    assert_eq!(table.longest_chain, 1);
    assert!(table.overflow.is_empty());
}

#[test]
fn test_small_table_rejects_long_query() {
    let query = vec![b'A'; SMALL_NA_MAX_QUERY_LENGTH + 1];
    assert_eq!(
        SmallNaLookupTable::build(&query, 8, 1).unwrap_err(),
        LookupError::QueryTooLong {
            length: SMALL_NA_MAX_QUERY_LENGTH + 1,
            max: SMALL_NA_MAX_QUERY_LENGTH
        }
    );
}

#[test]
fn test_word_length_and_stride_checks() {
    assert!(matches!(
        NaLookupTable::build(b"ACGT", 9, 1),
        Err(LookupError::UnsupportedWordLength { word_length: 9, .. })
    ));
    assert!(matches!(
        SmallNaLookupTable::build(b"ACGT", 7, 0),
        Err(LookupError::InvalidScanStep { .. })
    ));
    assert!(matches!(
        MbLookupTable::build_contiguous(b"ACGT", 8, 1),
        Err(LookupError::UnsupportedWordLength { word_length: 8, .. })
    ));
    assert!(matches!(
        MbLookupTable::build_contiguous(b"ACGT", 11, 0),
        Err(LookupError::InvalidScanStep { .. })
    ));
}

#[test]
fn test_megablast_chains_are_descending() {
    let query = b"GATTACAGGTTGATTACAGGTTGATTACAGG";
    let table = MbLookupTable::build_contiguous(query, 9, 1).unwrap();
    let index = query[..9]
        .iter()
        .fold(0usize, |acc, &b| (acc << 2) | "ACGT".find(b as char).unwrap());
    assert_eq!(table.hits(index), vec![22, 11, 0]);
    assert_eq!(table.longest_chain, 3);
    assert!(pv_test_shifted(&table.pv_array, index, table.pv_array_bts));
}

#[test]
fn test_presence_vector_sizing() {
    // 4^9 cells, small query: hashsize / 32 words, halved
    assert_eq!(compute_mb_pv_params(1 << 18, 100), (1 << 12, 6));
    // mid-sized query keeps the full vector
    assert_eq!(compute_mb_pv_params(1 << 18, 100_000), (1 << 13, 5));
    // 4^12 cells exceed the target and are capped
    assert_eq!(compute_mb_pv_params(1 << 24, 100_000), (32_768, 9));
}

#[test]
fn test_discontiguous_index_samples_in_template_order() {
    // 11-of-18 coding samples positions 0,2,3,5,6,9,11,12,14,15,17
    let template = DiscTemplate::Template11x18Coding;
    assert_eq!(template.length(), 18);
    assert_eq!(template.word_length(), 11);
    // only the first base is T: it lands in the top two bits of the index
    let accum = 3u64 << (2 * 17);
    assert_eq!(compute_discontiguous_index(accum, template), 3 << 20);
    // only the last base is C
    assert_eq!(compute_discontiguous_index(1, template), 1);
    // unsampled position 1 is ignored
    assert_eq!(compute_discontiguous_index(3u64 << (2 * 16), template), 0);
}

#[test]
fn test_two_template_table_sums_longest_chains() {
    let query = b"ACGTTGCAACGTTGCAACGTTGCAACGTTGCAAC";
    let single =
        MbLookupTable::build_discontiguous(query, DiscTemplate::Template11x16Coding, None, false)
            .unwrap();
    let pair = MbLookupTable::build_discontiguous(
        query,
        DiscTemplate::Template11x16Coding,
        Some(DiscTemplate::Template11x16Optimal),
        false,
    )
    .unwrap();
    assert!(pair.two_templates());
    assert!(!single.two_templates());
    assert!(pair.longest_chain > single.longest_chain);
    assert_eq!(pair.template_length, 16);
    assert_eq!(pair.scan_step, 1);
}
