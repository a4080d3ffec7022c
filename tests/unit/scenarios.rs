//! Hand-built tables and subjects with known answers

use nascan::core::blast_encoding::{CompressedSequence, PackedSequence};
use nascan::core::blast_lookup::OffsetPair;
use nascan::core::blast_nalookup::{
    LookupTableWrap, MbLookupTable, NaLookupTable, SmallNaEntry, SmallNaLookupTable,
};
use nascan::core::blast_nascan::{
    mb_scan_subject_any, small_na_scan_subject_4_1, small_na_scan_subject_any, ScanStrategy,
};
use nascan::error::SequenceError;

fn single_hit_small_table() -> SmallNaLookupTable {
    let mut final_backbone = vec![SmallNaEntry::Empty.encode(); 256];
    final_backbone[0b0000_0001] = 5;
    SmallNaLookupTable {
        word_length: 4,
        scan_step: 1,
        mask: 255,
        backbone_size: 256,
        longest_chain: 1,
        final_backbone,
        overflow: Vec::new(),
    }
}

#[test]
fn test_single_hit_compact_table() {
    // 0x01 0x00 is AAAC AAAA; only the word at offset 0 (AAAC) is indexed
    let table = single_hit_small_table();
    let data = [0x01u8, 0x00, 0x00];
    let subject = CompressedSequence::new(&data, 8).unwrap();
    let mut out = vec![OffsetPair::default(); 10];

    for routine in [small_na_scan_subject_4_1, small_na_scan_subject_any] {
        let mut end = subject.len();
        let n = routine(&table, &subject, 0, &mut out, 10, &mut end);
        assert_eq!(n, 1);
        assert_eq!(out[0], OffsetPair::new(5, 0));
        assert_eq!(end, 5);
    }
}

#[test]
fn test_word_in_middle_of_byte() {
    // AAAC at offset 2: A A | A A A C A A
    let table = single_hit_small_table();
    let subject = PackedSequence::from_iupac(b"AAAAACAA");
    let wrap = LookupTableWrap::new(table);
    assert_eq!(wrap.strategy(), ScanStrategy::SmallNaScan4x1);
    let mut out = vec![OffsetPair::default(); 10];
    let mut end = subject.len();
    let n = wrap.scan_subject(&subject.view(), 0, &mut out, 10, &mut end);
    assert_eq!(n, 1);
    assert_eq!(out[0], OffsetPair::new(5, 2));
    assert_eq!(end, 5);
}

#[test]
fn test_short_buffer_rejects_sentinel_less_data() {
    let data = [0x1bu8];
    let err = CompressedSequence::new(&data, 4).unwrap_err();
    assert_eq!(
        err,
        SequenceError::BufferTooShort {
            length: 4,
            required: 2,
            actual: 1
        }
    );
    assert!(CompressedSequence::new(&data, 3).is_ok());
}

#[test]
fn test_reservation_above_capacity_makes_no_progress() {
    // AAAA occurs four times in the query
    let table = SmallNaLookupTable::build(b"AAAAAAA", 4, 1).unwrap();
    assert_eq!(table.longest_chain, 4);
    let subject = PackedSequence::from_iupac(b"AAAAAAAA");
    let mut out = vec![OffsetPair::default(); 16];
    let mut end = subject.len();
    let n = small_na_scan_subject_4_1(&table, &subject.view(), 2, &mut out, 3, &mut end);
    assert_eq!(n, 0);
    assert_eq!(end, 2);
}

#[test]
fn test_standard_table_stops_before_bucket_that_does_not_fit() {
    // ACGT x3 and CGTA x2 in the query
    let table = NaLookupTable::build(b"ACGTACGTACGT", 4, 1).unwrap();
    let wrap = LookupTableWrap::new(table);
    let subject = PackedSequence::from_iupac(b"ACGTA");
    let mut out = vec![OffsetPair::default(); 4];

    let mut end = subject.len();
    let n = wrap.scan_subject(&subject.view(), 0, &mut out, 4, &mut end);
    assert_eq!(n, 3);
    assert_eq!(end, 1);
    assert_eq!(
        out[..3],
        [
            OffsetPair::new(0, 0),
            OffsetPair::new(4, 0),
            OffsetPair::new(8, 0)
        ]
    );

    let mut end = subject.len();
    let n = wrap.scan_subject(&subject.view(), 1, &mut out, 4, &mut end);
    assert_eq!(n, 2);
    assert_eq!(end, 2);
    assert_eq!(out[..2], [OffsetPair::new(1, 1), OffsetPair::new(5, 1)]);
}

#[test]
fn test_presence_vector_gates_megablast_probes() {
    let query = b"GATTACAGGCTTACCGATGCATTGACC";
    let subject = PackedSequence::from_iupac(b"TTGATTACAGGCTTACCGATGCATTGACCTT");
    let mut table = MbLookupTable::build_contiguous(query, 10, 1).unwrap();
    let mut out = vec![OffsetPair::default(); 64];

    let mut end = subject.len();
    let n = mb_scan_subject_any(&table, &subject.view(), 0, &mut out, 64, &mut end);
    assert_eq!(n, query.len() - 10 + 1);
    // chains list the highest query offset first, but each word hits once
    assert!(out[..n].iter().all(|p| p.s_off == p.q_off + 2));

    // bits without chains cost a read but add nothing
    let expected = out[..n].to_vec();
    table.pv_array.iter_mut().for_each(|w| *w = u32::MAX);
    let mut end = subject.len();
    let n = mb_scan_subject_any(&table, &subject.view(), 0, &mut out, 64, &mut end);
    assert_eq!(out[..n], expected[..]);

    // a clear bit hides the chain
    table.pv_array.iter_mut().for_each(|w| *w = 0);
    let mut end = subject.len();
    let n = mb_scan_subject_any(&table, &subject.view(), 0, &mut out, 64, &mut end);
    assert_eq!(n, 0);
    assert_eq!(end, subject.len() - 10 + 1);
}

#[test]
fn test_ambiguous_subject_bases_scan_as_packed() {
    // N packs as its low two BLASTNA bits, which is G
    let table = SmallNaLookupTable::build(b"ACGTG", 5, 1).unwrap();
    let wrap = LookupTableWrap::new(table);
    let subject = PackedSequence::from_iupac(b"ACGTN");
    let mut out = vec![OffsetPair::default(); 4];
    let mut end = subject.len();
    let n = wrap.scan_subject(&subject.view(), 0, &mut out, 4, &mut end);
    assert_eq!(n, 1);
    assert_eq!(out[0], OffsetPair::new(0, 0));
}
