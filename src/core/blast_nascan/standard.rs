//! Scanning with the standard table
//!
//! The standard table keeps a hit count per cell, so an empty word costs one
//! backbone read and never touches the presence vector.

use super::{read2, read3, scan_window, wide_read_end};
use crate::core::blast_encoding::{CompressedSequence, COMPRESSION_RATIO, MAX_SUBJECT_LENGTH};
use crate::core::blast_lookup::{pv_test, OffsetPair};
use crate::core::blast_nalookup::{NaLookupTable, NA_HITS_PER_CELL};

/// Output cursor for one call.
///
/// A cell's hits are written only if all of them fit in the remaining capacity.
struct NaHits<'a> {
    lookup: &'a NaLookupTable,
    out: &'a mut [OffsetPair],
    max_hits: usize,
    total: usize,
}

impl<'a> NaHits<'a> {
    fn new(lookup: &'a NaLookupTable, out: &'a mut [OffsetPair], max_hits: usize) -> Self {
        let max_hits = max_hits.min(out.len());
        Self {
            lookup,
            out,
            max_hits,
            total: 0,
        }
    }

    /// Copy the hits of `index` for subject offset `s_off`; `false` if they do not fit.
    #[inline(always)]
    fn access(&mut self, index: usize, s_off: usize) -> bool {
        let lookup = self.lookup;
        let cell = &lookup.thick_backbone[index];
        let num_hits = cell.num_used as usize;
        if num_hits == 0 {
            return true;
        }
        debug_assert!(pv_test(&lookup.pv, index), "presence vector out of sync");
        if num_hits > self.max_hits - self.total {
            return false;
        }

        let src = if num_hits <= NA_HITS_PER_CELL {
            &cell.entries[..num_hits]
        } else {
            let cursor = cell.overflow_cursor();
            &lookup.overflow[cursor..cursor + num_hits]
        };
        debug_assert!(s_off <= MAX_SUBJECT_LENGTH);
        let s_off = s_off as u32;
        let dest = &mut self.out[self.total..self.total + num_hits];
        for (pair, &q_off) in dest.iter_mut().zip(src) {
            *pair = OffsetPair::new(q_off, s_off);
        }
        self.total += num_hits;
        true
    }
}

/// Width 8, byte-aligned stride 4: each word is exactly two subject bytes.
pub fn na_scan_subject_8_4(
    lookup: &NaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_LENGTH: usize = 8;
    debug_assert_eq!(lookup.word_length, LUT_WORD_LENGTH);

    let Some(last_offset) = scan_window(subject, start_offset, LUT_WORD_LENGTH, end_offset) else {
        return 0;
    };
    let data = subject.data();
    let mut hits = NaHits::new(lookup, offset_pairs, max_hits);

    let s_end = last_offset / COMPRESSION_RATIO;
    let mut s = start_offset / COMPRESSION_RATIO;
    while s <= s_end {
        if !hits.access(read2(data, s), s * COMPRESSION_RATIO) {
            break;
        }
        s += 1;
    }

    *end_offset = s * COMPRESSION_RATIO;
    hits.total
}

/// Any width from 4 to 8 at any positive stride.
pub fn na_scan_subject_any(
    lookup: &NaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    let lut_word_length = lookup.word_length;
    let scan_step = lookup.scan_step;
    let mask = lookup.mask;
    debug_assert!(scan_step > 0);

    let window_end = (*end_offset).min(subject.len());
    let Some(last_offset) = scan_window(subject, start_offset, lut_word_length, end_offset) else {
        return 0;
    };
    let data = subject.data();
    let mut hits = NaHits::new(lookup, offset_pairs, max_hits);

    if lut_word_length > 5 {
        if scan_step % COMPRESSION_RATIO == 0 {
            // aligned words: two bytes hold the word plus trailing bases
            let s_end = last_offset / COMPRESSION_RATIO;
            let shift = 2 * (8 - lut_word_length);
            let step_bytes = scan_step / COMPRESSION_RATIO;
            let mut s = start_offset / COMPRESSION_RATIO;
            while s <= s_end {
                if !hits.access(read2(data, s) >> shift, s * COMPRESSION_RATIO) {
                    break;
                }
                s += step_bytes;
            }
            *end_offset = s * COMPRESSION_RATIO;
        } else {
            let three_byte_end = wide_read_end(last_offset, window_end, lut_word_length, 6);
            let mut s_off = start_offset;
            'scan: {
                while s_off < three_byte_end {
                    let shift = 2 * (12 - (s_off % COMPRESSION_RATIO + lut_word_length));
                    let index = (read3(data, s_off / COMPRESSION_RATIO) >> shift) & mask;
                    if !hits.access(index, s_off) {
                        break 'scan;
                    }
                    s_off += scan_step;
                }
                // the last few offsets fit in two bytes
                while s_off <= last_offset {
                    let shift = 2 * (8 - (s_off % COMPRESSION_RATIO + lut_word_length));
                    let index = (read2(data, s_off / COMPRESSION_RATIO) >> shift) & mask;
                    if !hits.access(index, s_off) {
                        break 'scan;
                    }
                    s_off += scan_step;
                }
            }
            *end_offset = s_off;
        }
    } else {
        // widths 4 and 5 always fit in two bytes
        let mut s_off = start_offset;
        while s_off <= last_offset {
            let shift = 2 * (8 - (s_off % COMPRESSION_RATIO + lut_word_length));
            let index = (read2(data, s_off / COMPRESSION_RATIO) >> shift) & mask;
            if !hits.access(index, s_off) {
                break;
            }
            s_off += scan_step;
        }
        *end_offset = s_off;
    }

    hits.total
}
