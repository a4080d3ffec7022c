//! Scanning with the hashed table, discontiguous words
//!
//! A word is a template span of 16 to 21 bases; only the sampled bases form
//! the index. The span is kept in an accumulator with its last base in the
//! two low bits.

use super::megablast::MbHits;
use crate::core::blast_encoding::{CompressedSequence, COMPRESSION_RATIO};
use crate::core::blast_lookup::OffsetPair;
use crate::core::blast_nalookup::{compute_discontiguous_index, DiscTemplate, MbLookupTable};

/// Any template, one or two templates, every base or every fourth base.
///
/// Both templates are probed at each position and the buffer is tested once
/// afterwards, so a position is either reported in full or not at all. The
/// stride-4 mode starts at `start_offset` itself, whatever its phase.
pub fn mb_disc_word_scan_subject_any(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    let Some(disc) = lookup.discontiguous.as_ref() else {
        debug_assert!(false, "discontiguous scan of a contiguous table");
        *end_offset = start_offset;
        return 0;
    };
    let template_length = lookup.template_length;
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let last_base = last_offset + template_length;
    let data = subject.data();
    let template_type = disc.template_type;
    let second = disc.second.as_ref();

    let mut s = start_offset / COMPRESSION_RATIO;
    let mut curr_base = COMPRESSION_RATIO - start_offset % COMPRESSION_RATIO;
    let mut accum = data[s] as u64;
    s += 1;

    // each step appends this many bases to the accumulator
    let scan_step = if disc.full_byte_scan { COMPRESSION_RATIO } else { 1 };

    // preload the first word minus one step; `s` ends on the byte holding
    // the next base to append
    let preload = template_length - scan_step;
    while curr_base < preload {
        accum = accum << 8 | data[s] as u64;
        s += 1;
        curr_base += COMPRESSION_RATIO;
    }
    if curr_base > preload {
        accum >>= 2 * (curr_base - preload);
        s -= 1;
    }

    curr_base = start_offset + template_length;
    while curr_base <= last_base {
        if disc.full_byte_scan {
            let shift = 2 * (curr_base % COMPRESSION_RATIO);
            let next = if shift == 0 {
                data[s] as u64
            } else {
                ((data[s] as u64) << shift | (data[s + 1] as u64) >> (8 - shift)) & 0xff
            };
            accum = accum << 8 | next;
            s += 1;
        } else {
            let shift = 2 * (3 - (curr_base - 1) % COMPRESSION_RATIO);
            accum = accum << 2 | ((data[s] as u64 >> shift) & 3);
            if curr_base % COMPRESSION_RATIO == 0 {
                s += 1;
            }
        }

        let s_off = curr_base - template_length;
        let index = compute_discontiguous_index(accum, template_type);
        hits.probe(&lookup.hashtable, &lookup.next_pos, index, s_off);
        if let Some(second) = second {
            let index2 = compute_discontiguous_index(accum, second.template_type);
            hits.probe(&second.hashtable2, &second.next_pos2, index2, s_off);
        }

        curr_base += scan_step;
        if hits.is_full() {
            break;
        }
    }

    *end_offset = curr_base - template_length;
    hits.total
}

/// Preload the accumulator for a stride-1 scan from `s_off`.
///
/// Returns the byte cursor, the accumulator and how many steps of the
/// unrolled loop to skip on entry.
#[inline]
fn preload_stride1(data: &[u8], s_off: usize, template_length: usize) -> (usize, u64, usize) {
    let mut s = s_off / COMPRESSION_RATIO;
    let mut accum = 0u64;
    let mut index = s_off - s_off % COMPRESSION_RATIO;
    while index < s_off + template_length {
        accum = accum << 8 | data[s] as u64;
        s += 1;
        index += COMPRESSION_RATIO;
    }
    // the entry point depends on how many bases follow the first word
    match index - (s_off + template_length) {
        1 => (s, accum, 3),
        2 => (s, accum, 2),
        3 => (s - 1, accum >> 8, 1),
        _ => (s, accum, 0),
    }
}

/// One template, stride 1, generic index computation.
pub fn mb_disc_word_scan_subject_1(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    let Some(disc) = lookup.discontiguous.as_ref() else {
        debug_assert!(false, "discontiguous scan of a contiguous table");
        *end_offset = start_offset;
        return 0;
    };
    let template_type = disc.template_type;
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s_off = start_offset;
    let (mut s, mut accum, mut entry) = preload_stride1(data, s_off, lookup.template_length);

    'scan: loop {
        'base_3: {
            'base_2: {
                'base_1: {
                    match entry {
                        1 => break 'base_1,
                        2 => break 'base_2,
                        3 => break 'base_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    let index = compute_discontiguous_index(accum, template_type);
                    if !hits.access(index, s_off) {
                        break 'scan;
                    }
                    s_off += 1;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                accum = accum << 8 | data[s] as u64;
                s += 1;
                let index = compute_discontiguous_index(accum >> 6, template_type);
                if !hits.access(index, s_off) {
                    break 'scan;
                }
                s_off += 1;
            }
            if s_off > last_offset {
                break 'scan;
            }
            let index = compute_discontiguous_index(accum >> 4, template_type);
            if !hits.access(index, s_off) {
                break 'scan;
            }
            s_off += 1;
        }
        if s_off > last_offset {
            break 'scan;
        }
        let index = compute_discontiguous_index(accum >> 2, template_type);
        if !hits.access(index, s_off) {
            break 'scan;
        }
        s_off += 1;
        entry = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// A 64-bit window split in two halves; the last base sits in the low bits
/// of `lo`.
#[derive(Debug, Clone, Copy, Default)]
struct SplitAccum {
    lo: u32,
    hi: u32,
}

impl SplitAccum {
    #[inline(always)]
    fn push_byte(&mut self, byte: u8) {
        self.hi = (self.hi << 8) | (self.lo >> 24);
        self.lo = (self.lo << 8) | byte as u32;
    }

    #[inline(always)]
    fn pop_byte(&mut self) {
        self.lo = (self.lo >> 8) | (self.hi << 24);
        self.hi >>= 8;
    }

    /// Load whole bytes from `s_off`'s byte until the span is covered.
    /// Returns the byte cursor and the entry step, as for the generic routine.
    #[inline]
    fn preload(data: &[u8], s_off: usize, template_length: usize) -> (usize, Self, usize) {
        let mut acc = Self::default();
        let mut s = s_off / COMPRESSION_RATIO;
        let mut index = s_off - s_off % COMPRESSION_RATIO;
        while index < s_off + template_length {
            acc.push_byte(data[s]);
            s += 1;
            index += COMPRESSION_RATIO;
        }
        match index - (s_off + template_length) {
            1 => (s, acc, 3),
            2 => (s, acc, 2),
            3 => {
                acc.pop_byte();
                (s - 1, acc, 1)
            }
            _ => (s, acc, 0),
        }
    }
}

/// Index of the 11-of-18 coding template for the span ending at bit
/// `2 * trailing` of the accumulator. The masks gather sampled bases two at
/// a time where the template allows.
#[inline(always)]
fn index_11_18(a: SplitAccum, trailing: u32) -> usize {
    let SplitAccum { lo, hi } = a;
    let index = match trailing {
        0 => {
            (lo & 0x0000_0003)
                | ((lo & 0x0000_00f0) >> 2)
                | ((lo & 0x0000_3c00) >> 4)
                | ((lo & 0x0003_0000) >> 6)
                | ((lo & 0x03c0_0000) >> 10)
                | ((lo & 0xf000_0000) >> 12)
                | ((hi & 0x0000_000c) << 18)
        }
        3 => {
            ((lo & 0x0000_00c0) >> 6)
                | ((lo & 0x0000_3c00) >> 8)
                | ((lo & 0x000f_0000) >> 10)
                | ((lo & 0x00c0_0000) >> 12)
                | ((lo & 0xf000_0000) >> 16)
                | ((hi & 0x0000_003c) << 14)
                | ((hi & 0x0000_0300) << 12)
        }
        2 => {
            ((lo & 0x0000_0030) >> 4)
                | ((lo & 0x0000_0f00) >> 6)
                | ((lo & 0x0003_c000) >> 8)
                | ((lo & 0x0030_0000) >> 10)
                | ((lo & 0x3c00_0000) >> 14)
                | ((hi & 0x0000_000f) << 16)
                | ((hi & 0x0000_00c0) << 14)
        }
        _ => {
            ((lo & 0x0000_000c) >> 2)
                | ((lo & 0x0000_03c0) >> 4)
                | ((lo & 0x0000_f000) >> 6)
                | ((lo & 0x000c_0000) >> 8)
                | ((lo & 0x0f00_0000) >> 12)
                | ((lo & 0xc000_0000) >> 14)
                | ((hi & 0x0000_0003) << 18)
                | ((hi & 0x0000_0030) << 16)
        }
    };
    index as usize
}

/// Index of the 11-of-21 coding template; see [`index_11_18`].
#[inline(always)]
fn index_11_21(a: SplitAccum, trailing: u32) -> usize {
    let SplitAccum { lo, hi } = a;
    let index = match trailing {
        0 => {
            (lo & 0x0000_0003)
                | ((lo & 0x0000_00f0) >> 2)
                | ((lo & 0x0000_0c00) >> 4)
                | ((lo & 0x000f_0000) >> 8)
                | ((lo & 0x00c0_0000) >> 10)
                | ((lo & 0xf000_0000) >> 14)
                | ((hi & 0x0000_000c) << 16)
                | ((hi & 0x0000_0300) << 12)
        }
        3 => {
            ((lo & 0x0000_00c0) >> 6)
                | ((lo & 0x0000_3c00) >> 8)
                | ((lo & 0x0003_0000) >> 10)
                | ((lo & 0x03c0_0000) >> 14)
                | ((lo & 0x3000_0000) >> 16)
                | ((hi & 0x0000_003c) << 12)
                | ((hi & 0x0000_0300) << 10)
                | ((hi & 0x0000_c000) << 6)
        }
        2 => {
            ((lo & 0x0000_0030) >> 4)
                | ((lo & 0x0000_0f00) >> 6)
                | ((lo & 0x0000_c000) >> 8)
                | ((lo & 0x00f0_0000) >> 12)
                | ((lo & 0x0c00_0000) >> 14)
                | ((hi & 0x0000_000f) << 14)
                | ((hi & 0x0000_00c0) << 12)
                | ((hi & 0x0000_3000) << 8)
        }
        _ => {
            ((lo & 0x0000_000c) >> 2)
                | ((lo & 0x0000_03c0) >> 4)
                | ((lo & 0x0000_3000) >> 6)
                | ((lo & 0x003c_0000) >> 10)
                | ((lo & 0x0300_0000) >> 12)
                | ((lo & 0xc000_0000) >> 16)
                | ((hi & 0x0000_0003) << 16)
                | ((hi & 0x0000_0030) << 14)
                | ((hi & 0x0000_0c00) << 10)
        }
    };
    index as usize
}

/// Stride-1 scan with one of the two coding templates that have a
/// split-accumulator index.
#[inline(always)]
fn scan_split(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
    template: DiscTemplate,
) -> usize {
    let index_of = match template {
        DiscTemplate::Template11x18Coding => index_11_18,
        _ => index_11_21,
    };
    debug_assert_eq!(
        lookup.discontiguous.as_ref().map(|d| d.template_type),
        Some(template)
    );
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s_off = start_offset;
    let (mut s, mut acc, mut entry) = SplitAccum::preload(data, s_off, template.length());

    'scan: loop {
        'base_3: {
            'base_2: {
                'base_1: {
                    match entry {
                        1 => break 'base_1,
                        2 => break 'base_2,
                        3 => break 'base_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    if !hits.access(index_of(acc, 0), s_off) {
                        break 'scan;
                    }
                    s_off += 1;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                acc.push_byte(data[s]);
                s += 1;
                if !hits.access(index_of(acc, 3), s_off) {
                    break 'scan;
                }
                s_off += 1;
            }
            if s_off > last_offset {
                break 'scan;
            }
            if !hits.access(index_of(acc, 2), s_off) {
                break 'scan;
            }
            s_off += 1;
        }
        if s_off > last_offset {
            break 'scan;
        }
        if !hits.access(index_of(acc, 1), s_off) {
            break 'scan;
        }
        s_off += 1;
        entry = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// 11-of-18 coding template, stride 1.
pub fn mb_disc_word_scan_subject_11_18_1(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    scan_split(
        lookup,
        subject,
        start_offset,
        offset_pairs,
        max_hits,
        end_offset,
        DiscTemplate::Template11x18Coding,
    )
}

/// 11-of-21 coding template, stride 1.
pub fn mb_disc_word_scan_subject_11_21_1(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    scan_split(
        lookup,
        subject,
        start_offset,
        offset_pairs,
        max_hits,
        end_offset,
        DiscTemplate::Template11x21Coding,
    )
}
