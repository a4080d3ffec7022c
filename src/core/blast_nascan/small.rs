//! Scanning with the compact table
//!
//! The compact backbone stores one signed 16-bit value per word, so the scan
//! loops below read a single `i16` per position. Hits are only retrieved for
//! non-empty cells. Each call reserves `longest_chain` slots of the output so
//! that a cell is never truncated.

use super::{byte_at, read2, read3, scan_window, wide_read_end};
use crate::core::blast_encoding::{CompressedSequence, COMPRESSION_RATIO, MAX_SUBJECT_LENGTH};
use crate::core::blast_lookup::OffsetPair;
use crate::core::blast_nalookup::{SmallNaEntry, SmallNaLookupTable};

struct SmallNaHits<'a> {
    lookup: &'a SmallNaLookupTable,
    out: &'a mut [OffsetPair],
    /// Capacity left once the longest chain is reserved.
    limit: usize,
    total: usize,
}

impl<'a> SmallNaHits<'a> {
    /// Resolve the scan window and the reservation. `None` means the call
    /// writes nothing and `*end_offset` already holds `start_offset`.
    fn start(
        lookup: &'a SmallNaLookupTable,
        subject: &CompressedSequence<'_>,
        start_offset: usize,
        out: &'a mut [OffsetPair],
        max_hits: usize,
        end_offset: &mut usize,
    ) -> Option<(usize, Self)> {
        let last_offset = scan_window(subject, start_offset, lookup.word_length, end_offset)?;
        let Some(limit) = max_hits.min(out.len()).checked_sub(lookup.longest_chain) else {
            *end_offset = start_offset;
            return None;
        };
        Some((
            last_offset,
            Self {
                lookup,
                out,
                limit,
                total: 0,
            },
        ))
    }

    #[inline(always)]
    fn access(&mut self, index: usize, s_off: usize) -> bool {
        let lookup = self.lookup;
        let entry = lookup.entry(index);
        if entry == SmallNaEntry::Empty {
            return true;
        }
        if self.total > self.limit {
            return false;
        }

        debug_assert!(s_off <= MAX_SUBJECT_LENGTH);
        let s_off = s_off as u32;
        match entry {
            SmallNaEntry::Empty => {}
            SmallNaEntry::Single(q_off) => {
                self.out[self.total] = OffsetPair::new(q_off as u32, s_off);
                self.total += 1;
            }
            SmallNaEntry::Overflow(cursor) => {
                for q_off in lookup.overflow_run(cursor) {
                    self.out[self.total] = OffsetPair::new(q_off as u32, s_off);
                    self.total += 1;
                }
            }
        }
        true
    }
}

/// Width 8, byte-aligned stride 4.
pub fn small_na_scan_subject_8_4(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    debug_assert_eq!(lookup.word_length, 8);
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();

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
pub fn small_na_scan_subject_any(
    lookup: &SmallNaLookupTable,
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

    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let window_end = (*end_offset).min(subject.len());
    let data = subject.data();

    if lut_word_length > 5 {
        if scan_step % COMPRESSION_RATIO == 0 {
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

pub fn small_na_scan_subject_4_1(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 8) - 1;
    debug_assert_eq!(lookup.word_length, 4);
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = match phase {
        1 => data[s] as usize,
        2 | 3 => read2(data, s),
        _ => 0,
    };

    'scan: loop {
        'base_3: {
            'base_2: {
                'base_1: {
                    match phase {
                        1 => break 'base_1,
                        2 => break 'base_2,
                        3 => break 'base_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    init_index = data[s] as usize;
                    if !hits.access(init_index, s_off) {
                        break 'scan;
                    }
                    s_off += 1;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                init_index = init_index << 8 | data[s + 1] as usize;
                if !hits.access((init_index >> 6) & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += 1;
            }
            if s_off > last_offset {
                break 'scan;
            }
            if !hits.access((init_index >> 4) & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += 1;
        }
        if s_off > last_offset {
            break 'scan;
        }
        s += 1;
        if !hits.access((init_index >> 2) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 1;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

pub fn small_na_scan_subject_5_1(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 10) - 1;
    debug_assert_eq!(lookup.word_length, 5);
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 0 { 0 } else { read2(data, s) };

    'scan: loop {
        'base_3: {
            'base_2: {
                'base_1: {
                    match phase {
                        1 => break 'base_1,
                        2 => break 'base_2,
                        3 => break 'base_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    init_index = read2(data, s);
                    if !hits.access(init_index >> 6, s_off) {
                        break 'scan;
                    }
                    s_off += 1;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                if !hits.access((init_index >> 4) & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += 1;
            }
            if s_off > last_offset {
                break 'scan;
            }
            if !hits.access((init_index >> 2) & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += 1;
        }
        if s_off > last_offset {
            break 'scan;
        }
        s += 1;
        if !hits.access(init_index & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 1;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

pub fn small_na_scan_subject_6_1(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 12) - 1;
    debug_assert_eq!(lookup.word_length, 6);
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 0 { 0 } else { read2(data, s) };

    'scan: loop {
        'base_3: {
            'base_2: {
                'base_1: {
                    match phase {
                        1 => break 'base_1,
                        2 => break 'base_2,
                        3 => break 'base_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    init_index = read2(data, s);
                    if !hits.access(init_index >> 4, s_off) {
                        break 'scan;
                    }
                    s_off += 1;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                if !hits.access((init_index >> 2) & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += 1;
            }
            if s_off > last_offset {
                break 'scan;
            }
            if !hits.access(init_index & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += 1;
        }
        if s_off > last_offset {
            break 'scan;
        }
        init_index = init_index << 8 | data[s + 2] as usize;
        s += 1;
        if !hits.access((init_index >> 6) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 1;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 6, stride 2. Starts must be even.
pub fn small_na_scan_subject_6_2(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 12) - 1;
    debug_assert_eq!(lookup.word_length, 6);
    debug_assert!(start_offset % 2 == 0, "odd start for a stride-2 scan");
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 2 { read2(data, s) } else { 0 };

    'scan: loop {
        'base_2: {
            if phase == 2 {
                break 'base_2;
            }
            if s_off > last_offset {
                break 'scan;
            }
            init_index = read2(data, s);
            if !hits.access(init_index >> 4, s_off) {
                break 'scan;
            }
            s_off += 2;
        }
        if s_off > last_offset {
            break 'scan;
        }
        s += 1;
        if !hits.access(init_index & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 2;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

pub fn small_na_scan_subject_7_1(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 14) - 1;
    debug_assert_eq!(lookup.word_length, 7);
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = match phase {
        1 | 2 => read2(data, s),
        3 => read3(data, s),
        _ => 0,
    };

    'scan: loop {
        'base_3: {
            'base_2: {
                'base_1: {
                    match phase {
                        1 => break 'base_1,
                        2 => break 'base_2,
                        3 => break 'base_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    init_index = read2(data, s);
                    if !hits.access(init_index >> 2, s_off) {
                        break 'scan;
                    }
                    s_off += 1;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                if !hits.access(init_index & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += 1;
            }
            if s_off > last_offset {
                break 'scan;
            }
            init_index = init_index << 8 | data[s + 2] as usize;
            if !hits.access((init_index >> 6) & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += 1;
        }
        if s_off > last_offset {
            break 'scan;
        }
        s += 1;
        if !hits.access((init_index >> 4) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 1;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 7, stride 2. Starts must be even.
pub fn small_na_scan_subject_7_2(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 14) - 1;
    debug_assert_eq!(lookup.word_length, 7);
    debug_assert!(start_offset % 2 == 0, "odd start for a stride-2 scan");
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 2 { read2(data, s) } else { 0 };

    'scan: loop {
        'base_2: {
            if phase == 2 {
                break 'base_2;
            }
            if s_off > last_offset {
                break 'scan;
            }
            init_index = read2(data, s);
            if !hits.access(init_index >> 2, s_off) {
                break 'scan;
            }
            s_off += 2;
        }
        if s_off > last_offset {
            break 'scan;
        }
        init_index = init_index << 8 | data[s + 2] as usize;
        s += 1;
        if !hits.access((init_index >> 6) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 2;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 7, stride 3. Phases are visited in the order 0, 3, 2, 1.
pub fn small_na_scan_subject_7_3(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 14) - 1;
    debug_assert_eq!(lookup.word_length, 7);
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = (start_offset / COMPRESSION_RATIO) as isize;
    let mut s_off = start_offset;
    let mut init_index = 0usize;
    // the labels follow the unrolled order: phase 3 is the second step
    let mut entry = 0;
    match start_offset % COMPRESSION_RATIO {
        1 => {
            init_index = byte_at(data, s) << 8 | byte_at(data, s + 1);
            s -= 2;
            entry = 3;
        }
        2 => {
            init_index = byte_at(data, s) << 8 | byte_at(data, s + 1);
            s -= 1;
            entry = 2;
        }
        3 => {
            init_index = byte_at(data, s) << 8 | byte_at(data, s + 1);
            entry = 1;
        }
        _ => {}
    }

    'scan: loop {
        'step_3: {
            'step_2: {
                'step_1: {
                    match entry {
                        1 => break 'step_1,
                        2 => break 'step_2,
                        3 => break 'step_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    init_index = byte_at(data, s) << 8 | byte_at(data, s + 1);
                    if !hits.access((init_index >> 2) & LUT_WORD_MASK, s_off) {
                        break 'scan;
                    }
                    s_off += 3;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                init_index = init_index << 8 | byte_at(data, s + 2);
                if !hits.access((init_index >> 4) & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += 3;
            }
            if s_off > last_offset {
                break 'scan;
            }
            init_index = init_index << 8 | byte_at(data, s + 3);
            if !hits.access((init_index >> 6) & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += 3;
        }
        if s_off > last_offset {
            break 'scan;
        }
        s += 3;
        if !hits.access(init_index & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 3;
        entry = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 8, stride 4k + 1.
pub fn small_na_scan_subject_8_1_mod4(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 16) - 1;
    debug_assert_eq!(lookup.word_length, 8);
    let scan_step = lookup.scan_step;
    let scan_step_byte = scan_step / COMPRESSION_RATIO;
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;

    'scan: loop {
        'base_3: {
            'base_2: {
                'base_1: {
                    match phase {
                        1 => break 'base_1,
                        2 => break 'base_2,
                        3 => break 'base_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    let index = read2(data, s);
                    s += scan_step_byte;
                    if !hits.access(index, s_off) {
                        break 'scan;
                    }
                    s_off += scan_step;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                let index = read3(data, s);
                s += scan_step_byte;
                if !hits.access((index >> 6) & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += scan_step;
            }
            if s_off > last_offset {
                break 'scan;
            }
            let index = read3(data, s);
            s += scan_step_byte;
            if !hits.access((index >> 4) & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += scan_step;
        }
        if s_off > last_offset {
            break 'scan;
        }
        let index = read3(data, s);
        s += scan_step_byte + 1;
        if !hits.access((index >> 2) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += scan_step;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 8, stride 4k + 2. Starts must be even.
pub fn small_na_scan_subject_8_2_mod4(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 16) - 1;
    debug_assert_eq!(lookup.word_length, 8);
    debug_assert!(start_offset % 2 == 0, "odd start for a stride-2 scan");
    let scan_step = lookup.scan_step;
    let scan_step_byte = scan_step / COMPRESSION_RATIO;
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;

    'scan: loop {
        'base_2: {
            if phase == 2 {
                break 'base_2;
            }
            if s_off > last_offset {
                break 'scan;
            }
            let index = read2(data, s);
            s += scan_step_byte;
            if !hits.access(index, s_off) {
                break 'scan;
            }
            s_off += scan_step;
        }
        if s_off > last_offset {
            break 'scan;
        }
        let index = read3(data, s);
        s += scan_step_byte + 1;
        if !hits.access((index >> 4) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += scan_step;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 8, stride 4k + 3. Phases are visited in the order 0, 3, 2, 1.
pub fn small_na_scan_subject_8_3_mod4(
    lookup: &SmallNaLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 16) - 1;
    debug_assert_eq!(lookup.word_length, 8);
    let scan_step = lookup.scan_step;
    let scan_step_byte = (scan_step / COMPRESSION_RATIO) as isize;
    let Some((last_offset, mut hits)) =
        SmallNaHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = (start_offset / COMPRESSION_RATIO) as isize;
    let mut s_off = start_offset;
    let mut entry = match start_offset % COMPRESSION_RATIO {
        1 => {
            s -= 2;
            3
        }
        2 => {
            s -= 1;
            2
        }
        3 => 1,
        _ => 0,
    };

    'scan: loop {
        'step_3: {
            'step_2: {
                'step_1: {
                    match entry {
                        1 => break 'step_1,
                        2 => break 'step_2,
                        3 => break 'step_3,
                        _ => {}
                    }
                    if s_off > last_offset {
                        break 'scan;
                    }
                    let index = byte_at(data, s) << 8 | byte_at(data, s + 1);
                    s += scan_step_byte;
                    if !hits.access(index, s_off) {
                        break 'scan;
                    }
                    s_off += scan_step;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                let index =
                    byte_at(data, s) << 16 | byte_at(data, s + 1) << 8 | byte_at(data, s + 2);
                s += scan_step_byte;
                if !hits.access((index >> 2) & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += scan_step;
            }
            if s_off > last_offset {
                break 'scan;
            }
            let index =
                byte_at(data, s + 1) << 16 | byte_at(data, s + 2) << 8 | byte_at(data, s + 3);
            s += scan_step_byte;
            if !hits.access((index >> 4) & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += scan_step;
        }
        if s_off > last_offset {
            break 'scan;
        }
        let index = byte_at(data, s + 2) << 16 | byte_at(data, s + 3) << 8 | byte_at(data, s + 4);
        s += scan_step_byte + 3;
        if !hits.access((index >> 6) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += scan_step;
        entry = 0;
    }

    *end_offset = s_off;
    hits.total
}
