//! Scanning with the hashed table, contiguous words
//!
//! Every probe tests the presence vector first; only words whose bit is set
//! walk their chain. A set bit may still lead to an empty chain when buckets
//! are shared, which costs one extra read but never a wrong hit.

use super::{byte_at, read3, read4, scan_window, wide_read_end};
use crate::core::blast_encoding::{CompressedSequence, COMPRESSION_RATIO, MAX_SUBJECT_LENGTH};
use crate::core::blast_lookup::OffsetPair;
use crate::core::blast_nalookup::{chain, MbLookupTable};

/// Output cursor shared by the contiguous and discontiguous routines.
pub(super) struct MbHits<'a> {
    lookup: &'a MbLookupTable,
    out: &'a mut [OffsetPair],
    /// Capacity left once the longest chain is reserved.
    limit: usize,
    pub(super) total: usize,
}

impl<'a> MbHits<'a> {
    /// Resolve the scan window (one word spans `template_length` bases) and
    /// the reservation. `None` means the call writes nothing and
    /// `*end_offset` already holds `start_offset`.
    pub(super) fn start(
        lookup: &'a MbLookupTable,
        subject: &CompressedSequence<'_>,
        start_offset: usize,
        out: &'a mut [OffsetPair],
        max_hits: usize,
        end_offset: &mut usize,
    ) -> Option<(usize, Self)> {
        let last_offset = scan_window(subject, start_offset, lookup.template_length, end_offset)?;
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

    /// Probe the primary hashtable; `false` once the buffer is full and the
    /// word at `s_off` was left for the next call.
    #[inline(always)]
    pub(super) fn access(&mut self, index: usize, s_off: usize) -> bool {
        let lookup = self.lookup;
        if !lookup.has_hits(index) {
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.retrieve(&lookup.hashtable, &lookup.next_pos, index, s_off);
        true
    }

    /// Probe `hashtable` without a capacity check. The caller tests
    /// [`MbHits::is_full`] after the position.
    #[inline(always)]
    pub(super) fn probe(&mut self, hashtable: &[u32], next_pos: &[u32], index: usize, s_off: usize) {
        if self.lookup.has_hits(index) {
            self.retrieve(hashtable, next_pos, index, s_off);
        }
    }

    #[inline(always)]
    pub(super) fn is_full(&self) -> bool {
        self.total >= self.limit
    }

    #[inline(always)]
    fn retrieve(&mut self, hashtable: &[u32], next_pos: &[u32], index: usize, s_off: usize) {
        debug_assert!(s_off <= MAX_SUBJECT_LENGTH);
        let s_off = s_off as u32;
        for q_off in chain(hashtable, next_pos, index) {
            self.out[self.total] = OffsetPair::new(q_off, s_off);
            self.total += 1;
        }
    }
}

/// Any width from 9 to 12 at any positive stride.
pub fn mb_scan_subject_any(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    let lut_word_length = lookup.word_length;
    let scan_step = lookup.scan_step;
    let mask = lookup.hashsize - 1;
    debug_assert!((9..=12).contains(&lut_word_length));
    debug_assert!(scan_step > 0);

    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let window_end = (*end_offset).min(subject.len());
    let data = subject.data();

    if scan_step % COMPRESSION_RATIO == 0 {
        // aligned words: three bytes hold the word plus trailing bases
        let s_end = last_offset / COMPRESSION_RATIO;
        let shift = 2 * (12 - lut_word_length);
        let step_bytes = scan_step / COMPRESSION_RATIO;
        let mut s = start_offset / COMPRESSION_RATIO;
        while s <= s_end {
            if !hits.access(read3(data, s) >> shift, s * COMPRESSION_RATIO) {
                break;
            }
            s += step_bytes;
        }
        *end_offset = s * COMPRESSION_RATIO;
    } else if lut_word_length > 9 {
        let four_byte_end = wide_read_end(last_offset, window_end, lut_word_length, 10);
        let mut s_off = start_offset;
        'scan: {
            while s_off < four_byte_end {
                let shift = 2 * (16 - (s_off % COMPRESSION_RATIO + lut_word_length));
                let index = (read4(data, s_off / COMPRESSION_RATIO) >> shift) & mask;
                if !hits.access(index, s_off) {
                    break 'scan;
                }
                s_off += scan_step;
            }
            // at most two offsets remain; three bytes cover them
            while s_off <= last_offset {
                let shift = 2 * (12 - (s_off % COMPRESSION_RATIO + lut_word_length));
                let index = (read3(data, s_off / COMPRESSION_RATIO) >> shift) & mask;
                if !hits.access(index, s_off) {
                    break 'scan;
                }
                s_off += scan_step;
            }
        }
        *end_offset = s_off;
    } else {
        let mut s_off = start_offset;
        while s_off <= last_offset {
            let shift = 2 * (12 - (s_off % COMPRESSION_RATIO + lut_word_length));
            let index = (read3(data, s_off / COMPRESSION_RATIO) >> shift) & mask;
            if !hits.access(index, s_off) {
                break;
            }
            s_off += scan_step;
        }
        *end_offset = s_off;
    }

    hits.total
}

pub fn mb_scan_subject_9_1(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 18) - 1;
    debug_assert_eq!(lookup.word_length, 9);
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 0 { 0 } else { read3(data, s) };

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
                    init_index = read3(data, s);
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

/// Width 9, stride 2. Starts must be even.
pub fn mb_scan_subject_9_2(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 18) - 1;
    debug_assert_eq!(lookup.word_length, 9);
    debug_assert!(start_offset % 2 == 0, "odd start for a stride-2 scan");
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 2 { read3(data, s) } else { 0 };

    'scan: loop {
        'base_2: {
            if phase == 2 {
                break 'base_2;
            }
            if s_off > last_offset {
                break 'scan;
            }
            init_index = read3(data, s);
            if !hits.access(init_index >> 6, s_off) {
                break 'scan;
            }
            s_off += 2;
        }
        if s_off > last_offset {
            break 'scan;
        }
        s += 1;
        if !hits.access((init_index >> 2) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 2;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

pub fn mb_scan_subject_10_1(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 20) - 1;
    debug_assert_eq!(lookup.word_length, 10);
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 0 { 0 } else { read3(data, s) };

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
                    init_index = read3(data, s);
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
        init_index = init_index << 8 | data[s + 3] as usize;
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

/// Width 10, stride 2. Starts must be even.
pub fn mb_scan_subject_10_2(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 20) - 1;
    debug_assert_eq!(lookup.word_length, 10);
    debug_assert!(start_offset % 2 == 0, "odd start for a stride-2 scan");
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = start_offset / COMPRESSION_RATIO;
    let mut s_off = start_offset;
    let mut phase = start_offset % COMPRESSION_RATIO;
    let mut init_index = if phase == 2 { read3(data, s) } else { 0 };

    'scan: loop {
        'base_2: {
            if phase == 2 {
                break 'base_2;
            }
            if s_off > last_offset {
                break 'scan;
            }
            init_index = read3(data, s);
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

/// Width 10, stride 3. Phases are visited in the order 0, 3, 2, 1.
pub fn mb_scan_subject_10_3(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 20) - 1;
    debug_assert_eq!(lookup.word_length, 10);
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
    else {
        return 0;
    };
    let data = subject.data();
    let mut s = (start_offset / COMPRESSION_RATIO) as isize;
    let mut s_off = start_offset;
    let mut init_index = 0usize;
    let mut entry = 0;
    match start_offset % COMPRESSION_RATIO {
        1 => {
            init_index = byte_at(data, s) << 8 | byte_at(data, s + 1);
            s -= 2;
            entry = 3;
        }
        2 => {
            init_index = byte_at(data, s) << 16 | byte_at(data, s + 1) << 8 | byte_at(data, s + 2);
            s -= 1;
            entry = 2;
        }
        3 => {
            init_index = byte_at(data, s) << 16 | byte_at(data, s + 1) << 8 | byte_at(data, s + 2);
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
                    init_index =
                        byte_at(data, s) << 16 | byte_at(data, s + 1) << 8 | byte_at(data, s + 2);
                    if !hits.access(init_index >> 4, s_off) {
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
            if !hits.access(init_index & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += 3;
        }
        if s_off > last_offset {
            break 'scan;
        }
        init_index = init_index << 8 | byte_at(data, s + 4);
        s += 3;
        if !hits.access((init_index >> 2) & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += 3;
        entry = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 11, stride 4k + 1.
pub fn mb_scan_subject_11_1_mod4(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 22) - 1;
    debug_assert_eq!(lookup.word_length, 11);
    let scan_step = lookup.scan_step;
    let scan_step_byte = scan_step / COMPRESSION_RATIO;
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
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
                    let index = read3(data, s) >> 2;
                    s += scan_step_byte;
                    if !hits.access(index, s_off) {
                        break 'scan;
                    }
                    s_off += scan_step;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                let index = read3(data, s) & LUT_WORD_MASK;
                s += scan_step_byte;
                if !hits.access(index, s_off) {
                    break 'scan;
                }
                s_off += scan_step;
            }
            if s_off > last_offset {
                break 'scan;
            }
            let index = (read4(data, s) >> 6) & LUT_WORD_MASK;
            s += scan_step_byte;
            if !hits.access(index, s_off) {
                break 'scan;
            }
            s_off += scan_step;
        }
        if s_off > last_offset {
            break 'scan;
        }
        let index = (read4(data, s) >> 4) & LUT_WORD_MASK;
        s += scan_step_byte + 1;
        if !hits.access(index, s_off) {
            break 'scan;
        }
        s_off += scan_step;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 11, stride 4k + 2. Starts must be even.
pub fn mb_scan_subject_11_2_mod4(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 22) - 1;
    debug_assert_eq!(lookup.word_length, 11);
    debug_assert!(start_offset % 2 == 0, "odd start for a stride-2 scan");
    let scan_step = lookup.scan_step;
    let scan_step_byte = scan_step / COMPRESSION_RATIO;
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
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
            let index = read3(data, s) >> 2;
            s += scan_step_byte;
            if !hits.access(index, s_off) {
                break 'scan;
            }
            s_off += scan_step;
        }
        if s_off > last_offset {
            break 'scan;
        }
        let index = (read4(data, s) >> 6) & LUT_WORD_MASK;
        s += scan_step_byte + 1;
        if !hits.access(index, s_off) {
            break 'scan;
        }
        s_off += scan_step;
        phase = 0;
    }

    *end_offset = s_off;
    hits.total
}

/// Width 11, stride 4k + 3. Phases are visited in the order 0, 3, 2, 1.
pub fn mb_scan_subject_11_3_mod4(
    lookup: &MbLookupTable,
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    offset_pairs: &mut [OffsetPair],
    max_hits: usize,
    end_offset: &mut usize,
) -> usize {
    const LUT_WORD_MASK: usize = (1 << 22) - 1;
    debug_assert_eq!(lookup.word_length, 11);
    let scan_step = lookup.scan_step;
    let scan_step_byte = (scan_step / COMPRESSION_RATIO) as isize;
    let Some((last_offset, mut hits)) =
        MbHits::start(lookup, subject, start_offset, offset_pairs, max_hits, end_offset)
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
                    let index = (byte_at(data, s) << 16
                        | byte_at(data, s + 1) << 8
                        | byte_at(data, s + 2))
                        >> 2;
                    s += scan_step_byte;
                    if !hits.access(index, s_off) {
                        break 'scan;
                    }
                    s_off += scan_step;
                }
                if s_off > last_offset {
                    break 'scan;
                }
                let index = byte_at(data, s) << 24
                    | byte_at(data, s + 1) << 16
                    | byte_at(data, s + 2) << 8
                    | byte_at(data, s + 3);
                s += scan_step_byte;
                if !hits.access((index >> 4) & LUT_WORD_MASK, s_off) {
                    break 'scan;
                }
                s_off += scan_step;
            }
            if s_off > last_offset {
                break 'scan;
            }
            let index = byte_at(data, s + 1) << 24
                | byte_at(data, s + 2) << 16
                | byte_at(data, s + 3) << 8
                | byte_at(data, s + 4);
            s += scan_step_byte;
            if !hits.access((index >> 6) & LUT_WORD_MASK, s_off) {
                break 'scan;
            }
            s_off += scan_step;
        }
        if s_off > last_offset {
            break 'scan;
        }
        let index = byte_at(data, s + 2) << 16 | byte_at(data, s + 3) << 8 | byte_at(data, s + 4);
        s += scan_step_byte + 3;
        if !hits.access(index & LUT_WORD_MASK, s_off) {
            break 'scan;
        }
        s_off += scan_step;
        entry = 0;
    }

    *end_offset = s_off;
    hits.total
}
