//! Nucleotide subject scanning
//!
//! Every routine walks a 2-bit packed subject from `start_offset`, extracts
//! successive words, probes a lookup table and appends `(q_off, s_off)` pairs
//! to the caller's buffer. All of them share one contract:
//!
//! - `*end_offset` on entry is the exclusive end of the scan window (clamped
//!   to the subject length); on exit it is the first position not scanned.
//! - If no whole word fits in the window, nothing is written,
//!   `*end_offset = start_offset` and 0 is returned.
//! - Before writing the hits of a position the routine checks capacity. When
//!   the check fails it stops without consuming that position, so the next
//!   call starting at `*end_offset` finds the same word again.
//! - Routines whose stride is a multiple of four only visit byte-aligned
//!   positions and round `start_offset` down to a byte boundary.
//!
//! The specialised routines unroll the scan loop by base phase (`offset % 4`).
//! The phase is resolved once on entry; afterwards each pass of the loop walks
//! the phases in order, so shifts are fixed per phase.

mod discontiguous;
mod megablast;
mod small;
mod standard;

use std::fmt;

use tracing::debug;

use crate::core::blast_encoding::CompressedSequence;
use crate::core::blast_lookup::OffsetPair;
use crate::core::blast_nalookup::{
    DiscTemplate, LookupTable, MbLookupTable, NaLookupTable, SmallNaLookupTable, TableKind,
};

pub use discontiguous::{
    mb_disc_word_scan_subject_1, mb_disc_word_scan_subject_11_18_1,
    mb_disc_word_scan_subject_11_21_1, mb_disc_word_scan_subject_any,
};
pub use megablast::{
    mb_scan_subject_10_1, mb_scan_subject_10_2, mb_scan_subject_10_3, mb_scan_subject_11_1_mod4,
    mb_scan_subject_11_2_mod4, mb_scan_subject_11_3_mod4, mb_scan_subject_9_1,
    mb_scan_subject_9_2, mb_scan_subject_any,
};
pub use small::{
    small_na_scan_subject_4_1, small_na_scan_subject_5_1, small_na_scan_subject_6_1,
    small_na_scan_subject_6_2, small_na_scan_subject_7_1, small_na_scan_subject_7_2,
    small_na_scan_subject_7_3, small_na_scan_subject_8_1_mod4, small_na_scan_subject_8_2_mod4,
    small_na_scan_subject_8_3_mod4, small_na_scan_subject_8_4, small_na_scan_subject_any,
};
pub use standard::{na_scan_subject_8_4, na_scan_subject_any};

/// Uniform scan routine signature.
///
/// `(table, subject, start_offset, offset_pairs, max_hits, end_offset) -> hits written`
pub type ScanSubjectFn<T> =
    fn(&T, &CompressedSequence<'_>, usize, &mut [OffsetPair], usize, &mut usize) -> usize;

/// The closed set of scan routines, one per table kind, word length and stride bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanStrategy {
    NaScan8x4,
    NaScanAny,
    SmallNaScan8x4,
    SmallNaScanAny,
    SmallNaScan4x1,
    SmallNaScan5x1,
    SmallNaScan6x1,
    SmallNaScan6x2,
    SmallNaScan7x1,
    SmallNaScan7x2,
    SmallNaScan7x3,
    SmallNaScan8x1Mod4,
    SmallNaScan8x2Mod4,
    SmallNaScan8x3Mod4,
    MbAny,
    Mb9x1,
    Mb9x2,
    Mb10x1,
    Mb10x2,
    Mb10x3,
    Mb11x1Mod4,
    Mb11x2Mod4,
    Mb11x3Mod4,
    MbDiscAny,
    MbDisc1,
    MbDisc11x18x1,
    MbDisc11x21x1,
}

impl ScanStrategy {
    pub const ALL: [ScanStrategy; 27] = [
        ScanStrategy::NaScan8x4,
        ScanStrategy::NaScanAny,
        ScanStrategy::SmallNaScan8x4,
        ScanStrategy::SmallNaScanAny,
        ScanStrategy::SmallNaScan4x1,
        ScanStrategy::SmallNaScan5x1,
        ScanStrategy::SmallNaScan6x1,
        ScanStrategy::SmallNaScan6x2,
        ScanStrategy::SmallNaScan7x1,
        ScanStrategy::SmallNaScan7x2,
        ScanStrategy::SmallNaScan7x3,
        ScanStrategy::SmallNaScan8x1Mod4,
        ScanStrategy::SmallNaScan8x2Mod4,
        ScanStrategy::SmallNaScan8x3Mod4,
        ScanStrategy::MbAny,
        ScanStrategy::Mb9x1,
        ScanStrategy::Mb9x2,
        ScanStrategy::Mb10x1,
        ScanStrategy::Mb10x2,
        ScanStrategy::Mb10x3,
        ScanStrategy::Mb11x1Mod4,
        ScanStrategy::Mb11x2Mod4,
        ScanStrategy::Mb11x3Mod4,
        ScanStrategy::MbDiscAny,
        ScanStrategy::MbDisc1,
        ScanStrategy::MbDisc11x18x1,
        ScanStrategy::MbDisc11x21x1,
    ];

    pub fn table_kind(self) -> TableKind {
        use ScanStrategy::*;
        match self {
            NaScan8x4 | NaScanAny => TableKind::Na,
            SmallNaScan8x4 | SmallNaScanAny | SmallNaScan4x1 | SmallNaScan5x1 | SmallNaScan6x1
            | SmallNaScan6x2 | SmallNaScan7x1 | SmallNaScan7x2 | SmallNaScan7x3
            | SmallNaScan8x1Mod4 | SmallNaScan8x2Mod4 | SmallNaScan8x3Mod4 => TableKind::SmallNa,
            _ => TableKind::Mb,
        }
    }

    /// Whether this routine scans `table` correctly.
    ///
    /// More than one routine usually applies; the selectors pick one of them.
    pub fn is_applicable(self, table: &LookupTable) -> bool {
        use ScanStrategy::*;
        match table {
            LookupTable::Na(t) => {
                let (wl, step) = (t.word_length, t.scan_step);
                match self {
                    NaScan8x4 => wl == 8 && (step == 0 || step == 4),
                    NaScanAny => step > 0,
                    _ => false,
                }
            }
            LookupTable::SmallNa(t) => {
                let (wl, step) = (t.word_length, t.scan_step);
                match self {
                    SmallNaScan8x4 => wl == 8 && (step == 0 || step == 4),
                    SmallNaScanAny => step > 0,
                    SmallNaScan4x1 => wl == 4 && step == 1,
                    SmallNaScan5x1 => wl == 5 && step == 1,
                    SmallNaScan6x1 => wl == 6 && step == 1,
                    SmallNaScan6x2 => wl == 6 && step == 2,
                    SmallNaScan7x1 => wl == 7 && step == 1,
                    SmallNaScan7x2 => wl == 7 && step == 2,
                    SmallNaScan7x3 => wl == 7 && step == 3,
                    SmallNaScan8x1Mod4 => wl == 8 && step % 4 == 1,
                    SmallNaScan8x2Mod4 => wl == 8 && step % 4 == 2,
                    SmallNaScan8x3Mod4 => wl == 8 && step % 4 == 3,
                    _ => false,
                }
            }
            LookupTable::Mb(t) => match &t.discontiguous {
                Some(disc) => {
                    let single_stride1 = !disc.full_byte_scan && disc.second.is_none();
                    match self {
                        MbDiscAny => true,
                        MbDisc1 => single_stride1,
                        MbDisc11x18x1 => {
                            single_stride1 && disc.template_type == DiscTemplate::Template11x18Coding
                        }
                        MbDisc11x21x1 => {
                            single_stride1 && disc.template_type == DiscTemplate::Template11x21Coding
                        }
                        _ => false,
                    }
                }
                None => {
                    let (wl, step) = (t.word_length, t.scan_step);
                    match self {
                        MbAny => step > 0,
                        Mb9x1 => wl == 9 && step == 1,
                        Mb9x2 => wl == 9 && step == 2,
                        Mb10x1 => wl == 10 && step == 1,
                        Mb10x2 => wl == 10 && step == 2,
                        Mb10x3 => wl == 10 && step == 3,
                        Mb11x1Mod4 => wl == 11 && step % 4 == 1,
                        Mb11x2Mod4 => wl == 11 && step % 4 == 2,
                        Mb11x3Mod4 => wl == 11 && step % 4 == 3,
                        _ => false,
                    }
                }
            },
        }
    }

    /// Stride-2 routines only unroll the even phases, so they must start on
    /// an even offset; every other routine accepts any start.
    pub fn accepts_start(self, start_offset: usize) -> bool {
        use ScanStrategy::*;
        match self {
            SmallNaScan6x2 | SmallNaScan7x2 | SmallNaScan8x2Mod4 | Mb9x2 | Mb10x2 | Mb11x2Mod4 => {
                start_offset % 2 == 0
            }
            _ => true,
        }
    }

    pub fn name(self) -> &'static str {
        use ScanStrategy::*;
        match self {
            NaScan8x4 => "na_scan_8_4",
            NaScanAny => "na_scan_any",
            SmallNaScan8x4 => "small_na_scan_8_4",
            SmallNaScanAny => "small_na_scan_any",
            SmallNaScan4x1 => "small_na_scan_4_1",
            SmallNaScan5x1 => "small_na_scan_5_1",
            SmallNaScan6x1 => "small_na_scan_6_1",
            SmallNaScan6x2 => "small_na_scan_6_2",
            SmallNaScan7x1 => "small_na_scan_7_1",
            SmallNaScan7x2 => "small_na_scan_7_2",
            SmallNaScan7x3 => "small_na_scan_7_3",
            SmallNaScan8x1Mod4 => "small_na_scan_8_1mod4",
            SmallNaScan8x2Mod4 => "small_na_scan_8_2mod4",
            SmallNaScan8x3Mod4 => "small_na_scan_8_3mod4",
            MbAny => "mb_scan_any",
            Mb9x1 => "mb_scan_9_1",
            Mb9x2 => "mb_scan_9_2",
            Mb10x1 => "mb_scan_10_1",
            Mb10x2 => "mb_scan_10_2",
            Mb10x3 => "mb_scan_10_3",
            Mb11x1Mod4 => "mb_scan_11_1mod4",
            Mb11x2Mod4 => "mb_scan_11_2mod4",
            Mb11x3Mod4 => "mb_scan_11_3mod4",
            MbDiscAny => "mb_disc_scan_any",
            MbDisc1 => "mb_disc_scan_1",
            MbDisc11x18x1 => "mb_disc_scan_11_18_1",
            MbDisc11x21x1 => "mb_disc_scan_11_21_1",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the routine for a standard table.
pub fn choose_na_scan_subject(table: &NaLookupTable) -> ScanStrategy {
    if table.word_length == 8 && table.scan_step == 0 {
        ScanStrategy::NaScan8x4
    } else {
        ScanStrategy::NaScanAny
    }
}

/// Pick the routine for a compact table.
pub fn choose_small_na_scan_subject(table: &SmallNaLookupTable) -> ScanStrategy {
    let scan_step = table.scan_step;
    match table.word_length {
        4 if scan_step == 1 => ScanStrategy::SmallNaScan4x1,
        5 if scan_step == 1 => ScanStrategy::SmallNaScan5x1,
        6 => match scan_step {
            1 => ScanStrategy::SmallNaScan6x1,
            2 => ScanStrategy::SmallNaScan6x2,
            _ => ScanStrategy::SmallNaScanAny,
        },
        7 => match scan_step {
            1 => ScanStrategy::SmallNaScan7x1,
            2 => ScanStrategy::SmallNaScan7x2,
            3 => ScanStrategy::SmallNaScan7x3,
            _ => ScanStrategy::SmallNaScanAny,
        },
        8 if scan_step == 0 || scan_step == 4 => ScanStrategy::SmallNaScan8x4,
        8 => match scan_step % 4 {
            1 => ScanStrategy::SmallNaScan8x1Mod4,
            2 => ScanStrategy::SmallNaScan8x2Mod4,
            3 => ScanStrategy::SmallNaScan8x3Mod4,
            _ => ScanStrategy::SmallNaScanAny,
        },
        _ => ScanStrategy::SmallNaScanAny,
    }
}

/// Pick the routine for a hashed table.
pub fn choose_mb_scan_subject(table: &MbLookupTable) -> ScanStrategy {
    if let Some(disc) = &table.discontiguous {
        if !disc.full_byte_scan && disc.second.is_none() {
            return match disc.template_type {
                DiscTemplate::Template11x18Coding => ScanStrategy::MbDisc11x18x1,
                DiscTemplate::Template11x21Coding => ScanStrategy::MbDisc11x21x1,
                _ => ScanStrategy::MbDisc1,
            };
        }
        return ScanStrategy::MbDiscAny;
    }

    let scan_step = table.scan_step;
    match table.word_length {
        // The stride-1 test is overridden by the stride-2 test's fallback, so
        // width 9 at stride 1 scans with the general routine. Mb9x1 is still
        // available through `LookupTableWrap::with_strategy`.
        9 => match scan_step {
            2 => ScanStrategy::Mb9x2,
            _ => ScanStrategy::MbAny,
        },
        10 => match scan_step {
            1 => ScanStrategy::Mb10x1,
            2 => ScanStrategy::Mb10x2,
            3 => ScanStrategy::Mb10x3,
            _ => ScanStrategy::MbAny,
        },
        11 => match scan_step % 4 {
            1 => ScanStrategy::Mb11x1Mod4,
            2 => ScanStrategy::Mb11x2Mod4,
            3 => ScanStrategy::Mb11x3Mod4,
            _ => ScanStrategy::MbAny,
        },
        // wide tables are bound by memory latency, not word extraction
        _ => ScanStrategy::MbAny,
    }
}

/// Pick the routine for any table. Runs once, when the table is sealed.
pub fn choose_scan_subject(table: &LookupTable) -> ScanStrategy {
    let strategy = match table {
        LookupTable::Na(t) => choose_na_scan_subject(t),
        LookupTable::SmallNa(t) => choose_small_na_scan_subject(t),
        LookupTable::Mb(t) => choose_mb_scan_subject(t),
    };
    debug!(
        table = table.kind().name(),
        word_length = table.word_length(),
        scan_step = table.scan_step(),
        strategy = %strategy,
        "selected scan routine"
    );
    strategy
}

/// Routine for a standard-table strategy.
pub(crate) fn na_scan_fn(strategy: ScanStrategy) -> ScanSubjectFn<NaLookupTable> {
    debug_assert_eq!(strategy.table_kind(), TableKind::Na);
    match strategy {
        ScanStrategy::NaScan8x4 => na_scan_subject_8_4,
        _ => na_scan_subject_any,
    }
}

/// Routine for a compact-table strategy.
pub(crate) fn small_na_scan_fn(strategy: ScanStrategy) -> ScanSubjectFn<SmallNaLookupTable> {
    debug_assert_eq!(strategy.table_kind(), TableKind::SmallNa);
    match strategy {
        ScanStrategy::SmallNaScan8x4 => small_na_scan_subject_8_4,
        ScanStrategy::SmallNaScan4x1 => small_na_scan_subject_4_1,
        ScanStrategy::SmallNaScan5x1 => small_na_scan_subject_5_1,
        ScanStrategy::SmallNaScan6x1 => small_na_scan_subject_6_1,
        ScanStrategy::SmallNaScan6x2 => small_na_scan_subject_6_2,
        ScanStrategy::SmallNaScan7x1 => small_na_scan_subject_7_1,
        ScanStrategy::SmallNaScan7x2 => small_na_scan_subject_7_2,
        ScanStrategy::SmallNaScan7x3 => small_na_scan_subject_7_3,
        ScanStrategy::SmallNaScan8x1Mod4 => small_na_scan_subject_8_1_mod4,
        ScanStrategy::SmallNaScan8x2Mod4 => small_na_scan_subject_8_2_mod4,
        ScanStrategy::SmallNaScan8x3Mod4 => small_na_scan_subject_8_3_mod4,
        _ => small_na_scan_subject_any,
    }
}

/// Routine for a hashed-table strategy.
pub(crate) fn mb_scan_fn(strategy: ScanStrategy) -> ScanSubjectFn<MbLookupTable> {
    debug_assert_eq!(strategy.table_kind(), TableKind::Mb);
    match strategy {
        ScanStrategy::Mb9x1 => mb_scan_subject_9_1,
        ScanStrategy::Mb9x2 => mb_scan_subject_9_2,
        ScanStrategy::Mb10x1 => mb_scan_subject_10_1,
        ScanStrategy::Mb10x2 => mb_scan_subject_10_2,
        ScanStrategy::Mb10x3 => mb_scan_subject_10_3,
        ScanStrategy::Mb11x1Mod4 => mb_scan_subject_11_1_mod4,
        ScanStrategy::Mb11x2Mod4 => mb_scan_subject_11_2_mod4,
        ScanStrategy::Mb11x3Mod4 => mb_scan_subject_11_3_mod4,
        ScanStrategy::MbDiscAny => mb_disc_word_scan_subject_any,
        ScanStrategy::MbDisc1 => mb_disc_word_scan_subject_1,
        ScanStrategy::MbDisc11x18x1 => mb_disc_word_scan_subject_11_18_1,
        ScanStrategy::MbDisc11x21x1 => mb_disc_word_scan_subject_11_21_1,
        _ => mb_scan_subject_any,
    }
}

/// Last word start a call may scan, or `None` (with `*end_offset` reset to
/// `start_offset`) when no whole word of `span` bases fits.
#[inline(always)]
pub(crate) fn scan_window(
    subject: &CompressedSequence<'_>,
    start_offset: usize,
    span: usize,
    end_offset: &mut usize,
) -> Option<usize> {
    let end = (*end_offset).min(subject.len());
    match end.checked_sub(span) {
        Some(last_offset) if start_offset <= last_offset => Some(last_offset),
        _ => {
            *end_offset = start_offset;
            None
        }
    }
}

/// Exclusive bound on offsets that may use the wide read of a general routine.
///
/// The last few offsets of a window whose length is not a multiple of four
/// would fetch a byte past the subject with the wide read; they fall back to
/// the narrow read instead. `min_wide_width` is the narrowest table width
/// that uses the wide read (6 for compact and standard tables, 10 for hashed).
#[inline]
pub(crate) fn wide_read_end(
    last_offset: usize,
    window_end: usize,
    word_length: usize,
    min_wide_width: usize,
) -> usize {
    let margin = (window_end % 4 + min_wide_width - 1).saturating_sub(word_length);
    (last_offset + 1).saturating_sub(margin)
}

#[inline(always)]
pub(crate) fn read2(data: &[u8], s: usize) -> usize {
    (data[s] as usize) << 8 | data[s + 1] as usize
}

#[inline(always)]
pub(crate) fn read3(data: &[u8], s: usize) -> usize {
    (data[s] as usize) << 16 | (data[s + 1] as usize) << 8 | data[s + 2] as usize
}

#[inline(always)]
pub(crate) fn read4(data: &[u8], s: usize) -> usize {
    (data[s] as usize) << 24
        | (data[s + 1] as usize) << 16
        | (data[s + 2] as usize) << 8
        | data[s + 3] as usize
}

/// Byte at a signed cursor. Routines that enter mid-loop step the cursor back
/// before the start; every byte they actually read is in range.
#[inline(always)]
pub(crate) fn byte_at(data: &[u8], s: isize) -> usize {
    data[s as usize] as usize
}
