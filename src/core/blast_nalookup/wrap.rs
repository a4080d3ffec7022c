//! Sealed lookup tables
//!
//! Sealing runs the selector once and stores the chosen routine next to the
//! table. Every later scan goes through the stored routine, so the per-call
//! cost of choosing is a single indirect call.

use tracing::debug;

use super::{LookupTable, MbLookupTable, NaLookupTable, SmallNaLookupTable, TableKind};
use crate::core::blast_encoding::CompressedSequence;
use crate::core::blast_lookup::OffsetPair;
use crate::core::blast_nascan::{
    choose_scan_subject, mb_scan_fn, na_scan_fn, small_na_scan_fn, ScanStrategy, ScanSubjectFn,
};
use crate::error::LookupError;

/// A table of one layout together with the routine that scans it.
#[derive(Debug, Clone)]
pub struct Sealed<T> {
    table: T,
    strategy: ScanStrategy,
    scansub: ScanSubjectFn<T>,
}

impl<T> Sealed<T> {
    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    #[inline]
    pub fn scan_subject(
        &self,
        subject: &CompressedSequence<'_>,
        start_offset: usize,
        offset_pairs: &mut [OffsetPair],
        max_hits: usize,
        end_offset: &mut usize,
    ) -> usize {
        (self.scansub)(
            &self.table,
            subject,
            start_offset,
            offset_pairs,
            max_hits,
            end_offset,
        )
    }
}

/// A lookup table sealed with its scan routine.
///
/// The table is immutable from here on and may be shared between threads.
#[derive(Debug, Clone)]
pub enum LookupTableWrap {
    Na(Sealed<NaLookupTable>),
    SmallNa(Sealed<SmallNaLookupTable>),
    Mb(Sealed<MbLookupTable>),
}

impl LookupTableWrap {
    /// Seal `table` with the routine the selector picks for it.
    pub fn new(table: impl Into<LookupTable>) -> Self {
        let table = table.into();
        let strategy = choose_scan_subject(&table);
        Self::seal(table, strategy)
    }

    /// Seal `table` with an explicitly named routine.
    pub fn with_strategy(
        table: impl Into<LookupTable>,
        strategy: ScanStrategy,
    ) -> Result<Self, LookupError> {
        let table = table.into();
        if !strategy.is_applicable(&table) {
            return Err(LookupError::StrategyNotApplicable { strategy });
        }
        debug!(
            table = table.kind().name(),
            strategy = %strategy,
            "sealing lookup table with requested scan routine"
        );
        Ok(Self::seal(table, strategy))
    }

    fn seal(table: LookupTable, strategy: ScanStrategy) -> Self {
        match table {
            LookupTable::Na(table) => LookupTableWrap::Na(Sealed {
                table,
                strategy,
                scansub: na_scan_fn(strategy),
            }),
            LookupTable::SmallNa(table) => LookupTableWrap::SmallNa(Sealed {
                table,
                strategy,
                scansub: small_na_scan_fn(strategy),
            }),
            LookupTable::Mb(table) => LookupTableWrap::Mb(Sealed {
                table,
                strategy,
                scansub: mb_scan_fn(strategy),
            }),
        }
    }

    pub fn kind(&self) -> TableKind {
        match self {
            LookupTableWrap::Na(_) => TableKind::Na,
            LookupTableWrap::SmallNa(_) => TableKind::SmallNa,
            LookupTableWrap::Mb(_) => TableKind::Mb,
        }
    }

    pub fn strategy(&self) -> ScanStrategy {
        match self {
            LookupTableWrap::Na(s) => s.strategy,
            LookupTableWrap::SmallNa(s) => s.strategy,
            LookupTableWrap::Mb(s) => s.strategy,
        }
    }

    pub fn longest_chain(&self) -> usize {
        match self {
            LookupTableWrap::Na(s) => s.table.longest_chain,
            LookupTableWrap::SmallNa(s) => s.table.longest_chain,
            LookupTableWrap::Mb(s) => s.table.longest_chain,
        }
    }

    /// Bases covered by one scanned word.
    pub fn word_span(&self) -> usize {
        match self {
            LookupTableWrap::Na(s) => s.table.word_length,
            LookupTableWrap::SmallNa(s) => s.table.word_length,
            LookupTableWrap::Mb(s) => s.table.template_length,
        }
    }

    pub fn scan_step(&self) -> usize {
        match self {
            LookupTableWrap::Na(s) => s.table.scan_step,
            LookupTableWrap::SmallNa(s) => s.table.scan_step,
            LookupTableWrap::Mb(s) => s.table.scan_step,
        }
    }

    /// Scan `subject` from `start_offset` with the sealed routine.
    ///
    /// Returns the number of pairs written to `offset_pairs`; `end_offset`
    /// carries the window end in and the resume position out.
    #[inline]
    pub fn scan_subject(
        &self,
        subject: &CompressedSequence<'_>,
        start_offset: usize,
        offset_pairs: &mut [OffsetPair],
        max_hits: usize,
        end_offset: &mut usize,
    ) -> usize {
        debug_assert!(
            self.strategy().accepts_start(start_offset),
            "{} cannot start at offset {}",
            self.strategy(),
            start_offset
        );
        match self {
            LookupTableWrap::Na(s) => {
                s.scan_subject(subject, start_offset, offset_pairs, max_hits, end_offset)
            }
            LookupTableWrap::SmallNa(s) => {
                s.scan_subject(subject, start_offset, offset_pairs, max_hits, end_offset)
            }
            LookupTableWrap::Mb(s) => {
                s.scan_subject(subject, start_offset, offset_pairs, max_hits, end_offset)
            }
        }
    }
}
