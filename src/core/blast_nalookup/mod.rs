//! Nucleotide lookup tables
//!
//! Three layouts map a packed word index to the query offsets where that word
//! occurs:
//!
//! - [`NaLookupTable`]: thick backbone with up to three inline hits per cell
//!   and a shared overflow array.
//! - [`SmallNaLookupTable`]: 16-bit backbone holding either a single offset or
//!   an encoded cursor into a terminated overflow list.
//! - [`MbLookupTable`]: hashtable of chain heads threaded through `next_pos`,
//!   guarded by a presence vector, optionally over discontiguous templates.
//!
//! Tables are read-only once built. [`LookupTableWrap`] seals a table together
//! with the scan routine chosen for it.

mod build;
mod templates;
mod wrap;

pub use build::{compute_mb_pv_params, ilog2};
pub use templates::{compute_discontiguous_index, DiscTemplate};
pub use wrap::{LookupTableWrap, Sealed};

use crate::core::blast_lookup::pv_test_shifted;

pub const NA_HITS_PER_CELL: usize = 3;

/// Largest query a compact table can index (offsets are stored as `i16`).
pub const SMALL_NA_MAX_QUERY_LENGTH: usize = i16::MAX as usize;

/// Backbone cell of the standard table.
///
/// Up to [`NA_HITS_PER_CELL`] query offsets live inline. Above that,
/// `entries[0]` is the cursor of the run in the overflow array.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NaLookupBackboneCell {
    pub num_used: u32,
    pub entries: [u32; NA_HITS_PER_CELL],
}

impl NaLookupBackboneCell {
    /// Overflow cursor; only meaningful when `num_used > NA_HITS_PER_CELL`.
    #[inline(always)]
    pub fn overflow_cursor(&self) -> usize {
        self.entries[0] as usize
    }
}

/// Standard nucleotide lookup table (word lengths 4 to 8).
#[derive(Debug, Clone)]
pub struct NaLookupTable {
    pub word_length: usize,
    /// Bases between scanned words; 0 means byte-aligned stride 4 (width 8 only).
    pub scan_step: usize,
    pub mask: usize,
    pub backbone_size: usize,
    pub longest_chain: usize,
    pub thick_backbone: Vec<NaLookupBackboneCell>,
    pub overflow: Vec<u32>,
    pub pv: Vec<u32>,
}

impl NaLookupTable {
    /// Query offsets stored for `index`, in table order.
    pub fn hits(&self, index: usize) -> &[u32] {
        let cell = &self.thick_backbone[index];
        let num = cell.num_used as usize;
        if num <= NA_HITS_PER_CELL {
            &cell.entries[..num]
        } else {
            let start = cell.overflow_cursor();
            &self.overflow[start..start + num]
        }
    }
}

/// Decoded backbone value of a compact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallNaEntry {
    Empty,
    Single(u16),
    /// Start of a run in `overflow`, terminated by a negative value.
    Overflow(usize),
}

impl SmallNaEntry {
    #[inline(always)]
    pub fn decode(raw: i16) -> Self {
        match raw {
            -1 => SmallNaEntry::Empty,
            q if q >= 0 => SmallNaEntry::Single(q as u16),
            cursor => SmallNaEntry::Overflow((-(cursor as i32 + 2)) as usize),
        }
    }

    pub fn encode(self) -> i16 {
        match self {
            SmallNaEntry::Empty => -1,
            SmallNaEntry::Single(q) => q as i16,
            SmallNaEntry::Overflow(cursor) => -(cursor as i32 + 2) as i16,
        }
    }
}

/// Compact nucleotide lookup table for short queries (word lengths 4 to 8).
#[derive(Debug, Clone)]
pub struct SmallNaLookupTable {
    pub word_length: usize,
    /// Bases between scanned words; 0 means byte-aligned stride 4 (width 8 only).
    pub scan_step: usize,
    pub mask: usize,
    pub backbone_size: usize,
    pub longest_chain: usize,
    pub final_backbone: Vec<i16>,
    pub overflow: Vec<i16>,
}

impl SmallNaLookupTable {
    #[inline(always)]
    pub fn entry(&self, index: usize) -> SmallNaEntry {
        SmallNaEntry::decode(self.final_backbone[index])
    }

    /// Overflow run starting at `cursor`, without its terminator.
    #[inline(always)]
    pub fn overflow_run(&self, cursor: usize) -> impl Iterator<Item = u16> + '_ {
        self.overflow[cursor..]
            .iter()
            .take_while(|&&q| q >= 0)
            .map(|&q| q as u16)
    }

    /// Query offsets stored for `index`, in table order.
    pub fn hits(&self, index: usize) -> Vec<u32> {
        match self.entry(index) {
            SmallNaEntry::Empty => Vec::new(),
            SmallNaEntry::Single(q) => vec![q as u32],
            SmallNaEntry::Overflow(cursor) => self.overflow_run(cursor).map(u32::from).collect(),
        }
    }
}

/// Second hashtable of a two-template discontiguous table.
///
/// It shares the presence vector of the owning [`MbLookupTable`].
#[derive(Debug, Clone)]
pub struct SecondTemplate {
    pub template_type: DiscTemplate,
    pub hashtable2: Vec<u32>,
    pub next_pos2: Vec<u32>,
}

/// Discontiguous word configuration of a hashed table.
#[derive(Debug, Clone)]
pub struct DiscontiguousWords {
    pub template_type: DiscTemplate,
    /// Scan every fourth position instead of every position.
    pub full_byte_scan: bool,
    pub second: Option<SecondTemplate>,
}

/// Hashed ("megablast") lookup table for word lengths 9 to 12.
///
/// `hashtable[index]` is the 1-based head of a chain threaded through
/// `next_pos`; 0 terminates. Word `index >> pv_array_bts` of `pv_array` holds
/// the presence bit for `index`; a clear bit guarantees an empty chain.
#[derive(Debug, Clone)]
pub struct MbLookupTable {
    /// Number of bases forming the index (sampled bases for templates).
    pub word_length: usize,
    /// Bases spanned by one word; equals `word_length` for contiguous words.
    pub template_length: usize,
    pub scan_step: usize,
    pub hashsize: usize,
    pub mask: usize,
    pub longest_chain: usize,
    pub hashtable: Vec<u32>,
    pub next_pos: Vec<u32>,
    pub pv_array: Vec<u32>,
    pub pv_array_bts: u32,
    pub discontiguous: Option<DiscontiguousWords>,
}

impl MbLookupTable {
    #[inline(always)]
    pub fn has_hits(&self, index: usize) -> bool {
        pv_test_shifted(&self.pv_array, index, self.pv_array_bts)
    }

    pub fn two_templates(&self) -> bool {
        self.discontiguous
            .as_ref()
            .is_some_and(|d| d.second.is_some())
    }

    /// Query offsets chained from `index` in the primary hashtable.
    pub fn hits(&self, index: usize) -> Vec<u32> {
        chain(&self.hashtable, &self.next_pos, index).collect()
    }
}

/// Walk a 1-based chain, yielding 0-based query offsets.
pub(crate) fn chain<'a>(
    hashtable: &'a [u32],
    next_pos: &'a [u32],
    index: usize,
) -> impl Iterator<Item = u32> + 'a {
    let mut q = hashtable[index];
    std::iter::from_fn(move || {
        (q != 0).then(|| {
            let q_off = q - 1;
            q = next_pos[q as usize];
            q_off
        })
    })
}

/// Which table layout a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Na,
    SmallNa,
    Mb,
}

impl TableKind {
    pub fn name(self) -> &'static str {
        match self {
            TableKind::Na => "standard",
            TableKind::SmallNa => "small",
            TableKind::Mb => "megablast",
        }
    }
}

/// Any of the three table layouts, before sealing.
#[derive(Debug, Clone)]
pub enum LookupTable {
    Na(NaLookupTable),
    SmallNa(SmallNaLookupTable),
    Mb(MbLookupTable),
}

impl LookupTable {
    pub fn kind(&self) -> TableKind {
        match self {
            LookupTable::Na(_) => TableKind::Na,
            LookupTable::SmallNa(_) => TableKind::SmallNa,
            LookupTable::Mb(_) => TableKind::Mb,
        }
    }

    pub fn word_length(&self) -> usize {
        match self {
            LookupTable::Na(t) => t.word_length,
            LookupTable::SmallNa(t) => t.word_length,
            LookupTable::Mb(t) => t.word_length,
        }
    }

    /// Bases covered by one scanned word.
    pub fn word_span(&self) -> usize {
        match self {
            LookupTable::Mb(t) => t.template_length,
            other => other.word_length(),
        }
    }

    pub fn scan_step(&self) -> usize {
        match self {
            LookupTable::Na(t) => t.scan_step,
            LookupTable::SmallNa(t) => t.scan_step,
            LookupTable::Mb(t) => t.scan_step,
        }
    }

    pub fn longest_chain(&self) -> usize {
        match self {
            LookupTable::Na(t) => t.longest_chain,
            LookupTable::SmallNa(t) => t.longest_chain,
            LookupTable::Mb(t) => t.longest_chain,
        }
    }
}

impl From<NaLookupTable> for LookupTable {
    fn from(table: NaLookupTable) -> Self {
        LookupTable::Na(table)
    }
}

impl From<SmallNaLookupTable> for LookupTable {
    fn from(table: SmallNaLookupTable) -> Self {
        LookupTable::SmallNa(table)
    }
}

impl From<MbLookupTable> for LookupTable {
    fn from(table: MbLookupTable) -> Self {
        LookupTable::Mb(table)
    }
}
