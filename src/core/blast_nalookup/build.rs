//! Reference index builders
//!
//! Words are read from IUPAC query text; any word overlapping a non-ACGT base
//! is skipped. Standard and compact tables list query offsets in ascending
//! order. Hashed chains are built by prepending, so they list query offsets
//! in descending order.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{
    DiscTemplate, DiscontiguousWords, MbLookupTable, NaLookupBackboneCell, NaLookupTable,
    SecondTemplate, SmallNaEntry, SmallNaLookupTable, NA_HITS_PER_CELL,
    SMALL_NA_MAX_QUERY_LENGTH,
};
use super::templates::compute_discontiguous_index;
use crate::core::blast_encoding::encode_base;
use crate::core::blast_lookup::{pv_array_size, pv_set, pv_set_shifted, PV_ARRAY_BTS};
use crate::error::LookupError;

/// Word index -> query offsets, in insertion order.
type WordLists = FxHashMap<usize, Vec<u32>>;

const NA_MIN_WORD_LENGTH: usize = 4;
const NA_MAX_WORD_LENGTH: usize = 8;
const MB_MIN_WORD_LENGTH: usize = 9;
const MB_MAX_WORD_LENGTH: usize = 12;

/// Bytes per presence vector word.
const PV_ARRAY_BYTES: usize = 4;

pub fn ilog2(mut x: usize) -> u32 {
    let mut lg = 0u32;
    if x == 0 {
        return 0;
    }
    while {
        x >>= 1;
        x != 0
    } {
        lg += 1;
    }
    lg
}

/// Presence vector size (in words) and shift for a hashed table.
///
/// Small and very large queries get a half-size vector: the former have few
/// entries to filter, the latter would not fit in cache anyway.
pub fn compute_mb_pv_params(hashsize: usize, approx_table_entries: usize) -> (usize, u32) {
    const K_TARGET_PV_SIZE: usize = 131_072;
    const K_SMALL_QUERY_CUTOFF: usize = 15_000;
    const K_LARGE_QUERY_CUTOFF: usize = 800_000;

    let mut pv_size = if hashsize <= 8 * K_TARGET_PV_SIZE {
        hashsize >> PV_ARRAY_BTS
    } else {
        K_TARGET_PV_SIZE / PV_ARRAY_BYTES
    };

    if approx_table_entries <= K_SMALL_QUERY_CUTOFF
        || approx_table_entries >= K_LARGE_QUERY_CUTOFF
    {
        pv_size /= 2;
    }

    if pv_size == 0 {
        pv_size = 1;
    }
    let pv_array_bts = ilog2(hashsize / pv_size);
    (pv_size, pv_array_bts)
}

fn check_word_length(word_length: usize, min: usize, max: usize) -> Result<(), LookupError> {
    if (min..=max).contains(&word_length) {
        Ok(())
    } else {
        Err(LookupError::UnsupportedWordLength {
            word_length,
            min,
            max,
        })
    }
}

/// Stride 0 is the byte-aligned width-8 case; every other table needs a real stride.
fn check_scan_step(word_length: usize, scan_step: usize, allow_zero: bool) -> Result<(), LookupError> {
    if scan_step == 0 && !(allow_zero && word_length == NA_MAX_WORD_LENGTH) {
        return Err(LookupError::InvalidScanStep {
            word_length,
            scan_step,
        });
    }
    Ok(())
}

/// Call `f(query_offset, index)` for every contiguous word of `word_length` bases.
fn for_each_word(query: &[u8], word_length: usize, mut f: impl FnMut(usize, usize)) {
    let mask = (1usize << (2 * word_length)) - 1;
    let mut ecode = 0usize;
    let mut valid = 0usize;
    for (i, &b) in query.iter().enumerate() {
        match encode_base(b) {
            Some(code) => {
                ecode = ((ecode << 2) & mask) | code as usize;
                valid += 1;
                if valid >= word_length {
                    f(i + 1 - word_length, ecode);
                }
            }
            None => {
                ecode = 0;
                valid = 0;
            }
        }
    }
}

/// Call `f(query_offset, accum)` for every fully unambiguous template span.
///
/// `accum` holds the span's bases with the last one in the low bits.
fn for_each_span(query: &[u8], span: usize, mut f: impl FnMut(usize, u64)) {
    let mask = (1u64 << (2 * span)) - 1;
    let mut accum = 0u64;
    let mut valid = 0usize;
    for (i, &b) in query.iter().enumerate() {
        match encode_base(b) {
            Some(code) => {
                accum = ((accum << 2) | code as u64) & mask;
                valid += 1;
                if valid >= span {
                    f(i + 1 - span, accum);
                }
            }
            None => {
                accum = 0;
                valid = 0;
            }
        }
    }
}

fn collect_words(query: &[u8], word_length: usize) -> WordLists {
    let mut lists = WordLists::default();
    for_each_word(query, word_length, |q_off, index| {
        lists.entry(index).or_default().push(q_off as u32);
    });
    lists
}

fn sorted_indices(lists: &WordLists) -> Vec<usize> {
    let mut indices: Vec<usize> = lists.keys().copied().collect();
    indices.sort_unstable();
    indices
}

impl NaLookupTable {
    /// Index every word of `word_length` (4 to 8) bases in `query`.
    pub fn build(query: &[u8], word_length: usize, scan_step: usize) -> Result<Self, LookupError> {
        check_word_length(word_length, NA_MIN_WORD_LENGTH, NA_MAX_WORD_LENGTH)?;
        check_scan_step(word_length, scan_step, true)?;

        let backbone_size = 1usize << (2 * word_length);
        let lists = collect_words(query, word_length);

        let mut thick_backbone = vec![NaLookupBackboneCell::default(); backbone_size];
        let mut overflow = Vec::new();
        let mut pv = vec![0u32; pv_array_size(backbone_size)];
        let mut longest_chain = 0usize;

        for index in sorted_indices(&lists) {
            let hits = &lists[&index];
            let cell = &mut thick_backbone[index];
            cell.num_used = hits.len() as u32;
            if hits.len() <= NA_HITS_PER_CELL {
                cell.entries[..hits.len()].copy_from_slice(hits);
            } else {
                cell.entries[0] = overflow.len() as u32;
                overflow.extend_from_slice(hits);
            }
            pv_set(&mut pv, index);
            longest_chain = longest_chain.max(hits.len());
        }

        debug!(
            word_length,
            scan_step,
            words = lists.len(),
            overflow = overflow.len(),
            longest_chain,
            "built standard lookup table"
        );

        Ok(Self {
            word_length,
            scan_step,
            mask: backbone_size - 1,
            backbone_size,
            longest_chain,
            thick_backbone,
            overflow,
            pv,
        })
    }
}

impl SmallNaLookupTable {
    /// Index every word of `word_length` (4 to 8) bases in a query of at
    /// most [`SMALL_NA_MAX_QUERY_LENGTH`] bases.
    pub fn build(query: &[u8], word_length: usize, scan_step: usize) -> Result<Self, LookupError> {
        check_word_length(word_length, NA_MIN_WORD_LENGTH, NA_MAX_WORD_LENGTH)?;
        check_scan_step(word_length, scan_step, true)?;
        if query.len() > SMALL_NA_MAX_QUERY_LENGTH {
            return Err(LookupError::QueryTooLong {
                length: query.len(),
                max: SMALL_NA_MAX_QUERY_LENGTH,
            });
        }

        let backbone_size = 1usize << (2 * word_length);
        let lists = collect_words(query, word_length);
        // cursor c is stored as -(c + 2), which must stay within i16
        let max_cursor = (i16::MAX as usize) - 1;

        let mut final_backbone = vec![SmallNaEntry::Empty.encode(); backbone_size];
        let mut overflow: Vec<i16> = Vec::new();
        let mut longest_chain = 0usize;

        for index in sorted_indices(&lists) {
            let hits = &lists[&index];
            let entry = if let [q] = hits.as_slice() {
                SmallNaEntry::Single(*q as u16)
            } else {
                let cursor = overflow.len();
                if cursor > max_cursor {
                    return Err(LookupError::OverflowTooLarge {
                        size: cursor + hits.len() + 1,
                        max: max_cursor,
                    });
                }
                overflow.extend(hits.iter().map(|&q| q as i16));
                overflow.push(-1);
                SmallNaEntry::Overflow(cursor)
            };
            final_backbone[index] = entry.encode();
            longest_chain = longest_chain.max(hits.len());
        }

        debug!(
            word_length,
            scan_step,
            words = lists.len(),
            overflow = overflow.len(),
            longest_chain,
            "built small lookup table"
        );

        Ok(Self {
            word_length,
            scan_step,
            mask: backbone_size - 1,
            backbone_size,
            longest_chain,
            final_backbone,
            overflow,
        })
    }
}

/// Chain heads and links for one hashtable.
struct Chains {
    hashtable: Vec<u32>,
    next_pos: Vec<u32>,
    counts: FxHashMap<usize, usize>,
}

impl Chains {
    fn new(hashsize: usize, query_length: usize) -> Self {
        Self {
            hashtable: vec![0; hashsize],
            next_pos: vec![0; query_length + 1],
            counts: FxHashMap::default(),
        }
    }

    /// Prepend `q_off` to the chain of `index`.
    fn push(&mut self, index: usize, q_off: usize) {
        let q = q_off as u32 + 1;
        self.next_pos[q as usize] = self.hashtable[index];
        self.hashtable[index] = q;
        *self.counts.entry(index).or_default() += 1;
    }

    fn longest_chain(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }
}

fn mb_presence_vector<'a>(
    hashsize: usize,
    indices: impl Iterator<Item = &'a usize>,
    approx_table_entries: usize,
) -> (Vec<u32>, u32) {
    let (pv_size, pv_array_bts) = compute_mb_pv_params(hashsize, approx_table_entries);
    let mut pv_array = vec![0u32; pv_size];
    for &index in indices {
        pv_set_shifted(&mut pv_array, index, pv_array_bts);
    }
    (pv_array, pv_array_bts)
}

impl MbLookupTable {
    /// Index every contiguous word of `word_length` (9 to 12) bases.
    pub fn build_contiguous(
        query: &[u8],
        word_length: usize,
        scan_step: usize,
    ) -> Result<Self, LookupError> {
        check_word_length(word_length, MB_MIN_WORD_LENGTH, MB_MAX_WORD_LENGTH)?;
        check_scan_step(word_length, scan_step, false)?;

        let hashsize = 1usize << (2 * word_length);
        let mut chains = Chains::new(hashsize, query.len());
        let mut entries = 0usize;
        for_each_word(query, word_length, |q_off, index| {
            chains.push(index, q_off);
            entries += 1;
        });

        let (pv_array, pv_array_bts) = mb_presence_vector(hashsize, chains.counts.keys(), entries);
        let longest_chain = chains.longest_chain();

        debug!(
            word_length,
            scan_step,
            entries,
            pv_words = pv_array.len(),
            pv_array_bts,
            longest_chain,
            "built megablast lookup table"
        );

        Ok(Self {
            word_length,
            template_length: word_length,
            scan_step,
            hashsize,
            mask: hashsize - 1,
            longest_chain,
            hashtable: chains.hashtable,
            next_pos: chains.next_pos,
            pv_array,
            pv_array_bts,
            discontiguous: None,
        })
    }

    /// Index every span of `template` in `query`, optionally with a second
    /// template of the same shape sharing the presence vector.
    pub fn build_discontiguous(
        query: &[u8],
        template: DiscTemplate,
        second_template: Option<DiscTemplate>,
        full_byte_scan: bool,
    ) -> Result<Self, LookupError> {
        if let Some(second) = second_template {
            if second.length() != template.length() || second.word_length() != template.word_length() {
                return Err(LookupError::TemplateMismatch {
                    first: template.to_string(),
                    second: second.to_string(),
                });
            }
        }

        let word_length = template.word_length();
        let template_length = template.length();
        let hashsize = 1usize << (2 * word_length);

        let mut first = Chains::new(hashsize, query.len());
        let mut second = second_template.map(|t| (t, Chains::new(hashsize, query.len())));
        let mut entries = 0usize;
        for_each_span(query, template_length, |q_off, accum| {
            first.push(compute_discontiguous_index(accum, template), q_off);
            if let Some((t, chains)) = second.as_mut() {
                chains.push(compute_discontiguous_index(accum, *t), q_off);
            }
            entries += 1;
        });

        let indices = first
            .counts
            .keys()
            .chain(second.iter().flat_map(|(_, c)| c.counts.keys()));
        let (pv_array, pv_array_bts) = mb_presence_vector(hashsize, indices, entries);

        let longest_chain =
            first.longest_chain() + second.as_ref().map_or(0, |(_, c)| c.longest_chain());

        debug!(
            template = %template,
            second = ?second_template.map(|t| t.name()),
            full_byte_scan,
            entries,
            pv_array_bts,
            longest_chain,
            "built discontiguous megablast lookup table"
        );

        Ok(Self {
            word_length,
            template_length,
            scan_step: if full_byte_scan { 4 } else { 1 },
            hashsize,
            mask: hashsize - 1,
            longest_chain,
            hashtable: first.hashtable,
            next_pos: first.next_pos,
            pv_array,
            pv_array_bts,
            discontiguous: Some(DiscontiguousWords {
                template_type: template,
                full_byte_scan,
                second: second.map(|(template_type, chains)| SecondTemplate {
                    template_type,
                    hashtable2: chains.hashtable,
                    next_pos2: chains.next_pos,
                }),
            }),
        })
    }
}
