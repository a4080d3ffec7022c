//! Test utilities shared by the integration tests
//!
//! - Seeded random sequences with planted query fragments
//! - A position-by-position reference scan over any table

use nascan::core::blast_encoding::{CompressedSequence, PackedSequence};
use nascan::core::blast_lookup::OffsetPair;
use nascan::core::blast_nalookup::{
    compute_discontiguous_index, DiscTemplate, LookupTable, MbLookupTable, NaLookupTable,
    SmallNaLookupTable,
};
use rand::rngs::SmallRng;
use rand::Rng;

const BASES: &[u8; 4] = b"ACGT";

/// Query with a low-complexity stretch so that some words have long hit lists.
pub const REPEAT_QUERY_TAIL: &[u8] = b"AAAAAAAAAAAAAAAAAAAAAAAACACACACACACACACACACACAAAAAAAAAAAAAAAA";

pub fn random_bases(rng: &mut SmallRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| BASES[rng.random_range(0..4)]).collect()
}

/// Random query followed by [`REPEAT_QUERY_TAIL`].
pub fn random_query(rng: &mut SmallRng, len: usize) -> Vec<u8> {
    let mut query = random_bases(rng, len);
    query.extend_from_slice(REPEAT_QUERY_TAIL);
    query
}

/// Random subject of `len` bases with fragments of `query` planted in it.
pub fn planted_subject(rng: &mut SmallRng, query: &[u8], len: usize) -> Vec<u8> {
    let mut subject = random_bases(rng, len);
    if len < 8 || query.len() < 8 {
        return subject;
    }
    for _ in 0..(len / 24 + 1) {
        let frag_len = rng.random_range(8..=query.len().min(len).min(40));
        let q_start = rng.random_range(0..=query.len() - frag_len);
        let s_start = rng.random_range(0..=len - frag_len);
        subject[s_start..s_start + frag_len].copy_from_slice(&query[q_start..q_start + frag_len]);
    }
    subject
}

/// Hits of the word starting at `s_off`, in the order the table stores them.
pub fn word_hits(table: &LookupTable, subject: &CompressedSequence<'_>, s_off: usize) -> Vec<u32> {
    match table {
        LookupTable::Na(t) => {
            let index = subject.kmer(s_off, t.word_length).unwrap() as usize;
            t.hits(index).to_vec()
        }
        LookupTable::SmallNa(t) => {
            let index = subject.kmer(s_off, t.word_length).unwrap() as usize;
            t.hits(index)
        }
        LookupTable::Mb(t) => match &t.discontiguous {
            None => {
                let index = subject.kmer(s_off, t.word_length).unwrap() as usize;
                t.hits(index)
            }
            Some(disc) => {
                let accum = subject.kmer(s_off, t.template_length).unwrap();
                let mut hits = t.hits(compute_discontiguous_index(accum, disc.template_type));
                if let Some(second) = &disc.second {
                    let index = compute_discontiguous_index(accum, second.template_type);
                    let mut q = second.hashtable2[index];
                    while q != 0 {
                        hits.push(q - 1);
                        q = second.next_pos2[q as usize];
                    }
                }
                hits
            }
        },
    }
}

/// Every hit of a whole-subject scan from offset 0.
pub fn reference_hits(table: &LookupTable, subject: &PackedSequence) -> Vec<OffsetPair> {
    let view = subject.view();
    let span = table.word_span();
    let step = match table.scan_step() {
        0 => 4,
        s => s,
    };
    let mut hits = Vec::new();
    let mut s_off = 0;
    while s_off + span <= view.len() {
        for q_off in word_hits(table, &view, s_off) {
            hits.push(OffsetPair::new(q_off, s_off as u32));
        }
        s_off += step;
    }
    hits
}

/// A table layout and its parameters; built on demand because the wide
/// hashed tables take tens of megabytes each.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Na(usize, usize),
    SmallNa(usize, usize),
    Mb(usize, usize),
    Disc(DiscTemplate, Option<DiscTemplate>, bool),
}

impl Shape {
    pub fn build(self, query: &[u8]) -> LookupTable {
        match self {
            Shape::Na(wl, step) => NaLookupTable::build(query, wl, step).unwrap().into(),
            Shape::SmallNa(wl, step) => SmallNaLookupTable::build(query, wl, step).unwrap().into(),
            Shape::Mb(wl, step) => MbLookupTable::build_contiguous(query, wl, step).unwrap().into(),
            Shape::Disc(template, second, full_byte_scan) => {
                MbLookupTable::build_discontiguous(query, template, second, full_byte_scan)
                    .unwrap()
                    .into()
            }
        }
    }
}

/// Standard and compact shapes, every width with strides up to two bytes.
pub fn na_shapes() -> Vec<Shape> {
    let mut shapes = Vec::new();
    for wl in 4..=8 {
        shapes.extend((1..=5).map(|step| Shape::Na(wl, step)));
        shapes.extend((1..=8).map(|step| Shape::SmallNa(wl, step)));
    }
    shapes.push(Shape::Na(8, 0));
    shapes.push(Shape::SmallNa(8, 0));
    shapes
}

/// Contiguous hashed shapes.
pub fn mb_shapes() -> Vec<Shape> {
    let mut shapes = Vec::new();
    for wl in 9..=11 {
        shapes.extend((1..=8).map(|step| Shape::Mb(wl, step)));
    }
    shapes.extend([1, 4, 5].map(|step| Shape::Mb(12, step)));
    shapes
}

/// Discontiguous shapes: every template alone, plus same-shape pairs.
pub fn disc_shapes() -> Vec<Shape> {
    let mut shapes = Vec::new();
    for template in DiscTemplate::ALL {
        for full_byte_scan in [false, true] {
            shapes.push(Shape::Disc(template, None, full_byte_scan));
        }
    }
    let pairs = [
        (DiscTemplate::Template11x16Coding, DiscTemplate::Template11x16Optimal),
        (DiscTemplate::Template11x18Coding, DiscTemplate::Template11x18Optimal),
        (DiscTemplate::Template11x21Coding, DiscTemplate::Template11x21Optimal),
    ];
    for (first, second) in pairs {
        for full_byte_scan in [false, true] {
            shapes.push(Shape::Disc(first, Some(second), full_byte_scan));
        }
    }
    shapes
}

/// One-line summary of a table for assertion messages.
pub fn describe(table: &LookupTable) -> String {
    let mut text = format!(
        "{} word_length={} scan_step={}",
        table.kind().name(),
        table.word_length(),
        table.scan_step()
    );
    if let LookupTable::Mb(t) = table {
        if let Some(disc) = &t.discontiguous {
            text.push_str(&format!(" template={}", disc.template_type));
            if let Some(second) = &disc.second {
                text.push_str(&format!("+{}", second.template_type));
            }
            if disc.full_byte_scan {
                text.push_str(" full_byte_scan");
            }
        }
    }
    text
}
