//! Discontiguous word templates
//!
//! A template samples 11 or 12 bases out of a span of 16, 18 or 21. Each
//! pattern is written first base leftmost, `1` for a sampled position.

use std::fmt;

/// Discontiguous template identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscTemplate {
    Template11x16Coding,
    Template11x16Optimal,
    Template12x16Coding,
    Template12x16Optimal,
    Template11x18Coding,
    Template11x18Optimal,
    Template12x18Coding,
    Template12x18Optimal,
    Template11x21Coding,
    Template11x21Optimal,
    Template12x21Coding,
    Template12x21Optimal,
}

impl DiscTemplate {
    pub const ALL: [DiscTemplate; 12] = [
        DiscTemplate::Template11x16Coding,
        DiscTemplate::Template11x16Optimal,
        DiscTemplate::Template12x16Coding,
        DiscTemplate::Template12x16Optimal,
        DiscTemplate::Template11x18Coding,
        DiscTemplate::Template11x18Optimal,
        DiscTemplate::Template12x18Coding,
        DiscTemplate::Template12x18Optimal,
        DiscTemplate::Template11x21Coding,
        DiscTemplate::Template11x21Optimal,
        DiscTemplate::Template12x21Coding,
        DiscTemplate::Template12x21Optimal,
    ];

    /// Sampling pattern, first base leftmost.
    pub const fn pattern(self) -> &'static str {
        match self {
            DiscTemplate::Template11x16Coding => "1101101101101101",
            DiscTemplate::Template11x16Optimal => "1110010110110111",
            DiscTemplate::Template12x16Coding => "1111101101101101",
            DiscTemplate::Template12x16Optimal => "1110110110110111",
            DiscTemplate::Template11x18Coding => "101101100101101101",
            DiscTemplate::Template11x18Optimal => "111010010110010111",
            DiscTemplate::Template12x18Coding => "101101101101101101",
            DiscTemplate::Template12x18Optimal => "111010110010110111",
            DiscTemplate::Template11x21Coding => "100101100101100101101",
            DiscTemplate::Template11x21Optimal => "111010010100010010111",
            DiscTemplate::Template12x21Coding => "100101101101100101101",
            DiscTemplate::Template12x21Optimal => "111010010110010010111",
        }
    }

    /// Number of bases spanned by the template.
    pub const fn length(self) -> usize {
        self.pattern().len()
    }

    /// Number of sampled bases; also the table's lookup word length.
    pub fn word_length(self) -> usize {
        self.pattern().bytes().filter(|&b| b == b'1').count()
    }

    /// Bit mask over the accumulator, two bits per sampled base.
    ///
    /// Bit pair `k` corresponds to the base `k` positions before the last
    /// base of the template.
    pub fn accum_mask(self) -> u64 {
        let pattern = self.pattern().as_bytes();
        let len = pattern.len();
        (0..len)
            .filter(|&k| pattern[len - 1 - k] == b'1')
            .fold(0u64, |mask, k| mask | (3u64 << (2 * k)))
    }

    /// Parse a CLI-style name such as `11_18_coding`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            DiscTemplate::Template11x16Coding => "11_16_coding",
            DiscTemplate::Template11x16Optimal => "11_16_optimal",
            DiscTemplate::Template12x16Coding => "12_16_coding",
            DiscTemplate::Template12x16Optimal => "12_16_optimal",
            DiscTemplate::Template11x18Coding => "11_18_coding",
            DiscTemplate::Template11x18Optimal => "11_18_optimal",
            DiscTemplate::Template12x18Coding => "12_18_coding",
            DiscTemplate::Template12x18Optimal => "12_18_optimal",
            DiscTemplate::Template11x21Coding => "11_21_coding",
            DiscTemplate::Template11x21Optimal => "11_21_optimal",
            DiscTemplate::Template12x21Coding => "12_21_coding",
            DiscTemplate::Template12x21Optimal => "12_21_optimal",
        }
    }
}

impl fmt::Display for DiscTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the lookup index of a discontiguous word.
///
/// `accum` holds 2-bit bases with the last base of the template in the two
/// low bits; bits above the template span are ignored. Sampled bases are
/// concatenated in template order, first sampled base most significant.
#[inline]
pub fn compute_discontiguous_index(accum: u64, template: DiscTemplate) -> usize {
    let pattern = template.pattern().as_bytes();
    let len = pattern.len();
    let mut index = 0usize;
    for k in (0..len).rev() {
        if pattern[len - 1 - k] == b'1' {
            index = (index << 2) | ((accum >> (2 * k)) & 3) as usize;
        }
    }
    index
}
