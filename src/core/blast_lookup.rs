//! Lookup table infrastructure shared by the nucleotide tables and scanners
//!
//! Presence vectors are arrays of 32-bit words, one bit per table index.
//! Standard tables always use one bit per index (`PV_ARRAY_BTS`); hashed
//! tables keep their own shift because their presence vector may cover
//! several indices per bit.

pub const PV_ARRAY_BTS: u32 = 5;
pub const PV_ARRAY_MASK: usize = 31;
pub const PV_BUCKET_BITS: usize = 32;

/// Query/subject offset pair emitted by every scan routine.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OffsetPair {
    pub q_off: u32,
    pub s_off: u32,
}

impl OffsetPair {
    #[inline(always)]
    pub const fn new(q_off: u32, s_off: u32) -> Self {
        Self { q_off, s_off }
    }
}

/// Test if a bit is set in the presence vector
#[inline(always)]
pub fn pv_test(pv: &[u32], index: usize) -> bool {
    pv_test_shifted(pv, index, PV_ARRAY_BTS)
}

/// Set a bit in the presence vector
#[inline(always)]
pub fn pv_set(pv: &mut [u32], index: usize) {
    pv_set_shifted(pv, index, PV_ARRAY_BTS)
}

/// Test the presence bit for `index` when each word covers `1 << bts` indices.
#[inline(always)]
pub fn pv_test_shifted(pv: &[u32], index: usize, bts: u32) -> bool {
    (pv[index >> bts] & (1u32 << (index & PV_ARRAY_MASK))) != 0
}

/// Set the presence bit for `index` when each word covers `1 << bts` indices.
#[inline(always)]
pub fn pv_set_shifted(pv: &mut [u32], index: usize, bts: u32) {
    pv[index >> bts] |= 1u32 << (index & PV_ARRAY_MASK);
}

/// Calculate the size of a presence vector array for a given backbone size
#[inline]
pub fn pv_array_size(backbone_size: usize) -> usize {
    backbone_size.div_ceil(PV_BUCKET_BITS)
}
