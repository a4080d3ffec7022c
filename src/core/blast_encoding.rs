//! 2-bit packed nucleotide sequences
//!
//! Subjects are scanned in the ncbi2na layout: four bases per byte, most
//! significant bits first.
//!
//! # Encoding
//! - A = 0b00 (0)
//! - C = 0b01 (1)
//! - G = 0b10 (2)
//! - T/U = 0b11 (3)
//!
//! # Packing order
//! - Base 0: bits 6-7 (shift 6)
//! - Base 1: bits 4-5 (shift 4)
//! - Base 2: bits 2-3 (shift 2)
//! - Base 3: bits 0-1 (shift 0)
//!
//! # Sentinel byte
//! A packed buffer always carries `length / 4 + 1` bytes. When `length` is not
//! a multiple of four that is just the partial last byte; when it is, the
//! extra byte is a pad that lets the widest scanners fetch one byte past the
//! last full byte without leaving the buffer.

use crate::error::SequenceError;

/// Compression ratio: 4 nucleotides per byte
pub const COMPRESSION_RATIO: usize = 4;

/// Longest subject a scan can report on: hit offsets are stored as `u32`.
pub const MAX_SUBJECT_LENGTH: usize = u32::MAX as usize;

/// Bit mask for extracting a single 2-bit base
const BASE_MASK: u8 = 0x03;

/// Lookup table for encoding ASCII nucleotides to 2-bit codes.
/// 0xFF marks an ambiguous or invalid base.
const ENCODE_TABLE: [u8; 256] = {
    let mut table = [0xFFu8; 256];
    table[b'A' as usize] = 0;
    table[b'a' as usize] = 0;
    table[b'C' as usize] = 1;
    table[b'c' as usize] = 1;
    table[b'G' as usize] = 2;
    table[b'g' as usize] = 2;
    table[b'T' as usize] = 3;
    table[b't' as usize] = 3;
    table[b'U' as usize] = 3;
    table[b'u' as usize] = 3;
    table
};

// IUPAC letter -> BLASTNA code. Ambiguity codes keep their BLASTNA value so
// that packing stores their low two bits, as database packers do.
const IUPACNA_TO_BLASTNA: [u8; 128] = [
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15,  0, 10,  1, 11, 15, 15,  2, 12, 15, 15,  7, 15,  6, 14, 15,
    15, 15,  4,  9,  3, 15, 13,  8, 15,  5, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
];

/// Lookup table for decoding 2-bit codes to ASCII nucleotides
const DECODE_TABLE: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Number of bytes a packed buffer of `length` bases must provide.
#[inline]
pub const fn packed_len(length: usize) -> usize {
    length / COMPRESSION_RATIO + 1
}

/// Encode a single ASCII nucleotide to its 2-bit code.
///
/// Returns `None` for ambiguous or invalid bases.
#[inline]
pub fn encode_base(base: u8) -> Option<u8> {
    let code = ENCODE_TABLE[base as usize];
    if code == 0xFF {
        None
    } else {
        Some(code)
    }
}

/// Decode a 2-bit code to an ASCII nucleotide
#[inline]
pub fn decode_base(code: u8) -> u8 {
    DECODE_TABLE[(code & BASE_MASK) as usize]
}

#[inline]
fn encode_iupac_base_to_ncbi2na(base: u8) -> u8 {
    let idx = base.to_ascii_uppercase() as usize;
    let blastna = if idx < IUPACNA_TO_BLASTNA.len() {
        IUPACNA_TO_BLASTNA[idx]
    } else {
        15
    };
    blastna & BASE_MASK
}

/// Pack an ASCII sequence into ncbi2na bytes.
///
/// The output is `length / 4 + 1` bytes long and the last byte holds the
/// number of bases in the trailing partial byte in its two low bits.
pub fn encode_iupac_to_ncbi2na_packed(seq: &[u8]) -> Vec<u8> {
    let mut packed = vec![0u8; packed_len(seq.len())];

    let mut chunks = seq.chunks_exact(COMPRESSION_RATIO);
    for (byte, chunk) in packed.iter_mut().zip(&mut chunks) {
        *byte = chunk
            .iter()
            .fold(0u8, |acc, &b| (acc << 2) | encode_iupac_base_to_ncbi2na(b));
    }

    let tail = chunks.remainder();
    let mut last_byte = 0u8;
    for (i, &b) in tail.iter().enumerate() {
        last_byte |= encode_iupac_base_to_ncbi2na(b) << (6 - 2 * i);
    }
    last_byte |= (seq.len() % COMPRESSION_RATIO) as u8;
    packed[seq.len() / COMPRESSION_RATIO] = last_byte;

    packed
}

/// Encode `k` bases of an ASCII sequence starting at `start`.
///
/// Returns `None` if the window leaves the sequence or contains an ambiguous base.
#[inline]
pub fn encode_kmer_from_ascii(seq: &[u8], start: usize, k: usize) -> Option<u64> {
    let window = seq.get(start..start.checked_add(k)?)?;
    window
        .iter()
        .try_fold(0u64, |kmer, &b| Some((kmer << 2) | encode_base(b)? as u64))
}

/// Borrowed view of a packed subject: bytes plus the logical length in bases.
///
/// Construction checks the sentinel convention, so every scanner may read the
/// byte that follows the last meaningful one.
#[derive(Debug, Clone, Copy)]
pub struct CompressedSequence<'a> {
    data: &'a [u8],
    length: usize,
}

impl<'a> CompressedSequence<'a> {
    pub fn new(data: &'a [u8], length: usize) -> Result<Self, SequenceError> {
        if length > MAX_SUBJECT_LENGTH {
            return Err(SequenceError::SubjectTooLong {
                length,
                max: MAX_SUBJECT_LENGTH,
            });
        }
        let required = packed_len(length);
        if data.len() < required {
            return Err(SequenceError::BufferTooShort {
                length,
                required,
                actual: data.len(),
            });
        }
        Ok(Self { data, length })
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Length in bases
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// 2-bit code of the base at `pos`.
    #[inline]
    pub fn base(&self, pos: usize) -> u8 {
        debug_assert!(pos < self.length, "position out of bounds");
        let shift = 6 - 2 * (pos % COMPRESSION_RATIO);
        (self.data[pos / COMPRESSION_RATIO] >> shift) & BASE_MASK
    }

    /// Encode `k` bases starting at `pos`, first base most significant.
    pub fn kmer(&self, pos: usize, k: usize) -> Option<u64> {
        if pos + k > self.length {
            return None;
        }
        Some((pos..pos + k).fold(0u64, |kmer, p| (kmer << 2) | self.base(p) as u64))
    }
}

/// Owned 2-bit packed sequence.
#[derive(Debug, Clone)]
pub struct PackedSequence {
    data: Vec<u8>,
    len: usize,
}

impl PackedSequence {
    /// Pack an ASCII nucleotide sequence (A, C, G, T/U, case-insensitive).
    ///
    /// Ambiguous bases keep the low two bits of their BLASTNA code.
    pub fn from_iupac(seq: &[u8]) -> Self {
        Self {
            data: encode_iupac_to_ncbi2na_packed(seq),
            len: seq.len(),
        }
    }

    /// Wrap already packed bytes.
    pub fn from_packed(data: Vec<u8>, len: usize) -> Result<Self, SequenceError> {
        CompressedSequence::new(&data, len)?;
        Ok(Self { data, len })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn view(&self) -> CompressedSequence<'_> {
        debug_assert!(self.len <= MAX_SUBJECT_LENGTH);
        CompressedSequence {
            data: &self.data,
            length: self.len,
        }
    }

    /// Unpack back to ASCII. Ambiguous bases come back as their packed code.
    pub fn unpack(&self) -> Vec<u8> {
        let view = self.view();
        (0..self.len).map(|i| decode_base(view.base(i))).collect()
    }
}
