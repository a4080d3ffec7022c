//! Resumable subject scanning
//!
//! A scan routine fills at most one output buffer per call and reports where
//! it stopped. [`ScanDriver`] keeps calling it from that position until the
//! whole subject has been covered, handing each filled batch to a sink.

use tracing::trace;

use crate::core::blast_diagnostics::ScanDiagnosticCounters;
use crate::core::blast_encoding::CompressedSequence;
use crate::core::blast_lookup::OffsetPair;
use crate::core::blast_nalookup::LookupTableWrap;
use crate::error::ScanError;

/// Output buffer size used when the caller does not pick one.
pub const DEFAULT_OFFSET_ARRAY_SIZE: usize = 4096;

/// Smallest buffer that lets every call make progress on `wrap`.
///
/// Compact and hashed routines reserve `longest_chain` slots and need at
/// least one more to accept the first bucket of a call.
pub fn min_offset_array_size(wrap: &LookupTableWrap) -> usize {
    wrap.longest_chain() + 1
}

/// Per-worker scan state: one reusable output buffer.
pub struct ScanDriver<'a> {
    offset_pairs: Vec<OffsetPair>,
    diagnostics: Option<&'a ScanDiagnosticCounters>,
}

impl<'a> ScanDriver<'a> {
    /// Create a driver whose buffer holds `capacity` pairs.
    pub fn new(wrap: &LookupTableWrap, capacity: usize) -> Result<Self, ScanError> {
        let required = min_offset_array_size(wrap);
        if capacity < required {
            return Err(ScanError::CapacityTooSmall { capacity, required });
        }
        Ok(Self {
            offset_pairs: vec![OffsetPair::default(); capacity],
            diagnostics: None,
        })
    }

    /// Record every call in `counters`.
    pub fn with_diagnostics(mut self, counters: &'a ScanDiagnosticCounters) -> Self {
        self.diagnostics = Some(counters);
        self
    }

    pub fn capacity(&self) -> usize {
        self.offset_pairs.len()
    }

    /// Scan all of `subject`, passing each batch of hits to `sink` in order.
    ///
    /// Returns the total number of hits.
    pub fn scan<F>(
        &mut self,
        wrap: &LookupTableWrap,
        subject: &CompressedSequence<'_>,
        mut sink: F,
    ) -> Result<usize, ScanError>
    where
        F: FnMut(&[OffsetPair]),
    {
        let span = wrap.word_span();
        let scan_step = wrap.scan_step();
        let max_hits = self.offset_pairs.len();
        let length = subject.len();

        if let Some(counters) = self.diagnostics {
            counters.record_subject();
        }

        let mut total = 0usize;
        let mut start_offset = 0usize;
        while start_offset + span <= length {
            let mut end_offset = length;
            let num_hits = wrap.scan_subject(
                subject,
                start_offset,
                &mut self.offset_pairs,
                max_hits,
                &mut end_offset,
            );
            if num_hits == 0 && end_offset <= start_offset {
                return Err(ScanError::NoProgress {
                    offset: start_offset,
                });
            }

            let stopped_early = end_offset + span <= length;
            if stopped_early {
                trace!(
                    start_offset,
                    end_offset,
                    num_hits,
                    "scan stopped on output capacity"
                );
            }
            if let Some(counters) = self.diagnostics {
                counters.record_call(start_offset, end_offset, scan_step, num_hits, stopped_early);
            }

            if num_hits > 0 {
                sink(&self.offset_pairs[..num_hits]);
                total += num_hits;
            }
            start_offset = end_offset;
        }
        Ok(total)
    }

    /// Scan all of `subject` and collect the hits.
    pub fn collect(
        &mut self,
        wrap: &LookupTableWrap,
        subject: &CompressedSequence<'_>,
    ) -> Result<Vec<OffsetPair>, ScanError> {
        let mut hits = Vec::new();
        self.scan(wrap, subject, |batch| hits.extend_from_slice(batch))?;
        Ok(hits)
    }
}
