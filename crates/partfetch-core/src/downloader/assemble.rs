//! Collection point for segment results and in-order reassembly.
//!
//! Results arrive in completion order; assembly order comes only from
//! `SegmentResult::index`.

use crate::error::{FetchError, ProtocolIssue, Stage};
use crate::segmenter::Segment;

/// Payload of one fetched segment, tagged with its plan index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentResult {
    pub index: usize,
    pub payload: Vec<u8>,
}

/// Accepts exactly one result per planned segment, then concatenates them.
#[derive(Debug)]
pub struct SegmentCollector {
    expected_len: Vec<u64>,
    parts: Vec<Option<Vec<u8>>>,
    received: usize,
}

impl SegmentCollector {
    pub fn new(plan: &[Segment]) -> Self {
        Self {
            expected_len: plan.iter().map(Segment::len).collect(),
            parts: vec![None; plan.len()],
            received: 0,
        }
    }

    /// Number of segments the collector waits for.
    pub fn expected(&self) -> usize {
        self.parts.len()
    }

    /// Number of segments accepted so far.
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn is_complete(&self) -> bool {
        self.received == self.parts.len()
    }

    /// Lowest index still waiting for a result.
    pub fn first_missing(&self) -> Option<usize> {
        self.parts.iter().position(Option::is_none)
    }

    /// Stores one result. Rejects unknown indices, a second result for the
    /// same index, and payloads whose length does not match the segment.
    pub fn accept(&mut self, result: SegmentResult) -> Result<(), FetchError> {
        let stage = Stage::Segment(result.index);
        let expected = *self
            .expected_len
            .get(result.index)
            .ok_or_else(|| FetchError::protocol(stage, ProtocolIssue::UnknownSegment))?;
        let received = result.payload.len() as u64;
        if received < expected {
            return Err(FetchError::protocol(
                stage,
                ProtocolIssue::Truncated { expected, received },
            ));
        }
        if received > expected {
            return Err(FetchError::protocol(stage, ProtocolIssue::Overflow { expected }));
        }
        let slot = &mut self.parts[result.index];
        if slot.is_some() {
            return Err(FetchError::protocol(stage, ProtocolIssue::DuplicateSegment));
        }
        *slot = Some(result.payload);
        self.received += 1;
        Ok(())
    }

    /// Concatenates every payload by ascending index.
    ///
    /// Fails (naming the first missing segment) unless every segment arrived,
    /// or if the joined body cannot be allocated.
    pub fn assemble(self) -> Result<Vec<u8>, FetchError> {
        let total: u64 = self.expected_len.iter().sum();
        let mut out: Vec<u8> = Vec::new();
        usize::try_from(total)
            .ok()
            .and_then(|n| out.try_reserve_exact(n).ok())
            .ok_or_else(|| {
                FetchError::InvalidArgument(format!("cannot hold {} bytes in memory", total))
            })?;
        for (index, part) in self.parts.into_iter().enumerate() {
            let part = part.ok_or_else(|| {
                FetchError::protocol(
                    Stage::Segment(index),
                    ProtocolIssue::Truncated {
                        expected: self.expected_len[index],
                        received: 0,
                    },
                )
            })?;
            out.extend_from_slice(&part);
        }
        Ok(out)
    }
}
