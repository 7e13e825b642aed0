//! Segment type and range planning.

use crate::error::FetchError;

/// A single segment: byte range [start, end] (inclusive, like the Range header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Position in the plan; determines assembly order.
    pub index: usize,
    /// First byte offset.
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl Segment {
    /// Length of this segment in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// True if this segment is the whole resource of `total_size` bytes.
    pub fn spans_whole(&self, total_size: u64) -> bool {
        self.start == 0 && self.end + 1 == total_size
    }
}

/// Builds a segment plan for a given total size and segment count.
///
/// Every segment but the last is `total_size / segment_count` bytes, placed by
/// multiplying its index; the last one runs to `total_size - 1` and absorbs
/// the remainder. Requires `1 <= segment_count <= total_size`.
pub fn plan_segments(total_size: u64, segment_count: usize) -> Result<Vec<Segment>, FetchError> {
    if segment_count == 0 {
        return Err(FetchError::InvalidArgument(
            "segment count must be at least 1".to_string(),
        ));
    }
    if total_size == 0 {
        return Err(FetchError::InvalidArgument(
            "resource is empty; nothing to split".to_string(),
        ));
    }
    if segment_count as u64 > total_size {
        return Err(FetchError::InvalidArgument(format!(
            "segment count {} exceeds resource size of {} bytes",
            segment_count, total_size
        )));
    }

    let count = segment_count as u64;
    let base = total_size / count;
    let last = segment_count - 1;

    let out = (0..segment_count)
        .map(|index| {
            let i = index as u64;
            let start = i * base;
            let end = if index == last {
                total_size - 1
            } else {
                (i + 1) * base - 1
            };
            Segment { index, start, end }
        })
        .collect();

    Ok(out)
}
