//! Error taxonomy for the fetch engine.
//!
//! Every failure names the stage it happened in (size resolution or a
//! specific segment) so the CLI can report where and why a download stopped.

use std::fmt;
use std::time::Duration;

/// Where in the pipeline an error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The HEAD request that discovers the total size.
    SizeResolution,
    /// The ranged GET for the segment with this index.
    Segment(usize),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::SizeResolution => write!(f, "size resolution"),
            Stage::Segment(index) => write!(f, "segment {}", index),
        }
    }
}

/// What was wrong with a response that otherwise succeeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolIssue {
    #[error("response has no Content-Length header")]
    MissingContentLength,
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
    #[error("server ignored the Range header (HTTP 200 for a partial range)")]
    RangeIgnored,
    #[error("truncated body: expected {expected} bytes, got {received}")]
    Truncated { expected: u64, received: u64 },
    #[error("body exceeds the requested range of {expected} bytes")]
    Overflow { expected: u64 },
    #[error("partial response has no Content-Range header")]
    MissingContentRange,
    #[error("Content-Range {received:?} does not match the requested {expected:?}")]
    ContentRangeMismatch { expected: String, received: String },
    #[error("segment reported more than once")]
    DuplicateSegment,
    #[error("segment is not part of the plan")]
    UnknownSegment,
}

/// Error returned by the size resolver, the planner and the segmented fetcher.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network-level failure: DNS, connection refused, timeouts, resets.
    #[error("{stage}: transport error: {cause}")]
    Transport { stage: Stage, cause: curl::Error },
    /// The server answered with a non-success status.
    #[error("{stage}: server returned HTTP {status}")]
    Remote { stage: Stage, status: u32 },
    /// The response lacked something the engine depends on.
    #[error("{stage}: protocol error: {issue}")]
    Protocol { stage: Stage, issue: ProtocolIssue },
    /// Caller-supplied parameters violate preconditions.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The overall deadline expired before every segment reported.
    #[error("{stage}: timed out after {waited:?} waiting for segment results")]
    Timeout { stage: Stage, waited: Duration },
    /// A worker thread went away without reporting its segment.
    #[error("segment worker exited without reporting (worker panicked)")]
    WorkerLost,
}

impl FetchError {
    pub(crate) fn transport(stage: Stage, cause: curl::Error) -> Self {
        FetchError::Transport { stage, cause }
    }

    pub(crate) fn protocol(stage: Stage, issue: ProtocolIssue) -> Self {
        FetchError::Protocol { stage, issue }
    }

    /// Stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            FetchError::Transport { stage, .. }
            | FetchError::Remote { stage, .. }
            | FetchError::Protocol { stage, .. }
            | FetchError::Timeout { stage, .. } => Some(*stage),
            FetchError::InvalidArgument(_) | FetchError::WorkerLost => None,
        }
    }
}
