//! Core segmented downloader engine.
//!
//! Consumes a direct URL and a range plan, runs concurrent HTTP Range GETs
//! (bounded by `max_concurrent` when set), collects each segment's bytes in
//! whatever order they finish and joins them by segment index. Either the
//! whole resource comes back byte-exact or the call fails; partial output is
//! never returned.

mod assemble;
mod options;
mod run;
mod segment;

pub use assemble::{SegmentCollector, SegmentResult};
pub use options::FetchOptions;

use crate::error::FetchError;
use crate::fetch_head;
use crate::progress::ProgressSender;
use crate::segmenter::{plan_segments, Segment};

/// Fetches every segment of `plan` from `url` and returns the assembled bytes.
///
/// `plan` must be an ordered plan for a resource of `total_size` bytes, as
/// produced by `plan_segments`, and `total_size` must not exceed
/// `opts.max_in_memory`. Blocks the current thread; call from
/// `spawn_blocking` if used from async code.
pub fn fetch(
    url: &str,
    total_size: u64,
    plan: &[Segment],
    opts: &FetchOptions,
    progress_tx: Option<&ProgressSender>,
) -> Result<Vec<u8>, FetchError> {
    check_size(total_size, opts)?;
    check_plan(total_size, plan)?;
    run::run_concurrent(url, total_size, plan, opts, progress_tx)
}

/// Resolves the size of `url`, splits it into `segment_count` ranges and
/// fetches them concurrently.
pub fn download(
    url: &str,
    segment_count: usize,
    opts: &FetchOptions,
    progress_tx: Option<&ProgressSender>,
) -> Result<Vec<u8>, FetchError> {
    let total_size = fetch_head::resolve_size(url, opts)?;
    check_size(total_size, opts)?;
    let plan = plan_segments(total_size, segment_count)?;
    tracing::info!(
        url,
        total_size,
        segments = plan.len(),
        part_size = total_size / plan.len() as u64,
        "range plan ready"
    );
    fetch(url, total_size, &plan, opts, progress_tx)
}

/// Refuses resources the body buffer is not allowed to hold.
fn check_size(total_size: u64, opts: &FetchOptions) -> Result<(), FetchError> {
    if total_size > opts.max_in_memory || usize::try_from(total_size).is_err() {
        return Err(FetchError::InvalidArgument(format!(
            "resource of {} bytes exceeds the in-memory limit of {} bytes",
            total_size, opts.max_in_memory
        )));
    }
    Ok(())
}

/// Rejects plans that are empty, out of order, or do not cover `[0, total_size)`.
fn check_plan(total_size: u64, plan: &[Segment]) -> Result<(), FetchError> {
    let invalid = |why: &str| Err(FetchError::InvalidArgument(format!("bad range plan: {}", why)));
    let (Some(first), Some(last)) = (plan.first(), plan.last()) else {
        return invalid("no segments");
    };
    if first.start != 0 || last.end + 1 != total_size {
        return invalid("segments do not span the resource");
    }
    for (i, seg) in plan.iter().enumerate() {
        if seg.index != i || seg.start > seg.end {
            return invalid("segment indices or bounds out of order");
        }
    }
    if plan.windows(2).any(|w| w[1].start != w[0].end + 1) {
        return invalid("segments overlap or leave a gap");
    }
    Ok(())
}
