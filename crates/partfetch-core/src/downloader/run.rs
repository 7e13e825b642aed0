//! Bounded worker pool: fan-out of segment fetches, fan-in to one collector.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use super::assemble::{SegmentCollector, SegmentResult};
use super::segment;
use super::FetchOptions;
use crate::error::{FetchError, Stage};
use crate::progress::{ProgressSender, ProgressStats};
use crate::retry::run_with_retry;
use crate::segmenter::Segment;

type Report = (usize, Result<Vec<u8>, FetchError>);

/// Fetches every segment of `plan` with `opts.worker_count` threads and
/// returns the reassembled body.
///
/// Workers pop segments off a shared queue and report `(index, result)` on a
/// channel sized to the plan, so a send never blocks. This thread is the only
/// reader; it stops after exactly `plan.len()` accepted results, on the first
/// failure, or at the overall deadline. Any stop other than success raises
/// the abort flag, which drains the queue and cancels in-flight transfers.
pub(super) fn run_concurrent(
    url: &str,
    total_size: u64,
    plan: &[Segment],
    opts: &FetchOptions,
    progress_tx: Option<&ProgressSender>,
) -> Result<Vec<u8>, FetchError> {
    let count = plan.len();
    let work: Arc<Mutex<VecDeque<Segment>>> =
        Arc::new(Mutex::new(plan.iter().copied().collect()));
    let abort = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::sync_channel::<Report>(count);

    let num_workers = opts.worker_count(count);
    tracing::debug!(segments = count, workers = num_workers, "starting segment workers");
    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let abort = Arc::clone(&abort);
        let url = url.to_string();
        let opts = opts.clone();
        handles.push(std::thread::spawn(move || loop {
            if abort.load(Ordering::Relaxed) {
                break;
            }
            let next = work
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(segment) = next else {
                break;
            };
            tracing::debug!(
                index = segment.index,
                range = %segment.range_header_value(),
                "segment started"
            );
            let res = run_with_retry(&opts.retry, &abort, || {
                segment::download_one_segment(&url, total_size, &segment, &opts, &abort)
            });
            if tx.send((segment.index, res)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let started = Instant::now();
    let deadline = opts.overall_timeout.map(|t| started + t);
    let mut collector = SegmentCollector::new(plan);
    let mut bytes_done = 0u64;
    let mut failure: Option<FetchError> = None;

    while !collector.is_complete() {
        let received = match deadline {
            Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let (index, res) = match received {
            Ok(report) => report,
            Err(RecvTimeoutError::Timeout) => {
                failure = Some(FetchError::Timeout {
                    stage: Stage::Segment(collector.first_missing().unwrap_or(0)),
                    waited: started.elapsed(),
                });
                break;
            }
            Err(RecvTimeoutError::Disconnected) => {
                failure = Some(FetchError::WorkerLost);
                break;
            }
        };
        let accepted = res.and_then(|payload| {
            let len = payload.len() as u64;
            collector
                .accept(SegmentResult { index, payload })
                .map(|()| len)
        });
        match accepted {
            Ok(len) => {
                bytes_done += len;
                tracing::debug!(
                    index,
                    bytes = len,
                    done = collector.received(),
                    of = count,
                    "segment finished"
                );
                if let Some(progress_tx) = progress_tx {
                    let _ = progress_tx.try_send(ProgressStats {
                        bytes_done,
                        total_bytes: total_size,
                        elapsed_secs: started.elapsed().as_secs_f64(),
                        segments_done: collector.received(),
                        segment_count: count,
                    });
                }
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if failure.is_some() {
        abort.store(true, Ordering::Relaxed);
        work.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
    for h in handles {
        if h.join().is_err() && failure.is_none() {
            failure = Some(FetchError::WorkerLost);
        }
    }
    if let Some(e) = failure {
        tracing::warn!("segmented fetch aborted: {}", e);
        return Err(e);
    }

    let data = collector.assemble()?;
    tracing::debug!(
        bytes = data.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "segments joined"
    );
    Ok(data)
}
