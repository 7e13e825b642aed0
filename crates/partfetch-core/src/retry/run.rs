//! Retry loop: run a closure until success, the policy says stop, or the
//! download is aborted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::error::FetchError;

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// Once `abort` is set the last error is returned without another attempt.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, abort: &AtomicBool, mut f: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                if abort.load(Ordering::Relaxed) {
                    return Err(e);
                }
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, delay_ms = d.as_millis() as u64, "retrying: {}", e);
                        if !sleep_unless_aborted(d, abort) {
                            return Err(e);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}

/// Sleeps for `d` in short slices; returns false as soon as `abort` is set.
fn sleep_unless_aborted(d: Duration, abort: &AtomicBool) -> bool {
    const SLICE: Duration = Duration::from_millis(50);
    let until = Instant::now() + d;
    loop {
        if abort.load(Ordering::Relaxed) {
            return false;
        }
        let left = until.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return true;
        }
        std::thread::sleep(left.min(SLICE));
    }
}
