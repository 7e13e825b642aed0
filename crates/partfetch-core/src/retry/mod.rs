//! Retry and backoff policy.
//!
//! Classifies segment failures (timeouts, throttling, connection failures,
//! truncated bodies) and decides exponential backoff so a transient failure
//! is retried locally, inside the segment worker, before it becomes fatal.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
