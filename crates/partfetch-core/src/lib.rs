//! Segmented concurrent HTTP fetch: resolve the size of a resource, split it
//! into byte ranges, fetch the ranges in parallel and join them back in order.

pub mod config;
pub mod error;
pub mod logging;

pub mod downloader;
pub mod fetch_head;
pub mod progress;
pub mod retry;
pub mod segmenter;
pub mod storage;
pub mod url_model;

pub use downloader::{download, fetch, FetchOptions};
pub use error::{FetchError, ProtocolIssue, Stage};
pub use fetch_head::resolve_size;
pub use segmenter::{plan_segments, Segment};
