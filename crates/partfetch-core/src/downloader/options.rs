//! Per-download knobs shared by the HEAD probe and the segment workers.

use std::time::Duration;

use crate::config::PartfetchConfig;
use crate::retry::RetryPolicy;

/// Options for one segmented download. Built from `PartfetchConfig`; the CLI
/// overrides single fields from flags.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum segment downloads in flight at once (None = one per segment).
    pub max_concurrent: Option<usize>,
    pub connect_timeout: Duration,
    /// Abort a transfer slower than `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Hard cap per request.
    pub request_timeout: Duration,
    /// Deadline for collecting all segment results.
    pub overall_timeout: Option<Duration>,
    /// Resources larger than this are refused before any GET is sent.
    pub max_in_memory: u64,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&PartfetchConfig::default())
    }
}

impl From<&PartfetchConfig> for FetchOptions {
    fn from(cfg: &PartfetchConfig) -> Self {
        Self {
            max_concurrent: cfg.max_concurrent,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
            overall_timeout: cfg.overall_timeout_secs.map(Duration::from_secs),
            max_in_memory: cfg.max_in_memory_bytes,
            user_agent: cfg.user_agent.clone(),
            retry: cfg
                .retry
                .as_ref()
                .map(RetryPolicy::from)
                .unwrap_or_default(),
        }
    }
}

impl FetchOptions {
    /// Number of worker threads for a plan of `segment_count` segments.
    pub fn worker_count(&self, segment_count: usize) -> usize {
        self.max_concurrent
            .unwrap_or(segment_count)
            .min(segment_count)
            .max(1)
    }

    /// Applies redirects, timeouts and the user agent to a curl handle.
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Low-speed abort catches stalled connections without killing slow but
        // healthy transfers; the hard timeout is the last resort.
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.timeout(self.request_timeout)?;
        Ok(())
    }
}
