//! HTTP HEAD / metadata probing and total size resolution.
//!
//! Uses the curl crate (libcurl) to fetch response headers without a body.
//! The total size comes from `Content-Length`; without it the resource cannot
//! be split into ranges.

pub(crate) mod parse;

use std::str;

use crate::downloader::FetchOptions;
use crate::error::{FetchError, ProtocolIssue, Stage};

/// Result of a HEAD request: the headers the engine and the `probe` command use.
#[derive(Debug, Clone, Default)]
pub struct HeadResult {
    /// Raw `Content-Length` value, if present.
    content_length: Option<String>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// `ETag` value if present (quotes stripped).
    pub etag: Option<String>,
    /// `Last-Modified` value if present.
    pub last_modified: Option<String>,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
}

impl HeadResult {
    /// Total size advertised by `Content-Length`.
    pub fn content_length(&self) -> Result<u64, ProtocolIssue> {
        let raw = self
            .content_length
            .as_deref()
            .ok_or(ProtocolIssue::MissingContentLength)?;
        raw.parse::<u64>()
            .map_err(|_| ProtocolIssue::InvalidContentLength(raw.to_string()))
    }
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects. Blocks the current thread; call from `spawn_blocking`
/// if used from async code.
pub fn probe(url: &str, opts: &FetchOptions) -> Result<HeadResult, FetchError> {
    let stage = Stage::SizeResolution;
    let transport = |e| FetchError::transport(stage, e);
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.nobody(true).map_err(transport)?;
    opts.apply(&mut easy).map_err(transport)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(transport)?;
        transfer.perform().map_err(transport)?;
    }

    let status = easy.response_code().map_err(transport)?;
    if !(200..300).contains(&status) {
        return Err(FetchError::Remote { stage, status });
    }

    Ok(parse::parse_headers(&headers))
}

/// Resolves the total size of the resource at `url` with a HEAD request.
pub fn resolve_size(url: &str, opts: &FetchOptions) -> Result<u64, FetchError> {
    let head = probe(url, opts)?;
    let size = head
        .content_length()
        .map_err(|issue| FetchError::protocol(Stage::SizeResolution, issue))?;
    if !head.accept_ranges {
        tracing::debug!(url, "server does not advertise Accept-Ranges: bytes");
    }
    tracing::info!(url, size, "resolved resource size");
    Ok(size)
}
