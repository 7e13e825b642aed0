//! Single-segment HTTP Range GET into an in-memory buffer.

use std::sync::atomic::{AtomicBool, Ordering};

use super::FetchOptions;
use crate::error::{FetchError, ProtocolIssue, Stage};
use crate::fetch_head::parse::{final_header, parse_content_range};
use crate::segmenter::Segment;

/// Upper bound on the buffer reserved before the first byte arrives.
const PREALLOC_CAP: u64 = 8 << 20;

/// Downloads one segment: GET with a Range header, body collected in memory.
///
/// The payload is only returned when it is exactly `segment.len()` bytes and
/// came from a 206 whose `Content-Range` names exactly this segment (or a 200
/// when the segment is the whole resource). A body that grows past the
/// segment is cut off at once. Setting `abort` stops the transfer at the next
/// progress tick.
pub(super) fn download_one_segment(
    url: &str,
    total_size: u64,
    segment: &Segment,
    opts: &FetchOptions,
    abort: &AtomicBool,
) -> Result<Vec<u8>, FetchError> {
    let stage = Stage::Segment(segment.index);
    let transport = |e| FetchError::transport(stage, e);
    let expected = segment.len();
    let mut body: Vec<u8> = Vec::with_capacity(expected.min(PREALLOC_CAP) as usize);
    let mut overflow = false;
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    opts.apply(&mut easy).map_err(transport)?;
    // curl wants "start-end" (inclusive), not "bytes=start-end".
    easy.range(&format!("{}-{}", segment.start, segment.end))
        .map_err(transport)?;
    easy.progress(true).map_err(transport)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(line) = std::str::from_utf8(data) {
                    headers.push(line.trim_end().to_string());
                }
                true
            })
            .map_err(transport)?;
        transfer
            .write_function(|data| {
                if body.len() as u64 + data.len() as u64 > expected {
                    overflow = true;
                    // Short count makes curl fail the transfer with a write error.
                    return Ok(0);
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(transport)?;
        transfer
            .progress_function(|_, _, _, _| !abort.load(Ordering::Relaxed))
            .map_err(transport)?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if !(overflow && e.is_write_error()) {
            return Err(transport(e));
        }
    }

    let status = easy.response_code().map_err(transport)?;
    if !(200..300).contains(&status) {
        return Err(FetchError::Remote { stage, status });
    }
    if status != 206 && !segment.spans_whole(total_size) {
        return Err(FetchError::protocol(stage, ProtocolIssue::RangeIgnored));
    }
    if status == 206 {
        check_content_range(&headers, segment, total_size)
            .map_err(|issue| FetchError::protocol(stage, issue))?;
    }
    if overflow {
        return Err(FetchError::protocol(stage, ProtocolIssue::Overflow { expected }));
    }
    let received = body.len() as u64;
    if received != expected {
        return Err(FetchError::protocol(
            stage,
            ProtocolIssue::Truncated { expected, received },
        ));
    }

    Ok(body)
}

/// A 206 must describe exactly the requested bytes of a resource of
/// `total_size` bytes. An unknown complete length (`*`) is accepted.
fn check_content_range(
    headers: &[String],
    segment: &Segment,
    total_size: u64,
) -> Result<(), ProtocolIssue> {
    let raw = final_header(headers, "content-range").ok_or(ProtocolIssue::MissingContentRange)?;
    let matches = parse_content_range(raw).is_some_and(|cr| {
        cr.first == segment.start
            && cr.last == segment.end
            && cr.total.map_or(true, |t| t == total_size)
    });
    if matches {
        return Ok(());
    }
    Err(ProtocolIssue::ContentRangeMismatch {
        expected: format!("bytes {}-{}/{}", segment.start, segment.end, total_size),
        received: raw.to_string(),
    })
}
