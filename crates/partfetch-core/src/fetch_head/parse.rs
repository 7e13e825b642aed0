//! Parse HTTP response header lines into HeadResult, plus the helpers the
//! segment fetcher uses to check `Content-Range` on partial responses.

use super::HeadResult;

/// Parse collected header lines into HeadResult.
///
/// Curl hands us the headers of every response in a redirect chain; a status
/// line (`HTTP/...`) starts a new response, so everything seen before it is
/// discarded and only the final response counts.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut out = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = HeadResult::default();
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            out.content_length = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("accept-ranges") {
            out.accept_ranges = value.eq_ignore_ascii_case("bytes");
        } else if name.eq_ignore_ascii_case("etag") {
            out.etag = Some(value.trim_matches('"').to_string());
        } else if name.eq_ignore_ascii_case("last-modified") {
            out.last_modified = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("content-type") {
            out.content_type = Some(value.to_string());
        }
    }

    out
}

/// Value of the header `name` in the final response of a redirect chain.
pub(crate) fn final_header<'a>(lines: &'a [String], name: &str) -> Option<&'a str> {
    let mut found = None;
    for line in lines {
        let line = line.trim();
        if line.starts_with("HTTP/") {
            found = None;
            continue;
        }
        if let Some((n, v)) = line.split_once(':') {
            if n.trim().eq_ignore_ascii_case(name) {
                found = Some(v.trim());
            }
        }
    }
    found
}

/// A parsed `Content-Range: bytes <first>-<last>/<total>` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContentRange {
    pub first: u64,
    pub last: u64,
    /// None when the server sent `*` (complete length unknown).
    pub total: Option<u64>,
}

pub(crate) fn parse_content_range(value: &str) -> Option<ContentRange> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (span, total) = rest.split_once('/')?;
    let (first, last) = span.split_once('-')?;
    let first = first.trim().parse().ok()?;
    let last = last.trim().parse().ok()?;
    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse().ok()?),
    };
    (first <= last).then_some(ContentRange { first, last, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolIssue;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_headers_content_length_and_ranges() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Length: 12345",
            "Accept-Ranges: bytes",
        ]));
        assert_eq!(r.content_length(), Ok(12345));
        assert!(r.accept_ranges);
        assert!(r.etag.is_none());
    }

    #[test]
    fn parse_headers_is_case_insensitive() {
        let r = parse_headers(&lines(&["content-length:  77 ", "ACCEPT-RANGES: Bytes"]));
        assert_eq!(r.content_length(), Ok(77));
        assert!(r.accept_ranges);
    }

    #[test]
    fn parse_headers_etag_and_type() {
        let r = parse_headers(&lines(&[
            "ETag: \"abc-123\"",
            "Last-Modified: Wed, 21 Oct 2015 07:28:00 GMT",
            "Content-Type: application/octet-stream",
        ]));
        assert_eq!(r.etag.as_deref(), Some("abc-123"));
        assert_eq!(
            r.last_modified.as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
        assert_eq!(r.content_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn missing_and_invalid_content_length() {
        let r = parse_headers(&lines(&["HTTP/1.1 200 OK", "Accept-Ranges: none"]));
        assert_eq!(r.content_length(), Err(ProtocolIssue::MissingContentLength));
        assert!(!r.accept_ranges);

        let r = parse_headers(&lines(&["Content-Length: -5"]));
        assert_eq!(
            r.content_length(),
            Err(ProtocolIssue::InvalidContentLength("-5".to_string()))
        );
    }

    #[test]
    fn redirect_chain_keeps_only_final_response() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Location: /real",
            "Content-Length: 0",
            "",
            "HTTP/1.1 200 OK",
            "Content-Length: 4096",
        ]));
        assert_eq!(r.content_length(), Ok(4096));
    }

    #[test]
    fn content_range_values() {
        assert_eq!(
            parse_content_range("bytes 0-9/10"),
            Some(ContentRange { first: 0, last: 9, total: Some(10) })
        );
        assert_eq!(
            parse_content_range(" bytes 250-499/*"),
            Some(ContentRange { first: 250, last: 499, total: None })
        );
        assert_eq!(parse_content_range("bytes */1000"), None);
        assert_eq!(parse_content_range("bytes 9-0/10"), None);
        assert_eq!(parse_content_range("items 0-9/10"), None);
        assert_eq!(parse_content_range("bytes 0-9"), None);
    }

    #[test]
    fn final_header_ignores_redirect_hops() {
        let l = lines(&[
            "HTTP/1.1 301 Moved Permanently",
            "Content-Range: bytes 0-0/1",
            "",
            "HTTP/1.1 206 Partial Content",
            "content-range: bytes 5-9/10",
        ]);
        assert_eq!(final_header(&l, "Content-Range"), Some("bytes 5-9/10"));

        let l = lines(&["HTTP/1.1 302 Found", "Content-Range: bytes 0-0/1", "HTTP/1.1 206 OK"]);
        assert_eq!(final_header(&l, "content-range"), None);
    }
}
