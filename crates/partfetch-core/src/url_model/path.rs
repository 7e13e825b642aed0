//! Filename hint from a URL path.

use percent_encoding::percent_decode_str;

/// Last non-empty path segment of `url`, percent-decoded.
///
/// Query strings and fragments are ignored. Returns `None` for the root path,
/// `.`/`..`, or a URL that does not parse.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy().into_owned();
    match decoded.as_str() {
        "." | ".." => None,
        _ => Some(decoded),
    }
}
