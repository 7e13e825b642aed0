//! Default output filename derivation.
//!
//! The name comes from the last URL path segment, made safe to use as a
//! single file name on Linux.

mod path;

pub use path::filename_from_url_path;

/// Filename used when the URL yields nothing usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Derives a safe filename for saving the download of `url`.
///
/// - `https://example.com/pub/debian-12.iso` -> `debian-12.iso`
/// - `https://example.com/` -> `download.bin`
pub fn derive_filename(url: &str) -> String {
    filename_from_url_path(url)
        .map(|raw| sanitize(&raw))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Replaces path separators, NUL and control characters with `_`, trims
/// leading/trailing dots and whitespace, and caps the length at NAME_MAX bytes.
fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
