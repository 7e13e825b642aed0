//! Writing the assembled resource to disk.
//!
//! The bytes go to a `.part` file next to the destination, are synced, and the
//! file is renamed into place, so the destination either holds the complete
//! download or is left untouched.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` -> `file.iso.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Saves `data` to `path` atomically. Returns the number of bytes written.
pub fn save(path: &Path, data: &[u8]) -> Result<u64> {
    let tmp = temp_path(path);
    let written = write_synced(&tmp, data).and_then(|()| {
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to rename {} to {}", tmp.display(), path.display()))
    });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    tracing::info!(path = %path.display(), bytes = data.len(), "saved");
    Ok(data.len() as u64)
}

fn write_synced(tmp: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(tmp)
        .with_context(|| format!("failed to create temp file: {}", tmp.display()))?;
    file.write_all(data)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    file.sync_all().context("storage sync failed")?;
    Ok(())
}
