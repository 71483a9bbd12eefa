//! Directory index: which note files exist, newest first.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;
use tracing::{debug, instrument};

use crate::storage::path::is_note_file;
use crate::storage::{Error, Result};

/// Lists the note files directly inside `dir`, sorted by modification time,
/// most recent first.
///
/// Entries whose metadata cannot be read are dropped as transient (e.g.
/// removed mid-scan). Ordering among files with identical modification times
/// is unspecified and must not be relied on. An unreadable directory
/// propagates as [`Error::DirectoryUnavailable`]; the caller is responsible
/// for recovery, typically by prompting for another folder.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub async fn list_notes(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut read_dir = fs::read_dir(dir)
        .await
        .map_err(|_| Error::DirectoryUnavailable(dir.to_path_buf()))?;

    let mut entries: Vec<(PathBuf, SystemTime)> = Vec::new();
    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(_) => return Err(Error::DirectoryUnavailable(dir.to_path_buf())),
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_note_file(name) {
            continue;
        }

        let path = entry.path();
        // Stat failures are transient; skip the entry rather than fail the listing.
        let Ok(metadata) = fs::metadata(&path).await else {
            debug!("Dropping entry with unreadable metadata: {}", path.display());
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((path, modified));
    }

    entries.sort_by(|a, b| b.1.cmp(&a.1));
    debug!("Found {} note files", entries.len());
    Ok(entries.into_iter().map(|(path, _)| path).collect())
}
