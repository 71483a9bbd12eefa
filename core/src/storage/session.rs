//! The live editing session: active note state plus navigation.
//!
//! Every navigation operation flushes pending edits before changing the
//! active note, so a switch never discards unsaved content.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::storage::note::{ActiveNote, NoteId};
use crate::storage::notebook::Notebook;
use crate::storage::save::SaveCoordinator;
use crate::storage::{Error, Result, DEFAULT_DEBOUNCE};

/// An editing session over one notebook.
///
/// Owns the active note, the cached directory index, and the
/// [`SaveCoordinator`]. The UI feeds it content-change notifications via
/// [`Session::note_changed`] and reads the note to display via
/// [`Session::active_note`].
#[derive(Debug, Clone)]
pub struct Session {
    saver: SaveCoordinator,
}

impl Session {
    /// Starts a session with the default debounce interval, taking an
    /// initial directory listing for the index cache.
    #[instrument(skip(notebook), fields(root = %notebook.root().display()))]
    pub async fn start(notebook: Notebook) -> Result<Self> {
        Session::start_with_debounce(notebook, DEFAULT_DEBOUNCE).await
    }

    /// Starts a session with a custom debounce interval.
    pub async fn start_with_debounce(notebook: Notebook, debounce: Duration) -> Result<Self> {
        let known_files = notebook.list().await?;
        debug!("Session started with {} known notes", known_files.len());
        Ok(Session { saver: SaveCoordinator::new(notebook, known_files, debounce) })
    }

    pub fn notebook(&self) -> &Notebook {
        self.saver.notebook()
    }

    /// The note currently shown in the editor. Used by the editing surface to
    /// request initial content on mount.
    pub fn active_note(&self) -> ActiveNote {
        self.saver.inner().state.lock().unwrap().active.clone()
    }

    /// The cached directory index, most recently modified first. May be stale
    /// between refreshes; freshness-critical reads refresh first.
    pub fn known_files(&self) -> Vec<PathBuf> {
        self.saver.inner().state.lock().unwrap().known_files.clone()
    }

    /// Rebuilds the directory index from disk (e.g. when the note list UI
    /// opens, so ordering reflects the latest modification times).
    pub async fn refresh_index(&self) -> Result<Vec<PathBuf>> {
        self.saver.refresh_index().await
    }

    /// Records the latest editor content and arms the debounce timer.
    pub fn note_changed(&self, content: impl Into<String>) {
        self.saver.note_changed(content);
    }

    /// Forces any pending edit to become durable before returning.
    pub async fn flush(&self) -> Result<()> {
        self.saver.flush().await
    }

    pub(crate) fn saver(&self) -> &SaveCoordinator {
        &self.saver
    }

    /// Opens the note at `path` and makes it the active note. Pending edits
    /// to the previous note are flushed first. Returns the note's content.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn open_note(&self, path: &Path) -> Result<String> {
        self.flush().await?;

        let content = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let mut state = self.saver.inner().state.lock().unwrap();
        state.active = ActiveNote { id: NoteId::Saved(path.to_path_buf()), content: content.clone() };
        Ok(content)
    }

    /// Flushes and resets the active note to an empty draft.
    #[instrument(skip(self))]
    pub async fn new_draft(&self) -> Result<()> {
        self.flush().await?;
        let mut state = self.saver.inner().state.lock().unwrap();
        state.active = ActiveNote::draft();
        Ok(())
    }

    /// Deletes the active note's file and activates a deterministic neighbor:
    /// the entry that slid into the deleted note's position in the refreshed
    /// index, clamped to the new bounds, or an empty draft when the notebook
    /// is empty. A draft has nothing on disk, so deleting it is a no-op.
    #[instrument(skip(self))]
    pub async fn delete_note(&self) -> Result<()> {
        self.flush().await?;

        let (path, position) = {
            let state = self.saver.inner().state.lock().unwrap();
            let Some(path) = state.active.id.path().map(Path::to_path_buf) else {
                debug!("Active note is a draft, nothing to delete");
                return Ok(());
            };
            let position = state.known_files.iter().position(|p| *p == path).unwrap_or(0);
            (path, position)
        };

        fs::remove_file(&path)
            .await
            .map_err(|source| Error::DeleteFailed { path: path.clone(), source })?;
        debug!("Deleted note {}", path.display());

        let files = self.saver.refresh_index().await?;
        if files.is_empty() {
            let mut state = self.saver.inner().state.lock().unwrap();
            state.active = ActiveNote::draft();
            return Ok(());
        }

        let next = files[position.min(files.len() - 1)].clone();
        match fs::read_to_string(&next).await {
            Ok(content) => {
                let mut state = self.saver.inner().state.lock().unwrap();
                state.active = ActiveNote { id: NoteId::Saved(next), content };
            }
            Err(e) => {
                // The neighbor vanished between the refresh and the read;
                // treat it like an empty notebook.
                warn!("Failed to read neighbor note {}: {}", next.display(), e);
                let mut state = self.saver.inner().state.lock().unwrap();
                state.active = ActiveNote::draft();
            }
        }
        Ok(())
    }
}
