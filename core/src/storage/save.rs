//! The save coordinator: debouncing, coalescing, and at-most-one-concurrent
//! flush for writing editor content to disk.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::fs;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, instrument, warn};

use crate::storage::allocate::unique_note_path;
use crate::storage::index::list_notes;
use crate::storage::naming::{stem_from_content, timestamp_stem};
use crate::storage::note::{ActiveNote, NoteId};
use crate::storage::notebook::Notebook;
use crate::storage::path::is_untitled;
use crate::storage::{Error, Result};

/// The most recent edit not yet guaranteed durable. At most one exists; a
/// newer edit replaces it rather than queueing behind it. The identity is
/// captured at edit time so a save intended for one note is never written
/// under another note's path.
#[derive(Debug)]
struct PendingSave {
    id: NoteId,
    content: String,
}

/// Mutable session state shared between the coordinators and the debounce
/// timer task. Guarded by a synchronous mutex; never held across an await.
#[derive(Debug)]
pub(crate) struct DocState {
    pub(crate) active: ActiveNote,
    /// Cached directory index, most recent first. Rebuilt only after a
    /// completed listing, never speculatively.
    pub(crate) known_files: Vec<PathBuf>,
}

/// Turns UI content-change notifications into durable writes.
///
/// Edits arriving within the debounce interval are coalesced into a single
/// write carrying the last content. [`SaveCoordinator::flush`] makes pending
/// state durable immediately; concurrent flushes are funneled through one
/// shared drain so exactly one underlying write happens.
///
/// Cloning is cheap and shares the same coordinator.
#[derive(Debug, Clone)]
pub struct SaveCoordinator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) notebook: Notebook,
    pub(crate) state: StdMutex<DocState>,
    pending: StdMutex<Option<PendingSave>>,
    // Bumped whenever the armed timer is superseded (new edit or explicit
    // flush). A timer task that wakes to a stale epoch does nothing, which
    // cancels it without ever aborting an in-progress write.
    timer_epoch: AtomicU64,
    // Funnel for "take pending, persist": the debounce timer and manual
    // flushes both go through it, so at most one persist is in flight.
    flush_gate: AsyncMutex<()>,
    debounce: Duration,
}

impl SaveCoordinator {
    pub(crate) fn new(notebook: Notebook, known_files: Vec<PathBuf>, debounce: Duration) -> Self {
        SaveCoordinator {
            inner: Arc::new(Inner {
                notebook,
                state: StdMutex::new(DocState { active: ActiveNote::default(), known_files }),
                pending: StdMutex::new(None),
                timer_epoch: AtomicU64::new(0),
                flush_gate: AsyncMutex::new(()),
                debounce,
            }),
        }
    }

    pub(crate) fn inner(&self) -> &Inner {
        &self.inner
    }

    pub(crate) fn notebook(&self) -> &Notebook {
        &self.inner.notebook
    }

    /// Records the latest editor content and (re)arms the debounce timer.
    ///
    /// Replaces any prior pending save (most recent write wins) and restarts
    /// the quiet period, so a burst of edits produces one write. When the
    /// timer fires the pending save is persisted in the background; failures
    /// there are logged and swallowed, never surfaced to the user.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn note_changed(&self, content: impl Into<String>) {
        let content = content.into();
        let id = {
            let mut state = self.inner.state.lock().unwrap();
            state.active.content = content.clone();
            state.active.id.clone()
        };
        *self.inner.pending.lock().unwrap() = Some(PendingSave { id, content });

        let epoch = self.inner.timer_epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let saver = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(saver.inner.debounce).await;
            if saver.inner.timer_epoch.load(Ordering::Acquire) != epoch {
                // Superseded by a newer edit or an explicit flush.
                return;
            }
            if let Err(e) = saver.drain().await {
                warn!("Background autosave failed: {e}");
            }
        });
    }

    /// Makes all pending state durable before returning.
    ///
    /// If a drain is already in flight the caller awaits it instead of
    /// starting a second one; two concurrent flushes observe exactly one
    /// underlying write. Callers that change the active note's identity or
    /// display must await this first so a switch never discards edits.
    pub async fn flush(&self) -> Result<()> {
        // Disarm the debounce timer; the drain below picks up its work.
        self.inner.timer_epoch.fetch_add(1, Ordering::AcqRel);
        self.drain().await
    }

    /// Takes and clears the pending save, then persists it. The gate
    /// serializes all persists; a caller that lost the race finds the slot
    /// empty and returns without writing.
    async fn drain(&self) -> Result<()> {
        let _gate = self.inner.flush_gate.lock().await;
        let pending = self.inner.pending.lock().unwrap().take();
        match pending {
            Some(save) => self.persist(save).await,
            None => Ok(()),
        }
    }

    #[instrument(skip(self, save), fields(draft = save.id.is_draft()))]
    async fn persist(&self, save: PendingSave) -> Result<()> {
        match save.id {
            NoteId::Saved(path) => self.persist_saved(path, save.content).await,
            NoteId::Draft => self.persist_draft(save.content).await,
        }
    }

    /// Overwrites an addressed note, first escaping the "Untitled"
    /// placeholder by renaming the file after its content when possible.
    async fn persist_saved(&self, path: PathBuf, content: String) -> Result<()> {
        if is_untitled(&path) {
            if let Some(stem) = stem_from_content(&content) {
                return self.name_untitled(path, stem, content).await;
            }
        }
        debug!("Writing note at {}", path.display());
        fs::write(&path, content.as_bytes())
            .await
            .map_err(|source| Error::WriteFailed { path, source })
    }

    /// The one case where an existing file is moved rather than overwritten:
    /// a placeholder-named note gets its content-derived name on persist. The
    /// move target is always collision-free, so no other note is clobbered.
    async fn name_untitled(&self, old_path: PathBuf, stem: String, content: String) -> Result<()> {
        let dir = old_path
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(old_path.clone()))?
            .to_path_buf();

        let target = {
            let state = self.inner.state.lock().unwrap();
            unique_note_path(&dir, &stem, &state.known_files, self.inner.notebook.case_sensitivity())
        };
        debug!("Renaming untitled note {} -> {}", old_path.display(), target.display());

        // Update the in-memory identity before awaiting I/O so edits arriving
        // during the rename/write sequence already carry the new path.
        {
            let mut state = self.inner.state.lock().unwrap();
            state.active.id = NoteId::Saved(target.clone());
        }

        if let Err(source) = fs::rename(&old_path, &target).await {
            let mut state = self.inner.state.lock().unwrap();
            if state.active.id == NoteId::Saved(target.clone()) {
                state.active.id = NoteId::Saved(old_path.clone());
            }
            return Err(Error::RenameFailed { from: old_path, to: target, source });
        }

        // The file now lives at the target whatever happens below, so the
        // identity stays pointed there even if the write fails.
        fs::write(&target, content.as_bytes())
            .await
            .map_err(|source| Error::WriteFailed { path: target.clone(), source })?;

        self.refresh_index().await?;
        Ok(())
    }

    /// First persist of a draft: allocate a collision-free path, write, and
    /// promote the identity. An empty draft is never persisted, so blank
    /// files do not litter the folder.
    async fn persist_draft(&self, content: String) -> Result<()> {
        if content.trim().is_empty() {
            debug!("Skipping persist of whitespace-only draft");
            return Ok(());
        }

        let stem = stem_from_content(&content).unwrap_or_else(timestamp_stem);
        let target = {
            let state = self.inner.state.lock().unwrap();
            unique_note_path(
                self.inner.notebook.root(),
                &stem,
                &state.known_files,
                self.inner.notebook.case_sensitivity(),
            )
        };
        debug!("Persisting draft to {}", target.display());

        fs::write(&target, content.as_bytes())
            .await
            .map_err(|source| Error::WriteFailed { path: target.clone(), source })?;

        {
            let mut state = self.inner.state.lock().unwrap();
            if state.active.id.is_draft() {
                state.active.id = NoteId::Saved(target.clone());
            }
        }

        self.refresh_index().await?;
        Ok(())
    }

    /// Rebuilds the cached directory index from a fresh listing.
    pub(crate) async fn refresh_index(&self) -> Result<Vec<PathBuf>> {
        let files = list_notes(self.inner.notebook.root()).await?;
        self.inner.state.lock().unwrap().known_files = files.clone();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Session;
    use std::path::Path;
    use tempfile::tempdir;

    const FAST_DEBOUNCE: Duration = Duration::from_millis(25);

    async fn fast_session(dir: &Path) -> Session {
        let notebook = Notebook::open(dir).await.unwrap();
        Session::start_with_debounce(notebook, FAST_DEBOUNCE).await.unwrap()
    }

    fn note_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.to_lowercase().ends_with(".md"))
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn debounce_coalesces_burst_into_one_write() {
        let dir = tempdir().unwrap();
        let session = fast_session(dir.path()).await;

        session.note_changed("# Note\none");
        session.note_changed("# Note\ntwo");
        session.note_changed("# Note\nfinal");
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(note_files(dir.path()), vec!["Note.md"]);
        let content = std::fs::read_to_string(dir.path().join("Note.md")).unwrap();
        assert_eq!(content, "# Note\nfinal");
        // The draft was promoted at its first persist.
        assert_eq!(session.active_note().id.path().unwrap().file_name().unwrap(), "Note.md");
    }

    #[tokio::test]
    async fn flush_persists_without_waiting_for_the_timer() {
        let dir = tempdir().unwrap();
        let session = fast_session(dir.path()).await;

        session.note_changed("# Quick\nbody");
        session.flush().await.unwrap();

        assert_eq!(note_files(dir.path()), vec!["Quick.md"]);
    }

    #[tokio::test]
    async fn flush_twice_performs_at_most_one_write() {
        let dir = tempdir().unwrap();
        let session = fast_session(dir.path()).await;

        session.note_changed("# Note\nbody");
        session.flush().await.unwrap();

        // Scribble on the file out of band; a redundant flush must not
        // write again and clobber this.
        let path = dir.path().join("Note.md");
        std::fs::write(&path, "external marker").unwrap();
        session.flush().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "external marker");
    }

    #[tokio::test]
    async fn superseded_timer_never_fires_after_a_flush() {
        let dir = tempdir().unwrap();
        let session = fast_session(dir.path()).await;

        session.note_changed("# Note\nbody");
        session.flush().await.unwrap();

        let path = dir.path().join("Note.md");
        std::fs::write(&path, "external marker").unwrap();
        // Wait out the armed timer; it must observe the bumped epoch and
        // do nothing.
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "external marker");
    }

    #[tokio::test]
    async fn concurrent_flushes_coalesce_into_one_write() {
        let dir = tempdir().unwrap();
        let session = fast_session(dir.path()).await;

        session.note_changed("# Note\nbody");
        let (a, b) = tokio::join!(session.flush(), session.flush());
        a.unwrap();
        b.unwrap();

        assert_eq!(note_files(dir.path()), vec!["Note.md"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Note.md")).unwrap(),
            "# Note\nbody"
        );
    }

    #[tokio::test]
    async fn whitespace_only_draft_is_never_persisted() {
        let dir = tempdir().unwrap();
        let session = fast_session(dir.path()).await;

        session.note_changed("   \n\t\n");
        session.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(note_files(dir.path()).is_empty());
        assert!(session.active_note().id.is_draft());
    }

    #[tokio::test]
    async fn unusable_content_falls_back_to_timestamp_stem() {
        let dir = tempdir().unwrap();
        let session = fast_session(dir.path()).await;

        // Every character is invalid in a filename, so no content-derived
        // name is available.
        session.note_changed("???");
        session.flush().await.unwrap();

        let files = note_files(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("untitled-"), "unexpected name {}", files[0]);
    }

    #[tokio::test]
    async fn untitled_note_is_renamed_from_content_on_persist() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Untitled.md"), "").unwrap();
        let session = fast_session(dir.path()).await;

        session.open_note(&dir.path().join("Untitled.md")).await.unwrap();
        session.note_changed("# Shopping list\n- eggs");
        session.flush().await.unwrap();

        assert_eq!(note_files(dir.path()), vec!["Shopping list.md"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Shopping list.md")).unwrap(),
            "# Shopping list\n- eggs"
        );
        assert_eq!(
            session.active_note().id.path().unwrap(),
            dir.path().join("Shopping list.md")
        );
    }

    #[tokio::test]
    async fn untitled_rename_target_avoids_existing_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Shopping list.md"), "older note").unwrap();
        std::fs::write(dir.path().join("Untitled.md"), "").unwrap();
        let session = fast_session(dir.path()).await;

        session.open_note(&dir.path().join("Untitled.md")).await.unwrap();
        session.note_changed("# Shopping list\n- eggs");
        session.flush().await.unwrap();

        let mut expected = vec!["Shopping list (2).md".to_string(), "Shopping list.md".to_string()];
        expected.sort();
        assert_eq!(note_files(dir.path()), expected);
        // The other note was not touched.
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Shopping list.md")).unwrap(),
            "older note"
        );
    }

    #[tokio::test]
    async fn pending_save_carries_identity_captured_at_edit_time() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        std::fs::write(&a, "A").unwrap();
        std::fs::write(&b, "B").unwrap();
        let session = fast_session(dir.path()).await;

        // Edit A, then switch to B before the debounce timer fires.
        session.open_note(&a).await.unwrap();
        session.note_changed("A edited");
        session.open_note(&b).await.unwrap();
        session.note_changed("B edited");
        session.flush().await.unwrap();

        assert_eq!(std::fs::read_to_string(&a).unwrap(), "A edited");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "B edited");
    }
}
