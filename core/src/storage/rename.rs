//! User-initiated renames.
//!
//! The collision policy is asymmetric by origin: a name the user typed is
//! never allowed to land on an existing file (a file-replacing rename is
//! destructive), while a name derived from content on the user's behalf is
//! auto-resolved with a disambiguating suffix instead.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument};

use crate::storage::allocate::unique_note_path;
use crate::storage::naming::stem_from_content;
use crate::storage::note::NoteId;
use crate::storage::session::Session;
use crate::storage::{Error, Result, NOTE_EXTENSION, UNTITLED_STEM};

/// Result of a rename request. Blocked and reverted renames are ordinary
/// outcomes, not errors: the UI keeps the rename field active so the user
/// can adjust the name or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The note now lives at this path.
    Renamed(PathBuf),
    /// An explicitly typed name collided with this existing file; nothing
    /// was written or moved.
    Blocked(PathBuf),
    /// The input was unusable (empty after sanitizing, or "Untitled" with no
    /// content to derive a name from) or already the current name; no-op.
    Reverted,
}

impl Session {
    /// Applies a user-supplied name to the active note, or materializes a
    /// draft under the typed name.
    ///
    /// The literal input "Untitled" is reinterpreted as a request to name the
    /// note from its content. Pending edits are flushed before any move, and
    /// the target is recomputed from the identity the flush may have just
    /// promoted or renamed. I/O failures propagate with the identity
    /// unchanged so the rename UI can stay active for a retry.
    #[instrument(skip(self, input))]
    pub async fn rename_note(&self, input: &str) -> Result<RenameOutcome> {
        let cleaned: String = input.chars().filter(|c| !matches!(c, '/' | '\\')).collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            debug!("Rename input empty after sanitizing, reverting");
            return Ok(RenameOutcome::Reverted);
        }

        let (stem, generated) = if cleaned.eq_ignore_ascii_case(UNTITLED_STEM) {
            match stem_from_content(&self.active_note().content) {
                Some(stem) => (stem, true),
                None => {
                    debug!("No content to derive a name from, reverting");
                    return Ok(RenameOutcome::Reverted);
                }
            }
        } else {
            // Strip a typed ".md" so the extension is appended exactly once.
            (crate::storage::path::note_stem(Path::new(cleaned)).to_string(), false)
        };

        self.flush().await?;

        // Re-read the identity: the flush may have promoted a draft or
        // renamed the placeholder file.
        let active = self.active_note();
        match active.id {
            NoteId::Draft => self.materialize_draft(&stem, generated, active.content).await,
            NoteId::Saved(current) => self.move_note(current, &stem, generated).await,
        }
    }

    /// Creates a file for a draft under the resolved name and promotes it.
    async fn materialize_draft(
        &self,
        stem: &str,
        generated: bool,
        content: String,
    ) -> Result<RenameOutcome> {
        let notebook = self.notebook();
        let known = self.known_files();
        let case = notebook.case_sensitivity();

        let target = notebook.root().join(format!("{stem}.{NOTE_EXTENSION}"));
        let target = if case.contains(&known, &target) {
            if !generated {
                debug!("Explicit name collides with {}, blocking", target.display());
                return Ok(RenameOutcome::Blocked(target));
            }
            unique_note_path(notebook.root(), stem, &known, case)
        } else {
            target
        };

        fs::write(&target, content.as_bytes())
            .await
            .map_err(|source| Error::WriteFailed { path: target.clone(), source })?;

        {
            let mut state = self.saver().inner().state.lock().unwrap();
            state.active.id = NoteId::Saved(target.clone());
        }
        self.refresh_index().await?;
        debug!("Draft materialized at {}", target.display());
        Ok(RenameOutcome::Renamed(target))
    }

    /// Moves an addressed note to the resolved name.
    async fn move_note(&self, current: PathBuf, stem: &str, generated: bool) -> Result<RenameOutcome> {
        let case = self.notebook().case_sensitivity();
        let dir = current
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(current.clone()))?
            .to_path_buf();

        let target = dir.join(format!("{stem}.{NOTE_EXTENSION}"));
        if target == current {
            return Ok(RenameOutcome::Reverted);
        }

        let known = self.known_files();
        let collides = known
            .iter()
            .any(|p| case.paths_equal(p, &target) && !case.paths_equal(p, &current));
        let target = if collides {
            if !generated {
                debug!("Explicit name collides with {}, blocking", target.display());
                return Ok(RenameOutcome::Blocked(target));
            }
            unique_note_path(&dir, stem, &known, case)
        } else {
            target
        };

        fs::rename(&current, &target).await.map_err(|source| Error::RenameFailed {
            from: current.clone(),
            to: target.clone(),
            source,
        })?;

        {
            let mut state = self.saver().inner().state.lock().unwrap();
            state.active.id = NoteId::Saved(target.clone());
        }
        self.refresh_index().await?;
        debug!("Note renamed to {}", target.display());
        Ok(RenameOutcome::Renamed(target))
    }
}
