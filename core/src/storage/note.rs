use std::path::{Path, PathBuf};

/// Identity of the note shown in the editor.
///
/// A draft has never been written to disk and owns no path. It is promoted to
/// [`NoteId::Saved`] exactly once, at its first successful persist, and may
/// subsequently be re-addressed by a rename. Modeling this as an enum rather
/// than an optional path keeps the one-time promotion explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteId {
    /// A note that exists only in memory.
    Draft,
    /// A note stored at an absolute path inside the notebook.
    Saved(PathBuf),
}

impl NoteId {
    pub fn is_draft(&self) -> bool {
        matches!(self, NoteId::Draft)
    }

    /// The on-disk path, if the note has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            NoteId::Draft => None,
            NoteId::Saved(path) => Some(path),
        }
    }
}

/// The note currently shown in the editor: its identity plus the latest
/// serialized content reported by the editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNote {
    pub id: NoteId,
    pub content: String,
}

impl ActiveNote {
    pub(crate) fn draft() -> Self {
        ActiveNote { id: NoteId::Draft, content: String::new() }
    }
}

impl Default for ActiveNote {
    fn default() -> Self {
        ActiveNote::draft()
    }
}
