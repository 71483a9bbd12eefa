//! Persistence and naming coordination for a folder of Markdown notes.
//!
//! This module is the storage layer behind a local note-taking UI. The UI is
//! a thin shell; the logic that decides *when* in-memory edits reach disk,
//! *what* a yet-unnamed note should be called, and how navigation interacts
//! with in-flight saves lives here.
//!
//! # Core Concepts
//!
//! *   **[`Notebook`]:** A validated handle to the root directory holding the
//!     notes. Only files with the `.md` extension inside this directory are
//!     listed, saved over, or considered for collision checks.
//! *   **[`NoteId`]:** A note is either a [`NoteId::Draft`] (never written to
//!     disk) or [`NoteId::Saved`] at an absolute path inside the notebook.
//!     A draft is promoted to saved exactly once, at its first successful
//!     persist, and may later be re-addressed by rename.
//! *   **[`Session`]:** The live editing session. It owns the active note,
//!     the cached directory index, and the [`SaveCoordinator`], and exposes
//!     the navigation operations (open, new draft, delete) and renaming.
//! *   **[`SaveCoordinator`]:** Turns content-change notifications into
//!     durable writes. Edits are debounced (800 ms quiet period) and
//!     coalesced; at most one flush runs at any instant, and concurrent
//!     flush callers observe a single underlying write.
//!
//! # Naming
//!
//! A nameless note is named after the first usable line of its content,
//! truncated at a word boundary (see [`stem_from_content`]). When no line
//! yields a name, a strictly increasing timestamp stem is used instead.
//! Candidate paths that collide with existing files are disambiguated with a
//! ` (2)`, ` (3)`, ... suffix rather than overwritten; the comparison follows
//! a declared [`CaseSensitivity`] policy since it is filesystem-dependent.
//!
//! # Asynchronous API
//!
//! All filesystem I/O goes through `tokio::fs`. Methods performing I/O return
//! `Result<T, Error>`. Background autosave failures are logged and swallowed
//! so they never interrupt the user; foreground flush, rename, and delete
//! failures propagate with the previous in-memory state intact. No disk
//! failure discards unsaved content.

pub use self::allocate::{unique_note_path, CaseSensitivity};
pub use self::config::{read_config, write_config, Config};
pub use self::index::list_notes;
pub use self::naming::{stem_from_content, timestamp_stem, MAX_STEM_LENGTH};
pub use self::note::{ActiveNote, NoteId};
pub use self::notebook::Notebook;
pub use self::rename::RenameOutcome;
pub use self::save::SaveCoordinator;
pub use self::session::Session;

mod allocate;
mod config;
mod index;
mod naming;
mod note;
mod notebook;
pub mod path;
mod rename;
mod save;
mod session;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// File extension (without the dot) recognized as a note.
pub const NOTE_EXTENSION: &str = "md";

/// Placeholder stem shown for a note with no user-assigned name. A saved
/// note whose stem matches this (case-insensitively) is renamed from its
/// content on the next persist.
pub const UNTITLED_STEM: &str = "Untitled";

/// Quiet period after the last edit before a background write is attempted.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Debug, Error)]
pub enum Error {
    /// The notebook directory could not be listed (e.g. revoked permission).
    /// The caller is expected to prompt for another folder.
    #[error("Directory is unavailable: {0}")]
    DirectoryUnavailable(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Path does not have a valid parent directory: {0}")]
    NoParentDirectory(PathBuf),

    #[error("Failed to write note file: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename note from {from} to {to}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete note file: {path}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file is missing or invalid: {0}")]
    InvalidConfig(PathBuf),

    #[error("Metadata serialization/deserialization error")]
    Metadata(#[from] serde_json::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

// Define a standard Result type for the library
pub type Result<T> = std::result::Result<T, Error>;
