//! Pure path helpers shared by the coordinators. Total functions, no I/O.

use std::path::Path;

use crate::storage::NOTE_EXTENSION;

/// Returns the parent directory of `path`, or an empty path when the path
/// has no separator before position 0.
pub fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Returns the final component of `path` as a string, or `""` for paths
/// without a representable file name.
pub fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Returns the file name of `path` with the note extension stripped,
/// case-insensitively. Other extensions are left in place; a note named
/// `meeting.notes.md` has the stem `meeting.notes`.
pub fn note_stem(path: &Path) -> &str {
    let name = file_name(path);
    let suffix_len = NOTE_EXTENSION.len() + 1;
    match name.len().checked_sub(suffix_len).and_then(|at| name.get(at..)) {
        Some(tail) if tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(NOTE_EXTENSION) => {
            &name[..name.len() - suffix_len]
        }
        _ => name,
    }
}

/// Whether a directory entry name is recognized as a note file.
pub fn is_note_file(name: &str) -> bool {
    let suffix_len = NOTE_EXTENSION.len() + 1;
    match name.len().checked_sub(suffix_len).and_then(|at| name.get(at..)) {
        Some(tail) => tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(NOTE_EXTENSION),
        None => false,
    }
}

/// Whether `path` carries the "Untitled" placeholder stem.
pub fn is_untitled(path: &Path) -> bool {
    note_stem(path).eq_ignore_ascii_case(crate::storage::UNTITLED_STEM)
}
