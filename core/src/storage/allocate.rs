//! Collision-free path allocation.
//!
//! Pure given its inputs; the caller supplies a fresh known-file set when
//! freshness matters (typically straight after a directory index refresh).

use std::path::{Path, PathBuf};

use crate::storage::NOTE_EXTENSION;

/// How candidate paths are compared against the known file set.
///
/// Whether two paths differing only in case collide depends on the target
/// filesystem, so this is a declared policy rather than a hard-coded
/// assumption. The default matches the reference deployment (APFS/NTFS
/// style case-insensitive filesystems).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    pub(crate) fn paths_equal(self, a: &Path, b: &Path) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => {
                a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
            }
        }
    }

    pub(crate) fn contains(self, known: &[PathBuf], candidate: &Path) -> bool {
        known.iter().any(|p| self.paths_equal(p, candidate))
    }
}

/// Returns a path in `dir` for `stem` that is not a member of `known`.
///
/// Tries `dir/stem.md` first, then `dir/stem (2).md`, `dir/stem (3).md`, and
/// so on until an absent path is found. Performs no I/O.
pub fn unique_note_path(
    dir: &Path,
    stem: &str,
    known: &[PathBuf],
    case: CaseSensitivity,
) -> PathBuf {
    let base = dir.join(format!("{stem}.{NOTE_EXTENSION}"));
    if !case.contains(known, &base) {
        return base;
    }
    let mut n: u32 = 2;
    loop {
        let candidate = dir.join(format!("{stem} ({n}).{NOTE_EXTENSION}"));
        if !case.contains(known, &candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn free_stem_uses_plain_path() {
        let existing = known(&["/notes/Other.md"]);
        let path = unique_note_path(Path::new("/notes"), "Day log", &existing, CaseSensitivity::Insensitive);
        assert_eq!(path, PathBuf::from("/notes/Day log.md"));
    }

    #[test]
    fn collision_appends_numeric_suffix() {
        let existing = known(&["/notes/Day log.md"]);
        let path = unique_note_path(Path::new("/notes"), "Day log", &existing, CaseSensitivity::Insensitive);
        assert_eq!(path, PathBuf::from("/notes/Day log (2).md"));
    }

    #[test]
    fn suffix_increments_past_taken_candidates() {
        let existing = known(&["/notes/Day log.md", "/notes/Day log (2).md", "/notes/Day log (3).md"]);
        let path = unique_note_path(Path::new("/notes"), "Day log", &existing, CaseSensitivity::Insensitive);
        assert_eq!(path, PathBuf::from("/notes/Day log (4).md"));
    }

    #[test]
    fn output_is_never_a_member_of_the_known_set() {
        let existing = known(&["/notes/a.md", "/notes/a (2).md", "/notes/b.md"]);
        for stem in ["a", "b", "c"] {
            let path = unique_note_path(Path::new("/notes"), stem, &existing, CaseSensitivity::Insensitive);
            assert!(!existing.contains(&path), "{} collided", path.display());
        }
    }

    #[test]
    fn insensitive_policy_treats_case_variants_as_collisions() {
        let existing = known(&["/notes/day log.md"]);
        let path = unique_note_path(Path::new("/notes"), "Day Log", &existing, CaseSensitivity::Insensitive);
        assert_eq!(path, PathBuf::from("/notes/Day Log (2).md"));
    }

    #[test]
    fn sensitive_policy_allows_case_variants() {
        let existing = known(&["/notes/day log.md"]);
        let path = unique_note_path(Path::new("/notes"), "Day Log", &existing, CaseSensitivity::Sensitive);
        assert_eq!(path, PathBuf::from("/notes/Day Log.md"));
    }
}
