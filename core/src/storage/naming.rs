//! Derives filename stems for notes that do not have a user-assigned name.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

/// Maximum length, in characters, of a content-derived stem.
pub const MAX_STEM_LENGTH: usize = 50;

// A leading run of markdown heading markers plus following whitespace.
static HEADING_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s*").expect("valid heading marker pattern"));

// Characters that are invalid in filenames on at least one supported platform.
static INVALID_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("valid invalid-char pattern"));

/// Derives a filename stem from the first usable line of `content`.
///
/// For each line in order: strip leading heading markers, remove characters
/// invalid in filenames, and trim whitespace. The first line left non-empty
/// becomes the candidate. Candidates longer than [`MAX_STEM_LENGTH`] are
/// truncated to that length and then backed up to the last preceding space so
/// no word is cut in half; when the truncated prefix contains no space, the
/// hard truncation stands. Returns `None` when no line yields a usable name.
pub fn stem_from_content(content: &str) -> Option<String> {
    for line in content.lines() {
        let cleaned = HEADING_MARKERS.replace(line, "");
        let cleaned = INVALID_FILENAME_CHARS.replace_all(&cleaned, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            continue;
        }
        if cleaned.chars().count() <= MAX_STEM_LENGTH {
            return Some(cleaned.to_string());
        }
        let truncated: String = cleaned.chars().take(MAX_STEM_LENGTH).collect();
        return Some(match truncated.rfind(' ') {
            Some(at) if at > 0 => truncated[..at].to_string(),
            _ => truncated,
        });
    }
    None
}

// Last issued timestamp in milliseconds. Shared process-wide so repeated
// same-millisecond calls still produce distinct, increasing stems.
static LAST_ISSUED_MS: AtomicU64 = AtomicU64::new(0);

/// Returns a fallback stem based on the current wall clock, guaranteed
/// strictly increasing across calls within this process.
pub fn timestamp_stem() -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut last = LAST_ISSUED_MS.load(Ordering::Relaxed);
    loop {
        let next = now_ms.max(last + 1);
        match LAST_ISSUED_MS.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return format!("untitled-{next}"),
            Err(current) => last = current,
        }
    }
}
