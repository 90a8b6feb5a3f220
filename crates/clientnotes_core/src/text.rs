//! Single-line text normalization for list previews and log payloads.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Collapses whitespace runs (newlines included) into one space, trims the
/// ends, and keeps at most `max_chars` characters.
///
/// Returns the text and whether characters were cut.
pub(crate) fn single_line(value: &str, max_chars: usize) -> (String, bool) {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    let mut chars = collapsed.chars();
    let kept = chars.by_ref().take(max_chars).collect::<String>();
    (kept, chars.next().is_some())
}
