//! Entry-log codec.
//!
//! A day's journal is stored as one text blob. Entries are appended in
//! order and separated by a blank line; each entry normally starts with a
//! bracketed stamp:
//!
//! ```text
//! [9:00 AM] first thought
//!
//! [1:05 PM] second thought
//!
//! still part of the second thought
//! ```
//!
//! A blank line only separates two entries when the text right after it is
//! a bracketed stamp, so bodies may contain blank lines of their own.
//! Entries are addressed by their position in the parsed sequence. That
//! index is recomputed on every parse and shifts when an earlier entry is
//! removed.

use serde::{Deserialize, Serialize};

use crate::clock;
use crate::constants::ENTRY_SEPARATOR;
use crate::error::CodecError;

/// One journal entry recovered from a day blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Display stamp as written between the brackets, e.g. `"1:05 PM"`.
    pub timestamp: Option<String>,
    /// Free text, possibly spanning several paragraphs.
    pub body: String,
}

impl Entry {
    pub fn new(timestamp: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            body: body.into(),
        }
    }

    /// An entry without a stamp (legacy blobs, hand-written imports).
    pub fn untimed(body: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            body: body.into(),
        }
    }

    /// Split one serialized fragment into stamp and body.
    ///
    /// The stamp is the text up to the first `]` that is followed by a
    /// whitespace character; exactly that one whitespace character is
    /// consumed. A fragment not starting with `[` has no stamp.
    pub fn from_fragment(fragment: &str) -> Self {
        if let Some(inner) = fragment.strip_prefix('[') {
            for (pos, _) in inner.match_indices(']') {
                let rest = &inner[pos + 1..];
                if let Some(ws) = rest.chars().next().filter(|c| c.is_whitespace()) {
                    return Self {
                        timestamp: Some(inner[..pos].to_string()),
                        body: rest[ws.len_utf8()..].to_string(),
                    };
                }
            }
        }
        Self::untimed(fragment)
    }

    /// Render as `"[stamp] body"`, or the bare body when unstamped.
    pub fn to_fragment(&self) -> String {
        match &self.timestamp {
            Some(ts) => format!("[{ts}] {}", self.body),
            None => self.body.clone(),
        }
    }

    /// The 24-hour `HH:MM` value used to pre-fill a time picker.
    pub fn input_time(&self) -> Option<String> {
        self.timestamp.as_deref().and_then(clock::to_input_time)
    }
}

/// Length in bytes of the bracketed stamp at the start of `s`, if any.
///
/// Grammar: `[` 1–2 digits `:` 2 digits, optionally `:` 2 digits, then
/// optionally any whitespace followed by `AM`/`PM` (any case), then `]`.
fn stamp_len(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    let digit = |i: usize| b.get(i).is_some_and(u8::is_ascii_digit);

    let mut i = 0;
    if b.first() != Some(&b'[') {
        return None;
    }
    i += 1;

    if !digit(i) {
        return None;
    }
    i += 1;
    if digit(i) {
        i += 1;
    }

    if b.get(i) != Some(&b':') || !digit(i + 1) || !digit(i + 2) {
        return None;
    }
    i += 3;

    if b.get(i) == Some(&b':') && digit(i + 1) && digit(i + 2) {
        i += 3;
    }

    // Optional meridiem; whitespace is only consumed when AM/PM follows.
    let rest = &s[i..];
    let trimmed = rest.trim_start();
    let meridiem = trimmed
        .get(..2)
        .is_some_and(|m| m.eq_ignore_ascii_case("AM") || m.eq_ignore_ascii_case("PM"));
    if meridiem {
        i += rest.len() - trimmed.len() + 2;
    }

    (b.get(i) == Some(&b']')).then_some(i + 1)
}

/// Split a blob into its raw entry fragments.
///
/// Walks the blob once. At every `"\n\n"` the scanner is at a potential
/// boundary; it only cuts there when a bracketed stamp follows, otherwise
/// it stays inside the current entry. Fragments that are blank after
/// trimming are dropped.
pub fn split_entries(blob: &str) -> Vec<&str> {
    let bytes = blob.as_bytes();
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'\n' && bytes[i + 1] == b'\n' && stamp_len(&blob[i + 2..]).is_some() {
            fragments.push(&blob[start..i]);
            i += 2;
            start = i;
        } else {
            i += 1;
        }
    }
    fragments.push(&blob[start..]);

    fragments.retain(|f| !f.trim().is_empty());

    if fragments.is_empty() && !blob.trim().is_empty() {
        return vec![blob.trim()];
    }
    fragments
}

/// Parse a blob into its ordered entries.
pub fn parse_entries(blob: &str) -> Vec<Entry> {
    split_entries(blob)
        .into_iter()
        .map(Entry::from_fragment)
        .collect()
}

/// Number of entries recoverable from `blob`.
pub fn entry_count(blob: &str) -> usize {
    split_entries(blob).len()
}

pub fn serialize_entries(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(Entry::to_fragment)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Append one entry to the end of `blob`.
///
/// The entry count grows by exactly one as long as the new entry carries a
/// stamp and its body has no blank line followed by a stamp. Bodies are not
/// escaped, so such a line reads back as the start of another entry, and an
/// unstamped entry reads back as part of the previous one.
pub fn append_entry(blob: &str, entry: &Entry) -> String {
    let fragment = entry.to_fragment();
    if blob.is_empty() {
        return fragment;
    }
    format!("{blob}{ENTRY_SEPARATOR}{fragment}")
}

/// Replace the body (and optionally the stamp) of the entry at `index`.
///
/// `new_time` is a 24-hour `HH:MM` picker value; when absent the stored
/// stamp is kept exactly as written. The new body is trimmed. Every other
/// fragment is carried over byte for byte. A body containing a blank line
/// followed by a stamp splits into extra entries on the next read.
pub fn edit_entry_at(
    blob: &str,
    index: usize,
    new_body: &str,
    new_time: Option<&str>,
) -> Result<String, CodecError> {
    let timestamp = new_time.map(clock::to_display_time).transpose()?;

    let fragments = split_entries(blob);
    let len = fragments.len();
    let original = *fragments
        .get(index)
        .ok_or(CodecError::IndexOutOfRange { index, len })?;

    let timestamp = timestamp.or_else(|| Entry::from_fragment(original).timestamp);
    let updated = Entry {
        timestamp,
        body: new_body.trim().to_string(),
    }
    .to_fragment();

    Ok(fragments
        .iter()
        .enumerate()
        .map(|(idx, fragment)| if idx == index { updated.as_str() } else { *fragment })
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR))
}

/// Remove the entries at `indices` in one pass.
///
/// Indices may be unordered or repeated; out-of-range ones are ignored.
/// Removal runs from the highest index down so earlier removals never
/// shift a position that is still pending.
pub fn delete_entries_at(blob: &str, indices: &[usize]) -> String {
    let mut fragments = split_entries(blob);

    let mut sorted = indices.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    for idx in sorted {
        if idx < fragments.len() {
            fragments.remove(idx);
        }
    }
    fragments.join(ENTRY_SEPARATOR)
}

/// Join the selected fragments in blob order, e.g. for a clipboard copy.
pub fn select_entries(blob: &str, indices: &[usize]) -> String {
    split_entries(blob)
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| indices.contains(idx))
        .map(|(_, fragment)| fragment)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Whether `text` contains Arabic script (U+0600..=U+06FF) and should be
/// laid out right-to-left.
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}
