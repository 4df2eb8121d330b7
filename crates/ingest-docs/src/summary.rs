//! Summary generation: the first handful of sentences of a file's text,
//! capped in length, used both as the catalog's descriptive text and as the
//! signal for collection inference.

const MAX_SENTENCES: usize = 5;
const MAX_CHARS: usize = 800;

/// Build a summary from `text`: its first [`MAX_SENTENCES`] sentences,
/// truncated to [`MAX_CHARS`] characters. Falls back to `fallback` (e.g. the
/// original filename) when `text` is empty or whitespace-only.
#[must_use]
pub fn build_summary(text: &str, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    let sentences = split_sentences(trimmed);
    let joined = sentences.into_iter().take(MAX_SENTENCES).collect::<Vec<_>>().join(" ");
    truncate_chars(&joined, MAX_CHARS)
}

/// Split on sentence-ending punctuation (`.`, `!`, `?`) followed by
/// whitespace, mirroring a simple regex-based sentence splitter without
/// pulling in a dedicated NLP crate for a single-purpose cut.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let end = idx + ch.len_utf8();
            let next_is_space = bytes.get(end).is_some_and(u8::is_ascii_whitespace);
            if next_is_space || end == bytes.len() {
                sentences.push(text[start..end].trim());
                start = end;
            }
        }
    }
    if start < text.len() {
        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest);
        }
    }
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// Truncate `text` to at most `max_chars` characters, independent of
/// [`build_summary`]'s own cap — used to fit a summary into a shorter
/// preview field without re-deriving it from the source text.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_falls_back_to_filename() {
        assert_eq!(build_summary("   ", "report.pdf"), "report.pdf");
    }

    #[test]
    fn takes_first_five_sentences() {
        let text = "One. Two. Three. Four. Five. Six. Seven.";
        let summary = build_summary(text, "fallback");
        assert_eq!(summary, "One. Two. Three. Four. Five.");
    }

    #[test]
    fn caps_at_max_chars() {
        let text = format!("{} more text after the cap.", "a".repeat(900));
        let summary = build_summary(&text, "fallback");
        assert_eq!(summary.chars().count(), MAX_CHARS);
    }

    #[test]
    fn text_with_no_terminal_punctuation_is_kept_whole_as_one_sentence() {
        let summary = build_summary("no punctuation here", "fallback");
        assert_eq!(summary, "no punctuation here");
    }
}
