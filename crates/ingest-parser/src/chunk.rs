//! Fixed-window text chunking.
//!
//! Produces a contiguous, dense sequence of overlapping character windows.
//! Operates on `char` boundaries (not bytes) so multi-byte UTF-8 text is
//! never split mid-codepoint.

/// Split `text` into overlapping windows of `chunk_size` characters, each
/// subsequent window starting `chunk_size - overlap` characters after the
/// previous one. `overlap` is clamped below `chunk_size` so the window
/// always advances.
#[must_use]
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(chunk_size.saturating_sub(1));
    let stride = chunk_size - overlap;

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += stride;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("hello world", 1000, 200);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn chunks_are_contiguous_and_dense() {
        let text = "a".repeat(2500);
        let chunks = chunk_text(&text, 1000, 200);
        // strides of 800 over 2500 chars: [0,1000) [800,1800) [1600,2500)
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[2].len(), 900);
    }

    #[test]
    fn overlap_cannot_reach_or_exceed_chunk_size() {
        let text = "x".repeat(50);
        let chunks = chunk_text(&text, 10, 10);
        assert!(chunks.len() > 1, "overlap must be clamped so the window advances");
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let text = "héllo wörld 日本語".repeat(50);
        let chunks = chunk_text(&text, 20, 5);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 1000, 200).is_empty());
    }
}
