//! Fixed-size sequential text chunker.
//!
//! Splits extracted text into contiguous windows of `size` characters for
//! incremental model querying. Slicing is positional, not sentence or token
//! aware; the last chunk may be shorter. Windows are counted in characters,
//! never splitting a UTF-8 code point.

/// Split `text` into ordered, non-overlapping chunks of at most `size`
/// characters whose concatenation equals the input exactly.
///
/// Deterministic and restartable: a pure function of its input. Empty input
/// yields no chunks.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    assert!(size > 0, "chunk size must be > 0");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for c in text.chars() {
        current.push(c);
        count += 1;
        if count == size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("hello world", 10_000);
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 10_000).is_empty());
    }

    #[test]
    fn chunk_count_is_ceiling_of_length_over_size() {
        let text = "x".repeat(25_000);
        let chunks = chunk_text(&text, 10_000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10_000);
        assert_eq!(chunks[1].len(), 10_000);
        assert_eq!(chunks[2].len(), 5_000);
    }

    #[test]
    fn concatenation_round_trips() {
        let text: String = (0..2_500).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let chunks = chunk_text(&text, 700);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let text = "ab".repeat(500);
        let chunks = chunk_text(&text, 100);
        assert_eq!(chunks.len(), 10);
        assert!(chunks.iter().all(|c| c.chars().count() == 100));
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Vietnamese letters are multi-byte; a byte-based splitter would
        // either panic or produce invalid UTF-8 boundaries.
        let text = "đơn vị kế toán ".repeat(100);
        let chunks = chunk_text(&text, 64);
        assert_eq!(chunks.concat(), text);
        assert!(chunks[..chunks.len() - 1]
            .iter()
            .all(|c| c.chars().count() == 64));
    }

    #[test]
    fn deterministic() {
        let text = "một hai ba bốn năm ".repeat(1_000);
        assert_eq!(chunk_text(&text, 333), chunk_text(&text, 333));
    }
}
