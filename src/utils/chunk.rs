//! Splitting long outgoing text into message-sized pieces.

/// Byte index just past the first `max_chars` characters of `s`.
#[must_use]
fn slice_end_for_max_chars(s: &str, max_chars: usize) -> usize {
    if max_chars == 0 {
        return 0;
    }

    for (count, (idx, _)) in s.char_indices().enumerate() {
        if count == max_chars {
            return idx;
        }
    }
    s.len()
}

/// Take the next chunk of at most `max_chars` characters off the front of `buffer`.
///
/// Each chunk becomes its own Telegram message, so cuts go after a paragraph break when
/// possible, then a line break, then whitespace. A hard cut is the last resort.
#[must_use]
fn take_chunk(buffer: &mut String, max_chars: usize) -> Option<String> {
    if buffer.is_empty() {
        return None;
    }

    if buffer.chars().count() <= max_chars {
        return Some(std::mem::take(buffer));
    }

    let byte_end = slice_end_for_max_chars(buffer, max_chars);
    let prefix = &buffer[..byte_end];

    let mut split_idx = prefix
        .rfind("\n\n")
        .filter(|&p| p > 0)
        .map(|p| p + 2)
        .or_else(|| prefix.rfind('\n').filter(|&p| p > 0).map(|p| p + 1));

    if split_idx.is_none() {
        split_idx = prefix
            .char_indices()
            .filter(|(_, ch)| ch.is_whitespace())
            .map(|(idx, ch)| idx + ch.len_utf8())
            .last()
            .filter(|&p| p > 0);
    }

    let split_idx = split_idx.unwrap_or(byte_end);
    Some(buffer.drain(..split_idx).collect())
}

/// Split `text` into trimmed, non-empty pieces of at most `max_chars` characters each.
#[must_use]
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }

    let mut buffer = text.trim().to_string();
    let mut chunks = Vec::new();
    while let Some(chunk) = take_chunk(&mut buffer, max_chars) {
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("  hello world \n", 100), vec!["hello world"]);
        assert!(split_message("   ", 100).is_empty());
    }

    #[test]
    fn prefers_paragraph_then_word_boundaries() {
        let text = "first paragraph\n\nsecond paragraph";
        assert_eq!(
            split_message(text, 20),
            vec!["first paragraph", "second paragraph"]
        );

        let words = "alpha beta gamma delta";
        let chunks = split_message(words, 11);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn hard_cut_without_whitespace_respects_char_boundaries() {
        let text = "ж".repeat(10);
        let chunks = split_message(&text, 4);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(chunks.concat(), text);
    }
}
