//! Text budgeting helpers for Notion field limits.

/// Maximum number of lines kept in an excerpt.
pub const MAX_EXCERPT_LINES: usize = 70;

/// Byte budget for an excerpt.
///
/// Notion limits `text.content` to 2000 characters, but counting the UTF-8
/// bytes of multi-byte text still overflows occasionally, so stay under it.
pub const MAX_EXCERPT_BYTES: usize = 1900;

/// Size of each paragraph block in characters.
pub const BLOCK_CHUNK_CHARS: usize = 2000;

/// Build an excerpt from OCR text.
///
/// Takes at most [`MAX_EXCERPT_LINES`] lines and stops before the line at
/// which the accumulated UTF-8 byte length reaches [`MAX_EXCERPT_BYTES`].
/// Newlines are not counted.
pub fn derive_excerpt(text: &str) -> String {
    let mut lines = Vec::new();
    let mut len = 0usize;
    for line in text.split('\n').take(MAX_EXCERPT_LINES) {
        len += line.len();
        if len >= MAX_EXCERPT_BYTES {
            break;
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Split text into chunks of at most `size` characters, preserving order.
pub fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    if size == 0 {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
