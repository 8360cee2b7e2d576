//! Fixed-ratio prefix segmentation.

/// Number of leading characters emphasized in a word of `len` characters.
///
/// | length | head |
/// |--------|------|
/// | ≤ 3    | whole word |
/// | 4–7    | 2 |
/// | 8–10   | 3 |
/// | ≥ 11   | `max(3, len / 3)` |
pub fn head_chars(len: usize) -> usize {
    match len {
        0..=3 => len,
        4..=7 => 2,
        8..=10 => 3,
        _ => (len / 3).max(3),
    }
}

/// Byte length of the emphasized prefix of `word`.
pub fn head_len(word: &str) -> usize {
    let n = head_chars(word.chars().count());
    word.char_indices().nth(n).map_or(word.len(), |(b, _)| b)
}
