//! First-syllable segmentation for Russian words.
//!
//! Syllables are cut between consecutive vowels. The consonant cluster
//! between two vowels is split so that the longest permitted onset starts
//! the next syllable:
//!
//! 1. a cluster opening with a doubled letter splits inside the pair (`сс`),
//! 2. a cluster ending in `ь`/`ъ` hands one letter over,
//! 3. a permitted three-letter onset (`стр`, `скл`, ...) moves as a block,
//! 4. a permitted two-letter onset (`пр`, `ст`, ...) moves as a block,
//! 5. otherwise a single letter moves over.
//!
//! The heuristic is deliberately simple and makes no use of a dictionary.

use crate::text::charset::{ONSETS_2, ONSETS_3, is_syllable_marker, is_vowel};

/// Split `word` into syllables.
///
/// Words with at most one vowel are a single syllable. The returned slices
/// concatenate back to `word`.
///
/// ```
/// use speedread::segment::syllables;
///
/// assert_eq!(syllables("происходит"), vec!["про", "и", "схо", "дит"]);
/// assert_eq!(syllables("стол"), vec!["стол"]);
/// ```
pub fn syllables(word: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let vowels = vowel_positions(&chars);
    if vowels.len() <= 1 {
        return vec![word];
    }

    let byte_at = |i: usize| chars.get(i).map_or(word.len(), |&(b, _)| b);

    let mut out = Vec::with_capacity(vowels.len());
    let mut start = 0;
    for pair in vowels.windows(2) {
        let boundary = boundary(&chars, start, pair[0], pair[1]);
        out.push(&word[byte_at(start)..byte_at(boundary)]);
        start = boundary;
    }
    out.push(&word[byte_at(start)..]);
    out
}

/// Byte length of the first syllable of `word`.
pub fn head_len(word: &str) -> usize {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let vowels = vowel_positions(&chars);
    if vowels.len() <= 1 {
        return word.len();
    }

    let end = boundary(&chars, 0, vowels[0], vowels[1]);
    chars.get(end).map_or(word.len(), |&(b, _)| b)
}

fn vowel_positions(chars: &[(usize, char)]) -> Vec<usize> {
    chars
        .iter()
        .enumerate()
        .filter(|(_, (_, c))| is_vowel(*c))
        .map(|(i, _)| i)
        .collect()
}

/// Char index where the syllable starting at `start` (holding the vowel at
/// `vowel`) ends. Never returns a value `<= start`.
fn boundary(chars: &[(usize, char)], start: usize, vowel: usize, next_vowel: usize) -> usize {
    let cluster: Vec<char> = chars[vowel + 1..next_vowel]
        .iter()
        .map(|&(_, c)| lower(c))
        .collect();

    let boundary = if cluster.is_empty() {
        next_vowel
    } else {
        next_vowel - onset_len(&cluster)
    };

    if boundary <= start { next_vowel } else { boundary }
}

/// How many trailing letters of a lowercase consonant cluster open the
/// next syllable.
fn onset_len(cluster: &[char]) -> usize {
    let n = cluster.len();
    if n >= 2 && cluster[0] == cluster[1] {
        return n - 1;
    }
    if cluster.last().is_some_and(|&c| is_syllable_marker(c)) {
        return 1;
    }
    if n >= 3 && matches_onset(&cluster[n - 3..], ONSETS_3) {
        return 3;
    }
    if n >= 2 && matches_onset(&cluster[n - 2..], ONSETS_2) {
        return 2;
    }
    1
}

fn matches_onset(tail: &[char], table: &[&str]) -> bool {
    table.iter().any(|onset| onset.chars().eq(tail.iter().copied()))
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
