//! Word segmentation: which leading part of a word gets emphasized.
//!
//! Two interchangeable strategies are provided, selected by [`Mode`]:
//!
//! - [`Mode::Syllable`] emphasizes the first phonetic syllable,
//! - [`Mode::Bionic`] emphasizes a prefix sized by word length.
//!
//! [`split`] is the pure function. [`Segmenter`] wraps it with one bounded
//! cache per strategy and is what the document rewriter uses; the two always
//! agree.

pub mod bionic;
mod cache;
pub mod syllable;

pub use cache::{DEFAULT_CAPACITY, SegmentCache};
pub use syllable::syllables;

use crate::mode::Mode;

/// A word divided into its emphasized head and the rest.
///
/// `head` followed by `remainder` is always exactly the original word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'w> {
    pub head: &'w str,
    pub remainder: &'w str,
}

impl<'w> Split<'w> {
    fn at(word: &'w str, mid: usize) -> Self {
        let (head, remainder) = word.split_at(mid);
        Split { head, remainder }
    }
}

/// Split `word` under `mode` without caching.
///
/// ```
/// use speedread::Mode;
/// use speedread::segment::split;
///
/// let s = split("происходит", Mode::Syllable);
/// assert_eq!((s.head, s.remainder), ("про", "исходит"));
///
/// let s = split("происходит", Mode::Bionic);
/// assert_eq!((s.head, s.remainder), ("про", "исходит"));
/// ```
pub fn split(word: &str, mode: Mode) -> Split<'_> {
    Split::at(word, split_point(word, mode))
}

fn split_point(word: &str, mode: Mode) -> usize {
    match mode {
        Mode::Syllable => syllable::head_len(word),
        Mode::Bionic => bionic::head_len(word),
    }
}

/// Cached segmentation service, one cache per strategy.
///
/// A `Segmenter` is `Sync`; share one across threads behind an `Arc` or a
/// reference to reuse the caches for the life of the process.
#[derive(Debug)]
pub struct Segmenter {
    syllable: SegmentCache,
    bionic: SegmentCache,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a segmenter remembering up to `capacity` words per strategy.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            syllable: SegmentCache::new(capacity),
            bionic: SegmentCache::new(capacity),
        }
    }

    /// Split `word` under `mode`, consulting the strategy's cache first.
    pub fn split<'w>(&self, word: &'w str, mode: Mode) -> Split<'w> {
        let mid = self
            .cache(mode)
            .get_or_insert_with(word, || split_point(word, mode));
        Split::at(word, mid)
    }

    pub fn cache(&self, mode: Mode) -> &SegmentCache {
        match mode {
            Mode::Syllable => &self.syllable,
            Mode::Bionic => &self.bionic,
        }
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_words_are_all_head() {
        for mode in Mode::ALL {
            let s = split("кот", mode);
            assert_eq!(s.head, "кот");
            assert_eq!(s.remainder, "");
        }
    }

    #[test]
    fn test_bionic_examples() {
        let s = split("книга", Mode::Bionic);
        assert_eq!((s.head, s.remainder), ("кн", "ига"));
        let s = split("библиотека", Mode::Bionic);
        assert_eq!((s.head, s.remainder), ("биб", "лиотека"));
        let s = split("параллельный", Mode::Bionic);
        assert_eq!(s.head.chars().count(), 4);
    }

    #[test]
    fn test_caches_are_per_strategy() {
        let segmenter = Segmenter::with_capacity(16);
        segmenter.split("молоко", Mode::Syllable);
        assert!(segmenter.cache(Mode::Syllable).contains("молоко"));
        assert!(!segmenter.cache(Mode::Bionic).contains("молоко"));

        let s = segmenter.split("молоко", Mode::Bionic);
        assert_eq!(s.head, "мо");
        assert!(segmenter.cache(Mode::Bionic).contains("молоко"));
    }

    proptest! {
        #[test]
        fn prop_head_plus_remainder_is_word(word in "[а-яА-ЯёЁ]{1,30}") {
            for mode in Mode::ALL {
                let s = split(&word, mode);
                prop_assert_eq!(format!("{}{}", s.head, s.remainder), word.clone());
                prop_assert!(!s.head.is_empty());
            }
        }

        #[test]
        fn prop_cached_matches_pure(words in prop::collection::vec("[а-яё]{1,12}", 1..40)) {
            // A tiny capacity forces evictions between lookups
            let segmenter = Segmenter::with_capacity(3);
            for word in words.iter().chain(words.iter()) {
                for mode in Mode::ALL {
                    prop_assert_eq!(segmenter.split(word, mode), split(word, mode));
                }
            }
        }
    }
}
