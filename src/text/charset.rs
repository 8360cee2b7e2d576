//! Character classes used by the tokenizer and the syllable rules.
//!
//! Every class is a plain data table so the boundaries can be read and
//! tested on their own. The supported alphabet is Russian Cyrillic.

/// Inclusive codepoint ranges that make up a word.
///
/// `А..=Я` and `а..=я` are contiguous in Unicode; `Ё`/`ё` sit outside them.
pub const WORD_RANGES: &[(char, char)] = &[
    ('А', 'Я'),
    ('а', 'я'),
    ('Ё', 'Ё'),
    ('ё', 'ё'),
];

/// Punctuation emitted as standalone marker tokens, one character each.
pub const PUNCT_CHARS: &[char] = &[
    ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '«', '»', '“', '”', '"', '—', '–', '-',
];

/// Vowels, both cases.
pub const VOWELS: &[char] = &[
    'а', 'е', 'ё', 'и', 'о', 'у', 'ы', 'э', 'ю', 'я', 'А', 'Е', 'Ё', 'И', 'О', 'У', 'Ы', 'Э', 'Ю',
    'Я',
];

/// Soft and hard signs. A cluster ending in one of these hands exactly
/// one letter to the next syllable.
pub const SYLLABLE_MARKERS: &[char] = &['ь', 'ъ'];

/// Two-letter consonant clusters allowed to open a syllable (lowercase).
pub const ONSETS_2: &[&str] = &[
    "бл", "бр", "вл", "вр", "гл", "гр", "дл", "др", "жр", "зл", "зр", "кл", "кр", "пл", "пр", "сл",
    "см", "сн", "сп", "ст", "ск", "ср", "сф", "сх", "св", "шл", "шр", "тл", "тр", "фл", "фр", "хл",
    "хр", "чр", "вт", "гн", "мн", "мл", "мр", "нл", "нр",
];

/// Three-letter consonant clusters allowed to open a syllable (lowercase).
pub const ONSETS_3: &[&str] = &["стр", "скр", "спр", "скл", "всп"];

/// Whether `c` belongs to the word alphabet.
#[inline]
pub fn is_word_char(c: char) -> bool {
    WORD_RANGES.iter().any(|&(lo, hi)| lo <= c && c <= hi)
}

/// Whether `c` is a standalone punctuation token.
#[inline]
pub fn is_punct(c: char) -> bool {
    PUNCT_CHARS.contains(&c)
}

#[inline]
pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

#[inline]
pub fn is_syllable_marker(c: char) -> bool {
    SYLLABLE_MARKERS.contains(&c)
}
