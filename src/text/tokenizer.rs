//! Splits a text run into word, punctuation and plain fragments.
//!
//! The scan is a small state machine over codepoints. Every character of
//! the input lands in exactly one token, so concatenating the token texts
//! reproduces the input byte for byte.

use super::charset::{is_punct, is_word_char};

/// One fragment of a text run, borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Maximal run of word-alphabet characters.
    Word(&'a str),
    /// A single punctuation character.
    Punct(&'a str),
    /// Anything between tokens: whitespace, digits, other scripts, symbols.
    Plain(&'a str),
}

impl<'a> Token<'a> {
    /// The original text covered by this token.
    pub fn text(&self) -> &'a str {
        match *self {
            Token::Word(s) | Token::Punct(s) | Token::Plain(s) => s,
        }
    }

    /// True for word and punctuation tokens.
    pub fn is_marked(&self) -> bool {
        !matches!(self, Token::Plain(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Word,
    Plain,
}

/// Iterator over the tokens of a text run.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.text[self.pos..];
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;

        if is_punct(first) {
            let end = first.len_utf8();
            self.pos += end;
            return Some(Token::Punct(&rest[..end]));
        }

        let state = if is_word_char(first) {
            State::Word
        } else {
            State::Plain
        };

        let mut end = rest.len();
        for (i, c) in chars {
            let stays = match state {
                State::Word => is_word_char(c),
                State::Plain => !is_word_char(c) && !is_punct(c),
            };
            if !stays {
                end = i;
                break;
            }
        }

        self.pos += end;
        let fragment = &rest[..end];
        Some(match state {
            State::Word => Token::Word(fragment),
            State::Plain => Token::Plain(fragment),
        })
    }
}

/// Tokenize `text` in original order.
///
/// # Example
///
/// ```
/// use speedread::text::{tokenize, Token};
///
/// let tokens: Vec<_> = tokenize("Да, 3 кота").collect();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Word("Да"),
///         Token::Punct(","),
///         Token::Plain(" 3 "),
///         Token::Word("кота"),
///     ]
/// );
/// ```
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { text, pos: 0 }
}

/// Whether the run holds at least one word or punctuation token.
pub fn has_marked_tokens(text: &str) -> bool {
    text.chars().any(|c| is_word_char(c) || is_punct(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect(text: &str) -> Vec<Token<'_>> {
        tokenize(text).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn test_words_and_spaces() {
        assert_eq!(
            collect("Мир  дом"),
            vec![Token::Word("Мир"), Token::Plain("  "), Token::Word("дом")]
        );
    }

    #[test]
    fn test_each_punct_is_its_own_token() {
        assert_eq!(
            collect("?!—"),
            vec![Token::Punct("?"), Token::Punct("!"), Token::Punct("—")]
        );
    }

    #[test]
    fn test_latin_and_digits_are_plain() {
        assert_eq!(
            collect("abc 42 ёж."),
            vec![Token::Plain("abc 42 "), Token::Word("ёж"), Token::Plain(".")]
        );
    }

    #[test]
    fn test_hyphenated_word() {
        assert_eq!(
            collect("кто-то"),
            vec![Token::Word("кто"), Token::Punct("-"), Token::Word("то")]
        );
    }

    #[test]
    fn test_quotes_and_brackets() {
        assert_eq!(
            collect("«Он» (да)"),
            vec![
                Token::Punct("«"),
                Token::Word("Он"),
                Token::Punct("»"),
                Token::Plain(" "),
                Token::Punct("("),
                Token::Word("да"),
                Token::Punct(")"),
            ]
        );
    }

    #[test]
    fn test_has_marked_tokens() {
        assert!(!has_marked_tokens(""));
        assert!(!has_marked_tokens("  \n\t"));
        assert!(!has_marked_tokens("\u{a0}123 abc ."));
        assert!(has_marked_tokens("abc, def"));
        assert!(has_marked_tokens(" я "));
    }

    #[test]
    fn test_plain_fragments_never_adjacent() {
        let tokens = collect("a1 b2 ... c3");
        assert_eq!(tokens, vec![Token::Plain("a1 b2 ... c3")]);
    }

    proptest! {
        #[test]
        fn prop_tokens_reconstruct_input(text in "[а-яА-ЯёЁa-z0-9 ,.;:!?()«»—–\\-\"“”\u{a0}\n€✓]{0,64}") {
            let rebuilt: String = tokenize(&text).map(|t| t.text()).collect();
            prop_assert_eq!(rebuilt, text);
        }

        #[test]
        fn prop_tokens_never_empty(text in "\\PC{0,48}") {
            for token in tokenize(&text) {
                prop_assert!(!token.text().is_empty());
            }
        }

        #[test]
        fn prop_words_are_maximal(text in "[а-яa-z ,]{0,48}") {
            let tokens: Vec<_> = tokenize(&text).collect();
            for pair in tokens.windows(2) {
                prop_assert!(
                    !matches!(pair, [Token::Word(_), Token::Word(_)]),
                    "adjacent words in {:?}",
                    tokens
                );
            }
        }
    }
}
