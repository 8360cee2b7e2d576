//! Turns a text run into the nodes that replace it in a document.

use crate::mode::Mode;
use crate::segment::Segmenter;

use super::tokenizer::{Token, has_marked_tokens, tokenize};

/// One piece of an annotated text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteNode<'a> {
    /// Emphasized word head, rendered bold.
    Emphasis(&'a str),
    /// Unstyled text.
    PlainText(&'a str),
    /// Punctuation rendered with the dimmed marker style.
    PunctMarker(&'a str),
}

impl<'a> RewriteNode<'a> {
    pub fn text(&self) -> &'a str {
        match *self {
            RewriteNode::Emphasis(s) | RewriteNode::PlainText(s) | RewriteNode::PunctMarker(s) => s,
        }
    }
}

/// Annotate `text` under `mode`.
///
/// Returns `None` when the run holds no word and no punctuation, which
/// tells the caller to leave the text node alone. Otherwise the node texts
/// concatenate to `text` exactly.
///
/// ```
/// use speedread::Mode;
/// use speedread::segment::Segmenter;
/// use speedread::text::{annotate, RewriteNode};
///
/// let segmenter = Segmenter::new();
/// let nodes = annotate("Молоко, да", Mode::Syllable, &segmenter).unwrap();
/// assert_eq!(
///     nodes,
///     vec![
///         RewriteNode::Emphasis("Мо"),
///         RewriteNode::PlainText("локо"),
///         RewriteNode::PunctMarker(","),
///         RewriteNode::PlainText(" "),
///         RewriteNode::Emphasis("да"),
///     ]
/// );
/// assert!(annotate("  \n", Mode::Syllable, &segmenter).is_none());
/// ```
pub fn annotate<'a>(text: &'a str, mode: Mode, segmenter: &Segmenter) -> Option<Vec<RewriteNode<'a>>> {
    if !has_marked_tokens(text) {
        return None;
    }

    let mut nodes = Vec::new();
    for token in tokenize(text) {
        match token {
            Token::Word(word) => {
                let split = segmenter.split(word, mode);
                if split.head.is_empty() {
                    nodes.push(RewriteNode::PlainText(word));
                } else {
                    nodes.push(RewriteNode::Emphasis(split.head));
                    if !split.remainder.is_empty() {
                        nodes.push(RewriteNode::PlainText(split.remainder));
                    }
                }
            }
            Token::Punct(p) => nodes.push(RewriteNode::PunctMarker(p)),
            Token::Plain(s) => nodes.push(RewriteNode::PlainText(s)),
        }
    }
    Some(nodes)
}
