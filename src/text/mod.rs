//! Text-level processing: character classes, tokenization and annotation.

pub mod annotate;
pub mod charset;
mod tokenizer;

pub use annotate::{RewriteNode, annotate};
pub use tokenizer::{Token, Tokens, has_marked_tokens, tokenize};
