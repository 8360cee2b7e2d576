//! EPUB container handling.
//!
//! An EPUB is a zip archive; only its HTML-family content documents are
//! touched, and everything else is reproduced byte for byte.

mod records;
mod rewriter;

pub use rewriter::{ArchiveRewriter, HTML_EXTENSIONS, is_html_entry};
