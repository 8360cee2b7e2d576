//! # speedread
//!
//! Speed-reading emphasis for EPUB books. Every word inside a paragraph gets
//! its leading part wrapped in `<strong>`, either its first phonetic syllable
//! or a prefix whose length depends on the word length ("bionic" reading).
//!
//! ## Features
//!
//! - Russian-aware syllable segmentation and a fixed-prefix bionic mode
//! - Punctuation markers and paragraph spacing through one injected stylesheet
//! - Byte-exact container rewriting: only HTML documents change, every other
//!   entry and all zip metadata are reproduced verbatim
//! - Idempotent: rewriting a rewritten book changes nothing
//!
//! ## Quick Start
//!
//! ```no_run
//! use speedread::{Mode, RewriteOptions, Rewriter, output_file_name};
//!
//! let rewriter = Rewriter::with_options(RewriteOptions::new().with_mode(Mode::Syllable));
//! let output = output_file_name("book.epub");
//! let report = rewriter.rewrite_file("book.epub", &output)?;
//! println!("{output}: {} of {} entries rewritten", report.rewritten, report.entries);
//! # Ok::<(), speedread::Error>(())
//! ```
//!
//! ## Lower-level pieces
//!
//! ```
//! use speedread::Mode;
//! use speedread::segment::{Segmenter, split};
//! use speedread::text::{RewriteNode, annotate};
//!
//! assert_eq!(split("молоко", Mode::Syllable).head, "мо");
//!
//! let segmenter = Segmenter::new();
//! let nodes = annotate("Молоко!", Mode::Bionic, &segmenter).unwrap();
//! assert_eq!(
//!     nodes,
//!     [
//!         RewriteNode::Emphasis("Мо"),
//!         RewriteNode::PlainText("локо"),
//!         RewriteNode::PunctMarker("!"),
//!     ]
//! );
//! ```

pub mod dom;
pub mod epub;
pub mod error;
pub mod mode;
pub mod rewriter;
pub mod segment;
pub mod text;
pub mod transform;
pub(crate) mod util;

pub use error::{Error, Result};
pub use mode::Mode;
pub use rewriter::{RewriteOptions, RewriteOutput, RewriteReport, Rewriter, rewrite_epub};
pub use transform::{DocumentRewriter, Outcome};
pub use util::output_file_name;
