//! High-level entry point.
//!
//! [`Rewriter`] owns the segmentation caches and applies the configured
//! [`RewriteOptions`] to whole books or single documents. Keep one around to
//! reuse its caches across books.

use std::fs;
use std::path::Path;

use flate2::Compression;

use crate::epub::ArchiveRewriter;
use crate::error::Result;
use crate::mode::Mode;
use crate::segment::{DEFAULT_CAPACITY, Segmenter};
use crate::transform::{DocumentRewriter, Outcome};

/// Configuration for a [`Rewriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Emphasis strategy (default syllable).
    pub mode: Mode,
    /// Words remembered per strategy by the segmentation cache.
    pub cache_capacity: usize,
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            cache_capacity: DEFAULT_CAPACITY,
            compression_level: None,
        }
    }
}

impl RewriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = Some(level);
        self
    }

    fn compression(&self) -> Compression {
        Compression::new(self.compression_level.unwrap_or(6).min(9))
    }
}

/// Per-archive entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct RewriteReport {
    /// Entries in the archive.
    pub entries: usize,
    /// HTML-family entries that received new content.
    pub rewritten: usize,
    /// Entries copied through because there was nothing to do: non-HTML
    /// entries, documents without a body, already-processed documents.
    pub unchanged: usize,
    /// HTML-family entries copied through because they could not be
    /// processed (encrypted, unsupported compression, unreadable, UTF-16).
    pub skipped: usize,
}

/// A rewritten container and what was done to it.
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    pub data: Vec<u8>,
    pub report: RewriteReport,
}

/// Applies speed-reading emphasis to EPUB books.
///
/// # Example
///
/// ```no_run
/// use speedread::{Mode, RewriteOptions, Rewriter};
///
/// let rewriter = Rewriter::with_options(RewriteOptions::new().with_mode(Mode::Bionic));
/// let report = rewriter.rewrite_file("book.epub", "book-speedread.epub")?;
/// println!("{} documents rewritten", report.rewritten);
/// # Ok::<(), speedread::Error>(())
/// ```
#[derive(Debug)]
pub struct Rewriter {
    options: RewriteOptions,
    segmenter: Segmenter,
}

impl Rewriter {
    /// Create a rewriter with default options.
    pub fn new() -> Self {
        Self::with_options(RewriteOptions::default())
    }

    pub fn with_options(options: RewriteOptions) -> Self {
        let segmenter = Segmenter::with_capacity(options.cache_capacity);
        Self { options, segmenter }
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Rewrite an in-memory container with the configured mode.
    pub fn rewrite(&self, data: &[u8]) -> Result<RewriteOutput> {
        self.rewrite_with_mode(data, self.options.mode)
    }

    /// Rewrite an in-memory container with an explicit mode, sharing this
    /// rewriter's caches.
    pub fn rewrite_with_mode(&self, data: &[u8], mode: Mode) -> Result<RewriteOutput> {
        let documents = DocumentRewriter::new(mode, &self.segmenter);
        let (data, report) = ArchiveRewriter::new(documents)
            .with_compression(self.options.compression())
            .rewrite(data)?;
        Ok(RewriteOutput { data, report })
    }

    /// Rewrite a single HTML-family document.
    pub fn rewrite_document(&self, bytes: &[u8]) -> Outcome {
        DocumentRewriter::new(self.options.mode, &self.segmenter).rewrite_html(bytes)
    }

    /// Rewrite the book at `input` into `output`.
    ///
    /// `output` is only created once the whole book has been rewritten.
    pub fn rewrite_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<RewriteReport> {
        let data = fs::read(input)?;
        let RewriteOutput { data, report } = self.rewrite(&data)?;
        fs::write(output, data)?;
        Ok(report)
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite a container with a mode given by name.
///
/// The mode must be `"syllable"` or `"bionic"`. Each call starts with empty
/// caches; use a [`Rewriter`] to process several books.
pub fn rewrite_epub(data: &[u8], mode: &str) -> Result<Vec<u8>> {
    let mode: Mode = mode.parse()?;
    let rewriter = Rewriter::with_options(RewriteOptions::new().with_mode(mode));
    Ok(rewriter.rewrite(data)?.data)
}
