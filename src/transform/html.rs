//! Speed-reading markup for HTML-family documents.
//!
//! A rewrite makes three edits to a parsed document:
//!
//! 1. appends the `speedread-style` stylesheet to `<head>`,
//! 2. replaces every annotatable text node inside a `<p>` with
//!    `<strong>` heads, plain remainders and `<span class="punct">` markers,
//! 3. follows every paragraph with an `sr-gap` spacer paragraph.
//!
//! Each step is idempotent, and a document that already carries the
//! stylesheet is left byte-identical by [`DocumentRewriter::rewrite_html`].

use tracing::trace;

use crate::dom::{self, Document, Element, Node, xml};
use crate::mode::Mode;
use crate::segment::Segmenter;
use crate::text::{RewriteNode, annotate};
use crate::util::{decode_text, encode_text, sniff_charset};

/// `id` of the injected `<style>` element.
pub const STYLE_ID: &str = "speedread-style";

/// Rules of the injected stylesheet.
pub const STYLE_CSS: &str = "p { text-indent: 1.25em; margin-top: 0; margin-bottom: 0; } \
                             p + p { margin-top: 0; } \
                             .sr-gap { text-indent: 0; margin: 0 0 1em 0; } \
                             .punct { color: #666; opacity: 0.65; }";

/// Class of the spacer paragraphs.
pub const GAP_CLASS: &str = "sr-gap";

/// Class of punctuation markers.
pub const PUNCT_CLASS: &str = "punct";

/// Text inside these elements is never annotated, whatever their namespace.
const SKIPPED_PARENTS: &[&str] = &["script", "style"];

/// What [`DocumentRewriter::rewrite_html`] did with a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New serialized bytes, in the source encoding.
    Rewritten(Vec<u8>),
    /// The source has no `<body>`.
    NoBody,
    /// The source already carries the speed-reading stylesheet.
    AlreadyProcessed,
    /// The source encoding cannot be written back (UTF-16).
    UnsupportedEncoding(&'static str),
}

/// Applies speed-reading markup to documents.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRewriter<'s> {
    mode: Mode,
    segmenter: &'s Segmenter,
}

impl<'s> DocumentRewriter<'s> {
    pub fn new(mode: Mode, segmenter: &'s Segmenter) -> Self {
        Self { mode, segmenter }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Rewrite a parsed document in place.
    ///
    /// Returns `false`, leaving the tree untouched, when there is no body.
    /// Text is only annotated on the first pass; later passes find the
    /// stylesheet and only re-check style and gaps, which are already in
    /// place.
    pub fn rewrite(&self, doc: &mut Document) -> bool {
        if doc.find("body").is_none() {
            return false;
        }

        let processed = has_style(doc);
        ensure_style(doc);

        if let Some(body) = doc.find_mut("body") {
            if !processed {
                self.annotate_paragraphs(&mut body.children);
            }
            insert_gaps(&mut body.children);
        }
        true
    }

    /// Decode, parse, rewrite and re-encode a document.
    pub fn rewrite_html(&self, bytes: &[u8]) -> Outcome {
        let decoded = decode_text(bytes, sniff_charset(bytes));
        if !decoded.is_round_trippable() {
            return Outcome::UnsupportedEncoding(decoded.encoding.name());
        }
        if !xml::has_body_tag(&decoded.text) {
            return Outcome::NoBody;
        }

        let source = xml::expand_empty_elements(&decoded.text);
        let mut doc = dom::parse(&source);
        if has_style(&doc) {
            return Outcome::AlreadyProcessed;
        }
        if !self.rewrite(&mut doc) {
            return Outcome::NoBody;
        }

        let html = dom::to_xhtml(&doc);
        trace!(
            encoding = decoded.encoding.name(),
            bytes = html.len(),
            "document rewritten"
        );
        Outcome::Rewritten(encode_text(&html, decoded.encoding, decoded.bom))
    }

    /// Annotate the text of every paragraph found under `nodes`.
    pub fn annotate_paragraphs(&self, nodes: &mut [Node]) {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is("p") {
                    self.annotate_text(&mut el.children);
                } else {
                    self.annotate_paragraphs(&mut el.children);
                }
            }
        }
    }

    /// Replace annotatable text nodes in `nodes` and their descendants.
    fn annotate_text(&self, nodes: &mut Vec<Node>) {
        let old = std::mem::take(nodes);
        nodes.reserve(old.len());

        for node in old {
            match node {
                Node::Text(text) => {
                    let parts: Option<Vec<Node>> = annotate(&text, self.mode, self.segmenter)
                        .map(|parts| parts.into_iter().map(rewrite_node).collect());
                    match parts {
                        Some(parts) => nodes.extend(parts),
                        None => nodes.push(Node::Text(text)),
                    }
                }
                Node::Element(mut el) => {
                    if !SKIPPED_PARENTS.contains(&el.local_name()) {
                        self.annotate_text(&mut el.children);
                    }
                    nodes.push(Node::Element(el));
                }
                other => nodes.push(other),
            }
        }
    }
}

fn rewrite_node(part: RewriteNode<'_>) -> Node {
    match part {
        RewriteNode::Emphasis(head) => Element::html("strong").with_text(head).into(),
        RewriteNode::PlainText(text) => Node::Text(text.to_string()),
        RewriteNode::PunctMarker(p) => Element::html("span")
            .with_attr("class", PUNCT_CLASS)
            .with_text(p)
            .into(),
    }
}

/// Whether the document already has the speed-reading stylesheet.
pub fn has_style(doc: &Document) -> bool {
    fn walk(nodes: &[Node]) -> bool {
        nodes.iter().any(|node| match node {
            Node::Element(el) => el.attr("id") == Some(STYLE_ID) || walk(&el.children),
            _ => false,
        })
    }
    walk(&doc.children)
}

/// Append the stylesheet to `<head>` unless it is already present.
///
/// Returns whether a stylesheet was added.
pub fn ensure_style(doc: &mut Document) -> bool {
    if has_style(doc) {
        return false;
    }
    let Some(head) = doc.find_mut("head") else {
        return false;
    };
    let style = Element::html("style")
        .with_attr("id", STYLE_ID)
        .with_attr("type", "text/css")
        .with_text(STYLE_CSS);
    head.children.push(style.into());
    true
}

fn gap_paragraph() -> Node {
    Element::html("p")
        .with_attr("class", GAP_CLASS)
        .with_text("\u{a0}")
        .into()
}

fn is_gap(el: &Element) -> bool {
    el.is("p") && el.has_class(GAP_CLASS)
}

/// Follow every paragraph under `nodes` with a gap paragraph, unless its
/// next element sibling already is one. Gap paragraphs get no gap, and
/// neither do empty ones: the HTML tree builder makes a `<p></p>` out of a
/// stray `</p>`.
pub fn insert_gaps(nodes: &mut Vec<Node>) {
    let mut i = 0;
    while i < nodes.len() {
        let wants_gap = match &mut nodes[i] {
            Node::Element(el) => {
                insert_gaps(&mut el.children);
                el.is("p") && !is_gap(el) && !el.children.is_empty()
            }
            _ => false,
        };

        let next_is_gap = nodes[i + 1..]
            .iter()
            .find_map(Node::as_element)
            .is_some_and(is_gap);

        if wants_gap && !next_is_gap {
            nodes.insert(i + 1, gap_paragraph());
            i += 1;
        }
        i += 1;
    }
}
