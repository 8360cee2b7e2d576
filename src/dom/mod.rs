//! Owned document tree for HTML-family content.
//!
//! html5ever parses into a temporary reference-counted tree (see
//! [`tree_sink`]) which is converted into plain owned nodes. Each element
//! owns its children in a `Vec`; there are no parent or sibling links, so
//! edits are splices on the owning child list.

mod serialize;
mod tree_sink;
pub mod xml;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{LocalName, ParseOpts, QualName, ns, parse_document};

pub use serialize::to_xhtml;

use tree_sink::RcSink;

/// Elements that never have content and are written self-closed.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

pub fn is_void(local: &str) -> bool {
    VOID_ELEMENTS.contains(&local)
}

/// A parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(Doctype),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: QualName,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// HTML attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// Parse an HTML or XHTML document.
///
/// Parsing never fails; malformed markup is repaired the way browsers do.
pub fn parse(html: &str) -> Document {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            // Keep <noscript> content as markup rather than raw text
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcSink::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

impl Document {
    /// First element with the given local name, in document order.
    pub fn find(&self, local: &str) -> Option<&Element> {
        find_in(&self.children, local)
    }

    pub fn find_mut(&mut self, local: &str) -> Option<&mut Element> {
        find_in_mut(&mut self.children, local)
    }
}

fn find_in<'a>(nodes: &'a [Node], local: &str) -> Option<&'a Element> {
    nodes.iter().find_map(|node| match node {
        Node::Element(el) if el.is(local) => Some(el),
        Node::Element(el) => find_in(&el.children, local),
        _ => None,
    })
}

fn find_in_mut<'a>(nodes: &'a mut [Node], local: &str) -> Option<&'a mut Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.is(local) {
                return Some(el);
            }
            if let Some(found) = find_in_mut(&mut el.children, local) {
                return Some(found);
            }
        }
    }
    None
}

impl Element {
    /// Create an HTML element with no attributes.
    pub fn html(local: &str) -> Self {
        Self {
            name: QualName::new(None, ns!(html), LocalName::from(local)),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Whether this is the HTML element `local`.
    pub fn is(&self, local: &str) -> bool {
        self.name.ns == ns!(html) && &*self.name.local == local
    }

    /// Get an attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| &*a.name.local == name) {
            attr.value = value.to_string();
            return;
        }
        self.attrs.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string(),
        });
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            _ => {}
        }
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}
