//! XHTML-compatible serialization of a [`Document`].
//!
//! Output is well-formed for documents that were well-formed on input:
//! void elements and empty foreign elements are self-closed, text and
//! attribute values are escaped, and the bogus comments the HTML tokenizer
//! makes out of `<?xml ...?>` and `<![CDATA[...]]>` are written back in
//! their original form.

use html5ever::{QualName, ns};

use super::{Doctype, Document, Element, Node, is_void};

/// Elements whose text children are written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script",
    "style",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
];

/// Serialize a document to a string.
pub fn to_xhtml(doc: &Document) -> String {
    let mut out = String::new();
    for node in &doc.children {
        write_node(&mut out, node, false);
        if !matches!(node, Node::Element(_)) {
            out.push('\n');
        }
    }
    out
}

fn write_node(out: &mut String, node: &Node, raw: bool) {
    match node {
        Node::Element(el) => write_element(out, el),
        Node::Text(text) if raw => out.push_str(text),
        Node::Text(text) => escape_text(out, text),
        Node::Comment(text) => write_comment(out, text),
        Node::Doctype(doctype) => write_doctype(out, doctype),
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    write_name(out, &el.name);
    for attr in &el.attrs {
        out.push(' ');
        write_name(out, &attr.name);
        out.push_str("=\"");
        escape_attr(out, &attr.value);
        out.push('"');
    }

    let html = el.name.ns == ns!(html);
    let local = el.local_name();
    if (html && is_void(local)) || (!html && el.children.is_empty()) {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let raw = html && RAW_TEXT_ELEMENTS.contains(&local);
    for child in &el.children {
        write_node(out, child, raw);
    }

    out.push_str("</");
    write_name(out, &el.name);
    out.push('>');
}

fn write_name(out: &mut String, name: &QualName) {
    // html5ever gives a bare `xmlns` on foreign elements an empty prefix
    if let Some(prefix) = name.prefix.as_ref().filter(|p| !p.is_empty()) {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(&name.local);
}

fn write_comment(out: &mut String, text: &str) {
    if text.starts_with('?') {
        // Processing instruction or XML declaration
        out.push('<');
        out.push_str(text);
        out.push('>');
    } else if text.starts_with("[CDATA[") {
        out.push_str("<!");
        out.push_str(text);
        out.push('>');
    } else {
        out.push_str("<!--");
        out.push_str(text);
        out.push_str("-->");
    }
}

fn write_doctype(out: &mut String, doctype: &Doctype) {
    out.push_str("<!DOCTYPE ");
    out.push_str(&doctype.name);
    if !doctype.public_id.is_empty() {
        out.push_str(" PUBLIC \"");
        out.push_str(&doctype.public_id);
        out.push('"');
        if !doctype.system_id.is_empty() {
            out.push_str(" \"");
            out.push_str(&doctype.system_id);
            out.push('"');
        }
    } else if !doctype.system_id.is_empty() {
        out.push_str(" SYSTEM \"");
        out.push_str(&doctype.system_id);
        out.push('"');
    }
    out.push('>');
}

fn escape_text(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;

    fn round_trip(html: &str) -> String {
        to_xhtml(&parse(html))
    }

    #[test]
    fn test_xhtml_document_round_trip() {
        let src = concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<!DOCTYPE html>\n",
            "<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>T</title></head>",
            "<body><p class=\"a\">x<br/>y</p></body></html>",
        );
        assert_eq!(round_trip(src), src);
    }

    #[test]
    fn test_void_elements_self_close() {
        let out = round_trip("<body><img src=a.png><hr></body>");
        assert!(out.contains("<img src=\"a.png\"/><hr/>"));
        assert!(!out.contains("</img>"));
    }

    #[test]
    fn test_escaping() {
        let out = round_trip(r#"<body><p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3</p></body>"#);
        assert!(out.contains(r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3</p>"#));
    }

    #[test]
    fn test_raw_text_is_verbatim() {
        let out = round_trip("<head><style>p > a { color: red }</style></head><body></body>");
        assert!(out.contains("<style>p > a { color: red }</style>"));
    }

    #[test]
    fn test_legacy_doctype() {
        let src = concat!(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" ",
            "\"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">\n",
            "<html><head></head><body></body></html>",
        );
        assert_eq!(round_trip(src), src);
    }

    #[test]
    fn test_svg_keeps_case_and_self_closes() {
        let out = round_trip(
            r#"<body><svg viewBox="0 0 1 1"><image xlink:href="c.jpg"></image></svg></body>"#,
        );
        assert!(out.contains(r#"<svg viewBox="0 0 1 1"><image xlink:href="c.jpg"/></svg>"#));
    }

    #[test]
    fn test_svg_namespace_declarations() {
        let src = concat!(
            "<body><div><svg xmlns=\"http://www.w3.org/2000/svg\" ",
            "xmlns:xlink=\"http://www.w3.org/1999/xlink\" viewBox=\"0 0 600 800\">",
            "<image xlink:href=\"cover.jpg\"/></svg></div></body>",
        );
        let out = round_trip(src);
        assert!(out.contains(concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
            "xmlns:xlink=\"http://www.w3.org/1999/xlink\" viewBox=\"0 0 600 800\">",
            "<image xlink:href=\"cover.jpg\"/></svg>",
        )));
        assert!(!out.contains(":xmlns"));
    }

    #[test]
    fn test_math_namespace_declaration() {
        let out = round_trip(
            r#"<body><p><math xmlns="http://www.w3.org/1998/Math/MathML"><mi>x</mi></math></p></body>"#,
        );
        assert!(out.contains(r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mi>x</mi></math>"#));
    }

    #[test]
    fn test_comment_and_nbsp() {
        let out = round_trip("<body><!-- note --><p>&nbsp;</p></body>");
        assert!(out.contains("<!-- note --><p>\u{a0}</p>"));
    }
}
