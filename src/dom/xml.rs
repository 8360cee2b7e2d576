//! Preparing XHTML for an HTML parser.
//!
//! The HTML tree builder ignores the self-closing flag on non-void elements,
//! so `<a id="x"/>` followed by text would swallow that text. Documents that
//! are well-formed XML get such tags expanded to `<a id="x"></a>` first.

use std::borrow::Cow;

use memchr::{memchr, memmem};
use quick_xml::Reader;
use quick_xml::events::Event;

use super::is_void;

/// Expand self-closed non-void elements.
///
/// Input that is not well-formed XML (plain HTML, say) is returned as is,
/// as is input with nothing to expand.
pub fn expand_empty_elements(text: &str) -> Cow<'_, str> {
    match try_expand(text) {
        Ok(Some(expanded)) => Cow::Owned(expanded),
        Ok(None) => Cow::Borrowed(text),
        Err(err) => {
            tracing::trace!(%err, "not well-formed XML, parsing as HTML");
            Cow::Borrowed(text)
        }
    }
}

fn try_expand(text: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(text);
    let mut out = String::new();
    let mut copied = 0;

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Eof => break,
            Event::Empty(e) => {
                let decoder = reader.decoder();
                if is_void(&decoder.decode(e.local_name().as_ref())?) {
                    continue;
                }
                let qname = e.name();
                let name = decoder.decode(qname.as_ref())?;
                let end = reader.buffer_position() as usize;
                let open = text[start..end].trim_end_matches('>').trim_end_matches('/');

                out.push_str(&text[copied..start]);
                out.push_str(open);
                out.push_str("></");
                out.push_str(&name);
                out.push('>');
                copied = end;
            }
            _ => {}
        }
    }

    if copied == 0 {
        return Ok(None);
    }
    out.push_str(&text[copied..]);
    Ok(Some(out))
}

/// Elements whose content is skipped when sniffing for `<body>`.
const RAW_TEXT: &[&[u8]] = &[b"script", b"style"];

/// Whether the markup contains a `<body>` start tag.
///
/// The HTML tree builder always synthesizes a body, so its absence has to be
/// detected on the source text. Comments, CDATA sections and the contents
/// of `<script>` and `<style>` are not markup and are skipped.
pub fn has_body_tag(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0;

    while let Some(found) = memchr(b'<', &bytes[pos..]) {
        let at = pos + found;
        let rest = &bytes[at + 1..];

        pos = if rest.starts_with(b"!--") {
            match memmem::find(&rest[3..], b"-->") {
                Some(end) => at + 4 + end + 3,
                None => return false,
            }
        } else if rest.starts_with(b"![CDATA[") {
            match memmem::find(&rest[8..], b"]]>") {
                Some(end) => at + 9 + end + 3,
                None => return false,
            }
        } else if is_tag(rest, b"body") {
            return true;
        } else if let Some(name) = RAW_TEXT.iter().find(|n| is_tag(rest, n)) {
            let Some(close) = memchr(b'>', rest) else {
                return false;
            };
            if rest[close - 1] == b'/' {
                // XHTML `<script src="..."/>`
                at + 1 + close + 1
            } else {
                match find_end_tag(bytes, at + 1 + close + 1, name) {
                    Some(end) => end,
                    None => return false,
                }
            }
        } else {
            at + 1
        };
    }
    false
}

/// Whether `rest` (the bytes after a `<`) opens the element `name`.
fn is_tag(rest: &[u8], name: &[u8]) -> bool {
    rest.len() >= name.len()
        && rest[..name.len()].eq_ignore_ascii_case(name)
        && rest
            .get(name.len())
            .is_none_or(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
}

/// Position just past the `</name` that closes a raw text element.
fn find_end_tag(bytes: &[u8], from: usize, name: &[u8]) -> Option<usize> {
    memmem::find_iter(&bytes[from..], b"</")
        .map(|i| from + i + 2)
        .find(|&i| is_tag(&bytes[i..], name))
        .map(|i| i + name.len())
}
