//! Text encoding helpers and output naming.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Suffix inserted before the extension of a rewritten book's file name.
pub const OUTPUT_SUFFIX: &str = "-speedread";

/// Text decoded from an entry, with what is needed to encode it back.
#[derive(Debug)]
pub struct DecodedText<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
    /// The source started with a byte order mark.
    pub bom: bool,
}

impl DecodedText<'_> {
    /// Whether text in this encoding can be written back as it was read.
    ///
    /// UTF-16 sources decode fine but would have to change encoding on
    /// output, which also invalidates their XML declaration.
    pub fn is_round_trippable(&self) -> bool {
        self.encoding.output_encoding() == self.encoding
    }
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. Honors a byte order mark if present
/// 2. Tries UTF-8
/// 3. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`
///    or `<meta charset>`)
/// 4. Falls back to Windows-1252 (common in old ebooks)
///
/// Pure ASCII input takes the hint encoding when one is declared, so text
/// added later is encoded the way the document says it is.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> DecodedText<'a> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            text,
            encoding,
            bom: true,
        };
    }

    let hint = hint_encoding
        .and_then(|name| Encoding::for_label(name.as_bytes()))
        .filter(|e| e.is_ascii_compatible());

    let (text, malformed) = encoding_rs::UTF_8.decode_without_bom_handling(bytes);
    if !malformed {
        let encoding = match hint {
            Some(e) if bytes.is_ascii() => e,
            _ => encoding_rs::UTF_8,
        };
        return DecodedText {
            text,
            encoding,
            bom: false,
        };
    }

    // Fallback: Windows-1252 (superset of ISO-8859-1)
    let encoding = hint.unwrap_or(encoding_rs::WINDOWS_1252);
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    DecodedText {
        text,
        encoding,
        bom: false,
    }
}

/// Encode `text` back into the encoding it was decoded from.
///
/// Characters the encoding cannot represent become numeric character
/// references.
pub fn encode_text(text: &str, encoding: &'static Encoding, bom: bool) -> Vec<u8> {
    let (bytes, _, _) = encoding.encode(text);
    let mut out = Vec::with_capacity(bytes.len() + 3);
    if bom && encoding == encoding_rs::UTF_8 {
        out.extend_from_slice(b"\xEF\xBB\xBF");
    }
    out.extend_from_slice(&bytes);
    out
}

/// Find the charset a document declares for itself: the XML declaration
/// first, then a `<meta charset>` or `http-equiv` content type.
pub fn sniff_charset(bytes: &[u8]) -> Option<&str> {
    extract_xml_encoding(bytes).or_else(|| extract_meta_charset(bytes))
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` to extract the encoding name.
/// Only the first 100 bytes are checked.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];
    let decl_end = after_xml.windows(2).position(|w| w == b"?>")?;
    let decl = &after_xml[..decl_end];

    let enc_pos = decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    quoted_value(&decl[enc_pos + 9..])
}

/// Extract `charset=...` from the first kilobyte, as written by
/// `<meta charset="...">` or `<meta http-equiv="Content-Type" content="text/html; charset=...">`.
fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[pos + 8..];

    match after.first() {
        Some(b'"' | b'\'') => quoted_value(after),
        Some(_) => {
            let end = after
                .iter()
                .position(|b| !(b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':')))
                .unwrap_or(after.len());
            std::str::from_utf8(&after[..end]).ok().filter(|s| !s.is_empty())
        }
        None => None,
    }
}

fn quoted_value(bytes: &[u8]) -> Option<&str> {
    let quote = *bytes.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = bytes[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&bytes[1..end]).ok()
}

/// Name for the rewritten copy of `name`.
///
/// ```
/// use speedread::output_file_name;
///
/// assert_eq!(output_file_name("book.epub"), "book-speedread.epub");
/// assert_eq!(output_file_name("Book.EPUB"), "Book-speedread.EPUB");
/// assert_eq!(output_file_name("book"), "book-speedread.epub");
/// ```
pub fn output_file_name(name: &str) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 && !name[dot..].contains(['/', '\\']) => {
            format!("{}{OUTPUT_SUFFIX}{}", &name[..dot], &name[dot..])
        }
        _ => format!("{name}{OUTPUT_SUFFIX}.epub"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        let decoded = decode_text("Привет".as_bytes(), None);
        assert_eq!(decoded.text, "Привет");
        assert_eq!(decoded.encoding, encoding_rs::UTF_8);
        assert!(!decoded.bom);
    }

    #[test]
    fn test_decode_utf8_bom_round_trip() {
        let bytes = b"\xEF\xBB\xBF<p>ok</p>";
        let decoded = decode_text(bytes, None);
        assert_eq!(decoded.text, "<p>ok</p>");
        assert!(decoded.bom);
        assert_eq!(encode_text(&decoded.text, decoded.encoding, decoded.bom), bytes);
    }

    #[test]
    fn test_decode_with_hint() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("Привет");
        let decoded = decode_text(&bytes, Some("windows-1251"));
        assert_eq!(decoded.text, "Привет");
        assert_eq!(decoded.encoding, encoding_rs::WINDOWS_1251);
        assert_eq!(
            encode_text(&decoded.text, decoded.encoding, false),
            bytes.to_vec()
        );
    }

    #[test]
    fn test_decode_fallback_windows_1252() {
        let decoded = decode_text(b"caf\xE9", None);
        assert_eq!(decoded.text, "café");
        assert_eq!(decoded.encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_ascii_takes_declared_encoding() {
        let decoded = decode_text(b"<p>plain</p>", Some("koi8-r"));
        assert_eq!(decoded.encoding, encoding_rs::KOI8_R);
        assert!(decoded.is_round_trippable());
    }

    #[test]
    fn test_utf16_is_not_round_trippable() {
        let decoded = decode_text(b"\xFF\xFE<\x00p\x00>\x00", None);
        assert_eq!(decoded.text, "<p>");
        assert!(!decoded.is_round_trippable());
    }

    #[test]
    fn test_encode_unmappable_as_reference() {
        let out = encode_text("a\u{1F600}", encoding_rs::WINDOWS_1251, false);
        assert_eq!(out, b"a&#128512;");
    }

    #[test]
    fn test_extract_xml_encoding() {
        let xml = br#"<?xml version="1.0" encoding='windows-1251'?><html/>"#;
        assert_eq!(extract_xml_encoding(xml), Some("windows-1251"));
        assert_eq!(extract_xml_encoding(b"<?xml version=\"1.0\"?>"), None);
        assert_eq!(extract_xml_encoding(b"<html></html>"), None);
    }

    #[test]
    fn test_sniff_meta_charset() {
        let html = br#"<html><head><meta charset="koi8-r"></head>"#;
        assert_eq!(sniff_charset(html), Some("koi8-r"));

        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=windows-1251"/>"#;
        assert_eq!(sniff_charset(html), Some("windows-1251"));

        assert_eq!(sniff_charset(b"<p>charset= </p>"), None);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("book.epub"), "book-speedread.epub");
        assert_eq!(output_file_name("My.Book.epub"), "My.Book-speedread.epub");
        assert_eq!(output_file_name("book.kepub"), "book-speedread.kepub");
        assert_eq!(output_file_name("book"), "book-speedread.epub");
        assert_eq!(output_file_name("dir.d/book"), "dir.d/book-speedread.epub");
        assert_eq!(output_file_name("/tmp/x.epub"), "/tmp/x-speedread.epub");
    }
}
