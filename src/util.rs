//! Text decoding helpers.

use std::borrow::Cow;

use memchr::memmem;

/// Decode document bytes to a string.
///
/// Tries UTF-8 first (no allocation when it holds, BOM handled by
/// encoding_rs). On malformed UTF-8 the encoding declared in the XML
/// prolog is tried, then Windows-1252, which is a superset of ISO-8859-1
/// and the usual culprit in old ebooks.
pub(crate) fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    log::warn!("input is not valid UTF-8, falling back to declared encoding");
    if let Some(label) = declared_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding label from `<?xml ... encoding="..."?>`, if any.
/// Only the first 128 bytes are inspected; the prolog must come first anyway.
fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(128)];
    memmem::find(prefix, b"<?xml")?;
    let at = memmem::find(prefix, b"encoding=")? + b"encoding=".len();

    let quote = *prefix.get(at)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &prefix[at + 1..];
    let end = memchr::memchr(quote, value)?;
    std::str::from_utf8(&value[..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_borrows() {
        assert!(matches!(
            decode_text("caf\u{e9}".as_bytes()),
            Cow::Borrowed("caf\u{e9}")
        ));
    }

    #[test]
    fn test_declared_encoding() {
        let doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><p/>";
        assert_eq!(declared_encoding(doc), Some("ISO-8859-1"));
        assert_eq!(declared_encoding(b"<p>no prolog</p>"), None);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "café" in Latin-1: 0xE9 is not valid UTF-8
        let doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>caf\xe9";
        let decoded = decode_text(doc);
        assert!(decoded.ends_with("caf\u{e9}"));
    }
}
