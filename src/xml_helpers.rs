//! Shared XML helpers for the workbook readers.
//!
//! All functions handle namespace-prefixed attributes and UTF-8 conversion safely.

use quick_xml::events::{BytesStart, BytesText};

/// Extract a string attribute value by key.
///
/// Returns `None` if the attribute is missing or not valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return std::str::from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}

/// Extract a string attribute by local name (ignoring namespace prefix).
///
/// `r:id` on `<sheet>` is the usual customer.
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return std::str::from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}

/// Raw attribute bytes by key, for hot paths that parse the value directly.
pub fn attr_bytes(e: &BytesStart, key: &[u8]) -> Option<Vec<u8>> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attr.value.into_owned())
}

/// Unescape a text node, falling back to the raw bytes when unescaping fails.
pub fn text_content(text: &BytesText) -> String {
    let raw = text.as_ref();
    if !raw.contains(&b'&') {
        return String::from_utf8_lossy(raw).into_owned();
    }
    match text.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn make_start(xml: &str) -> BytesStart<'_> {
        // Strip < and > / /> to get just the tag content
        let content = xml
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim_end();
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn test_attr_string() {
        let e = make_start(r#"<c r="B2" t="s" />"#);
        assert_eq!(attr_string(&e, b"r"), Some("B2".to_string()));
        assert_eq!(attr_string(&e, b"t"), Some("s".to_string()));
        assert_eq!(attr_string(&e, b"missing"), None);
    }

    #[test]
    fn test_attr_string_local_ignores_prefix() {
        let e = make_start(r#"<sheet name="Data" sheetId="1" r:id="rId3" />"#);
        assert_eq!(attr_string_local(&e, b"id"), Some("rId3".to_string()));
        assert_eq!(attr_string(&e, b"id"), None);
    }

    #[test]
    fn test_attr_bytes() {
        let e = make_start(r#"<row r="12" />"#);
        assert_eq!(attr_bytes(&e, b"r"), Some(b"12".to_vec()));
        assert_eq!(attr_bytes(&e, b"ht"), None);
    }

    #[test]
    fn test_text_content_unescapes_entities() {
        let text = BytesText::from_escaped("Fish &amp; Chips");
        assert_eq!(text_content(&text), "Fish & Chips");
        let plain = BytesText::from_escaped("plain");
        assert_eq!(text_content(&plain), "plain");
    }
}
