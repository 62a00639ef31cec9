//! HTML escaping helpers.

/// Escape text for HTML content and double-quoted attribute values.
///
/// Replaces `&`, `<`, `>`, `"` and `'`.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a value placed inside a double-quoted attribute.
///
/// Same as [`escape_html`], plus newlines and tabs are encoded so that
/// multi-line values (inline handlers, serialized JSON) survive attribute
/// normalization in the browser.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#9;"),
            _ => {
                let mut buf = [0u8; 4];
                result.push_str(&escape_html(c.encode_utf8(&mut buf)));
            }
        }
    }
    result
}
