//! Fenced code block access.
//!
//! Plugins that react to code blocks match on the fence language and read
//! extra `key=value` attributes from the rest of the info string:
//!
//! ````markdown
//! ```python-run title="Sum of squares"
//! print(sum(i * i for i in range(10)))
//! ```
//! ````

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, Tag};

use crate::document::Node;

/// A fenced code block extracted from a [`Node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FencedCode {
    /// First word of the info string (may be empty).
    pub language: String,
    /// `key=value` attributes following the language.
    pub attrs: HashMap<String, String>,
    /// Raw block content.
    pub source: String,
}

impl FencedCode {
    /// Extract a fenced code block from `node`.
    ///
    /// Returns `None` for any other node, including indented code blocks.
    #[must_use]
    pub fn from_node(node: &Node) -> Option<Self> {
        let Some(Tag::CodeBlock(CodeBlockKind::Fenced(info))) = node.tag() else {
            return None;
        };
        let (language, attrs) = parse_fence_info(info);
        let source = node
            .children()
            .iter()
            .filter_map(|child| match child {
                Node::Leaf(Event::Text(text)) => Some(&**text),
                _ => None,
            })
            .collect();
        Some(Self {
            language,
            attrs,
            source,
        })
    }
}

/// Parse a fence info string into language and attributes.
///
/// Attribute values may be wrapped in single or double quotes, in which case
/// they can contain whitespace. Words without `=` are ignored.
#[must_use]
pub fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let info = info.trim();
    let (language, mut rest) = match info.find(char::is_whitespace) {
        Some(pos) => (&info[..pos], &info[pos..]),
        None => (info, ""),
    };

    let mut attrs = HashMap::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let Some(eq) = rest[..word_end].find('=') else {
            rest = &rest[word_end..];
            continue;
        };
        let key = &rest[..eq];
        let after = &rest[eq + 1..];

        let (value, consumed) = match after.chars().next() {
            Some(quote @ ('"' | '\'')) => match after[1..].find(quote) {
                Some(close) => (&after[1..=close], close + 2),
                // Unterminated quote takes the rest of the line
                None => (&after[1..], after.len()),
            },
            _ => {
                let end = after.find(char::is_whitespace).unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        if !key.is_empty() {
            attrs.insert(key.to_owned(), value.to_owned());
        }
        rest = &after[consumed..];
    }

    (language.to_owned(), attrs)
}
