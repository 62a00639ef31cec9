//! YAML front matter at the top of a content file.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Front matter fields.
///
/// Known fields are typed; anything else is kept in [`extra`](Self::extra).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    /// Page title (overrides the first heading).
    #[serde(default)]
    pub title: Option<String>,

    /// Tags, written either as a list or a single string.
    #[serde(default, deserialize_with = "one_or_many")]
    pub tags: Vec<String>,

    /// Explicit publish flag. `false` keeps the page out of the build.
    #[serde(default)]
    pub publish: Option<bool>,

    /// Draft pages are never published.
    #[serde(default)]
    pub draft: bool,

    /// Remaining keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front matter from the YAML between the `---` fences.
    ///
    /// Empty content returns a default instance.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(trimmed)
    }

    /// Whether the page should be part of the built site.
    #[must_use]
    pub fn is_published(&self) -> bool {
        !self.draft && self.publish != Some(false)
    }
}

/// Split a leading YAML block off `markdown`.
///
/// The block opens with a `---` first line followed by a non-blank line, and
/// closes at the next `---` or `...` line. Returns the YAML and the remaining
/// body. Without a closed block the whole input is the body.
pub(crate) fn split_front_matter(markdown: &str) -> (Option<&str>, &str) {
    let text = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, markdown);
    };
    if first.trim_end() != "---" {
        return (None, markdown);
    }
    if lines.clone().next().is_none_or(|line| line.trim().is_empty()) {
        return (None, markdown);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let end = offset + line.len();
        if matches!(line.trim_end(), "---" | "...") {
            return (Some(&text[yaml_start..offset]), &text[end..]);
        }
        offset = end;
    }
    (None, markdown)
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(tag) => vec![tag],
        OneOrMany::Many(tags) => tags,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_front_matter() {
        let (yaml, body) = split_front_matter("---\ntitle: Hi\n---\n\n# Body\n");
        assert_eq!(yaml, Some("title: Hi\n"));
        assert_eq!(body, "\n# Body\n");
    }

    #[test]
    fn test_split_front_matter_dots_and_crlf() {
        let (yaml, body) = split_front_matter("---\r\ntitle: Hi\r\n...\r\nBody");
        assert_eq!(yaml, Some("title: Hi\r\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_front_matter_requires_leading_block() {
        let markdown = "Intro\n\n---\nkey: value\n---\n";
        assert_eq!(split_front_matter(markdown), (None, markdown));
    }

    #[test]
    fn test_split_front_matter_unclosed_or_blank_is_body() {
        for markdown in ["---\ntitle: Hi\n", "---\n\nText\n---\n", ""] {
            assert_eq!(split_front_matter(markdown), (None, markdown));
        }
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(FrontMatter::from_yaml("  \n").unwrap(), FrontMatter::default());
    }

    #[test]
    fn test_known_fields() {
        let fm = FrontMatter::from_yaml("title: Seeds\ntags: [python, notes]\npublish: true")
            .unwrap();
        assert_eq!(fm.title.as_deref(), Some("Seeds"));
        assert_eq!(fm.tags, vec!["python".to_owned(), "notes".to_owned()]);
        assert_eq!(fm.publish, Some(true));
        assert!(fm.is_published());
    }

    #[test]
    fn test_single_tag_string() {
        let fm = FrontMatter::from_yaml("tags: evergreen").unwrap();
        assert_eq!(fm.tags, vec!["evergreen".to_owned()]);
    }

    #[test]
    fn test_null_tags() {
        let fm = FrontMatter::from_yaml("tags:").unwrap();
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn test_publish_false_is_unpublished() {
        let fm = FrontMatter::from_yaml("publish: false").unwrap();
        assert!(!fm.is_published());
    }

    #[test]
    fn test_draft_is_unpublished() {
        let fm = FrontMatter::from_yaml("draft: true\npublish: true").unwrap();
        assert!(!fm.is_published());
    }

    #[test]
    fn test_default_is_published() {
        assert!(FrontMatter::default().is_published());
    }

    #[test]
    fn test_extra_keys_kept() {
        let fm = FrontMatter::from_yaml("title: X\ncreated: 2024-01-01").unwrap();
        assert!(fm.extra.contains_key("created"));
        assert!(!fm.extra.contains_key("title"));
    }

    #[test]
    fn test_malformed_yaml_errors() {
        assert!(FrontMatter::from_yaml("title: [unclosed").is_err());
    }
}
