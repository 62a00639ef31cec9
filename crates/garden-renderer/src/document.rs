//! Content document: a markdown syntax tree with its path and front matter.

use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, html};

use crate::front_matter::{FrontMatter, split_front_matter};

/// A node of the markdown syntax tree.
///
/// Elements own their children; everything that is not a start/end pair
/// (text, inline code, raw HTML, breaks, rules) is a leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A container tag with its children.
    Element {
        /// Opening tag as produced by the parser.
        tag: Tag<'static>,
        /// Child nodes in document order.
        children: Vec<Node>,
    },
    /// A single non-container event.
    Leaf(Event<'static>),
}

/// Outcome of visiting a node during [`Document::rewrite`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rewrite {
    /// Leave the node as is and keep descending into its children.
    Keep,
    /// Replace the node with inline raw HTML.
    Inline(String),
    /// Replace the node with block-level raw HTML.
    Block(String),
    /// Replace an inline node with a block-level fragment. When the node is
    /// the only child of a paragraph, the fragment replaces the paragraph so
    /// it is not nested inside `<p>`; otherwise it is emitted inline.
    Embed(String),
}

impl Node {
    /// Opening tag, if this node is an element.
    #[must_use]
    pub fn tag(&self) -> Option<&Tag<'static>> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Leaf(_) => None,
        }
    }

    /// Child nodes (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element { children, .. } => children,
            Self::Leaf(_) => &[],
        }
    }

    /// Whether this node is an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.tag(), Some(Tag::Image { .. }))
    }

    /// Whether this node is a link.
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self.tag(), Some(Tag::Link { .. }))
    }

    /// Destination URL of a link or image node.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        match self.tag()? {
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => Some(&**dest_url),
            _ => None,
        }
    }

    /// Non-empty title attribute of a link or image node.
    #[must_use]
    pub fn title_attr(&self) -> Option<&str> {
        match self.tag()? {
            Tag::Link { title, .. } | Tag::Image { title, .. } if !title.is_empty() => {
                Some(&**title)
            }
            _ => None,
        }
    }

    /// Plain-text content of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Leaf(Event::Text(text) | Event::Code(text)) => out.push_str(text),
            Self::Leaf(Event::SoftBreak | Event::HardBreak) => out.push(' '),
            Self::Leaf(_) => {}
            Self::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Parser options shared by pages and nested markdown (GFM extensions).
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

/// Convert a markdown fragment straight to HTML.
///
/// Used for nested content such as notebook markdown cells. The output only
/// depends on the input text.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, parser_options()));
    out
}

/// A parsed content file.
#[derive(Clone, Debug)]
pub struct Document {
    path: PathBuf,
    front_matter: FrontMatter,
    nodes: Vec<Node>,
}

impl Document {
    /// Parse markdown into a document.
    ///
    /// A leading YAML front matter block is split off and parsed into
    /// [`FrontMatter`]; the rest is parsed as ordinary markdown, so later `---`
    /// lines stay thematic breaks. Malformed front matter is logged and ignored.
    pub fn parse(path: impl Into<PathBuf>, markdown: &str) -> Self {
        let path = path.into();
        let (yaml, body) = split_front_matter(markdown);

        let front_matter = yaml.map_or_else(FrontMatter::default, |yaml| {
            FrontMatter::from_yaml(yaml).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse front matter");
                FrontMatter::default()
            })
        });
        let nodes = build_tree(Parser::new_ext(body, parser_options()));

        Self {
            path,
            front_matter,
            nodes,
        }
    }

    /// Source path of this document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the source file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Parsed front matter.
    #[must_use]
    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// Top-level nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Text of the first level-1 heading.
    #[must_use]
    pub fn first_heading(&self) -> Option<String> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element {
                tag: Tag::Heading {
                    level: HeadingLevel::H1,
                    ..
                },
                ..
            } => Some(node.text_content().trim().to_owned()),
            _ => None,
        })
    }

    /// Visit every node depth-first and replace the ones `f` rewrites.
    ///
    /// Each rewritten node is swapped for a single raw HTML leaf and its
    /// children are not visited. An [`Rewrite::Embed`] that is the only child
    /// of a paragraph replaces the paragraph instead. Returns the number of
    /// replaced nodes.
    pub fn rewrite<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&Node) -> Rewrite,
    {
        rewrite_nodes(&mut self.nodes, &mut f)
    }

    /// Flatten the tree back into a pulldown-cmark event stream.
    #[must_use]
    pub fn into_events(self) -> Vec<Event<'static>> {
        let mut events = Vec::new();
        flatten(self.nodes, &mut events);
        events
    }

    /// Render the current tree as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        html::push_html(&mut out, self.clone().into_events().into_iter());
        out
    }
}

fn rewrite_nodes<F>(nodes: &mut [Node], f: &mut F) -> usize
where
    F: FnMut(&Node) -> Rewrite,
{
    let mut replaced = 0;
    for node in nodes.iter_mut() {
        let rewrite = f(node);
        replaced += apply_rewrite(node, rewrite, f);
    }
    replaced
}

fn apply_rewrite<F>(node: &mut Node, rewrite: Rewrite, f: &mut F) -> usize
where
    F: FnMut(&Node) -> Rewrite,
{
    let html = match rewrite {
        Rewrite::Keep => return rewrite_children(node, f),
        Rewrite::Block(html) => {
            *node = Node::Leaf(Event::Html(html.into()));
            return 1;
        }
        Rewrite::Inline(html) | Rewrite::Embed(html) => html,
    };
    *node = Node::Leaf(Event::InlineHtml(html.into()));
    1
}

fn rewrite_children<F>(node: &mut Node, f: &mut F) -> usize
where
    F: FnMut(&Node) -> Rewrite,
{
    let embed = {
        let Node::Element { tag, children } = node else {
            return 0;
        };
        if !matches!(tag, Tag::Paragraph) || children.len() != 1 {
            return rewrite_nodes(children, f);
        }
        // Sole child of a paragraph: an embed takes the paragraph's place.
        match f(&children[0]) {
            Rewrite::Embed(html) => html,
            rewrite => return apply_rewrite(&mut children[0], rewrite, f),
        }
    };
    *node = Node::Leaf(Event::Html(embed.into()));
    1
}

/// Build a node tree from a balanced event stream.
fn build_tree<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Node> {
    let mut root = Vec::new();
    let mut stack: Vec<(Tag<'static>, Vec<Node>)> = Vec::new();

    for event in events {
        let node = match event {
            Event::Start(tag) => {
                stack.push((tag.into_static(), Vec::new()));
                continue;
            }
            Event::End(_) => match stack.pop() {
                Some((tag, children)) => Node::Element { tag, children },
                None => continue,
            },
            other => Node::Leaf(other.into_static()),
        };
        match stack.last_mut() {
            Some((_, siblings)) => siblings.push(node),
            None => root.push(node),
        }
    }

    // pulldown-cmark always closes its tags; this only guards hand-built streams
    while let Some((tag, children)) = stack.pop() {
        let node = Node::Element { tag, children };
        match stack.last_mut() {
            Some((_, siblings)) => siblings.push(node),
            None => root.push(node),
        }
    }

    root
}

fn flatten(nodes: Vec<Node>, out: &mut Vec<Event<'static>>) {
    for node in nodes {
        match node {
            Node::Leaf(event) => out.push(event),
            Node::Element { tag, children } => {
                let end = tag.to_end();
                out.push(Event::Start(tag));
                flatten(children, out);
                out.push(Event::End(end));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(nodes: &[Node]) -> Vec<usize> {
        let mut counts = vec![nodes.len()];
        for node in nodes {
            counts.extend(shape(node.children()));
        }
        counts
    }

    #[test]
    fn test_round_trip_matches_plain_render() {
        let markdown = "# Title\n\nSome *text* with [a link](page.md).\n\n- one\n- two\n";
        let document = Document::parse("page.md", markdown);
        assert_eq!(document.to_html(), markdown_to_html(markdown));
    }

    #[test]
    fn test_front_matter_extracted() {
        let markdown = "---\ntitle: Garden\ntags: [a, b]\n---\n\n# Heading\n";
        let document = Document::parse("page.md", markdown);

        assert_eq!(document.front_matter().title.as_deref(), Some("Garden"));
        assert_eq!(document.front_matter().tags, vec!["a", "b"]);
        assert!(!document.to_html().contains("title: Garden"));
    }

    #[test]
    fn test_malformed_front_matter_is_ignored() {
        let markdown = "---\ntitle: [unclosed\n---\n\nBody\n";
        let document = Document::parse("page.md", markdown);

        assert_eq!(document.front_matter(), &FrontMatter::default());
        assert!(document.to_html().contains("Body"));
    }

    #[test]
    fn test_later_yaml_like_block_kept_as_content() {
        let markdown = "Intro\n\n---\nkey: value\n---\n\nOutro\n";
        let document = Document::parse("page.md", markdown);

        assert_eq!(document.front_matter(), &FrontMatter::default());
        assert_eq!(document.to_html(), markdown_to_html(markdown));
        assert!(document.to_html().contains("<hr />"));
        assert!(document.to_html().contains("key: value"));
    }

    #[test]
    fn test_body_after_front_matter_keeps_breaks() {
        let markdown = "---\ntitle: T\n---\nA\n\n---\n\nB\n";
        let document = Document::parse("page.md", markdown);

        assert_eq!(document.front_matter().title.as_deref(), Some("T"));
        assert_eq!(document.to_html(), "<p>A</p>\n<hr />\n<p>B</p>\n");
    }

    #[test]
    fn test_first_heading() {
        let document = Document::parse("p.md", "Intro\n\n# The *Title*\n\n# Second\n");
        assert_eq!(document.first_heading().as_deref(), Some("The Title"));
    }

    #[test]
    fn test_dir() {
        let document = Document::parse("notes/deep/page.md", "");
        assert_eq!(document.dir(), Path::new("notes/deep"));
    }

    #[test]
    fn test_link_accessors() {
        let document = Document::parse("p.md", "[text](target.md \"Tip\")");
        let link = &document.nodes()[0].children()[0];

        assert!(link.is_link());
        assert!(!link.is_image());
        assert_eq!(link.destination(), Some("target.md"));
        assert_eq!(link.title_attr(), Some("Tip"));
        assert_eq!(link.text_content(), "text");
    }

    #[test]
    fn test_rewrite_replaces_matching_nodes() {
        let mut document = Document::parse("p.md", "![a](a.png) and ![b](b.png)");
        let replaced = document.rewrite(|node| {
            if node.is_image() {
                Rewrite::Inline(format!("[{}]", node.destination().unwrap_or_default()))
            } else {
                Rewrite::Keep
            }
        });

        assert_eq!(replaced, 2);
        assert_eq!(document.to_html(), "<p>[a.png] and [b.png]</p>\n");
    }

    #[test]
    fn test_rewrite_preserves_child_counts() {
        let markdown = "> quote with ![img](i.png)\n\n1. [link](x.md)\n2. plain\n";
        let mut document = Document::parse("p.md", markdown);
        let before = shape(document.nodes());

        document.rewrite(|node| {
            if node.is_image() || node.is_link() {
                Rewrite::Inline("<span></span>".to_owned())
            } else {
                Rewrite::Keep
            }
        });

        // Replaced elements lose their own children, so compare the containers only
        let after = shape(document.nodes());
        assert_eq!(before[0], after[0]);
        assert_eq!(document.nodes().len(), 2);
        assert_eq!(document.nodes()[0].children()[0].children().len(), 2);
    }

    #[test]
    fn test_rewrite_keep_leaves_tree_identical() {
        let mut document = Document::parse("p.md", "Text ![img](i.png) [l](x)");
        let before = document.nodes().to_vec();

        let replaced = document.rewrite(|_| Rewrite::Keep);

        assert_eq!(replaced, 0);
        assert_eq!(document.nodes(), before.as_slice());
    }

    #[test]
    fn test_rewrite_does_not_descend_into_replaced_node() {
        let mut document = Document::parse("p.md", "[![inner](i.png)](outer.md)");
        let mut visited_images = 0;

        document.rewrite(|node| {
            if node.is_image() {
                visited_images += 1;
            }
            if node.is_link() {
                Rewrite::Inline("<a>x</a>".to_owned())
            } else {
                Rewrite::Keep
            }
        });

        assert_eq!(visited_images, 0);
    }

    fn embed_links(document: &mut Document) -> usize {
        document.rewrite(|node| {
            if node.is_link() {
                Rewrite::Embed(r#"<div class="embed"></div>"#.to_owned())
            } else {
                Rewrite::Keep
            }
        })
    }

    #[test]
    fn test_embed_alone_replaces_paragraph() {
        let mut document = Document::parse("p.md", "Before\n\n[nb](a.ipynb)\n\nAfter\n");
        let replaced = embed_links(&mut document);

        assert_eq!(replaced, 1);
        assert_eq!(document.nodes().len(), 3);
        assert_eq!(
            document.to_html(),
            "<p>Before</p>\n<div class=\"embed\"></div>\n<p>After</p>\n"
        );
    }

    #[test]
    fn test_embed_with_siblings_stays_inline() {
        let mut document = Document::parse("p.md", "See [nb](a.ipynb) here\n");
        embed_links(&mut document);

        assert_eq!(document.to_html(), "<p>See <div class=\"embed\"></div> here</p>\n");
    }

    #[test]
    fn test_embed_lifted_inside_container() {
        let mut document = Document::parse("p.md", "> [nb](a.ipynb)\n");
        embed_links(&mut document);

        let html = document.to_html();
        assert!(html.starts_with("<blockquote>"));
        assert!(html.contains(r#"<div class="embed"></div>"#));
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn test_inline_alone_keeps_paragraph() {
        let mut document = Document::parse("p.md", "[nb](a.ipynb)\n");
        document.rewrite(|node| {
            if node.is_link() {
                Rewrite::Inline("<b>x</b>".to_owned())
            } else {
                Rewrite::Keep
            }
        });

        assert_eq!(document.to_html(), "<p><b>x</b></p>\n");
    }

    #[test]
    fn test_block_rewrite_emits_raw_html() {
        let mut document = Document::parse("p.md", "```rust\nfn main() {}\n```\n");
        document.rewrite(|node| match node.tag() {
            Some(Tag::CodeBlock(_)) => Rewrite::Block("<div>code</div>".to_owned()),
            _ => Rewrite::Keep,
        });

        assert_eq!(document.to_html(), "<div>code</div>");
    }

    #[test]
    fn test_markdown_to_html_is_deterministic() {
        let cell = "## Results\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        assert_eq!(markdown_to_html(cell), markdown_to_html(cell));
        assert!(markdown_to_html(cell).contains("<table>"));
    }

    #[test]
    fn test_build_tree_closes_unbalanced_stream() {
        let events = vec![
            Event::Start(Tag::Paragraph),
            Event::Text("dangling".into()),
        ];
        let nodes = build_tree(events.into_iter());

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text_content(), "dangling");
    }
}
