//! Clickable images.
//!
//! Wraps every image in a container with an overlay that opens the image in
//! a modal (`openImageModal(id)` in the companion script).

use garden_renderer::{Document, Node, Rewrite, Transform, TransformContext, escape_html};

use crate::random_hex;

/// Length of the random part of image ids.
const ID_SUFFIX_LEN: usize = 8;

/// Replaces images with modal-capable containers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClickableImages;

impl ClickableImages {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Transform for ClickableImages {
    fn name(&self) -> &'static str {
        "clickable-images"
    }

    fn apply(&self, document: &mut Document, ctx: &mut TransformContext) -> usize {
        document.rewrite(|node| {
            if !node.is_image() {
                return Rewrite::Keep;
            }
            match node.destination() {
                Some(src) if !src.is_empty() => {
                    let id = ctx.unique_id(|| format!("img-{}", random_hex(ID_SUFFIX_LEN)));
                    Rewrite::Embed(render_image(&id, src, node))
                }
                _ => Rewrite::Keep,
            }
        })
    }
}

fn render_image(id: &str, src: &str, node: &Node) -> String {
    let title = node
        .title_attr()
        .map(|title| format!(r#" title="{}""#, escape_html(title)))
        .unwrap_or_default();
    format!(
        concat!(
            r#"<div class="clickable-image-container" data-image-id="{id}">"#,
            r#"<img src="{src}" alt="{alt}"{title}>"#,
            r#"<span class="clickable-image-overlay" onclick="openImageModal('{id}')" aria-hidden="true"></span>"#,
            "</div>",
        ),
        id = id,
        title = title,
        src = escape_html(src),
        alt = escape_html(&node.text_content()),
    )
}
