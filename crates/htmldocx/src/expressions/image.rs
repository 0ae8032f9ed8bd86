//! Inline pictures.

use htmldocx_core::{Drawing, Inline, Run, RunContent};
use tracing::{debug, warn};

use super::{text_output, Interpret, Output};
use crate::context::{Counter, ParsingContext};
use crate::node::NodeRef;
use crate::style::{pixels_to_emu, ElementStyle, Length};
use crate::utilities::clean_attribute;

/// Edge length, in pixels, of an image whose size is unknown
const DEFAULT_PIXELS: f32 = 96.0;

pub(crate) struct ImageExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> ImageExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }

    fn alternate_text(&self) -> Option<String> {
        clean_attribute(self.node.attr("alt"))
    }

    fn fallback(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        match self.alternate_text() {
            Some(alt) => vec![text_output(ctx, &alt)],
            None => Vec::new(),
        }
    }

    /// Declared size in pixels; CSS wins over attributes, percentages are ignored
    fn declared(&self, css: Option<Length>, attribute: &str, dpi: u32) -> Option<f32> {
        css.or_else(|| self.node.attr(attribute).and_then(Length::parse))
            .filter(|length| !length.is_percent())
            .map(|length| length.to_pixels(dpi))
            .filter(|pixels| *pixels > 0.0)
    }

    /// Display size in pixels, keeping the intrinsic aspect ratio when only
    /// one side is declared
    fn size(&self, dpi: u32, intrinsic: Option<(u32, u32)>) -> (f32, f32) {
        let style = ElementStyle::from_declarations(&self.node.node.style_declarations());
        let width = self.declared(style.width, "width", dpi);
        let height = self.declared(style.height, "height", dpi);
        let intrinsic = intrinsic
            .filter(|(w, h)| *w > 0 && *h > 0)
            .map(|(w, h)| (w as f32, h as f32));

        match (width, height, intrinsic) {
            (Some(w), Some(h), _) => (w, h),
            (Some(w), None, Some((iw, ih))) => (w, w * ih / iw),
            (None, Some(h), Some((iw, ih))) => (h * iw / ih, h),
            (None, None, Some(size)) => size,
            (Some(w), None, None) => (w, w),
            (None, Some(h), None) => (h, h),
            (None, None, None) => (DEFAULT_PIXELS, DEFAULT_PIXELS),
        }
    }
}

impl Interpret for ImageExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let Some(src) = self.node.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
            debug!("image without source");
            return self.fallback(ctx);
        };
        let options = ctx.options();
        let session = ctx.session();
        let locator = match &options.base_uri {
            Some(base) => base.resolve(src),
            None => src.to_string(),
        };

        let Some(resource) = session.loader.fetch(&locator) else {
            debug!(locator, "image unavailable, using alternate text");
            return self.fallback(ctx);
        };
        let Some(relationship_id) = session.document.add_image(&resource) else {
            warn!(locator, "target document refused the image");
            return self.fallback(ctx);
        };

        let (width, height) = self.size(options.image_dpi, resource.dimensions);
        let id = ctx.next_id(Counter::Drawing);
        let drawing = Drawing {
            id,
            name: format!("Picture {}", id),
            description: self
                .alternate_text()
                .or_else(|| clean_attribute(self.node.attr("title"))),
            relationship_id,
            width_emu: pixels_to_emu(width, options.image_dpi),
            height_emu: pixels_to_emu(height, options.image_dpi),
        };
        let run = Run::new(ctx.run_properties(), vec![RunContent::Drawing(drawing)]);
        vec![Output::Inline(Inline::Run(run))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDocument, Relationship};
    use crate::node::Node;
    use crate::{ConvertOptions, HtmlConverter};
    use htmldocx_core::Block;

    const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn drawing(blocks: &[Block]) -> Drawing {
        let run = blocks[0].as_paragraph().unwrap().runs().next().unwrap();
        match &run.content[0] {
            RunContent::Drawing(drawing) => drawing.clone(),
            other => panic!("expected a drawing, got {:?}", other),
        }
    }

    #[test]
    fn test_data_uri_image_embedded() {
        let doc = MemoryDocument::new();
        let img = Node::element_with_attrs("img", vec![("src", PIXEL_PNG), ("alt", "dot")]);
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&img);
        let drawing = drawing(&blocks);
        assert_eq!(drawing.id, 1);
        assert_eq!(drawing.name, "Picture 1");
        assert_eq!(drawing.description.as_deref(), Some("dot"));
        // 1x1 pixel at 96 dpi
        assert_eq!(drawing.width_emu, 9525);
        assert!(matches!(
            doc.relationship(&drawing.relationship_id),
            Some(Relationship::Image(_))
        ));
    }

    #[test]
    fn test_declared_width_keeps_aspect_ratio() {
        let doc = MemoryDocument::new();
        let img = Node::element_with_attrs("img", vec![("src", PIXEL_PNG), ("width", "96")]);
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&img);
        let drawing = drawing(&blocks);
        assert_eq!(drawing.width_emu, 914_400);
        assert_eq!(drawing.height_emu, 914_400);
    }

    #[test]
    fn test_css_size_wins() {
        let doc = MemoryDocument::new();
        let img = Node::element_with_attrs(
            "img",
            vec![("src", PIXEL_PNG), ("width", "10"), ("style", "width: 1in; height: 0.5in")],
        );
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&img);
        let drawing = drawing(&blocks);
        assert_eq!(drawing.width_emu, 914_400);
        assert_eq!(drawing.height_emu, 457_200);
    }

    #[test]
    fn test_missing_image_uses_alt_text() {
        let doc = MemoryDocument::new();
        let img = Node::element_with_attrs(
            "img",
            vec![("src", "/definitely/not/here.png"), ("alt", "Logo")],
        );
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&img);
        assert_eq!(blocks[0].as_paragraph().unwrap().text(), "Logo");
        assert_eq!(doc.relationship_count(), 0);
    }

    #[test]
    fn test_missing_image_without_alt_is_omitted() {
        let doc = MemoryDocument::new();
        let img = Node::element_with_attrs("img", vec![("src", "/definitely/not/here.png")]);
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&img);
        assert!(blocks.is_empty());
    }
}
