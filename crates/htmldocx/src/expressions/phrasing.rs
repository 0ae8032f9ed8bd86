//! Inline formatting elements.

use htmldocx_core::{
    Inline, Paragraph, ParagraphProperties, Run, RunContent, RunProperties, Underline,
    VerticalPosition,
};
use tracing::debug;

use super::{compose, interpret_children, text_output, Interpret, Output};
use crate::context::{Counter, ParsingContext};
use crate::document::{NoteKind, StyleKind};
use crate::node::NodeRef;
use crate::options::{ConversionTarget, NotePosition};
use crate::style::{html_font_size, parse_color};
use crate::utilities::clean_attribute;

const MONOSPACE_FONT: &str = "Courier New";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhrasingKind {
    Generic,
    Bold,
    Italic,
    Underline,
    Strike,
    Subscript,
    Superscript,
    Small,
    Big,
    Mark,
    Code,
    Font,
    Quote,
    Abbreviation,
}

impl PhrasingKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "b" | "strong" => PhrasingKind::Bold,
            "i" | "em" | "cite" | "dfn" | "var" => PhrasingKind::Italic,
            "u" | "ins" => PhrasingKind::Underline,
            "s" | "strike" | "del" => PhrasingKind::Strike,
            "sub" => PhrasingKind::Subscript,
            "sup" => PhrasingKind::Superscript,
            "small" => PhrasingKind::Small,
            "big" => PhrasingKind::Big,
            "mark" => PhrasingKind::Mark,
            "code" | "kbd" | "samp" | "tt" => PhrasingKind::Code,
            "font" => PhrasingKind::Font,
            "q" => PhrasingKind::Quote,
            "abbr" | "acronym" => PhrasingKind::Abbreviation,
            _ => PhrasingKind::Generic,
        }
    }
}

pub(crate) struct PhrasingExpression<'a> {
    node: NodeRef<'a>,
    kind: PhrasingKind,
}

impl<'a> PhrasingExpression<'a> {
    pub fn new(node: NodeRef<'a>, kind: PhrasingKind) -> Self {
        Self { node, kind }
    }

    fn defaults(&self) -> RunProperties {
        let mut run = RunProperties::default();
        match self.kind {
            PhrasingKind::Bold => run.bold = Some(true),
            PhrasingKind::Italic => run.italic = Some(true),
            PhrasingKind::Underline => run.underline = Some(Underline::Single),
            PhrasingKind::Strike => run.strike = Some(true),
            PhrasingKind::Subscript => run.vertical_position = Some(VerticalPosition::Subscript),
            PhrasingKind::Superscript => {
                run.vertical_position = Some(VerticalPosition::Superscript)
            }
            PhrasingKind::Small => run.size = Some(20),
            PhrasingKind::Big => run.size = Some(28),
            PhrasingKind::Mark => run.highlight = Some("yellow".to_string()),
            PhrasingKind::Code => run.font = Some(MONOSPACE_FONT.to_string()),
            PhrasingKind::Font => {
                run.color = self.node.attr("color").and_then(parse_color);
                run.font = self.node.attr("face").and_then(first_face);
                run.size = self
                    .node
                    .attr("size")
                    .and_then(html_font_size)
                    .map(|points| (points * 2.0).round() as u32);
            }
            PhrasingKind::Generic | PhrasingKind::Quote | PhrasingKind::Abbreviation => {}
        }
        run
    }

    /// Footnote or endnote carrying an abbreviation's `title`
    fn note_reference(&self, ctx: &ParsingContext<'_>) -> Option<Output> {
        let title = clean_attribute(self.node.attr("title"))?;
        let options = ctx.options();
        if options.target != ConversionTarget::Body {
            debug!(target = ?options.target, "notes are not supported outside the body");
            return None;
        }

        let session = ctx.session();
        let (kind, text_style, reference_style) = match options.note_position {
            NotePosition::Footnote => (NoteKind::Footnote, "FootnoteText", "FootnoteReference"),
            NotePosition::Endnote => (NoteKind::Endnote, "EndnoteText", "EndnoteReference"),
        };
        let id = ctx.next_id(Counter::Note(kind));

        let body = Paragraph::with_content(
            ParagraphProperties {
                style: Some(session.builtin_style(text_style, StyleKind::Paragraph)),
                ..Default::default()
            },
            vec![Inline::Run(Run::text(&title))],
        );
        session.document.add_note(kind, id, vec![body]);

        let content = match kind {
            NoteKind::Footnote => RunContent::FootnoteReference(id),
            NoteKind::Endnote => RunContent::EndnoteReference(id),
        };
        let properties = RunProperties {
            style: Some(session.builtin_style(reference_style, StyleKind::Character)),
            ..Default::default()
        };
        Some(Output::Inline(Inline::Run(Run::new(properties, vec![content]))))
    }
}

fn first_face(value: &str) -> Option<String> {
    value
        .split(',')
        .map(|face| face.trim().trim_matches(['"', '\'']).trim())
        .find(|face| !face.is_empty())
        .map(str::to_string)
}

impl Interpret for PhrasingExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let composed = compose(
            &self.node,
            ctx,
            StyleKind::Character,
            self.defaults(),
            ParagraphProperties::default(),
        );
        let text = composed.text_flags(ctx.text());
        // inline elements never shape the paragraph around them
        let frame = ctx.frame(composed.run, ParagraphProperties::default());
        let inner = ctx.with_frame(&frame).with_text(text);

        let mut outputs = Vec::new();
        if self.kind == PhrasingKind::Quote {
            outputs.push(text_output(&inner, "\u{201C}"));
        }
        outputs.extend(interpret_children(&self.node, &inner));
        if self.kind == PhrasingKind::Quote {
            outputs.push(text_output(&inner, "\u{201D}"));
        }
        if self.kind == PhrasingKind::Abbreviation {
            outputs.extend(self.note_reference(ctx));
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::{ConvertOptions, HtmlConverter, Node};
    use htmldocx_core::Block;

    fn first_runs(blocks: &[Block]) -> Vec<Run> {
        blocks[0].as_paragraph().unwrap().runs().cloned().collect()
    }

    #[test]
    fn test_nested_formatting_cascades() {
        let doc = MemoryDocument::new();
        let p = Node::element("p").with_child(
            Node::element("b").with_child(
                Node::element("i")
                    .with_child(Node::text("both"))
                    .with_child(Node::element("sup").with_child(Node::text("2"))),
            ),
        );
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&p);
        let runs = first_runs(&blocks);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].properties.bold, Some(true));
        assert_eq!(runs[0].properties.italic, Some(true));
        assert_eq!(
            runs[1].properties.vertical_position,
            Some(VerticalPosition::Superscript)
        );
        assert_eq!(runs[1].properties.bold, Some(true));
    }

    #[test]
    fn test_inline_style_overrides_tag_default() {
        let doc = MemoryDocument::new();
        let b = Node::element_with_attrs("b", vec![("style", "font-weight: normal; color: red")])
            .with_child(Node::text("plain"));
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&b);
        let runs = first_runs(&blocks);
        assert_eq!(runs[0].properties.bold, Some(false));
        assert_eq!(runs[0].properties.color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn test_font_attributes() {
        let doc = MemoryDocument::new();
        let font = Node::element_with_attrs(
            "font",
            vec![("face", "'Arial', sans-serif"), ("color", "#00f"), ("size", "5")],
        )
        .with_child(Node::text("x"));
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&font);
        let runs = first_runs(&blocks);
        assert_eq!(runs[0].properties.font.as_deref(), Some("Arial"));
        assert_eq!(runs[0].properties.color.as_deref(), Some("0000FF"));
        assert!(runs[0].properties.size.is_some());
    }

    #[test]
    fn test_quote_marks() {
        let doc = MemoryDocument::new();
        let q = Node::element("q").with_child(Node::text("hi"));
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&q);
        assert_eq!(blocks[0].as_paragraph().unwrap().text(), "\u{201C}hi\u{201D}");
    }

    #[test]
    fn test_abbreviation_adds_footnote() {
        let doc = MemoryDocument::new();
        let abbr = Node::element_with_attrs("abbr", vec![("title", "HyperText Markup Language")])
            .with_child(Node::text("HTML"));
        let blocks = HtmlConverter::new(&doc, ConvertOptions::default()).convert(&abbr);
        let runs = first_runs(&blocks);
        assert_eq!(runs[1].content, vec![RunContent::FootnoteReference(1)]);
        assert_eq!(
            runs[1].properties.style.as_deref(),
            Some("FootnoteReference")
        );
        let note = doc.note(NoteKind::Footnote, 1).unwrap();
        assert_eq!(note[0].text(), "HyperText Markup Language");
    }

    #[test]
    fn test_abbreviation_as_endnote() {
        let doc = MemoryDocument::new();
        let options = ConvertOptions::builder()
            .note_position(NotePosition::Endnote)
            .build()
            .unwrap();
        let abbr = Node::element_with_attrs("acronym", vec![("title", "As Soon As Possible")])
            .with_child(Node::text("ASAP"));
        let blocks = HtmlConverter::new(&doc, options).convert(&abbr);
        assert_eq!(first_runs(&blocks)[1].content, vec![RunContent::EndnoteReference(1)]);
        assert_eq!(doc.note_count(NoteKind::Endnote), 1);
        assert_eq!(doc.note_count(NoteKind::Footnote), 0);
    }

    #[test]
    fn test_no_notes_in_header() {
        let doc = MemoryDocument::new();
        let options = ConvertOptions::builder()
            .target(ConversionTarget::Header)
            .build()
            .unwrap();
        let abbr = Node::element_with_attrs("abbr", vec![("title", "World Wide Web")])
            .with_child(Node::text("WWW"));
        let blocks = HtmlConverter::new(&doc, options).convert(&abbr);
        assert_eq!(first_runs(&blocks).len(), 1);
        assert_eq!(doc.note_count(NoteKind::Footnote), 0);
    }

    #[test]
    fn test_first_face() {
        assert_eq!(first_face("\"Times New Roman\", serif").as_deref(), Some("Times New Roman"));
        assert_eq!(first_face(" , "), None);
    }
}
