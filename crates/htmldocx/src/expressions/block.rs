//! Paragraph-producing elements.

use htmldocx_core::{
    Alignment, Block, Field, Inline, Paragraph, ParagraphProperties, Run, RunContent,
    RunProperties, Table, TableCell, TableCellProperties, TableProperties, TableRow, TableWidth,
};

use super::{assemble, compose, interpret_children, text_output, Interpret, Output};
use crate::context::{Counter, ParsingContext, TextFlags};
use crate::document::StyleKind;
use crate::node::NodeRef;
use crate::style::parse_alignment;

const PREFORMATTED_FONT: &str = "Courier New";
/// Half an inch, in twips
const BLOCK_INDENT: i32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    /// `div`, `section` and unknown tags
    Container,
    Paragraph,
    Address,
    Center,
    Summary,
    DefinitionTerm,
    Definition,
    Quote,
    Preformatted,
    Figure,
    FigureCaption,
    TableCaption,
    Heading(u8),
}

pub(crate) struct BlockExpression<'a> {
    node: NodeRef<'a>,
    kind: BlockKind,
}

impl<'a> BlockExpression<'a> {
    pub fn new(node: NodeRef<'a>, kind: BlockKind) -> Self {
        Self { node, kind }
    }

    fn defaults(&self, ctx: &ParsingContext<'_>) -> (RunProperties, ParagraphProperties) {
        let session = ctx.session();
        let mut run = RunProperties::default();
        let mut paragraph = ParagraphProperties::default();
        match self.kind {
            BlockKind::Heading(level) => {
                let name = format!("Heading{}", level.clamp(1, 6));
                paragraph.style = Some(session.builtin_style(&name, StyleKind::Paragraph));
                paragraph.keep_next = Some(true);
            }
            BlockKind::Quote => {
                paragraph.style = Some(session.builtin_style("Quote", StyleKind::Paragraph));
                paragraph.indent_left = Some(BLOCK_INDENT);
            }
            BlockKind::Preformatted => {
                paragraph.style =
                    Some(session.builtin_style("PreformattedText", StyleKind::Paragraph));
                run.font = Some(PREFORMATTED_FONT.to_string());
            }
            BlockKind::FigureCaption | BlockKind::TableCaption => {
                paragraph.style = Some(session.builtin_style("Caption", StyleKind::Paragraph));
            }
            BlockKind::Center => paragraph.alignment = Some(Alignment::Center),
            BlockKind::Address => run.italic = Some(true),
            BlockKind::Summary => run.bold = Some(true),
            BlockKind::Definition => paragraph.indent_left = Some(BLOCK_INDENT),
            BlockKind::Container
            | BlockKind::Paragraph
            | BlockKind::DefinitionTerm
            | BlockKind::Figure => {}
        }
        if let Some(alignment) = self.node.attr("align").and_then(parse_alignment) {
            paragraph.alignment = Some(alignment);
        }
        (run, paragraph)
    }
}

impl Interpret for BlockExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let (run, paragraph) = self.defaults(ctx);
        let composed = compose(&self.node, ctx, StyleKind::Paragraph, run, paragraph);
        let text = match self.kind {
            BlockKind::Preformatted if composed.element.white_space.is_none() => {
                TextFlags::PREFORMATTED
            }
            _ => composed.text_flags(ctx.text()),
        };

        let frame = ctx.frame(composed.run, composed.paragraph);
        let inner = ctx.with_frame(&frame).with_text(text);

        let mut outputs = match self.kind {
            BlockKind::FigureCaption => caption_label(&inner, Counter::FigureCaption, "Figure"),
            BlockKind::TableCaption => caption_label(&inner, Counter::TableCaption, "Table"),
            _ => Vec::new(),
        };
        outputs.extend(interpret_children(&self.node, &inner));
        let blocks = assemble(outputs, &inner.paragraph_properties(), text.preserve_spaces);

        if self.kind == BlockKind::Preformatted && ctx.options().pre_as_table && !blocks.is_empty()
        {
            return vec![Output::Block(single_cell_table(blocks))];
        }
        blocks.into_iter().map(Output::Block).collect()
    }
}

/// `Figure 3 ` style prefix with a sequence field holding the number
fn caption_label(ctx: &ParsingContext<'_>, counter: Counter, sequence: &str) -> Vec<Output> {
    let number = ctx.next_id(counter);
    let field = Field {
        instruction: format!("SEQ {} \\* ARABIC", sequence),
        result: vec![Run::new(
            ctx.run_properties(),
            vec![RunContent::Text(number.to_string())],
        )],
    };
    vec![
        text_output(ctx, &format!("{} ", sequence)),
        Output::Inline(Inline::Field(field)),
        text_output(ctx, " "),
    ]
}

/// Full-width bordered table wrapping preformatted content
fn single_cell_table(blocks: Vec<Block>) -> Block {
    let cell = TableCell::new(TableCellProperties::default(), blocks);
    Block::Table(Table {
        properties: TableProperties {
            width: Some(TableWidth::Percent(5000)),
            borders: Some(true),
            ..Default::default()
        },
        column_count: 1,
        rows: vec![TableRow {
            properties: Default::default(),
            cells: vec![cell],
        }],
    })
}

/// `<hr>`: an empty paragraph with a bottom border
pub(crate) struct HorizontalRuleExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> HorizontalRuleExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }

    fn precedes_heading(&self) -> bool {
        self.node.next_element_sibling().is_some_and(|next| {
            matches!(
                next.tag_name().as_str(),
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            )
        })
    }
}

impl Interpret for HorizontalRuleExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let defaults = ParagraphProperties {
            bottom_border: Some(true),
            keep_next: self.precedes_heading().then_some(true),
            ..Default::default()
        };
        let composed = compose(
            &self.node,
            ctx,
            StyleKind::Paragraph,
            RunProperties::default(),
            defaults,
        );
        let frame = ctx.frame(composed.run, composed.paragraph);
        let inner = ctx.with_frame(&frame);
        let paragraph = Paragraph::new(inner.paragraph_properties());
        vec![Output::Block(Block::Paragraph(paragraph))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::{ConvertOptions, HtmlConverter, Node};

    fn convert(document: &MemoryDocument, node: &Node) -> Vec<Block> {
        HtmlConverter::new(document, ConvertOptions::default()).convert(node)
    }

    #[test]
    fn test_heading_style_and_keep_next() {
        let doc = MemoryDocument::new();
        let h2 = Node::element("h2").with_child(Node::text("Title"));
        let blocks = convert(&doc, &h2);
        let heading = blocks[0].as_paragraph().unwrap();
        assert_eq!(heading.properties.style.as_deref(), Some("Heading2"));
        assert_eq!(heading.properties.keep_next, Some(true));
    }

    #[test]
    fn test_quote_indents() {
        let doc = MemoryDocument::new();
        let quote = Node::element("blockquote")
            .with_child(Node::element("p").with_child(Node::text("Quoted")));
        let blocks = convert(&doc, &quote);
        let paragraph = blocks[0].as_paragraph().unwrap();
        assert_eq!(paragraph.properties.indent_left, Some(BLOCK_INDENT));
        assert_eq!(paragraph.properties.style.as_deref(), Some("Quote"));
    }

    #[test]
    fn test_align_attribute() {
        let doc = MemoryDocument::new();
        let p = Node::element_with_attrs("p", vec![("align", "right")])
            .with_child(Node::text("x"));
        let blocks = convert(&doc, &p);
        assert_eq!(
            blocks[0].as_paragraph().unwrap().properties.alignment,
            Some(Alignment::Right)
        );
    }

    #[test]
    fn test_pre_as_table() {
        let doc = MemoryDocument::new();
        let options = ConvertOptions::builder().pre_as_table(true).build().unwrap();
        let converter = HtmlConverter::new(&doc, options);
        let pre = Node::element("pre").with_child(Node::text("let x = 1;"));
        let blocks = converter.convert(&pre);
        let table = blocks[0].as_table().unwrap();
        assert_eq!(table.column_count, 1);
        assert_eq!(table.rows[0].cells[0].text(), "let x = 1;");
    }

    #[test]
    fn test_figure_caption_numbered() {
        let doc = MemoryDocument::new();
        let figure = Node::element("figure")
            .with_child(Node::element("figcaption").with_child(Node::text("A chart")))
            .with_child(Node::element("figcaption").with_child(Node::text("Another")));
        let blocks = convert(&doc, &figure);
        let first = blocks[0].as_paragraph().unwrap();
        assert_eq!(first.text(), "Figure 1 A chart");
        assert_eq!(first.properties.style.as_deref(), Some("Caption"));
        assert!(first
            .content
            .iter()
            .any(|inline| matches!(inline, Inline::Field(f) if f.instruction == "SEQ Figure \\* ARABIC")));
        assert_eq!(blocks[1].as_paragraph().unwrap().text(), "Figure 2 Another");
    }

    #[test]
    fn test_hr_before_heading_keeps_with_next() {
        let doc = MemoryDocument::new();
        let body = Node::element("div")
            .with_child(Node::element("hr"))
            .with_child(Node::element("h1").with_child(Node::text("Next")))
            .with_child(Node::element("hr"))
            .with_child(Node::element("p").with_child(Node::text("Body")));
        let blocks = convert(&doc, &body);
        let first = blocks[0].as_paragraph().unwrap();
        assert_eq!(first.properties.bottom_border, Some(true));
        assert_eq!(first.properties.keep_next, Some(true));
        let second = blocks[2].as_paragraph().unwrap();
        assert_eq!(second.properties.bottom_border, Some(true));
        assert_eq!(second.properties.keep_next, None);
    }
}
