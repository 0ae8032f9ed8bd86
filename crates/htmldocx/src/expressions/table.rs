//! Tables and their parts.
//!
//! A table reads its sections in document order, turns every cell into a
//! finished [`TableCell`] through its own cascade frame, and hands the rows
//! to the grid reconciler. Header sections come first and footers last,
//! whatever their position in the source.

use htmldocx_core::{
    Alignment, Block, CellAlignment, ParagraphProperties, RunProperties, Table, TableCell,
    TableCellProperties, TableProperties, TableRowProperties, TableWidth,
};
use tracing::debug;

use super::{
    assemble, compose, interpret_children, is_hidden, BlockExpression, BlockKind, Composed,
    Interpret, Output,
};
use crate::context::ParsingContext;
use crate::document::StyleKind;
use crate::grid::{self, SourceRow, SpanCell};
use crate::node::{Node, NodeRef};
use crate::options::CaptionPosition;
use crate::style::{parse_alignment, parse_color, Length};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SectionKind {
    Head,
    Body,
    Foot,
}

fn table_width(length: Length) -> Option<TableWidth> {
    if length.is_percent() {
        let fiftieths = (length.value * 50.0).round();
        return (fiftieths > 0.0).then(|| TableWidth::Percent(fiftieths.min(5000.0) as u32));
    }
    let twips = length.to_twips();
    (twips > 0).then(|| TableWidth::Twips(twips as u32))
}

fn declared_width(composed: &Composed, node: &NodeRef<'_>) -> Option<TableWidth> {
    composed
        .element
        .width
        .or_else(|| node.attr("width").and_then(Length::parse))
        .and_then(table_width)
}

/// Background from CSS, then the legacy `bgcolor` attribute
fn background(composed: &Composed, node: &NodeRef<'_>) -> Option<String> {
    composed
        .element
        .background
        .clone()
        .or_else(|| node.attr("bgcolor").and_then(parse_color))
}

fn parse_valign(value: &str) -> Option<CellAlignment> {
    match value.trim().to_ascii_lowercase().as_str() {
        "top" => Some(CellAlignment::Top),
        "middle" | "center" => Some(CellAlignment::Center),
        "bottom" => Some(CellAlignment::Bottom),
        _ => None,
    }
}

fn is_row(node: &Node) -> bool {
    node.is_element() && node.tag_name() == "tr"
}

fn is_cell(node: &Node) -> bool {
    node.is_element() && matches!(node.tag_name().as_str(), "td" | "th")
}

pub(crate) struct TableExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> TableExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }

    fn properties(&self, composed: &Composed) -> TableProperties {
        let borders = self
            .node
            .attr("border")
            .and_then(|b| b.trim().parse::<u32>().ok())
            .map(|width| width > 0);
        TableProperties {
            style: composed.class_style.clone(),
            bidi_visual: composed.run.right_to_left.filter(|rtl| *rtl),
            width: declared_width(composed, &self.node),
            alignment: self.node.attr("align").and_then(parse_alignment),
            borders,
        }
    }
}

impl Interpret for TableExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let composed = compose(
            &self.node,
            ctx,
            StyleKind::Table,
            RunProperties::default(),
            ParagraphProperties::default(),
        );
        let properties = self.properties(&composed);
        let shading = background(&composed, &self.node);
        let text = composed.text_flags(ctx.text());
        let frame = ctx.frame(composed.run, composed.paragraph);
        let inner = ctx.with_frame(&frame).with_text(text);

        let mut sections: Vec<(SectionKind, Vec<SourceRow>)> = Vec::new();
        let mut loose_rows: Vec<SourceRow> = Vec::new();
        let mut caption_index = None;

        for (index, child) in self.node.children().enumerate() {
            if !child.is_element() {
                continue;
            }
            let tag = child.tag_name();
            if tag != "tr" && !loose_rows.is_empty() {
                sections.push((SectionKind::Body, std::mem::take(&mut loose_rows)));
            }
            let child = NodeRef::child_of(&self.node, child, index);
            if is_hidden(&child) {
                continue;
            }
            let kind = match tag.as_str() {
                "thead" => SectionKind::Head,
                "tbody" => SectionKind::Body,
                "tfoot" => SectionKind::Foot,
                "tr" => {
                    loose_rows.push(source_row(&child, &inner, false, shading.as_deref()));
                    continue;
                }
                "caption" => {
                    caption_index.get_or_insert(index);
                    continue;
                }
                _ => {
                    debug!(tag, "ignoring table child");
                    continue;
                }
            };
            let rows = section_rows(&child, &inner, kind == SectionKind::Head, shading.as_deref());
            sections.push((kind, rows));
        }
        if !loose_rows.is_empty() {
            sections.push((SectionKind::Body, loose_rows));
        }
        sections.sort_by_key(|(kind, _)| *kind);

        let Some(grid) = grid::reconcile(sections.into_iter().map(|(_, rows)| rows).collect())
        else {
            debug!("dropping table without cells");
            return Vec::new();
        };
        let table = Block::Table(Table {
            properties,
            column_count: grid.column_count,
            rows: grid.rows,
        });

        let Some((index, caption)) =
            caption_index.and_then(|i| self.node.children().nth(i).map(|c| (i, c)))
        else {
            return vec![Output::Block(table)];
        };
        let caption = NodeRef::child_of(&self.node, caption, index);
        let position = ctx.options().caption_position;
        let mut outputs = BlockExpression::new(caption, BlockKind::TableCaption).interpret(&inner);
        match position {
            CaptionPosition::Above => {
                for output in &mut outputs {
                    if let Output::Block(Block::Paragraph(paragraph)) = output {
                        paragraph.properties.keep_next = Some(true);
                    }
                }
                outputs.push(Output::Block(table));
            }
            CaptionPosition::Below => outputs.insert(0, Output::Block(table)),
        }
        outputs
    }
}

/// Compose a section, row or cell; a background shades cells, never the
/// paragraphs inside them
fn compose_part(
    node: &NodeRef<'_>,
    ctx: &ParsingContext<'_>,
    run: RunProperties,
    paragraph: ParagraphProperties,
) -> Composed {
    let mut composed = compose(node, ctx, StyleKind::Paragraph, run, paragraph);
    if composed.element.background.is_some() {
        composed.paragraph.shading = None;
    }
    composed
}

fn section_rows(
    section: &NodeRef<'_>,
    ctx: &ParsingContext<'_>,
    header: bool,
    shading: Option<&str>,
) -> Vec<SourceRow> {
    let composed = compose_part(
        section,
        ctx,
        RunProperties::default(),
        ParagraphProperties::default(),
    );
    let shading = background(&composed, section).or_else(|| shading.map(str::to_string));
    let frame = ctx.frame(composed.run, composed.paragraph);
    let inner = ctx.with_frame(&frame);

    let mut rows = Vec::new();
    for (index, child) in section.children().enumerate() {
        if !is_row(child) {
            continue;
        }
        let row = NodeRef::child_of(section, child, index);
        if !is_hidden(&row) {
            rows.push(source_row(&row, &inner, header, shading.as_deref()));
        }
    }
    rows
}

fn source_row(
    row: &NodeRef<'_>,
    ctx: &ParsingContext<'_>,
    header: bool,
    shading: Option<&str>,
) -> SourceRow {
    let composed = compose_part(
        row,
        ctx,
        RunProperties::default(),
        ParagraphProperties::default(),
    );
    let shading = background(&composed, row).or_else(|| shading.map(str::to_string));
    let vertical_alignment = row.attr("valign").and_then(parse_valign);
    let frame = ctx.frame(composed.run, composed.paragraph);
    let inner = ctx.with_frame(&frame);

    let mut cells = Vec::new();
    for (index, child) in row.children().enumerate() {
        if !is_cell(child) {
            continue;
        }
        let cell = NodeRef::child_of(row, child, index);
        if !is_hidden(&cell) {
            cells.push(source_cell(&cell, &inner, shading.as_deref(), vertical_alignment));
        }
    }
    SourceRow {
        properties: TableRowProperties { header },
        cells,
    }
}

fn source_cell(
    cell: &NodeRef<'_>,
    ctx: &ParsingContext<'_>,
    shading: Option<&str>,
    vertical_alignment: Option<CellAlignment>,
) -> SpanCell {
    let mut run = RunProperties::default();
    let mut paragraph = ParagraphProperties::default();
    if cell.tag_name() == "th" {
        run.bold = Some(true);
        paragraph.alignment = Some(Alignment::Center);
    }
    if let Some(alignment) = cell.attr("align").and_then(parse_alignment) {
        paragraph.alignment = Some(alignment);
    }

    let composed = compose_part(cell, ctx, run, paragraph);
    let properties = TableCellProperties {
        width: declared_width(&composed, cell),
        shading: background(&composed, cell).or_else(|| shading.map(str::to_string)),
        no_wrap: cell.has_attr("nowrap").then_some(true),
        vertical_alignment: composed
            .element
            .cell_alignment
            .or_else(|| cell.attr("valign").and_then(parse_valign))
            .or(vertical_alignment),
        ..Default::default()
    };

    let text = composed.text_flags(ctx.text());
    let frame = ctx.frame(composed.run, composed.paragraph);
    let inner = ctx.with_frame(&frame).with_text(text);
    let blocks = assemble(
        interpret_children(cell, &inner),
        &inner.paragraph_properties(),
        text.preserve_spaces,
    );

    SpanCell::new(
        cell.node.attr_u32("colspan").unwrap_or(1),
        cell.node.attr_u32("rowspan").unwrap_or(1),
        TableCell::new(properties, blocks),
    )
}

/// A table section, row, cell or caption found outside a table
pub(crate) struct TablePartExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> TablePartExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }
}

impl Interpret for TablePartExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        debug!(tag = self.node.tag_name(), "table part outside a table");
        BlockExpression::new(self.node, BlockKind::Container).interpret(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::{ConvertOptions, HtmlConverter};
    use htmldocx_core::{Field, Inline, VerticalMerge};

    fn cell(tag: &str, text: &str) -> Node {
        Node::element(tag).with_child(Node::text(text))
    }

    fn spanning(text: &str, attrs: Vec<(&str, &str)>) -> Node {
        Node::element_with_attrs("td", attrs).with_child(Node::text(text))
    }

    fn row(cells: Vec<Node>) -> Node {
        cells
            .into_iter()
            .fold(Node::element("tr"), |row, cell| row.with_child(cell))
    }

    fn convert(table: &Node) -> Vec<Block> {
        let doc = MemoryDocument::new();
        HtmlConverter::new(&doc, ConvertOptions::default()).convert(table)
    }

    #[test]
    fn test_row_span_continuation() {
        let table = Node::element("table")
            .with_child(row(vec![
                spanning("A", vec![("rowspan", "2")]),
                cell("td", "B"),
            ]))
            .with_child(row(vec![cell("td", "C")]));
        let blocks = convert(&table);
        let table = blocks[0].as_table().unwrap();
        assert_eq!(table.column_count, 2);
        assert!(table.is_uniform());
        assert_eq!(
            table.rows[0].cells[0].properties.vertical_merge,
            Some(VerticalMerge::Restart)
        );
        assert_eq!(table.rows[1].cells.len(), 2);
        assert!(table.rows[1].cells[0].is_continuation());
        assert_eq!(table.rows[1].cells[1].text(), "C");
    }

    #[test]
    fn test_sections_ordered_and_header_marked() {
        let table = Node::element("table")
            .with_child(Node::element("tfoot").with_child(row(vec![cell("td", "foot")])))
            .with_child(Node::element("tbody").with_child(row(vec![cell("td", "body")])))
            .with_child(Node::element("thead").with_child(row(vec![cell("th", "head")])));
        let blocks = convert(&table);
        let table = blocks[0].as_table().unwrap();
        let texts: Vec<String> = table.rows.iter().map(|r| r.cells[0].text()).collect();
        assert_eq!(texts, vec!["head", "body", "foot"]);
        assert!(table.rows[0].properties.header);
        assert!(!table.rows[1].properties.header);

        let header = table.rows[0].cells[0].blocks[0].as_paragraph().unwrap();
        assert_eq!(header.properties.alignment, Some(Alignment::Center));
        assert_eq!(header.runs().next().unwrap().properties.bold, Some(true));
    }

    #[test]
    fn test_empty_table_dropped() {
        let table = Node::element("table").with_child(Node::element("tr"));
        assert!(convert(&table).is_empty());
    }

    #[test]
    fn test_cell_attributes() {
        let table = Node::element("table")
            .with_child(
                Node::element_with_attrs("tr", vec![("bgcolor", "#eeeeee")])
                    .with_child(spanning(
                        "x",
                        vec![("valign", "middle"), ("nowrap", ""), ("width", "50%")],
                    ))
                    .with_child(spanning("y", vec![("style", "background-color: red")])),
            );
        let blocks = convert(&table);
        let cells = &blocks[0].as_table().unwrap().rows[0].cells;
        assert_eq!(cells[0].properties.vertical_alignment, Some(CellAlignment::Center));
        assert_eq!(cells[0].properties.no_wrap, Some(true));
        assert_eq!(cells[0].properties.width, Some(TableWidth::Percent(2500)));
        assert_eq!(cells[0].properties.shading.as_deref(), Some("EEEEEE"));
        assert_eq!(cells[1].properties.shading.as_deref(), Some("FF0000"));
        let paragraph = cells[1].blocks[0].as_paragraph().unwrap();
        assert_eq!(paragraph.properties.shading, None);
    }

    #[test]
    fn test_table_properties() {
        let table = Node::element_with_attrs(
            "table",
            vec![("border", "1"), ("width", "100%"), ("dir", "rtl")],
        )
        .with_child(row(vec![cell("td", "x")]));
        let blocks = convert(&table);
        let properties = &blocks[0].as_table().unwrap().properties;
        assert_eq!(properties.borders, Some(true));
        assert_eq!(properties.width, Some(TableWidth::Percent(5000)));
        assert_eq!(properties.bidi_visual, Some(true));
    }

    #[test]
    fn test_caption_above_with_sequence() {
        let table = Node::element("table")
            .with_child(cell("caption", "Results"))
            .with_child(row(vec![cell("td", "x")]));
        let blocks = convert(&table);
        assert_eq!(blocks.len(), 2);
        let caption = blocks[0].as_paragraph().unwrap();
        assert_eq!(caption.text(), "Table 1 Results");
        assert_eq!(caption.properties.style.as_deref(), Some("Caption"));
        assert_eq!(caption.properties.keep_next, Some(true));
        assert!(caption.content.iter().any(|inline| matches!(
            inline,
            Inline::Field(Field { instruction, .. }) if instruction == "SEQ Table \\* ARABIC"
        )));
        assert!(blocks[1].is_table());
    }

    #[test]
    fn test_caption_below() {
        let doc = MemoryDocument::new();
        let options = ConvertOptions::builder()
            .caption_position(CaptionPosition::Below)
            .build()
            .unwrap();
        let table = Node::element("table")
            .with_child(cell("caption", "Results"))
            .with_child(row(vec![cell("td", "x")]));
        let blocks = HtmlConverter::new(&doc, options).convert(&table);
        assert!(blocks[0].is_table());
        assert_eq!(blocks[1].as_paragraph().unwrap().text(), "Table 1 Results");
    }

    #[test]
    fn test_nested_table_cell_ends_with_paragraph() {
        let inner = Node::element("table").with_child(row(vec![cell("td", "inner")]));
        let outer = Node::element("table")
            .with_child(row(vec![Node::element("td").with_child(inner)]));
        let blocks = convert(&outer);
        let cell = &blocks[0].as_table().unwrap().rows[0].cells[0];
        assert!(cell.blocks[0].is_table());
        assert!(cell.blocks[1].as_paragraph().is_some());
    }

    #[test]
    fn test_orphan_cell_is_plain_block() {
        let blocks = convert(&cell("td", "alone"));
        assert_eq!(blocks[0].as_paragraph().unwrap().text(), "alone");
    }

    #[test]
    fn test_table_width_conversion() {
        assert_eq!(
            table_width(Length::parse("50%").unwrap()),
            Some(TableWidth::Percent(2500))
        );
        assert_eq!(
            table_width(Length::parse("1in").unwrap()),
            Some(TableWidth::Twips(1440))
        );
        assert_eq!(table_width(Length::parse("0").unwrap()), None);
    }
}
