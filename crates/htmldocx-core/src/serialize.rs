//! WordprocessingML serialization
//!
//! Converts output blocks into `w:body` compatible XML. Property elements are
//! written in the order the schema requires.

use crate::ast::{Block, BreakType, Drawing, Inline, LinkTarget, Paragraph, Run, RunContent, Table};
use crate::properties::{
    LineSpacing, ParagraphProperties, RunProperties, TableCellProperties, TableProperties,
    VerticalMerge,
};

/// Usable page width in twips, split across grid columns
const TEXT_WIDTH_TWIPS: usize = 9638;

/// Serialize blocks to a WordprocessingML fragment
pub fn serialize(blocks: &[Block]) -> String {
    let mut out = String::with_capacity(4096);
    serialize_blocks(blocks, &mut out);
    out
}

/// Serialize a single paragraph (used for note bodies and captions)
pub fn serialize_paragraph(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    write_paragraph(paragraph, &mut out);
    out
}

/// Escape text for element content and attribute values
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn serialize_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => write_paragraph(p, out),
            Block::Table(t) => write_table(t, out),
        }
    }
}

fn write_paragraph(p: &Paragraph, out: &mut String) {
    out.push_str("<w:p>");
    write_paragraph_properties(&p.properties, out);
    for inline in &p.content {
        write_inline(inline, out);
    }
    out.push_str("</w:p>");
}

fn write_paragraph_properties(props: &ParagraphProperties, out: &mut String) {
    if props.is_empty() {
        return;
    }

    out.push_str("<w:pPr>");
    if let Some(style) = &props.style {
        out.push_str(&format!("<w:pStyle w:val=\"{}\"/>", escape_xml(style)));
    }
    if props.keep_next == Some(true) {
        out.push_str("<w:keepNext/>");
    }
    if props.keep_lines == Some(true) {
        out.push_str("<w:keepLines/>");
    }
    if props.page_break_before == Some(true) {
        out.push_str("<w:pageBreakBefore/>");
    }
    if let Some(num) = props.numbering {
        out.push_str("<w:numPr>");
        out.push_str(&format!("<w:ilvl w:val=\"{}\"/>", num.level));
        out.push_str(&format!("<w:numId w:val=\"{}\"/>", num.instance));
        out.push_str("</w:numPr>");
    }
    if props.bottom_border == Some(true) {
        out.push_str(
            "<w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"auto\"/></w:pBdr>",
        );
    }
    if let Some(fill) = &props.shading {
        out.push_str(&format!(
            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
            escape_xml(fill)
        ));
    }
    if props.bidi == Some(true) {
        out.push_str("<w:bidi/>");
    }
    if props.spacing_before.is_some() || props.spacing_after.is_some() || props.line_spacing.is_some() {
        out.push_str("<w:spacing");
        if let Some(before) = props.spacing_before {
            out.push_str(&format!(" w:before=\"{}\"", before));
        }
        if let Some(after) = props.spacing_after {
            out.push_str(&format!(" w:after=\"{}\"", after));
        }
        match props.line_spacing {
            Some(LineSpacing::Auto(line)) => {
                out.push_str(&format!(" w:line=\"{}\" w:lineRule=\"auto\"", line))
            }
            Some(LineSpacing::Exact(line)) => {
                out.push_str(&format!(" w:line=\"{}\" w:lineRule=\"exact\"", line))
            }
            None => {}
        }
        out.push_str("/>");
    }
    if props.indent_left.is_some() || props.indent_right.is_some() || props.indent_first_line.is_some() {
        out.push_str("<w:ind");
        if let Some(left) = props.indent_left {
            out.push_str(&format!(" w:left=\"{}\"", left));
        }
        if let Some(right) = props.indent_right {
            out.push_str(&format!(" w:right=\"{}\"", right));
        }
        match props.indent_first_line {
            Some(first) if first < 0 => out.push_str(&format!(" w:hanging=\"{}\"", -first)),
            Some(first) => out.push_str(&format!(" w:firstLine=\"{}\"", first)),
            None => {}
        }
        out.push_str("/>");
    }
    if let Some(align) = props.alignment {
        out.push_str(&format!("<w:jc w:val=\"{}\"/>", align.as_str()));
    }
    out.push_str("</w:pPr>");
}

fn write_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Run(run) => write_run(run, out),
        Inline::Hyperlink(link) => {
            match &link.target {
                LinkTarget::Relationship(id) => {
                    out.push_str(&format!("<w:hyperlink r:id=\"{}\"", escape_xml(id)))
                }
                LinkTarget::Anchor(anchor) => {
                    out.push_str(&format!("<w:hyperlink w:anchor=\"{}\"", escape_xml(anchor)))
                }
            }
            if let Some(tooltip) = &link.tooltip {
                out.push_str(&format!(" w:tooltip=\"{}\"", escape_xml(tooltip)));
            }
            out.push_str(" w:history=\"1\">");
            for run in &link.runs {
                write_run(run, out);
            }
            out.push_str("</w:hyperlink>");
        }
        Inline::Field(field) => {
            out.push_str(&format!(
                "<w:fldSimple w:instr=\" {} \">",
                escape_xml(&field.instruction)
            ));
            for run in &field.result {
                write_run(run, out);
            }
            out.push_str("</w:fldSimple>");
        }
        Inline::BookmarkStart { id, name } => out.push_str(&format!(
            "<w:bookmarkStart w:id=\"{}\" w:name=\"{}\"/>",
            id,
            escape_xml(name)
        )),
        Inline::BookmarkEnd { id } => out.push_str(&format!("<w:bookmarkEnd w:id=\"{}\"/>", id)),
    }
}

fn write_run(run: &Run, out: &mut String) {
    out.push_str("<w:r>");
    write_run_properties(&run.properties, out);
    for piece in &run.content {
        match piece {
            RunContent::Text(text) => {
                out.push_str("<w:t xml:space=\"preserve\">");
                out.push_str(&escape_xml(text));
                out.push_str("</w:t>");
            }
            RunContent::Break(BreakType::Line) => out.push_str("<w:br/>"),
            RunContent::Break(BreakType::Page) => out.push_str("<w:br w:type=\"page\"/>"),
            RunContent::Tab => out.push_str("<w:tab/>"),
            RunContent::FootnoteReference(id) => {
                out.push_str(&format!("<w:footnoteReference w:id=\"{}\"/>", id))
            }
            RunContent::EndnoteReference(id) => {
                out.push_str(&format!("<w:endnoteReference w:id=\"{}\"/>", id))
            }
            RunContent::Drawing(drawing) => write_drawing(drawing, out),
        }
    }
    out.push_str("</w:r>");
}

fn write_run_properties(props: &RunProperties, out: &mut String) {
    if props.is_empty() {
        return;
    }

    out.push_str("<w:rPr>");
    if let Some(style) = &props.style {
        out.push_str(&format!("<w:rStyle w:val=\"{}\"/>", escape_xml(style)));
    }
    if let Some(font) = &props.font {
        let font = escape_xml(font);
        out.push_str(&format!(
            "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:cs=\"{0}\"/>",
            font
        ));
    }
    toggle(out, "b", props.bold);
    toggle(out, "i", props.italic);
    toggle(out, "caps", props.caps);
    toggle(out, "smallCaps", props.small_caps);
    toggle(out, "strike", props.strike);
    toggle(out, "vanish", props.hidden);
    if let Some(color) = &props.color {
        out.push_str(&format!("<w:color w:val=\"{}\"/>", escape_xml(color)));
    }
    if let Some(size) = props.size {
        out.push_str(&format!("<w:sz w:val=\"{0}\"/><w:szCs w:val=\"{0}\"/>", size));
    }
    if let Some(highlight) = &props.highlight {
        out.push_str(&format!("<w:highlight w:val=\"{}\"/>", escape_xml(highlight)));
    }
    if let Some(underline) = props.underline {
        out.push_str(&format!("<w:u w:val=\"{}\"/>", underline.as_str()));
    }
    if let Some(fill) = &props.shading {
        out.push_str(&format!(
            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
            escape_xml(fill)
        ));
    }
    if let Some(position) = props.vertical_position {
        out.push_str(&format!("<w:vertAlign w:val=\"{}\"/>", position.as_str()));
    }
    toggle(out, "rtl", props.right_to_left);
    if let Some(lang) = &props.language {
        out.push_str(&format!("<w:lang w:val=\"{}\"/>", escape_xml(lang)));
    }
    out.push_str("</w:rPr>");
}

fn toggle(out: &mut String, name: &str, value: Option<bool>) {
    match value {
        Some(true) => out.push_str(&format!("<w:{}/>", name)),
        Some(false) => out.push_str(&format!("<w:{} w:val=\"0\"/>", name)),
        None => {}
    }
}

fn write_drawing(drawing: &Drawing, out: &mut String) {
    let name = escape_xml(&drawing.name);
    let descr = drawing
        .description
        .as_deref()
        .map(|d| format!(" descr=\"{}\"", escape_xml(d)))
        .unwrap_or_default();
    let (cx, cy) = (drawing.width_emu, drawing.height_emu);

    out.push_str("<w:drawing><wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">");
    out.push_str(&format!("<wp:extent cx=\"{}\" cy=\"{}\"/>", cx, cy));
    out.push_str("<wp:effectExtent l=\"0\" t=\"0\" r=\"0\" b=\"0\"/>");
    out.push_str(&format!(
        "<wp:docPr id=\"{}\" name=\"{}\"{}/>",
        drawing.id, name, descr
    ));
    out.push_str(
        "<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" noChangeAspect=\"1\"/></wp:cNvGraphicFramePr>",
    );
    out.push_str("<a:graphic xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\">");
    out.push_str("<a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">");
    out.push_str("<pic:pic xmlns:pic=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">");
    out.push_str(&format!(
        "<pic:nvPicPr><pic:cNvPr id=\"0\" name=\"{}\"{}/><pic:cNvPicPr/></pic:nvPicPr>",
        name, descr
    ));
    out.push_str(&format!(
        "<pic:blipFill><a:blip r:embed=\"{}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
        escape_xml(&drawing.relationship_id)
    ));
    out.push_str(&format!(
        "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm><a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
        cx, cy
    ));
    out.push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>");
}

fn write_table(table: &Table, out: &mut String) {
    out.push_str("<w:tbl>");
    write_table_properties(&table.properties, out);

    let columns = table.column_count.max(1);
    let column_width = TEXT_WIDTH_TWIPS / columns;
    out.push_str("<w:tblGrid>");
    for _ in 0..columns {
        out.push_str(&format!("<w:gridCol w:w=\"{}\"/>", column_width));
    }
    out.push_str("</w:tblGrid>");

    for row in &table.rows {
        out.push_str("<w:tr>");
        if row.properties.header {
            out.push_str("<w:trPr><w:tblHeader/></w:trPr>");
        }
        for cell in &row.cells {
            out.push_str("<w:tc>");
            write_cell_properties(&cell.properties, out);
            serialize_blocks(&cell.blocks, out);
            out.push_str("</w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}

fn write_table_properties(props: &TableProperties, out: &mut String) {
    out.push_str("<w:tblPr>");
    if let Some(style) = &props.style {
        out.push_str(&format!("<w:tblStyle w:val=\"{}\"/>", escape_xml(style)));
    }
    if props.bidi_visual == Some(true) {
        out.push_str("<w:bidiVisual/>");
    }
    let (w, kind) = props.width.map(|w| w.parts()).unwrap_or((0, "auto"));
    out.push_str(&format!("<w:tblW w:w=\"{}\" w:type=\"{}\"/>", w, kind));
    if let Some(align) = props.alignment {
        out.push_str(&format!("<w:jc w:val=\"{}\"/>", align.as_str()));
    }
    if props.borders == Some(true) {
        out.push_str("<w:tblBorders>");
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            out.push_str(&format!(
                "<w:{} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
                side
            ));
        }
        out.push_str("</w:tblBorders>");
    }
    out.push_str("<w:tblLook w:val=\"04A0\"/>");
    out.push_str("</w:tblPr>");
}

fn write_cell_properties(props: &TableCellProperties, out: &mut String) {
    out.push_str("<w:tcPr>");
    if let Some(width) = props.width {
        let (w, kind) = width.parts();
        out.push_str(&format!("<w:tcW w:w=\"{}\" w:type=\"{}\"/>", w, kind));
    }
    if props.grid_span > 1 {
        out.push_str(&format!("<w:gridSpan w:val=\"{}\"/>", props.grid_span));
    }
    match props.vertical_merge {
        Some(VerticalMerge::Restart) => out.push_str("<w:vMerge w:val=\"restart\"/>"),
        Some(VerticalMerge::Continue) => out.push_str("<w:vMerge/>"),
        None => {}
    }
    if let Some(fill) = &props.shading {
        out.push_str(&format!(
            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
            escape_xml(fill)
        ));
    }
    if props.no_wrap == Some(true) {
        out.push_str("<w:noWrap/>");
    }
    if let Some(align) = props.vertical_alignment {
        out.push_str(&format!("<w:vAlign w:val=\"{}\"/>", align.as_str()));
    }
    out.push_str("</w:tcPr>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Field, Hyperlink, TableCell, TableRow};
    use crate::properties::{Alignment, NumberingRef, TableRowProperties};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_paragraph() {
        let mut p = Paragraph::default();
        p.push_run(Run::text("a < b"));
        assert_eq!(
            serialize_paragraph(&p),
            "<w:p><w:r><w:t xml:space=\"preserve\">a &lt; b</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_paragraph_properties_order() {
        let p = Paragraph::new(ParagraphProperties {
            style: Some("ListParagraph".to_string()),
            numbering: Some(NumberingRef {
                instance: 3,
                level: 1,
            }),
            alignment: Some(Alignment::Center),
            ..Default::default()
        });
        assert_eq!(
            serialize_paragraph(&p),
            "<w:p><w:pPr><w:pStyle w:val=\"ListParagraph\"/><w:numPr><w:ilvl w:val=\"1\"/><w:numId w:val=\"3\"/></w:numPr><w:jc w:val=\"center\"/></w:pPr></w:p>"
        );
    }

    #[test]
    fn test_run_properties() {
        let run = Run::new(
            RunProperties {
                bold: Some(true),
                color: Some("FF0000".to_string()),
                ..Default::default()
            },
            vec![RunContent::Text("x".to_string()), RunContent::Break(BreakType::Line)],
        );
        let mut out = String::new();
        write_run(&run, &mut out);
        assert_eq!(
            out,
            "<w:r><w:rPr><w:b/><w:color w:val=\"FF0000\"/></w:rPr><w:t xml:space=\"preserve\">x</w:t><w:br/></w:r>"
        );
    }

    #[test]
    fn test_hyperlink_and_field() {
        let mut p = Paragraph::default();
        p.content.push(Inline::Hyperlink(Hyperlink {
            target: LinkTarget::Relationship("rId7".to_string()),
            tooltip: None,
            runs: vec![Run::text("site")],
        }));
        p.content.push(Inline::Field(Field {
            instruction: "SEQ Table \\* ARABIC".to_string(),
            result: vec![Run::text("1")],
        }));
        let xml = serialize_paragraph(&p);
        assert!(xml.contains("<w:hyperlink r:id=\"rId7\" w:history=\"1\">"));
        assert!(xml.contains("<w:fldSimple w:instr=\" SEQ Table \\* ARABIC \">"));
    }

    #[test]
    fn test_table_grid_and_merge() {
        let mut origin = TableCell::filler(1);
        origin.properties.vertical_merge = Some(VerticalMerge::Restart);
        let table = Table {
            properties: TableProperties::default(),
            column_count: 2,
            rows: vec![
                TableRow {
                    properties: TableRowProperties { header: true },
                    cells: vec![origin, TableCell::filler(1)],
                },
                TableRow {
                    properties: TableRowProperties::default(),
                    cells: vec![TableCell::continuation(1), TableCell::filler(1)],
                },
            ],
        };
        let xml = serialize(&[Block::Table(table)]);
        assert_eq!(xml.matches("<w:gridCol ").count(), 2);
        assert!(xml.contains("<w:vMerge w:val=\"restart\"/>"));
        assert!(xml.contains("<w:vMerge/>"));
        assert!(xml.contains("<w:tblHeader/>"));
    }
}
