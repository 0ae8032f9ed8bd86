//! Output tree
//!
//! This module defines the nodes produced by the conversion engine. The tree
//! mirrors the WordprocessingML body model: blocks (paragraphs and tables)
//! containing inline content (runs, hyperlinks, fields, bookmarks).

use crate::properties::{
    ParagraphProperties, RunProperties, TableCellProperties, TableProperties, TableRowProperties,
    VerticalMerge,
};

/// A block-level node, attachable to a body, header, footer or cell
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        }
    }
}

/// A paragraph: properties plus zero or more inline nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub properties: ParagraphProperties,
    pub content: Vec<Inline>,
}

impl Paragraph {
    pub fn new(properties: ParagraphProperties) -> Self {
        Self {
            properties,
            content: Vec::new(),
        }
    }

    pub fn with_content(properties: ParagraphProperties, content: Vec<Inline>) -> Self {
        Self {
            properties,
            content,
        }
    }

    pub fn push_run(&mut self, run: Run) {
        self.content.push(Inline::Run(run));
    }

    /// All runs of the paragraph, including those nested in hyperlinks and fields
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().flat_map(|inline| inline.runs())
    }

    /// Concatenated text of the paragraph; breaks render as `\n`
    pub fn text(&self) -> String {
        self.runs().map(Run::text_content).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    Hyperlink(Hyperlink),
    Field(Field),
    BookmarkStart { id: u32, name: String },
    BookmarkEnd { id: u32 },
}

impl Inline {
    pub fn runs(&self) -> Box<dyn Iterator<Item = &Run> + '_> {
        match self {
            Inline::Run(run) => Box::new(std::iter::once(run)),
            Inline::Hyperlink(link) => Box::new(link.runs.iter()),
            Inline::Field(field) => Box::new(field.result.iter()),
            Inline::BookmarkStart { .. } | Inline::BookmarkEnd { .. } => {
                Box::new(std::iter::empty())
            }
        }
    }

    pub fn runs_mut(&mut self) -> Box<dyn Iterator<Item = &mut Run> + '_> {
        match self {
            Inline::Run(run) => Box::new(std::iter::once(run)),
            Inline::Hyperlink(link) => Box::new(link.runs.iter_mut()),
            Inline::Field(field) => Box::new(field.result.iter_mut()),
            Inline::BookmarkStart { .. } | Inline::BookmarkEnd { .. } => {
                Box::new(std::iter::empty())
            }
        }
    }
}

/// A run of uniformly formatted content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub properties: RunProperties,
    pub content: Vec<RunContent>,
}

impl Run {
    pub fn new(properties: RunProperties, content: Vec<RunContent>) -> Self {
        Self {
            properties,
            content,
        }
    }

    /// A run holding a single piece of unformatted text
    pub fn text(text: &str) -> Self {
        Self {
            properties: RunProperties::default(),
            content: vec![RunContent::Text(text.to_string())],
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for piece in &self.content {
            match piece {
                RunContent::Text(t) => out.push_str(t),
                RunContent::Break(_) => out.push('\n'),
                RunContent::Tab => out.push('\t'),
                _ => {}
            }
        }
        out
    }
}

/// Kind of break inside a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakType {
    Line,
    Page,
}

/// A single piece of run content
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    Break(BreakType),
    Tab,
    FootnoteReference(u32),
    EndnoteReference(u32),
    Drawing(Drawing),
}

/// Where a hyperlink points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// External target stored as a package relationship
    Relationship(String),
    /// Bookmark inside the same document
    Anchor(String),
}

/// A hyperlink wrapping runs
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperlink {
    pub target: LinkTarget,
    pub tooltip: Option<String>,
    pub runs: Vec<Run>,
}

/// A simple field, e.g. `SEQ Table \* ARABIC`, with its cached result
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub instruction: String,
    pub result: Vec<Run>,
}

/// An inline picture referencing an image part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawing {
    /// Unique drawing object id
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    pub relationship_id: String,
    pub width_emu: u64,
    pub height_emu: u64,
}

/// A table with an authoritative column count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub properties: TableProperties,
    pub column_count: usize,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Every row covers exactly `column_count` grid columns.
    pub fn is_uniform(&self) -> bool {
        self.rows.iter().all(|row| row.width() == self.column_count)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub properties: TableRowProperties,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Number of grid columns covered by the row's cells
    pub fn width(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.properties.grid_span.max(1) as usize)
            .sum()
    }
}

/// A cell; always holds at least one paragraph once attached to a row
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub properties: TableCellProperties,
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Build a cell, guaranteeing it ends with a paragraph.
    pub fn new(properties: TableCellProperties, mut blocks: Vec<Block>) -> Self {
        if !matches!(blocks.last(), Some(Block::Paragraph(_))) {
            blocks.push(Block::Paragraph(Paragraph::default()));
        }
        Self { properties, blocks }
    }

    /// An empty placeholder covering `grid_span` columns
    pub fn filler(grid_span: u32) -> Self {
        Self::new(
            TableCellProperties {
                grid_span: grid_span.max(1),
                ..Default::default()
            },
            Vec::new(),
        )
    }

    /// An empty cell continuing a vertical merge from the row above
    pub fn continuation(grid_span: u32) -> Self {
        Self::new(
            TableCellProperties {
                grid_span: grid_span.max(1),
                vertical_merge: Some(VerticalMerge::Continue),
                ..Default::default()
            },
            Vec::new(),
        )
    }

    pub fn is_continuation(&self) -> bool {
        self.properties.vertical_merge == Some(VerticalMerge::Continue)
    }

    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_always_has_paragraph() {
        let cell = TableCell::new(TableCellProperties::default(), Vec::new());
        assert_eq!(cell.blocks.len(), 1);
        assert!(cell.blocks[0].as_paragraph().is_some());
    }

    #[test]
    fn test_cell_ending_with_table_gets_paragraph() {
        let cell = TableCell::new(
            TableCellProperties::default(),
            vec![Block::Table(Table::default())],
        );
        assert_eq!(cell.blocks.len(), 2);
        assert!(cell.blocks[1].as_paragraph().is_some());
    }

    #[test]
    fn test_row_width_counts_spans() {
        let row = TableRow {
            properties: TableRowProperties::default(),
            cells: vec![TableCell::filler(2), TableCell::continuation(1)],
        };
        assert_eq!(row.width(), 3);
    }

    #[test]
    fn test_paragraph_text() {
        let mut p = Paragraph::default();
        p.push_run(Run::text("Hello "));
        p.content.push(Inline::Hyperlink(Hyperlink {
            target: LinkTarget::Anchor("top".to_string()),
            tooltip: None,
            runs: vec![Run::text("World")],
        }));
        assert_eq!(p.text(), "Hello World");
    }
}
