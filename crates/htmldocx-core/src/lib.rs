//! htmldocx-core - WordprocessingML output tree and serialization
//!
//! This crate provides the typed output nodes produced by the `htmldocx`
//! conversion engine: paragraphs, runs, fields, hyperlinks, drawings and
//! tables, together with the run/paragraph/table property sets they carry.
//!
//! # Architecture
//!
//! ```text
//! HTML String ──parse──▶ Source Nodes ──interpret──▶ ┌─────────────┐
//!                                                    │ Output Tree │ ──▶ w:body XML
//!                                                    └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use htmldocx_core::{serialize, Block, Paragraph, Run};
//!
//! let mut paragraph = Paragraph::default();
//! paragraph.push_run(Run::text("Hello World"));
//!
//! let xml = serialize(&[Block::Paragraph(paragraph)]);
//! assert!(xml.contains("<w:t xml:space=\"preserve\">Hello World</w:t>"));
//! ```

mod ast;
mod properties;
mod serialize;

pub use ast::{
    Block, BreakType, Drawing, Field, Hyperlink, Inline, LinkTarget, Paragraph, Run, RunContent,
    Table, TableCell, TableRow,
};
pub use properties::{
    Alignment, CellAlignment, LineSpacing, NumberingRef, ParagraphProperties, RunProperties,
    TableCellProperties, TableProperties, TableRowProperties, TableWidth, Underline,
    VerticalMerge, VerticalPosition,
};
pub use serialize::{escape_xml, serialize, serialize_paragraph};
