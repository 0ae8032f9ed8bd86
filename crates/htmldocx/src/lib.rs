//! # htmldocx
//!
//! Convert DOM nodes to WordprocessingML.
//!
//! The converter walks a CDP-style DOM tree, classifies each element into a
//! conversion expression, cascades run and paragraph formatting from
//! ancestors, and emits the block nodes defined in [`htmldocx_core`]:
//! paragraphs, tables with a reconciled grid, numbered lists, hyperlinks,
//! images, footnotes and captions.
//!
//! The target document is reached through small traits ([`TargetDocument`],
//! [`StyleCatalog`], [`NumberingStore`], [`ResourceLoader`]) so any host
//! package model can be plugged in. [`MemoryDocument`] implements the first
//! three in memory.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use htmldocx::{ConvertOptions, HtmlConverter, MemoryDocument, Node};
//!
//! let document = MemoryDocument::new();
//! let converter = HtmlConverter::new(&document, ConvertOptions::default());
//!
//! let h1 = Node::element("h1").with_child(Node::text("Hello World"));
//! let blocks = converter.convert(&h1);
//!
//! let heading = blocks[0].as_paragraph().unwrap();
//! assert_eq!(heading.text(), "Hello World");
//! assert_eq!(heading.properties.style.as_deref(), Some("Heading1"));
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use htmldocx::{ConvertOptions, HtmlConverter, MemoryDocument};
//!
//! let document = MemoryDocument::new();
//! let converter = HtmlConverter::new(&document, ConvertOptions::default());
//! let blocks = converter.convert_html("<p>Hello <b>World</b></p>");
//! let xml = htmldocx::serialize(&blocks);
//! assert!(xml.contains("<w:b/>"));
//! ```

mod classifier;
mod context;
pub mod document;
mod expressions;
mod grid;
#[cfg(feature = "html")]
pub mod html;
pub mod loader;
pub mod memory;
pub mod node;
pub mod numbering;
pub mod options;
mod service;
pub mod style;
mod utilities;

pub use document::{NoteKind, NumberingStore, StyleCatalog, StyleKind, TargetDocument};
#[cfg(feature = "html")]
pub use html::parse_html;
pub use htmldocx_core::*;
pub use loader::{CachingLoader, DefaultLoader, Resource, ResourceLoader};
pub use memory::MemoryDocument;
pub use node::{Node, NodeRef, NodeType};
pub use numbering::{ListStyle, MAX_LEVEL};
pub use options::{
    BaseUri, CaptionPosition, ConversionTarget, ConvertOptions, ConvertOptionsBuilder,
    NotePosition, NumberingPolicy,
};
pub use service::HtmlConverter;

/// Error type for htmldocx operations
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid base URI: {0}")]
    InvalidBaseUri(String),

    #[error("Resource error: {0}")]
    Resource(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
