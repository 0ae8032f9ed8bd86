//! HtmlConverter - the main entry point for DOM to WordprocessingML conversion.

use std::sync::Arc;

use htmldocx_core::{Block, ParagraphProperties};
use tracing::debug;

use crate::context::{ParsingContext, PropertyBag, Session};
use crate::document::{NumberingStore, StyleCatalog, TargetDocument};
use crate::expressions::{assemble, interpret_node};
use crate::loader::{CachingLoader, DefaultLoader, ResourceLoader};
use crate::node::{Node, NodeRef};
use crate::options::ConvertOptions;

/// Converts DOM trees into blocks for one target document.
///
/// Id counters live as long as the converter, so repeated calls against the
/// same document never hand out an id twice.
pub struct HtmlConverter<'d> {
    options: ConvertOptions,
    document: &'d dyn TargetDocument,
    styles: &'d dyn StyleCatalog,
    numbering: &'d dyn NumberingStore,
    loader: Arc<dyn ResourceLoader>,
    bag: PropertyBag,
}

impl<'d> HtmlConverter<'d> {
    /// Create a converter for a document that also owns its styles and numbering
    pub fn new<D>(document: &'d D, options: ConvertOptions) -> Self
    where
        D: TargetDocument + StyleCatalog + NumberingStore,
    {
        Self::with_parts(document, document, document, options)
    }

    /// Create a converter from separate collaborators
    pub fn with_parts(
        document: &'d dyn TargetDocument,
        styles: &'d dyn StyleCatalog,
        numbering: &'d dyn NumberingStore,
        options: ConvertOptions,
    ) -> Self {
        let loader = Arc::new(CachingLoader::new(DefaultLoader::new(
            options.base_uri.clone(),
            options.fetch_timeout,
        )));
        Self {
            options,
            document,
            styles,
            numbering,
            loader,
            bag: PropertyBag::default(),
        }
    }

    /// Replace the resource loader, e.g. to share one cache between converters
    pub fn with_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Convert a DOM Node tree to blocks ready to append to the target
    pub fn convert(&self, root: &Node) -> Vec<Block> {
        let session = Session::new(
            &self.options,
            self.document,
            self.styles,
            self.numbering,
            self.loader.as_ref(),
        );
        let ctx = ParsingContext::new(&session, &self.bag);

        let outputs = interpret_node(NodeRef::new(root), &ctx);
        let blocks = assemble(outputs, &ParagraphProperties::default(), false);
        debug!(blocks = blocks.len(), "conversion finished");
        blocks
    }

    /// Parse an HTML string and convert it
    #[cfg(feature = "html")]
    pub fn convert_html(&self, html: &str) -> Vec<Block> {
        self.convert(&crate::html::parse_html(html))
    }

    /// Get the current options
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }
}
