//! Conversion expressions.
//!
//! Every source node is wrapped in an [`Expression`] which composes its own
//! styles once, interprets its children through a child context, and returns
//! a flat list of [`Output`] nodes: inline content that the enclosing block
//! gathers into paragraphs, or finished blocks.

mod assemble;
mod block;
mod image;
mod link;
mod list;
mod phrasing;
mod table;
mod text;

pub(crate) use assemble::assemble;
pub(crate) use block::{BlockExpression, BlockKind, HorizontalRuleExpression};
pub(crate) use image::ImageExpression;
pub(crate) use link::LinkExpression;
pub(crate) use list::{ListExpression, ListItemExpression};
pub(crate) use phrasing::{PhrasingExpression, PhrasingKind};
pub(crate) use table::{TableExpression, TablePartExpression};
pub(crate) use text::{LineBreakExpression, TextExpression};

use htmldocx_core::{Block, Inline, ParagraphProperties, Run, RunContent, RunProperties};
use tracing::debug;

use crate::classifier::classify;
use crate::context::{ParsingContext, TextFlags};
use crate::document::StyleKind;
use crate::node::{NodeRef, NodeType};
use crate::style::{ElementStyle, WhiteSpace};

/// A node produced by interpretation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Output {
    Inline(Inline),
    Block(Block),
}

/// Properties an expression composed for itself
#[derive(Debug, Clone, Default)]
pub(crate) struct Composed {
    pub run: RunProperties,
    pub paragraph: ParagraphProperties,
    /// The full inline style, for geometry the caller applies itself
    pub element: ElementStyle,
    /// Catalog id of the first known class, whatever the style kind
    pub class_style: Option<String>,
}

impl Composed {
    /// Text handling for the element's content
    pub fn text_flags(&self, inherited: TextFlags) -> TextFlags {
        match self.element.white_space {
            Some(WhiteSpace::Pre) => TextFlags::PREFORMATTED,
            Some(WhiteSpace::PreLine) => TextFlags {
                preserve_breaks: true,
                preserve_spaces: false,
            },
            Some(WhiteSpace::Normal) => TextFlags::default(),
            None => inherited,
        }
    }
}

pub(crate) trait Interpret {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output>;
}

/// The closed set of expression variants
pub(crate) enum Expression<'a> {
    Text(TextExpression<'a>),
    LineBreak(LineBreakExpression),
    Phrasing(PhrasingExpression<'a>),
    Link(LinkExpression<'a>),
    Image(ImageExpression<'a>),
    Block(BlockExpression<'a>),
    HorizontalRule(HorizontalRuleExpression<'a>),
    List(ListExpression<'a>),
    ListItem(ListItemExpression<'a>),
    Table(TableExpression<'a>),
    TablePart(TablePartExpression<'a>),
}

impl Interpret for Expression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        match self {
            Expression::Text(e) => e.interpret(ctx),
            Expression::LineBreak(e) => e.interpret(ctx),
            Expression::Phrasing(e) => e.interpret(ctx),
            Expression::Link(e) => e.interpret(ctx),
            Expression::Image(e) => e.interpret(ctx),
            Expression::Block(e) => e.interpret(ctx),
            Expression::HorizontalRule(e) => e.interpret(ctx),
            Expression::List(e) => e.interpret(ctx),
            Expression::ListItem(e) => e.interpret(ctx),
            Expression::Table(e) => e.interpret(ctx),
            Expression::TablePart(e) => e.interpret(ctx),
        }
    }
}

/// Compose an element's local properties.
///
/// Precedence, lowest first: the tag defaults passed in, `lang`/`dir`, the
/// inline `style` attribute, then the first class the style catalog knows.
pub(crate) fn compose(
    node: &NodeRef<'_>,
    ctx: &ParsingContext<'_>,
    kind: StyleKind,
    mut run: RunProperties,
    mut paragraph: ParagraphProperties,
) -> Composed {
    if let Some(lang) = node.attr("lang").map(str::trim).filter(|l| !l.is_empty()) {
        run.language = Some(lang.to_string());
    }
    match node.attr("dir").map(|d| d.trim().to_ascii_lowercase()).as_deref() {
        Some("rtl") => {
            run.right_to_left = Some(true);
            paragraph.bidi = Some(true);
        }
        Some("ltr") => {
            run.right_to_left = Some(false);
            paragraph.bidi = Some(false);
        }
        _ => {}
    }

    let element = ElementStyle::from_declarations(&node.node.style_declarations());
    run.apply(&element.run);
    paragraph.apply(&element.paragraph);
    match kind {
        StyleKind::Character => {
            if element.background.is_some() {
                run.shading = element.background.clone();
            }
        }
        StyleKind::Paragraph => {
            if element.background.is_some() {
                paragraph.shading = element.background.clone();
            }
        }
        // cells and tables place their own background
        StyleKind::Table => {}
    }

    let class_style = node
        .node
        .classes()
        .into_iter()
        .find_map(|class| ctx.session().class_style(class, kind));
    match (&class_style, kind) {
        (Some(id), StyleKind::Character) => run.style = Some(id.clone()),
        (Some(id), StyleKind::Paragraph) => paragraph.style = Some(id.clone()),
        _ => {}
    }

    Composed {
        run,
        paragraph,
        element,
        class_style,
    }
}

/// A run of plain text formatted by the context's cascade
pub(crate) fn text_output(ctx: &ParsingContext<'_>, text: &str) -> Output {
    let run = Run::new(ctx.run_properties(), vec![RunContent::Text(text.to_string())]);
    Output::Inline(Inline::Run(run))
}

/// `hidden` attribute or `display: none`
pub(crate) fn is_hidden(node: &NodeRef<'_>) -> bool {
    node.has_attr("hidden")
        || ElementStyle::from_declarations(&node.node.style_declarations()).display_none
}

/// Interpret one source node
pub(crate) fn interpret_node(node: NodeRef<'_>, ctx: &ParsingContext<'_>) -> Vec<Output> {
    match node.node.node_type {
        NodeType::Text => TextExpression::new(node).interpret(ctx),
        NodeType::Element => {
            let tag = node.tag_name();
            let Some(constructor) = classify(&tag) else {
                debug!(tag, "skipping ignored element");
                return Vec::new();
            };
            if is_hidden(&node) {
                debug!(tag, "skipping hidden element");
                return Vec::new();
            }
            constructor(node).interpret(ctx)
        }
        NodeType::Document | NodeType::DocumentFragment => interpret_children(&node, ctx),
        NodeType::Comment => Vec::new(),
    }
}

/// Interpret every child of `node` in order
pub(crate) fn interpret_children(node: &NodeRef<'_>, ctx: &ParsingContext<'_>) -> Vec<Output> {
    let mut outputs = Vec::new();
    for (index, child) in node.children().enumerate() {
        outputs.extend(interpret_node(NodeRef::child_of(node, child, index), ctx));
    }
    outputs
}
