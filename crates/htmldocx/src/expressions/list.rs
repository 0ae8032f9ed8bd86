//! Numbered and bulleted lists.

use htmldocx_core::{Block, NumberingRef, Paragraph, ParagraphProperties, RunProperties};
use tracing::debug;

use super::{assemble, compose, interpret_children, Interpret, Output};
use crate::context::ParsingContext;
use crate::document::StyleKind;
use crate::node::{Node, NodeRef};
use crate::numbering::{ListDeclaration, ListStyle, NumberingMachine};

fn is_list(node: &Node) -> bool {
    matches!(node.tag_name().as_str(), "ul" | "ol" | "menu" | "dir")
}

/// Marker style a list element asks for: CSS first, then the `type`
/// attribute, then the tag default
fn declared_style(node: &Node) -> ListStyle {
    let css = node
        .style_declarations()
        .iter()
        .rev()
        .filter(|d| d.property == "list-style-type" || d.property == "list-style")
        .find_map(|d| d.value.split_whitespace().find_map(ListStyle::from_css));
    let ordered = node.tag_name() == "ol";
    css.or_else(|| node.attr("type").and_then(ListStyle::from_type_attr))
        .unwrap_or(if ordered {
            ListStyle::Decimal
        } else {
            ListStyle::Disc
        })
}

/// `ul`, `ol`, `menu`, `dir`
pub(crate) struct ListExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> ListExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }

    fn declaration(&self) -> ListDeclaration {
        let style = declared_style(self.node.node);
        let start = if self.node.tag_name() == "ol" {
            self.node.node.attr_u32("start")
        } else {
            None
        };
        let follows_same_style = self
            .node
            .previous_element_sibling()
            .is_some_and(|previous| is_list(previous) && declared_style(previous) == style);
        ListDeclaration {
            style,
            start,
            follows_same_style,
        }
    }
}

impl Interpret for ListExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let session = ctx.session();
        let machine = NumberingMachine::new(session.numbering, ctx.options().numbering);
        let scope = machine.enter(ctx.list(), self.declaration());
        debug!(
            instance = scope.instance,
            level = scope.level,
            "entered list scope"
        );

        let composed = compose(
            &self.node,
            ctx,
            StyleKind::Paragraph,
            RunProperties::default(),
            ParagraphProperties::default(),
        );
        let text = composed.text_flags(ctx.text());
        let frame = ctx.frame(composed.run, composed.paragraph);
        let inner = ctx
            .with_frame(&frame)
            .with_list(Some(scope))
            .with_text(text);

        let outputs = interpret_children(&self.node, &inner);
        assemble(outputs, &inner.paragraph_properties(), text.preserve_spaces)
            .into_iter()
            .map(Output::Block)
            .collect()
    }
}

/// `li`; outside a list it behaves like a plain block
pub(crate) struct ListItemExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> ListItemExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }
}

impl Interpret for ListItemExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let scope = ctx.list();
        let defaults = ParagraphProperties {
            style: scope.map(|_| {
                ctx.session()
                    .builtin_style("ListParagraph", StyleKind::Paragraph)
            }),
            ..Default::default()
        };
        let composed = compose(
            &self.node,
            ctx,
            StyleKind::Paragraph,
            RunProperties::default(),
            defaults,
        );
        let text = composed.text_flags(ctx.text());
        let frame = ctx.frame(composed.run, composed.paragraph);
        let inner = ctx.with_frame(&frame).with_text(text);

        let outputs = interpret_children(&self.node, &inner);
        let mut blocks = assemble(outputs, &inner.paragraph_properties(), text.preserve_spaces);

        if let Some(scope) = scope {
            let numbering = NumberingRef {
                instance: scope.instance,
                level: scope.level_index(),
            };
            match blocks.first_mut() {
                Some(Block::Paragraph(first)) if first.properties.numbering.is_none() => {
                    first.properties.numbering = Some(numbering);
                }
                // an item opening with a table or a nested list still gets its marker
                _ => {
                    let properties = ParagraphProperties {
                        numbering: Some(numbering),
                        ..inner.paragraph_properties()
                    };
                    blocks.insert(0, Block::Paragraph(Paragraph::new(properties)));
                }
            }
        }
        blocks.into_iter().map(Output::Block).collect()
    }
}
