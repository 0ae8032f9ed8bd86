//! Tag name to expression constructor registry.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::expressions::{
    BlockExpression, BlockKind, Expression, HorizontalRuleExpression, ImageExpression,
    LineBreakExpression, LinkExpression, ListExpression, ListItemExpression, PhrasingExpression,
    PhrasingKind, TableExpression, TablePartExpression,
};
use crate::node::NodeRef;
use crate::utilities::is_ignored;

/// Builds the expression for an element
pub(crate) type Constructor = for<'a> fn(NodeRef<'a>) -> Expression<'a>;

static REGISTRY: Lazy<HashMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, Constructor> = HashMap::new();

    for tag in [
        "span", "b", "strong", "i", "em", "u", "ins", "s", "strike", "del", "sub", "sup", "small",
        "big", "mark", "code", "kbd", "samp", "tt", "var", "dfn", "cite", "q", "font", "bdo",
        "bdi", "time", "label", "abbr", "acronym", "data", "wbr",
    ] {
        map.insert(tag, phrasing);
    }
    map.insert("a", link);
    map.insert("img", image);
    map.insert("br", line_break);

    for tag in [
        "div", "section", "article", "main", "header", "footer", "nav", "aside", "body", "html",
        "details", "dl", "form", "fieldset", "hgroup",
    ] {
        map.insert(tag, container);
    }
    map.insert("p", paragraph);
    map.insert("address", address);
    map.insert("center", center);
    map.insert("summary", summary);
    map.insert("dt", definition_term);
    map.insert("dd", definition);
    map.insert("blockquote", quote);
    map.insert("pre", preformatted);
    map.insert("figure", figure);
    map.insert("figcaption", figure_caption);
    for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        map.insert(tag, heading);
    }
    map.insert("hr", horizontal_rule);

    for tag in ["ul", "ol", "menu", "dir"] {
        map.insert(tag, list);
    }
    map.insert("li", list_item);

    map.insert("table", table);
    for tag in ["thead", "tbody", "tfoot", "tr", "td", "th", "caption"] {
        map.insert(tag, table_part);
    }

    map
});

/// Constructor for a tag name, case-insensitive.
///
/// Ignored tags return `None`; unknown tags build a generic block.
pub(crate) fn classify(tag: &str) -> Option<Constructor> {
    let tag = tag.to_ascii_lowercase();
    if is_ignored(&tag) {
        return None;
    }
    Some(REGISTRY.get(tag.as_str()).copied().unwrap_or(container))
}

fn phrasing<'a>(node: NodeRef<'a>) -> Expression<'a> {
    let kind = PhrasingKind::from_tag(&node.tag_name());
    Expression::Phrasing(PhrasingExpression::new(node, kind))
}

fn link<'a>(node: NodeRef<'a>) -> Expression<'a> {
    Expression::Link(LinkExpression::new(node))
}

fn image<'a>(node: NodeRef<'a>) -> Expression<'a> {
    Expression::Image(ImageExpression::new(node))
}

fn line_break<'a>(_node: NodeRef<'a>) -> Expression<'a> {
    Expression::LineBreak(LineBreakExpression)
}

fn block<'a>(node: NodeRef<'a>, kind: BlockKind) -> Expression<'a> {
    Expression::Block(BlockExpression::new(node, kind))
}

fn container<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Container)
}

fn paragraph<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Paragraph)
}

fn address<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Address)
}

fn center<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Center)
}

fn summary<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Summary)
}

fn definition_term<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::DefinitionTerm)
}

fn definition<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Definition)
}

fn quote<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Quote)
}

fn preformatted<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Preformatted)
}

fn figure<'a>(node: NodeRef<'a>) -> Expression<'a> {
    block(node, BlockKind::Figure)
}

fn figure_caption<'a>(node: NodeRef<'a>) -> Expression<'a> {
    let in_figure = node.parent_tag().as_deref() == Some("figure");
    let kind = if in_figure {
        BlockKind::FigureCaption
    } else {
        BlockKind::Container
    };
    block(node, kind)
}

fn heading<'a>(node: NodeRef<'a>) -> Expression<'a> {
    let level = node
        .tag_name()
        .get(1..)
        .and_then(|n| n.parse::<u8>().ok())
        .unwrap_or(1);
    block(node, BlockKind::Heading(level))
}

fn horizontal_rule<'a>(node: NodeRef<'a>) -> Expression<'a> {
    Expression::HorizontalRule(HorizontalRuleExpression::new(node))
}

fn list<'a>(node: NodeRef<'a>) -> Expression<'a> {
    Expression::List(ListExpression::new(node))
}

fn list_item<'a>(node: NodeRef<'a>) -> Expression<'a> {
    Expression::ListItem(ListItemExpression::new(node))
}

fn table<'a>(node: NodeRef<'a>) -> Expression<'a> {
    Expression::Table(TableExpression::new(node))
}

fn table_part<'a>(node: NodeRef<'a>) -> Expression<'a> {
    Expression::TablePart(TablePartExpression::new(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn variant(tag: &str) -> Option<&'static str> {
        let node = Node::element(tag);
        let constructor = classify(tag)?;
        let name = match constructor(NodeRef::new(&node)) {
            Expression::Text(_) => "text",
            Expression::LineBreak(_) => "break",
            Expression::Phrasing(_) => "phrasing",
            Expression::Link(_) => "link",
            Expression::Image(_) => "image",
            Expression::Block(_) => "block",
            Expression::HorizontalRule(_) => "hr",
            Expression::List(_) => "list",
            Expression::ListItem(_) => "item",
            Expression::Table(_) => "table",
            Expression::TablePart(_) => "table-part",
        };
        Some(name)
    }

    #[test]
    fn test_known_tags() {
        assert_eq!(variant("strong"), Some("phrasing"));
        assert_eq!(variant("A"), Some("link"));
        assert_eq!(variant("h3"), Some("block"));
        assert_eq!(variant("OL"), Some("list"));
        assert_eq!(variant("td"), Some("table-part"));
        assert_eq!(variant("hr"), Some("hr"));
    }

    #[test]
    fn test_unknown_tags_are_blocks() {
        assert_eq!(variant("custom-widget"), Some("block"));
        assert_eq!(variant("article"), Some("block"));
    }

    #[test]
    fn test_ignored_tags() {
        assert_eq!(variant("script"), None);
        assert_eq!(variant("INPUT"), None);
        assert_eq!(variant("svg"), None);
    }
}
