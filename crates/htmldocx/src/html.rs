//! Builds [`Node`] trees from HTML markup with scraper.
//!
//! Hosts that already hold a DOM construct nodes directly; this covers the
//! common case of converting a markup string.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Parse HTML markup, typically a body fragment, into a [`Node`] tree.
///
/// html5ever wraps fragments in an `html` element, which the converter
/// treats as a transparent container.
///
/// ```rust
/// use htmldocx::{parse_html, ConvertOptions, HtmlConverter, MemoryDocument};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let document = MemoryDocument::new();
/// let blocks = HtmlConverter::new(&document, ConvertOptions::default()).convert(&node);
/// assert_eq!(blocks.len(), 1);
/// ```
pub fn parse_html(html: &str) -> Node {
    let fragment = Html::parse_fragment(html);
    element_node(fragment.root_element())
}

fn element_node(element: ElementRef) -> Node {
    let value = element.value();
    let mut node = Node::element_with_attrs(value.name(), value.attrs().collect());
    for child in element.children() {
        // comments, doctypes and processing instructions carry no content
        let converted = match child.value() {
            ScraperNode::Text(text) => Some(Node::text(&text.text)),
            ScraperNode::Element(_) => ElementRef::wrap(child).map(element_node),
            _ => None,
        };
        if let Some(converted) = converted {
            node.add_child(converted);
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_html() {
        let node = parse_html("<p>Hello World</p>");
        assert!(node.is_element());
        assert_eq!(node.tag_name(), "html");
        assert_eq!(node.text_content(), "Hello World");
    }

    #[test]
    fn test_parse_keeps_attributes() {
        let node = parse_html(r#"<span class="x" style="color:red">a</span>"#);
        let span = node.element_children().next().unwrap();
        assert_eq!(span.attr("class"), Some("x"));
        assert_eq!(span.style_declarations()[0].value, "red");
    }

    #[test]
    fn test_comments_dropped() {
        let node = parse_html("<p>a<!-- note -->b</p>");
        assert_eq!(node.text_content(), "ab");
    }
}
