//! CDP-style DOM Node structure consumed by the converter.
//!
//! Any parser (html5ever, CDP, etc.) can convert its output to this structure.
//! Nodes are read-only during conversion; [`NodeRef`] adds the parent and
//! sibling navigation needed by lookahead rules.

use crate::style::{parse_declarations, Declaration};

/// Node types matching DOM nodeType values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element node (nodeType = 1)
    Element = 1,
    /// Text node (nodeType = 3)
    Text = 3,
    /// Comment node (nodeType = 8)
    Comment = 8,
    /// Document node (nodeType = 9)
    Document = 9,
    /// Document fragment node (nodeType = 11)
    DocumentFragment = 11,
}

impl From<u32> for NodeType {
    fn from(value: u32) -> Self {
        match value {
            3 => NodeType::Text,
            8 => NodeType::Comment,
            9 => NodeType::Document,
            11 => NodeType::DocumentFragment,
            _ => NodeType::Element,
        }
    }
}

/// A DOM node following the CDP DOM.Node structure.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node type (1 = Element, 3 = Text, etc.)
    pub node_type: NodeType,

    /// Node name (uppercase for elements, "#text" for text nodes)
    pub node_name: String,

    /// Text content for text nodes
    pub node_value: Option<String>,

    /// Attributes as flat array [name, value, name, value, ...] (CDP style)
    pub attributes: Option<Vec<String>>,

    /// Child nodes
    pub children: Option<Vec<Node>>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            node_name: tag_name.to_uppercase(),
            node_value: None,
            attributes: Some(Vec::new()),
            children: Some(Vec::new()),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let flat_attrs: Vec<String> = attrs
            .into_iter()
            .flat_map(|(k, v)| [k.to_string(), v.to_string()])
            .collect();

        Self {
            attributes: Some(flat_attrs),
            ..Self::element(tag_name)
        }
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            node_name: "#text".to_string(),
            node_value: Some(content.to_string()),
            attributes: None,
            children: None,
        }
    }

    /// Create a document fragment node
    pub fn document_fragment() -> Self {
        Self {
            node_type: NodeType::DocumentFragment,
            node_name: "#document-fragment".to_string(),
            node_value: None,
            attributes: None,
            children: Some(Vec::new()),
        }
    }

    /// Builder-style child insertion
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get the tag name (lowercase)
    pub fn tag_name(&self) -> String {
        self.node_name.to_lowercase()
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        let attrs = self.attributes.as_ref()?;
        attrs
            .chunks_exact(2)
            .find(|pair| pair[0].eq_ignore_ascii_case(name))
            .map(|pair| pair[1].as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Parse an integer attribute, e.g. `colspan` or `start`
    pub fn attr_u32(&self, name: &str) -> Option<u32> {
        self.attr(name)?.trim().parse().ok()
    }

    /// Whitespace-separated entries of the `class` attribute
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Declarations of the inline `style` attribute, in source order
    pub fn style_declarations(&self) -> Vec<Declaration> {
        self.attr("style").map(parse_declarations).unwrap_or_default()
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().flat_map(|c| c.iter())
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let attrs = self.attributes.get_or_insert_with(Vec::new);
        if let Some(pair) = attrs
            .chunks_exact_mut(2)
            .find(|pair| pair[0].eq_ignore_ascii_case(name))
        {
            pair[1] = value.to_string();
            return;
        }
        attrs.push(name.to_string());
        attrs.push(value.to_string());
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self.node_type {
            NodeType::Text => self.node_value.clone().unwrap_or_default(),
            _ => self.children().map(|child| child.text_content()).collect(),
        }
    }
}

/// A reference to a node with parent context.
///
/// Parents are borrowed, never owned, so the chain is acyclic.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a NodeRef<'a>>,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Create a root NodeRef without parent context
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    /// Reference to the `index`-th child of `parent`
    pub fn child_of(parent: &'a NodeRef<'a>, node: &'a Node, index: usize) -> Self {
        Self {
            node,
            parent: Some(parent),
            index,
        }
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<String> {
        self.parent.map(|p| p.tag_name())
    }

    fn siblings(&self) -> Option<&'a [Node]> {
        self.parent?.node.children.as_deref()
    }

    /// Nearest preceding sibling that is an element
    pub fn previous_element_sibling(&self) -> Option<&'a Node> {
        let siblings = self.siblings()?;
        siblings[..self.index.min(siblings.len())]
            .iter()
            .rev()
            .find(|n| n.is_element())
    }

    /// Nearest following sibling that is an element
    pub fn next_element_sibling(&self) -> Option<&'a Node> {
        let siblings = self.siblings()?;
        siblings
            .iter()
            .skip(self.index + 1)
            .find(|n| n.is_element())
    }

    /// Siblings immediately before and after this node, elements or not
    pub fn adjacent_siblings(&self) -> (Option<&'a Node>, Option<&'a Node>) {
        let Some(siblings) = self.siblings() else {
            return (None, None);
        };
        let before = self.index.checked_sub(1).and_then(|i| siblings.get(i));
        (before, siblings.get(self.index + 1))
    }

    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn is_text(&self) -> bool {
        self.node.is_text()
    }

    pub fn tag_name(&self) -> String {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.node.has_attr(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element() {
        let node = Node::element("div");
        assert!(node.is_element());
        assert_eq!(node.tag_name(), "div");
        assert_eq!(node.node_name, "DIV");
    }

    #[test]
    fn test_attributes() {
        let mut node =
            Node::element_with_attrs("td", vec![("colspan", " 2 "), ("CLASS", "a  b")]);
        assert_eq!(node.attr_u32("colspan"), Some(2));
        assert_eq!(node.classes(), vec!["a", "b"]);
        assert_eq!(node.attr("rowspan"), None);

        node.set_attr("colspan", "3");
        assert_eq!(node.attr_u32("colspan"), Some(3));
    }

    #[test]
    fn test_style_declarations() {
        let node = Node::element_with_attrs("p", vec![("style", "color: red; font-weight:bold")]);
        let decls = node.style_declarations();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property, "color");
        assert_eq!(decls[1].value, "bold");
    }

    #[test]
    fn test_text_content() {
        let div = Node::element("div")
            .with_child(Node::text("Hello "))
            .with_child(Node::element("span").with_child(Node::text("World")));
        assert_eq!(div.text_content(), "Hello World");
    }

    #[test]
    fn test_sibling_navigation() {
        let body = Node::element("body")
            .with_child(Node::element("hr"))
            .with_child(Node::text("\n"))
            .with_child(Node::element("h2"));
        let root = NodeRef::new(&body);
        let children = body.children.as_ref().unwrap();
        let hr = NodeRef::child_of(&root, &children[0], 0);
        let h2 = NodeRef::child_of(&root, &children[2], 2);

        assert_eq!(hr.next_element_sibling().map(|n| n.tag_name()), Some("h2".to_string()));
        assert_eq!(h2.previous_element_sibling().map(|n| n.tag_name()), Some("hr".to_string()));
        assert!(hr.previous_element_sibling().is_none());
        assert!(hr.adjacent_siblings().1.unwrap().is_text());
    }
}
