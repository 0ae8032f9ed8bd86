//! Text leaves and line breaks.

use htmldocx_core::{BreakType, Inline, Run, RunContent};

use super::{Interpret, Output};
use crate::classifier::classify;
use crate::context::ParsingContext;
use crate::node::{Node, NodeRef};
use crate::utilities::{collapse_whitespace, is_blank, is_block};

pub(crate) struct TextExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> TextExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }

    /// A whitespace-only text node between two inline siblings still
    /// separates them by one space
    fn separates_inline_siblings(&self) -> bool {
        match self.node.adjacent_siblings() {
            (Some(before), Some(after)) => is_inline(before) && is_inline(after),
            _ => false,
        }
    }
}

fn is_inline(node: &Node) -> bool {
    if node.is_text() {
        return true;
    }
    if !node.is_element() {
        return false;
    }
    let tag = node.tag_name();
    !is_block(&tag) && classify(&tag).is_some()
}

/// Split preformatted text into text, tab and line break pieces
fn preformatted_content(text: &str, collapse_spaces: bool) -> Vec<RunContent> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut content = Vec::new();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            content.push(RunContent::Break(BreakType::Line));
        }
        let line = if collapse_spaces {
            collapse_whitespace(line)
        } else {
            line.to_string()
        };
        for (i, piece) in line.split('\t').enumerate() {
            if i > 0 {
                content.push(RunContent::Tab);
            }
            if !piece.is_empty() {
                content.push(RunContent::Text(piece.to_string()));
            }
        }
    }
    content
}

impl Interpret for TextExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let raw = self.node.node.node_value.as_deref().unwrap_or("");
        if raw.is_empty() {
            return Vec::new();
        }
        let flags = ctx.text();

        let content = if flags.preserve_breaks {
            preformatted_content(raw, !flags.preserve_spaces)
        } else if is_blank(raw) {
            if !self.separates_inline_siblings() {
                return Vec::new();
            }
            vec![RunContent::Text(" ".to_string())]
        } else if flags.preserve_spaces {
            vec![RunContent::Text(raw.replace(['\n', '\r'], " "))]
        } else {
            vec![RunContent::Text(collapse_whitespace(raw))]
        };
        if content.is_empty() {
            return Vec::new();
        }

        let run = Run::new(ctx.run_properties(), content);
        vec![Output::Inline(Inline::Run(run))]
    }
}

/// `<br>`
pub(crate) struct LineBreakExpression;

impl Interpret for LineBreakExpression {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let run = Run::new(
            ctx.run_properties(),
            vec![RunContent::Break(BreakType::Line)],
        );
        vec![Output::Inline(Inline::Run(run))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preformatted_content() {
        assert_eq!(
            preformatted_content("  a\nb\tc  ", false),
            vec![
                RunContent::Text("  a".to_string()),
                RunContent::Break(BreakType::Line),
                RunContent::Text("b".to_string()),
                RunContent::Tab,
                RunContent::Text("c  ".to_string()),
            ]
        );
    }

    #[test]
    fn test_pre_line_collapses_spaces() {
        assert_eq!(
            preformatted_content("a   b\r\nc", true),
            vec![
                RunContent::Text("a b".to_string()),
                RunContent::Break(BreakType::Line),
                RunContent::Text("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_inline_detection() {
        assert!(is_inline(&Node::text("x")));
        assert!(is_inline(&Node::element("b")));
        assert!(!is_inline(&Node::element("div")));
        assert!(!is_inline(&Node::element("script")));
    }
}
