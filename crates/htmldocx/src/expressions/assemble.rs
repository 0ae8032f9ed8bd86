//! Gathering interpreted output into blocks.

use htmldocx_core::{Block, Inline, Paragraph, ParagraphProperties, RunContent};

use super::Output;

/// Merge consecutive inline outputs into paragraphs and pass blocks through.
///
/// Paragraphs created here carry `own`, except that vertical spacing and page
/// breaks belong to the element as a whole: they go to its first and last
/// block instead of to every paragraph. Unless `preserve` is set, boundary
/// whitespace is normalized and paragraphs left without content are dropped.
/// Adjacent tables get an empty paragraph between them.
pub(crate) fn assemble(outputs: Vec<Output>, own: &ParagraphProperties, preserve: bool) -> Vec<Block> {
    let chunk_properties = ParagraphProperties {
        page_break_before: None,
        spacing_before: None,
        spacing_after: None,
        ..own.clone()
    };

    let mut blocks = Vec::new();
    let mut pending: Vec<Inline> = Vec::new();
    for output in outputs {
        match output {
            Output::Inline(inline) => pending.push(inline),
            Output::Block(block) => {
                flush(&mut pending, &chunk_properties, preserve, &mut blocks);
                blocks.push(block);
            }
        }
    }
    flush(&mut pending, &chunk_properties, preserve, &mut blocks);

    distribute_edges(&mut blocks, own);
    separate_tables(blocks)
}

fn flush(
    pending: &mut Vec<Inline>,
    properties: &ParagraphProperties,
    preserve: bool,
    blocks: &mut Vec<Block>,
) {
    if pending.is_empty() {
        return;
    }
    let mut paragraph = Paragraph::with_content(properties.clone(), std::mem::take(pending));
    if !preserve {
        normalize_whitespace(&mut paragraph);
    }
    if has_content(&paragraph) {
        blocks.push(Block::Paragraph(paragraph));
    }
}

fn distribute_edges(blocks: &mut [Block], own: &ParagraphProperties) {
    if let Some(Block::Paragraph(first)) = blocks.first_mut() {
        let properties = &mut first.properties;
        properties.page_break_before = properties.page_break_before.or(own.page_break_before);
        properties.spacing_before = properties.spacing_before.or(own.spacing_before);
    }
    if let Some(Block::Paragraph(last)) = blocks.last_mut() {
        let properties = &mut last.properties;
        properties.spacing_after = properties.spacing_after.or(own.spacing_after);
    }
}

fn separate_tables(blocks: Vec<Block>) -> Vec<Block> {
    let mut separated = Vec::with_capacity(blocks.len());
    for block in blocks {
        if block.is_table() && separated.last().is_some_and(Block::is_table) {
            separated.push(Block::Paragraph(Paragraph::default()));
        }
        separated.push(block);
    }
    separated
}

/// Trim spaces at the paragraph edges and around line breaks, and never
/// let one space follow another across run boundaries.
fn normalize_whitespace(paragraph: &mut Paragraph) {
    {
        let mut pieces: Vec<&mut RunContent> = paragraph
            .content
            .iter_mut()
            .flat_map(|inline| inline.runs_mut())
            .flat_map(|run| run.content.iter_mut())
            .collect();

        let mut after_space = true;
        for piece in pieces.iter_mut() {
            match &mut **piece {
                RunContent::Text(text) => {
                    if after_space {
                        let leading = text.len() - text.trim_start_matches(' ').len();
                        text.drain(..leading);
                    }
                    if !text.is_empty() {
                        after_space = text.ends_with(' ');
                    }
                }
                RunContent::Break(_) => after_space = true,
                _ => after_space = false,
            }
        }

        let mut before_break = true;
        for piece in pieces.iter_mut().rev() {
            match &mut **piece {
                RunContent::Text(text) => {
                    if before_break {
                        let kept = text.trim_end_matches(' ').len();
                        text.truncate(kept);
                    }
                    if !text.is_empty() {
                        before_break = false;
                    }
                }
                RunContent::Break(_) => before_break = true,
                _ => before_break = false,
            }
        }
    }

    for run in paragraph.content.iter_mut().flat_map(|inline| inline.runs_mut()) {
        run.content
            .retain(|piece| !matches!(piece, RunContent::Text(text) if text.is_empty()));
    }
    paragraph.content.retain_mut(|inline| match inline {
        Inline::Run(run) => !run.content.is_empty(),
        Inline::Hyperlink(link) => {
            link.runs.retain(|run| !run.content.is_empty());
            !link.runs.is_empty()
        }
        _ => true,
    });
}

fn has_content(paragraph: &Paragraph) -> bool {
    paragraph.content.iter().any(|inline| match inline {
        Inline::Run(run) => run.content.iter().any(|piece| match piece {
            RunContent::Text(text) => !text.is_empty(),
            _ => true,
        }),
        Inline::Hyperlink(link) => link.runs.iter().any(|run| !run.content.is_empty()),
        Inline::Field(_) | Inline::BookmarkStart { .. } | Inline::BookmarkEnd { .. } => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use htmldocx_core::{BreakType, Run, Table};
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Output {
        Output::Inline(Inline::Run(Run::text(value)))
    }

    fn line_break() -> Output {
        Output::Inline(Inline::Run(Run::new(
            Default::default(),
            vec![RunContent::Break(BreakType::Line)],
        )))
    }

    fn paragraphs(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .map(Paragraph::text)
            .collect()
    }

    #[test]
    fn test_single_run_trimmed() {
        let blocks = assemble(vec![text(" a b ")], &ParagraphProperties::default(), false);
        assert_eq!(blocks.len(), 1);
        let paragraph = blocks[0].as_paragraph().unwrap();
        assert_eq!(paragraph.runs().count(), 1);
        assert_eq!(paragraph.text(), "a b");
    }

    #[test]
    fn test_space_not_doubled_across_runs() {
        let blocks = assemble(
            vec![text("a "), text(" "), text(" b")],
            &ParagraphProperties::default(),
            false,
        );
        assert_eq!(paragraphs(&blocks), vec!["a b"]);
        // the blank middle run is gone
        assert_eq!(blocks[0].as_paragraph().unwrap().runs().count(), 2);
    }

    #[test]
    fn test_spaces_trimmed_around_breaks() {
        let blocks = assemble(
            vec![text("a "), line_break(), text(" b")],
            &ParagraphProperties::default(),
            false,
        );
        assert_eq!(paragraphs(&blocks), vec!["a\nb"]);
    }

    #[test]
    fn test_preserve_keeps_spaces() {
        let blocks = assemble(vec![text("  a  ")], &ParagraphProperties::default(), true);
        assert_eq!(paragraphs(&blocks), vec!["  a  "]);
    }

    #[test]
    fn test_blank_paragraphs_dropped() {
        let blocks = assemble(vec![text("   ")], &ParagraphProperties::default(), false);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_blocks_split_inline_runs() {
        let inner = Block::Paragraph(Paragraph::with_content(
            ParagraphProperties::default(),
            vec![Inline::Run(Run::text("inner"))],
        ));
        let blocks = assemble(
            vec![text("before"), Output::Block(inner), text("after")],
            &ParagraphProperties::default(),
            false,
        );
        assert_eq!(paragraphs(&blocks), vec!["before", "inner", "after"]);
    }

    #[test]
    fn test_spacing_goes_to_edges() {
        let own = ParagraphProperties {
            spacing_before: Some(120),
            spacing_after: Some(240),
            indent_left: Some(720),
            ..Default::default()
        };
        let blocks = assemble(
            vec![
                text("one"),
                Output::Block(Block::Paragraph(Paragraph::default())),
                text("two"),
            ],
            &own,
            false,
        );
        let first = blocks[0].as_paragraph().unwrap();
        let last = blocks[2].as_paragraph().unwrap();
        assert_eq!(first.properties.spacing_before, Some(120));
        assert_eq!(first.properties.spacing_after, None);
        assert_eq!(first.properties.indent_left, Some(720));
        assert_eq!(last.properties.spacing_before, None);
        assert_eq!(last.properties.spacing_after, Some(240));
    }

    #[test]
    fn test_adjacent_tables_separated() {
        let blocks = assemble(
            vec![
                Output::Block(Block::Table(Table::default())),
                Output::Block(Block::Table(Table::default())),
            ],
            &ParagraphProperties::default(),
            false,
        );
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].is_table());
        assert!(blocks[1].as_paragraph().is_some_and(Paragraph::is_empty));
        assert!(blocks[2].is_table());
    }

    #[test]
    fn test_bookmarks_keep_paragraph() {
        let blocks = assemble(
            vec![
                Output::Inline(Inline::BookmarkStart {
                    id: 1,
                    name: "top".to_string(),
                }),
                Output::Inline(Inline::BookmarkEnd { id: 1 }),
            ],
            &ParagraphProperties::default(),
            false,
        );
        assert_eq!(blocks.len(), 1);
    }
}
