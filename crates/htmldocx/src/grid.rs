//! Table grid reconciliation.
//!
//! HTML rows may declare any mix of `colspan`/`rowspan`; a WordprocessingML
//! table needs every row to cover the same number of grid columns, with
//! vertically merged regions spelled out as continuation cells. Sections
//! (`thead`, `tbody`, `tfoot`) are reconciled independently: a row span
//! never crosses a section boundary.

use std::collections::BTreeMap;

use htmldocx_core::{TableCell, TableRow, TableRowProperties, VerticalMerge};
use tracing::debug;

/// Upper bound on `colspan`, as browsers apply it
const MAX_COL_SPAN: u32 = 1000;
/// Upper bound on `rowspan`
const MAX_ROW_SPAN: u32 = 65534;

/// A source cell with its declared spans
#[derive(Debug, Clone)]
pub struct SpanCell {
    pub col_span: u32,
    pub row_span: u32,
    pub cell: TableCell,
}

impl SpanCell {
    /// Spans of 0 are read as 1
    pub fn new(col_span: u32, row_span: u32, cell: TableCell) -> Self {
        Self {
            col_span: col_span.clamp(1, MAX_COL_SPAN),
            row_span: row_span.clamp(1, MAX_ROW_SPAN),
            cell,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceRow {
    pub properties: TableRowProperties,
    pub cells: Vec<SpanCell>,
}

/// Reconciled rows, every one `column_count` columns wide
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub column_count: usize,
    pub rows: Vec<TableRow>,
}

/// A vertical merge still running into following rows
#[derive(Debug, Clone, Copy)]
struct OpenSpan {
    remaining: u32,
    col_span: u32,
}

/// Widest row of a section, counting cells spanning down from rows above.
///
/// Row spans are truncated at the end of the section.
fn section_width(rows: &[SourceRow]) -> usize {
    let mut widths = vec![0usize; rows.len()];
    for (i, row) in rows.iter().enumerate() {
        for cell in &row.cells {
            let span = cell.col_span as usize;
            let last = (i + cell.row_span as usize).min(rows.len());
            for width in &mut widths[i..last] {
                *width += span;
            }
        }
    }
    widths.into_iter().max().unwrap_or(0)
}

/// Reconcile sections into a uniform grid.
///
/// Returns `None` when no row has any cell.
pub fn reconcile(sections: Vec<Vec<SourceRow>>) -> Option<Grid> {
    let column_count = sections.iter().map(|s| section_width(s)).max().unwrap_or(0);
    if column_count == 0 {
        return None;
    }

    let mut rows = Vec::new();
    for section in sections {
        let section_len = section.len();
        let mut open: BTreeMap<usize, OpenSpan> = BTreeMap::new();
        for (index, row) in section.into_iter().enumerate() {
            let rows_left = (section_len - index - 1) as u32;
            let (cells, next_open) = reconcile_row(row.cells, open, column_count, rows_left);
            open = next_open;
            if cells.is_empty() {
                debug!(index, "dropping table row without cells");
                continue;
            }
            rows.push(TableRow {
                properties: row.properties,
                cells,
            });
        }
    }

    if rows.is_empty() {
        return None;
    }
    Some(Grid { column_count, rows })
}

/// Emit one row: real cells interleaved with continuations of spans from
/// above, padded with a filler to `column_count`.
fn reconcile_row(
    source: Vec<SpanCell>,
    carried: BTreeMap<usize, OpenSpan>,
    column_count: usize,
    rows_left: u32,
) -> (Vec<TableCell>, BTreeMap<usize, OpenSpan>) {
    let mut pending: Vec<(usize, OpenSpan)> = carried.into_iter().rev().collect();
    let mut next_open = BTreeMap::new();
    let mut cells = Vec::new();
    let mut cursor = 0usize;

    for mut source_cell in source {
        while let Some(&(column, span)) = pending.last() {
            if column > cursor {
                break;
            }
            pending.pop();
            continue_span(column, span, &mut cursor, &mut cells, &mut next_open);
        }

        let row_span = source_cell.row_span.min(rows_left + 1);
        if row_span > 1 {
            source_cell.cell.properties.vertical_merge = Some(VerticalMerge::Restart);
            // registered for the rows below only; this row is already past it
            next_open.insert(
                cursor,
                OpenSpan {
                    remaining: row_span - 1,
                    col_span: source_cell.col_span,
                },
            );
        }
        source_cell.cell.properties.grid_span = source_cell.col_span;
        cursor += source_cell.col_span as usize;
        cells.push(source_cell.cell);
    }

    while let Some((column, span)) = pending.pop() {
        if column > cursor {
            let still_needed: usize = pending
                .iter()
                .map(|(_, s)| s.col_span as usize)
                .sum::<usize>()
                + span.col_span as usize;
            let gap = (column - cursor).min(column_count.saturating_sub(cursor + still_needed));
            if gap > 0 {
                cells.push(TableCell::filler(gap as u32));
                cursor += gap;
            }
        }
        continue_span(column, span, &mut cursor, &mut cells, &mut next_open);
    }

    if !cells.is_empty() && cursor < column_count {
        cells.push(TableCell::filler((column_count - cursor) as u32));
    }
    (cells, next_open)
}

fn continue_span(
    column: usize,
    span: OpenSpan,
    cursor: &mut usize,
    cells: &mut Vec<TableCell>,
    next_open: &mut BTreeMap<usize, OpenSpan>,
) {
    cells.push(TableCell::continuation(span.col_span));
    if span.remaining > 1 {
        next_open.insert(
            column,
            OpenSpan {
                remaining: span.remaining - 1,
                col_span: span.col_span,
            },
        );
    }
    *cursor += span.col_span as usize;
}
