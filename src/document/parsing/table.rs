//! Table grid resolution
//!
//! Word stores tables row by row with merged cells folded away: a horizontal
//! merge is one `w:tc` carrying `w:gridSpan`, a vertical merge is a run of
//! `w:tc` elements whose `w:vMerge` continues the cell above. This module
//! unfolds both into a rectangular grid where every position points back at
//! the `w:tc` that owns it.

use std::collections::HashMap;

use crate::ooxml::XmlElement;

/// Widest grid Word produces; bounds spans when `w:tblGrid` is missing.
const MAX_GRID_COLUMNS: usize = 63;

/// Location of a `w:tc` inside its table (0-based `w:tr` / `w:tc` indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub row: usize,
    pub cell: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableGrid {
    /// One entry per grid column; `None` for positions skipped by `w:gridBefore`
    /// or `w:gridAfter`
    pub rows: Vec<Vec<Option<CellPosition>>>,
    pub column_count: usize,
}

impl TableGrid {
    pub fn position(&self, row: usize, col: usize) -> Option<CellPosition> {
        self.rows.get(row)?.get(col).copied().flatten()
    }

    /// Number of grid positions covered by each cell.
    pub fn span_counts(&self) -> HashMap<CellPosition, usize> {
        let mut counts = HashMap::new();
        for position in self.rows.iter().flatten().flatten() {
            *counts.entry(*position).or_insert(0) += 1;
        }
        counts
    }
}

/// Resolve the grid of a `w:tbl` element.
pub(crate) fn build_grid(tbl: &XmlElement) -> TableGrid {
    let declared_columns = tbl
        .child("w:tblGrid")
        .map(|grid| grid.children_named("w:gridCol").count())
        .unwrap_or(0);

    // Spans and skips come from the file; none may reach past the grid
    let limit = if declared_columns > 0 {
        declared_columns
    } else {
        MAX_GRID_COLUMNS
    };
    let room = |used: usize| limit.saturating_sub(used);

    let mut rows: Vec<Vec<Option<CellPosition>>> = Vec::new();
    for (row_index, tr) in tbl.children_named("w:tr").enumerate() {
        let mut slots: Vec<Option<CellPosition>> = Vec::new();
        slots.extend(std::iter::repeat_n(None, row_skip(tr, "w:gridBefore").min(room(0))));

        for (cell_index, tc) in tr.children_named("w:tc").enumerate() {
            let own = CellPosition {
                row: row_index,
                cell: cell_index,
            };
            let origin = if continues_vertical_merge(tc) {
                let column = slots.len();
                rows.last()
                    .and_then(|above| above.get(column).copied().flatten())
                    .unwrap_or(own)
            } else {
                own
            };
            let span = grid_span(tc).min(room(slots.len()).max(1));
            slots.extend(std::iter::repeat_n(Some(origin), span));
        }

        let after = row_skip(tr, "w:gridAfter").min(room(slots.len()));
        slots.extend(std::iter::repeat_n(None, after));
        rows.push(slots);
    }

    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
    let column_count = if declared_columns > 0 {
        declared_columns
    } else {
        widest
    };

    TableGrid { rows, column_count }
}

fn grid_span(tc: &XmlElement) -> usize {
    tc.find_path(&["w:tcPr", "w:gridSpan"])
        .and_then(|span| span.attr("w:val"))
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

fn continues_vertical_merge(tc: &XmlElement) -> bool {
    match tc.find_path(&["w:tcPr", "w:vMerge"]) {
        Some(merge) => merge.attr("w:val") != Some("restart"),
        None => false,
    }
}

fn row_skip(tr: &XmlElement, name: &str) -> usize {
    tr.find_path(&["w:trPr", name])
        .and_then(|skip| skip.attr("w:val"))
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(0)
}
