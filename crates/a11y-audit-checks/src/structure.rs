//! Document-structure checks: table headers and heading outline.

use a11y_audit_core::utils::{has_role, heading_level, id_refs, is_presentational, word_count};
use a11y_audit_core::{CheckError, ElementRef, FnCheck, NodeId, ScanContext, Verdict};
use std::collections::HashSet;

/// Default word count above which content must contain a heading.
pub const DEFAULT_MIN_WORDS: usize = 400;

/// Upper bounds the HTML table model places on spans.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// One `td`/`th` cell placed on the table grid.
#[derive(Debug, Clone)]
struct Cell<'a> {
    element: ElementRef<'a>,
    header: bool,
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
}

/// The slot grid of a table after `rowspan`/`colspan` expansion.
///
/// Each slot holds the index of the cell covering it.
#[derive(Debug)]
struct TableGrid<'a> {
    cells: Vec<Cell<'a>>,
    slots: Vec<Vec<Option<usize>>>,
}

impl<'a> TableGrid<'a> {
    fn build(table: ElementRef<'a>) -> Self {
        let rows = table_rows(table);
        let mut grid = Self {
            cells: Vec::new(),
            slots: vec![Vec::new(); rows.len()],
        };

        for (row_index, row) in rows.iter().enumerate() {
            let mut col = 0;
            for cell in row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| matches!(el.value().name(), "td" | "th"))
            {
                while grid.slot(row_index, col).is_some() {
                    col += 1;
                }
                let cols = span(cell, "colspan", MAX_COLSPAN);
                let remaining = rows.len() - row_index;
                let rows_spanned = match span_attr(cell, "rowspan") {
                    Some(0) => remaining,
                    Some(n) => n.min(MAX_ROWSPAN).min(remaining),
                    None => 1,
                };

                let index = grid.cells.len();
                grid.cells.push(Cell {
                    element: cell,
                    header: is_header_cell(cell),
                    row: row_index,
                    col,
                    rows: rows_spanned,
                    cols,
                });
                for r in row_index..row_index + rows_spanned {
                    for c in col..col + cols {
                        grid.occupy(r, c, index);
                    }
                }
                col += cols;
            }
        }
        grid
    }

    fn slot(&self, row: usize, col: usize) -> Option<usize> {
        self.slots.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    fn occupy(&mut self, row: usize, col: usize, cell: usize) {
        let row = &mut self.slots[row];
        if row.len() <= col {
            row.resize(col + 1, None);
        }
        row[col] = Some(cell);
    }

    fn has_headers(&self) -> bool {
        self.cells.iter().any(|c| c.header)
    }

    fn header_in_columns(&self, cell: &Cell<'_>) -> bool {
        (cell.col..cell.col + cell.cols).all(|c| {
            self.slots
                .iter()
                .any(|row| row.get(c).copied().flatten().is_some_and(|i| self.cells[i].header))
        })
    }

    fn header_in_rows(&self, cell: &Cell<'_>) -> bool {
        (cell.row..cell.row + cell.rows).all(|r| {
            self.slots[r]
                .iter()
                .flatten()
                .any(|&i| self.cells[i].header)
        })
    }

    /// Header cell elements of this table, by `id`.
    fn header_ids(&self) -> HashSet<&'a str> {
        self.cells
            .iter()
            .filter(|c| c.header)
            .filter_map(|c| c.element.value().id())
            .collect()
    }

    /// Returns true if every data cell is associated with a header.
    fn fully_associated(&self) -> bool {
        let header_ids = self.header_ids();
        self.cells.iter().filter(|c| !c.header).all(|cell| {
            let explicit = id_refs(cell.element, "headers");
            if explicit.is_empty() {
                self.header_in_columns(cell) || self.header_in_rows(cell)
            } else {
                explicit.iter().all(|id| header_ids.contains(id))
            }
        })
    }
}

/// Rows belonging to `table` itself, not to nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> Option<usize> {
    cell.value().attr(name)?.trim().parse().ok()
}

fn span(cell: ElementRef<'_>, name: &str, max: usize) -> usize {
    span_attr(cell, name).unwrap_or(1).clamp(1, max)
}

fn is_header_cell(cell: ElementRef<'_>) -> bool {
    cell.value().name() == "th" || has_role(cell, "columnheader") || has_role(cell, "rowheader")
}

fn table_headers_complete(
    element: ElementRef<'_>,
    _: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    if element.value().name() != "table" || is_presentational(element) {
        return Ok(Verdict::Inapplicable);
    }
    let grid = TableGrid::build(element);
    if grid.cells.iter().all(|c| c.header) {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(grid.has_headers() && grid.fully_associated()))
}

fn heading_sequential(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(level) = heading_level(element) else {
        return Ok(Verdict::Inapplicable);
    };
    let previous = ctx.headings().previous_level(element.id());
    Ok(Verdict::from_pass(
        previous.map_or(true, |prev| level <= prev.saturating_add(1)),
    ))
}

fn long_content_has_headings(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let min_words = ctx.option_usize("min_words", DEFAULT_MIN_WORDS)?;
    let words = word_count(&ctx.visibility().visible_text(element));
    if words <= min_words {
        return Ok(Verdict::Inapplicable);
    }
    let in_scope = |node: NodeId| element.descendants().any(|d| d.id() == node);
    let found = ctx.headings().headings().iter().any(|(node, _)| in_scope(*node));
    Ok(Verdict::from_pass(found))
}

/// Every data cell is covered by a header.
pub const TABLE_HEADERS_COMPLETE: FnCheck = FnCheck::new(
    "table_headers_complete",
    "Every data cell is associated with a header cell",
    table_headers_complete,
);

/// Heading levels never skip downward.
pub const HEADING_SEQUENTIAL: FnCheck = FnCheck::new(
    "heading_sequential",
    "Heading is at most one level deeper than the previous heading",
    heading_sequential,
);

/// Long content is broken up by headings.
pub const LONG_CONTENT_HAS_HEADINGS: FnCheck = FnCheck::new(
    "long_content_has_headings",
    "Content longer than min_words contains a heading",
    long_content_has_headings,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{verdict, verdicts};

    fn table(html: &str) -> Verdict {
        verdict(html, "table", &TABLE_HEADERS_COMPLETE)
    }

    #[test]
    fn table_without_headers_fails() {
        assert_eq!(table("<table><tr><td>1</td><td>2</td></tr></table>"), Verdict::Fail);
    }

    #[test]
    fn column_headers_cover_data() {
        assert_eq!(
            table(
                "<table><thead><tr><th>Name</th><th>Age</th></tr></thead>
                 <tbody><tr><td>Ann</td><td>30</td></tr></tbody></table>"
            ),
            Verdict::Pass
        );
    }

    #[test]
    fn fewer_headers_than_data_columns_fails() {
        assert_eq!(
            table("<table><tr><th>Name</th></tr><tr><td>Ann</td><td>30</td></tr></table>"),
            Verdict::Fail
        );
    }

    #[test]
    fn colspan_header_covers_spanned_columns() {
        assert_eq!(
            table(
                "<table><tr><th colspan=\"2\">Range</th></tr>
                 <tr><td>1</td><td>9</td></tr></table>"
            ),
            Verdict::Pass
        );
    }

    #[test]
    fn rowspan_row_header_covers_spanned_rows() {
        assert_eq!(
            table(
                "<table>
                   <tr><th rowspan=\"2\">Q1</th><td>a</td></tr>
                   <tr><td>b</td></tr>
                   <tr><td>c</td><td>d</td></tr>
                 </table>"
            ),
            // Row 3 has no row header and column 2 has none either.
            Verdict::Fail
        );
        assert_eq!(
            table(
                "<table>
                   <tr><th rowspan=\"2\">Q1</th><td>a</td></tr>
                   <tr><td>b</td></tr>
                 </table>"
            ),
            Verdict::Pass
        );
    }

    #[test]
    fn explicit_headers_attribute() {
        let html = "<table>
            <tr><th id=\"h1\">A</th><th id=\"h2\">B</th></tr>
            <tr><td headers=\"h1\">1</td><td headers=\"h2 missing\">2</td></tr>
        </table>";
        assert_eq!(table(html), Verdict::Fail);
        let fixed = html.replace(" missing", "");
        assert_eq!(table(&fixed), Verdict::Pass);
    }

    #[test]
    fn aria_header_roles_and_layout_tables() {
        assert_eq!(
            table("<table><tr><td role=\"columnheader\">A</td></tr><tr><td>1</td></tr></table>"),
            Verdict::Pass
        );
        assert_eq!(
            table("<table role=\"presentation\"><tr><td>1</td></tr></table>"),
            Verdict::Inapplicable
        );
    }

    #[test]
    fn nested_tables_are_evaluated_separately() {
        let html = "<table><tr><th>Outer</th></tr><tr><td>
            <table><tr><td>inner</td></tr></table>
        </td></tr></table>";
        assert_eq!(
            verdicts(html, "table", &TABLE_HEADERS_COMPLETE),
            vec![Verdict::Pass, Verdict::Fail]
        );
    }

    #[test]
    fn heading_levels_must_not_skip() {
        let html = "<h1>A</h1><h2>B</h2><h4>C</h4><h2>D</h2><div role=\"heading\" aria-level=\"3\">E</div>";
        assert_eq!(
            verdicts(html, "h1, h2, h3, h4, h5, h6, [role=heading]", &HEADING_SEQUENTIAL),
            vec![Verdict::Pass, Verdict::Pass, Verdict::Fail, Verdict::Pass, Verdict::Pass]
        );
    }

    #[test]
    fn hidden_headings_do_not_count_in_the_outline() {
        let html = "<h1>A</h1><h2 hidden>B</h2><h3>C</h3>";
        assert_eq!(
            verdicts(html, "h3", &HEADING_SEQUENTIAL),
            vec![Verdict::Fail]
        );
    }

    #[test]
    fn long_content_needs_a_heading() {
        let words = "word ".repeat(DEFAULT_MIN_WORDS + 1);
        assert_eq!(
            verdict(&format!("<body><p>{words}</p></body>"), "body", &LONG_CONTENT_HAS_HEADINGS),
            Verdict::Fail
        );
        assert_eq!(
            verdict(
                &format!("<body><h2>Intro</h2><p>{words}</p></body>"),
                "body",
                &LONG_CONTENT_HAS_HEADINGS
            ),
            Verdict::Pass
        );
        assert_eq!(
            verdict("<body><p>short</p></body>", "body", &LONG_CONTENT_HAS_HEADINGS),
            Verdict::Inapplicable
        );
    }
}
