//! Plain-text tables for terminal output.

use sheetport_core::display::{display_cell, display_progress, display_timestamp};
use sheetport_core::job::JobRecord;
use sheetport_core::models::{ImportJob, ImportRow, SavedQuery};
use sheetport_core::types::Row;

/// Cells wider than this are cut and end in an ellipsis.
const MAX_CELL_WIDTH: usize = 48;

/// Render `rows` under `headers` as an aligned, pipe-separated table.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| fit(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

pub fn jobs(jobs: &[JobRecord]) -> String {
    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|job| {
            vec![
                job.id.clone(),
                job.filename.clone().unwrap_or_default(),
                job.status.clone().unwrap_or_else(|| "-".to_string()),
                display_progress(job.processed, job.total),
                job.percent().map(|p| format!("{p}%")).unwrap_or_default(),
                job.error_message.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(&["Job", "File", "Status", "Progress", "%", "Error"], &rows)
}

pub fn imports(imports: &[ImportJob]) -> String {
    let rows: Vec<Vec<String>> = imports
        .iter()
        .map(|job| {
            vec![
                job.id.clone(),
                job.filename.clone(),
                job.status.clone(),
                display_progress(job.processed_rows, job.total_rows),
                display_timestamp(job.created_at.as_deref()),
                display_timestamp(job.updated_at.as_deref()),
            ]
        })
        .collect();
    table(&["ID", "File", "Status", "Rows", "Created", "Updated"], &rows)
}

pub fn import_rows(rows: &[ImportRow]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| vec![row.row_index.to_string(), display_cell(Some(&row.data))])
        .collect();
    table(&["Row", "Data"], &rows)
}

pub fn queries(queries: &[SavedQuery]) -> String {
    let rows: Vec<Vec<String>> = queries
        .iter()
        .map(|q| {
            vec![
                q.id.to_string(),
                q.name.clone(),
                display_timestamp(q.updated_at.as_deref()),
            ]
        })
        .collect();
    table(&["ID", "Name", "Updated"], &rows)
}

/// Result grid of a query run. Without reported columns, the keys of the
/// first row are used in the order the backend sent them.
pub fn results(columns: &[String], rows: &[Row]) -> String {
    let columns: Vec<String> = if columns.is_empty() {
        rows.first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        columns.to_vec()
    };

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| display_cell(row.get(c))).collect())
        .collect();
    let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
    table(&headers, &cells)
}

// ---- private helpers ----

/// Collapse whitespace (pretty-printed JSON included) onto one line and cap
/// the width.
fn fit(cell: &str) -> String {
    let flat = cell.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut cut: String = flat.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('\u{2026}');
    cut
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}
