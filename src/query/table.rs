use super::store::{Cell, RowSet};

const MAX_CELL_WIDTH: usize = 40;

fn clip(text: &str) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        single_line
    } else {
        let mut clipped: String = single_line.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
        clipped
    }
}

/// Renders rows as a markdown table, right-aligning numeric cells.
pub fn render_markdown(rows: &RowSet) -> String {
    if rows.columns.is_empty() {
        return String::new();
    }

    let header: Vec<String> = rows.columns.iter().map(|c| clip(c)).collect();
    let body: Vec<Vec<(String, bool)>> = rows
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| (clip(&cell.to_string()), cell.is_numeric()))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &body {
        for (i, (text, _)) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(text.chars().count());
            }
        }
    }

    let numeric_columns: Vec<bool> = (0..widths.len())
        .map(|i| {
            !body.is_empty()
                && body
                    .iter()
                    .all(|row| row.get(i).is_none_or(|(t, n)| *n || t == "NULL"))
        })
        .collect();

    let mut out = String::new();
    out.push('|');
    for (h, w) in header.iter().zip(&widths) {
        out.push_str(&format!(" {:<w$} |", h, w = *w));
    }
    out.push_str("\n|");
    for (w, numeric) in widths.iter().zip(&numeric_columns) {
        if *numeric {
            out.push_str(&format!(" {}: |", "-".repeat(w - 1)));
        } else {
            out.push_str(&format!(" {} |", "-".repeat(*w)));
        }
    }
    for row in &body {
        out.push_str("\n|");
        for (i, w) in widths.iter().enumerate() {
            let text = row.get(i).map(|(t, _)| t.as_str()).unwrap_or("");
            if numeric_columns[i] {
                out.push_str(&format!(" {:>w$} |", text, w = *w));
            } else {
                out.push_str(&format!(" {:<w$} |", text, w = *w));
            }
        }
    }
    out
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Renders rows as CSV with a header line. NULL becomes an empty field.
pub fn render_csv(rows: &RowSet) -> String {
    let mut out = String::new();
    let header: Vec<String> = rows.columns.iter().map(|c| csv_field(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in &rows.rows {
        let fields: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Cell::Null => String::new(),
                other => csv_field(&other.to_string()),
            })
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}
