//! Plain-text drawing of table views and sidebar panels.

use std::fmt::Write;

use partyreg_lib::cache::MutationState;
use tablekit::SidebarState;
use tablekit::TableBody;
use tablekit::TableView;

use crate::forms::Panel;

/// Widest a cell is drawn before it is cut with `…`.
const MAX_CELL: usize = 40;

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_CELL - 1).collect();
        format!("{cut}…")
    }
}

/// Draws `view` as an aligned text table.
pub fn render_table(view: &TableView) -> String {
    let mut out = String::new();
    if !view.title.is_empty() {
        let _ = writeln!(out, "{}", view.title);
    }
    if !view.global_filter.is_empty() {
        let _ = writeln!(out, "Search: {}", view.global_filter);
    }

    let headers: Vec<String> = view.headers.iter().map(|h| h.decorated_label()).collect();
    let rows = match &view.body {
        TableBody::Loading => {
            let _ = writeln!(out, "Loading...");
            return out;
        }
        TableBody::Error(message) => {
            let _ = writeln!(out, "Error: {message}");
            return out;
        }
        TableBody::Empty => Vec::new(),
        TableBody::Rows(rows) => rows
            .iter()
            .map(|r| {
                let cells: Vec<String> = r.cells.iter().map(|c| truncate(c)).collect();
                (r.selected, cells)
            })
            .collect(),
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (_, cells) in &rows {
        for (i, cell) in cells.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String], marker: char| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        format!("{marker} {}", padded.join(" | ").trim_end())
    };

    let _ = writeln!(out, "{}", line(&headers, ' '));
    let rule: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1) + 2;
    let _ = writeln!(out, "{}", "-".repeat(rule));

    if rows.is_empty() {
        let _ = writeln!(out, "  No results.");
    }
    for (selected, cells) in &rows {
        let _ = writeln!(out, "{}", line(cells, if *selected { '>' } else { ' ' }));
    }

    if let Some(pagination) = &view.pagination {
        let _ = writeln!(out, "{}", pagination.label);
    }
    if let Some(label) = &view.create_label {
        let _ = writeln!(out, "[{label}]");
    }
    if let Some(dialog) = &view.dialog {
        let _ = writeln!(out, "\n{}\n{}", dialog.title, dialog.message);
        let _ = writeln!(out, "[{}] [{}]", dialog.cancel_label, dialog.confirm_label);
    }
    out
}

/// Draws the sidebar, or nothing when it is closed.
pub fn render_sidebar(state: &SidebarState<Panel>) -> String {
    let SidebarState::Open {
        title,
        description,
        content,
        ..
    } = state
    else {
        return String::new();
    };

    let mut out = format!("{title}\n{description}\n");
    for error in content.validation.errors() {
        let _ = writeln!(out, "  {}: {}", error.field_name, error.message);
    }
    match &content.submit {
        MutationState::Pending => out.push_str("Saving...\n"),
        MutationState::Error(message) => {
            let _ = writeln!(out, "Error: {message}");
        }
        MutationState::Idle | MutationState::Success(_) => {}
    }
    out
}
