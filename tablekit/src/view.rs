//! Render model produced by [`TableTemplate::render`](crate::TableTemplate::render).
//!
//! Front ends draw this; it carries no behaviour.

use crate::dialog::ConfirmDialog;
use crate::filter::FilterDraft;
use crate::header::ColumnHeader;

/// Id of the injected actions column.
pub const ACTIONS_COLUMN_ID: &str = "actions";

/// Everything needed to draw one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    /// Pluralised resource name, or empty when none was given.
    pub title: String,
    /// Label of the create button, when creating is wired.
    pub create_label: Option<String>,
    pub global_filter: String,
    pub headers: Vec<ColumnHeader>,
    pub body: TableBody,
    /// Absent while loading or on error.
    pub pagination: Option<PaginationView>,
    /// Open filter editor, if any.
    pub filter_editor: Option<FilterEditorView>,
    /// Delete confirmation, if one is pending.
    pub dialog: Option<ConfirmDialog>,
}

/// Table body.
#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Loading,
    Error(String),
    /// No rows survive the filters.
    Empty,
    Rows(Vec<RowView>),
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    /// One entry per header, actions column included.
    pub cells: Vec<String>,
    pub selected: bool,
}

/// Pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    /// `Page X of Y (Total N records)`.
    pub label: String,
    pub page_index: usize,
    pub page_count: usize,
    pub total_records: usize,
    pub can_previous: bool,
    pub can_next: bool,
}

/// Open filter editor.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEditorView {
    pub column_id: String,
    pub draft: FilterDraft,
    pub options: Vec<(String, String)>,
}
