//! Generic data table.
//!
//! `TableTemplate<T>` owns a set of rows and the transient state around
//! them (sort, per-column filters, global filter, page, selection) and turns
//! that into a [`TableView`]. It performs no I/O: edits, deletes and creates
//! are handed to caller-supplied callbacks.

use std::collections::BTreeMap;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::column::Accessor;
use crate::column::ColumnDefinition;
use crate::column::FilterType;
use crate::dialog::ConfirmDialog;
use crate::dialog::PendingDelete;
use crate::filter::FilterInput;
use crate::filter::FilterValue;
use crate::header::ColumnHeader;
use crate::header::HeaderAction;
use crate::pagination::Pagination;
use crate::plural::pluralize;
use crate::selection::Selection;
use crate::sort::SortDirection;
use crate::sort::SortOrder;
use crate::value::CellValue;
use crate::value::to_searchable_text;
use crate::view::ACTIONS_COLUMN_ID;
use crate::view::FilterEditorView;
use crate::view::PaginationView;
use crate::view::RowView;
use crate::view::TableBody;
use crate::view::TableView;

/// Callback receiving the row an action was taken on.
pub type RowCallback<T> = Box<dyn FnMut(&T) + Send>;
/// Derives a string from a row (ids, delete descriptions).
pub type RowText<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Entry of the actions column menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

/// Transient UI state of a table.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub pagination: Pagination,
    pub sort: SortOrder,
    /// Column id → committed filter.
    pub filters: BTreeMap<String, FilterValue>,
    pub global_filter: String,
    /// Selected row ids.
    pub selection: Selection<String>,
}

/// A reusable table over rows of `T`.
///
/// # Example
///
/// ```
/// use tablekit::{ColumnDefinition, FilterType, TableTemplate};
///
/// #[derive(Clone)]
/// struct Location { id: i64, address: String }
///
/// let mut table = TableTemplate::new(
///     vec![ColumnDefinition::new("address", "Address", |l: &Location| l.address.clone().into())
///         .filter(FilterType::Text)],
///     |l: &Location| l.id.to_string(),
/// )
/// .resource_name("Location")
/// .with_data(vec![
///     Location { id: 1, address: "12 Rosemary St".into() },
///     Location { id: 2, address: "9 Franklin St".into() },
/// ]);
///
/// table.set_global_filter("rosemary");
/// assert_eq!(table.row_count(), 1);
/// assert_eq!(table.render().title, "Locations");
/// ```
pub struct TableTemplate<T> {
    rows: Vec<T>,
    /// Flattened lowercase text per row, same order as `rows`.
    search_index: Vec<String>,
    columns: Vec<ColumnDefinition<T>>,
    row_id: RowText<T>,
    search_value: Option<Accessor<T>>,
    resource_name: Option<String>,
    on_edit: Option<RowCallback<T>>,
    on_delete: Option<RowCallback<T>>,
    on_create_new: Option<Box<dyn FnMut() + Send>>,
    delete_description: Option<RowText<T>>,
    is_loading: bool,
    error: Option<String>,
    is_deleting: bool,
    state: TableState,
    editor: Option<FilterInput>,
    pending_delete: Option<PendingDelete<T>>,
}

impl<T: Clone> TableTemplate<T> {
    /// Creates an empty table.
    pub fn new(
        columns: Vec<ColumnDefinition<T>>,
        row_id: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            rows: Vec::new(),
            search_index: Vec::new(),
            columns,
            row_id: Arc::new(row_id),
            search_value: None,
            resource_name: None,
            on_edit: None,
            on_delete: None,
            on_create_new: None,
            delete_description: None,
            is_loading: false,
            error: None,
            is_deleting: false,
            state: TableState::default(),
            editor: None,
            pending_delete: None,
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Singular resource name, e.g. `Party`. The title is its plural.
    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    /// Fixes the page size.
    pub fn page_size(mut self, size: usize) -> Self {
        self.state.pagination = Pagination::new(size);
        self
    }

    /// Sort applied before the user touches a header.
    pub fn initial_sort(mut self, order: SortOrder) -> Self {
        self.state.sort = order;
        self
    }

    /// Value flattened for the global filter.
    ///
    /// Defaults to every column's value. Supply this to search fields that
    /// have no column.
    pub fn search_with(
        mut self,
        value: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        self.search_value = Some(Arc::new(value));
        self.rebuild_search_index();
        self
    }

    /// Enables the Edit action.
    pub fn on_edit(mut self, callback: impl FnMut(&T) + Send + 'static) -> Self {
        self.on_edit = Some(Box::new(callback));
        self
    }

    /// Enables the Delete action; `callback` runs after confirmation.
    pub fn on_delete(mut self, callback: impl FnMut(&T) + Send + 'static) -> Self {
        self.on_delete = Some(Box::new(callback));
        self
    }

    /// Enables the create button.
    pub fn on_create_new(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_create_new = Some(Box::new(callback));
        self
    }

    /// Message shown in the delete confirmation for a row.
    pub fn delete_description(
        mut self,
        describe: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        self.delete_description = Some(Arc::new(describe));
        self
    }

    pub fn with_data(mut self, rows: Vec<T>) -> Self {
        self.set_data(rows);
        self
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Replaces the rows.
    ///
    /// Selection of rows that disappeared is dropped and the page index is
    /// pulled back in range.
    pub fn set_data(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.rebuild_search_index();

        let ids: Vec<String> = self.rows.iter().map(|r| (self.row_id)(r)).collect();
        self.state.selection.retain(|id| ids.contains(id));

        let total = self.row_count();
        self.state.pagination.clamp(total);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn set_deleting(&mut self, deleting: bool) {
        self.is_deleting = deleting;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_deleting(&self) -> bool {
        self.is_deleting
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnDefinition<T>] {
        &self.columns
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    fn rebuild_search_index(&mut self) {
        self.search_index = self
            .rows
            .iter()
            .map(|row| to_searchable_text(&self.search_value_of(row)))
            .collect();
    }

    fn search_value_of(&self, row: &T) -> CellValue {
        match &self.search_value {
            Some(value) => value(row),
            None => CellValue::map(self.columns.iter().map(|c| (c.id.clone(), c.value(row)))),
        }
    }

    fn column(&self, column_id: &str) -> Option<&ColumnDefinition<T>> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    fn index_of(&self, row_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| (self.row_id)(r) == row_id)
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Sets the free-text filter and returns to the first page.
    pub fn set_global_filter(&mut self, query: impl Into<String>) {
        self.state.global_filter = query.into();
        self.state.pagination.first();
    }

    pub fn global_filter(&self) -> &str {
        &self.state.global_filter
    }

    /// Sets or clears a column filter and returns to the first page.
    ///
    /// Empty values clear the filter. Unknown columns are ignored.
    pub fn set_filter(&mut self, column_id: &str, value: Option<FilterValue>) {
        if self.column(column_id).is_none() {
            log::warn!("filter on unknown column {column_id}");
            return;
        }
        match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                self.state.filters.insert(column_id.to_string(), value);
            }
            None => {
                self.state.filters.remove(column_id);
            }
        }
        self.state.pagination.first();
    }

    pub fn clear_filter(&mut self, column_id: &str) {
        self.set_filter(column_id, None);
    }

    pub fn filter_value(&self, column_id: &str) -> Option<&FilterValue> {
        self.state.filters.get(column_id)
    }

    fn passes(&self, index: usize) -> bool {
        let query = self.state.global_filter.to_lowercase();
        if !query.is_empty() && !self.search_index[index].contains(&query) {
            return false;
        }

        let row = &self.rows[index];
        self.state.filters.iter().all(|(column_id, filter)| {
            self.column(column_id)
                .is_none_or(|column| column.matches(row, filter))
        })
    }

    // =========================================================================
    // Filter editor
    // =========================================================================

    /// Opens the filter editor for a filterable column.
    pub fn open_filter(&mut self, column_id: &str) -> bool {
        let Some(column) = self.column(column_id) else {
            return false;
        };
        let Some(filter_type) = column.filter_type else {
            return false;
        };
        self.editor = Some(FilterInput::open(
            column_id,
            filter_type,
            column.select_options.clone(),
            self.state.filters.get(column_id),
        ));
        true
    }

    pub fn filter_editor(&self) -> Option<&FilterInput> {
        self.editor.as_ref()
    }

    pub fn filter_editor_mut(&mut self) -> Option<&mut FilterInput> {
        self.editor.as_mut()
    }

    /// Edits a text filter. Text filters apply on every keystroke.
    pub fn edit_filter_text(&mut self, text: impl Into<String>) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if editor.filter_type() != FilterType::Text {
            return;
        }
        editor.set_text(text);
        let column_id = editor.column_id().to_string();
        let value = editor.value();
        self.set_filter(&column_id, value);
    }

    /// Commits the editor draft and closes the editor.
    ///
    /// An empty or invalid draft leaves the column unfiltered.
    pub fn apply_filter(&mut self) {
        if let Some(editor) = self.editor.take() {
            self.set_filter(editor.column_id(), editor.value());
        }
    }

    /// Clears the editor's column filter and closes the editor.
    pub fn clear_filter_editor(&mut self) {
        if let Some(editor) = self.editor.take() {
            self.clear_filter(editor.column_id());
        }
    }

    /// Closes the editor without touching the filter.
    pub fn close_filter_editor(&mut self) {
        self.editor = None;
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sorts by a single column. Ignored for unsortable columns.
    pub fn sort_by(&mut self, column_id: &str, direction: SortDirection) {
        if self.column(column_id).is_some_and(|c| c.sortable) {
            self.state.sort.set(column_id, direction);
        }
    }

    /// Adds a secondary sort key.
    pub fn add_sort(&mut self, column_id: &str, direction: SortDirection) {
        if self.column(column_id).is_some_and(|c| c.sortable) {
            self.state.sort.push(column_id, direction);
        }
    }

    pub fn clear_sort(&mut self) {
        self.state.sort.clear();
    }

    fn compare_rows(&self, a: &T, b: &T) -> Ordering {
        for spec in self.state.sort.specs() {
            let Some(column) = self.column(&spec.column_id) else {
                continue;
            };
            let ordering = match spec.direction {
                SortDirection::Asc => column.compare(a, b),
                SortDirection::Desc => column.compare(a, b).reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    // =========================================================================
    // Headers
    // =========================================================================

    /// Header state for each column, actions column last.
    pub fn headers(&self) -> Vec<ColumnHeader> {
        let mut headers: Vec<ColumnHeader> = self
            .columns
            .iter()
            .map(|c| ColumnHeader {
                column_id: c.id.clone(),
                label: c.header.clone(),
                sortable: c.sortable,
                filterable: c.is_filterable(),
                sort: self.state.sort.position(&c.id),
                filter_active: self.state.filters.contains_key(&c.id),
            })
            .collect();

        if self.has_actions() {
            headers.push(ColumnHeader {
                column_id: ACTIONS_COLUMN_ID.to_string(),
                label: "Actions".to_string(),
                sortable: false,
                filterable: false,
                sort: None,
                filter_active: false,
            });
        }
        headers
    }

    /// Applies a header menu action.
    pub fn apply_header_action(&mut self, column_id: &str, action: HeaderAction) {
        match action {
            HeaderAction::SortAscending => self.sort_by(column_id, SortDirection::Asc),
            HeaderAction::SortDescending => self.sort_by(column_id, SortDirection::Desc),
            HeaderAction::ClearFilter => {
                self.clear_filter(column_id);
                if self.editor.as_ref().is_some_and(|e| e.column_id() == column_id) {
                    self.editor = None;
                }
            }
            HeaderAction::AddFilter => {
                self.open_filter(column_id);
            }
        }
    }

    // =========================================================================
    // Derived rows
    // =========================================================================

    /// Indices of rows passing every filter, in sorted order.
    pub fn visible_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.rows.len()).filter(|&i| self.passes(i)).collect();
        if !self.state.sort.is_empty() {
            indices.sort_by(|&a, &b| self.compare_rows(&self.rows[a], &self.rows[b]));
        }
        indices
    }

    /// Rows passing every filter, in sorted order.
    pub fn filtered_rows(&self) -> Vec<&T> {
        self.visible_indices()
            .into_iter()
            .map(|i| &self.rows[i])
            .collect()
    }

    /// Number of rows passing every filter.
    pub fn row_count(&self) -> usize {
        (0..self.rows.len()).filter(|&i| self.passes(i)).count()
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> Vec<&T> {
        let visible = self.visible_indices();
        let range = self.state.pagination.range(visible.len());
        visible[range].iter().map(|&i| &self.rows[i]).collect()
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn page_count(&self) -> usize {
        self.state.pagination.page_count(self.row_count())
    }

    pub fn page_index(&self) -> usize {
        self.state.pagination.page_index()
    }

    pub fn first_page(&mut self) {
        self.state.pagination.first();
    }

    pub fn previous_page(&mut self) {
        self.state.pagination.previous();
    }

    pub fn next_page(&mut self) {
        let total = self.row_count();
        self.state.pagination.next(total);
    }

    pub fn last_page(&mut self) {
        let total = self.row_count();
        self.state.pagination.last(total);
    }

    pub fn go_to_page(&mut self, page_index: usize) {
        let total = self.row_count();
        self.state.pagination.go_to(page_index, total);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select_row(&mut self, row_id: &str) {
        self.state.selection.select(row_id.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.state.selection.get().map(String::as_str)
    }

    pub fn is_selected(&self, row_id: &str) -> bool {
        self.state.selection.is_selected(row_id)
    }

    /// Called when the hosting sidebar closes. Drops the edit highlight.
    pub fn on_sidebar_closed(&mut self) {
        self.clear_selection();
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Whether the actions column is shown.
    pub fn has_actions(&self) -> bool {
        self.on_edit.is_some() || self.on_delete.is_some()
    }

    /// Entries of the actions menu.
    pub fn row_actions(&self) -> Vec<RowAction> {
        let mut actions = Vec::with_capacity(2);
        if self.on_edit.is_some() {
            actions.push(RowAction::Edit);
        }
        if self.on_delete.is_some() {
            actions.push(RowAction::Delete);
        }
        actions
    }

    /// Runs a row action by row id.
    pub fn trigger(&mut self, row_id: &str, action: RowAction) -> bool {
        match action {
            RowAction::Edit => self.edit_row(row_id),
            RowAction::Delete => self.request_delete(row_id),
        }
    }

    /// Selects the row and invokes `on_edit`.
    pub fn edit_row(&mut self, row_id: &str) -> bool {
        let Some(index) = self.index_of(row_id) else {
            return false;
        };
        let Some(callback) = self.on_edit.as_mut() else {
            return false;
        };
        self.state.selection.select(row_id.to_string());
        callback(&self.rows[index]);
        true
    }

    /// Opens the delete confirmation for a row.
    pub fn request_delete(&mut self, row_id: &str) -> bool {
        if self.on_delete.is_none() {
            return false;
        }
        let Some(index) = self.index_of(row_id) else {
            return false;
        };
        let row = self.rows[index].clone();
        let message = match &self.delete_description {
            Some(describe) => describe(&row),
            None => format!(
                "Are you sure you want to delete this {}? This action cannot be undone.",
                self.resource_name
                    .as_deref()
                    .map(str::to_lowercase)
                    .unwrap_or_else(|| "item".to_string())
            ),
        };
        let title = match &self.resource_name {
            Some(name) => format!("Delete {name}"),
            None => "Delete".to_string(),
        };
        self.pending_delete = Some(PendingDelete {
            row_id: row_id.to_string(),
            row,
            dialog: ConfirmDialog::new(message).title(title).confirm_label("Delete"),
        });
        true
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete<T>> {
        self.pending_delete.as_ref()
    }

    /// Confirms the pending delete and invokes `on_delete`.
    ///
    /// Refused while a previous delete is still running.
    pub fn confirm_delete(&mut self) -> bool {
        if self.is_deleting {
            return false;
        }
        let Some(pending) = self.pending_delete.take() else {
            return false;
        };
        match self.on_delete.as_mut() {
            Some(callback) => {
                callback(&pending.row);
                true
            }
            None => false,
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Invokes `on_create_new`.
    pub fn create_new(&mut self) -> bool {
        match self.on_create_new.as_mut() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Render
    // =========================================================================

    fn actions_cell(&self) -> String {
        self.row_actions()
            .into_iter()
            .map(RowAction::label)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Builds the render model.
    pub fn render(&self) -> TableView {
        let title = self
            .resource_name
            .as_deref()
            .map(pluralize)
            .unwrap_or_default();
        let create_label = self.on_create_new.as_ref().map(|_| match &self.resource_name {
            Some(name) => format!("New {name}"),
            None => "New".to_string(),
        });

        let (body, pagination) = if self.is_loading {
            (TableBody::Loading, None)
        } else if let Some(error) = &self.error {
            (TableBody::Error(error.clone()), None)
        } else {
            let visible = self.visible_indices();
            let total = visible.len();
            let pages = &self.state.pagination;
            let actions = self.has_actions().then(|| self.actions_cell());

            let rows: Vec<RowView> = visible[pages.range(total)]
                .iter()
                .map(|&i| {
                    let row = &self.rows[i];
                    let id = (self.row_id)(row);
                    let mut cells: Vec<String> =
                        self.columns.iter().map(|c| c.render(row)).collect();
                    if let Some(actions) = &actions {
                        cells.push(actions.clone());
                    }
                    RowView {
                        selected: self.state.selection.is_selected(&id),
                        id,
                        cells,
                    }
                })
                .collect();

            let body = if rows.is_empty() {
                TableBody::Empty
            } else {
                TableBody::Rows(rows)
            };
            let pagination = PaginationView {
                label: pages.label(total),
                page_index: pages.page_index(),
                page_count: pages.page_count(total),
                total_records: total,
                can_previous: pages.can_previous(),
                can_next: pages.can_next(total),
            };
            (body, Some(pagination))
        };

        let filter_editor = self.editor.as_ref().map(|e| FilterEditorView {
            column_id: e.column_id().to_string(),
            draft: e.draft().clone(),
            options: e
                .options()
                .iter()
                .map(|o| (o.value.clone(), o.label.clone()))
                .collect(),
        });

        let dialog = self.pending_delete.as_ref().map(|p| {
            let mut dialog = p.dialog.clone();
            dialog.busy = self.is_deleting;
            dialog
        });

        TableView {
            title,
            create_label,
            global_filter: self.state.global_filter.clone(),
            headers: self.headers(),
            body,
            pagination,
            filter_editor,
            dialog,
        }
    }
}
