//! Column definitions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::filter::FilterValue;
use crate::filter::default_matches;
use crate::value::CellValue;

/// Extracts a cell value from a row.
pub type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;
/// Renders a cell as display text.
pub type CellRenderer<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
/// Decides whether a row passes a column filter.
pub type FilterPredicate<T> = Arc<dyn Fn(&T, &FilterValue) -> bool + Send + Sync>;
/// Orders two rows for a column.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Which filter editor a column offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Text,
    Date,
    DateRange,
    Time,
    Select,
}

/// One entry of a select filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Value matched against the cell.
    pub value: String,
    /// Label shown in the editor.
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How a table reads, shows, filters and sorts one column of `T`.
///
/// # Example
///
/// ```
/// use tablekit::{ColumnDefinition, FilterType};
///
/// struct Student { first: String, last: String }
///
/// let name = ColumnDefinition::new("name", "Name", |s: &Student| {
///     format!("{} {}", s.first, s.last).into()
/// })
/// .filter(FilterType::Text)
/// .sort_fn(|a: &Student, b: &Student| a.last.cmp(&b.last).then(a.first.cmp(&b.first)));
/// ```
pub struct ColumnDefinition<T> {
    /// Stable identifier used for filter and sort state.
    pub id: String,
    /// Header label.
    pub header: String,
    accessor: Accessor<T>,
    cell: Option<CellRenderer<T>>,
    filter_fn: Option<FilterPredicate<T>>,
    sort_fn: Option<Comparator<T>>,
    /// Editor offered in the header, if the column is filterable.
    pub filter_type: Option<FilterType>,
    /// Options for [`FilterType::Select`].
    pub select_options: Vec<SelectOption>,
    /// Whether the header offers sort actions.
    pub sortable: bool,
}

impl<T> ColumnDefinition<T> {
    /// Creates a sortable, unfiltered column.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            cell: None,
            filter_fn: None,
            sort_fn: None,
            filter_type: None,
            select_options: Vec::new(),
            sortable: true,
        }
    }

    /// Overrides how the cell is displayed.
    pub fn cell(mut self, render: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.cell = Some(Arc::new(render));
        self
    }

    /// Makes the column filterable with the given editor.
    pub fn filter(mut self, filter_type: FilterType) -> Self {
        self.filter_type = Some(filter_type);
        self
    }

    /// Makes the column a select filter over fixed options.
    pub fn select_options(mut self, options: Vec<SelectOption>) -> Self {
        self.filter_type = Some(FilterType::Select);
        self.select_options = options;
        self
    }

    /// Replaces the default predicate for this column's filter type.
    pub fn filter_fn(
        mut self,
        predicate: impl Fn(&T, &FilterValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter_fn = Some(Arc::new(predicate));
        self
    }

    /// Replaces the default value ordering.
    pub fn sort_fn(mut self, compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.sort_fn = Some(Arc::new(compare));
        self
    }

    /// Hides the sort actions.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Returns `true` if the header should offer a filter editor.
    pub fn is_filterable(&self) -> bool {
        self.filter_type.is_some()
    }

    /// Reads the cell value for a row.
    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }

    /// Display text for a row.
    pub fn render(&self, row: &T) -> String {
        match &self.cell {
            Some(render) => render(row),
            None => self.value(row).display(),
        }
    }

    /// Applies this column's filter to a row.
    pub fn matches(&self, row: &T, filter: &FilterValue) -> bool {
        match &self.filter_fn {
            Some(predicate) => predicate(row, filter),
            None => default_matches(&self.value(row), filter),
        }
    }

    /// Orders two rows by this column, ascending.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.sort_fn {
            Some(compare) => compare(a, b),
            None => self.value(a).compare(&self.value(b)),
        }
    }
}

impl<T> Clone for ColumnDefinition<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            cell: self.cell.clone(),
            filter_fn: self.filter_fn.clone(),
            sort_fn: self.sort_fn.clone(),
            filter_type: self.filter_type,
            select_options: self.select_options.clone(),
            sortable: self.sortable,
        }
    }
}

impl<T> fmt::Debug for ColumnDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("filter_type", &self.filter_type)
            .field("select_options", &self.select_options)
            .field("sortable", &self.sortable)
            .field("custom_cell", &self.cell.is_some())
            .field("custom_filter", &self.filter_fn.is_some())
            .field("custom_sort", &self.sort_fn.is_some())
            .finish()
    }
}
