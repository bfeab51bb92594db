//! Per-column header affordances.

use crate::sort::SortDirection;

/// An action offered by a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    SortAscending,
    SortDescending,
    /// Offered when the column has an active filter.
    ClearFilter,
    /// Offered when the column is filterable and unfiltered; opens the editor.
    AddFilter,
}

impl HeaderAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::SortAscending => "Sort ascending",
            Self::SortDescending => "Sort descending",
            Self::ClearFilter => "Clear filter",
            Self::AddFilter => "Add filter",
        }
    }
}

/// Header state for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub column_id: String,
    pub label: String,
    pub sortable: bool,
    pub filterable: bool,
    /// Direction and precedence if the column is part of the sort.
    pub sort: Option<(usize, SortDirection)>,
    pub filter_active: bool,
}

impl ColumnHeader {
    /// Actions the header menu offers, in display order.
    pub fn actions(&self) -> Vec<HeaderAction> {
        let mut actions = Vec::with_capacity(3);
        if self.sortable {
            actions.push(HeaderAction::SortAscending);
            actions.push(HeaderAction::SortDescending);
        }
        if self.filterable {
            actions.push(if self.filter_active {
                HeaderAction::ClearFilter
            } else {
                HeaderAction::AddFilter
            });
        }
        actions
    }

    /// Label with sort indicator and filter marker, e.g. `Date ▼ *`.
    pub fn decorated_label(&self) -> String {
        let mut label = self.label.clone();
        if let Some((_, direction)) = self.sort {
            label.push(' ');
            label.push_str(direction.indicator());
        }
        if self.filter_active {
            label.push_str(" *");
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(sortable: bool, filterable: bool, filter_active: bool) -> ColumnHeader {
        ColumnHeader {
            column_id: "date".into(),
            label: "Date".into(),
            sortable,
            filterable,
            sort: None,
            filter_active,
        }
    }

    #[test]
    fn test_filter_action_depends_on_state() {
        assert_eq!(
            header(true, true, false).actions(),
            vec![
                HeaderAction::SortAscending,
                HeaderAction::SortDescending,
                HeaderAction::AddFilter
            ]
        );
        assert_eq!(
            header(false, true, true).actions(),
            vec![HeaderAction::ClearFilter]
        );
        assert!(header(false, false, false).actions().is_empty());
    }

    #[test]
    fn test_decorated_label() {
        let mut h = header(true, true, true);
        h.sort = Some((0, SortDirection::Desc));
        assert_eq!(h.decorated_label(), "Date ▼ *");
    }
}
