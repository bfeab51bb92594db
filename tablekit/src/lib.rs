//! Headless data tables for resource listings.
//!
//! A [`TableTemplate`] holds rows of any type plus the state around them
//! (sorting, filters, pagination, selection) and renders a [`TableView`]
//! that a front end draws. The crate also carries the pieces tables are
//! usually hosted with: a shared [`SidebarHandle`] for create/edit panels,
//! a [`ConfirmDialog`] and a small form [`validation`] layer.

pub mod column;
pub mod dialog;
pub mod filter;
pub mod header;
pub mod pagination;
pub mod selection;
pub mod sidebar;
pub mod sort;
pub mod validation;
pub mod value;
pub mod view;

mod plural;
mod table;

pub use column::ColumnDefinition;
pub use column::FilterType;
pub use column::SelectOption;
pub use dialog::ConfirmDialog;
pub use filter::FilterInput;
pub use filter::FilterValue;
pub use header::HeaderAction;
pub use pagination::DEFAULT_PAGE_SIZE;
pub use plural::pluralize;
pub use sidebar::SidebarEvent;
pub use sidebar::SidebarHandle;
pub use sidebar::SidebarState;
pub use sort::SortDirection;
pub use sort::SortOrder;
pub use table::*;
pub use value::CellValue;
pub use value::to_searchable_text;
pub use view::TableBody;
pub use view::TableView;
