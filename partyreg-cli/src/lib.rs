//! Role portals for the party registry: tables, forms and the sidebar,
//! driven from the command line.

pub mod client_manager;
pub mod commands;
pub mod error;
pub mod forms;
pub mod paths;
pub mod portals;
pub mod render;
pub mod settings;
