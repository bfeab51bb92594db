//! Party registry API client library
//!
//! An async client for the off-campus party registration backend: typed
//! models, CRUD over accounts, students, locations and parties, incident
//! logging, address lookup, CSV export, and a query cache with optimistic
//! mutations.

pub mod api;
pub mod auth;
pub mod cache;
pub mod error;
pub mod model;
pub mod page;
pub mod response;

mod client;

pub use client::*;
pub use response::CacheStatus;
pub use response::Response;
