//! REST operations

mod crud;
mod incidents;
mod parties;
mod places;
mod service;

pub use parties::*;
pub use service::*;
