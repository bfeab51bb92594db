//! Query cache and optimistic mutations
//!
//! Collections fetched from the API are kept per cache key (`"parties"`,
//! `"students"`, ...) in a [`QueryCache`]. Mutations edit the cached
//! snapshot first and restore it if the request fails.

mod mutation;
mod query;

pub use mutation::*;
pub use query::*;
