//! Domain records exchanged with the backend.
//!
//! Field names follow the backend's snake_case JSON. Timestamps are UTC on
//! the wire and are converted to local time only for display.

mod account;
mod incident;
mod location;
mod party;
mod place;
mod student;

pub use account::*;
pub use incident::*;
pub use location::*;
pub use party::*;
pub use place::*;
pub use student::*;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A top-level collection served under `/<path>` with standard CRUD verbs.
pub trait Resource: Clone + Send + Sync + DeserializeOwned + Serialize + 'static {
    /// Body sent on create and update.
    type Payload: Serialize + Send + Sync;

    /// Collection path, e.g. `parties`.
    const PATH: &'static str;
    /// Singular display name, e.g. `Party`.
    const NAME: &'static str;

    fn id(&self) -> i64;
}
