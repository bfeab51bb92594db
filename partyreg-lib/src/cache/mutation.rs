/// Progress of one create, update or delete.
///
/// `Idle → Pending → Success | Error`. On success the affected collection
/// is invalidated and refetched; on error an optimistic edit is rolled back
/// and the message is shown on the reopened form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState<T> {
    #[default]
    Idle,
    Pending,
    Success(T),
    /// User-facing message.
    Error(String),
}

impl<T> MutationState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Back to `Idle`, e.g. when the form is closed.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
