//! Confirmation dialog.

/// A yes/no confirmation, as shown before a delete.
///
/// # Example
///
/// ```
/// use tablekit::ConfirmDialog;
///
/// let dialog = ConfirmDialog::new("Delete this party?")
///     .title("Delete Party")
///     .confirm_label("Delete");
/// assert_eq!(dialog.title, "Delete Party");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    /// Set while the confirmed action is running; the buttons are disabled.
    pub busy: bool,
}

impl ConfirmDialog {
    /// Create a new confirmation dialog with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: "Confirm".into(),
            message: message.into(),
            confirm_label: "Ok".into(),
            cancel_label: "Cancel".into(),
            busy: false,
        }
    }

    /// Set a custom title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the label of the confirming button.
    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }

    /// Set the label of the cancelling button.
    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = label.into();
        self
    }
}

/// Delete awaiting confirmation: the row and the dialog shown for it.
#[derive(Debug, Clone)]
pub struct PendingDelete<T> {
    pub row_id: String,
    pub row: T,
    pub dialog: ConfirmDialog,
}
