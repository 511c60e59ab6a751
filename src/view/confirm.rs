//! Delete confirmation gate.

use crate::domain::TodoId;

/// Pending request to delete one record.
///
/// Nothing is deleted until [`DeleteConfirmation::confirm`] hands the id to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: TodoId,
    title: String,
}

impl DeleteConfirmation {
    /// Opens the gate for one record.
    #[must_use]
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Record awaiting confirmation.
    #[must_use]
    pub const fn id(&self) -> &TodoId {
        &self.id
    }

    /// Title shown in the dialog.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Accepts the deletion and yields the id to delete.
    #[must_use]
    pub fn confirm(self) -> TodoId {
        self.id
    }

    /// Dismisses the dialog.
    pub fn cancel(self) {
        tracing::debug!(id = %self.id, "Delete cancelled");
    }
}
