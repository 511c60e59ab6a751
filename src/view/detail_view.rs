//! Detail pane state machine.
//!
//! ```text
//! Empty ──select(id)──▶ Loading ──load ok──▶ Loaded (clean)
//!                          │                   │ ▲
//!                          │                edit save ok
//!                          ▼                   ▼ │
//!                       NotFound         Loaded (dirty)
//! ```
//!
//! Selecting another record discards unsaved edits.

use crate::application::{TodoError, TodoService};
use crate::domain::{Todo, TodoDraft, TodoId};

/// A loaded record with its edit buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editing {
    /// Record as last read from the store.
    pub snapshot: Todo,
    /// Title buffer.
    pub title: String,
    /// Description buffer.
    pub description: String,
    /// Buffers differ from the snapshot.
    pub dirty: bool,
    /// Save request in flight.
    pub saving: bool,
}

impl Editing {
    fn clean(snapshot: Todo) -> Self {
        Self {
            title: snapshot.title.clone(),
            description: snapshot.description.clone(),
            snapshot,
            dirty: false,
            saving: false,
        }
    }

    fn recompute_dirty(&mut self) {
        self.dirty =
            self.title != self.snapshot.title || self.description != self.snapshot.description;
    }
}

/// State of the detail pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    /// Nothing selected.
    #[default]
    Empty,
    /// Waiting for the selected record.
    Loading {
        /// Selected record.
        id: TodoId,
    },
    /// Record shown and editable.
    Loaded(Editing),
    /// Selected record could not be read.
    NotFound {
        /// Selected record.
        id: TodoId,
    },
}

/// Detail pane.
#[derive(Debug, Clone, Default)]
pub struct DetailView {
    state: DetailState,
}

impl DetailView {
    /// Creates an empty pane.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &DetailState {
        &self.state
    }

    /// Loaded record and buffers, if any.
    #[must_use]
    pub const fn editing(&self) -> Option<&Editing> {
        match &self.state {
            DetailState::Loaded(editing) => Some(editing),
            _ => None,
        }
    }

    /// Selected id in any state.
    #[must_use]
    pub const fn selected(&self) -> Option<&TodoId> {
        match &self.state {
            DetailState::Empty => None,
            DetailState::Loading { id } | DetailState::NotFound { id } => Some(id),
            DetailState::Loaded(editing) => Some(&editing.snapshot.id),
        }
    }

    /// Whether the save button is enabled.
    #[must_use]
    pub const fn can_save(&self) -> bool {
        matches!(&self.state, DetailState::Loaded(editing) if editing.dirty && !editing.saving)
    }

    /// Changes the selection. Unsaved edits are dropped.
    pub fn select(&mut self, id: Option<TodoId>) {
        if let Some(editing) = self.editing().filter(|editing| editing.dirty) {
            tracing::debug!(id = %editing.snapshot.id, "Discarding unsaved edits");
        }
        self.state = id.map_or(DetailState::Empty, |id| DetailState::Loading { id });
    }

    /// Reads the selected record. Does nothing unless the pane is loading.
    ///
    /// # Errors
    ///
    /// Returns the read error. The pane moves to `NotFound` either way.
    pub async fn load(&mut self, service: &TodoService) -> Result<(), TodoError> {
        let DetailState::Loading { id } = &self.state else {
            return Ok(());
        };
        let id = id.clone();
        let result = service.get_by_id(&id).await;
        let error = result.as_ref().err().cloned();
        self.finish_load(&id, result);
        error.map_or(Ok(()), Err)
    }

    /// Applies a read result for `id`.
    ///
    /// Ignored unless the pane is still loading `id`.
    pub fn finish_load(&mut self, id: &TodoId, result: Result<Todo, TodoError>) {
        if !matches!(&self.state, DetailState::Loading { id: loading } if loading == id) {
            tracing::debug!(id = %id, "Ignoring stale detail load");
            return;
        }

        self.state = match result {
            Ok(todo) => DetailState::Loaded(Editing::clean(todo)),
            Err(error) => {
                if !matches!(error, TodoError::NotFound(_)) {
                    tracing::warn!(id = %id, error = %error, "Detail load failed");
                }
                DetailState::NotFound { id: id.clone() }
            }
        };
    }

    /// Replaces the title buffer.
    pub fn edit_title(&mut self, title: impl Into<String>) {
        if let DetailState::Loaded(editing) = &mut self.state {
            editing.title = title.into();
            editing.recompute_dirty();
        }
    }

    /// Replaces the description buffer.
    pub fn edit_description(&mut self, description: impl Into<String>) {
        if let DetailState::Loaded(editing) = &mut self.state {
            editing.description = description.into();
            editing.recompute_dirty();
        }
    }

    /// Saves the buffers.
    ///
    /// Returns `Ok(true)` when the record was saved and the surrounding page
    /// must re-fetch, `Ok(false)` when there was nothing to save.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Validation` for a blank title, or the service error
    /// when the update fails. The buffers stay dirty in both cases.
    pub async fn save(&mut self, service: &TodoService) -> Result<bool, TodoError> {
        if !self.can_save() {
            return Ok(false);
        }
        let DetailState::Loaded(editing) = &mut self.state else {
            return Ok(false);
        };

        let draft = TodoDraft::new(&editing.title, &editing.description)?;
        let id = editing.snapshot.id.clone();
        editing.saving = true;

        let outcome = service.update(&id, &draft).await;
        let DetailState::Loaded(editing) = &mut self.state else {
            return outcome.map(|()| true);
        };
        editing.saving = false;

        if let Err(error) = outcome {
            tracing::warn!(id = %id, error = %error, "Detail save failed");
            return Err(error);
        }

        let snapshot = match service.get_by_id(&id).await {
            Ok(todo) => todo,
            Err(error) => {
                tracing::warn!(id = %id, error = %error, "Re-read after save failed");
                Todo {
                    title: draft.title().to_string(),
                    description: draft.description().to_string(),
                    ..editing.snapshot.clone()
                }
            }
        };
        self.state = DetailState::Loaded(Editing::clean(snapshot));
        Ok(true)
    }
}
