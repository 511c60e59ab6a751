//! List pane state machine.
//!
//! Covers the create form, the search box, the delete dialog, and deriving
//! the next navigation from the current one.
//!
//! ```text
//! Idle ──open_create──▶ Creating ──submit_create──▶ Submitting ──ok──▶ Idle
//!   ▲                      │  ▲                          │
//!   └──────cancel_create───┘  └──────────failure─────────┘
//!
//! any ──request_delete──▶ DeletePending ──cancel_delete──▶ prior
//!                               └──────confirm_delete────▶ Idle
//! ```

use crate::application::{Generation, InvalidationSignal, ListPage, TodoError, TodoService};
use crate::domain::{TodoDraft, TodoId};

use super::confirm::DeleteConfirmation;
use super::navigation::NavigationQuery;

/// State of the list pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Create form is open.
    Creating,
    /// Create request in flight. Submit is disabled.
    Submitting,
    /// Delete dialog is open.
    DeletePending {
        /// Record awaiting confirmation.
        target: DeleteConfirmation,
        /// State restored on cancel.
        prior: Box<ListState>,
    },
}

/// Create form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
}

/// List pane.
#[derive(Debug, Clone)]
pub struct ListView {
    navigation: NavigationQuery,
    state: ListState,
    form: CreateForm,
    search_text: String,
    listing: Option<ListPage>,
    fetched_at: Option<Generation>,
}

impl ListView {
    /// Creates the pane for the given navigation.
    ///
    /// The search box starts with the search text from the URL.
    #[must_use]
    pub fn new(navigation: NavigationQuery) -> Self {
        let search_text = navigation.search().unwrap_or_default().to_string();
        Self {
            navigation,
            state: ListState::Idle,
            form: CreateForm::default(),
            search_text,
            listing: None,
            fetched_at: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ListState {
        &self.state
    }

    /// Current navigation.
    #[must_use]
    pub const fn navigation(&self) -> &NavigationQuery {
        &self.navigation
    }

    /// Create form contents.
    #[must_use]
    pub const fn form(&self) -> &CreateForm {
        &self.form
    }

    /// Search box contents.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Last fetched page, if any.
    #[must_use]
    pub const fn listing(&self) -> Option<&ListPage> {
        self.listing.as_ref()
    }

    /// Whether the create form is shown.
    #[must_use]
    pub const fn is_form_open(&self) -> bool {
        matches!(self.state, ListState::Creating | ListState::Submitting)
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        matches!(self.state, ListState::Creating)
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Toggles the create form.
    pub fn open_create(&mut self) {
        self.state = match self.state {
            ListState::Idle => ListState::Creating,
            ListState::Creating => ListState::Idle,
            _ => return,
        };
    }

    /// Closes the create form. Typed text is kept.
    pub fn cancel_create(&mut self) {
        if self.state == ListState::Creating {
            self.state = ListState::Idle;
        }
    }

    /// Replaces the typed title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    /// Replaces the typed description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
    }

    /// Submits the create form.
    ///
    /// Does nothing unless the form is open and idle. On success the form is
    /// cleared and closed and the listing is re-fetched.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Validation` without contacting the store when the
    /// title is blank, or the service error when the create fails. The form
    /// stays open with its contents in both cases.
    pub async fn submit_create(&mut self, service: &TodoService) -> Result<(), TodoError> {
        if !self.can_submit() {
            return Ok(());
        }

        let draft = TodoDraft::new(&self.form.title, &self.form.description)?;

        self.state = ListState::Submitting;
        match service.create(&draft).await {
            Ok(id) => {
                tracing::debug!(id = %id, "Create form submitted");
                self.form = CreateForm::default();
                self.state = ListState::Idle;
                if let Err(error) = self.refresh(service).await {
                    tracing::warn!(error = %error, "Listing refresh after create failed");
                }
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = %error, "Create form submission failed");
                self.state = ListState::Creating;
                Err(error)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    /// Opens the delete dialog for one record.
    pub fn request_delete(&mut self, id: TodoId, title: impl Into<String>) {
        let prior = match std::mem::take(&mut self.state) {
            ListState::DeletePending { prior, .. } => prior,
            other => Box::new(other),
        };
        self.state = ListState::DeletePending {
            target: DeleteConfirmation::new(id, title),
            prior,
        };
    }

    /// Closes the delete dialog without deleting.
    pub fn cancel_delete(&mut self) {
        if let ListState::DeletePending { target, prior } = std::mem::take(&mut self.state) {
            target.cancel();
            self.state = *prior;
        }
    }

    /// Deletes the record in the dialog and returns the next navigation.
    ///
    /// The returned navigation drops the selection when the deleted record
    /// was selected. Without an open dialog the current navigation is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the service error when the delete fails. The pane returns to
    /// `Idle` either way.
    pub async fn confirm_delete(
        &mut self,
        service: &TodoService,
    ) -> Result<NavigationQuery, TodoError> {
        let ListState::DeletePending { target, .. } = std::mem::take(&mut self.state) else {
            return Ok(self.navigation.clone());
        };

        let id = target.confirm();
        service.delete(&id).await?;

        if self.navigation.todo_id() == Some(&id) {
            self.navigation = self.navigation.with_selected(None);
        }
        Ok(self.navigation.clone())
    }

    // -------------------------------------------------------------------------
    // Search and navigation
    // -------------------------------------------------------------------------

    /// Replaces the search box contents without navigating.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Applies the search box: back to page 1 with the trimmed text.
    #[must_use]
    pub fn submit_search(&mut self) -> NavigationQuery {
        let text = self.search_text.trim().to_string();
        self.search_text.clone_from(&text);
        self.navigate(
            self.navigation
                .with_page(1)
                .with_search(Some(text.as_str())),
        )
    }

    /// Empties the search box and removes the search parameter.
    #[must_use]
    pub fn clear_search(&mut self) -> NavigationQuery {
        self.search_text.clear();
        self.navigate(self.navigation.with_search(None))
    }

    /// Moves to another page.
    #[must_use]
    pub fn go_to_page(&mut self, page: u32) -> NavigationQuery {
        self.navigate(self.navigation.with_page(page))
    }

    /// Selects a record for the detail pane.
    #[must_use]
    pub fn select(&mut self, id: TodoId) -> NavigationQuery {
        self.navigate(self.navigation.with_selected(Some(id)))
    }

    fn navigate(&mut self, next: NavigationQuery) -> NavigationQuery {
        if next.page() != self.navigation.page() || next.search() != self.navigation.search() {
            self.listing = None;
            self.fetched_at = None;
        }
        self.navigation = next;
        self.navigation.clone()
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Whether the listing must be fetched again.
    #[must_use]
    pub fn is_stale(&self, signal: &InvalidationSignal) -> bool {
        self.fetched_at
            .is_none_or(|generation| signal.is_newer_than(generation))
    }

    /// Fetches the current page.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Failed` if the store fails. The previous listing
    /// is kept.
    pub async fn refresh(&mut self, service: &TodoService) -> Result<&ListPage, TodoError> {
        let generation = service.generation();
        let listing = service
            .list(
                self.navigation.page(),
                self.navigation.search().unwrap_or_default(),
            )
            .await?;
        self.fetched_at = Some(generation);
        Ok(self.listing.insert(listing))
    }
}
