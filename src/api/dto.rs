//! Data Transfer Objects for API requests and responses.
//!
//! JSON bodies use camelCase field names. Form bodies carry the navigation
//! fields next to the record fields so handlers can redirect back.

use serde::{Deserialize, Serialize};

use crate::domain::{TodoDraft, ValidationError};
use crate::view::NavigationParams;

// =============================================================================
// JSON DTOs
// =============================================================================

/// Request body for creating or replacing a todo.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoRequest {
    /// Title of the todo.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl TodoRequest {
    /// Validates the body into a draft.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank or overlong field.
    pub fn to_draft(&self) -> Result<TodoDraft, ValidationError> {
        TodoDraft::new(&self.title, self.description.as_deref().unwrap_or_default())
    }
}

/// Query string of `GET /api/todos`.
///
/// The page is kept as text so that a malformed value reads as page 1.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<String>,
    /// Search text.
    #[serde(default)]
    pub search: Option<String>,
}

impl ListQuery {
    /// Page number, defaulting to 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Response body of `POST /api/todos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Id of the new todo.
    pub id: String,
}

/// Response body of successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always true.
    pub success: bool,
}

impl SuccessResponse {
    /// The success body.
    #[must_use]
    pub const fn ok() -> Self {
        Self { success: true }
    }
}

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Store backend name.
    pub storage: &'static str,
}

// =============================================================================
// Form DTOs
// =============================================================================

/// Form body of the create and save forms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoForm {
    /// Title as typed.
    #[serde(default)]
    pub title: String,
    /// Description as typed.
    #[serde(default)]
    pub description: String,
    /// Current page.
    #[serde(default)]
    pub page: Option<String>,
    /// Selected record.
    #[serde(default)]
    pub todo_id: Option<String>,
    /// Active search.
    #[serde(default)]
    pub search: Option<String>,
}

impl TodoForm {
    /// Navigation fields of the form.
    #[must_use]
    pub fn navigation(&self) -> NavigationParams {
        NavigationParams {
            page: self.page.clone(),
            todo_id: self.todo_id.clone(),
            search: self.search.clone(),
        }
    }
}

/// Query string of `GET /search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    /// Search box contents.
    #[serde(default)]
    pub q: String,
    /// Selected record to keep.
    #[serde(default)]
    pub todo_id: Option<String>,
}

/// View-local flags on `GET /`. They are not part of navigation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardFlags {
    /// `1` opens the create form.
    #[serde(default)]
    pub compose: Option<String>,
    /// Record whose delete dialog is open.
    #[serde(default)]
    pub confirm_delete: Option<String>,
}

impl BoardFlags {
    /// Whether the create form is open.
    #[must_use]
    pub fn compose(&self) -> bool {
        matches!(self.compose.as_deref(), Some("1" | "true"))
    }

    /// Record whose delete dialog is open.
    #[must_use]
    pub fn confirm_delete(&self) -> Option<&str> {
        self.confirm_delete
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

// =============================================================================
// Tests
// =============================================================================
