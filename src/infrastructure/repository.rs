//! Repository trait for todo records.
//!
//! Every method returns a boxed `'static` future so that one store handle can
//! be shared across handlers as `Arc<dyn TodoRepository>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Timestamp, Todo, TodoDraft, TodoId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// The identifier cannot be interpreted by the backend.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (0-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
}

impl Pagination {
    /// Creates new pagination parameters.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is 0.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        assert!(page_size > 0, "page_size must be greater than 0");
        Self { page, page_size }
    }

    /// Creates pagination from a 1-based page number as used in URLs.
    ///
    /// Page 0 is read as page 1.
    #[must_use]
    pub const fn from_one_based(page: u32, page_size: u32) -> Self {
        Self::new(page.saturating_sub(1), page_size)
    }

    /// Returns the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.page_size as u64
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.page_size
    }
}

/// Paginated result containing items and total count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResult<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    page_size: u32,
}

impl<T> PaginatedResult<T> {
    /// Creates a new paginated result.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page_size: pagination.page_size,
        }
    }

    /// Returns the total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }
}

// =============================================================================
// Search Filter
// =============================================================================

/// Case-insensitive substring filter over title and description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SearchFilter {
    needle: Option<String>,
}

impl SearchFilter {
    /// Builds a filter from raw search text.
    ///
    /// Blank text yields a filter that matches everything.
    #[must_use]
    pub fn new(search: &str) -> Self {
        let trimmed = search.trim();
        Self {
            needle: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }

    /// Returns the search text as entered (trimmed), if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    /// Returns the lowercased search text for in-process matching.
    #[must_use]
    pub fn lowercase(&self) -> Option<String> {
        self.needle.as_deref().map(str::to_lowercase)
    }
}

// =============================================================================
// Todo Repository
// =============================================================================

/// Handle to the collection of todo records.
pub trait TodoRepository: Send + Sync {
    /// Finds a record by id.
    ///
    /// Returns `Ok(None)` if no record matches, and `RepositoryError::InvalidId`
    /// if the backend cannot parse the id.
    fn find_by_id(&self, id: &TodoId) -> BoxFuture<'static, Result<Option<Todo>, RepositoryError>>;

    /// Inserts a new record and returns the store-assigned id.
    fn insert(
        &self,
        draft: &TodoDraft,
        created_at: Timestamp,
    ) -> BoxFuture<'static, Result<TodoId, RepositoryError>>;

    /// Replaces title and description and stamps `updated_at`.
    ///
    /// Returns `Ok(false)` when no record matched, including ids the backend
    /// cannot parse.
    fn update(
        &self,
        id: &TodoId,
        draft: &TodoDraft,
        updated_at: Timestamp,
    ) -> BoxFuture<'static, Result<bool, RepositoryError>>;

    /// Deletes a record by id.
    ///
    /// Returns `Ok(true)` if the record was deleted, `Ok(false)` if it didn't exist
    /// or the id cannot be parsed.
    fn delete(&self, id: &TodoId) -> BoxFuture<'static, Result<bool, RepositoryError>>;

    /// Lists matching records, newest first, with the total match count.
    fn list(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> BoxFuture<'static, Result<PaginatedResult<Todo>, RepositoryError>>;

    /// Checks that the store is reachable.
    fn health_check(&self) -> BoxFuture<'static, Result<(), RepositoryError>>;

    /// Releases the underlying connection.
    fn shutdown(&self) -> BoxFuture<'static, ()>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// Tests
// =============================================================================
