//! Record operations over the todo store.
//!
//! [`TodoService`] is the only caller of [`TodoRepository`]. It stamps
//! timestamps from its clock, fires the invalidation signal after every
//! mutation, and turns store failures into user-safe errors after logging
//! the cause.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::cache::{CacheStats, ListingCache, ListingKey};
use super::invalidation::{Generation, InvalidationSignal};
use crate::domain::{SharedClock, Todo, TodoDraft, TodoId, ValidationError};
use crate::infrastructure::{Pagination, RepositoryError, SearchFilter, TodoRepository};

/// Records per listing page.
pub const PAGE_SIZE: u32 = 5;

// =============================================================================
// Errors
// =============================================================================

/// Record operation that failed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing page read.
    List,
    /// Single record read.
    Fetch,
    /// Record creation.
    Create,
    /// Record update.
    Update,
    /// Record deletion.
    Delete,
}

impl Operation {
    /// Message shown to the user when this operation fails.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::List => "Failed to fetch todos",
            Self::Fetch => "Failed to fetch todo",
            Self::Create => "Failed to create todo",
            Self::Update => "Failed to update todo",
            Self::Delete => "Failed to delete todo",
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Fetch => "get_by_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.message())
    }
}

/// Errors returned by record operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// No record has the requested id.
    #[error("Todo not found: {0}")]
    NotFound(TodoId),

    /// Input was rejected before reaching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed. The cause has already been logged.
    #[error("{0}")]
    Failed(Operation),
}

fn store_failure(operation: Operation, id: Option<&TodoId>, error: &RepositoryError) -> TodoError {
    tracing::error!(
        operation = operation.name(),
        id = id.map(TodoId::as_str),
        error = %error,
        "Todo store operation failed"
    );
    TodoError::Failed(operation)
}

// =============================================================================
// Listing
// =============================================================================

/// One page of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    /// Records on this page, newest first.
    pub records: Vec<Todo>,
    /// Number of pages for the whole match set.
    pub total_pages: u64,
}

// =============================================================================
// Service
// =============================================================================

/// Record operations bound to one store handle.
///
/// # Example
///
/// ```ignore
/// let service = TodoService::new(repository, Arc::new(SystemClock), InvalidationSignal::new());
///
/// let id = service.create(&TodoDraft::new("Buy milk", "")?).await?;
/// let page = service.list(1, "").await?;
/// ```
#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
    clock: SharedClock,
    signal: InvalidationSignal,
    cache: Option<Arc<ListingCache>>,
}

impl fmt::Debug for TodoService {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TodoService")
            .field("repository", &self.repository.backend_name())
            .field("generation", &self.signal.generation())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl TodoService {
    /// Creates a service without a listing cache.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TodoRepository>,
        clock: SharedClock,
        signal: InvalidationSignal,
    ) -> Self {
        Self {
            repository,
            clock,
            signal,
            cache: None,
        }
    }

    /// Enables the listing cache. A capacity of 0 leaves it disabled.
    #[must_use]
    pub fn with_listing_cache(mut self, capacity: usize) -> Self {
        self.cache = ListingCache::new(capacity).map(Arc::new);
        self
    }

    /// Hit and miss counts of the listing cache, if enabled.
    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    /// The invalidation signal fired by mutations.
    #[must_use]
    pub const fn signal(&self) -> &InvalidationSignal {
        &self.signal
    }

    /// Current invalidation generation.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.signal.generation()
    }

    /// Short name of the store backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns the store error unchanged.
    pub async fn health_check(&self) -> Result<(), RepositoryError> {
        self.repository.health_check().await
    }

    /// Reads one page of records, newest first.
    ///
    /// `page` is 1-based; 0 reads as 1. Blank `search` matches everything.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Failed(Operation::List)` if the store fails.
    pub async fn list(&self, page: u32, search: &str) -> Result<ListPage, TodoError> {
        let page = page.max(1);
        let filter = SearchFilter::new(search);
        let generation = self.signal.generation();
        let key = ListingKey::new(page, filter.text());

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&key, generation) {
                let stats = cache.stats();
                tracing::debug!(
                    page,
                    search = filter.text(),
                    hits = stats.hits,
                    misses = stats.misses,
                    "Listing cache hit"
                );
                return Ok(cached);
            }
        }

        let result = self
            .repository
            .list(&filter, Pagination::from_one_based(page, PAGE_SIZE))
            .await
            .map_err(|error| store_failure(Operation::List, None, &error))?;

        let listing = ListPage {
            total_pages: result.total_pages(),
            records: result.items,
        };

        if let Some(cache) = &self.cache {
            cache.put(key, listing.clone(), generation);
        }

        Ok(listing)
    }

    /// Reads one record.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::NotFound` if no record has `id`, or
    /// `TodoError::Failed(Operation::Fetch)` if the store fails.
    pub async fn get_by_id(&self, id: &TodoId) -> Result<Todo, TodoError> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|error| store_failure(Operation::Fetch, Some(id), &error))?
            .ok_or_else(|| TodoError::NotFound(id.clone()))
    }

    /// Creates a record stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Failed(Operation::Create)` if the store fails.
    pub async fn create(&self, draft: &TodoDraft) -> Result<TodoId, TodoError> {
        let id = self
            .repository
            .insert(draft, self.clock.now())
            .await
            .map_err(|error| store_failure(Operation::Create, None, &error))?;

        tracing::info!(id = %id, "Todo created");
        self.signal.notify();
        Ok(id)
    }

    /// Replaces title and description of a record.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::NotFound` if no record has `id`, or
    /// `TodoError::Failed(Operation::Update)` if the store fails.
    pub async fn update(&self, id: &TodoId, draft: &TodoDraft) -> Result<(), TodoError> {
        let matched = self
            .repository
            .update(id, draft, self.clock.now())
            .await
            .map_err(|error| store_failure(Operation::Update, Some(id), &error))?;

        if !matched {
            tracing::warn!(id = %id, "Update matched no todo");
            return Err(TodoError::NotFound(id.clone()));
        }

        tracing::info!(id = %id, "Todo updated");
        self.signal.notify();
        Ok(())
    }

    /// Permanently removes a record. Removing a missing record succeeds.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Failed(Operation::Delete)` if the store fails.
    pub async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(|error| store_failure(Operation::Delete, Some(id), &error))?;

        if removed {
            tracing::info!(id = %id, "Todo deleted");
            self.signal.notify();
        } else {
            tracing::debug!(id = %id, "Delete of absent todo");
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
