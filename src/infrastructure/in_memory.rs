//! In-memory repository implementation.
//!
//! Suitable for development and tests. Records live in a map guarded by a
//! `tokio::sync::RwLock`; each record also carries an insertion sequence so
//! that records created within the same clock tick still list newest first.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Timestamp, Todo, TodoDraft, TodoId};
use crate::infrastructure::{PaginatedResult, Pagination, RepositoryError, SearchFilter, TodoRepository};

#[derive(Debug, Clone)]
struct StoredTodo {
    sequence: u64,
    todo: Todo,
}

#[derive(Debug, Default)]
struct Collection {
    records: HashMap<TodoId, StoredTodo>,
    next_sequence: u64,
}

/// In-memory implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = InMemoryTodoRepository::new();
/// let draft = TodoDraft::new("Buy milk", "")?;
///
/// let id = repository.insert(&draft, Timestamp::now()).await?;
/// let found = repository.find_by_id(&id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    collection: Arc<RwLock<Collection>>,
}

impl InMemoryTodoRepository {
    /// Creates a new empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Orders newest first: creation time, then insertion sequence.
fn newest_first(left: &StoredTodo, right: &StoredTodo) -> std::cmp::Ordering {
    right
        .todo
        .created_at
        .cmp(&left.todo.created_at)
        .then_with(|| right.sequence.cmp(&left.sequence))
}

#[allow(clippy::significant_drop_tightening)]
impl TodoRepository for InMemoryTodoRepository {
    fn find_by_id(&self, id: &TodoId) -> BoxFuture<'static, Result<Option<Todo>, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        Box::pin(async move {
            let guard = collection.read().await;
            Ok(guard.records.get(&id).map(|stored| stored.todo.clone()))
        })
    }

    fn insert(
        &self,
        draft: &TodoDraft,
        created_at: Timestamp,
    ) -> BoxFuture<'static, Result<TodoId, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let draft = draft.clone();
        Box::pin(async move {
            let id = TodoId::new(Uuid::now_v7().to_string());
            let mut guard = collection.write().await;
            let sequence = guard.next_sequence;
            guard.next_sequence += 1;
            guard.records.insert(
                id.clone(),
                StoredTodo {
                    sequence,
                    todo: Todo {
                        id: id.clone(),
                        title: draft.title().to_string(),
                        description: draft.description().to_string(),
                        created_at,
                        updated_at: None,
                    },
                },
            );
            Ok(id)
        })
    }

    fn update(
        &self,
        id: &TodoId,
        draft: &TodoDraft,
        updated_at: Timestamp,
    ) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        let draft = draft.clone();
        Box::pin(async move {
            let mut guard = collection.write().await;
            let Some(stored) = guard.records.get_mut(&id) else {
                return Ok(false);
            };
            stored.todo.title = draft.title().to_string();
            stored.todo.description = draft.description().to_string();
            stored.todo.updated_at = Some(updated_at);
            Ok(true)
        })
    }

    fn delete(&self, id: &TodoId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        Box::pin(async move {
            let mut guard = collection.write().await;
            Ok(guard.records.remove(&id).is_some())
        })
    }

    fn list(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> BoxFuture<'static, Result<PaginatedResult<Todo>, RepositoryError>> {
        let collection = Arc::clone(&self.collection);
        let needle = filter.lowercase();
        Box::pin(async move {
            let guard = collection.read().await;
            let mut matching: Vec<StoredTodo> = guard
                .records
                .values()
                .filter(|stored| needle.as_deref().is_none_or(|needle| stored.todo.matches(needle)))
                .cloned()
                .collect();
            drop(guard);

            matching.sort_by(newest_first);

            let total = matching.len() as u64;
            let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
            let limit = pagination.limit() as usize;

            let items: Vec<Todo> = matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|stored| stored.todo)
                .collect();

            Ok(PaginatedResult::new(items, total, pagination))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, Result<(), RepositoryError>> {
        Box::pin(async { Ok(()) })
    }

    fn shutdown(&self) -> BoxFuture<'static, ()> {
        let collection = Arc::clone(&self.collection);
        Box::pin(async move {
            let count = collection.read().await.records.len();
            tracing::debug!(records = count, "Discarding in-memory todo collection");
        })
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
