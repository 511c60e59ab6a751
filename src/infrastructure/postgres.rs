//! `PostgreSQL` repository implementation.
//!
//! An alternative to the document store for deployments that already run
//! `PostgreSQL`. Ids are time-ordered UUIDs, so `id DESC` breaks ties between
//! records created in the same instant by insertion order.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todos (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ
//! );
//! CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at DESC);
//! ```

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Timestamp, Todo, TodoDraft, TodoId};
use crate::infrastructure::{PaginatedResult, Pagination, RepositoryError, SearchFilter, TodoRepository};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (\
     id UUID PRIMARY KEY DEFAULT gen_random_uuid(), \
     title TEXT NOT NULL, \
     description TEXT NOT NULL DEFAULT '', \
     created_at TIMESTAMPTZ NOT NULL, \
     updated_at TIMESTAMPTZ)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at DESC)";

type TodoRow = (Uuid, String, String, DateTime<Utc>, Option<DateTime<Utc>>);

fn database_error(error: &sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn parse_uuid(id: &TodoId) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(id.as_str()).map_err(|_| RepositoryError::InvalidId(id.to_string()))
}

fn row_to_todo((id, title, description, created_at, updated_at): TodoRow) -> Todo {
    Todo {
        id: TodoId::new(id.to_string()),
        title,
        description,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: updated_at.map(Timestamp::from_datetime),
    }
}

/// Builds an `ILIKE` pattern that matches `text` literally.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for character in text.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped.push('%');
    escaped
}

/// `PostgreSQL` implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/todos").await?;
/// let repository = PostgresTodoRepository::new(pool);
/// repository.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// Creates a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `todos` table and its index when they are missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if either statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        Ok(())
    }
}

impl TodoRepository for PostgresTodoRepository {
    fn find_by_id(&self, id: &TodoId) -> BoxFuture<'static, Result<Option<Todo>, RepositoryError>> {
        let pool = self.pool.clone();
        let id = id.clone();
        Box::pin(async move {
            let uuid = parse_uuid(&id)?;
            let row: Option<TodoRow> = sqlx::query_as(
                "SELECT id, title, description, created_at, updated_at FROM todos WHERE id = $1",
            )
            .bind(uuid)
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Ok(row.map(row_to_todo))
        })
    }

    fn insert(
        &self,
        draft: &TodoDraft,
        created_at: Timestamp,
    ) -> BoxFuture<'static, Result<TodoId, RepositoryError>> {
        let pool = self.pool.clone();
        let draft = draft.clone();
        Box::pin(async move {
            let (id,): (Uuid,) = sqlx::query_as(
                "INSERT INTO todos (id, title, description, created_at) \
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(Uuid::now_v7())
            .bind(draft.title())
            .bind(draft.description())
            .bind(*created_at.as_datetime())
            .fetch_one(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Ok(TodoId::new(id.to_string()))
        })
    }

    fn update(
        &self,
        id: &TodoId,
        draft: &TodoDraft,
        updated_at: Timestamp,
    ) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let pool = self.pool.clone();
        let id = id.clone();
        let draft = draft.clone();
        Box::pin(async move {
            let Ok(uuid) = parse_uuid(&id) else {
                return Ok(false);
            };
            let result = sqlx::query(
                "UPDATE todos SET title = $2, description = $3, updated_at = $4 WHERE id = $1",
            )
            .bind(uuid)
            .bind(draft.title())
            .bind(draft.description())
            .bind(*updated_at.as_datetime())
            .execute(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete(&self, id: &TodoId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let pool = self.pool.clone();
        let id = id.clone();
        Box::pin(async move {
            let Ok(uuid) = parse_uuid(&id) else {
                return Ok(false);
            };
            let result = sqlx::query("DELETE FROM todos WHERE id = $1")
                .bind(uuid)
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn list(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> BoxFuture<'static, Result<PaginatedResult<Todo>, RepositoryError>> {
        let pool = self.pool.clone();
        let pattern = filter.text().map(like_pattern);
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM todos \
                 WHERE $1::text IS NULL OR title ILIKE $1 OR description ILIKE $1",
            )
            .bind(pattern.as_deref())
            .fetch_one(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            let total = u64::try_from(count).unwrap_or_default();
            if total == 0 {
                return Ok(PaginatedResult::new(vec![], 0, pagination));
            }

            let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);
            let rows: Vec<TodoRow> = sqlx::query_as(
                "SELECT id, title, description, created_at, updated_at FROM todos \
                 WHERE $1::text IS NULL OR title ILIKE $1 OR description ILIKE $1 \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $2 OFFSET $3",
            )
            .bind(pattern.as_deref())
            .bind(i64::from(pagination.limit()))
            .bind(offset)
            .fetch_all(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Ok(PaginatedResult::new(
                rows.into_iter().map(row_to_todo).collect(),
                total,
                pagination,
            ))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, Result<(), RepositoryError>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;
            Ok(())
        })
    }

    fn shutdown(&self) -> BoxFuture<'static, ()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            pool.close().await;
            tracing::info!("PostgreSQL pool closed");
        })
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

// =============================================================================
// Tests
// =============================================================================
