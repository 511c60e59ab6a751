//! JSON handlers for record operations.
//!
//! Each handler maps one record operation onto HTTP. Store failures have
//! already been logged by the service and come back as user-safe messages.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::dto::{CreatedResponse, HealthResponse, ListQuery, SuccessResponse, TodoRequest};
use super::error::ApiErrorResponse;
use super::templates::Templates;
use crate::application::{InvalidationSignal, ListPage, TodoService};
use crate::domain::{SharedClock, Todo, TodoId};
use crate::infrastructure::Repositories;

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Clone)]
pub struct AppState {
    /// Record operations over the opened store.
    pub service: TodoService,
    /// Compiled HTML templates.
    pub templates: Arc<Templates>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates a new `AppState` from a service and compiled templates.
    #[must_use]
    pub fn new(service: TodoService, templates: Templates) -> Self {
        Self {
            service,
            templates: Arc::new(templates),
        }
    }

    /// Creates a new `AppState` from opened repositories.
    ///
    /// # Errors
    ///
    /// Returns the Tera error if the embedded templates fail to compile.
    pub fn from_repositories(
        repositories: Repositories,
        clock: SharedClock,
        listing_cache_capacity: usize,
    ) -> Result<Self, tera::Error> {
        let service = TodoService::new(repositories.todo_repository, clock, InvalidationSignal::new())
            .with_listing_cache(listing_cache_capacity);
        Ok(Self::new(service, Templates::new()?))
    }
}

// =============================================================================
// Record Handlers
// =============================================================================

/// Lists one page of todos.
///
/// # Response
///
/// - **200 OK**: `{"records": [...], "totalPages": 3}`
/// - **500 Internal Server Error**: Store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when the store fails.
pub async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListPage>, ApiErrorResponse> {
    let listing = state
        .service
        .list(query.page(), query.search.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(listing))
}

/// Reads one todo.
///
/// # Response
///
/// - **200 OK**: The todo
/// - **404 Not Found**: No todo has this id
/// - **500 Internal Server Error**: Store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when the todo is missing or the store fails.
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiErrorResponse> {
    let todo = state.service.get_by_id(&TodoId::new(id)).await?;
    Ok(Json(todo))
}

/// Creates a todo.
///
/// # Request Body
///
/// ```json
/// { "title": "Buy milk", "description": "Optional description" }
/// ```
///
/// # Response
///
/// - **201 Created**: `{"id": "..."}`
/// - **400 Bad Request**: Validation error
/// - **500 Internal Server Error**: Store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on validation or store failure.
pub async fn create_todo(
    State(state): State<AppState>,
    Json(request): Json<TodoRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiErrorResponse> {
    let draft = request.to_draft()?;
    let id = state.service.create(&draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_string() }),
    ))
}

/// Replaces title and description of a todo.
///
/// # Response
///
/// - **200 OK**: `{"success": true}`
/// - **400 Bad Request**: Validation error
/// - **404 Not Found**: No todo has this id
/// - **500 Internal Server Error**: Store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] on validation failure, missing todo, or store failure.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TodoRequest>,
) -> Result<Json<SuccessResponse>, ApiErrorResponse> {
    let draft = request.to_draft()?;
    state.service.update(&TodoId::new(id), &draft).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Deletes a todo. Deleting a missing todo succeeds.
///
/// # Response
///
/// - **200 OK**: `{"success": true}`
/// - **500 Internal Server Error**: Store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when the store fails.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiErrorResponse> {
    state.service.delete(&TodoId::new(id)).await?;
    Ok(Json(SuccessResponse::ok()))
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check endpoint.
///
/// Pings the store so that load balancers see an unreachable database.
///
/// # Response
///
/// - **200 OK**: `{"status": "healthy", "version": "0.1.0", "storage": "in_memory"}`
/// - **503 Service Unavailable**: Store ping failed
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when the store ping fails.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiErrorResponse> {
    if let Err(error) = state.service.health_check().await {
        tracing::warn!(error = %error, "Health check failed");
        return Err(ApiErrorResponse::unavailable("Store is unreachable"));
    }

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.service.backend_name(),
    }))
}
