//! Router construction.
//!
//! ```text
//! GET    /                      board page
//! GET    /search                apply search box, redirect
//! POST   /todos                 create form, redirect
//! POST   /todos/{id}            save form, redirect
//! POST   /todos/{id}/delete     delete dialog, redirect
//!
//! GET    /api/todos             list page
//! POST   /api/todos             create
//! GET    /api/todos/{id}        read
//! PUT    /api/todos/{id}        replace
//! DELETE /api/todos/{id}        delete
//!
//! GET    /health                store ping
//! ```

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_todo, delete_todo, get_todo, health_check, list_todos, update_todo,
};
use super::pages;

/// Builds the application router with tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        );

    Router::new()
        .route("/", get(pages::board))
        .route("/search", get(pages::search))
        .route("/todos", post(pages::create))
        .route("/todos/{id}", post(pages::save))
        .route("/todos/{id}/delete", post(pages::delete))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
