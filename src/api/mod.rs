//! API module for HTTP handlers.
//!
//! This module contains the board page, the JSON API, and route definitions.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod templates;

pub use dto::{CreatedResponse, HealthResponse, ListQuery, SuccessResponse, TodoRequest};
pub use error::{ApiError, ApiErrorResponse, FieldError};
pub use handlers::{
    AppState, create_todo, delete_todo, get_todo, health_check, list_todos, update_todo,
};
pub use routes::create_router;
pub use templates::Templates;
