//! # todo-board
//!
//! A paginated, searchable to-do list served as a server-rendered board
//! with a JSON API next to it.
//!
//! ## Layers
//!
//! - **domain**: `Todo`, ids, timestamps, the clock, and draft validation
//! - **infrastructure**: the persistence gateway (in-memory, `MongoDB`,
//!   `PostgreSQL`), its factory, and process configuration
//! - **application**: record operations, the invalidation signal, and the
//!   listing cache
//! - **view**: navigation parameters and the list and detail view state
//!   machines
//! - **api**: axum handlers, Tera templates, and the router
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use todo_board::api::{AppState, create_router};
//! use todo_board::domain::SystemClock;
//! use todo_board::infrastructure::Repositories;
//!
//! # fn main() -> Result<(), tera::Error> {
//! let state = AppState::from_repositories(Repositories::in_memory(), Arc::new(SystemClock), 64)?;
//! let _router = create_router(state);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod view;
