//! Infrastructure layer for the todo board.
//!
//! This module provides the store backends behind [`TodoRepository`], the
//! factory that opens the configured one, and environment configuration.
//!
//! # Backends
//!
//! - [`InMemoryTodoRepository`]: process-local storage for tests and development
//! - [`MongoTodoRepository`]: `MongoDB` document store
//! - [`PostgresTodoRepository`]: `PostgreSQL` table store

pub mod config;
pub mod factory;
mod in_memory;
mod mongo;
mod postgres;
mod repository;

pub use config::{AppConfig, ConfigError, LogFormat};
pub use factory::{
    ConfigurationError, FactoryError, Repositories, RepositoryConfig, RepositoryConfigBuilder,
    RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTodoRepository;
pub use mongo::{DEFAULT_COLLECTION, MongoTodoRepository};
pub use postgres::PostgresTodoRepository;
pub use repository::{PaginatedResult, Pagination, RepositoryError, SearchFilter, TodoRepository};
