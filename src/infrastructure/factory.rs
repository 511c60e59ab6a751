//! Repository factory for runtime backend selection.
//!
//! Opens the store selected by configuration and hands back an explicit
//! handle. The handle is shared through application state and released with
//! [`Repositories::shutdown`] once the server has stopped.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `mongodb` | `postgres`
//! - `MONGODB_URI`: `MongoDB` connection string (required when `STORAGE_MODE=mongodb`)
//! - `MONGODB_DATABASE`: database name, defaults to `todo_app`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//!
//! # Example
//!
//! ```ignore
//! let factory = RepositoryFactory::from_env()?;
//! let repositories = factory.open().await?;
//!
//! let todo = repositories.todo_repository.find_by_id(&id).await?;
//!
//! repositories.shutdown().await;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use super::{InMemoryTodoRepository, MongoTodoRepository, PostgresTodoRepository, TodoRepository};

/// Default `MongoDB` database name.
pub const DEFAULT_MONGODB_DATABASE: &str = "todo_app";

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for todo records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage. Suitable for testing and development.
    #[default]
    InMemory,
    /// `MongoDB` document store.
    MongoDb,
    /// `PostgreSQL` table store.
    Postgres,
}

impl StorageMode {
    /// Canonical configuration value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InMemory => "in_memory",
            Self::MongoDb => "mongodb",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Selected storage backend.
    pub storage_mode: StorageMode,
    /// `MongoDB` connection string (required when `storage_mode` is `MongoDb`).
    pub mongodb_uri: Option<String>,
    /// `MongoDB` database name.
    pub mongodb_database: String,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            mongodb_uri: None,
            mongodb_database: DEFAULT_MONGODB_DATABASE.to_string(),
            database_url: None,
        }
    }
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `MONGODB_URI` is missing when `STORAGE_MODE=mongodb`
    /// - `DATABASE_URL` is missing when `STORAGE_MODE=postgres`
    pub fn from_env() -> Result<Self, ConfigurationError> {
        if let Err(env::VarError::NotUnicode(_)) = env::var("STORAGE_MODE") {
            return Err(ConfigurationError::InvalidStorageMode(
                "<non-UTF-8 value>".to_string(),
            ));
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable source.
    ///
    /// Empty and whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = match read("STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let config = Self {
            storage_mode,
            mongodb_uri: read("MONGODB_URI"),
            mongodb_database: read("MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
            database_url: read("DATABASE_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a connection string is missing for the
    /// selected backend.
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        match self.storage_mode {
            StorageMode::MongoDb if self.mongodb_uri.is_none() => {
                Err(ConfigurationError::MissingMongoUri)
            }
            StorageMode::Postgres if self.database_url.is_none() => {
                Err(ConfigurationError::MissingDatabaseUrl)
            }
            _ => Ok(()),
        }
    }
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::MongoDb)
///     .mongodb_uri("mongodb://localhost:27017")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    mongodb_uri: Option<String>,
    mongodb_database: Option<String>,
    database_url: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `MongoDB` connection string.
    #[must_use]
    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    /// Sets the `MongoDB` database name.
    #[must_use]
    pub fn mongodb_database(mut self, name: impl Into<String>) -> Self {
        self.mongodb_database = Some(name.into());
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            mongodb_uri: self.mongodb_uri,
            mongodb_database: self
                .mongodb_database
                .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
            database_url: self.database_url,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors in repository configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory', 'mongodb' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `MONGODB_URI` when storage mode is `MongoDB`.
    #[error("MONGODB_URI environment variable is required when STORAGE_MODE=mongodb")]
    MissingMongoUri,

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,
}

/// Errors that can occur while opening the store.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Handle to the opened store.
#[derive(Clone)]
pub struct Repositories {
    /// Todo repository for record operations.
    pub todo_repository: Arc<dyn TodoRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("todo_repository", &self.todo_repository.backend_name())
            .finish()
    }
}

impl Repositories {
    /// Wraps an in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            todo_repository: Arc::new(InMemoryTodoRepository::new()),
        }
    }

    /// Releases the store connection.
    pub async fn shutdown(&self) {
        tracing::info!(
            backend = self.todo_repository.backend_name(),
            "Closing store connection"
        );
        self.todo_repository.shutdown().await;
    }
}

/// Factory for opening the configured store.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::from_env()?;
/// let repositories = RepositoryFactory::new(config).open().await?;
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates a new repository factory from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::Configuration` if environment configuration is invalid.
    pub fn from_env() -> Result<Self, FactoryError> {
        let config = RepositoryConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Opens the configured store and verifies it is reachable.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if a connection string is missing or the
    /// connection cannot be established.
    pub async fn open(&self) -> Result<Repositories, FactoryError> {
        let todo_repository: Arc<dyn TodoRepository> = match self.config.storage_mode {
            StorageMode::InMemory => Arc::new(InMemoryTodoRepository::new()),
            StorageMode::MongoDb => Arc::new(self.open_mongodb().await?),
            StorageMode::Postgres => Arc::new(self.open_postgres().await?),
        };

        todo_repository
            .health_check()
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

        tracing::info!(
            backend = todo_repository.backend_name(),
            "Store connection opened"
        );

        Ok(Repositories { todo_repository })
    }

    async fn open_mongodb(&self) -> Result<MongoTodoRepository, FactoryError> {
        let uri = self
            .config
            .mongodb_uri
            .as_ref()
            .ok_or(ConfigurationError::MissingMongoUri)?;

        MongoTodoRepository::connect(uri, &self.config.mongodb_database)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }

    async fn open_postgres(&self) -> Result<PostgresTodoRepository, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        let pool = PgPool::connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

        let repository = PostgresTodoRepository::new(pool);
        repository
            .ensure_schema()
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;
        Ok(repository)
    }
}

// =============================================================================
// Tests
// =============================================================================
