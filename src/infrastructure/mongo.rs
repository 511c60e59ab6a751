//! `MongoDB` repository implementation.
//!
//! Records live in one collection (`todos` by default) with the document
//! shape below. Timestamps are stored as RFC 3339 strings, so the
//! lexicographic sort on `createdAt` is also chronological.
//!
//! ```json
//! {
//!   "_id": ObjectId("..."),
//!   "title": "Buy milk",
//!   "description": "",
//!   "createdAt": "2024-05-01T10:00:00.000Z",
//!   "updatedAt": "2024-05-02T08:30:00.000Z"
//! }
//! ```

use futures::TryStreamExt;
use futures::future::BoxFuture;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, Regex, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::domain::{Timestamp, Todo, TodoDraft, TodoId};
use crate::infrastructure::{PaginatedResult, Pagination, RepositoryError, SearchFilter, TodoRepository};

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "todos";

/// Document as stored in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

impl TryFrom<TodoDocument> for Todo {
    type Error = RepositoryError;

    fn try_from(document: TodoDocument) -> Result<Self, Self::Error> {
        let parse = |value: &str| {
            Timestamp::parse(value)
                .map_err(|error| RepositoryError::SerializationError(error.to_string()))
        };

        Ok(Self {
            id: TodoId::new(document.id.to_hex()),
            title: document.title,
            description: document.description,
            created_at: parse(&document.created_at)?,
            updated_at: document.updated_at.as_deref().map(parse).transpose()?,
        })
    }
}

fn database_error(error: &mongodb::error::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn parse_object_id(id: &TodoId) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(id.as_str()).map_err(|_| RepositoryError::InvalidId(id.to_string()))
}

/// Builds the `$or` filter for a case-insensitive substring search.
///
/// The search text is escaped, so regex metacharacters match literally.
fn search_document(filter: &SearchFilter) -> Document {
    filter.text().map_or_else(Document::new, |text| {
        let pattern = Bson::RegularExpression(Regex {
            pattern: regex::escape(text),
            options: "i".to_string(),
        });
        doc! {
            "$or": [
                { "title": pattern.clone() },
                { "description": pattern },
            ]
        }
    })
}

/// `MongoDB` implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = MongoTodoRepository::connect("mongodb://localhost:27017", "todo_app").await?;
/// let id = repository.insert(&draft, Timestamp::now()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MongoTodoRepository {
    client: Client,
    collection: Collection<TodoDocument>,
}

impl MongoTodoRepository {
    /// Connects to `MongoDB` and binds the default `todos` collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the URI cannot be parsed or
    /// the client cannot be created.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, RepositoryError> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|error| database_error(&error))?;
        let client = Client::with_options(options).map_err(|error| database_error(&error))?;
        Ok(Self::from_client(client, database, DEFAULT_COLLECTION))
    }

    /// Binds a collection on an existing client.
    #[must_use]
    pub fn from_client(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection::<TodoDocument>(collection);
        Self { client, collection }
    }
}

impl TodoRepository for MongoTodoRepository {
    fn find_by_id(&self, id: &TodoId) -> BoxFuture<'static, Result<Option<Todo>, RepositoryError>> {
        let collection = self.collection.clone();
        let id = id.clone();
        Box::pin(async move {
            let object_id = parse_object_id(&id)?;
            let document = collection
                .find_one(doc! { "_id": object_id })
                .await
                .map_err(|error| database_error(&error))?;
            document.map(Todo::try_from).transpose()
        })
    }

    fn insert(
        &self,
        draft: &TodoDraft,
        created_at: Timestamp,
    ) -> BoxFuture<'static, Result<TodoId, RepositoryError>> {
        let collection = self.collection.clone_with_type::<Document>();
        let document = doc! {
            "title": draft.title(),
            "description": draft.description(),
            "createdAt": created_at.to_rfc3339(),
        };
        Box::pin(async move {
            let result = collection
                .insert_one(document)
                .await
                .map_err(|error| database_error(&error))?;

            match result.inserted_id {
                Bson::ObjectId(object_id) => Ok(TodoId::new(object_id.to_hex())),
                other => Err(RepositoryError::SerializationError(format!(
                    "unexpected inserted id: {other}"
                ))),
            }
        })
    }

    fn update(
        &self,
        id: &TodoId,
        draft: &TodoDraft,
        updated_at: Timestamp,
    ) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let collection = self.collection.clone();
        let id = id.clone();
        let changes = doc! {
            "$set": {
                "title": draft.title(),
                "description": draft.description(),
                "updatedAt": updated_at.to_rfc3339(),
            }
        };
        Box::pin(async move {
            let Ok(object_id) = parse_object_id(&id) else {
                return Ok(false);
            };
            let result = collection
                .update_one(doc! { "_id": object_id }, changes)
                .await
                .map_err(|error| database_error(&error))?;
            Ok(result.matched_count > 0)
        })
    }

    fn delete(&self, id: &TodoId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let collection = self.collection.clone();
        let id = id.clone();
        Box::pin(async move {
            let Ok(object_id) = parse_object_id(&id) else {
                return Ok(false);
            };
            let result = collection
                .delete_one(doc! { "_id": object_id })
                .await
                .map_err(|error| database_error(&error))?;
            Ok(result.deleted_count > 0)
        })
    }

    fn list(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> BoxFuture<'static, Result<PaginatedResult<Todo>, RepositoryError>> {
        let collection = self.collection.clone();
        let query = search_document(filter);
        Box::pin(async move {
            let total = collection
                .count_documents(query.clone())
                .await
                .map_err(|error| database_error(&error))?;

            if total == 0 {
                return Ok(PaginatedResult::new(vec![], 0, pagination));
            }

            let documents: Vec<TodoDocument> = collection
                .find(query)
                .sort(doc! { "createdAt": -1, "_id": -1 })
                .skip(pagination.offset())
                .limit(i64::from(pagination.limit()))
                .await
                .map_err(|error| database_error(&error))?
                .try_collect()
                .await
                .map_err(|error| database_error(&error))?;

            let items = documents
                .into_iter()
                .map(Todo::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(PaginatedResult::new(items, total, pagination))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, Result<(), RepositoryError>> {
        let database = self.client.database(self.collection.namespace().db.as_str());
        Box::pin(async move {
            database
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(|error| database_error(&error))?;
            Ok(())
        })
    }

    fn shutdown(&self) -> BoxFuture<'static, ()> {
        let client = self.client.clone();
        Box::pin(async move {
            client.shutdown().await;
            tracing::info!("MongoDB client shut down");
        })
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

// =============================================================================
// Tests
// =============================================================================
