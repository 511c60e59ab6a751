//! Todo domain model.
//!
//! This module contains the record type shared by every layer, the validated
//! input type accepted by the record operations, and the clock abstraction
//! used to stamp creation and update times.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Maximum number of characters accepted for a title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum number of characters accepted for a description.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Opaque identifier of a todo record.
///
/// The store assigns the value at creation time (a UUID for the in-memory and
/// `PostgreSQL` stores, an `ObjectId` hex string for `MongoDB`). The domain
/// never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps a store-assigned identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
///
/// Serialized as an RFC 3339 string with millisecond precision, the format
/// the document store keeps in `createdAt` / `updatedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parses an RFC 3339 timestamp string.
    ///
    /// # Errors
    ///
    /// Returns the underlying `chrono` parse error when the text is not RFC 3339.
    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|datetime| Self(datetime.with_timezone(&Utc)))
    }

    /// Formats the timestamp as stored: RFC 3339, milliseconds, `Z` suffix.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Formats the timestamp for display in the UI.
    #[must_use]
    pub fn to_display(&self) -> String {
        self.0.format("%b %-d, %Y %H:%M").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for stamping records.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

// =============================================================================
// Entities
// =============================================================================

/// A todo record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Store-assigned identifier.
    pub id: TodoId,
    /// Non-empty short text.
    pub title: String,
    /// Free text, empty when not provided.
    #[serde(default)]
    pub description: String,
    /// Set once at creation.
    pub created_at: Timestamp,
    /// Set on every update, absent until the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Todo {
    /// Returns true when the title or description contains `needle`.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

// =============================================================================
// Validated Input
// =============================================================================

/// Validation failure on user-supplied record fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Title and description that passed validation.
///
/// This is the only way record content reaches the store, so a persisted
/// title is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    title: String,
    description: String,
}

impl TodoDraft {
    /// Validates raw form input.
    ///
    /// The title is trimmed; the description is kept as typed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the title is blank or either field is
    /// longer than its limit.
    pub fn new(title: &str, description: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::new("title", "Title is required"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ValidationError::new(
                "title",
                format!("Title must be at most {MAX_TITLE_LENGTH} characters"),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::new(
                "description",
                format!("Description must be at most {MAX_DESCRIPTION_LENGTH} characters"),
            ));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    /// Returns the validated title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn fixed_timestamp() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
    }

    #[rstest]
    fn test_timestamp_rfc3339_round_trip() {
        let timestamp = fixed_timestamp();
        let text = timestamp.to_rfc3339();

        assert_eq!(text, "2024-05-01T10:00:00.000Z");
        assert_eq!(Timestamp::parse(&text).unwrap(), timestamp);
    }

    #[rstest]
    fn test_timestamp_parse_accepts_offsets() {
        let parsed = Timestamp::parse("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed, fixed_timestamp());
    }

    #[rstest]
    fn test_timestamp_parse_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[rstest]
    fn test_todo_serializes_camel_case_and_omits_missing_update() {
        let todo = Todo {
            id: TodoId::new("abc"),
            title: "Buy milk".to_string(),
            description: String::new(),
            created_at: fixed_timestamp(),
            updated_at: None,
        };

        let json = serde_json::to_value(&todo).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00.000Z");
        assert!(json.get("updatedAt").is_none());
    }

    #[rstest]
    #[case("Write report", "due Friday", "report", true)]
    #[case("Write report", "due Friday", "FRIDAY", true)]
    #[case("Write report", "due Friday", "milk", false)]
    fn test_todo_matches(
        #[case] title: &str,
        #[case] description: &str,
        #[case] query: &str,
        #[case] expected: bool,
    ) {
        let todo = Todo {
            id: TodoId::new("1"),
            title: title.to_string(),
            description: description.to_string(),
            created_at: fixed_timestamp(),
            updated_at: None,
        };

        assert_eq!(todo.matches(&query.to_lowercase()), expected);
    }

    #[rstest]
    fn test_draft_trims_title() {
        let draft = TodoDraft::new("  Buy milk  ", " two litres ").unwrap();
        assert_eq!(draft.title(), "Buy milk");
        assert_eq!(draft.description(), " two litres ");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn test_draft_rejects_blank_title(#[case] title: &str) {
        let error = TodoDraft::new(title, "").unwrap_err();
        assert_eq!(error.field, "title");
        assert_eq!(error.message, "Title is required");
    }

    #[rstest]
    fn test_draft_rejects_long_fields() {
        let long_title = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert_eq!(TodoDraft::new(&long_title, "").unwrap_err().field, "title");

        let long_description = "y".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert_eq!(
            TodoDraft::new("ok", &long_description).unwrap_err().field,
            "description"
        );
    }
}
