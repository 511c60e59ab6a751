//! Navigation state carried in the URL query string.
//!
//! Three parameters make up the contract: `page` (1-based, omitted when 1),
//! `todoId` (omitted when nothing is selected) and `search` (omitted when
//! empty). Every navigation derives the whole query from these three values.

use serde::{Deserialize, Serialize};

use crate::domain::TodoId;

/// Query parameters as they arrive, before normalization.
///
/// Every field is a string so that a malformed `page` never rejects the
/// request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationParams {
    /// Raw page number.
    #[serde(default)]
    pub page: Option<String>,
    /// Raw selected record id.
    #[serde(default)]
    pub todo_id: Option<String>,
    /// Raw search text.
    #[serde(default)]
    pub search: Option<String>,
}

/// Normalized navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationQuery {
    page: u32,
    todo_id: Option<TodoId>,
    search: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializedQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    todo_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

impl Default for NavigationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            todo_id: None,
            search: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl From<NavigationParams> for NavigationQuery {
    fn from(params: NavigationParams) -> Self {
        let page = params
            .page
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);

        Self {
            page,
            todo_id: non_empty(params.todo_id).map(TodoId::new),
            search: non_empty(params.search),
        }
    }
}

impl NavigationQuery {
    /// Parses a raw query string such as `page=2&search=milk`.
    ///
    /// Unknown parameters are ignored. A query that cannot be decoded at all
    /// yields the default state.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        serde_urlencoded::from_str::<NavigationParams>(raw.trim_start_matches('?'))
            .map(Self::from)
            .unwrap_or_default()
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Selected record, if any.
    #[must_use]
    pub const fn todo_id(&self) -> Option<&TodoId> {
        self.todo_id.as_ref()
    }

    /// Search text, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Same state on another page. Pages below 1 read as 1.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Same state with another selection.
    #[must_use]
    pub fn with_selected(&self, todo_id: Option<TodoId>) -> Self {
        Self {
            todo_id,
            ..self.clone()
        }
    }

    /// Same state with other search text. Blank text removes the parameter.
    #[must_use]
    pub fn with_search(&self, search: Option<&str>) -> Self {
        Self {
            search: non_empty(search.map(str::to_string)),
            ..self.clone()
        }
    }

    /// Encodes the state, omitting defaults.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let serialized = SerializedQuery {
            page: (self.page > 1).then_some(self.page),
            todo_id: self.todo_id.as_ref().map(TodoId::as_str),
            search: self.search.as_deref(),
        };
        serde_urlencoded::to_string(&serialized).unwrap_or_default()
    }

    /// Link target on the list page.
    #[must_use]
    pub fn to_href(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{query}")
        }
    }
}
