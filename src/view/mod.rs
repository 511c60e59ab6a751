//! View state for the board page.
//!
//! The list pane and detail pane are plain state machines driven by the
//! HTTP handlers. Navigation state lives in the URL query string.

pub mod confirm;
pub mod detail_view;
pub mod list_view;
pub mod navigation;

pub use confirm::DeleteConfirmation;
pub use detail_view::{DetailState, DetailView, Editing};
pub use list_view::{CreateForm, ListState, ListView};
pub use navigation::{NavigationParams, NavigationQuery};
