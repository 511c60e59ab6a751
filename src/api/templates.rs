//! HTML rendering with Tera.
//!
//! Templates are embedded at compile time and autoescaped. The page model
//! below is everything the board template reads.

use serde::Serialize;
use tera::{Context, Tera};

const BOARD_TEMPLATE: &str = "board.html";

/// Compiled templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compiles the embedded templates.
    ///
    /// # Errors
    ///
    /// Returns the Tera error if a template fails to parse.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html")),
            ("macros.html", include_str!("../../templates/macros.html")),
            (BOARD_TEMPLATE, include_str!("../../templates/board.html")),
        ])?;
        Ok(Self { tera })
    }

    /// Renders the board page.
    ///
    /// # Errors
    ///
    /// Returns the Tera error if rendering fails.
    pub fn render_board(&self, page: &BoardPage) -> Result<String, tera::Error> {
        let context = Context::from_serialize(page)?;
        self.tera.render(BOARD_TEMPLATE, &context)
    }
}

// =============================================================================
// Page Model
// =============================================================================

/// Navigation values echoed in hidden form fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NavigationFields {
    /// Current page, omitted when 1.
    pub page: Option<u32>,
    /// Selected record id.
    pub todo_id: Option<String>,
    /// Active search text.
    pub search: Option<String>,
}

/// One row of the list pane.
#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    /// Record id.
    pub id: String,
    /// Record title.
    pub title: String,
    /// Formatted creation time.
    pub created: String,
    /// Link that selects this record.
    pub href: String,
    /// Link that opens the delete dialog for this record.
    pub delete_href: String,
    /// Whether this record is selected.
    pub selected: bool,
}

/// Pagination controls, present when there is more than one page.
#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    /// Current page.
    pub page: u32,
    /// Total pages.
    pub total_pages: u64,
    /// Previous page link, absent on page 1.
    pub prev_href: Option<String>,
    /// Next page link, absent on the last page.
    pub next_href: Option<String>,
}

/// Create form.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeForm {
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
    /// Link that closes the form.
    pub cancel_href: String,
    /// Whether submit is enabled.
    pub can_submit: bool,
}

/// Delete dialog.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmDialog {
    /// Record title.
    pub title: String,
    /// Form action that performs the delete.
    pub action: String,
    /// Link that closes the dialog.
    pub cancel_href: String,
}

/// Detail pane.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailPane {
    /// Nothing selected.
    Empty,
    /// Selected record could not be read.
    NotFound,
    /// Selected record still loading.
    Loading,
    /// Editable record.
    Loaded {
        /// Form action that saves the record.
        action: String,
        /// Title buffer.
        title: String,
        /// Description buffer.
        description: String,
        /// Formatted creation time.
        created: String,
        /// Formatted update time.
        updated: Option<String>,
        /// Whether there are unsaved edits.
        dirty: bool,
        /// Link that opens the delete dialog for this record.
        delete_href: String,
    },
}

/// Everything the board template reads.
#[derive(Debug, Clone, Serialize)]
pub struct BoardPage {
    /// Hidden navigation fields for forms.
    pub navigation: NavigationFields,
    /// Rows on the current page.
    pub items: Vec<ListItem>,
    /// Pagination controls.
    pub pager: Option<Pager>,
    /// Search box contents.
    pub search_text: String,
    /// Link that clears the search, present when a search is active.
    pub clear_search_href: Option<String>,
    /// Link that toggles the create form.
    pub compose_toggle_href: String,
    /// Create form, present when open.
    pub compose: Option<ComposeForm>,
    /// Delete dialog, present when open.
    pub confirm: Option<ConfirmDialog>,
    /// Detail pane.
    pub detail: DetailPane,
    /// Error banner.
    pub banner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn templates() -> Templates {
        Templates::new().unwrap()
    }

    fn empty_page() -> BoardPage {
        BoardPage {
            navigation: NavigationFields::default(),
            items: vec![],
            pager: None,
            search_text: String::new(),
            clear_search_href: None,
            compose_toggle_href: "/?compose=1".to_string(),
            compose: None,
            confirm: None,
            detail: DetailPane::Empty,
            banner: None,
        }
    }

    #[rstest]
    fn test_render_empty_board(templates: Templates) {
        let html = templates.render_board(&empty_page()).unwrap();

        assert!(html.contains("No todos yet. Create your first one!"));
        assert!(html.contains("Select a todo to view details"));
        assert!(!html.contains("Page 1 of"));
    }

    #[rstest]
    fn test_render_escapes_titles(templates: Templates) {
        let mut page = empty_page();
        page.items.push(ListItem {
            id: "a".to_string(),
            title: "<script>alert(1)</script>".to_string(),
            created: "May 1, 2024 10:00".to_string(),
            href: "/?todoId=a".to_string(),
            delete_href: "/?confirmDelete=a".to_string(),
            selected: false,
        });

        let html = templates.render_board(&page).unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[rstest]
    fn test_render_pager_and_dialog(templates: Templates) {
        let mut page = empty_page();
        page.pager = Some(Pager {
            page: 2,
            total_pages: 3,
            prev_href: Some("/".to_string()),
            next_href: Some("/?page=3".to_string()),
        });
        page.confirm = Some(ConfirmDialog {
            title: "Buy milk".to_string(),
            action: "/todos/a/delete".to_string(),
            cancel_href: "/?page=2".to_string(),
        });

        let html = templates.render_board(&page).unwrap();

        assert!(html.contains("Page 2 of 3"));
        assert!(html.contains("Delete this todo?"));
        // Autoescape encodes `/`.
        assert!(html.contains("&#x2F;todos&#x2F;a&#x2F;delete"));
    }
}
