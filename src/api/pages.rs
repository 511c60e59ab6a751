//! HTML board page and its form posts.
//!
//! Every request rebuilds the list and detail panes from the URL, drives
//! them through one transition, and either redirects (303) to the derived
//! navigation or re-renders the page with the panes' current state.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::dto::{BoardFlags, SearchForm, TodoForm};
use super::handlers::AppState;
use super::templates::{
    BoardPage, ComposeForm, ConfirmDialog, DetailPane, ListItem, NavigationFields, Pager,
};
use crate::application::{Operation, TodoError};
use crate::domain::TodoId;
use crate::view::{DetailState, DetailView, ListState, ListView, NavigationParams, NavigationQuery};

/// Banner text for a failed page action.
fn banner_for(error: &TodoError) -> String {
    match error {
        TodoError::NotFound(_) => "That todo no longer exists.".to_string(),
        TodoError::Validation(validation) => validation.message.clone(),
        TodoError::Failed(operation) => format!("{}. Please try again.", operation.message()),
    }
}

fn status_for(error: &TodoError) -> StatusCode {
    match error {
        TodoError::NotFound(_) => StatusCode::NOT_FOUND,
        TodoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TodoError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Appends a view-local flag to a navigation link.
fn with_flag(navigation: &NavigationQuery, name: &str, value: &str) -> String {
    let flag = serde_urlencoded::to_string([(name, value)]).unwrap_or_default();
    let query = navigation.to_query_string();
    if query.is_empty() {
        format!("/?{flag}")
    } else {
        format!("/?{query}&{flag}")
    }
}

fn todo_path(id: &TodoId) -> String {
    format!("/todos/{id}")
}

// =============================================================================
// Rendering
// =============================================================================

/// Page-level inputs that are not part of either pane.
#[derive(Debug, Default)]
struct Extras {
    confirm_delete: Option<TodoId>,
    banner: Option<String>,
}

/// Fetches what the panes need and renders the board.
async fn render(
    state: &AppState,
    mut list: ListView,
    mut detail: DetailView,
    extras: Extras,
    status: StatusCode,
) -> Response {
    let mut banner = extras.banner;

    if list.is_stale(state.service.signal()) {
        if let Err(error) = list.refresh(&state.service).await {
            banner.get_or_insert_with(|| banner_for(&error));
        }
    }
    if let Err(error @ TodoError::Failed(_)) = detail.load(&state.service).await {
        banner.get_or_insert_with(|| banner_for(&error));
    }

    if let Some(id) = extras.confirm_delete {
        match confirm_title(state, &list, &detail, &id).await {
            Some(title) => list.request_delete(id, title),
            None => tracing::debug!(id = %id, "No todo to confirm deleting"),
        }
    }

    let page = board_page(&list, &detail, banner);
    match state.templates.render_board(&page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(error) => {
            tracing::error!(error = ?error, "Board template failed to render");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Title shown in the delete dialog, or `None` when the record cannot be read.
async fn confirm_title(
    state: &AppState,
    list: &ListView,
    detail: &DetailView,
    id: &TodoId,
) -> Option<String> {
    let known = list
        .listing()
        .and_then(|listing| listing.records.iter().find(|todo| &todo.id == id))
        .or_else(|| detail.editing().map(|editing| &editing.snapshot).filter(|todo| &todo.id == id))
        .map(|todo| todo.title.clone());

    match known {
        Some(title) => Some(title),
        None => state.service.get_by_id(id).await.ok().map(|todo| todo.title),
    }
}

fn board_page(list: &ListView, detail: &DetailView, banner: Option<String>) -> BoardPage {
    let navigation = list.navigation();

    let items = list
        .listing()
        .map(|listing| {
            listing
                .records
                .iter()
                .map(|todo| ListItem {
                    id: todo.id.to_string(),
                    title: todo.title.clone(),
                    created: todo.created_at.to_display(),
                    href: navigation.with_selected(Some(todo.id.clone())).to_href(),
                    delete_href: with_flag(navigation, "confirmDelete", todo.id.as_str()),
                    selected: navigation.todo_id() == Some(&todo.id),
                })
                .collect()
        })
        .unwrap_or_default();

    let pager = list
        .listing()
        .filter(|listing| listing.total_pages > 1)
        .map(|listing| {
            let page = navigation.page();
            Pager {
                page,
                total_pages: listing.total_pages,
                prev_href: (page > 1).then(|| navigation.with_page(page - 1).to_href()),
                next_href: (u64::from(page) < listing.total_pages)
                    .then(|| navigation.with_page(page + 1).to_href()),
            }
        });

    let compose = list.is_form_open().then(|| ComposeForm {
        title: list.form().title.clone(),
        description: list.form().description.clone(),
        cancel_href: navigation.to_href(),
        can_submit: list.can_submit(),
    });
    let compose_toggle_href = if compose.is_some() {
        navigation.to_href()
    } else {
        with_flag(navigation, "compose", "1")
    };

    let confirm = match list.state() {
        ListState::DeletePending { target, .. } => Some(ConfirmDialog {
            title: target.title().to_string(),
            action: format!("{}/delete", todo_path(target.id())),
            cancel_href: navigation.to_href(),
        }),
        _ => None,
    };

    BoardPage {
        navigation: NavigationFields {
            page: (navigation.page() > 1).then_some(navigation.page()),
            todo_id: navigation.todo_id().map(ToString::to_string),
            search: navigation.search().map(str::to_string),
        },
        items,
        pager,
        search_text: list.search_text().to_string(),
        clear_search_href: navigation
            .search()
            .map(|_| navigation.with_search(None).to_href()),
        compose_toggle_href,
        compose,
        confirm,
        detail: detail_pane(navigation, detail),
        banner,
    }
}

fn detail_pane(navigation: &NavigationQuery, detail: &DetailView) -> DetailPane {
    match detail.state() {
        DetailState::Empty => DetailPane::Empty,
        DetailState::Loading { .. } => DetailPane::Loading,
        DetailState::NotFound { .. } => DetailPane::NotFound,
        DetailState::Loaded(editing) => DetailPane::Loaded {
            action: todo_path(&editing.snapshot.id),
            title: editing.title.clone(),
            description: editing.description.clone(),
            created: editing.snapshot.created_at.to_display(),
            updated: editing.snapshot.updated_at.map(|updated| updated.to_display()),
            dirty: editing.dirty,
            delete_href: with_flag(navigation, "confirmDelete", editing.snapshot.id.as_str()),
        },
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /` renders the board for the query string.
pub async fn board(
    State(state): State<AppState>,
    Query(params): Query<NavigationParams>,
    Query(flags): Query<BoardFlags>,
) -> Response {
    let navigation = NavigationQuery::from(params);

    let mut list = ListView::new(navigation.clone());
    if flags.compose() {
        list.open_create();
    }

    let mut detail = DetailView::new();
    detail.select(navigation.todo_id().cloned());

    let extras = Extras {
        confirm_delete: flags.confirm_delete().map(TodoId::new),
        banner: None,
    };
    render(&state, list, detail, extras, StatusCode::OK).await
}

/// `GET /search` applies the search box and redirects.
pub async fn search(Query(form): Query<SearchForm>) -> Redirect {
    let navigation = NavigationQuery::from(NavigationParams {
        page: None,
        todo_id: form.todo_id,
        search: None,
    });
    let mut list = ListView::new(navigation);
    list.set_search_text(form.q);
    Redirect::to(&list.submit_search().to_href())
}

/// `POST /todos` submits the create form.
pub async fn create(State(state): State<AppState>, Form(form): Form<TodoForm>) -> Response {
    let navigation = NavigationQuery::from(form.navigation());

    let mut list = ListView::new(navigation.clone());
    list.open_create();
    list.set_title(form.title);
    list.set_description(form.description);

    match list.submit_create(&state.service).await {
        Ok(()) => Redirect::to(&list.navigation().to_href()).into_response(),
        Err(error) => {
            let mut detail = DetailView::new();
            detail.select(navigation.todo_id().cloned());
            let extras = Extras {
                confirm_delete: None,
                banner: Some(banner_for(&error)),
            };
            render(&state, list, detail, extras, status_for(&error)).await
        }
    }
}

/// `POST /todos/{id}` saves the detail form.
pub async fn save(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<TodoForm>,
) -> Response {
    let id = TodoId::new(id);
    let navigation = NavigationQuery::from(form.navigation()).with_selected(Some(id.clone()));

    let mut detail = DetailView::new();
    detail.select(Some(id));
    let saved = match detail.load(&state.service).await {
        Ok(()) => {
            detail.edit_title(form.title);
            detail.edit_description(form.description);
            detail.save(&state.service).await
        }
        Err(error @ TodoError::NotFound(_)) => Err(error),
        Err(_) => Err(TodoError::Failed(Operation::Update)),
    };

    match saved {
        Ok(_) => Redirect::to(&navigation.to_href()).into_response(),
        Err(error) => {
            let list = ListView::new(navigation);
            let extras = Extras {
                confirm_delete: None,
                banner: Some(banner_for(&error)),
            };
            render(&state, list, detail, extras, status_for(&error)).await
        }
    }
}

/// `POST /todos/{id}/delete` confirms the delete dialog.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(params): Form<NavigationParams>,
) -> Response {
    let navigation = NavigationQuery::from(params);

    let mut list = ListView::new(navigation.clone());
    list.request_delete(TodoId::new(id), String::new());

    match list.confirm_delete(&state.service).await {
        Ok(next) => Redirect::to(&next.to_href()).into_response(),
        Err(error) => {
            let mut detail = DetailView::new();
            detail.select(navigation.todo_id().cloned());
            let extras = Extras {
                confirm_delete: None,
                banner: Some(banner_for(&error)),
            };
            render(&state, list, detail, extras, status_for(&error)).await
        }
    }
}
