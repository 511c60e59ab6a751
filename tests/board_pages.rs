//! Integration tests for the HTML board.
//!
//! Rendered attribute values pass through Tera's HTML escaping, so the
//! assertions below look for visible text and raw ids rather than links.

mod common;

use axum::http::StatusCode;
use rstest::rstest;

use common::{
    body_json, body_text, create_test_app, form_request, get, location, seed, seed_numbered, send,
};

// =============================================================================
// GET /
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_empty_board() {
    let (app, _) = create_test_app();

    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("No todos yet. Create your first one!"));
    assert!(html.contains("Select a todo to view details"));
    assert!(!html.contains("class=\"pager\""));
    assert!(!html.contains("role=\"dialog\""));
}

#[rstest]
#[tokio::test]
async fn test_board_lists_newest_first() {
    let (app, state) = create_test_app();
    seed(&state, "Buy milk", "").await;
    seed(&state, "Write report", "due Friday").await;

    let html = body_text(send(&app, get("/")).await).await;
    let report = html.find("Write report").unwrap();
    let milk = html.find("Buy milk").unwrap();
    assert!(report < milk);
}

#[rstest]
#[case("/", 1, "Todo 12", "Todo 7")]
#[case("/?page=2", 2, "Todo 7", "Todo 12")]
#[case("/?page=3", 3, "Todo 1", "Todo 3")]
#[tokio::test]
async fn test_board_pagination(
    #[case] uri: &str,
    #[case] page: u32,
    #[case] shown: &str,
    #[case] hidden: &str,
) {
    let (app, state) = create_test_app();
    seed_numbered(&state, 12).await;

    let html = body_text(send(&app, get(uri)).await).await;
    assert!(html.contains(&format!("Page {page} of 3")));
    assert!(html.contains(&format!("<h3>{shown}</h3>")));
    assert!(!html.contains(&format!("<h3>{hidden}</h3>")));
}

#[rstest]
#[tokio::test]
async fn test_board_search_filters_and_offers_clear() {
    let (app, state) = create_test_app();
    seed(&state, "Buy milk", "").await;
    seed(&state, "Walk dog", "").await;

    let html = body_text(send(&app, get("/?search=milk")).await).await;
    assert!(html.contains("<h3>Buy milk</h3>"));
    assert!(!html.contains("<h3>Walk dog</h3>"));
    assert!(html.contains(">Clear</a>"));
    assert!(html.contains("value=\"milk\""));
}

#[rstest]
#[tokio::test]
async fn test_board_invalid_page_reads_as_first() {
    let (app, state) = create_test_app();
    seed_numbered(&state, 6).await;

    let html = body_text(send(&app, get("/?page=abc")).await).await;
    assert!(html.contains("Page 1 of 2"));
}

#[rstest]
#[tokio::test]
async fn test_board_selected_record_fills_detail_pane() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Write report", "due Friday").await;

    let html = body_text(send(&app, get(&format!("/?todoId={id}"))).await).await;
    assert!(html.contains("value=\"Write report\""));
    assert!(html.contains(">due Friday</textarea>"));
    assert!(html.contains("Created: May 1, 2024 09:00"));
    assert!(html.contains("todo selected"));
    assert!(!html.contains("Unsaved changes"));
}

#[rstest]
#[tokio::test]
async fn test_board_missing_selection_shows_not_found() {
    let (app, _) = create_test_app();

    let response = send(&app, get("/?todoId=gone")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Todo not found"));
}

#[rstest]
#[tokio::test]
async fn test_board_compose_flag_opens_form() {
    let (app, _) = create_test_app();

    let html = body_text(send(&app, get("/?compose=1")).await).await;
    assert!(html.contains("Create Todo"));
    assert!(html.contains("placeholder=\"Todo title\""));

    let html = body_text(send(&app, get("/")).await).await;
    assert!(!html.contains("Create Todo"));
}

#[rstest]
#[tokio::test]
async fn test_board_confirm_flag_opens_dialog_with_title() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Walk dog", "").await;

    let html = body_text(send(&app, get(&format!("/?confirmDelete={id}"))).await).await;
    assert!(html.contains("Delete this todo?"));
    assert!(html.contains("&ldquo;Walk dog&rdquo;"));
    assert!(html.contains(id.as_str()));
}

#[rstest]
#[tokio::test]
async fn test_board_confirm_flag_for_missing_record_is_ignored() {
    let (app, state) = create_test_app();
    seed(&state, "Walk dog", "").await;

    let response = send(&app, get("/?confirmDelete=gone")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<h3>Walk dog</h3>"));
    assert!(!html.contains("Delete this todo?"));
    assert!(!html.contains("role=\"dialog\""));
}

#[rstest]
#[tokio::test]
async fn test_board_clean_detail_keeps_save_enabled() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Write report", "").await;

    let html = body_text(send(&app, get(&format!("/?todoId={id}"))).await).await;
    assert!(html.contains("<button type=\"submit\">Save Changes</button>"));
}

#[rstest]
#[tokio::test]
async fn test_board_escapes_titles() {
    let (app, state) = create_test_app();
    seed(&state, "<b>bold</b>", "").await;

    let html = body_text(send(&app, get("/")).await).await;
    assert!(html.contains("&lt;b&gt;bold&lt;"));
    assert!(!html.contains("<b>bold"));
}

// =============================================================================
// GET /search
// =============================================================================

#[rstest]
#[case("/search?q=milk", "/?search=milk")]
#[case("/search?q=%20milk%20&todoId=abc", "/?todoId=abc&search=milk")]
#[case("/search?q=", "/")]
#[case("/search?q=milk+%26+eggs", "/?search=milk+%26+eggs")]
#[tokio::test]
async fn test_search_redirects_to_first_page(#[case] uri: &str, #[case] expected: &str) {
    let (app, _) = create_test_app();

    let response = send(&app, get(uri)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), expected);
}

// =============================================================================
// POST /todos
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_redirects_and_stores() {
    let (app, state) = create_test_app();

    let response = send(
        &app,
        form_request(
            "/todos",
            &[("title", "Buy milk"), ("description", "2 liters"), ("search", "milk")],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?search=milk");

    let listing = state.service.list(1, "").await.unwrap();
    assert_eq!(listing.records.len(), 1);
    assert_eq!(listing.records[0].title, "Buy milk");
    assert_eq!(listing.records[0].description, "2 liters");
}

#[rstest]
#[tokio::test]
async fn test_create_blank_title_rerenders_form() {
    let (app, state) = create_test_app();

    let response = send(
        &app,
        form_request("/todos", &[("title", "  "), ("description", "kept text")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = body_text(response).await;
    assert!(html.contains("Title is required"));
    assert!(html.contains("Create Todo"));
    assert!(html.contains(">kept text</textarea>"));

    assert!(state.service.list(1, "").await.unwrap().records.is_empty());
}

// =============================================================================
// POST /todos/{id}
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_save_redirects_to_selection() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Buy milk", "").await;

    let response = send(
        &app,
        form_request(
            &format!("/todos/{id}"),
            &[("title", "Buy oat milk"), ("description", ""), ("page", "2")],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/?page=2&todoId={id}"));

    let todo = state.service.get_by_id(&id).await.unwrap();
    assert_eq!(todo.title, "Buy oat milk");
    assert!(todo.updated_at.is_some());
}

#[rstest]
#[tokio::test]
async fn test_save_blank_title_keeps_edits() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Buy milk", "").await;

    let response = send(
        &app,
        form_request(
            &format!("/todos/{id}"),
            &[("title", ""), ("description", "edited")],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = body_text(response).await;
    assert!(html.contains("Title is required"));
    assert!(html.contains("Unsaved changes"));
    assert!(html.contains(">edited</textarea>"));

    assert_eq!(state.service.get_by_id(&id).await.unwrap().title, "Buy milk");
}

#[rstest]
#[tokio::test]
async fn test_save_missing_record_reports_not_found() {
    let (app, state) = create_test_app();

    let response = send(
        &app,
        form_request("/todos/gone", &[("title", "New title"), ("description", "")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = body_text(response).await;
    assert!(html.contains("That todo no longer exists."));
    assert!(html.contains("Todo not found"));

    assert!(state.service.list(1, "").await.unwrap().records.is_empty());
}

// =============================================================================
// POST /todos/{id}/delete
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_delete_selected_drops_selection() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Walk dog", "").await;

    let response = send(
        &app,
        form_request(
            &format!("/todos/{id}/delete"),
            &[("page", "2"), ("todoId", id.as_str())],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?page=2");

    let json = body_json(send(&app, get(&format!("/api/todos/{id}"))).await).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[rstest]
#[tokio::test]
async fn test_delete_other_keeps_selection() {
    let (app, state) = create_test_app();
    let kept = seed(&state, "Keep", "").await;
    let removed = seed(&state, "Remove", "").await;

    let response = send(
        &app,
        form_request(
            &format!("/todos/{removed}/delete"),
            &[("todoId", kept.as_str())],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/?todoId={kept}"));
}

#[rstest]
#[tokio::test]
async fn test_delete_missing_still_redirects() {
    let (app, _) = create_test_app();

    let response = send(&app, form_request("/todos/gone/delete", &[])).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}
