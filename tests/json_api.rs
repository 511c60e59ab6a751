//! Integration tests for the JSON API.
//!
//! # Tests Covered
//!
//! - `GET /api/todos`: newest-first paging and search
//! - `POST /api/todos`: creation and validation
//! - `GET /api/todos/{id}`: read and not found
//! - `PUT /api/todos/{id}`: replace and not found
//! - `DELETE /api/todos/{id}`: idempotent delete
//! - `GET /health`

mod common;

use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use common::{
    body_json, create_test_app, delete, get, json_request, seed, seed_numbered, send,
};

fn titles(listing: &serde_json::Value) -> Vec<String> {
    listing["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["title"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Record Lifecycle
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_read_update_delete_scenario() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        json_request("POST", "/api/todos", &json!({"title": "Buy milk", "description": "2 liters"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let milk = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        json_request("POST", "/api/todos", &json!({"title": "Walk dog"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let listing = body_json(send(&app, get("/api/todos")).await).await;
    assert_eq!(titles(&listing), vec!["Walk dog", "Buy milk"]);
    assert_eq!(listing["totalPages"], 1);

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/todos/{milk}"),
            &json!({"title": "Buy oat milk", "description": "2 liters"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));

    let record = body_json(send(&app, get(&format!("/api/todos/{milk}"))).await).await;
    assert_eq!(record["title"], "Buy oat milk");
    assert_eq!(record["description"], "2 liters");
    assert!(record["updatedAt"].is_string());

    // Updating does not move a record in the newest-first order.
    let listing = body_json(send(&app, get("/api/todos")).await).await;
    assert_eq!(titles(&listing), vec!["Walk dog", "Buy oat milk"]);

    let response = send(&app, delete(&format!("/api/todos/{milk}"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let listing = body_json(send(&app, get("/api/todos")).await).await;
    assert_eq!(titles(&listing), vec!["Walk dog"]);
}

#[rstest]
#[tokio::test]
async fn test_new_record_has_no_updated_at() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Fresh", "").await;

    let record = body_json(send(&app, get(&format!("/api/todos/{id}"))).await).await;
    assert_eq!(record["title"], "Fresh");
    assert_eq!(record["description"], "");
    assert!(record["createdAt"].as_str().unwrap().ends_with('Z'));
    assert!(record.get("updatedAt").is_none());
}

// =============================================================================
// Paging and Search
// =============================================================================

#[rstest]
#[case("/api/todos", 5, "Todo 12")]
#[case("/api/todos?page=2", 5, "Todo 7")]
#[case("/api/todos?page=3", 2, "Todo 2")]
#[case("/api/todos?page=4", 0, "")]
#[case("/api/todos?page=abc", 5, "Todo 12")]
#[tokio::test]
async fn test_list_pages_of_twelve(
    #[case] uri: &str,
    #[case] expected_len: usize,
    #[case] expected_first: &str,
) {
    let (app, state) = create_test_app();
    seed_numbered(&state, 12).await;

    let response = send(&app, get(uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;

    let titles = titles(&listing);
    assert_eq!(titles.len(), expected_len);
    assert_eq!(titles.first().map_or("", String::as_str), expected_first);
    assert_eq!(listing["totalPages"], 3);
}

#[rstest]
#[tokio::test]
async fn test_list_search_matches_title_or_description_case_insensitively() {
    let (app, state) = create_test_app();
    seed(&state, "Buy milk", "").await;
    seed(&state, "Groceries", "MILK and bread").await;
    seed(&state, "Walk dog", "").await;

    let listing = body_json(send(&app, get("/api/todos?search=Milk")).await).await;
    assert_eq!(titles(&listing), vec!["Groceries", "Buy milk"]);
    assert_eq!(listing["totalPages"], 1);
}

#[rstest]
#[tokio::test]
async fn test_list_search_treats_pattern_characters_literally() {
    let (app, state) = create_test_app();
    seed(&state, "a.c", "").await;
    seed(&state, "abc", "").await;

    let listing = body_json(send(&app, get("/api/todos?search=a.c")).await).await;
    assert_eq!(titles(&listing), vec!["a.c"]);
}

#[rstest]
#[tokio::test]
async fn test_list_empty_store() {
    let (app, _) = create_test_app();

    let listing = body_json(send(&app, get("/api/todos")).await).await;
    assert_eq!(listing, json!({"records": [], "totalPages": 0}));
}

// =============================================================================
// Error Responses
// =============================================================================

#[rstest]
#[case(json!({"title": ""}))]
#[case(json!({"title": "   ", "description": "no title"}))]
#[tokio::test]
async fn test_create_blank_title_is_bad_request(#[case] body: serde_json::Value) {
    let (app, _) = create_test_app();

    let response = send(&app, json_request("POST", "/api/todos", &body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = body_json(response).await;
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert_eq!(error["details"][0]["field"], "title");

    let listing = body_json(send(&app, get("/api/todos")).await).await;
    assert_eq!(listing["records"], json!([]));
}

#[rstest]
#[tokio::test]
async fn test_get_missing_is_not_found() {
    let (app, _) = create_test_app();

    let response = send(&app, get("/api/todos/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[rstest]
#[tokio::test]
async fn test_update_missing_is_not_found() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        json_request("PUT", "/api/todos/missing", &json!({"title": "Anything"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_delete_is_idempotent() {
    let (app, state) = create_test_app();
    let id = seed(&state, "Once", "").await;

    for _ in 0..2 {
        let response = send(&app, delete(&format!("/api/todos/{id}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&app, get(&format!("/api/todos/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// GET /health
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_health_reports_backend() {
    let (app, _) = create_test_app();

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage"], "in_memory");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}
