//! Integration tests for extension-contributed routes, hooks, and UI.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{GUEST, TestApp, USER};

#[tokio::test]
async fn test_public_route_needs_no_token() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/extension/Sample/ping", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["pong"], true);
    assert_eq!(res.body["data"]["extension"], "Sample");
}

#[tokio::test]
async fn test_trailing_slash_reaches_same_route() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/extension/Sample/ping/", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_enforces_role() {
    let app = TestApp::new().await;
    let body = json!({ "name": "Ann" });

    let res = app
        .request("POST", "/extension/Sample/greet", Some(body.clone()), None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "UNAUTHORIZED");

    let res = app
        .request("POST", "/extension/Sample/greet", Some(body.clone()), Some(GUEST))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .request("POST", "/extension/Sample/greet", Some(body), Some(USER))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["message"], "Hello, Ann!");
}

#[tokio::test]
async fn test_handler_validation_error_is_reported() {
    let app = TestApp::new().await;

    let res = app
        .request("POST", "/extension/Sample/greet", Some(json!({})), Some(USER))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/extension/Sample/missing", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "NOT_FOUND");

    let res = app.request("DELETE", "/extension/Sample/ping", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_media_button_operates_on_accessible_media() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "POST",
            "/extension/Sample/tag",
            Some(json!({ "media": "trips/beach.jpg", "label": "fav" })),
            Some(USER),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["media"], "trips/beach.jpg");
    assert_eq!(res.body["data"]["label"], "fav");

    let log = app.root().join("data").join("sample").join("tags.jsonl");
    let content = std::fs::read_to_string(log).expect("tag log");
    assert!(content.contains("\"fav\""));
}

#[tokio::test]
async fn test_media_button_rejects_hidden_and_missing_media() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "POST",
            "/extension/Sample/tag",
            Some(json!({ "media": ".private/beach.jpg", "label": "fav" })),
            Some(USER),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .request(
            "POST",
            "/extension/Sample/tag",
            Some(json!({ "media": "trips/none.jpg", "label": "fav" })),
            Some(USER),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request(
            "POST",
            "/extension/Sample/tag",
            Some(json!({ "label": "fav" })),
            Some(USER),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_media_button_requires_authentication() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "POST",
            "/extension/Sample/tag",
            Some(json!({ "media": "trips/beach.jpg", "label": "fav" })),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_photo_metadata_runs_after_hook() {
    let app = TestApp::new().await;

    let res = app
        .request("GET", "/api/gallery/metadata?path=trips/beach.jpg", None, Some(USER))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["name"], "beach.jpg");
    assert_eq!(res.body["data"]["keywords"], json!(["sample"]));
}

#[tokio::test]
async fn test_video_metadata_is_untouched() {
    let app = TestApp::new().await;

    let res = app
        .request("GET", "/api/gallery/metadata?path=clips/surf.mp4", None, Some(USER))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["keywords"], json!([]));
}

#[tokio::test]
async fn test_hidden_metadata_is_forbidden() {
    let app = TestApp::new().await;

    let res = app
        .request("GET", "/api/gallery/metadata?path=.private/beach.jpg", None, Some(USER))
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_query_is_normalized_by_before_hook() {
    let app = TestApp::new().await;

    let res = app
        .request("GET", "/api/gallery/search?query=%20%20BEACH%20", None, Some(USER))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["items"], json!(["trips/beach.jpg"]));
}

#[tokio::test]
async fn test_media_buttons_follow_role() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/gallery/buttons", None, Some(USER)).await;
    assert_eq!(res.status, StatusCode::OK);
    let buttons = res.body["data"].as_array().expect("buttons");
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0]["extension_id"], "Sample");
    assert_eq!(buttons[0]["api_path"], "/extension/Sample/tag");

    let res = app.request("GET", "/api/gallery/buttons", None, Some(GUEST)).await;
    assert_eq!(res.body["data"], json!([]));
}
