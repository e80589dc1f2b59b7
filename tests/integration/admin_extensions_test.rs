//! Integration tests for the admin extension management API.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{ADMIN, GUEST, TestApp, USER};

#[tokio::test]
async fn test_admin_endpoints_require_admin() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/admin/extensions", None, Some(USER)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.request("GET", "/api/admin/extensions", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .request("POST", "/api/admin/extensions/sample/reload", None, Some(GUEST))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_installed_reports_active_sample() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/admin/extensions", None, Some(ADMIN)).await;

    assert_eq!(res.status, StatusCode::OK);
    let installed = res.body["data"].as_array().expect("installed");
    assert_eq!(installed.len(), 1);
    assert_eq!(installed[0]["folder_name"], "sample");
    assert_eq!(installed[0]["enabled"], true);
    assert_eq!(installed[0]["state"], "active");
    assert_eq!(installed[0]["unique_id"], "Sample");
    assert_eq!(installed[0]["display_name"], "Sample");
}

#[tokio::test]
async fn test_disable_and_enable_toggle_routes() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "PUT",
            "/api/admin/extensions/sample/enabled",
            Some(json!({ "enabled": false })),
            Some(ADMIN),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["state"], "disabled");

    let res = app.request("GET", "/extension/Sample/ping", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.request("GET", "/api/gallery/buttons", None, Some(USER)).await;
    assert_eq!(res.body["data"], json!([]));

    let res = app
        .request(
            "PUT",
            "/api/admin/extensions/sample/enabled",
            Some(json!({ "enabled": true })),
            Some(ADMIN),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["state"], "active");

    let res = app.request("GET", "/extension/Sample/ping", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_enabling_unknown_folder_is_not_found() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "PUT",
            "/api/admin/extensions/ghost/enabled",
            Some(json!({ "enabled": true })),
            Some(ADMIN),
        )
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reload_keeps_a_single_instance() {
    let app = TestApp::new().await;

    let res = app
        .request("POST", "/api/admin/extensions/sample/reload", None, Some(ADMIN))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["outcome"], "initialized");
    assert_eq!(res.body["data"]["unique_id"], "Sample");

    let res = app
        .request("GET", "/api/admin/extensions/routes", None, Some(ADMIN))
        .await;
    let routes = res.body["data"].as_array().expect("routes");
    assert_eq!(routes.len(), 3);
    assert!(routes.iter().all(|r| r["owner"] == "Sample"));

    let res = app
        .request("GET", "/api/admin/extensions/hooks", None, Some(ADMIN))
        .await;
    assert_eq!(res.body["data"].as_array().expect("hooks").len(), 2);
}

#[tokio::test]
async fn test_reload_of_unknown_folder_is_not_found() {
    let app = TestApp::new().await;

    let res = app
        .request("POST", "/api/admin/extensions/ghost/reload", None, Some(ADMIN))
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reload_of_disabled_extension_reports_disabled() {
    let app = TestApp::new().await;
    app.request(
        "PUT",
        "/api/admin/extensions/sample/enabled",
        Some(json!({ "enabled": false })),
        Some(ADMIN),
    )
    .await;

    let res = app
        .request("POST", "/api/admin/extensions/sample/reload", None, Some(ADMIN))
        .await;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "DISABLED");
}

#[tokio::test]
async fn test_delete_removes_folder_and_routes() {
    let app = TestApp::new().await;

    let res = app
        .request("DELETE", "/api/admin/extensions/sample", None, Some(ADMIN))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["deleted"], "sample");

    assert!(!app.root().join("extensions").join("sample").exists());

    let res = app.request("GET", "/extension/Sample/ping", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.request("GET", "/api/admin/extensions", None, Some(ADMIN)).await;
    assert_eq!(res.body["data"], json!([]));
}

#[tokio::test]
async fn test_delete_rejects_path_like_folder() {
    let app = TestApp::new().await;

    let res = app
        .request("DELETE", "/api/admin/extensions/..", None, Some(ADMIN))
        .await;

    assert!(res.status.is_client_error());
    assert!(app.root().join("extensions").join("sample").exists());
}

#[tokio::test]
async fn test_messenger_send() {
    let app = TestApp::new().await;
    let message = json!({ "subject": "Hi", "body": "Ping", "recipients": ["ops"] });

    let res = app
        .request(
            "POST",
            "/api/admin/extensions/messengers/log",
            Some(message.clone()),
            Some(ADMIN),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["sent"], "log");

    let res = app
        .request(
            "POST",
            "/api/admin/extensions/messengers/pager",
            Some(message),
            Some(ADMIN),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_unavailable_without_location() {
    let app = TestApp::new().await;

    let res = app
        .request("GET", "/api/admin/extensions/catalog", None, Some(ADMIN))
        .await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_install_from_catalog_activates_extension() {
    let app = TestApp::with_catalog().await;

    let res = app
        .request("GET", "/api/admin/extensions/catalog", None, Some(ADMIN))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"][0]["id"], "sample");
    assert_eq!(res.body["data"][0]["name"], "Sample");

    let res = app.request("GET", "/extension/Sample/ping", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request(
            "POST",
            "/api/admin/extensions/install",
            Some(json!({ "id": "sample" })),
            Some(ADMIN),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["unique_id"], "Sample");

    let folder = app.root().join("extensions").join("sample");
    assert!(folder.join("extension.bin").exists());
    assert!(!folder.join("sample-1.0.0").exists());

    let res = app.request("GET", "/extension/Sample/ping", None, None).await;
    assert_eq!(res.status, StatusCode::OK);

    let store = std::fs::read_to_string(app.root().join("extensions.json")).expect("store");
    assert!(store.contains("\"enabled\": true") || store.contains("\"enabled\":true"));
}

#[tokio::test]
async fn test_install_validates_request() {
    let app = TestApp::with_catalog().await;

    let res = app
        .request(
            "POST",
            "/api/admin/extensions/install",
            Some(json!({ "id": "" })),
            Some(ADMIN),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(
            "POST",
            "/api/admin/extensions/install",
            Some(json!({ "id": "unknown" })),
            Some(ADMIN),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
