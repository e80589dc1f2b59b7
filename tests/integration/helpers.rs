//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use gallery_api::AppState;
use gallery_core::config::AppConfig;
use gallery_core::config::auth::{ApiTokenConfig, AuthConfig};
use gallery_core::config::extension::ExtensionsConfig;
use gallery_core::config::gallery::GalleryConfig;
use gallery_core::types::UserRole;
use gallery_extension::extension::Extension;
use gallery_extension::loader::BuiltinLoader;

pub const ADMIN: &str = "admin-token";
pub const USER: &str = "user-token";
pub const GUEST: &str = "guest-token";

const ENTRY: &str = "extension.bin";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the extension runtime
    pub state: AppState,
    /// Temporary root holding media, extensions, and data
    pub dir: TempDir,
}

/// Parsed response
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when empty)
    pub body: Value,
}

impl TestApp {
    /// App with the sample extension installed, enabled, and initialized.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        write_media(dir.path());
        write_extension_folder(&dir.path().join("extensions").join("sample"));
        std::fs::write(
            dir.path().join("extensions.json"),
            json!({ "sample": { "path": "sample", "enabled": true, "configs": null } })
                .to_string(),
        )
        .expect("extensions.json");

        let app = Self::build(dir).await;
        let summary = app.state.extensions.init_all().await.expect("init_all");
        assert_eq!(summary.initialized.len(), 1, "sample should initialize");
        app
    }

    /// App with nothing installed and a local catalog offering the sample.
    pub async fn with_catalog() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        write_media(dir.path());

        let archive = dir.path().join("sample.zip");
        write_sample_archive(&archive);
        std::fs::write(
            dir.path().join("catalog.json"),
            json!([
                {
                    "id": "sample",
                    "name": "Sample",
                    "description": "Sample extension",
                    "zipUrl": archive.display().to_string(),
                }
            ])
            .to_string(),
        )
        .expect("catalog.json");

        Self::build(dir).await
    }

    async fn build(dir: TempDir) -> Self {
        let root = dir.path();
        let catalog = root.join("catalog.json");
        let config = AppConfig {
            auth: AuthConfig {
                tokens: vec![
                    token(ADMIN, "root", UserRole::Admin),
                    token(USER, "alice", UserRole::User),
                    token(GUEST, "visitor", UserRole::Guest),
                ],
            },
            gallery: GalleryConfig {
                root: path(root.join("media")),
            },
            extensions: ExtensionsConfig {
                folder: path(root.join("extensions")),
                scratch_directory: path(root.join("scratch")),
                data_directory: path(root.join("data")),
                config_file: path(root.join("extensions.json")),
                entry_file: ENTRY.to_string(),
                catalog_url: catalog.exists().then(|| path(catalog)),
                ..ExtensionsConfig::default()
            },
            ..AppConfig::default()
        };

        let loader = BuiltinLoader::new().with("sample", || {
            Arc::new(extension_sample::SampleExtension::new()) as Arc<dyn Extension>
        });
        let state = gallery_api::build_state(config, Arc::new(loader))
            .await
            .expect("state");
        let router = gallery_api::build_app(state.clone());

        Self { router, state, dir }
    }

    /// Sends a request through the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response is not JSON")
        };

        TestResponse { status, body }
    }

    /// Root of the temporary tree.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

fn token(token: &str, username: &str, role: UserRole) -> ApiTokenConfig {
    ApiTokenConfig {
        token: token.to_string(),
        username: username.to_string(),
        role,
    }
}

fn path(p: PathBuf) -> String {
    p.display().to_string()
}

fn write_media(root: &Path) {
    for file in ["trips/beach.jpg", "trips/dunes.png", "clips/surf.mp4", ".private/beach.jpg"] {
        let path = root.join("media").join(file);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, b"media").expect("write media");
    }
}

fn write_extension_folder(folder: &Path) {
    std::fs::create_dir_all(folder).expect("mkdir");
    std::fs::write(folder.join(ENTRY), b"bin").expect("entry");
    std::fs::write(folder.join("extension.toml"), "name = \"Sample\"\n").expect("manifest");
}

/// Archive with a single top-level directory, as release zips usually are.
fn write_sample_archive(path: &Path) {
    let file = std::fs::File::create(path).expect("create zip");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in [
        ("sample-1.0.0/extension.bin", "bin"),
        ("sample-1.0.0/extension.toml", "name = \"Sample\"\nversion = \"1.0.0\"\n"),
    ] {
        zip.start_file(name, options).expect("start");
        zip.write_all(content.as_bytes()).expect("write");
    }
    zip.finish().expect("finish");
}
