//! Route table — live registry of extension routes and their dispatcher.
//!
//! The HTTP layer mounts one catch-all under [`EXTENSION_API_PREFIX`] and
//! forwards every request here, so routes registered or removed at runtime
//! take effect immediately.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::Query;
use axum::http::{Method, Request, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use gallery_core::types::{ApiResponse, UserRole};
use gallery_core::{AppError, AppResult};

use super::guard::{AuthGuard, HostServices};
use super::handler::{JsonHandler, MediaHandler, MediaRequest, RouteHandler, RouteRequest};

/// Path prefix of every extension route.
pub const EXTENSION_API_PREFIX: &str = "/extension";

/// Largest request body accepted by JSON and media routes.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// A registered route.
#[derive(Debug)]
pub struct RouteEntry {
    /// HTTP method.
    pub method: Method,
    /// Absolute path, `/extension/<unique_id>/<relative_path>`.
    pub path: String,
    /// Path below the extension's namespace.
    pub relative_path: String,
    /// Unique id of the owning extension.
    pub owner: String,
    /// Role required to call the route, if any.
    pub minimum_role: Option<UserRole>,
    /// The extension's handler.
    pub handler: RouteHandler,
}

/// A route as reported for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: String,
    /// Absolute path.
    pub path: String,
    /// Owning extension.
    pub owner: String,
    /// Required role.
    pub minimum_role: Option<UserRole>,
    /// `json`, `media`, or `raw`.
    pub kind: &'static str,
}

/// Shared table of extension routes keyed by `(method, path)`.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: RwLock<HashMap<(Method, String), Arc<RouteEntry>>>,
}

impl RouteTable {
    /// Creates an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route. Fails with `Conflict` if `(method, path)` is taken.
    pub async fn insert(&self, entry: RouteEntry) -> AppResult<()> {
        let mut routes = self.routes.write().await;
        let key = (entry.method.clone(), entry.path.clone());

        if routes.contains_key(&key) {
            return Err(AppError::conflict(format!(
                "Route {} {} is already registered",
                entry.method, entry.path
            )));
        }

        info!(
            extension_id = %entry.owner,
            method = %entry.method,
            path = %entry.path,
            kind = entry.handler.kind(),
            "Extension route registered"
        );
        routes.insert(key, Arc::new(entry));
        Ok(())
    }

    /// Removes every route owned by `owner`.
    pub async fn remove_owner(&self, owner: &str) -> usize {
        let mut routes = self.routes.write().await;
        let before = routes.len();
        routes.retain(|_, entry| entry.owner != owner);
        let removed = before - routes.len();

        debug!(extension_id = %owner, removed, "Extension routes removed");
        removed
    }

    /// Removes all routes.
    pub async fn clear(&self) {
        self.routes.write().await.clear();
        info!("Extension route table reset");
    }

    /// Finds the route for `(method, path)`.
    pub async fn lookup(&self, method: &Method, path: &str) -> Option<Arc<RouteEntry>> {
        self.routes
            .read()
            .await
            .get(&(method.clone(), path.to_string()))
            .cloned()
    }

    /// All routes, ordered by path then method.
    pub async fn list(&self) -> Vec<RouteInfo> {
        let routes = self.routes.read().await;
        let mut out: Vec<RouteInfo> = routes
            .values()
            .map(|entry| RouteInfo {
                method: entry.method.to_string(),
                path: entry.path.clone(),
                owner: entry.owner.clone(),
                minimum_role: entry.minimum_role,
                kind: entry.handler.kind(),
            })
            .collect();
        out.sort_by(|a, b| (&a.path, &a.method).cmp(&(&b.path, &b.method)));
        out
    }

    /// Routes `request` to the matching extension handler.
    ///
    /// Unknown routes answer `404` in the error envelope.
    pub async fn dispatch(&self, host: &HostServices, request: Request<Body>) -> Response {
        let method = request.method().clone();
        let path = normalize_request_path(request.uri());

        let Some(entry) = self.lookup(&method, &path).await else {
            debug!(method = %method, path = %path, "No extension route matched");
            return AppError::not_found(format!("No extension route for {method} {path}"))
                .into_response();
        };

        let guard = AuthGuard::new(host.authenticator.clone(), entry.minimum_role);

        let result = match &entry.handler {
            RouteHandler::Raw(handler) => return handler(guard, request).await,
            RouteHandler::Json(handler) => run_json(&entry, handler, &guard, request).await,
            RouteHandler::Media {
                handler,
                invalidate_cache,
            } => run_media(host, handler, *invalidate_cache, &guard, &entry, request).await,
        };

        match result {
            Ok(data) => Json(ApiResponse::ok(data)).into_response(),
            Err(e) => {
                warn!(
                    extension_id = %entry.owner,
                    path = %entry.path,
                    error = %e,
                    "Extension route failed"
                );
                e.into_response()
            }
        }
    }
}

async fn run_json(
    entry: &RouteEntry,
    handler: &JsonHandler,
    guard: &AuthGuard,
    request: Request<Body>,
) -> AppResult<Value> {
    let (parts, body) = request.into_parts();
    let user = guard.check(&parts.headers).await?;
    let params = query_params(&parts.uri)?;
    let body = read_json(body).await?;

    handler(RouteRequest {
        method: parts.method,
        path: entry.relative_path.clone(),
        params,
        body,
        user,
    })
    .await
}

async fn run_media(
    host: &HostServices,
    handler: &MediaHandler,
    invalidate_cache: bool,
    guard: &AuthGuard,
    entry: &RouteEntry,
    request: Request<Body>,
) -> AppResult<Value> {
    let (parts, body) = request.into_parts();
    let role = entry.minimum_role.unwrap_or(UserRole::LimitedGuest);
    let user = guard.require(&parts.headers, role).await?;
    let params = query_params(&parts.uri)?;
    let body = read_json(body).await?;

    let media_path = body
        .get("media")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::validation("Request body must name a 'media' path"))?
        .to_string();

    let media = host
        .gallery
        .find_media(&media_path)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Media '{media_path}' not found")))?;

    if !host.gallery.can_access(&user, &media) {
        return Err(AppError::forbidden(format!("No access to media '{media_path}'")));
    }

    let directory = media.directory.clone();
    let output = handler(MediaRequest {
        params,
        body,
        user,
        media,
    })
    .await?;

    if invalidate_cache {
        if let Err(e) = host.cache.invalidate_directory(&directory).await {
            warn!(
                extension_id = %entry.owner,
                directory = %directory,
                error = %e,
                "Cache invalidation after media operation failed"
            );
        }
    }

    Ok(output)
}

fn normalize_request_path(uri: &Uri) -> String {
    let path = uri.path();
    match path.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn query_params(uri: &Uri) -> AppResult<HashMap<String, String>> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .map_err(|e| AppError::validation(format!("Invalid query string: {e}")))
}

async fn read_json(body: Body) -> AppResult<Value> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::validation(format!("Failed to read request body: {e}")))?;

    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::validation(format!("Request body is not valid JSON: {e}")))
}
