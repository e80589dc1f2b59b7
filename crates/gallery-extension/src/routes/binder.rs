//! Route binder — registers an extension's operations under its namespace.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use serde::Serialize;

use gallery_core::types::UserRole;
use gallery_core::{AppError, AppResult};

use super::guard::AuthGuard;
use super::handler::{
    MediaRequest, RouteHandler, RouteRequest, json_handler, media_handler, raw_handler,
};
use super::table::{EXTENSION_API_PREFIX, RouteEntry, RouteTable};

/// Route registration handle bound to one extension's unique id.
///
/// Every path is placed under `/extension/<unique_id>/`, so two extensions
/// can never register the same absolute path.
#[derive(Debug, Clone)]
pub struct ExtensionRouter {
    extension_id: String,
    table: Arc<RouteTable>,
}

impl ExtensionRouter {
    /// Creates a router for `extension_id` writing into `table`.
    pub fn new(extension_id: impl Into<String>, table: Arc<RouteTable>) -> Self {
        Self {
            extension_id: extension_id.into(),
            table,
        }
    }

    /// Namespace of this extension, `/extension/<unique_id>`.
    pub fn base_path(&self) -> String {
        format!("{EXTENSION_API_PREFIX}/{}", self.extension_id)
    }

    /// Registers a JSON operation on every path in `relative_paths`.
    ///
    /// With `minimum_role` set, callers are authenticated and role-checked
    /// before `handler` runs. The handler's value is wrapped in the success
    /// envelope; its error in the error envelope. Returns the absolute paths.
    pub async fn register_operation<F, Fut, T>(
        &self,
        method: Method,
        relative_paths: &[&str],
        minimum_role: Option<UserRole>,
        handler: F,
    ) -> AppResult<Vec<String>>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let handler = RouteHandler::Json(json_handler(handler));
        self.bind(method, relative_paths, minimum_role, handler).await
    }

    /// Registers a GET operation.
    pub async fn get<F, Fut, T>(
        &self,
        relative_path: &str,
        minimum_role: Option<UserRole>,
        handler: F,
    ) -> AppResult<String>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        self.single(Method::GET, relative_path, minimum_role, handler)
            .await
    }

    /// Registers a POST operation.
    pub async fn post<F, Fut, T>(
        &self,
        relative_path: &str,
        minimum_role: Option<UserRole>,
        handler: F,
    ) -> AppResult<String>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        self.single(Method::POST, relative_path, minimum_role, handler)
            .await
    }

    /// Registers a PUT operation.
    pub async fn put<F, Fut, T>(
        &self,
        relative_path: &str,
        minimum_role: Option<UserRole>,
        handler: F,
    ) -> AppResult<String>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        self.single(Method::PUT, relative_path, minimum_role, handler)
            .await
    }

    /// Registers a DELETE operation.
    pub async fn delete<F, Fut, T>(
        &self,
        relative_path: &str,
        minimum_role: Option<UserRole>,
        handler: F,
    ) -> AppResult<String>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        self.single(Method::DELETE, relative_path, minimum_role, handler)
            .await
    }

    /// Registers a media operation.
    ///
    /// The JSON body must carry `media`, a gallery-relative path. The item is
    /// resolved and the caller's access to it checked before `handler` runs.
    /// Media routes always authenticate; `minimum_role` defaults to the
    /// lowest role. With `invalidate_cache`, cached listings of the item's
    /// directory are dropped after the handler succeeds.
    pub async fn register_media_operation<F, Fut, T>(
        &self,
        method: Method,
        relative_paths: &[&str],
        minimum_role: Option<UserRole>,
        invalidate_cache: bool,
        handler: F,
    ) -> AppResult<Vec<String>>
    where
        F: Fn(MediaRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let handler = RouteHandler::Media {
            handler: media_handler(handler),
            invalidate_cache,
        };
        self.bind(method, relative_paths, minimum_role, handler).await
    }

    /// Registers a raw operation.
    ///
    /// The handler gets the route's guard and the untouched request, and
    /// owns the response completely.
    pub async fn register_raw<F, Fut>(
        &self,
        method: Method,
        relative_paths: &[&str],
        minimum_role: Option<UserRole>,
        handler: F,
    ) -> AppResult<Vec<String>>
    where
        F: Fn(AuthGuard, Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let handler = RouteHandler::Raw(raw_handler(handler));
        self.bind(method, relative_paths, minimum_role, handler).await
    }

    async fn single<F, Fut, T>(
        &self,
        method: Method,
        relative_path: &str,
        minimum_role: Option<UserRole>,
        handler: F,
    ) -> AppResult<String>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let mut paths = self
            .register_operation(method, &[relative_path], minimum_role, handler)
            .await?;
        paths
            .pop()
            .ok_or_else(|| AppError::internal("Route registration returned no path"))
    }

    async fn bind(
        &self,
        method: Method,
        relative_paths: &[&str],
        minimum_role: Option<UserRole>,
        handler: RouteHandler,
    ) -> AppResult<Vec<String>> {
        if relative_paths.is_empty() {
            return Err(AppError::validation("At least one route path is required"));
        }

        let mut registered = Vec::with_capacity(relative_paths.len());
        for raw in relative_paths {
            let relative = normalize_relative_path(raw)?;
            let path = format!("{}/{relative}", self.base_path());

            self.table
                .insert(RouteEntry {
                    method: method.clone(),
                    path: path.clone(),
                    relative_path: relative,
                    owner: self.extension_id.clone(),
                    minimum_role,
                    handler: handler.clone(),
                })
                .await?;
            registered.push(path);
        }
        Ok(registered)
    }
}

fn normalize_relative_path(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::validation("Route path must not be empty"));
    }
    if trimmed.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(AppError::validation(format!("Invalid route path '{raw}'")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use gallery_core::error::ErrorKind;

    use super::*;

    fn router(id: &str) -> (ExtensionRouter, Arc<RouteTable>) {
        let table = Arc::new(RouteTable::new());
        (ExtensionRouter::new(id, table.clone()), table)
    }

    async fn pong(_req: RouteRequest) -> AppResult<&'static str> {
        Ok("pong")
    }

    #[tokio::test]
    async fn test_paths_are_namespaced_by_unique_id() {
        let (router, _) = router("Sample_1");
        let path = router.get("ping", None, pong).await.expect("register");
        assert_eq!(path, "/extension/Sample_1/ping");
    }

    #[tokio::test]
    async fn test_multiple_paths_and_slashes() {
        let (router, table) = router("Sample");
        let paths = router
            .register_operation(Method::POST, &["/a/", "b/c"], None, pong)
            .await
            .expect("register");

        assert_eq!(paths, vec!["/extension/Sample/a", "/extension/Sample/b/c"]);
        assert_eq!(table.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_route_conflicts() {
        let (router, _) = router("Sample");
        router.get("ping", None, pong).await.expect("first");
        let err = router.get("ping", None, pong).await.expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Conflict);

        // Same path with another method is fine.
        router.post("ping", None, pong).await.expect("post");
    }

    #[tokio::test]
    async fn test_same_relative_path_in_two_extensions() {
        let table = Arc::new(RouteTable::new());
        let a = ExtensionRouter::new("Sample", table.clone());
        let b = ExtensionRouter::new("Sample_1", table.clone());

        a.get("ping", None, pong).await.expect("a");
        b.get("ping", None, pong).await.expect("b");

        assert_eq!(table.remove_owner("Sample").await, 1);
        assert!(
            table
                .lookup(&Method::GET, "/extension/Sample_1/ping")
                .await
                .is_some()
        );
    }

    #[test]
    fn test_rejects_bad_paths() {
        assert!(normalize_relative_path("").is_err());
        assert!(normalize_relative_path("/").is_err());
        assert!(normalize_relative_path("a/../b").is_err());
        assert!(normalize_relative_path("a//b").is_err());
        assert_eq!(normalize_relative_path(" /x/y/ ").expect("ok"), "x/y");
    }
}
