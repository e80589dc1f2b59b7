//! Request shapes and handler signatures for extension routes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use gallery_core::AppResult;
use gallery_core::types::{MediaRecord, SessionUser};

use super::guard::AuthGuard;

/// A request routed to a JSON operation.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the extension's namespace.
    pub path: String,
    /// Query string parameters.
    pub params: HashMap<String, String>,
    /// JSON body; `Null` when the request had none.
    pub body: Value,
    /// Caller, when the route requires a role.
    pub user: Option<SessionUser>,
}

/// A request routed to a media operation.
#[derive(Debug, Clone)]
pub struct MediaRequest {
    /// Query string parameters.
    pub params: HashMap<String, String>,
    /// JSON body; always carries the `media` path.
    pub body: Value,
    /// Authenticated caller.
    pub user: SessionUser,
    /// The media item named by the body.
    pub media: MediaRecord,
}

pub(crate) type JsonHandler = Arc<dyn Fn(RouteRequest) -> BoxFuture<'static, AppResult<Value>> + Send + Sync>;
pub(crate) type MediaHandler =
    Arc<dyn Fn(MediaRequest) -> BoxFuture<'static, AppResult<Value>> + Send + Sync>;
pub(crate) type RawHandler =
    Arc<dyn Fn(AuthGuard, Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// How a route produces its response.
#[derive(Clone)]
pub enum RouteHandler {
    /// Result wrapped in the success envelope.
    Json(JsonHandler),
    /// Media-bound operation; optionally invalidates the media's directory.
    Media {
        /// The extension's handler.
        handler: MediaHandler,
        /// Invalidate cached listings of the containing directory afterwards.
        invalidate_cache: bool,
    },
    /// Raw request in, raw response out; the extension runs the guard itself.
    Raw(RawHandler),
}

impl RouteHandler {
    /// Short name of the variant, for logs and listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Media { .. } => "media",
            Self::Raw(_) => "raw",
        }
    }
}

impl std::fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

pub(crate) fn json_handler<F, Fut, T>(handler: F) -> JsonHandler
where
    F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    Arc::new(move |request| {
        let fut = handler(request);
        Box::pin(async move { Ok(serde_json::to_value(fut.await?)?) })
    })
}

pub(crate) fn media_handler<F, Fut, T>(handler: F) -> MediaHandler
where
    F: Fn(MediaRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    Arc::new(move |request| {
        let fut = handler(request);
        Box::pin(async move { Ok(serde_json::to_value(fut.await?)?) })
    })
}

pub(crate) fn raw_handler<F, Fut>(handler: F) -> RawHandler
where
    F: Fn(AuthGuard, Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |guard, request| Box::pin(handler(guard, request)))
}
