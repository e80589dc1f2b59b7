//! Dispatch of extension-contributed routes.

use axum::extract::{Request, State};
use axum::response::Response;

use crate::state::AppState;

/// ANY /extension/{*path}
///
/// Looks the request up in the live route table, so routes registered or
/// removed at runtime take effect without rebuilding the router.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    state.extensions.routes().dispatch(&state.host, request).await
}
