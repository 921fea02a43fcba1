//! services/api/src/web/middleware.rs
//!
//! Session middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::state::AppState;

/// Middleware that requires an active session.
///
/// Handlers behind it can rely on a logged-in user. Without one the request
/// is rejected with 401 Unauthorized.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let logged_in = state.workspace.lock().await.session().is_some();
    if !logged_in {
        debug!("Rejected {} {}: no active session", req.method(), req.uri());
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}
