//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout and the current session.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use sanctuary_core::{AuthError, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    /// Defaults to the email address when blank.
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SessionResponse {
    pub user: Option<UserResponse>,
    pub assessment_count: usize,
}

fn auth_error_response(e: AuthError) -> (StatusCode, String) {
    match e {
        AuthError::DuplicateEmail => (StatusCode::CONFLICT, e.to_string()),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, e.to_string()),
        AuthError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        AuthError::Storage(_) => {
            error!("Storage failure during authentication: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save account data".to_string())
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account and log it in
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Missing email or short password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut workspace = state.workspace.lock().await;
    let user = workspace
        .signup(&req.email, &req.password, &req.name, Utc::now().date_naive())
        .await
        .map_err(|e| {
            warn!("Signup rejected for {}: {}", req.email, e);
            auth_error_response(e)
        })?;
    state.cancel_all_analyses();

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut workspace = state.workspace.lock().await;
    let user = workspace
        .login(&req.email, &req.password, Utc::now().date_naive())
        .await
        .map_err(|e| {
            warn!("Login rejected for {}: {}", req.email, e);
            auth_error_response(e)
        })?;
    state.cancel_all_analyses();

    Ok((StatusCode::OK, Json(UserResponse::from(&user))))
}

/// POST /auth/logout - Logout and clear the persisted session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut workspace = state.workspace.lock().await;
    workspace
        .logout(Utc::now().date_naive())
        .await
        .map_err(|e| {
            error!("Failed to clear session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;
    state.cancel_all_analyses();

    Ok(StatusCode::OK)
}

/// GET /auth/session - The active user, if any
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse)
    )
)]
pub async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let workspace = state.workspace.lock().await;
    Json(SessionResponse {
        user: workspace.session().map(UserResponse::from),
        assessment_count: workspace.history().len(),
    })
}
