//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for saving and browsing assessments, and the
//! master definition for the OpenAPI specification.

use crate::web::{auth, form, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use sanctuary_core::{Assessment, AssessmentStatus, AssessmentSummary, WorkspaceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

pub const CERTIFICATE_NOT_IMPLEMENTED: &str = "Certificate generation is not implemented";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::session_handler,
        form::get_form_handler,
        form::update_property_handler,
        form::add_room_handler,
        form::remove_room_handler,
        form::update_room_handler,
        form::attach_photos_handler,
        form::preview_recommendations_handler,
        save_assessment_handler,
        list_assessments_handler,
        get_assessment_handler,
        certificate_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::UserResponse,
            auth::SessionResponse,
            form::PropertyUpdate,
            form::RoomUpdate,
            form::RecommendationsResponse,
            SaveAssessmentRequest,
        )
    ),
    tags(
        (name = "Sanctuary Assessments API", description = "API endpoints for recording property wellness assessments.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Saves the working form with the given status.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SaveAssessmentRequest {
    /// `draft` or `completed`.
    #[schema(value_type = String)]
    pub status: AssessmentStatus,
}

fn storage_error_response(e: WorkspaceError) -> (StatusCode, String) {
    match e {
        WorkspaceError::NotAuthenticated => (StatusCode::UNAUTHORIZED, e.to_string()),
        WorkspaceError::Storage(_) => {
            error!("Assessment storage failure: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save assessment".to_string(),
            )
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Save the working form as a draft or completed assessment.
///
/// Recommendations are computed from the rooms at this moment and stored with
/// the assessment. The form is reset afterwards.
#[utoipa::path(
    post,
    path = "/assessments",
    request_body = SaveAssessmentRequest,
    responses(
        (status = 201, description = "Assessment saved"),
        (status = 401, description = "No active session"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_assessment_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SaveAssessmentRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut workspace = app_state.workspace.lock().await;
    let assessment = workspace
        .save(req.status, Utc::now())
        .await
        .map_err(storage_error_response)?;
    app_state.cancel_all_analyses();

    Ok((StatusCode::CREATED, Json(assessment)))
}

/// List the active user's assessments in the order they were saved.
#[utoipa::path(
    get,
    path = "/assessments",
    responses(
        (status = 200, description = "Assessment summaries"),
        (status = 401, description = "No active session")
    )
)]
pub async fn list_assessments_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<AssessmentSummary>> {
    let mut workspace = app_state.workspace.lock().await;
    workspace.reload_history().await;
    Json(workspace.history().iter().map(Assessment::summary).collect())
}

/// Fetch one of the active user's assessments.
#[utoipa::path(
    get,
    path = "/assessments/{id}",
    params(("id" = u64, Path, description = "Assessment id")),
    responses(
        (status = 200, description = "The assessment with its rooms and recommendations"),
        (status = 404, description = "No such assessment for this user")
    )
)]
pub async fn get_assessment_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Assessment>, (StatusCode, String)> {
    let workspace = app_state.workspace.lock().await;
    workspace
        .assessment(id)
        .await
        .map_err(storage_error_response)?
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Assessment {} not found", id)))
}

/// Download a certificate for an assessment. Not implemented.
#[utoipa::path(
    get,
    path = "/assessments/{id}/certificate",
    params(("id" = u64, Path, description = "Assessment id")),
    responses(
        (status = 404, description = "No such assessment for this user"),
        (status = 501, description = "Certificate generation is not implemented")
    )
)]
pub async fn certificate_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    get_assessment_handler(State(app_state), Path(id)).await?;
    Ok((
        StatusCode::NOT_IMPLEMENTED,
        CERTIFICATE_NOT_IMPLEMENTED.to_string(),
    ))
}
