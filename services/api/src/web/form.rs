//! services/api/src/web/form.rs
//!
//! Handlers that edit the working assessment form.

use crate::web::{analysis_task::spawn_photo_analysis, state::AppState};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use sanctuary_core::{AssessmentForm, FormError, PropertyField, RoomField};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

//=========================================================================================
// Payload Structs
//=========================================================================================

/// Partial update of the property header; absent fields are left alone.
#[derive(Deserialize, ToSchema, Default)]
pub struct PropertyUpdate {
    pub address: Option<String>,
    pub client: Option<String>,
    pub assessor: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct RoomUpdate {
    /// One of `name`, `emf`, `rf`, `airQuality`, `radon`, `light`, `sound`,
    /// `temperature`, `humidity`, `energeticNotes`.
    #[schema(value_type = String)]
    pub field: RoomField,
    pub value: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<String>,
}

fn form_error_response(e: FormError) -> (StatusCode, String) {
    match e {
        FormError::LastRoom => (StatusCode::BAD_REQUEST, e.to_string()),
        FormError::NoSuchRoom(_) => (StatusCode::NOT_FOUND, e.to_string()),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /form - The working form
#[utoipa::path(
    get,
    path = "/form",
    responses(
        (status = 200, description = "Property header and rooms, each with a stable id"),
        (status = 401, description = "No active session")
    )
)]
pub async fn get_form_handler(State(state): State<Arc<AppState>>) -> Json<AssessmentForm> {
    Json(state.workspace.lock().await.form.clone())
}

/// PUT /form/property - Edit the property header
#[utoipa::path(
    put,
    path = "/form/property",
    request_body = PropertyUpdate,
    responses(
        (status = 200, description = "Updated form"),
        (status = 401, description = "No active session")
    )
)]
pub async fn update_property_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<PropertyUpdate>,
) -> Json<AssessmentForm> {
    let mut workspace = state.workspace.lock().await;
    let fields = [
        (PropertyField::Address, update.address),
        (PropertyField::Client, update.client),
        (PropertyField::Assessor, update.assessor),
        (PropertyField::Date, update.date),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            workspace.form.update_property(field, value);
        }
    }
    Json(workspace.form.clone())
}

/// POST /form/rooms - Append a blank room
#[utoipa::path(
    post,
    path = "/form/rooms",
    responses(
        (status = 201, description = "Updated form"),
        (status = 401, description = "No active session")
    )
)]
pub async fn add_room_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut workspace = state.workspace.lock().await;
    workspace.form.add_room();
    (StatusCode::CREATED, Json(workspace.form.clone()))
}

/// DELETE /form/rooms/{position} - Remove a room
///
/// The last remaining room cannot be removed. A pending photo analysis for
/// the removed room is cancelled.
#[utoipa::path(
    delete,
    path = "/form/rooms/{position}",
    params(("position" = usize, Path, description = "Zero-based room position")),
    responses(
        (status = 200, description = "Updated form"),
        (status = 400, description = "Only one room remains"),
        (status = 404, description = "No room at that position")
    )
)]
pub async fn remove_room_handler(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
) -> Result<Json<AssessmentForm>, (StatusCode, String)> {
    let mut workspace = state.workspace.lock().await;
    let room_id = workspace
        .form
        .remove_room(position)
        .map_err(form_error_response)?;
    state.cancel_analysis(room_id);
    Ok(Json(workspace.form.clone()))
}

/// PATCH /form/rooms/{position} - Set one field of a room
#[utoipa::path(
    patch,
    path = "/form/rooms/{position}",
    params(("position" = usize, Path, description = "Zero-based room position")),
    request_body = RoomUpdate,
    responses(
        (status = 200, description = "Updated form"),
        (status = 404, description = "No room at that position")
    )
)]
pub async fn update_room_handler(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
    Json(update): Json<RoomUpdate>,
) -> Result<Json<AssessmentForm>, (StatusCode, String)> {
    let mut workspace = state.workspace.lock().await;
    workspace
        .form
        .update_room(position, update.field, update.value)
        .map_err(form_error_response)?;
    Ok(Json(workspace.form.clone()))
}

/// POST /form/rooms/{position}/photos - Attach photos to a room
///
/// Accepts multipart/form-data with one or more file parts. Only the file
/// names are kept. The room's analysis text is filled in after a delay.
#[utoipa::path(
    post,
    path = "/form/rooms/{position}/photos",
    params(("position" = usize, Path, description = "Zero-based room position")),
    request_body(content_type = "multipart/form-data", description = "The photos to attach."),
    responses(
        (status = 202, description = "Photos recorded, analysis pending"),
        (status = 400, description = "No files in the upload"),
        (status = 404, description = "No room at that position")
    )
)]
pub async fn attach_photos_handler(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut names = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        if let Some(name) = field.file_name().filter(|n| !n.is_empty()) {
            names.push(name.to_string());
        }
        // Drain the part; photo contents are not stored.
        field.bytes().await.map_err(|e| {
            error!("Failed to read photo upload: {}", e);
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
    }

    if names.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Multipart form must include at least one file".to_string(),
        ));
    }

    let mut workspace = state.workspace.lock().await;
    let room_id = workspace
        .form
        .attach_photos(position, names)
        .map_err(form_error_response)?;

    let room = workspace
        .form
        .rooms()
        .iter()
        .find(|r| r.id == room_id)
        .map(|r| r.record.clone())
        .unwrap_or_default();
    info!(
        "Attached photos to room {} ({} total), scheduling analysis.",
        room_id,
        room.photo_names.len()
    );
    spawn_photo_analysis(state.clone(), room_id, room.name, room.photo_names);

    Ok((StatusCode::ACCEPTED, Json(workspace.form.clone())))
}

/// GET /form/recommendations - Recommendations for the form as it stands
#[utoipa::path(
    get,
    path = "/form/recommendations",
    responses(
        (status = 200, description = "Preview of the recommendations", body = RecommendationsResponse)
    )
)]
pub async fn preview_recommendations_handler(
    State(state): State<Arc<AppState>>,
) -> Json<RecommendationsResponse> {
    let workspace = state.workspace.lock().await;
    Json(RecommendationsResponse {
        recommendations: workspace.preview_recommendations(),
    })
}
