pub mod analysis_task;
pub mod auth;
pub mod form;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_session;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the API router. Everything outside `/auth` requires an active session.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/session", get(auth::session_handler));

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route("/form", get(form::get_form_handler))
        .route("/form/property", put(form::update_property_handler))
        .route("/form/rooms", post(form::add_room_handler))
        .route(
            "/form/rooms/{position}",
            delete(form::remove_room_handler).patch(form::update_room_handler),
        )
        .route("/form/rooms/{position}/photos", post(form::attach_photos_handler))
        .route("/form/recommendations", get(form::preview_recommendations_handler))
        .route(
            "/assessments",
            post(rest::save_assessment_handler).get(rest::list_assessments_handler),
        )
        .route("/assessments/{id}", get(rest::get_assessment_handler))
        .route("/assessments/{id}/certificate", get(rest::certificate_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
