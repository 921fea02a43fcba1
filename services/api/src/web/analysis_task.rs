//! services/api/src/web/analysis_task.rs
//!
//! The background worker that fills in a room's photo analysis after a delay.

use crate::web::state::AppState;
use sanctuary_core::{ports::PortResult, RoomId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Starts the delayed analysis for `room_id` and returns immediately.
pub fn spawn_photo_analysis(
    app_state: Arc<AppState>,
    room_id: RoomId,
    room_name: String,
    photo_names: Vec<String>,
) {
    let token = app_state.track_analysis(room_id);
    tokio::spawn(async move {
        if let Err(e) =
            photo_analysis_process(app_state.clone(), room_id, room_name, photo_names, token.clone())
                .await
        {
            error!("Photo analysis for room {} failed: {:?}", room_id, e);
        }
        app_state.finish_analysis(room_id, &token);
    });
}

/// Waits out the configured delay, then writes the analysis into the form.
///
/// The update is addressed by room id. If the room was removed, or the token
/// was cancelled in the meantime, nothing is written.
pub async fn photo_analysis_process(
    app_state: Arc<AppState>,
    room_id: RoomId,
    room_name: String,
    photo_names: Vec<String>,
    cancellation_token: CancellationToken,
) -> PortResult<()> {
    tokio::select! {
        _ = cancellation_token.cancelled() => {
            debug!("Photo analysis for room {} cancelled before it ran.", room_id);
            return Ok(());
        }
        _ = tokio::time::sleep(app_state.config.photo_analysis_delay) => {}
    }

    let analysis = app_state
        .photo_analyzer
        .analyze_photos(&room_name, &photo_names)
        .await?;

    let mut workspace = app_state.workspace.lock().await;
    if cancellation_token.is_cancelled() {
        debug!("Photo analysis for room {} cancelled, discarding.", room_id);
        return Ok(());
    }
    if workspace.form.apply_photo_analysis(room_id, analysis) {
        info!("Photo analysis attached to room {}.", room_id);
    } else {
        debug!("Room {} no longer exists, discarding photo analysis.", room_id);
    }
    // Retire the token before the form is visible to other requests again.
    app_state.finish_analysis(room_id, &cancellation_token);
    Ok(())
}
