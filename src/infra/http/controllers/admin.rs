use crate::{application::network::presence::PresenceHandle, domain::PeerStatus};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tracing::error;

pub fn router(handle: PresenceHandle) -> Router {
    Router::new()
        .route("/_flocon/status", get(status))
        .route("/_flocon/resume", post(resume))
        .with_state(handle)
}

async fn status(
    State(handle): State<PresenceHandle>,
) -> Result<Json<Vec<PeerStatus>>, StatusCode> {
    handle.status().await.map(Json).map_err(|err| {
        error!("Status dump failed: {err}");
        StatusCode::SERVICE_UNAVAILABLE
    })
}

async fn resume(State(handle): State<PresenceHandle>) -> StatusCode {
    match handle.resume().await {
        Ok(true) => StatusCode::ACCEPTED,
        Ok(false) => StatusCode::CONFLICT,
        Err(err) => {
            error!("Resume failed: {err}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
