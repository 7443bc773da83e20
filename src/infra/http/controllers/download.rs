use crate::{
    application::network::presence::PresenceHandle,
    domain::DownloadPath,
};
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{error, warn};

pub fn router(handle: PresenceHandle) -> Router {
    Router::new()
        .route("/{repo}/os/{arch}/{filename}", get(download))
        .fallback(malformed_path)
        .with_state(handle)
}

async fn download(
    State(handle): State<PresenceHandle>,
    Path((repo, arch, filename)): Path<(String, String, String)>,
) -> Response {
    let path = match DownloadPath::new(&repo, &arch, &filename) {
        Ok(path) => path,
        Err(err) => {
            warn!("Rejecting download of {filename}: {err}");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    match handle.resolve(path).await {
        Ok(redirect) => match redirect.location() {
            Some(url) => (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        Err(err) => {
            error!("Download lookup failed: {err}");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn malformed_path() -> (StatusCode, &'static str) {
    (
        StatusCode::BAD_REQUEST,
        "expected /<repo>/os/<arch>/<filename>",
    )
}
