use crate::{application::network::presence::PresenceHandle, infra::http::controllers};
use axum::Router;
use std::path::Path;
use tower_http::services::ServeDir;

/// The server pacman talks to: package redirects plus the admin endpoints.
pub fn redirect_router(handle: PresenceHandle) -> Router {
    Router::new()
        .merge(controllers::admin::router(handle.clone()))
        .merge(controllers::download::router(handle))
}

/// The server peers are redirected to: the package cache, by filename.
pub fn file_router(cache_dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(cache_dir))
}
