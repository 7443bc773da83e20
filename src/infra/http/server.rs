use crate::{application::network::presence::PresenceHandle, domain::Config, infra::http::routes};
use std::net::SocketAddr;
use tokio::{io, net::TcpListener};

pub async fn run(config: &Config, handle: PresenceHandle) -> io::Result<()> {
    tokio::try_join!(run_redirect_server(config, handle), run_file_server(config))?;
    Ok(())
}

async fn run_redirect_server(config: &Config, handle: PresenceHandle) -> io::Result<()> {
    let addr = SocketAddr::new(config.redirect_bind, config.redirect_port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("🌐 Pacman redirect server: http://{addr}");
    axum::serve(listener, routes::redirect_router(handle)).await
}

async fn run_file_server(config: &Config) -> io::Result<()> {
    let addr = SocketAddr::new(config.file_bind, config.multicast_port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        "🌐 Serving {} to peers on http://{addr}",
        config.cache_dir.display()
    );
    axum::serve(listener, routes::file_router(&config.cache_dir)).await
}
