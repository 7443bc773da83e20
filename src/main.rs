mod application;
mod domain;
mod infra;
mod utils;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> tokio::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    application::Flocon::new_default().await?.run().await
}

#[cfg(test)]
mod tests {
    pub mod support;

    pub mod http;
    pub mod mirror;
    pub mod orchestrator;
    pub mod presence;
    pub mod protocol;
    pub mod registry;
}
