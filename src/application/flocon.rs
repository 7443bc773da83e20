use crate::{
    application::{
        PackageCache,
        network::presence::{MulticastInterface, PresenceHandle, PresenceService},
    },
    domain::{Config, Fingerprint, MirrorTemplate},
    infra::{self, mirrorlist, network::multicast::UdpMulticaster},
};
use tokio::io;
use tracing::{info, warn};

pub struct Flocon<M: MulticastInterface> {
    config: Config,
    local_id: Fingerprint,
    mirror: Option<MirrorTemplate>,
    presence_service: PresenceService<M>,
    handle: PresenceHandle,
}

impl Flocon<UdpMulticaster> {
    pub async fn new_default() -> io::Result<Self> {
        let config = Config::init().await?;

        let hostname = hostname::get()?.to_string_lossy().to_string();
        let local_id = Fingerprint::generate(&hostname);

        let adapter = UdpMulticaster::new(
            config.multicast_group,
            config.multicast_port,
            config.multicast_ttl,
        );

        Ok(Self::new(config, local_id, adapter).await)
    }
}

impl<M: MulticastInterface> Flocon<M> {
    pub async fn new(config: Config, local_id: Fingerprint, adapter: M) -> Self {
        let mirror = load_fallback_mirror(&config).await;
        let cache = PackageCache::new(config.cache_dir.clone(), config.cache_suffixes.clone());

        let (presence_service, handle) = PresenceService::new(
            adapter,
            local_id.clone(),
            config.presence(),
            cache,
            mirror.clone(),
        );

        Self {
            config,
            local_id,
            mirror,
            presence_service,
            handle,
        }
    }

    pub async fn run(self) -> io::Result<()> {
        self.log_banner();

        let Self {
            config,
            presence_service,
            handle,
            ..
        } = self;

        tokio::select! {
            res = presence_service.run() => res?,
            res = infra::http::server::run(&config, handle.clone()) => res?,
            res = watch_signals(handle) => res?,
        }

        info!("✅ Flocon gracefully shutdown");
        Ok(())
    }

    fn log_banner(&self) {
        info!("Id: {}", self.local_id);
        info!("Multicast group: {}", self.config.multicast_group);
        info!("Multicast port: {}", self.config.multicast_port);

        match local_ip_address::local_ip() {
            Ok(ip) => info!("Local address: {ip}"),
            Err(err) => warn!("Could not determine local address: {err}"),
        }

        match &self.mirror {
            Some(mirror) => info!("Fallback mirror: {mirror}"),
            None => warn!("No fallback mirror, downloads no peer has will get 404"),
        }
    }
}

async fn load_fallback_mirror(config: &Config) -> Option<MirrorTemplate> {
    let source = match &config.fallback_mirror {
        Some(url) => Some(url.clone()),
        None => mirrorlist::find_fallback_mirror(&config.mirrorlist).await,
    };

    let Some(source) = source else {
        warn!("Fallback mirror was not found in your configuration");
        return None;
    };

    match MirrorTemplate::parse(&source) {
        Ok(mirror) => Some(mirror),
        Err(err) => {
            warn!("Ignoring fallback mirror: {err}");
            None
        }
    }
}

/// Maps process signals onto the presence control channel. Returns only
/// once a shutdown was requested and the presence loop has stopped.
async fn watch_signals(handle: PresenceHandle) -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigusr1 = signal(SignalKind::user_defined1())?;
        let mut sigusr2 = signal(SignalKind::user_defined2())?;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 SIGINT");
                    break;
                }

                _ = sigterm.recv() => {
                    info!("🛑 SIGTERM");
                    break;
                }

                _ = sigusr1.recv() => {
                    let _ = handle.status().await;
                }

                _ = sigusr2.recv() => {
                    let _ = handle.resume().await;
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("🛑 SIGINT");
    }

    handle.shutdown().await;
    std::future::pending().await
}
