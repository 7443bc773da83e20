use crate::utils::fs::config_file;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    time::Duration,
};
use tokio::{fs, io};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub multicast_group: Ipv4Addr,
    pub multicast_port: u16,
    pub multicast_ttl: u32,
    pub redirect_port: u16,
    pub redirect_bind: IpAddr,
    pub file_bind: IpAddr,
    pub reannounce_secs: u64,
    pub fallback_wait_ms: u64,
    pub join_retry_secs: u64,
    pub max_join_failures: u32,
    pub resolve_hostnames: bool,
    pub cache_dir: PathBuf,
    pub cache_suffixes: Vec<String>,
    pub mirrorlist: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_mirror: Option<String>,
}

impl Config {
    pub async fn init() -> io::Result<Self> {
        let path = config_file()?;

        if path.exists() {
            let contents = fs::read_to_string(&path).await?;
            toml::from_str(&contents).map_err(io::Error::other)
        } else {
            let cfg = Self::default();

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }

            let contents = toml::to_string_pretty(&cfg).map_err(io::Error::other)?;
            fs::write(path, contents).await?;
            Ok(cfg)
        }
    }

    pub fn presence(&self) -> PresenceSettings {
        PresenceSettings {
            group: self.multicast_group,
            port: self.multicast_port,
            ttl: self.multicast_ttl,
            reannounce: Duration::from_secs(self.reannounce_secs),
            fallback_wait: Duration::from_millis(self.fallback_wait_ms),
            join_retry: Duration::from_secs(self.join_retry_secs),
            max_join_failures: self.max_join_failures,
            resolve_hostnames: self.resolve_hostnames,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            multicast_group: Ipv4Addr::new(228, 0, 2, 35),
            multicast_port: 19432,
            multicast_ttl: 1,
            redirect_port: 19433,
            redirect_bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            file_bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            reannounce_secs: 180,
            fallback_wait_ms: 1000,
            join_retry_secs: 5,
            max_join_failures: 180,
            resolve_hostnames: true,
            cache_dir: PathBuf::from("/var/cache/pacman/pkg"),
            cache_suffixes: vec![".tar.xz".to_string(), ".tar.zst".to_string()],
            mirrorlist: PathBuf::from("/etc/pacman.d/mirrorlist"),
            fallback_mirror: None,
        }
    }
}

/// Timing and addressing knobs of the presence loop.
#[derive(Debug, Clone)]
pub struct PresenceSettings {
    pub group: Ipv4Addr,
    pub port: u16,
    pub ttl: u32,
    pub reannounce: Duration,
    pub fallback_wait: Duration,
    pub join_retry: Duration,
    pub max_join_failures: u32,
    pub resolve_hostnames: bool,
}

impl PresenceSettings {
    /// Peers that stay silent for one and a half announce periods are dropped.
    pub fn peer_timeout(&self) -> Duration {
        self.reannounce.mul_f64(1.5)
    }
}
