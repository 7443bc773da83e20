use crate::domain::Fingerprint;
use serde::Serialize;
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Peer {
    pub id: Fingerprint,
    pub addr: SocketAddr,
    pub hostname: Option<String>,
    pub last_seen: Instant,
    pub connected: bool,
}

impl Peer {
    pub fn new(id: Fingerprint, addr: SocketAddr, now: Instant) -> Self {
        Self {
            id,
            addr,
            hostname: None,
            last_seen: now,
            connected: true,
        }
    }

    /// A peer is valid while it is connected and was heard from within `timeout`.
    pub fn is_valid(&self, now: Instant, timeout: Duration) -> bool {
        self.connected && now.saturating_duration_since(self.last_seen) < timeout
    }

    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn status(&self, now: Instant) -> PeerStatus {
        PeerStatus {
            id: self.id.to_string(),
            hostname: self.hostname.clone(),
            ip: self.ip(),
            port: self.port(),
            last_seen_secs: now.saturating_duration_since(self.last_seen).as_secs(),
            connected: self.connected,
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{id = {}; host = {}; addr = {}}}",
            self.id,
            self.hostname.as_deref().unwrap_or("-"),
            self.addr
        )
    }
}

/// Snapshot of a peer as reported by the status dump.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PeerStatus {
    pub id: String,
    pub hostname: Option<String>,
    pub ip: IpAddr,
    pub port: u16,
    pub last_seen_secs: u64,
    pub connected: bool,
}
