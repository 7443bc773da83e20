use crate::domain::{Fingerprint, Peer, PeerStatus};
use std::{collections::HashMap, net::SocketAddr, time::Duration};
use tokio::time::Instant;
use tracing::info;

/// Known peers keyed by fingerprint. Owned by the presence loop, which is
/// the only writer, so no locking happens here.
pub struct PeerRegistry {
    peers: HashMap<Fingerprint, Peer>,
    timeout: Duration,
}

impl PeerRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            peers: HashMap::new(),
            timeout,
        }
    }

    /// Refreshes `last_seen` of a known peer, or registers a new one.
    /// Returns a copy of the entry and whether it was just created.
    pub fn touch_or_create(
        &mut self,
        id: &Fingerprint,
        addr: SocketAddr,
        now: Instant,
    ) -> (Peer, bool) {
        if let Some(peer) = self.peers.get_mut(id) {
            peer.last_seen = now;
            return (peer.clone(), false);
        }

        let peer = Peer::new(id.clone(), addr, now);
        info!("🟢 Peer connected: {peer}");
        self.peers.insert(id.clone(), peer.clone());
        (peer, true)
    }

    pub fn mark_disconnected(&mut self, id: &Fingerprint) -> bool {
        match self.peers.get_mut(id) {
            Some(peer) => {
                peer.connected = false;
                true
            }
            None => false,
        }
    }

    pub fn set_hostname(&mut self, id: &Fingerprint, hostname: String) -> bool {
        match self.peers.get_mut(id) {
            Some(peer) => {
                peer.hostname = Some(hostname);
                true
            }
            None => false,
        }
    }

    /// Drops every peer that is disconnected or silent for too long.
    pub fn sweep(&mut self, now: Instant) -> Vec<Peer> {
        let expired: Vec<Fingerprint> = self
            .peers
            .values()
            .filter(|peer| !peer.is_valid(now, self.timeout))
            .map(|peer| peer.id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| self.peers.remove(id))
            .inspect(|peer| info!("🔴 Peer disconnected: {peer}"))
            .collect()
    }

    pub fn get(&self, id: &Fingerprint) -> Option<&Peer> {
        self.peers.get(id)
    }

    pub fn all(&self) -> Vec<Peer> {
        self.peers.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn status(&self, now: Instant) -> Vec<PeerStatus> {
        let mut list: Vec<PeerStatus> = self.peers.values().map(|p| p.status(now)).collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}
