use crate::{
    application::PeerRegistry,
    domain::{Fingerprint, Peer},
    tests::support::{PEER_A, PEER_B, addr_a, addr_b},
};
use std::time::Duration;
use tokio::time::Instant;

const TIMEOUT: Duration = Duration::from_secs(270);

#[test]
fn first_contact_creates_a_connected_peer() {
    let mut registry = PeerRegistry::new(TIMEOUT);
    let now = Instant::now();

    let (peer, is_new) = registry.touch_or_create(&PEER_A.into(), addr_a(), now);

    assert!(is_new);
    assert!(peer.connected);
    assert_eq!(peer.addr, addr_a());
    assert_eq!(peer.hostname, None);
    assert_eq!(registry.len(), 1);
}

#[test]
fn later_contact_refreshes_last_seen_and_keeps_the_first_address() {
    let mut registry = PeerRegistry::new(TIMEOUT);
    let now = Instant::now();
    let later = now + Duration::from_secs(100);

    registry.touch_or_create(&PEER_A.into(), addr_a(), now);
    let (peer, is_new) = registry.touch_or_create(&PEER_A.into(), addr_b(), later);

    assert!(!is_new);
    assert_eq!(peer.last_seen, later);
    assert_eq!(peer.addr, addr_a());
    assert_eq!(registry.len(), 1);
}

#[test]
fn validity_is_connected_and_recent() {
    let now = Instant::now();
    let mut peer = Peer::new(Fingerprint::from(PEER_A), addr_a(), now);

    assert!(peer.is_valid(now + TIMEOUT - Duration::from_millis(1), TIMEOUT));
    assert!(!peer.is_valid(now + TIMEOUT, TIMEOUT));

    peer.connected = false;
    assert!(!peer.is_valid(now, TIMEOUT));
}

#[test]
fn sweep_removes_only_invalid_peers() {
    let mut registry = PeerRegistry::new(TIMEOUT);
    let start = Instant::now();

    registry.touch_or_create(&PEER_A.into(), addr_a(), start);
    registry.touch_or_create(&PEER_B.into(), addr_b(), start + Duration::from_secs(200));

    let removed = registry.sweep(start + Duration::from_secs(300));

    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id, Fingerprint::from(PEER_A));
    assert!(registry.get(&PEER_B.into()).is_some());
}

#[test]
fn disconnect_invalidates_a_fresh_peer() {
    let mut registry = PeerRegistry::new(TIMEOUT);
    let now = Instant::now();

    registry.touch_or_create(&PEER_A.into(), addr_a(), now);

    assert!(registry.mark_disconnected(&PEER_A.into()));
    assert!(!registry.mark_disconnected(&PEER_B.into()));

    let removed = registry.sweep(now);
    assert_eq!(removed.len(), 1);
    assert!(registry.is_empty());
}

#[test]
fn status_reports_resolved_hostnames() {
    let mut registry = PeerRegistry::new(TIMEOUT);
    let now = Instant::now();

    registry.touch_or_create(&PEER_B.into(), addr_b(), now);
    registry.touch_or_create(&PEER_A.into(), addr_a(), now);
    assert!(registry.set_hostname(&PEER_A.into(), "archbox.lan".into()));

    let status = registry.status(now + Duration::from_secs(5));

    assert_eq!(status.len(), 2);
    assert_eq!(status[0].id, PEER_A);
    assert_eq!(status[0].hostname.as_deref(), Some("archbox.lan"));
    assert_eq!(status[0].last_seen_secs, 5);
    assert_eq!(status[1].hostname, None);
}
