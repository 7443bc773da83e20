use crate::{
    application::{
        PackageCache,
        network::presence::{MulticastInterface, PresenceHandle, PresenceService},
    },
    domain::{Datagram, Fingerprint, Message, MirrorTemplate, PeerStatus, PresenceSettings},
};
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};
use tempfile::TempDir;
use tokio::{
    io,
    sync::{
        Mutex,
        mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender},
    },
    time,
};

pub const LOCAL_ID: &str = "0000000000000000000000000000000000000000";
pub const PEER_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const PEER_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

pub const PACKAGE: &str = "linux-6.9.1-1-x86_64.pkg.tar.zst";
pub const MIRROR: &str = "https://mirror.example/archlinux/$repo/os/$arch";

pub fn addr_a() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::new(10, 0, 0, 2), 19432))
}

pub fn addr_b() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::new(10, 0, 0, 3), 19432))
}

pub fn settings() -> PresenceSettings {
    PresenceSettings {
        group: Ipv4Addr::new(228, 0, 2, 35),
        port: 19432,
        ttl: 1,
        reannounce: Duration::from_secs(180),
        fallback_wait: Duration::from_secs(1),
        join_retry: Duration::from_secs(5),
        max_join_failures: 180,
        resolve_hostnames: false,
    }
}

pub fn mirror() -> MirrorTemplate {
    MirrorTemplate::parse(MIRROR).unwrap()
}

/// What the service under test put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    To(SocketAddr, Datagram),
    Broadcast(Datagram),
}

pub fn local(message: Message) -> Datagram {
    Datagram::new(LOCAL_ID.into(), message)
}

pub struct MemoryMulticaster {
    inbound: Mutex<Receiver<(Vec<u8>, SocketAddr)>>,
    outbound: UnboundedSender<Sent>,
    failing_joins: u32,
    joins: Arc<AtomicU32>,
}

impl MulticastInterface for MemoryMulticaster {
    async fn join(&mut self) -> io::Result<()> {
        let attempt = self.joins.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.failing_joins {
            return Err(io::Error::other("network is unreachable"));
        }
        Ok(())
    }

    async fn recv(&self) -> io::Result<(Vec<u8>, SocketAddr)> {
        match self.inbound.lock().await.recv().await {
            Some(datagram) => Ok(datagram),
            None => std::future::pending().await,
        }
    }

    async fn send_to(&self, data: &[u8], target: SocketAddr) -> io::Result<()> {
        let datagram = Datagram::decode(data).unwrap();
        self.outbound.send(Sent::To(target, datagram)).unwrap();
        Ok(())
    }

    async fn broadcast(&self, data: &[u8]) -> io::Result<()> {
        let datagram = Datagram::decode(data).unwrap();
        self.outbound.send(Sent::Broadcast(datagram)).unwrap();
        Ok(())
    }

    async fn leave(&mut self) {}
}

/// The test's side of a [`MemoryMulticaster`].
pub struct Network {
    inbound: Sender<(Vec<u8>, SocketAddr)>,
    outbound: UnboundedReceiver<Sent>,
    joins: Arc<AtomicU32>,
}

impl Network {
    pub async fn deliver(&self, sender: &str, message: Message, from: SocketAddr) {
        let data = Datagram::new(Fingerprint::from(sender), message).encode();
        self.deliver_raw(&data, from).await;
    }

    pub async fn deliver_raw(&self, data: &[u8], from: SocketAddr) {
        self.inbound.send((data.to_vec(), from)).await.unwrap();
    }

    /// Registers a peer without provoking a reply.
    pub async fn handshake(&self, sender: &str, from: SocketAddr) {
        self.deliver(sender, Message::Pong, from).await;
        settle().await;
    }

    pub async fn next_sent(&mut self) -> Sent {
        self.outbound.recv().await.unwrap()
    }

    pub fn try_sent(&mut self) -> Option<Sent> {
        self.outbound.try_recv().ok()
    }

    pub async fn expect_announce(&mut self) {
        assert_eq!(self.next_sent().await, Sent::Broadcast(local(Message::Ping)));
    }

    pub fn joins(&self) -> u32 {
        self.joins.load(Ordering::SeqCst)
    }
}

pub struct Harness {
    pub service: PresenceService<MemoryMulticaster>,
    pub handle: PresenceHandle,
    pub net: Network,
    pub cache_dir: TempDir,
}

pub fn harness(settings: PresenceSettings, mirror: Option<MirrorTemplate>) -> Harness {
    harness_with_failing_joins(settings, mirror, 0)
}

pub fn harness_with_failing_joins(
    settings: PresenceSettings,
    mirror: Option<MirrorTemplate>,
    failing_joins: u32,
) -> Harness {
    let (inbound_tx, inbound_rx) = mpsc::channel(64);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let joins = Arc::new(AtomicU32::new(0));

    let adapter = MemoryMulticaster {
        inbound: Mutex::new(inbound_rx),
        outbound: outbound_tx,
        failing_joins,
        joins: joins.clone(),
    };

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = PackageCache::new(
        cache_dir.path().to_path_buf(),
        vec![".pkg.tar.zst".to_string()],
    );

    let (service, handle) =
        PresenceService::new(adapter, LOCAL_ID.into(), settings, cache, mirror);

    Harness {
        service,
        handle,
        net: Network {
            inbound: inbound_tx,
            outbound: outbound_rx,
            joins,
        },
        cache_dir,
    }
}

/// Lets the presence loop drain everything that is already queued.
pub async fn settle() {
    time::sleep(Duration::from_millis(10)).await;
}

pub async fn peer_ids(handle: &PresenceHandle) -> Vec<String> {
    handle
        .status()
        .await
        .unwrap()
        .into_iter()
        .map(|peer: PeerStatus| peer.id)
        .collect()
}
