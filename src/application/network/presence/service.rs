use crate::{
    application::{
        Orchestrator, PackageCache, PeerRegistry,
        network::presence::{handle::PresenceHandle, interface::MulticastInterface},
        orchestrator::Dispatch,
    },
    domain::{
        Datagram, DownloadPath, Fingerprint, Message, MirrorTemplate, Peer, PeerStatus,
        PresenceCommand, PresenceSettings, Redirect,
    },
    infra::network::dns,
};
use std::net::{IpAddr, SocketAddr};
use tokio::{
    io,
    sync::{
        mpsc::{self, Receiver, Sender},
        oneshot,
    },
    task::AbortHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Joining { failures: u32 },
    /// Too many failed joins in a row; only a resume command re-arms joining.
    Suspended { failures: u32 },
    Active,
}

impl LinkState {
    fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    fn is_joining(&self) -> bool {
        matches!(self, Self::Joining { .. })
    }
}

/// Owns the multicast socket, the peer registry and every pending download
/// request. All of them are only touched from [`PresenceService::run`].
pub struct PresenceService<M: MulticastInterface> {
    adapter: M,
    local_id: Fingerprint,
    settings: PresenceSettings,
    registry: PeerRegistry,
    orchestrator: Orchestrator,
    cache: PackageCache,
    link: LinkState,
    commands_tx: Sender<PresenceCommand>,
    commands_rx: Receiver<PresenceCommand>,
}

impl<M: MulticastInterface> PresenceService<M> {
    pub fn new(
        adapter: M,
        local_id: Fingerprint,
        settings: PresenceSettings,
        cache: PackageCache,
        mirror: Option<MirrorTemplate>,
    ) -> (Self, PresenceHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = PresenceHandle::new(commands_tx.clone());

        let service = Self {
            adapter,
            local_id,
            registry: PeerRegistry::new(settings.peer_timeout()),
            orchestrator: Orchestrator::new(mirror),
            cache,
            link: LinkState::Joining { failures: 0 },
            settings,
            commands_tx,
            commands_rx,
        };

        (service, handle)
    }

    pub async fn run(mut self) -> io::Result<()> {
        let period = self.settings.reannounce;

        let mut reannounce = time::interval(period);
        reannounce.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut sweep = time::interval_at(Instant::now() + period, period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut retry_at = Instant::now();

        loop {
            tokio::select! {
                res = self.adapter.recv(), if self.link.is_active() => match res {
                    Ok((data, src)) => self.handle_datagram(&data, src).await,
                    Err(err) => warn!("Multicast receive error: {err}"),
                },

                cmd = self.commands_rx.recv() => match cmd {
                    Some(PresenceCommand::Shutdown) | None => break,
                    Some(cmd) => {
                        if self.handle_command(cmd).await {
                            retry_at = Instant::now();
                        }
                    }
                },

                _ = reannounce.tick(), if self.link.is_active() => {
                    debug!("Sending presence to multicast group");
                    self.broadcast(Message::Ping).await;
                }

                _ = sweep.tick() => self.sweep(),

                _ = time::sleep_until(retry_at), if self.link.is_joining() => {
                    if self.try_join().await {
                        // Announce right away, then once per period.
                        reannounce.reset_immediately();
                    } else {
                        retry_at = Instant::now() + self.settings.join_retry;
                    }
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn try_join(&mut self) -> bool {
        let LinkState::Joining { failures } = self.link else {
            return false;
        };

        match self.adapter.join().await {
            Ok(()) => {
                info!(
                    "📡 Joined multicast group {}:{} (ttl {})",
                    self.settings.group, self.settings.port, self.settings.ttl
                );
                self.link = LinkState::Active;
                true
            }
            Err(err) => {
                let failures = failures + 1;

                if failures >= self.settings.max_join_failures {
                    warn!(
                        "Failed to join multicast group {failures} times in a row ({err}), \
                         waiting for a resume command"
                    );
                    self.link = LinkState::Suspended { failures };
                } else {
                    warn!(
                        "Failed to join multicast group ({err}), retrying in {:?}",
                        self.settings.join_retry
                    );
                    self.link = LinkState::Joining { failures };
                }
                false
            }
        }
    }

    /// Returns whether joining should be retried immediately.
    async fn handle_command(&mut self, cmd: PresenceCommand) -> bool {
        match cmd {
            PresenceCommand::Download { path, reply } => {
                self.handle_download(path, reply).await;
            }

            PresenceCommand::FallbackExpired {
                filename,
                generation,
            } => {
                self.orchestrator.expire(&filename, generation);
            }

            PresenceCommand::HostnameResolved { id, hostname } => {
                debug!("Peer {id} resolved to {hostname}");
                self.registry.set_hostname(&id, hostname);
            }

            PresenceCommand::Status(reply) => {
                let _ = reply.send(self.dump_status());
            }

            PresenceCommand::Resume(reply) => {
                let resumed = self.resume();
                let _ = reply.send(resumed);
                return resumed;
            }

            PresenceCommand::Shutdown => {}
        }
        false
    }

    async fn handle_download(&mut self, path: DownloadPath, reply: oneshot::Sender<Redirect>) {
        debug!("Received GET request for {path}");
        let peers = self.registry.all();

        let Dispatch::Query {
            generation,
            targets,
        } = self.orchestrator.begin(path.clone(), reply, &peers)
        else {
            return;
        };

        let query = Message::Has(path.filename.clone());
        for target in targets {
            debug!("Asking {target} for {}", path.filename);
            self.send_to(&query, target).await;
        }

        let timer = self.spawn_fallback_timer(path.filename.clone(), generation);
        self.orchestrator.arm(&path.filename, generation, timer);
    }

    async fn handle_datagram(&mut self, data: &[u8], src: SocketAddr) {
        let Datagram { sender, message } = match Datagram::decode(data) {
            Ok(datagram) => datagram,
            Err(err) => {
                warn!(%src, "Discarding datagram: {err}");
                return;
            }
        };

        debug!(%src, %sender, "Received {message}");

        match message {
            Message::Ping => self.handle_announce(sender, src, true).await,
            Message::Pong => self.handle_announce(sender, src, false).await,
            Message::Disconnect => self.handle_disconnect(&sender),

            Message::Has(filename) => {
                if let Some(peer) = self.known_sender(&sender) {
                    self.handle_has(&peer, &filename).await;
                }
            }

            Message::Yes(filename) => {
                if let Some(peer) = self.known_sender(&sender) {
                    self.orchestrator.vote_yes(&filename, &peer);
                }
            }

            Message::No(filename) => {
                if let Some(peer) = self.known_sender(&sender) {
                    self.orchestrator.vote_no(&filename, &peer.id);
                }
            }
        }
    }

    async fn handle_announce(&mut self, sender: Fingerprint, src: SocketAddr, is_ping: bool) {
        if sender == self.local_id {
            return;
        }

        let (peer, is_new) = self.registry.touch_or_create(&sender, src, Instant::now());
        if !is_new {
            return;
        }

        if self.settings.resolve_hostnames {
            self.spawn_reverse_lookup(peer.id.clone(), peer.ip());
        }

        // Only a PING is answered, so discovery costs one round trip.
        if is_ping {
            self.send_to(&Message::Pong, peer.addr).await;
        }
    }

    fn handle_disconnect(&mut self, sender: &Fingerprint) {
        if self.registry.mark_disconnected(sender) {
            self.sweep();
        } else {
            debug!("Ignoring DISCONNECT from unknown peer {sender}");
        }
    }

    async fn handle_has(&self, peer: &Peer, filename: &str) {
        info!("Peer {peer} asks if I have {filename}");

        let answer = if self.cache.contains(filename).await {
            info!("I have {filename}");
            Message::Yes(filename.to_string())
        } else {
            debug!("{filename} is not in my cache");
            Message::No(filename.to_string())
        };

        self.send_to(&answer, peer.addr).await;
    }

    /// File messages are only honored after a PING/PONG handshake.
    fn known_sender(&self, sender: &Fingerprint) -> Option<Peer> {
        let peer = self.registry.get(sender).cloned();
        if peer.is_none() {
            warn!("Ignoring file message from unknown peer {sender}");
        }
        peer
    }

    fn sweep(&mut self) {
        let removed = self.registry.sweep(Instant::now());
        if !removed.is_empty() {
            debug!("{} peers left, {} removed", self.registry.len(), removed.len());
        }
    }

    fn resume(&mut self) -> bool {
        match self.link {
            LinkState::Suspended { failures } => {
                info!("Resuming multicast join after {failures} failures");
                self.link = LinkState::Joining { failures: 0 };
                true
            }
            state => {
                info!("Resume ignored, link state is {state:?}");
                false
            }
        }
    }

    fn dump_status(&self) -> Vec<PeerStatus> {
        if self.registry.is_empty() {
            info!("No peers known");
        }

        let status = self.registry.status(Instant::now());
        for peer in &status {
            info!(
                "Peer {} host={} ip={} port={} last_seen={}s connected={}",
                peer.id,
                peer.hostname.as_deref().unwrap_or("-"),
                peer.ip,
                peer.port,
                peer.last_seen_secs,
                peer.connected
            );
        }
        status
    }

    fn spawn_fallback_timer(&self, filename: String, generation: u64) -> AbortHandle {
        let tx = self.commands_tx.clone();
        let wait = self.settings.fallback_wait;

        tokio::spawn(async move {
            time::sleep(wait).await;
            let _ = tx
                .send(PresenceCommand::FallbackExpired {
                    filename,
                    generation,
                })
                .await;
        })
        .abort_handle()
    }

    /// Runs off the loop so a slow resolver never stalls the protocol.
    fn spawn_reverse_lookup(&self, id: Fingerprint, ip: IpAddr) {
        let tx = self.commands_tx.clone();

        tokio::spawn(async move {
            if let Some(hostname) = dns::reverse_lookup(ip).await {
                let _ = tx
                    .send(PresenceCommand::HostnameResolved { id, hostname })
                    .await;
            }
        });
    }

    async fn send_to(&self, message: &Message, target: SocketAddr) {
        let data = Datagram::new(self.local_id.clone(), message.clone()).encode();

        if let Err(err) = self.adapter.send_to(&data, target).await {
            warn!(%target, "Failed to send {message}: {err}");
        }
    }

    async fn broadcast(&self, message: Message) {
        let data = Datagram::new(self.local_id.clone(), message.clone()).encode();

        if let Err(err) = self.adapter.broadcast(&data).await {
            warn!("Failed to broadcast {message}: {err}");
        }
    }

    async fn shutdown(&mut self) {
        if self.link.is_active() {
            self.broadcast(Message::Disconnect).await;
            self.adapter.leave().await;
        }
        info!("Presence service stopped");
    }
}
