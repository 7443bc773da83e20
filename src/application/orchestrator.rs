use crate::domain::{DownloadPath, Fingerprint, MirrorTemplate, Peer, Redirect, url::UrlBuilder};
use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
};
use tokio::{sync::oneshot, task::AbortHandle};
use tracing::{debug, info};

/// What the presence loop has to do after a download request was accepted.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Answered on the spot, nothing to send.
    Resolved,
    /// Attached to a request for the same file that is already in flight.
    Joined,
    /// Send HAS to every target and arm the fallback timer for `generation`.
    Query {
        generation: u64,
        targets: Vec<SocketAddr>,
    },
}

struct Waiter {
    path: DownloadPath,
    reply: oneshot::Sender<Redirect>,
}

struct PendingRequest {
    generation: u64,
    awaiting: HashSet<Fingerprint>,
    waiters: Vec<Waiter>,
    timer: Option<AbortHandle>,
}

impl PendingRequest {
    fn finish(self, redirect_for: impl Fn(&DownloadPath) -> Redirect) {
        if let Some(timer) = self.timer {
            timer.abort();
        }

        for waiter in self.waiters {
            // The requester may have hung up already.
            let _ = waiter.reply.send(redirect_for(&waiter.path));
        }
    }
}

/// Decides where each download goes: to the first peer that says YES, or to
/// the fallback mirror once every peer said NO or the grace period ran out.
///
/// At most one request exists per filename.
pub struct Orchestrator {
    mirror: Option<MirrorTemplate>,
    requests: HashMap<String, PendingRequest>,
    next_generation: u64,
}

impl Orchestrator {
    pub fn new(mirror: Option<MirrorTemplate>) -> Self {
        Self {
            mirror,
            requests: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn begin(
        &mut self,
        path: DownloadPath,
        reply: oneshot::Sender<Redirect>,
        peers: &[Peer],
    ) -> Dispatch {
        if let Some(request) = self.requests.get_mut(&path.filename) {
            debug!("Request for {} already in flight, waiting on it", path.filename);
            request.waiters.push(Waiter { path, reply });
            return Dispatch::Joined;
        }

        if peers.is_empty() {
            info!("No peers known, redirecting {} to fallback mirror", path.filename);
            let _ = reply.send(self.fallback(&path));
            return Dispatch::Resolved;
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let targets = peers.iter().map(|peer| peer.addr).collect();
        let request = PendingRequest {
            generation,
            awaiting: peers.iter().map(|peer| peer.id.clone()).collect(),
            waiters: vec![Waiter {
                path: path.clone(),
                reply,
            }],
            timer: None,
        };
        self.requests.insert(path.filename, request);

        Dispatch::Query {
            generation,
            targets,
        }
    }

    /// Attaches the fallback timer of a request. A timer for a request that
    /// is already gone is aborted right away.
    pub fn arm(&mut self, filename: &str, generation: u64, timer: AbortHandle) {
        match self.requests.get_mut(filename) {
            Some(request) if request.generation == generation => request.timer = Some(timer),
            _ => timer.abort(),
        }
    }

    /// First YES wins. Returns whether it settled a pending request.
    pub fn vote_yes(&mut self, filename: &str, peer: &Peer) -> bool {
        let Some(request) = self.requests.remove(filename) else {
            debug!("Ignoring YES for {filename} from {peer}: no pending request");
            return false;
        };

        let url = UrlBuilder::http(peer.ip(), peer.port())
            .segment(filename)
            .build();

        info!("Redirecting {filename} to peer {peer}");
        debug!("Redirect URL: {url}");
        request.finish(|_| Redirect::Peer(url.clone()));
        true
    }

    /// Counts a NO once per queried peer. The last outstanding NO sends the
    /// request to the fallback mirror without waiting for the timer.
    pub fn vote_no(&mut self, filename: &str, voter: &Fingerprint) -> bool {
        let Some(request) = self.requests.get_mut(filename) else {
            debug!("Ignoring NO for {filename} from {voter}: no pending request");
            return false;
        };

        if !request.awaiting.remove(voter) {
            return false;
        }

        debug!(
            "{voter} does not have {filename}, still waiting on {} peers",
            request.awaiting.len()
        );

        if !request.awaiting.is_empty() {
            return false;
        }

        if let Some(request) = self.requests.remove(filename) {
            info!("No peer has {filename}, redirecting to fallback mirror");
            self.settle_fallback(request);
        }
        true
    }

    /// Fires when the grace period of `generation` ran out. Stale timers are
    /// recognised by their generation and ignored.
    pub fn expire(&mut self, filename: &str, generation: u64) -> bool {
        match self.requests.get(filename) {
            Some(request) if request.generation == generation => {}
            _ => return false,
        }

        if let Some(request) = self.requests.remove(filename) {
            info!("Peers too slow for {filename}, redirecting to fallback mirror");
            self.settle_fallback(request);
        }
        true
    }

    pub fn is_pending(&self, filename: &str) -> bool {
        self.requests.contains_key(filename)
    }

    fn settle_fallback(&self, request: PendingRequest) {
        request.finish(|path| self.fallback(path));
    }

    fn fallback(&self, path: &DownloadPath) -> Redirect {
        match &self.mirror {
            Some(mirror) => {
                let url = mirror.render(path);
                debug!("Redirect URL: {url}");
                Redirect::Mirror(url)
            }
            None => Redirect::NotFound,
        }
    }
}
