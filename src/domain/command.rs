use crate::domain::{DownloadPath, Fingerprint, PeerStatus, Redirect};
use tokio::sync::oneshot;

/// Everything the presence loop can be asked to do from outside its own socket.
pub enum PresenceCommand {
    /// Decide where a package download should be redirected.
    Download {
        path: DownloadPath,
        reply: oneshot::Sender<Redirect>,
    },

    /// The grace period of a pending request ran out.
    FallbackExpired { filename: String, generation: u64 },

    /// A reverse lookup started at discovery time came back.
    HostnameResolved { id: Fingerprint, hostname: String },

    /// Dump the peer list to the log and hand it back.
    Status(oneshot::Sender<Vec<PeerStatus>>),

    /// Re-arm group joining after it was suspended. Replies whether it was.
    Resume(oneshot::Sender<bool>),

    Shutdown,
}
