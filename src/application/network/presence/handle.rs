use crate::domain::{DownloadPath, PeerStatus, PresenceCommand, Redirect};
use tokio::{
    io,
    sync::{mpsc::Sender, oneshot},
};

/// Cloneable entry point into the presence loop.
#[derive(Clone)]
pub struct PresenceHandle {
    tx: Sender<PresenceCommand>,
}

impl PresenceHandle {
    pub fn new(tx: Sender<PresenceCommand>) -> Self {
        Self { tx }
    }

    pub async fn resolve(&self, path: DownloadPath) -> io::Result<Redirect> {
        let (reply, rx) = oneshot::channel();
        self.send(PresenceCommand::Download { path, reply }).await?;
        rx.await.map_err(|_| stopped())
    }

    pub async fn status(&self) -> io::Result<Vec<PeerStatus>> {
        let (reply, rx) = oneshot::channel();
        self.send(PresenceCommand::Status(reply)).await?;
        rx.await.map_err(|_| stopped())
    }

    pub async fn resume(&self) -> io::Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(PresenceCommand::Resume(reply)).await?;
        rx.await.map_err(|_| stopped())
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(PresenceCommand::Shutdown).await;
    }

    async fn send(&self, cmd: PresenceCommand) -> io::Result<()> {
        self.tx.send(cmd).await.map_err(|_| stopped())
    }
}

fn stopped() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "presence service stopped")
}
