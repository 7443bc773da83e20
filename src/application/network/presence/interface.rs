use std::net::SocketAddr;
use tokio::io;

/// Datagram transport of the presence protocol.
pub trait MulticastInterface {
    /// Opens the socket and joins the multicast group. May be retried.
    async fn join(&mut self) -> io::Result<()>;

    async fn recv(&self) -> io::Result<(Vec<u8>, SocketAddr)>;

    async fn send_to(&self, data: &[u8], target: SocketAddr) -> io::Result<()>;

    /// Sends to the whole group.
    async fn broadcast(&self, data: &[u8]) -> io::Result<()>;

    async fn leave(&mut self);
}
