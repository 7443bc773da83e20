use crate::application::network::presence::MulticastInterface;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::{io, net::UdpSocket};
use tracing::debug;

const MAX_DATAGRAM: usize = 2048;

pub struct UdpMulticaster {
    group: Ipv4Addr,
    port: u16,
    ttl: u32,
    socket: Option<UdpSocket>,
}

impl UdpMulticaster {
    pub fn new(group: Ipv4Addr, port: u16, ttl: u32) -> Self {
        Self {
            group,
            port,
            ttl,
            socket: None,
        }
    }

    fn open(&self) -> io::Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;

        let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port);
        socket.bind(&SockAddr::from(bind_addr))?;

        socket.join_multicast_v4(&self.group, &Ipv4Addr::UNSPECIFIED)?;
        socket.set_multicast_loop_v4(true)?;
        socket.set_multicast_ttl_v4(self.ttl)?;
        socket.set_nonblocking(true)?;

        UdpSocket::from_std(socket.into())
    }

    fn socket(&self) -> io::Result<&UdpSocket> {
        self.socket.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "multicast group not joined")
        })
    }

    fn group_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(self.group), self.port)
    }
}

impl MulticastInterface for UdpMulticaster {
    async fn join(&mut self) -> io::Result<()> {
        self.socket = Some(self.open()?);
        Ok(())
    }

    async fn recv(&self) -> io::Result<(Vec<u8>, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (size, src_addr) = self.socket()?.recv_from(&mut buf).await?;

        buf.truncate(size);
        Ok((buf, src_addr))
    }

    async fn send_to(&self, data: &[u8], target: SocketAddr) -> io::Result<()> {
        self.socket()?.send_to(data, target).await.map(|_| ())
    }

    async fn broadcast(&self, data: &[u8]) -> io::Result<()> {
        self.send_to(data, self.group_addr()).await
    }

    async fn leave(&mut self) {
        if let Some(socket) = self.socket.take() {
            if let Err(err) = socket.leave_multicast_v4(self.group, Ipv4Addr::UNSPECIFIED) {
                debug!("Failed to leave multicast group: {err}");
            }
        }
    }
}
