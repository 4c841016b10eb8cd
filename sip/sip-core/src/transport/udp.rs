use super::Transport;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::{fmt, io};
use tokio::net::UdpSocket;

const UDP: &str = "UDP";
const MAX_MSG_SIZE: usize = u16::MAX as usize;

/// UDP socket associated with a single server
#[derive(Debug)]
pub struct Udp {
    socket: UdpSocket,
    bound: SocketAddr,
    peer: SocketAddr,
}

impl fmt::Display for Udp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "udp:bound={},peer={}", self.bound, self.peer)
    }
}

impl Udp {
    /// Bind to `local` (port 0 picks an ephemeral port) and associate the socket with `server`
    pub async fn connect(local: SocketAddr, server: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;

        let bound = socket.local_addr()?;

        log::debug!("Bound UDP to {bound}");

        Ok(Self {
            socket,
            bound,
            peer: server,
        })
    }
}

#[async_trait::async_trait]
impl Transport for Udp {
    fn name(&self) -> &'static str {
        UDP
    }

    fn bound(&self) -> SocketAddr {
        self.bound
    }

    fn peer(&self) -> SocketAddr {
        self.peer
    }

    async fn send(&mut self, message: &[u8]) -> io::Result<()> {
        let sent = self.socket.send(message).await?;

        if sent != message.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {sent} of {} bytes", message.len()),
            ));
        }

        Ok(())
    }

    async fn recv(&mut self, buffer: &mut BytesMut) -> io::Result<usize> {
        // datagram sockets have no end of stream, skip empty datagrams
        loop {
            buffer.reserve(MAX_MSG_SIZE);

            let len = self.socket.recv_buf(buffer).await?;

            log::trace!("received {len} bytes from {}", self.peer);

            if len > 0 {
                return Ok(len);
            }
        }
    }
}
