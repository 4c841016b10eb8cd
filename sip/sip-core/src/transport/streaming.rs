//! Generic [`Transport`] over connected byte streams (TCP, TLS)

use super::Transport;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::{fmt, io};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Connected byte stream usable as transport
pub trait StreamingTransport: AsyncRead + AsyncWrite + Unpin + Send + 'static {
    /// Name of the transport. (e.g. TCP, TLS)
    const NAME: &'static str;

    fn local_addr(&self) -> io::Result<SocketAddr>;

    fn peer_addr(&self) -> io::Result<SocketAddr>;
}

pub struct Streaming<S> {
    stream: S,
    bound: SocketAddr,
    peer: SocketAddr,
}

impl<S: StreamingTransport> Streaming<S> {
    pub fn new(stream: S) -> io::Result<Self> {
        Ok(Self {
            bound: stream.local_addr()?,
            peer: stream.peer_addr()?,
            stream,
        })
    }
}

impl<S: StreamingTransport> fmt::Debug for Streaming<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streaming")
            .field("name", &S::NAME)
            .field("bound", &self.bound)
            .field("peer", &self.peer)
            .finish()
    }
}

impl<S: StreamingTransport> fmt::Display for Streaming<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:bound={},peer={}",
            S::NAME.to_ascii_lowercase(),
            self.bound,
            self.peer
        )
    }
}

#[async_trait::async_trait]
impl<S: StreamingTransport> Transport for Streaming<S> {
    fn name(&self) -> &'static str {
        S::NAME
    }

    fn bound(&self) -> SocketAddr {
        self.bound
    }

    fn peer(&self) -> SocketAddr {
        self.peer
    }

    async fn send(&mut self, message: &[u8]) -> io::Result<()> {
        self.stream.write_all(message).await?;
        self.stream.flush().await
    }

    async fn recv(&mut self, buffer: &mut BytesMut) -> io::Result<usize> {
        if buffer.capacity() == buffer.len() {
            buffer.reserve(4096);
        }

        self.stream.read_buf(buffer).await
    }
}
