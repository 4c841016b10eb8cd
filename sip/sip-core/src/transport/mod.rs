//! Connection establishment for the three supported transports.
//!
//! An exchange opens exactly one transport, uses it for one request and drops it.

use crate::config::RequestConfig;
use crate::error::{Error, Result};
use bytes::BytesMut;
use sip_types::TransportKind;
use std::fmt::{Debug, Display};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::{UdpSocket, lookup_host};

mod lines;
pub mod rustls;
pub mod streaming;
pub mod tcp;
pub mod udp;

pub use lines::{LineDecoder, LineReader};

/// Abstraction over a connected transport
#[async_trait::async_trait]
pub trait Transport: Debug + Display + Send {
    /// Must return the name of the transport. (e.g. UDP, TCP, TLS)
    fn name(&self) -> &'static str;

    /// The local address of the transport
    fn bound(&self) -> SocketAddr;

    /// Address of the server the transport is connected to
    fn peer(&self) -> SocketAddr;

    /// Write the complete message or fail
    async fn send(&mut self, message: &[u8]) -> io::Result<()>;

    /// Append received bytes to `buffer`.
    ///
    /// Returns the number of bytes received, `0` if the peer closed the connection.
    async fn recv(&mut self, buffer: &mut BytesMut) -> io::Result<usize>;
}

/// Server and local address of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub server: SocketAddr,
    pub local_ip: IpAddr,
}

/// Resolve the server address and pick the local address to send from.
///
/// If no local address is configured the address the system would route the request from
/// is used.
pub async fn resolve(config: &RequestConfig) -> Result<Resolved> {
    let transport = config.transport();

    let resolution_error = |source| Error::AddressResolution {
        transport,
        address: config.server_address().to_owned(),
        source,
    };

    let mut addrs = lookup_host((config.server_address(), config.server_port()))
        .await
        .map_err(resolution_error)?;

    let server = match config.local_ip() {
        Some(local_ip) => addrs.find(|addr| addr.is_ipv4() == local_ip.is_ipv4()),
        None => addrs.next(),
    }
    .ok_or_else(|| {
        resolution_error(io::Error::new(
            io::ErrorKind::NotFound,
            "no usable address found",
        ))
    })?;

    let local_ip = match config.local_ip() {
        Some(local_ip) => local_ip,
        None => detect_local_ip(server)
            .await
            .map_err(|e| Error::transport(transport, e))?,
    };

    log::debug!("resolved {} to {server}, sending from {local_ip}", config.server_address());

    Ok(Resolved { server, local_ip })
}

/// Let the system select a route to `server` by connecting a throw-away UDP socket
async fn detect_local_ip(server: SocketAddr) -> io::Result<IpAddr> {
    let unspecified: IpAddr = match server {
        SocketAddr::V4(_) => Ipv4Addr::UNSPECIFIED.into(),
        SocketAddr::V6(_) => Ipv6Addr::UNSPECIFIED.into(),
    };

    let socket = UdpSocket::bind((unspecified, 0)).await?;
    socket.connect(server).await?;

    Ok(socket.local_addr()?.ip())
}

/// Connect the configured transport kind to the resolved server
pub async fn connect(config: &RequestConfig, resolved: &Resolved) -> Result<Box<dyn Transport>> {
    let transport = config.transport();
    let to_error = |e| Error::transport(transport, e);

    let connected: Box<dyn Transport> = match transport {
        TransportKind::Udp => {
            let local = SocketAddr::new(resolved.local_ip, config.local_port());

            Box::new(udp::Udp::connect(local, resolved.server).await.map_err(to_error)?)
        }
        TransportKind::Tcp => {
            let stream = tcp::connect(resolved.local_ip, resolved.server)
                .await
                .map_err(to_error)?;

            Box::new(streaming::Streaming::new(stream).map_err(to_error)?)
        }
        TransportKind::Tls => {
            let stream = tcp::connect(resolved.local_ip, resolved.server)
                .await
                .map_err(to_error)?;
            let stream = rustls::connect(config, stream).await.map_err(to_error)?;

            Box::new(streaming::Streaming::new(stream).map_err(to_error)?)
        }
    };

    log::debug!("connected {connected}");

    Ok(connected)
}

/// Resolve and connect, returns the transport and the local address used
pub async fn open(config: &RequestConfig) -> Result<(Box<dyn Transport>, IpAddr)> {
    let resolved = resolve(config).await?;
    let transport = connect(config, &resolved).await?;

    Ok((transport, resolved.local_ip))
}
