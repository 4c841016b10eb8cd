use super::streaming::StreamingTransport;
use std::io;
use std::net::{IpAddr, SocketAddr};
use tokio::net::{TcpSocket, TcpStream};

/// Connect to `server` from `local_ip` using an ephemeral port
pub async fn connect(local_ip: IpAddr, server: SocketAddr) -> io::Result<TcpStream> {
    let socket = match local_ip {
        IpAddr::V4(_) => TcpSocket::new_v4()?,
        IpAddr::V6(_) => TcpSocket::new_v6()?,
    };

    socket.bind(SocketAddr::new(local_ip, 0))?;

    let stream = socket.connect(server).await?;
    stream.set_nodelay(true)?;

    Ok(stream)
}

impl StreamingTransport for TcpStream {
    const NAME: &'static str = "TCP";

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }
}
