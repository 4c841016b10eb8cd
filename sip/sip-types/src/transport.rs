use crate::ParseError;
use std::fmt;
use std::str::FromStr;

/// Transport a request is sent over
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TransportKind {
    Udp,
    Tcp,
    /// TLS over a TCP connection
    Tls,
}

impl TransportKind {
    /// Name of the transport as used in the `Via` header
    pub fn name(self) -> &'static str {
        match self {
            TransportKind::Udp => "UDP",
            TransportKind::Tcp => "TCP",
            TransportKind::Tls => "TLS",
        }
    }

    /// Port a SIP server listens on for this transport by default
    pub fn default_port(self) -> u16 {
        match self {
            TransportKind::Udp | TransportKind::Tcp => 5060,
            TransportKind::Tls => 5061,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [TransportKind::Udp, TransportKind::Tcp, TransportKind::Tls]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Transport(s.into()))
    }
}
