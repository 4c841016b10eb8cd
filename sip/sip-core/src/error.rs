use sip_types::{ParseError, TransportKind};
use std::io;
use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a single exchange. Every variant aborts the exchange.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{transport}: failed to resolve {address}, {source}")]
    AddressResolution {
        transport: TransportKind,
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("{transport}: connection timed out after {}s", .timeout.as_secs_f64())]
    ConnectTimeout {
        transport: TransportKind,
        timeout: Duration,
    },
    #[error("{transport}: sending the request timed out after {}s", .timeout.as_secs_f64())]
    RequestTimeout {
        transport: TransportKind,
        timeout: Duration,
    },
    #[error("{transport}: no complete response within {}s", .timeout.as_secs_f64())]
    ResponseTimeout {
        transport: TransportKind,
        timeout: Duration,
    },
    #[error("{transport}: {source}")]
    Transport {
        transport: TransportKind,
        #[source]
        source: io::Error,
    },
    #[error("{transport}: received an invalid response {line:?}")]
    WrongResponse {
        transport: TransportKind,
        line: String,
    },
}

impl Error {
    pub(crate) fn transport(transport: TransportKind, source: io::Error) -> Self {
        Self::Transport { transport, source }
    }

    /// Transport the failed exchange was using
    pub fn transport_kind(&self) -> TransportKind {
        match self {
            Error::AddressResolution { transport, .. }
            | Error::ConnectTimeout { transport, .. }
            | Error::RequestTimeout { transport, .. }
            | Error::ResponseTimeout { transport, .. }
            | Error::Transport { transport, .. }
            | Error::WrongResponse { transport, .. } => *transport,
        }
    }
}

/// Rejected request configuration, detected before any exchange is attempted
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("server address must not be empty")]
    MissingAddress,
    #[error("timeout must be greater than zero")]
    InvalidTimeout,
    #[error("{name} {uri:?} is not a sip: or sips: URI")]
    InvalidUri { name: &'static str, uri: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
