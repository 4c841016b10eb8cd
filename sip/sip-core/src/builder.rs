use crate::config::RequestConfig;
use crate::ident::{IdGenerator, Identifiers};
use bytes::Bytes;
use rand::Rng;
use sip_types::{Method, SIP_VERSION};
use std::fmt;
use std::net::IpAddr;

const MAX_FORWARDS: u32 = 5;

/// A fully rendered request, ready to be written to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipMessage(Bytes);

impl SipMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SipMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Renders the OPTIONS or INVITE request of an exchange.
///
/// Both methods produce the same header set, they only differ in the method token of the
/// request line and the `CSeq` header.
#[derive(Debug, Clone, Copy)]
pub struct MessageBuilder<'c> {
    config: &'c RequestConfig,
    local_ip: IpAddr,
}

impl<'c> MessageBuilder<'c> {
    /// `local_ip` is the address the request is sent from, it ends up in `Via` and `Call-ID`
    pub fn new(config: &'c RequestConfig, local_ip: IpAddr) -> Self {
        Self { config, local_ip }
    }

    /// Render the configured method with the given identifiers
    pub fn build(&self, ids: &Identifiers) -> SipMessage {
        self.build_method(self.config.method(), ids)
    }

    pub fn build_method(&self, method: Method, ids: &Identifiers) -> SipMessage {
        let rendered = Rendered {
            builder: self,
            method,
            ids,
        };

        SipMessage(Bytes::from(rendered.to_string()))
    }

    /// Render the configured method with fresh identifiers
    pub fn build_random<R: Rng>(&self, generator: &mut IdGenerator<R>) -> SipMessage {
        self.build(&Identifiers::generate(generator))
    }
}

struct Rendered<'b> {
    builder: &'b MessageBuilder<'b>,
    method: Method,
    ids: &'b Identifiers,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.builder.config;
        let local_host = HostDisplay(self.builder.local_ip);

        write!(
            f,
            "{} {} {SIP_VERSION}\r\n",
            self.method,
            config.request_uri()
        )?;

        write!(
            f,
            "Via: {SIP_VERSION}/{} {local_host}",
            config.transport().name()
        )?;
        if config.local_port() != 0 {
            write!(f, ":{}", config.local_port())?;
        }
        write!(f, ";rport;branch={}\r\n", self.ids.branch)?;

        write!(f, "Max-Forwards: {MAX_FORWARDS}\r\n")?;
        write!(f, "To: <{}>\r\n", config.request_uri())?;
        write!(f, "From: <{}>;tag={}\r\n", config.from_uri(), self.ids.tag)?;
        write!(f, "Call-ID: {}@{local_host}\r\n", self.ids.call_id)?;
        write!(f, "CSeq: {} {}\r\n", self.ids.cseq, self.method)?;
        write!(f, "Content-Length: 0\r\n")?;
        f.write_str("\r\n")
    }
}

/// Prints IPv6 addresses in brackets
struct HostDisplay(IpAddr);

impl fmt::Display for HostDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            IpAddr::V4(ip) => write!(f, "{ip}"),
            IpAddr::V6(ip) => write!(f, "[{ip}]"),
        }
    }
}
