//! Validated, immutable description of one health check exchange

use crate::error::ConfigError;
use sip_types::{Code, Method, ParseError, TransportKind};
use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Ordered list of expected status codes.
///
/// Each slot is matched against the status code of the response at the same position.
/// A `None` slot accepts any status code.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Expected(Vec<Option<Code>>);

impl Expected {
    pub fn slots(&self) -> &[Option<Code>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of complete responses an exchange waits for, at least one
    pub fn response_count(&self) -> usize {
        self.0.len().max(1)
    }
}

impl FromStr for Expected {
    type Err = ParseError;

    /// Parses a comma separated list like `100,180,200`. Empty entries are wildcard slots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        s.split(',')
            .map(|slot| match slot.trim() {
                "" => Ok(None),
                code => code.parse().map(Some),
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }

            if let Some(code) = slot {
                write!(f, "{code}")?;
            }
        }

        Ok(())
    }
}

/// Everything needed to run one exchange.
///
/// Constructed through [`RequestConfig::builder`], which validates all fields.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    server_address: String,
    server_port: u16,
    transport: TransportKind,
    local_ip: Option<IpAddr>,
    local_port: u16,
    method: Method,
    request_uri: String,
    from_uri: String,
    expected: Expected,
    timeout: Duration,
    verify_tls: bool,
    ca_path: Option<PathBuf>,
    debug: bool,
}

impl RequestConfig {
    pub fn builder<S: Into<String>>(
        server_address: S,
        transport: TransportKind,
    ) -> RequestConfigBuilder {
        RequestConfigBuilder::new(server_address, transport)
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    /// Configured local address, `None` if it must be detected
    pub fn local_ip(&self) -> Option<IpAddr> {
        self.local_ip
    }

    /// Local port to bind, `0` lets the system pick one
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn from_uri(&self) -> &str {
        &self.from_uri
    }

    pub fn expected(&self) -> &Expected {
        &self.expected
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn ca_path(&self) -> Option<&Path> {
        self.ca_path.as_deref()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

#[derive(Debug, Clone)]
pub struct RequestConfigBuilder {
    server_address: String,
    transport: TransportKind,
    server_port: Option<u16>,
    local_ip: Option<IpAddr>,
    local_port: u16,
    method: Method,
    request_uri: Option<String>,
    from_uri: Option<String>,
    expected: Expected,
    timeout: Duration,
    verify_tls: bool,
    ca_path: Option<PathBuf>,
    debug: bool,
}

impl RequestConfigBuilder {
    pub fn new<S: Into<String>>(server_address: S, transport: TransportKind) -> Self {
        Self {
            server_address: server_address.into(),
            transport,
            server_port: None,
            local_ip: None,
            local_port: 0,
            method: Method::Options,
            request_uri: None,
            from_uri: None,
            expected: Expected::default(),
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            ca_path: None,
            debug: false,
        }
    }

    /// Server port, defaults to the transport's well known port
    pub fn server_port(&mut self, port: u16) -> &mut Self {
        self.server_port = Some(port);
        self
    }

    pub fn local_ip(&mut self, ip: IpAddr) -> &mut Self {
        self.local_ip = Some(ip);
        self
    }

    pub fn local_port(&mut self, port: u16) -> &mut Self {
        self.local_port = port;
        self
    }

    pub fn method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    /// Request-URI, defaults to `sip:<server>:<port>`
    pub fn request_uri<S: Into<String>>(&mut self, uri: S) -> &mut Self {
        self.request_uri = Some(uri.into());
        self
    }

    /// URI used in the `From` header, defaults to `sip:sipcheck@<server>`
    pub fn from_uri<S: Into<String>>(&mut self, uri: S) -> &mut Self {
        self.from_uri = Some(uri.into());
        self
    }

    pub fn expected(&mut self, expected: Expected) -> &mut Self {
        self.expected = expected;
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn verify_tls(&mut self, verify: bool) -> &mut Self {
        self.verify_tls = verify;
        self
    }

    /// PEM file or directory of PEM files with trusted certificate authorities
    pub fn ca_path<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.ca_path = Some(path.into());
        self
    }

    pub fn debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    pub fn build(&self) -> Result<RequestConfig, ConfigError> {
        let server_address = self.server_address.trim();

        if server_address.is_empty() {
            return Err(ConfigError::MissingAddress);
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        let server_port = self
            .server_port
            .unwrap_or_else(|| self.transport.default_port());

        let host = host_for_uri(server_address);

        let request_uri = match &self.request_uri {
            Some(uri) => validate_uri("request-uri", uri)?,
            None => format!("sip:{host}:{server_port}"),
        };

        let from_uri = match &self.from_uri {
            Some(uri) => validate_uri("from-uri", uri)?,
            None => format!("sip:sipcheck@{host}"),
        };

        Ok(RequestConfig {
            server_address: server_address.to_owned(),
            server_port,
            transport: self.transport,
            local_ip: self.local_ip,
            local_port: self.local_port,
            method: self.method,
            request_uri,
            from_uri,
            expected: self.expected.clone(),
            timeout: self.timeout,
            verify_tls: self.verify_tls,
            ca_path: self.ca_path.clone(),
            debug: self.debug,
        })
    }
}

fn validate_uri(name: &'static str, uri: &str) -> Result<String, ConfigError> {
    let uri = uri.trim();

    let has_scheme = ["sip:", "sips:"].iter().any(|scheme| {
        uri.len() > scheme.len()
            && uri.is_char_boundary(scheme.len())
            && uri[..scheme.len()].eq_ignore_ascii_case(scheme)
    });

    if has_scheme && !uri.contains(char::is_whitespace) {
        Ok(uri.to_owned())
    } else {
        Err(ConfigError::InvalidUri {
            name,
            uri: uri.to_owned(),
        })
    }
}

/// IPv6 literals must be bracketed inside an URI
fn host_for_uri(address: &str) -> String {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{ip}]"),
        _ => address.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_expected() {
        let expected: Expected = "100,180,200".parse().unwrap();

        assert_eq!(expected.slots().len(), 3);
        assert_eq!(expected.slots()[2], Some(Code::OK));
        assert_eq!(expected.response_count(), 3);
        assert_eq!(expected.to_string(), "100,180,200");
    }

    #[test]
    fn parse_expected_wildcards() {
        let expected: Expected = ",200".parse().unwrap();

        assert_eq!(expected.slots(), &[None, Some(Code::OK)]);

        let empty: Expected = "".parse().unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.response_count(), 1);
    }

    #[test]
    fn reject_invalid_expected() {
        for input in ["700", "20", "2000", "abc", "200;180", "200,7xx"] {
            assert!(input.parse::<Expected>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn defaults() {
        let config = RequestConfig::builder("sip.example.com", TransportKind::Tls)
            .build()
            .unwrap();

        assert_eq!(config.server_port(), 5061);
        assert_eq!(config.request_uri(), "sip:sip.example.com:5061");
        assert_eq!(config.from_uri(), "sip:sipcheck@sip.example.com");
        assert_eq!(config.method(), Method::Options);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert!(config.verify_tls());
        assert!(config.expected().is_empty());
    }

    #[test]
    fn ipv6_default_uri() {
        let config = RequestConfig::builder("::1", TransportKind::Udp)
            .server_port(5070)
            .build()
            .unwrap();

        assert_eq!(config.request_uri(), "sip:[::1]:5070");
    }

    #[test]
    fn reject_invalid_config() {
        assert!(matches!(
            RequestConfig::builder("  ", TransportKind::Udp).build(),
            Err(ConfigError::MissingAddress)
        ));

        assert!(matches!(
            RequestConfig::builder("127.0.0.1", TransportKind::Udp)
                .timeout(Duration::ZERO)
                .build(),
            Err(ConfigError::InvalidTimeout)
        ));

        assert!(matches!(
            RequestConfig::builder("127.0.0.1", TransportKind::Udp)
                .request_uri("http://example.com")
                .build(),
            Err(ConfigError::InvalidUri { name: "request-uri", .. })
        ));

        assert!(matches!(
            RequestConfig::builder("127.0.0.1", TransportKind::Udp)
                .from_uri("sip:alice @example.com")
                .build(),
            Err(ConfigError::InvalidUri { name: "from-uri", .. })
        ));
    }
}
