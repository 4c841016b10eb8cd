use clap::Parser;
use sip_core::{ConfigError, Expected, RequestConfig};
use sip_types::{Method, TransportKind};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Send a single SIP request and check the status codes of the responses
#[derive(Debug, Parser)]
#[command(name = "sipcheck", version)]
pub(crate) struct Args {
    /// Hostname or IP address of the SIP server
    #[arg(short = 'H', long)]
    pub(crate) host: String,

    /// Server port, 5060 (5061 for TLS) if not given
    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    /// udp, tcp or tls
    #[arg(short, long, default_value = "udp")]
    pub(crate) transport: TransportKind,

    /// Local address to send from, detected from the route to the server if not given
    #[arg(long)]
    pub(crate) local_ip: Option<IpAddr>,

    /// Local port, 0 lets the system choose
    #[arg(short, long, default_value_t = 0)]
    pub(crate) local_port: u16,

    /// Request-URI, defaults to `sip:<host>:<port>`
    #[arg(short = 'u', long)]
    pub(crate) request_uri: Option<String>,

    /// From URI, defaults to `sip:sipcheck@<host>`
    #[arg(short, long)]
    pub(crate) from_uri: Option<String>,

    /// Comma separated list of expected status codes, an empty entry accepts any code
    #[arg(short, long)]
    pub(crate) expect: Option<Expected>,

    /// Timeout in seconds for connecting, sending and receiving
    #[arg(short = 'T', long, default_value_t = 10.0)]
    pub(crate) timeout: f64,

    /// Do not verify the TLS certificate of the server
    #[arg(long)]
    pub(crate) no_verify: bool,

    /// CA certificate file or directory of PEM files to verify the server with
    #[arg(long)]
    pub(crate) ca_path: Option<PathBuf>,

    /// options or invite
    #[arg(short, long, default_value = "options")]
    pub(crate) method: Method,

    /// Log the exchange and dump request and responses to stderr
    #[arg(short, long)]
    pub(crate) debug: bool,
}

impl Args {
    pub(crate) fn to_config(&self) -> Result<RequestConfig, ConfigError> {
        let timeout =
            Duration::try_from_secs_f64(self.timeout).map_err(|_| ConfigError::InvalidTimeout)?;

        let mut builder = RequestConfig::builder(self.host.as_str(), self.transport);

        builder
            .local_port(self.local_port)
            .method(self.method)
            .timeout(timeout)
            .verify_tls(!self.no_verify)
            .debug(self.debug);

        if let Some(port) = self.port {
            builder.server_port(port);
        }

        if let Some(local_ip) = self.local_ip {
            builder.local_ip(local_ip);
        }

        if let Some(uri) = &self.request_uri {
            builder.request_uri(uri.as_str());
        }

        if let Some(uri) = &self.from_uri {
            builder.from_uri(uri.as_str());
        }

        if let Some(expected) = &self.expect {
            builder.expected(expected.clone());
        }

        if let Some(ca_path) = &self.ca_path {
            builder.ca_path(ca_path.as_path());
        }

        builder.build()
    }
}

/// First line of a clap error without its `error: ` prefix
pub(crate) fn parse_error_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();

    first.strip_prefix("error: ").unwrap_or(first).trim().to_owned()
}
