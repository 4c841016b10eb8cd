//! Core of the sipcheck SIP health check
//!
//! Sends a single OPTIONS or INVITE request over UDP, TCP or TLS and classifies the
//! status codes of the responses against an expectation.
//!
//! ```no_run
//! use sipcheck_core::{RequestConfig, TransportKind, exchange};
//!
//! # async fn check() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RequestConfig::builder("sip.example.com", TransportKind::Udp)
//!     .expected("200".parse()?)
//!     .build()?;
//!
//! match exchange::run(&config).await {
//!     Ok(result) => println!("{}", result.verdict()),
//!     Err(e) => println!("{}", sipcheck_core::Verdict::from(&e)),
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod error;
pub mod exchange;
mod ident;
pub mod transport;
mod verdict;

pub use builder::{MessageBuilder, SipMessage};
pub use config::{DEFAULT_TIMEOUT, Expected, RequestConfig, RequestConfigBuilder};
pub use error::{ConfigError, Error, Result};
pub use exchange::{ExchangeResult, run};
pub use ident::{IdGenerator, Identifiers, RFC3261_BRANCH_PREFIX};
pub use sip_types::{Code, Method, TransportKind};
pub use verdict::{Status, Verdict};
