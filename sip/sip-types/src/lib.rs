//! Protocol vocabulary of the sipcheck health check
//!
//! Contains the request methods the probe may send, SIP status codes, the transport
//! names and a small tokenizer for response status lines.
#![forbid(unsafe_code)]

mod code;
mod error;
mod method;
pub mod msg;
mod parse;
mod transport;

pub use code::{Code, CodeKind};
pub use error::ParseError;
pub use method::Method;
pub use transport::TransportKind;

/// The only protocol version understood
pub const SIP_VERSION: &str = "SIP/2.0";
