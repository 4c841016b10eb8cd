/// Error returned when parsing one of the vocabulary types from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported method {0:?}, expected OPTIONS or INVITE")]
    Method(String),
    #[error("invalid status code {0:?}, expected three digits starting with 1-6")]
    Code(String),
    #[error("unsupported transport {0:?}, expected UDP, TCP or TLS")]
    Transport(String),
}
