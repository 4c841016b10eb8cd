use crate::config::Expected;
use crate::verdict::Status;
use sip_types::Code;
use std::fmt;

/// Outcome of comparing one expected slot with the status code received at its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The code was expected, or the slot accepts any code.
    ///
    /// `received` is `None` for a wildcard slot without a status line at its position.
    Ok {
        expected: Option<Code>,
        received: Option<Code>,
    },
    /// A different code than the expected one was received
    Warning { expected: Code, received: Code },
    /// The responses contained no status line for a slot requiring a code
    Missing { expected: Code },
}

impl Classification {
    pub fn status(&self) -> Status {
        match self {
            Classification::Ok { .. } => Status::Ok,
            Classification::Warning { .. } | Classification::Missing { .. } => Status::Warning,
        }
    }

    pub fn received(&self) -> Option<Code> {
        match self {
            Classification::Ok { received, .. } => *received,
            Classification::Warning { received, .. } => Some(*received),
            Classification::Missing { .. } => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Ok {
                received: Some(received),
                ..
            } => write!(f, "Received a {received}"),
            Classification::Ok { received: None, .. } => f.write_str("No status line received"),
            Classification::Warning { expected, received } => {
                write!(f, "Received a {received} but {expected} was required")
            }
            Classification::Missing { expected } => {
                write!(f, "No status line received but {expected} was required")
            }
        }
    }
}

/// Pair the expected slots positionally with the received codes.
///
/// Without any expectation a single wildcard slot is used. Every slot is classified.
pub fn classify(expected: &Expected, received: &[Code]) -> Vec<Classification> {
    let wildcard = [None];

    let slots = if expected.is_empty() {
        &wildcard[..]
    } else {
        expected.slots()
    };

    slots
        .iter()
        .enumerate()
        .map(|(i, &expected)| match (expected, received.get(i).copied()) {
            (None, received) => Classification::Ok { expected, received },
            (Some(expected), None) => Classification::Missing { expected },
            (Some(code), Some(received)) if code == received => Classification::Ok {
                expected,
                received: Some(received),
            },
            (Some(expected), Some(received)) => Classification::Warning { expected, received },
        })
        .collect()
}
