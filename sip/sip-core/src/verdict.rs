//! Monitoring plugin result

use crate::error::{ConfigError, Error};
use std::fmt;

/// Severity reported to the monitoring supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    /// The check could not be performed, e.g. because of invalid arguments
    Unknown,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status and human readable message, printed as `SIP <STATUS> - <message>[ | <perfdata>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub message: String,
    pub perfdata: Option<String>,
}

impl Verdict {
    pub fn new<S: Into<String>>(status: Status, message: S) -> Self {
        Self {
            status,
            message: message.into(),
            perfdata: None,
        }
    }

    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::new(Status::Unknown, message)
    }

    pub fn with_perfdata<S: Into<String>>(mut self, perfdata: S) -> Self {
        self.perfdata = Some(perfdata.into());
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

impl From<&Error> for Verdict {
    fn from(error: &Error) -> Self {
        Verdict::new(Status::Critical, error.to_string())
    }
}

impl From<&ConfigError> for Verdict {
    fn from(error: &ConfigError) -> Self {
        Verdict::unknown(error.to_string())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIP {} - {}", self.status, self.message)?;

        if let Some(perfdata) = &self.perfdata {
            write!(f, " | {perfdata}")?;
        }

        Ok(())
    }
}
