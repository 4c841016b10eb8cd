//! Response status line tokenizer

use crate::code::Code;
use crate::parse::{IResult, whitespace};
use crate::SIP_VERSION;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::combinator::{eof, map};
use nom::sequence::{preceded, tuple};
use std::fmt;

/// The leading line of a SIP response: `SIP/2.0 <code> <reason>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub code: Code,
    pub reason: Option<String>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SIP_VERSION} {}", self.code)?;

        if let Some(reason) = &self.reason {
            write!(f, " {reason}")?;
        }

        Ok(())
    }
}

impl StatusLine {
    /// Tokenizes a single line (without its line terminator) into version, code and reason.
    ///
    /// The code must be followed by whitespace or the end of the line, so `SIP/2.0 2000`
    /// is not a status line.
    pub(crate) fn parse(i: &str) -> IResult<&str, Self> {
        map(
            preceded(
                tuple((tag(SIP_VERSION), take_while1(whitespace))),
                tuple((
                    Code::parse,
                    alt((eof, preceded(take_while1(whitespace), take_while(|_| true)))),
                )),
            ),
            |(code, reason): (Code, &str)| StatusLine {
                code,
                reason: match reason.trim() {
                    "" => None,
                    reason => Some(reason.to_owned()),
                },
            },
        )(i)
    }

    /// Returns the status line if the given line is one
    ///
    /// # Example
    ///
    /// ```
    /// use sipcheck_types::msg::StatusLine;
    /// use sipcheck_types::Code;
    ///
    /// let line = StatusLine::from_line("SIP/2.0 200 OK").unwrap();
    ///
    /// assert_eq!(line.code, Code::OK);
    /// assert_eq!(line.reason.as_deref(), Some("OK"));
    ///
    /// assert!(StatusLine::from_line("OPTIONS sip:example.com SIP/2.0").is_none());
    /// ```
    pub fn from_line(line: &str) -> Option<Self> {
        StatusLine::parse(line).ok().map(|(_, line)| line)
    }
}
