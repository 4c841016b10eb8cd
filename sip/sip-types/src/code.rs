use crate::ParseError;
use crate::parse::{IResult, parse_complete};
use nom::bytes::complete::take;
use nom::combinator::{map_res, verify};
use std::fmt;
use std::str::FromStr;

/// A SIP status code in the range `100..=699`
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Code(u16);

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Code").field(&self.0).finish()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CodeKind represents the class of a [`Code`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CodeKind {
    /// Represents code 100..=199
    Provisional,

    /// Represents code 200..=299
    Success,

    /// Represents code 300..=399
    Redirection,

    /// Represents code 400..=499
    RequestFailure,

    /// Represents code 500..=599
    ServerFailure,

    /// Represents code 600..=699
    GlobalFailure,
}

impl Code {
    pub const TRYING: Code = Code(100);
    pub const OK: Code = Code(200);

    /// Returns the [`CodeKind`] of the code
    ///
    /// # Example
    ///
    /// ```
    /// use sipcheck_types::{Code, CodeKind};
    ///
    /// let code: Code = "183".parse().unwrap();
    ///
    /// assert_eq!(code.kind(), CodeKind::Provisional);
    /// ```
    pub fn kind(self) -> CodeKind {
        match self.0 {
            100..=199 => CodeKind::Provisional,
            200..=299 => CodeKind::Success,
            300..=399 => CodeKind::Redirection,
            400..=499 => CodeKind::RequestFailure,
            500..=599 => CodeKind::ServerFailure,
            _ => CodeKind::GlobalFailure,
        }
    }

    /// Returns the number that the code represents
    pub fn into_u16(self) -> u16 {
        self.0
    }

    /// Exactly three digits, the first one between 1 and 6
    pub(crate) fn parse(i: &str) -> IResult<&str, Self> {
        map_res(
            verify(take(3usize), |digits: &str| {
                digits.bytes().all(|b| b.is_ascii_digit())
                    && matches!(digits.as_bytes()[0], b'1'..=b'6')
            }),
            |digits: &str| digits.parse::<u16>().map(Code),
        )(i)
    }
}

impl TryFrom<u16> for Code {
    type Error = ParseError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        if (100..=699).contains(&code) {
            Ok(Code(code))
        } else {
            Err(ParseError::Code(code.to_string()))
        }
    }
}

impl FromStr for Code {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete(s, Code::parse).ok_or_else(|| ParseError::Code(s.into()))
    }
}
