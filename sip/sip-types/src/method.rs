use crate::ParseError;
use crate::parse::{IResult, parse_complete};
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::combinator::value;
use std::fmt;
use std::str::FromStr;

macro_rules! methods {
    ($($(#[$comments:meta])* $print:literal, $ident:ident;)+) => {
        /// Request method the probe is able to send.
        ///
        /// # Example
        ///
        /// ```
        /// use sipcheck_types::Method;
        ///
        /// let method: Method = "invite".parse().unwrap();
        ///
        /// assert_eq!(method, Method::Invite);
        /// assert_eq!(method.to_string(), "INVITE");
        /// ```
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub enum Method {
            $($(#[$comments])* $ident,)+
        }

        impl Method {
            /// Returns the method token as it appears on the wire
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Method::$ident => $print,)+
                }
            }

            pub(crate) fn parse(i: &str) -> IResult<&str, Self> {
                alt((
                    $(value(Method::$ident, tag_no_case($print)),)+
                ))(i)
            }
        }
    };
}

methods! {
    /// Asks the server for its capabilities
    "OPTIONS", Options;
    /// Starts a session, may be answered with provisional responses first
    "INVITE", Invite;
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete(s, Method::parse).ok_or_else(|| ParseError::Method(s.into()))
    }
}
