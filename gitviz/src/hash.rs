use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Length of a hex-encoded object id.
pub const HEX_LEN: usize = 40;
/// Length of the abbreviated id used when displaying objects.
pub const SHORT_LEN: usize = 6;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid object hash length {0}, expected 40")]
    Length(usize),
    #[error("invalid object hash `{0}`: expected lowercase hex characters")]
    Hex(String),
}

/// A content hash identifying a git object.
///
/// Identity is always the full hex string. The 6-character [`ObjectHash::short`]
/// form is only ever used for display.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectHash(String);

impl ObjectHash {
    /// The abbreviated form of the hash, eg. `c66cc4`.
    pub fn short(&self) -> &str {
        &self.0[..SHORT_LEN]
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check whether the given string is a well-formed hash.
    pub fn is_valid(s: &str) -> bool {
        s.len() == HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl FromStr for ObjectHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LEN {
            return Err(ParseError::Length(s.len()));
        }
        if !Self::is_valid(s) {
            return Err(ParseError::Hex(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<git2::Oid> for ObjectHash {
    type Error = ParseError;

    fn try_from(oid: git2::Oid) -> Result<Self, Self::Error> {
        oid.to_string().parse()
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectHash {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
