//! File format revision
use crate::error::ParsingError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [Version] is used to describe the file revision.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Version major number
    pub major: u8,

    /// Version minor number
    pub minor: u8,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl From<Version> for (u8, u8) {
    fn from(v: Version) -> Self {
        (v.major, v.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (major, minor) = s.split_once('.').unwrap_or((s, "0"));

        let major = major
            .parse::<u8>()
            .map_err(|_| ParsingError::VersionParsing)?;

        // "1.40" and "1.4" are the same revision
        let minor = minor.trim_end_matches('0');
        let minor = if minor.is_empty() {
            0
        } else {
            minor
                .parse::<u8>()
                .map_err(|_| ParsingError::VersionParsing)?
        };

        Ok(Self { major, minor })
    }
}

impl Version {
    /// Builds a new [Version]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}
