use std::str::FromStr;

use gnss::prelude::Constellation;

use crate::error::ParsingError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [FrequencyId] identifies one calibrated frequency, for example `G01`:
/// a constellation and a frequency number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrequencyId {
    pub constellation: Constellation,
    pub number: u8,
}

impl FrequencyId {
    pub fn new(constellation: Constellation, number: u8) -> Self {
        Self {
            constellation,
            number,
        }
    }
}

impl FromStr for FrequencyId {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.len() < 2 || !s.is_char_boundary(1) {
            return Err(ParsingError::FrequencyId);
        }

        let (system, number) = s.split_at(1);

        let constellation = Constellation::from_str(system)?;

        let number = number
            .trim()
            .parse::<u8>()
            .map_err(|_| ParsingError::FrequencyId)?;

        Ok(Self {
            constellation,
            number,
        })
    }
}

impl std::fmt::Display for FrequencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:x}{:02}", self.constellation, self.number)
    }
}
