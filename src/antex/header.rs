use std::{
    io::{BufRead, Seek},
    str::FromStr,
};

use gnss::prelude::Constellation;

use crate::{
    antex::antenna::Antenna,
    error::ParsingError,
    line::{Columns, LineReader},
    version::Version,
};

#[cfg(feature = "log")]
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Supported ANTEX revision
pub const SUPPORTED_VERSION: Version = Version::new(1, 4);

/// END OF HEADER must be found within this many records.
const MAX_HEADER_LINES: usize = 1000;

// ANTEX VERSION / SYST
const VERSION: Columns = Columns::new(0, 8);
const SYSTEM: Columns = Columns::new(20, 21);

// PCV TYPE / REFANT
const PCV_TYPE: Columns = Columns::new(0, 1);
const REFANT_TYPE: Columns = Columns::new(20, 40);
const REFANT_SERIAL: Columns = Columns::new(40, 60);

/// Phase center variation type
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PcvType {
    /// Absolute values
    #[default]
    Absolute,

    /// Values relative to a reference antenna
    Relative,
}

impl FromStr for PcvType {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Self::Absolute),
            "R" => Ok(Self::Relative),
            _ => Err(ParsingError::PcvType),
        }
    }
}

/// ANTEX file [Header]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    /// File [Version]
    pub version: Version,

    /// Satellite system of the calibrations, `Mixed` for multi constellation files
    pub constellation: Constellation,

    /// [PcvType]
    pub pcv_type: PcvType,

    /// Reference antenna, for relative values
    pub reference_antenna: Option<Antenna>,

    /// Comments found in the header section
    pub comments: Vec<String>,
}

impl Header {
    /// Parses [Header] until `END OF HEADER` (included).
    pub(crate) fn parse<R: BufRead + Seek>(
        reader: &mut LineReader<R>,
    ) -> Result<Self, ParsingError> {
        if !reader.advance()? {
            return Err(ParsingError::MalformedHeader("empty file".to_string()));
        }

        let line = reader.line();

        if line.label() != "ANTEX VERSION / SYST" {
            return Err(ParsingError::MalformedHeader(
                "missing ANTEX VERSION / SYST".to_string(),
            ));
        }

        let version_str = line.field(VERSION).trim();
        let version = Version::from_str(version_str)?;

        if version != SUPPORTED_VERSION {
            return Err(ParsingError::UnsupportedVersion(version_str.to_string()));
        }

        let constellation = Constellation::from_str(line.field(SYSTEM))?;

        if !reader.advance()? || reader.line().label() != "PCV TYPE / REFANT" {
            return Err(ParsingError::MalformedHeader(
                "missing PCV TYPE / REFANT".to_string(),
            ));
        }

        let line = reader.line();
        let pcv_type = PcvType::from_str(line.field(PCV_TYPE))?;

        let reference_antenna = match pcv_type {
            PcvType::Absolute => None,
            PcvType::Relative => {
                let name = line.field(REFANT_TYPE);
                if name.trim().is_empty() {
                    None
                } else {
                    Some(Antenna::from_str(name)?.with_serial(line.field(REFANT_SERIAL)))
                }
            },
        };

        let mut comments = Vec::new();

        for _ in 0..MAX_HEADER_LINES {
            if !reader.advance()? {
                break;
            }

            let line = reader.line();

            match line.label() {
                "END OF HEADER" => {
                    #[cfg(feature = "log")]
                    debug!("ANTEX V{} ({:?}, {:?})", version, constellation, pcv_type);

                    return Ok(Self {
                        version,
                        constellation,
                        pcv_type,
                        reference_antenna,
                        comments,
                    });
                },
                "COMMENT" => comments.push(line.content().trim_end().to_string()),
                _ => {},
            }
        }

        Err(ParsingError::MalformedHeader(
            "END OF HEADER not found".to_string(),
        ))
    }
}
