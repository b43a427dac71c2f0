//! Antenna identity and calibration records
use std::str::FromStr;

use crate::{
    epoch::Epoch,
    error::ParsingError,
    line::{Columns, Line},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Radome code of antennas that do not declare one.
pub const NO_RADOME: &str = "NONE";

// TYPE / SERIAL NO
const MODEL: Columns = Columns::new(0, 15);
const RADOME: Columns = Columns::new(16, 20);
const SERIAL: Columns = Columns::new(20, 40);
const SVN: Columns = Columns::new(40, 50);
const COSPAR: Columns = Columns::new(50, 60);

// METH / BY / # / DATE
const METHOD: Columns = Columns::new(0, 20);
const AGENCY: Columns = Columns::new(20, 40);
const NUM_ANTENNAS: Columns = Columns::new(40, 46);
const DATE: Columns = Columns::new(50, 60);

/// [AntennaMatch] selects which fields take part in antenna identification.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum AntennaMatch {
    /// Model and radome must match, serial number is ignored
    #[default]
    ModelAndRadome,

    /// Model, radome and serial number must match
    Strict,
}

/// [Antenna] identity, as described by the `TYPE / SERIAL NO` record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Antenna {
    /// Antenna model (15 characters at most)
    pub model: String,

    /// Radome code (4 characters at most), [NO_RADOME] when omitted
    pub radome: String,

    /// Serial number, or satellite code for satellite antennas
    pub serial: String,

    /// SVN number, for satellite antennas
    pub svn: Option<String>,

    /// COSPAR ID, for satellite antennas
    pub cospar: Option<String>,
}

impl Default for Antenna {
    fn default() -> Self {
        Self {
            model: Default::default(),
            radome: NO_RADOME.to_string(),
            serial: Default::default(),
            svn: None,
            cospar: None,
        }
    }
}

fn radome_or_default(radome: &str) -> String {
    let radome = radome.trim();
    if radome.is_empty() {
        NO_RADOME.to_string()
    } else {
        radome.to_string()
    }
}

fn optional(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

impl Antenna {
    /// Builds a new [Antenna] identity. Blank radome is replaced by [NO_RADOME].
    pub fn new(model: &str, radome: &str) -> Self {
        Self {
            model: model.trim().to_string(),
            radome: radome_or_default(radome),
            ..Default::default()
        }
    }

    /// Copies and returns [Self] with updated serial number
    pub fn with_serial(&self, serial: &str) -> Self {
        let mut s = self.clone();
        s.serial = serial.trim().to_string();
        s
    }

    /// Returns true if `self` designates `other`, following [AntennaMatch].
    pub fn matches(&self, other: &Self, policy: AntennaMatch) -> bool {
        let same = self.model == other.model && self.radome == other.radome;
        match policy {
            AntennaMatch::ModelAndRadome => same,
            AntennaMatch::Strict => same && self.serial == other.serial,
        }
    }

    /// Decodes a `TYPE / SERIAL NO` record.
    pub(crate) fn from_record(line: &Line) -> Self {
        Self {
            model: line.field(MODEL).trim().to_string(),
            radome: radome_or_default(line.field(RADOME)),
            serial: line.field(SERIAL).trim().to_string(),
            svn: optional(line.field(SVN)),
            cospar: optional(line.field(COSPAR)),
        }
    }
}

impl FromStr for Antenna {
    type Err = ParsingError;

    /// Parses an antenna name. Names longer than 15 characters follow the
    /// ANTEX layout (model in columns 1-15, radome in columns 17-20),
    /// shorter names are a model without radome.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_end();

        if s.trim().is_empty() {
            return Err(ParsingError::MalformedHeader("empty antenna name".to_string()));
        }

        if s.len() <= MODEL.end {
            return Ok(Self::new(s, ""));
        }

        let line = Line::new(s, 0);
        Ok(Self::new(line.field(MODEL), line.field(RADOME)))
    }
}

impl std::fmt::Display for Antenna {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<15} {:<4}", self.model, self.radome)?;
        if !self.serial.is_empty() {
            write!(f, " ({})", self.serial)?;
        }
        Ok(())
    }
}

/// Known calibration methods
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CalibrationMethod {
    #[default]
    Unknown,
    Chamber,
    Field,
    Robot,
    /// Copied from other antenna
    Copied,
    /// Converted from older formats
    Converted,
}

impl FromStr for CalibrationMethod {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CHAMBER" => Ok(Self::Chamber),
            "FIELD" => Ok(Self::Field),
            "ROBOT" => Ok(Self::Robot),
            "COPIED" => Ok(Self::Copied),
            "CONVERTED" => Ok(Self::Converted),
            _ => Ok(Self::Unknown),
        }
    }
}

/// [Calibration] information, from `METH / BY / # / DATE`.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    pub method: CalibrationMethod,

    /// Agency that performed the calibration
    pub agency: String,

    /// Number of individual antennas calibrated
    pub num_antennas: Option<u32>,

    /// Calibration date, as written
    pub date: String,

    /// Start of validity period
    pub valid_from: Option<Epoch>,

    /// End of validity period
    pub valid_until: Option<Epoch>,

    /// SINEX code, to reference this calibration model
    pub sinex_code: Option<String>,
}

impl Calibration {
    pub(crate) fn from_record(line: &Line) -> Result<Self, ParsingError> {
        line.expect_label("METH / BY / # / DATE")?;
        Ok(Self {
            method: CalibrationMethod::from_str(line.field(METHOD))?,
            agency: line.field(AGENCY).trim().to_string(),
            num_antennas: line.parse_optional(NUM_ANTENNAS, "number of antennas")?,
            date: line.field(DATE).trim().to_string(),
            ..Default::default()
        })
    }

    /// Returns true if `epoch` falls within the validity period.
    /// Unbounded periods are always valid.
    pub fn is_valid(&self, epoch: Epoch) -> bool {
        let after_start = self.valid_from.map(|t| epoch >= t).unwrap_or(true);
        let before_end = self.valid_until.map(|t| epoch <= t).unwrap_or(true);
        after_start && before_end
    }
}

/// Parses `VALID FROM` / `VALID UNTIL` content (5I6,F13.7).
pub(crate) fn parse_validity(line: &Line) -> Result<Epoch, ParsingError> {
    let year = line.parse::<i32>(Columns::new(0, 6), "year")?;
    let month = line.parse::<u8>(Columns::new(6, 12), "month")?;
    let day = line.parse::<u8>(Columns::new(12, 18), "day")?;
    let hour = line.parse::<u8>(Columns::new(18, 24), "hour")?;
    let minute = line.parse::<u8>(Columns::new(24, 30), "minute")?;
    let seconds = line.parse::<f64>(Columns::new(30, 43), "seconds")?;

    Epoch::from_calendar(year, month, day, hour, minute, seconds).map_err(|e| line.malformed(e))
}
