use std::str::FromStr;

use gnss::prelude::Constellation;

use crate::error::ParsingError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [ReferenceSystem] describes either the reference constellation
/// or the theoretical model used in the evaluation of the maps.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReferenceSystem {
    /// Reference Constellation.
    /// `Mixed` (declared as `GNS`) generally means GPS + Glonass.
    /// When GNSS constellations were used, TEC maps
    /// include electron content through the ionosphere
    /// and plasmasphere, up to altitude 20000 km.
    Constellation(Constellation),

    /// Evaluated using an [OtherSystem].
    Other(OtherSystem),

    /// Result of a [TheoreticalModel].
    Model(TheoreticalModel),
}

impl Default for ReferenceSystem {
    fn default() -> Self {
        Self::Constellation(Constellation::Mixed)
    }
}

/// [OtherSystem] that may serve the TEC map evaluation process.
#[derive(Default, Copy, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OtherSystem {
    /// BENt
    BENt,

    /// ENVisat, ESA Earth Observation satellite
    #[default]
    ENVisat,

    /// European Remote Sensing Satellite (ERS-1 or ERS-2),
    /// now replaced by ENVisat.
    ERS,

    /// IRI: Earth Observation Application group
    IRI,
}

impl FromStr for OtherSystem {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BEN" => Ok(Self::BENt),
            "ENV" => Ok(Self::ENVisat),
            "ERS" => Ok(Self::ERS),
            "IRI" => Ok(Self::IRI),
            _ => Err(ParsingError::ReferenceSystem),
        }
    }
}

impl std::fmt::Display for OtherSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::BENt => write!(f, "BEN"),
            Self::ENVisat => write!(f, "ENV"),
            Self::ERS => write!(f, "ERS"),
            Self::IRI => write!(f, "IRI"),
        }
    }
}

/// Map resulting from a theoretical model.
#[derive(Default, Copy, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TheoreticalModel {
    /// Mixed / combined models.
    #[default]
    MIX,

    /// NNS transit
    NNS,

    /// TOPex/TEC represents the ionosphere electron content
    /// measured over sea surface at altitudes below
    /// satellite orbits (1336 km).
    TOP,
}

impl FromStr for TheoreticalModel {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "MIX" => Ok(Self::MIX),
            "NNS" => Ok(Self::NNS),
            "TOP" => Ok(Self::TOP),
            _ => Err(ParsingError::ReferenceSystem),
        }
    }
}

impl std::fmt::Display for TheoreticalModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::MIX => write!(f, "MIX"),
            Self::NNS => write!(f, "NNS"),
            Self::TOP => write!(f, "TOP"),
        }
    }
}

impl std::fmt::Display for ReferenceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Constellation(Constellation::Mixed) => write!(f, "GNS"),
            Self::Constellation(c) => write!(f, "{:X}", c),
            Self::Other(other) => other.fmt(f),
            Self::Model(model) => model.fmt(f),
        }
    }
}

impl FromStr for ReferenceSystem {
    type Err = ParsingError;

    /// Parses the 3 letter system code of `IONEX VERSION / TYPE`.
    /// Models and other systems are tested first, because
    /// "MIX" would otherwise be interpreted as a mixed constellation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(model) = TheoreticalModel::from_str(s) {
            Ok(Self::Model(model))
        } else if let Ok(other) = OtherSystem::from_str(s) {
            Ok(Self::Other(other))
        } else if s == "GNS" {
            Ok(Self::Constellation(Constellation::Mixed))
        } else if let Ok(constellation) = Constellation::from_str(s) {
            Ok(Self::Constellation(constellation))
        } else {
            Err(ParsingError::ReferenceSystem)
        }
    }
}
