use std::str::FromStr;

use crate::error::ParsingError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [MappingFunction] used in the determination of the TEC maps,
/// from the `MAPPING FUNCTION` record.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MappingFunction {
    /// No mapping function
    #[default]
    None,

    /// 1/cos(z)
    CosZ,

    /// Q-factor
    QFactor,
}

impl MappingFunction {
    /// Slant factor at zenith angle `zenith` (in degrees),
    /// converting vertical TEC to slant TEC. [MappingFunction::QFactor]
    /// is tabulated by the producer and is not evaluated here.
    pub fn slant_factor(&self, zenith: f64) -> Option<f64> {
        match self {
            Self::None => Some(1.0),
            Self::CosZ => {
                let cos = zenith.to_radians().cos();
                if cos > 0.0 {
                    Some(1.0 / cos)
                } else {
                    None
                }
            },
            Self::QFactor => None,
        }
    }
}

impl FromStr for MappingFunction {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "QFAC" => Ok(Self::QFactor),
            "NONE" | "" => Ok(Self::None),
            "COSZ" => Ok(Self::CosZ),
            _ => Err(ParsingError::MappingFunction),
        }
    }
}

impl std::fmt::Display for MappingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::CosZ => write!(f, "COSZ"),
            Self::QFactor => write!(f, "QFAC"),
            Self::None => write!(f, "NONE"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mapping_function() {
        for (content, value) in [
            ("COSZ", MappingFunction::CosZ),
            ("QFAC", MappingFunction::QFactor),
            ("NONE", MappingFunction::None),
        ] {
            let parsed = MappingFunction::from_str(content).unwrap_or_else(|e| {
                panic!("failed to parse mapf: \"{}\" - {}", content, e);
            });

            assert_eq!(parsed, value);
            assert_eq!(parsed.to_string(), content);
        }

        assert!(MappingFunction::from_str("SINZ").is_err());
    }

    #[test]
    fn slant_factor() {
        assert_eq!(MappingFunction::None.slant_factor(45.0), Some(1.0));

        let factor = MappingFunction::CosZ.slant_factor(60.0).unwrap();
        assert!((factor - 2.0).abs() < 1e-9);

        assert_eq!(MappingFunction::CosZ.slant_factor(90.0), None);
        assert_eq!(MappingFunction::QFactor.slant_factor(10.0), None);
    }
}
