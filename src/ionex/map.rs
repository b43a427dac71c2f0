//! TEC, RMS and height maps
use crate::{
    axis::RangeMode,
    epoch::Epoch,
    error::Error,
    grid::Grid2D,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value written in place of missing data.
pub const MISSING_VALUE: i64 = 9999;

/// Maximal number of values per record.
pub(crate) const VALUES_PER_LINE: usize = 16;

/// Width of one value, in columns.
pub(crate) const VALUE_WIDTH: usize = 5;

/// [MapKind] tells what a map describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MapKind {
    /// Total Electron Content, in TECu
    Tec,

    /// Root mean square error of the TEC, in TECu
    Rms,

    /// Height of the ionospheric layer, in kilometers
    Height,
}

impl MapKind {
    pub(crate) fn from_start_label(label: &str) -> Option<Self> {
        match label {
            "START OF TEC MAP" => Some(Self::Tec),
            "START OF RMS MAP" => Some(Self::Rms),
            "START OF HEIGHT MAP" => Some(Self::Height),
            _ => None,
        }
    }

    pub(crate) fn end_label(&self) -> &'static str {
        match self {
            Self::Tec => "END OF TEC MAP",
            Self::Rms => "END OF RMS MAP",
            Self::Height => "END OF HEIGHT MAP",
        }
    }
}

impl std::fmt::Display for MapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Tec => write!(f, "TEC"),
            Self::Rms => write!(f, "RMS"),
            Self::Height => write!(f, "HEIGHT"),
        }
    }
}

/// Scales a raw map value, [MISSING_VALUE] being converted to NaN.
pub(crate) fn scale(raw: i64, exponent: i8) -> f64 {
    if raw == MISSING_VALUE {
        f64::NAN
    } else if exponent < 0 {
        raw as f64 / 10.0_f64.powi(-(exponent as i32))
    } else {
        raw as f64 * 10.0_f64.powi(exponent as i32)
    }
}

/// One [TecMap]: the lowest altitude layer of a map, already scaled.
/// Values are stored in order of appearance: row after row
/// (one row per latitude), each row from first to last longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct TecMap {
    /// [MapKind]
    pub kind: MapKind,

    /// Map index, as declared by the file
    pub index: u32,

    /// [Epoch] of this map
    pub epoch: Epoch,

    /// Exponent that was applied to the raw values
    pub exponent: i8,

    pub(crate) grid: Grid2D,
    pub(crate) values: Vec<f64>,
}

impl TecMap {
    /// Scaled values, NaN where data is missing.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// [Grid2D] of this map: longitude along x, latitude along y.
    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    /// Returns true if at least one value is missing.
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|value| value.is_nan())
    }

    /// Bilinear interpolation at (latitude, longitude), in degrees.
    pub fn value(&self, latitude: f64, longitude: f64, mode: RangeMode) -> Result<f64, Error> {
        self.grid
            .bilinear_interpolation(longitude, latitude, &self.values, mode)
    }

    /// Value of the grid node closest to (latitude, longitude), in degrees.
    pub fn nearest(&self, latitude: f64, longitude: f64) -> Result<f64, Error> {
        self.grid.nearest(longitude, latitude, &self.values)
    }

    /// Largest value, ignoring missing data.
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|value| !value.is_nan())
            .reduce(f64::max)
    }

    /// Smallest value, ignoring missing data.
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|value| !value.is_nan())
            .reduce(f64::min)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{axis::TickAxis, grid::RowOrder};

    fn map(values: Vec<f64>) -> TecMap {
        // latitude 10 to -10 (north to south), longitude 0 to 10
        let grid = Grid2D::new(
            TickAxis::new(0.0, 10.0, 10.0).unwrap(),
            TickAxis::new(-10.0, 10.0, 20.0).unwrap(),
            RowOrder::Reversed,
        );

        TecMap {
            kind: MapKind::Tec,
            index: 1,
            epoch: Epoch::default(),
            exponent: -1,
            grid,
            values,
        }
    }

    #[test]
    fn scaling() {
        assert_eq!(scale(123, -1), 12.3);
        assert_eq!(scale(123, 0), 123.0);
        assert_eq!(scale(-5, 1), -50.0);
        assert!(scale(MISSING_VALUE, -1).is_nan());
    }

    #[test]
    fn map_labels() {
        for kind in [MapKind::Tec, MapKind::Rms, MapKind::Height] {
            let start = format!("START OF {} MAP", kind);
            assert_eq!(MapKind::from_start_label(&start), Some(kind));
            assert_eq!(kind.end_label(), format!("END OF {} MAP", kind));
        }
        assert_eq!(MapKind::from_start_label("START OF AUX DATA"), None);
    }

    #[test]
    fn map_values() {
        let map = map(vec![1.0, 2.0, 3.0, 4.0]);

        // north west corner is the first value
        assert_eq!(map.nearest(10.0, 0.0).unwrap(), 1.0);
        assert_eq!(map.nearest(-10.0, 10.0).unwrap(), 4.0);

        let value = map.value(0.0, 5.0, RangeMode::Checked).unwrap();
        assert!((value - 2.5).abs() < 1e-9);

        assert_eq!(map.min(), Some(1.0));
        assert_eq!(map.max(), Some(4.0));
        assert!(!map.has_missing_values());
    }

    #[test]
    fn missing_values() {
        let map = map(vec![1.0, f64::NAN, 3.0, 4.0]);
        assert!(map.has_missing_values());
        assert_eq!(map.max(), Some(4.0));

        // NaN propagates to interpolated values
        let value = map.value(0.0, 5.0, RangeMode::Checked).unwrap();
        assert!(value.is_nan());

        // but not to unrelated nodes
        let value = map.value(-20.0, 5.0, RangeMode::Unchecked).unwrap();
        assert!((value - 3.5).abs() < 1e-9);
    }
}
