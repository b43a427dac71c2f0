use crate::{
    axis::TickAxis,
    error::{Error, ParsingError},
    grid::{Grid2D, RowOrder},
    line::{Columns, Line},
    linspace::Linspace,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coordinates of map rows must match the header within this tolerance, in degrees.
pub(crate) const COORDINATES_TOLERANCE: f64 = 1e-3;

// HGT1 / HGT2 / DHGT, LAT1 / LAT2 / DLAT, LON1 / LON2 / DLON: 2X,3F6.1
const SPACE_START: Columns = Columns::new(2, 8);
const SPACE_END: Columns = Columns::new(8, 14);
const SPACE_SPACING: Columns = Columns::new(14, 20);

// LAT/LON1/LON2/DLON/H: 2X,5F6.1
const ROW_LATITUDE: Columns = Columns::new(2, 8);
const ROW_LON1: Columns = Columns::new(8, 14);
const ROW_LON2: Columns = Columns::new(14, 20);
const ROW_DLON: Columns = Columns::new(20, 26);
const ROW_ALTITUDE: Columns = Columns::new(26, 32);

/// [Grid] used to describe latitude, longitude
/// and altitude linear spaces, defining the entire map.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    /// Latitude [Linspace], in degrees, in order of appearance of the map rows
    pub latitude: Linspace,

    /// Longitude [Linspace], in degrees
    pub longitude: Linspace,

    /// Altitude [Linspace], in kilometers
    pub altitude: Linspace,
}

impl Grid {
    /// Returns true if self describes 3D TEC maps.
    pub fn is_3d_grid(&self) -> bool {
        !self.is_2d_grid()
    }

    /// Returns true if self describes 2D TEC maps,
    /// meaning the altitude is a single point.
    pub fn is_2d_grid(&self) -> bool {
        self.altitude.is_single_point()
    }

    /// Latitude axis, in order of appearance of the map rows.
    pub fn latitude_axis(&self) -> Result<TickAxis, Error> {
        self.latitude.to_axis()
    }

    /// Longitude axis, in order of appearance of the values within a row.
    pub fn longitude_axis(&self) -> Result<TickAxis, Error> {
        self.longitude.to_axis()
    }

    /// Altitude axis (layers of 3D maps).
    pub fn altitude_axis(&self) -> Result<TickAxis, Error> {
        self.altitude.to_axis()
    }

    /// Builds the [Grid2D] of one map layer: longitude along x,
    /// ascending latitude along y. Rows declared from north to south
    /// are mapped with [RowOrder::Reversed].
    pub fn map_grid(&self) -> Result<Grid2D, Error> {
        let longitude = self.longitude_axis()?;
        let latitude = self.latitude_axis()?;

        if latitude.is_ascending() {
            Ok(Grid2D::new(longitude, latitude, RowOrder::Normal))
        } else {
            let southern = latitude.tick_at(latitude.count() - 1);
            let ascending = TickAxis::new(southern, latitude.start(), -latitude.step())?;
            Ok(Grid2D::new(longitude, ascending, RowOrder::Reversed))
        }
    }

    /// Defines a new [Grid] with updated latitude space
    pub fn with_latitude_space(mut self, linspace: Linspace) -> Self {
        self.latitude = linspace;
        self
    }

    /// Defines a new [Grid] with updated longitude space
    pub fn with_longitude_space(mut self, linspace: Linspace) -> Self {
        self.longitude = linspace;
        self
    }

    /// Defines a new [Grid] with updated altitude space
    pub fn with_altitude_space(mut self, linspace: Linspace) -> Self {
        self.altitude = linspace;
        self
    }
}

/// Parses one of the header [Linspace] records.
pub(crate) fn parse_linspace(line: &Line) -> Result<Linspace, ParsingError> {
    Ok(Linspace::new(
        line.parse(SPACE_START, "first value")?,
        line.parse(SPACE_END, "last value")?,
        line.parse(SPACE_SPACING, "spacing")?,
    ))
}

/// [RowSpecs] as found in the `LAT/LON1/LON2/DLON/H` record
/// that introduces each row of a map.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub(crate) struct RowSpecs {
    /// Latitude of following longitude segment, in degrees
    pub latitude: f64,

    /// Altitude of following longitude segment, in kilometers
    pub altitude: f64,

    /// Longitude [Linspace]
    pub longitude: Linspace,
}

impl RowSpecs {
    pub fn parse(line: &Line) -> Result<Self, ParsingError> {
        line.expect_label("LAT/LON1/LON2/DLON/H")?;
        Ok(Self {
            latitude: line.parse(ROW_LATITUDE, "latitude")?,
            longitude: Linspace::new(
                line.parse(ROW_LON1, "longitude")?,
                line.parse(ROW_LON2, "longitude")?,
                line.parse(ROW_DLON, "longitude spacing")?,
            ),
            altitude: line.parse(ROW_ALTITUDE, "altitude")?,
        })
    }
}
