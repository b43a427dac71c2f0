//! Phase center variation patterns
use itertools::Itertools;

use crate::{
    antex::{
        antenna::{Antenna, Calibration},
        frequency::FrequencyId,
    },
    axis::{RangeMode, TickAxis},
    error::Error,
    grid::{Grid1D, Grid2D, RowOrder},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Azimuth always spans the full circle.
pub(crate) const AZIMUTH_START: f64 = 0.0;
pub(crate) const AZIMUTH_STOP: f64 = 360.0;

/// Calibration of a single frequency.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrequencyPattern {
    /// Frequency identifier
    pub id: FrequencyId,

    /// Northern component of the mean phase center offset, in millimeters
    pub north: f64,

    /// Eastern component of the mean phase center offset, in millimeters
    pub east: f64,

    /// Vertical component of the mean phase center offset, in millimeters
    pub up: f64,

    /// Zenith only (NOAZI) variations, one per zenith tick, in millimeters
    pub noazi: Vec<f64>,

    /// Azimuth dependent variations, in millimeters, stored azimuth after azimuth
    /// (one row of zenith values per azimuth tick). Empty when DAZI is null.
    pub azimuth: Vec<f64>,
}

/// [AntennaPattern] gathers all calibrated frequencies of one antenna.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AntennaPattern {
    /// [Antenna] this pattern belongs to
    pub antenna: Antenna,

    /// [Calibration] details
    pub calibration: Calibration,

    /// Azimuth increment, in degrees. Null for azimuth independent patterns.
    pub dazi: f64,

    /// First zenith angle, in degrees
    pub zen1: f64,

    /// Last zenith angle, in degrees
    pub zen2: f64,

    /// Zenith increment, in degrees
    pub dzen: f64,

    /// Calibrated frequencies, in order of appearance
    pub frequencies: Vec<FrequencyPattern>,
}

impl AntennaPattern {
    /// Returns true if this pattern depends on the azimuth angle.
    pub fn is_azimuth_dependent(&self) -> bool {
        self.dazi != 0.0
    }

    /// Zenith [TickAxis]
    pub fn zenith_axis(&self) -> Result<TickAxis, Error> {
        TickAxis::new(self.zen1, self.zen2, self.dzen)
    }

    /// Azimuth [TickAxis], only for azimuth dependent patterns.
    pub fn azimuth_axis(&self) -> Option<Result<TickAxis, Error>> {
        if self.is_azimuth_dependent() {
            Some(TickAxis::new(AZIMUTH_START, AZIMUTH_STOP, self.dazi))
        } else {
            None
        }
    }

    /// Returns [FrequencyPattern] for this [FrequencyId], if it was calibrated.
    pub fn frequency(&self, id: &FrequencyId) -> Option<&FrequencyPattern> {
        self.frequencies.iter().find(|freq| freq.id == *id)
    }

    fn frequency_at(&self, index: usize) -> Result<&FrequencyPattern, Error> {
        self.frequencies
            .get(index)
            .ok_or(Error::UnknownFrequency(index))
    }

    fn azimuth_grid(&self) -> Result<Option<Grid2D>, Error> {
        match self.azimuth_axis() {
            Some(azimuth) => Ok(Some(Grid2D::new(
                self.zenith_axis()?,
                azimuth?,
                RowOrder::Normal,
            ))),
            None => Ok(None),
        }
    }

    /// Phase center variation (in millimeters) at given angles (in degrees),
    /// for the `frequency`-th calibrated frequency.
    /// Azimuth independent patterns are linearly interpolated along the zenith axis,
    /// other patterns are bilinearly interpolated. Azimuth is wrapped to [0, 360).
    ///
    /// ```
    /// use gridex::prelude::*;
    ///
    /// let mut reader = AntexReader::from_file("data/ANTEX/igs14_sample.atx")
    ///     .unwrap();
    ///
    /// let antenna = Antenna::new("TRM59800.00", "SCIS");
    ///
    /// let pattern = reader.antenna_pattern(&antenna)
    ///     .unwrap();
    ///
    /// let pcv = pattern.value(12.5, 45.0, 0, RangeMode::Checked)
    ///     .unwrap();
    ///
    /// assert!(pcv.abs() < 10.0);
    /// ```
    pub fn value(
        &self,
        zenith: f64,
        azimuth: f64,
        frequency: usize,
        mode: RangeMode,
    ) -> Result<f64, Error> {
        let freq = self.frequency_at(frequency)?;

        match self.azimuth_grid()? {
            Some(grid) => grid.bilinear_interpolation(
                zenith,
                azimuth.rem_euclid(AZIMUTH_STOP),
                &freq.azimuth,
                mode,
            ),
            None => Grid1D::new(self.zenith_axis()?).linear_interpolation(zenith, &freq.noazi, mode),
        }
    }

    /// Zenith only (NOAZI) phase center variation, ignoring azimuth dependent values.
    pub fn noazi_value(&self, zenith: f64, frequency: usize, mode: RangeMode) -> Result<f64, Error> {
        let freq = self.frequency_at(frequency)?;
        Grid1D::new(self.zenith_axis()?).linear_interpolation(zenith, &freq.noazi, mode)
    }

    /// Phase center variation of the closest calibrated angles.
    pub fn nearest(&self, zenith: f64, azimuth: f64, frequency: usize) -> Result<f64, Error> {
        let freq = self.frequency_at(frequency)?;

        match self.azimuth_grid()? {
            Some(grid) => grid.nearest(zenith, azimuth.rem_euclid(AZIMUTH_STOP), &freq.azimuth),
            None => Grid1D::new(self.zenith_axis()?).nearest(zenith, &freq.noazi),
        }
    }

    /// Samples this pattern every `zenith_step` from ZEN1 to ZEN2 and
    /// every `azimuth_step` from 0 to 360 degrees (both included), returning
    /// (zenith, azimuth, value) triplets, azimuth being the fastest varying angle.
    /// Sampled angles never leave the calibrated range: the last zenith tick
    /// resolves to the boundary samples.
    pub fn sample(
        &self,
        zenith_step: f64,
        azimuth_step: f64,
        frequency: usize,
    ) -> Result<Vec<(f64, f64, f64)>, Error> {
        let zenith = TickAxis::new(self.zen1, self.zen2, zenith_step)?;
        let azimuth = TickAxis::new(AZIMUTH_START, AZIMUTH_STOP, azimuth_step)?;

        zenith
            .ticks()
            .cartesian_product(azimuth.ticks().collect_vec())
            .map(|(zen, azi)| {
                self.value(zen, azi, frequency, RangeMode::Unchecked)
                    .map(|value| (zen, azi, value))
            })
            .collect()
    }
}
