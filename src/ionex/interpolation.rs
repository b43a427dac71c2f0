//! Spatio-temporal TEC interpolation
use std::io::{BufRead, Seek};

use geo::Point;
use hifitime::Duration;
use itertools::Itertools;

use crate::{
    axis::RangeMode,
    epoch::Epoch,
    error::Error,
    ionex::{map::TecMap, IonexReader},
};

#[cfg(feature = "log")]
use log::{debug, warn};

/// [TecSeries] is the result of [IonexReader::interpolate]:
/// one TEC time series per requested point, all sharing the same epochs.
#[derive(Debug, Clone, PartialEq)]
pub struct TecSeries {
    /// Output [Epoch]s
    pub epochs: Vec<Epoch>,

    /// Requested points (x: longitude, y: latitude), in degrees
    pub points: Vec<Point<f64>>,

    /// TEC values in TECu, indexed as `tec[point][epoch]`.
    /// NaN where a contributing map value was missing.
    pub tec: Vec<Vec<f64>>,
}

impl TecSeries {
    fn new(points: &[Point<f64>]) -> Self {
        Self {
            epochs: Vec::new(),
            points: points.to_vec(),
            tec: vec![Vec::new(); points.len()],
        }
    }

    /// Number of epochs.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Time series of the `index`-th point.
    pub fn point_series(&self, index: usize) -> Option<&[f64]> {
        self.tec.get(index).map(|series| series.as_slice())
    }

    /// Iterates over (point, epoch, TEC) triplets, epoch being the fastest varying.
    pub fn iter(&self) -> impl Iterator<Item = (&Point<f64>, Epoch, f64)> + '_ {
        self.points
            .iter()
            .zip(self.tec.iter())
            .flat_map(move |(point, series)| {
                self.epochs
                    .iter()
                    .zip(series.iter())
                    .map(move |(epoch, tec)| (point, *epoch, *tec))
            })
    }

    /// Returns `self - rhs`, both series must share the same points and epochs.
    pub fn difference(&self, rhs: &Self) -> Result<Self, Error> {
        if self.epochs != rhs.epochs || self.points != rhs.points {
            return Err(Error::TimeSeriesMismatch);
        }

        let tec = self
            .tec
            .iter()
            .zip(rhs.tec.iter())
            .map(|(lhs, rhs)| lhs.iter().zip(rhs.iter()).map(|(a, b)| a - b).collect())
            .collect();

        Ok(Self {
            epochs: self.epochs.clone(),
            points: self.points.clone(),
            tec,
        })
    }

    fn push_spatial(&mut self, epoch: Epoch, map: &TecMap) -> Result<(), Error> {
        let values = self
            .points
            .iter()
            .map(|point| map.value(point.y(), point.x(), RangeMode::Unchecked))
            .collect::<Result<Vec<_>, _>>()?;

        self.push(epoch, values);
        Ok(())
    }

    fn push_temporal(&mut self, epoch: Epoch, before: &TecMap, after: &TecMap) -> Result<(), Error> {
        let weight =
            epoch.units_since(&before.epoch) as f64 / after.epoch.units_since(&before.epoch) as f64;

        let values = self
            .points
            .iter()
            .map(|point| {
                let (lat, lon) = (point.y(), point.x());
                let v0 = before.value(lat, lon, RangeMode::Unchecked)?;
                let v1 = after.value(lat, lon, RangeMode::Unchecked)?;
                Ok(v0 + (v1 - v0) * weight)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        self.push(epoch, values);
        Ok(())
    }

    fn push(&mut self, epoch: Epoch, values: Vec<f64>) {
        #[cfg(feature = "log")]
        if values.iter().any(|value| value.is_nan()) {
            warn!("{}: missing TEC values", epoch);
        }

        self.epochs.push(epoch);
        for (series, value) in self.tec.iter_mut().zip(values) {
            series.push(value);
        }
    }
}

impl std::fmt::Display for TecSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (point, epoch, tec) in self.iter() {
            writeln!(f, "{} {:8.3} {:8.3} {:.2}", epoch, point.y(), point.x(), tec)?;
        }
        Ok(())
    }
}

impl<R: BufRead + Seek> IonexReader<R> {
    /// Interpolates the TEC maps at each of the `points` (x: longitude, y: latitude, in degrees),
    /// from `from` to `to` (both included, defaulting to the first and last map) every `step`.
    ///
    /// Maps are streamed from the start of the file and only the two maps surrounding
    /// the current epoch are kept in memory. Each map is interpolated bilinearly
    /// (points outside of the grid are clamped to its edges), then consecutive maps
    /// are interpolated linearly in time. Epochs that coincide with a map
    /// only use that map.
    ///
    /// When `step` is null, the output epochs are the epochs of the TEC maps
    /// within the [from, to] window.
    ///
    /// Fails with [Error::InvalidStep] when `step` is negative, or positive but shorter
    /// than the [Epoch] resolution, and with [Error::EpochOutOfRange] when an output epoch
    /// is not surrounded by maps.
    /// No partial result is ever returned.
    ///
    /// ```
    /// use gridex::prelude::*;
    ///
    /// let mut reader = IonexReader::from_file("data/IONEX/V1/sample.inx")
    ///     .unwrap();
    ///
    /// let points = [Point::new(2.5, 2.5), Point::new(-30.0, 7.0)];
    ///
    /// let series = reader.interpolate(&points, None, None, Duration::from_seconds(15.0 * 60.0))
    ///     .unwrap();
    ///
    /// // 3 hourly maps
    /// assert_eq!(series.len(), 9);
    /// assert_eq!(series.point_series(1).unwrap().len(), 9);
    /// ```
    pub fn interpolate(
        &mut self,
        points: &[Point<f64>],
        from: Option<Epoch>,
        to: Option<Epoch>,
        step: Duration,
    ) -> Result<TecSeries, Error> {
        let from = from.unwrap_or(self.header().epoch_of_first_map);
        let to = to.unwrap_or(self.header().epoch_of_last_map);

        let step_units = <Epoch>::duration_units(step);

        if step < Duration::ZERO || (step > Duration::ZERO && step_units == 0) {
            return Err(Error::InvalidStep);
        }

        if to < from {
            return Err(Error::EpochOutOfRange(to.to_string()));
        }

        #[cfg(feature = "log")]
        debug!(
            "interpolating {} points from {} to {} (step: {})",
            points.len(),
            from,
            to,
            step
        );

        self.rewind()?;

        if step == Duration::ZERO {
            self.interpolate_native(points, from, to)
        } else {
            self.interpolate_steps(points, from, to, step_units)
        }
    }

    fn interpolate_native(
        &mut self,
        points: &[Point<f64>],
        from: Epoch,
        to: Epoch,
    ) -> Result<TecSeries, Error> {
        let mut series = TecSeries::new(points);
        let mut covered = false;

        while let Some(map) = self.next_tec_map()? {
            if map.epoch < from {
                continue;
            }

            if map.epoch > to {
                covered = true;
                break;
            }

            series.push_spatial(map.epoch, &map)?;

            if map.epoch == to {
                covered = true;
                break;
            }
        }

        if covered {
            Ok(series)
        } else {
            Err(Error::EpochOutOfRange(to.to_string()))
        }
    }

    fn interpolate_steps(
        &mut self,
        points: &[Point<f64>],
        from: Epoch,
        to: Epoch,
        step_units: i64,
    ) -> Result<TecSeries, Error> {
        let mut series = TecSeries::new(points);

        let mut before: Option<TecMap> = None;
        let mut after: Option<TecMap> = None;

        let mut t = from;

        while t <= to {
            // stream forward until `after` is the first map at or past t
            loop {
                if let Some(map) = &after {
                    if map.epoch >= t {
                        break;
                    }
                }

                let map = self
                    .next_tec_map()?
                    .ok_or_else(|| Error::EpochOutOfRange(t.to_string()))?;

                before = after.replace(map);
            }

            let Some(next) = &after else {
                return Err(Error::EpochOutOfRange(t.to_string()));
            };

            if next.epoch == t {
                series.push_spatial(t, next)?;
            } else {
                let Some(previous) = &before else {
                    return Err(Error::EpochOutOfRange(t.to_string()));
                };

                series.push_temporal(t, previous, next)?;
            }

            t.add_units(step_units);
        }

        Ok(series)
    }

    /// Collects the [Epoch] of every TEC map in the file.
    pub fn tec_map_epochs(&mut self) -> Result<Vec<Epoch>, Error> {
        self.rewind()?;

        let epochs = std::iter::from_fn(|| self.next_tec_map().transpose())
            .map_ok(|map| map.epoch)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(epochs)
    }
}
