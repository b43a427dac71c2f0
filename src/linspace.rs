use crate::{axis::TickAxis, error::Error};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear space as declared in ANTEX (zenith) or IONEX (latitude, longitude, altitude)
/// headers: from `start` to `end` (included), separated by `spacing`.
/// A [Linspace] is not validated, use [Linspace::to_axis] to obtain a [TickAxis].
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Linspace {
    /// First value
    pub start: f64,

    /// Last value (included)
    pub end: f64,

    /// Spacing (increment)
    pub spacing: f64,
}

impl Linspace {
    /// Builds a new Linear space
    pub fn new(start: f64, end: f64, spacing: f64) -> Self {
        Self {
            start,
            end,
            spacing,
        }
    }

    /// Returns smallest value between [Self::start] and [Self::end]
    pub fn min(&self) -> f64 {
        self.start.min(self.end)
    }

    /// Returns largest value between [Self::start] and [Self::end]
    pub fn max(&self) -> f64 {
        self.start.max(self.end)
    }

    /// Returns total width
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Returns true if self is a single point space
    pub fn is_single_point(&self) -> bool {
        self.end == self.start && self.spacing == 0.0
    }

    /// Converts to a validated [TickAxis]. Single point spaces
    /// (null spacing) are converted to a single tick axis.
    pub fn to_axis(&self) -> Result<TickAxis, Error> {
        if self.is_single_point() {
            TickAxis::new(self.start, self.end, 1.0)
        } else {
            TickAxis::new(self.start, self.end, self.spacing)
        }
    }

    /// Returns number of points, or None if this is not a valid space.
    pub fn length(&self) -> Option<usize> {
        self.to_axis().ok().map(|axis| axis.count())
    }

    /// Returns true if both spaces describe the same ticks, within `tolerance`.
    pub fn matches(&self, rhs: &Self, tolerance: f64) -> bool {
        (self.start - rhs.start).abs() < tolerance
            && (self.end - rhs.end).abs() < tolerance
            && (self.spacing - rhs.spacing).abs() < tolerance
    }
}

impl From<(f64, f64, f64)> for Linspace {
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self {
            start: tuple.0,
            end: tuple.1,
            spacing: tuple.2,
        }
    }
}
