//! Evenly spaced [TickAxis], the backbone of all interpolation grids.
use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance applied on fractional tick positions,
/// absorbs decimal steps that are not exactly representable.
const POSITION_TOLERANCE: f64 = 1.0E-9;

/// [RangeMode] selects how queries outside of an axis are handled.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RangeMode {
    /// Queries that cannot be bracketed fail with [Error::OutOfRange].
    #[default]
    Checked,

    /// Queries never fail: node indices are computed algebraically
    /// and interpolation snaps to the boundary samples.
    Unchecked,
}

/// [TickAxis] describes `count` evenly spaced ticks,
/// from `start` to `stop` (included), either ascending or descending.
///
/// ```
/// use gridex::prelude::*;
///
/// let axis = TickAxis::new(0.0, 90.0, 5.0)
///     .unwrap();
///
/// assert_eq!(axis.count(), 19);
/// assert_eq!(axis.tick_at(2), 10.0);
///
/// // nearest neighbor snaps to the axis edges
/// assert_eq!(axis.nearest_neighbor(-20.0).index(), 0);
/// assert_eq!(axis.nearest_neighbor(12.6).index(), 3);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickAxis {
    start: f64,
    stop: f64,
    step: f64,
    count: usize,
}

/// [Node] is one tick of a [TickAxis]. The index is signed because
/// unchecked neighbor searches may point outside the axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Node<'a> {
    axis: &'a TickAxis,
    index: isize,
}

impl<'a> Node<'a> {
    /// Index of this [Node] on its axis.
    pub fn index(&self) -> isize {
        self.index
    }

    /// Coordinate of this [Node], extrapolated when the index is not valid.
    pub fn value(&self) -> f64 {
        self.axis.start + self.axis.step * self.index as f64
    }

    /// Returns true if this [Node] designates an existing tick.
    pub fn is_valid(&self) -> bool {
        self.index >= 0 && (self.index as usize) < self.axis.count
    }
}

/// How a coordinate resolved on one axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Bracket {
    /// Bracketed by `left` and `right`, `weight` being
    /// the fraction of the way from left to right.
    Interior {
        left: usize,
        right: usize,
        weight: f64,
    },

    /// Not bracketed: clamped to this boundary tick.
    Edge(usize),
}

impl TickAxis {
    /// Builds a new [TickAxis]. `step` must be non zero and head from `start` towards `stop`.
    /// `start == stop` describes a single tick.
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self, Error> {
        let invalid = !start.is_finite()
            || !stop.is_finite()
            || !step.is_finite()
            || step == 0.0
            || (stop - start) * step < 0.0;

        if invalid {
            return Err(Error::InvalidAxis { start, stop, step });
        }

        let count = ((stop - start) / step + POSITION_TOLERANCE).floor() as usize + 1;

        Ok(Self {
            start,
            stop,
            step,
            count,
        })
    }

    /// First tick.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Last tick, as declared.
    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// Tick spacing, negative for descending axes.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of ticks.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns true if this axis is ascending.
    pub fn is_ascending(&self) -> bool {
        self.step > 0.0
    }

    /// Returns tick value at `index`, which should be lower than [Self::count].
    pub fn tick_at(&self, index: usize) -> f64 {
        debug_assert!(index < self.count, "tick index out of range");
        self.start + self.step * index as f64
    }

    /// Returns [Node] at `index`, if it exists.
    pub fn node(&self, index: usize) -> Option<Node<'_>> {
        if index < self.count {
            Some(Node {
                axis: self,
                index: index as isize,
            })
        } else {
            None
        }
    }

    /// Iterates over all tick values.
    pub fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(|i| self.tick_at(i))
    }

    /// Returns true if `x` lies between [Self::start] and [Self::stop] (included),
    /// whatever the axis direction.
    pub fn contains(&self, x: f64) -> bool {
        let pos = self.position(x);
        pos >= -POSITION_TOLERANCE && pos <= (self.count - 1) as f64 + POSITION_TOLERANCE
    }

    /// Fractional tick position of `x`.
    fn position(&self, x: f64) -> f64 {
        (x - self.start) / self.step
    }

    /// Returns the [Node] closest to `x`. Coordinates outside of this axis
    /// snap to the nearest edge.
    pub fn nearest_neighbor(&self, x: f64) -> Node<'_> {
        let last = (self.count - 1) as f64;
        let pos = self.position(x);

        let index = if pos <= 0.0 {
            0.0
        } else if pos >= last {
            last
        } else {
            (pos + 0.5).floor()
        };

        Node {
            axis: self,
            index: index as isize,
        }
    }

    /// Returns the (left, right) [Node]s bracketing `x`.
    ///
    /// In [RangeMode::Checked], this fails with [Error::OutOfRange] when `x` lies
    /// outside of the axis or when the right node would not exist (`x` on the last tick).
    /// In [RangeMode::Unchecked], this never fails, returned nodes may be invalid:
    /// positions beyond the axis are clamped to one node past its closest edge.
    pub fn neighbor_nodes(&self, x: f64, mode: RangeMode) -> Result<(Node<'_>, Node<'_>), Error> {
        let pos = self.position(x);

        let left = match mode {
            RangeMode::Checked => {
                if !self.contains(x) {
                    return Err(Error::OutOfRange);
                }

                let left = pos.floor().max(0.0) as usize;

                if left + 1 >= self.count {
                    return Err(Error::OutOfRange);
                }

                left as isize
            },
            RangeMode::Unchecked => pos.max(-1.0).min(self.count as f64).floor() as isize,
        };

        Ok((
            Node {
                axis: self,
                index: left,
            },
            Node {
                axis: self,
                index: left + 1,
            },
        ))
    }

    /// Resolves `x` to either a bracketing pair or a boundary tick.
    pub(crate) fn bracket(&self, x: f64, mode: RangeMode) -> Result<Bracket, Error> {
        let (left, right) = self.neighbor_nodes(x, mode)?;

        if left.index < 0 {
            return Ok(Bracket::Edge(0));
        }

        if right.index as usize >= self.count {
            return Ok(Bracket::Edge(self.count - 1));
        }

        let weight = (x - left.value()) / (right.value() - left.value());

        Ok(Bracket::Interior {
            left: left.index as usize,
            right: right.index as usize,
            weight,
        })
    }
}
