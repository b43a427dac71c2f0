//! 1-D and 2-D interpolation grids built on top of [TickAxis].
//! Grids do not own their samples: callers provide a slice
//! which must be sized to exactly the number of grid nodes.
use crate::{
    axis::{Bracket, Node, RangeMode, TickAxis},
    error::Error,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [RowOrder] describes how (x, y) node pairs map to flat sample indices.
/// Samples are always stored row by row, one row per y tick.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RowOrder {
    /// First stored row is the first y tick: `y * x_count + x`
    #[default]
    Normal,

    /// First stored row is the last y tick: `(y_count - 1 - y) * x_count + x`
    Reversed,
}

fn check_samples(expected: usize, samples: &[f64]) -> Result<(), Error> {
    if samples.len() == expected {
        Ok(())
    } else {
        Err(Error::SampleCount {
            expected,
            found: samples.len(),
        })
    }
}

/// Linear interpolation between (x0, y0) and (x1, y1) evaluated at `x0 + weight * (x1 - x0)`.
fn lerp(y0: f64, y1: f64, weight: f64) -> f64 {
    y0 + (y1 - y0) * weight
}

/// [Grid1D] interpolates samples defined along a single [TickAxis].
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid1D {
    axis: TickAxis,
}

impl Grid1D {
    pub fn new(axis: TickAxis) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> &TickAxis {
        &self.axis
    }

    /// Number of nodes, which is the expected number of samples.
    pub fn len(&self) -> usize {
        self.axis.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample of the node closest to `x` (clamped to the axis edges).
    pub fn nearest(&self, x: f64, samples: &[f64]) -> Result<f64, Error> {
        check_samples(self.len(), samples)?;
        let node = self.axis.nearest_neighbor(x);
        Ok(samples[node.index() as usize])
    }

    /// Linear interpolation of `samples` at `x`. In [RangeMode::Unchecked],
    /// coordinates that are not bracketed return the closest boundary sample
    /// and are never extrapolated.
    pub fn linear_interpolation(
        &self,
        x: f64,
        samples: &[f64],
        mode: RangeMode,
    ) -> Result<f64, Error> {
        check_samples(self.len(), samples)?;

        match self.axis.bracket(x, mode)? {
            Bracket::Edge(index) => Ok(samples[index]),
            Bracket::Interior {
                left,
                right,
                weight,
            } => Ok(lerp(samples[left], samples[right], weight)),
        }
    }
}

/// A node of a [Grid2D].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Node2D<'a> {
    pub x: Node<'a>,
    pub y: Node<'a>,
}

/// [Grid2D] interpolates samples defined over two independent axes.
///
/// ```
/// use gridex::prelude::*;
///
/// let x = TickAxis::new(0.0, 10.0, 10.0).unwrap();
/// let y = TickAxis::new(0.0, 10.0, 10.0).unwrap();
/// let grid = Grid2D::new(x, y, RowOrder::Normal);
///
/// // (x0, y0), (x1, y0), (x0, y1), (x1, y1)
/// let samples = [1.0, 2.0, 3.0, 4.0];
///
/// let center = grid.bilinear_interpolation(5.0, 5.0, &samples, RangeMode::Checked)
///     .unwrap();
///
/// assert_eq!(center, 2.5);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid2D {
    x: TickAxis,
    y: TickAxis,
    order: RowOrder,
}

impl Grid2D {
    pub fn new(x: TickAxis, y: TickAxis, order: RowOrder) -> Self {
        Self { x, y, order }
    }

    pub fn x_axis(&self) -> &TickAxis {
        &self.x
    }

    pub fn y_axis(&self) -> &TickAxis {
        &self.y
    }

    pub fn row_order(&self) -> RowOrder {
        self.order
    }

    /// Number of nodes, which is the expected number of samples.
    pub fn len(&self) -> usize {
        self.x.count() * self.y.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat sample index of node (x_index, y_index), following [RowOrder].
    pub fn index_of(&self, x_index: usize, y_index: usize) -> usize {
        debug_assert!(x_index < self.x.count() && y_index < self.y.count());
        match self.order {
            RowOrder::Normal => y_index * self.x.count() + x_index,
            RowOrder::Reversed => (self.y.count() - 1 - y_index) * self.x.count() + x_index,
        }
    }

    /// Returns the four nodes bracketing (x, y), clockwise:
    /// bottom-left, top-left, top-right, bottom-right.
    /// See [TickAxis::neighbor_nodes] for the [RangeMode] behavior.
    pub fn neighbor_nodes(
        &self,
        x: f64,
        y: f64,
        mode: RangeMode,
    ) -> Result<[Node2D<'_>; 4], Error> {
        let (x0, x1) = self.x.neighbor_nodes(x, mode)?;
        let (y0, y1) = self.y.neighbor_nodes(y, mode)?;
        Ok([
            Node2D { x: x0, y: y0 },
            Node2D { x: x0, y: y1 },
            Node2D { x: x1, y: y1 },
            Node2D { x: x1, y: y0 },
        ])
    }

    /// Sample of the node closest to (x, y), clamped to the grid edges.
    pub fn nearest(&self, x: f64, y: f64, samples: &[f64]) -> Result<f64, Error> {
        check_samples(self.len(), samples)?;
        let xi = self.x.nearest_neighbor(x).index() as usize;
        let yi = self.y.nearest_neighbor(y).index() as usize;
        Ok(samples[self.index_of(xi, yi)])
    }

    /// Bilinear interpolation of `samples` at (x, y).
    ///
    /// In [RangeMode::Unchecked], an axis that cannot bracket its coordinate
    /// (outside of the grid, or exactly on its last tick) is clamped to its
    /// boundary tick and interpolation continues along the other axis only.
    /// In [RangeMode::Checked], this fails with [Error::OutOfRange] instead.
    pub fn bilinear_interpolation(
        &self,
        x: f64,
        y: f64,
        samples: &[f64],
        mode: RangeMode,
    ) -> Result<f64, Error> {
        check_samples(self.len(), samples)?;

        let bx = self.x.bracket(x, mode)?;
        let by = self.y.bracket(y, mode)?;

        let f = |xi: usize, yi: usize| samples[self.index_of(xi, yi)];

        let value = match (bx, by) {
            (Bracket::Edge(xi), Bracket::Edge(yi)) => f(xi, yi),
            (Bracket::Edge(xi), Bracket::Interior { left, right, weight }) => {
                lerp(f(xi, left), f(xi, right), weight)
            },
            (Bracket::Interior { left, right, weight }, Bracket::Edge(yi)) => {
                lerp(f(left, yi), f(right, yi), weight)
            },
            (
                Bracket::Interior {
                    left: x0,
                    right: x1,
                    weight: wx,
                },
                Bracket::Interior {
                    left: y0,
                    right: y1,
                    weight: wy,
                },
            ) => {
                f(x0, y0) * (1.0 - wx) * (1.0 - wy)
                    + f(x0, y1) * (1.0 - wx) * wy
                    + f(x1, y1) * wx * wy
                    + f(x1, y0) * wx * (1.0 - wy)
            },
        };

        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn zenith_grid() -> Grid1D {
        Grid1D::new(TickAxis::new(0.0, 30.0, 10.0).unwrap())
    }

    #[test]
    fn linear_interpolation() {
        let grid = zenith_grid();
        let samples = [1.0, 2.0, 3.0, 4.0];

        for (x, expected) in [(0.0, 1.0), (5.0, 1.5), (12.5, 2.25), (29.0, 3.9)] {
            for mode in [RangeMode::Checked, RangeMode::Unchecked] {
                let value = grid.linear_interpolation(x, &samples, mode).unwrap();
                assert!((value - expected).abs() < 1e-9, "x={} {:?}", x, mode);
            }
        }
    }

    #[test]
    fn linear_boundaries() {
        let grid = zenith_grid();
        let samples = [1.0, 2.0, 3.0, 4.0];

        for (x, expected) in [(-10.0, 1.0), (30.0, 4.0), (35.0, 4.0), (1000.0, 4.0)] {
            let value = grid
                .linear_interpolation(x, &samples, RangeMode::Unchecked)
                .unwrap();
            assert_eq!(value, expected, "x={}", x);
        }

        for (x, expected) in [
            (1.0E300, 4.0),
            (f64::INFINITY, 4.0),
            (-1.0E300, 1.0),
            (f64::NEG_INFINITY, 1.0),
        ] {
            let value = grid
                .linear_interpolation(x, &samples, RangeMode::Unchecked)
                .unwrap();
            assert_eq!(value, expected, "x={}", x);
        }

        for x in [-10.0, 35.0] {
            assert!(matches!(
                grid.linear_interpolation(x, &samples, RangeMode::Checked),
                Err(Error::OutOfRange)
            ));
        }
    }

    #[test]
    fn sample_count_mismatch() {
        let grid = zenith_grid();
        match grid.linear_interpolation(5.0, &[1.0, 2.0, 3.0], RangeMode::Unchecked) {
            Err(Error::SampleCount { expected, found }) => {
                assert_eq!(expected, 4);
                assert_eq!(found, 3);
            },
            other => panic!("unexpected result {:?}", other),
        }
        assert!(grid.nearest(5.0, &[]).is_err());
    }

    #[test]
    fn index_mapping() {
        let x = TickAxis::new(0.0, 2.0, 1.0).unwrap();
        let y = TickAxis::new(0.0, 1.0, 1.0).unwrap();

        let normal = Grid2D::new(x, y, RowOrder::Normal);
        assert_eq!(normal.index_of(0, 0), 0);
        assert_eq!(normal.index_of(2, 0), 2);
        assert_eq!(normal.index_of(0, 1), 3);
        assert_eq!(normal.index_of(2, 1), 5);

        let reversed = Grid2D::new(x, y, RowOrder::Reversed);
        assert_eq!(reversed.index_of(0, 0), 3);
        assert_eq!(reversed.index_of(2, 0), 5);
        assert_eq!(reversed.index_of(0, 1), 0);
        assert_eq!(reversed.index_of(2, 1), 2);
    }

    #[test]
    fn clockwise_nodes() {
        let axis = TickAxis::new(0.0, 10.0, 10.0).unwrap();
        let grid = Grid2D::new(axis, axis, RowOrder::Normal);

        let nodes = grid.neighbor_nodes(3.0, 7.0, RangeMode::Checked).unwrap();

        let coords = nodes
            .iter()
            .map(|n| (n.x.value(), n.y.value()))
            .collect::<Vec<_>>();

        assert_eq!(
            coords,
            vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]
        );
    }

    #[test]
    fn bilinear_interpolation() {
        let x = TickAxis::new(0.0, 20.0, 10.0).unwrap();
        let y = TickAxis::new(0.0, 10.0, 10.0).unwrap();
        let grid = Grid2D::new(x, y, RowOrder::Normal);

        // f(x, y) = x + 2y is reproduced exactly
        let samples = [0.0, 10.0, 20.0, 20.0, 30.0, 40.0];

        for (px, py) in [(0.0, 0.0), (5.0, 5.0), (12.0, 3.0), (19.0, 9.5)] {
            for mode in [RangeMode::Checked, RangeMode::Unchecked] {
                let value = grid.bilinear_interpolation(px, py, &samples, mode).unwrap();
                assert!((value - (px + 2.0 * py)).abs() < 1e-9, "({}, {})", px, py);
            }
        }
    }

    #[test]
    fn bilinear_edges() {
        let x = TickAxis::new(0.0, 20.0, 10.0).unwrap();
        let y = TickAxis::new(0.0, 10.0, 10.0).unwrap();
        let grid = Grid2D::new(x, y, RowOrder::Normal);
        let samples = [0.0, 10.0, 20.0, 20.0, 30.0, 40.0];

        // last tick on x: 1-D along y
        let value = grid
            .bilinear_interpolation(20.0, 5.0, &samples, RangeMode::Unchecked)
            .unwrap();
        assert!((value - 30.0).abs() < 1e-9);

        // outside on y: 1-D along x, at the y edge
        let value = grid
            .bilinear_interpolation(5.0, 50.0, &samples, RangeMode::Unchecked)
            .unwrap();
        assert!((value - 25.0).abs() < 1e-9);

        // outside on both: corner
        let value = grid
            .bilinear_interpolation(-5.0, 50.0, &samples, RangeMode::Unchecked)
            .unwrap();
        assert_eq!(value, 20.0);

        // far away coordinates
        for far in [1.0E300, f64::INFINITY] {
            let value = grid
                .bilinear_interpolation(far, 5.0, &samples, RangeMode::Unchecked)
                .unwrap();
            assert!((value - 30.0).abs() < 1e-9);

            let value = grid
                .bilinear_interpolation(-far, far, &samples, RangeMode::Unchecked)
                .unwrap();
            assert_eq!(value, 20.0);
        }

        assert!(matches!(
            grid.bilinear_interpolation(20.0, 5.0, &samples, RangeMode::Checked),
            Err(Error::OutOfRange)
        ));
        assert!(matches!(
            grid.bilinear_interpolation(5.0, 50.0, &samples, RangeMode::Checked),
            Err(Error::OutOfRange)
        ));
    }

    #[test]
    fn reversed_rows() {
        // latitude axis is ascending, rows are stored north to south
        let lon = TickAxis::new(0.0, 10.0, 10.0).unwrap();
        let lat = TickAxis::new(-10.0, 10.0, 10.0).unwrap();
        let grid = Grid2D::new(lon, lat, RowOrder::Reversed);

        // rows: lat=10, lat=0, lat=-10
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

        assert_eq!(grid.nearest(0.0, 10.0, &samples).unwrap(), 1.0);
        assert_eq!(grid.nearest(10.0, -10.0, &samples).unwrap(), 6.0);

        let value = grid
            .bilinear_interpolation(5.0, -5.0, &samples, RangeMode::Checked)
            .unwrap();
        assert!((value - 4.5).abs() < 1e-9);
    }
}
