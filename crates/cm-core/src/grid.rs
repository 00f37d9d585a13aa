//! Output grid generation and validation.
//!
//! A `TimeGrid` is the ordered set of points at which a trajectory is
//! reported. It is usually time, but closed-form profiles reuse it for other
//! independent variables (height, for instance).

use crate::error::{CoreError, CoreResult};
use crate::numeric::Real;

/// Strictly increasing, finite sequence of at least two points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Real>", into = "Vec<Real>")
)]
pub struct TimeGrid {
    points: Vec<Real>,
}

impl TimeGrid {
    /// Validate an explicit list of points.
    pub fn new(points: Vec<Real>) -> CoreResult<Self> {
        if points.len() < 2 {
            return Err(CoreError::invalid(format!(
                "time grid must have at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(i) = points.iter().position(|t| !t.is_finite()) {
            return Err(CoreError::NonFinite {
                what: format!("time grid[{i}]"),
                value: points[i],
            });
        }
        if let Some(i) = points.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CoreError::invalid(format!(
                "time grid must be strictly increasing (grid[{}]={} >= grid[{}]={})",
                i,
                points[i],
                i + 1,
                points[i + 1]
            )));
        }
        Ok(Self { points })
    }

    /// Evenly spaced grid including both end points.
    pub fn linspace(start: Real, end: Real, num_points: usize) -> CoreResult<Self> {
        if num_points < 2 {
            return Err(CoreError::invalid("grid must have at least 2 points"));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(CoreError::invalid("grid bounds must be finite"));
        }
        if end <= start {
            return Err(CoreError::invalid("grid end must be greater than start"));
        }

        let delta = (end - start) / (num_points - 1) as Real;
        let mut points: Vec<Real> = (0..num_points)
            .map(|i| start + i as Real * delta)
            .collect();

        // Ensure exact endpoint
        points[num_points - 1] = end;
        Self::new(points)
    }

    /// Half-open range `[start, stop)` with a fixed step.
    pub fn arange(start: Real, stop: Real, step: Real) -> CoreResult<Self> {
        if !start.is_finite() || !stop.is_finite() || !step.is_finite() {
            return Err(CoreError::invalid("grid range must be finite"));
        }
        if step <= 0.0 {
            return Err(CoreError::invalid("grid step must be positive"));
        }
        let count = ((stop - start) / step).ceil();
        if count < 2.0 {
            return Err(CoreError::invalid("grid range yields fewer than 2 points"));
        }
        let points = (0..count as usize)
            .map(|i| start + i as Real * step)
            .collect();
        Self::new(points)
    }

    pub fn as_slice(&self) -> &[Real] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Real {
        self.points[0]
    }

    pub fn end(&self) -> Real {
        self.points[self.points.len() - 1]
    }

    /// True if `t` lies strictly between the first and last grid point.
    pub fn strictly_contains(&self, t: Real) -> bool {
        t > self.start() && t < self.end()
    }

    pub fn iter(&self) -> impl Iterator<Item = Real> + '_ {
        self.points.iter().copied()
    }
}

impl TryFrom<Vec<Real>> for TimeGrid {
    type Error = CoreError;

    fn try_from(points: Vec<Real>) -> CoreResult<Self> {
        Self::new(points)
    }
}

impl From<TimeGrid> for Vec<Real> {
    fn from(grid: TimeGrid) -> Self {
        grid.points
    }
}

impl AsRef<[Real]> for TimeGrid {
    fn as_ref(&self) -> &[Real] {
        &self.points
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn linspace_is_strictly_increasing(
            start in -1e3_f64..1e3,
            width in 1e-3_f64..1e3,
            n in 2_usize..500,
        ) {
            let grid = TimeGrid::linspace(start, start + width, n).unwrap();
            prop_assert_eq!(grid.len(), n);
            prop_assert!(grid.as_slice().windows(2).all(|w| w[1] > w[0]));
            prop_assert_eq!(grid.end(), start + width);
        }
    }
}
