//! Integration output.

use cm_core::Real;

use crate::error::{SimError, SimResult};

/// Integrator bookkeeping for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evaluations: usize,
    pub breakpoints_crossed: usize,
}

/// Table of `(time, state)` rows, one per requested output point.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// Output times, identical to the requested grid
    pub t: Vec<Real>,
    /// State snapshots, `x[i]` taken at `t[i]`
    pub x: Vec<Vec<Real>>,
    pub stats: SimStats,
}

impl Trajectory {
    pub(crate) fn with_capacity(rows: usize) -> Self {
        Self {
            t: Vec::with_capacity(rows),
            x: Vec::with_capacity(rows),
            stats: SimStats::default(),
        }
    }

    pub(crate) fn push(&mut self, t: Real, x: Vec<Real>) {
        self.t.push(t);
        self.x.push(x);
    }

    /// Build a trajectory from precomputed rows (closed-form evaluators).
    pub fn from_rows(t: Vec<Real>, x: Vec<Vec<Real>>) -> SimResult<Self> {
        if t.len() != x.len() {
            return Err(SimError::invalid(format!(
                "trajectory has {} times but {} states",
                t.len(),
                x.len()
            )));
        }
        if let Some(first) = x.first() {
            let dim = first.len();
            if let Some(i) = x.iter().position(|row| row.len() != dim) {
                return Err(SimError::invalid(format!(
                    "trajectory row {i} has length {} (expected {dim})",
                    x[i].len()
                )));
            }
        }
        Ok(Self {
            t,
            x,
            stats: SimStats::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Number of state variables (0 for an empty trajectory).
    pub fn dimension(&self) -> usize {
        self.x.first().map_or(0, Vec::len)
    }

    pub fn row(&self, i: usize) -> Option<(Real, &[Real])> {
        Some((*self.t.get(i)?, self.x.get(i)?.as_slice()))
    }

    /// Time series of one state variable.
    pub fn series(&self, index: usize) -> Option<Vec<Real>> {
        if index >= self.dimension() {
            return None;
        }
        Some(self.x.iter().map(|row| row[index]).collect())
    }

    pub fn final_state(&self) -> Option<&[Real]> {
        self.x.last().map(Vec::as_slice)
    }

    /// Sum of all state variables at each output time.
    pub fn totals(&self) -> Vec<Real> {
        self.x.iter().map(|row| row.iter().sum()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_extracts_column() {
        let traj =
            Trajectory::from_rows(vec![0.0, 1.0], vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(traj.dimension(), 2);
        assert_eq!(traj.series(1), Some(vec![2.0, 4.0]));
        assert_eq!(traj.series(2), None);
        assert_eq!(traj.totals(), vec![3.0, 7.0]);
        assert_eq!(traj.row(1), Some((1.0, &[3.0, 4.0][..])));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = Trajectory::from_rows(vec![0.0, 1.0], vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(err.is_err());
        let err = Trajectory::from_rows(vec![0.0], vec![]);
        assert!(err.is_err());
    }
}
