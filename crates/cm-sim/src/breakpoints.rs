//! Stepping schedule: requested output points merged with switch times.

use cm_core::{Real, TimeGrid};

use crate::error::{SimError, SimResult};

/// One mandatory landing point of the driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Stop {
    pub t: Real,
    /// Output row to record on arrival, if this is a grid point.
    pub record: bool,
    /// The governing equations change form here.
    pub switch: bool,
}

/// Switch times after the first grid point, up to and including the last,
/// sorted and deduplicated.
///
/// A switch on the last grid point still caps the final segment, so the
/// recorded end state comes from the pre-switch formula alone.
pub(crate) fn landing_switch_times(grid: &TimeGrid, candidates: &[Real]) -> SimResult<Vec<Real>> {
    if let Some(bad) = candidates.iter().find(|t| !t.is_finite()) {
        return Err(SimError::invalid(format!("switch time must be finite, got {bad}")));
    }
    let mut inside: Vec<Real> = candidates
        .iter()
        .copied()
        .filter(|&t| t > grid.start() && t <= grid.end())
        .collect();
    inside.sort_by(Real::total_cmp);
    inside.dedup();
    Ok(inside)
}

/// Merge grid points (after the first) with interior switch times.
pub(crate) fn build_schedule(grid: &TimeGrid, switches: &[Real]) -> Vec<Stop> {
    let points = &grid.as_slice()[1..];
    let mut stops = Vec::with_capacity(points.len() + switches.len());
    let (mut i, mut j) = (0, 0);

    while i < points.len() || j < switches.len() {
        let next_point = points.get(i).copied();
        let next_switch = switches.get(j).copied();
        match (next_point, next_switch) {
            (Some(p), Some(s)) if p == s => {
                stops.push(Stop {
                    t: p,
                    record: true,
                    switch: true,
                });
                i += 1;
                j += 1;
            }
            (Some(p), Some(s)) if s < p => {
                stops.push(Stop {
                    t: s,
                    record: false,
                    switch: true,
                });
                j += 1;
            }
            (Some(p), _) => {
                stops.push(Stop {
                    t: p,
                    record: true,
                    switch: false,
                });
                i += 1;
            }
            (None, Some(s)) => {
                stops.push(Stop {
                    t: s,
                    record: false,
                    switch: true,
                });
                j += 1;
            }
            (None, None) => break,
        }
    }
    stops
}
