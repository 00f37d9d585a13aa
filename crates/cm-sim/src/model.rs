//! OdeModel trait for pluggable right-hand sides.

use cm_core::{ParamSet, Real};

use crate::error::{SimError, SimResult};

/// A system `dx/dt = f(t, x; params)`.
///
/// Implementations must be pure: the integrator evaluates `rhs` several
/// times per step, at trial states and trial times that may be discarded.
/// A piecewise system branches on `t` alone and reports every threshold
/// through `switch_times` so the driver can stop exactly there.
pub trait OdeModel {
    /// Number of state variables.
    fn dimension(&self) -> usize;

    /// Compute the derivative at `(t, x)`. Must return `dimension()` values.
    fn rhs(&self, t: Real, x: &[Real], params: &ParamSet) -> SimResult<Vec<Real>>;

    /// Times at which the governing equations change form.
    fn switch_times(&self, _params: &ParamSet) -> SimResult<Vec<Real>> {
        Ok(Vec::new())
    }
}

/// Adapts a plain closure into an `OdeModel`.
pub struct ClosureModel<F> {
    dimension: usize,
    f: F,
    switch_times: Vec<Real>,
}

impl<F> ClosureModel<F>
where
    F: Fn(Real, &[Real], &ParamSet) -> Vec<Real>,
{
    pub fn new(dimension: usize, f: F) -> Self {
        Self {
            dimension,
            f,
            switch_times: Vec::new(),
        }
    }

    /// Declare a time at which the closure switches formula.
    pub fn with_switch_time(mut self, t: Real) -> Self {
        self.switch_times.push(t);
        self
    }
}

impl<F> OdeModel for ClosureModel<F>
where
    F: Fn(Real, &[Real], &ParamSet) -> Vec<Real>,
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn rhs(&self, t: Real, x: &[Real], params: &ParamSet) -> SimResult<Vec<Real>> {
        Ok((self.f)(t, x, params))
    }

    fn switch_times(&self, _params: &ParamSet) -> SimResult<Vec<Real>> {
        Ok(self.switch_times.clone())
    }
}

/// Evaluate the model and check the derivative length.
pub(crate) fn eval_rhs<M: OdeModel + ?Sized>(
    model: &M,
    t: Real,
    x: &[Real],
    params: &ParamSet,
) -> SimResult<Vec<Real>> {
    let dxdt = model.rhs(t, x, params)?;
    if dxdt.len() != x.len() {
        return Err(SimError::invalid(format!(
            "rhs returned {} derivatives for a state of length {}",
            dxdt.len(),
            x.len()
        )));
    }
    Ok(dxdt)
}

/// View of a model restricted to one schedule segment.
///
/// When the segment ends on a switch time `ts`, any evaluation at `t >= ts`
/// is taken at the left limit `ts.next_down()`, so every stage of a step
/// inside the segment sees the pre-switch formula.
pub(crate) struct SegmentView<'a, M: ?Sized> {
    pub inner: &'a M,
    pub ceiling: Option<Real>,
}

impl<M: OdeModel + ?Sized> OdeModel for SegmentView<'_, M> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn rhs(&self, t: Real, x: &[Real], params: &ParamSet) -> SimResult<Vec<Real>> {
        let t = match self.ceiling {
            Some(ts) if t >= ts => ts.next_down(),
            _ => t,
        };
        self.inner.rhs(t, x, params)
    }

    fn switch_times(&self, params: &ParamSet) -> SimResult<Vec<Real>> {
        self.inner.switch_times(params)
    }
}
