//! Interest-rate model without randomness.
//!
//! The state is a parallel shift `s` of the continuously compounded yield of
//! a given discount curve `P(t)`:
//!
//! ```text
//! P_s(t) = P(t) · exp(−s (t − t0))
//! ```
//!
//! The shift never moves, so a rollback over `(t_j, t_i]` is plain
//! discounting by `P_s(t_i) / P_s(t_j)` on each state.  The model exists as
//! the closed-form reference for the lattice machinery and for fixed-income
//! routines whose value is known without a volatility assumption (swaps,
//! bonds).

use std::rc::Rc;

use dl_core::{
    ensure,
    errors::{Error, Result},
    Real, Time,
};
use dl_math::{Function, Interp, MultiFunction};
use dl_methods::{EventGrid, InterestRateModel, Model, Slice, StateLattice};

/// Shift states of a [`DeterministicRateModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeterministicRateConfig {
    /// Half-width `m`: the shifts are `k·shift` for `k = -m..=m`.
    pub states: usize,
    /// Distance between neighbouring shifts.
    pub shift: Real,
}

impl Default for DeterministicRateConfig {
    fn default() -> Self {
        Self {
            states: 10,
            shift: 0.001,
        }
    }
}

#[derive(Debug)]
struct ShiftLattice {
    grid: EventGrid,
    shifts: Vec<Real>,
    /// base curve `P(t_i)` at the event times
    curve: Vec<Real>,
}

impl ShiftLattice {
    fn factor(&self, k: usize, from: usize, to: usize) -> Real {
        let (ti, tj) = (self.grid.time(from), self.grid.time(to));
        self.curve[from] / self.curve[to] * (-self.shifts[k] * (ti - tj)).exp()
    }
}

impl StateLattice for ShiftLattice {
    fn grid(&self) -> &EventGrid {
        &self.grid
    }

    fn size(&self, _i: usize) -> usize {
        self.shifts.len()
    }

    fn origin(&self) -> usize {
        self.shifts.len() / 2
    }

    fn initial_state(&self) -> Vec<Real> {
        vec![0.0]
    }

    fn rollback(&self, mut values: Vec<Real>, from: usize, to: usize) -> Vec<Real> {
        for (k, v) in values.iter_mut().enumerate() {
            *v *= self.factor(k, from, to);
        }
        values
    }

    fn interpolate(&self, values: &[Real]) -> Result<MultiFunction> {
        let mut interp = Interp::cubic();
        interp.assign(&self.shifts, values)?;
        Ok(MultiFunction::from_function(interp.interp()?))
    }
}

/// Deterministic interest-rate model over a band of yield shifts.
#[derive(Debug, Clone)]
pub struct DeterministicRateModel {
    discount: Function,
    initial_time: Time,
    config: DeterministicRateConfig,
    lattice: Option<Rc<ShiftLattice>>,
}

impl DeterministicRateModel {
    /// Create the model from the discount curve `P(t)`.
    ///
    /// # Errors
    /// Precondition failure if the curve is not defined at `initial_time`,
    /// or the configuration has no shift states or a non-positive shift.
    pub fn new(
        discount: Function,
        initial_time: Time,
        config: DeterministicRateConfig,
    ) -> Result<Self> {
        ensure!(
            discount.belongs(initial_time),
            "the discount curve must be defined at the initial time {initial_time}"
        );
        ensure!(config.states > 0, "at least one shift on each side is required");
        ensure!(config.shift > 0.0, "the shift step must be positive, got {}", config.shift);
        Ok(Self {
            discount,
            initial_time,
            config,
            lattice: None,
        })
    }

    fn session(&self) -> Result<&Rc<ShiftLattice>> {
        self.lattice.as_ref().ok_or_else(|| {
            Error::Precondition("no event times assigned to the deterministic rate model".to_string())
        })
    }
}

impl Model for DeterministicRateModel {
    fn initial_time(&self) -> Time {
        self.initial_time
    }

    fn assign_event_times(&mut self, times: &[Time]) -> Result<()> {
        let grid = EventGrid::new(self.initial_time, times)?;
        let curve = times
            .iter()
            .map(|&t| self.discount.value(t))
            .collect::<Result<Vec<_>>>()?;
        let m = self.config.states as i64;
        let shifts = (-m..=m).map(|k| k as Real * self.config.shift).collect();
        tracing::debug!(events = times.len(), "deterministic rate model event times assigned");
        self.lattice = Some(Rc::new(ShiftLattice {
            grid,
            shifts,
            curve,
        }));
        Ok(())
    }

    fn event_times(&self) -> Result<&[Time]> {
        Ok(self.session()?.grid.times())
    }

    fn cash(&self, i: usize, amount: Real) -> Result<Slice> {
        let lattice = self.session()?;
        Slice::constant(Rc::clone(lattice) as Rc<dyn StateLattice>, i, amount)
    }

    fn discount(&self, i: usize, maturity: Time) -> Result<Slice> {
        let lattice = self.session()?;
        lattice.grid.check_index(i)?;
        let t = lattice.grid.time(i);
        ensure!(maturity >= t, "maturity {maturity} precedes the event time {t}");
        let base = self.discount.value(maturity)? / lattice.curve[i];
        let values = lattice
            .shifts
            .iter()
            .map(|s| base * (-s * (maturity - t)).exp())
            .collect();
        Slice::new(Rc::clone(lattice) as Rc<dyn StateLattice>, i, values)
    }
}

impl InterestRateModel for DeterministicRateModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> DeterministicRateModel {
        let discount = Function::from_lower(|t| (-0.04 * t).exp(), 0.0);
        DeterministicRateModel::new(discount, 0.0, DeterministicRateConfig::default()).unwrap()
    }

    #[test]
    fn discount_matches_shifted_curve() {
        let mut m = model();
        m.assign_event_times(&[0.0, 1.0]).unwrap();
        let d = m.discount(1, 3.0).unwrap();
        let origin = d.lattice().origin();
        assert_abs_diff_eq!(d.values()[origin], (-0.08_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(d.values()[origin + 1], (-0.082_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn rolled_back_bond_equals_initial_bond() {
        let mut m = model();
        m.assign_event_times(&[0.0, 0.5, 2.0]).unwrap();
        let rolled = m.discount(2, 5.0).unwrap().rolled_back(0).unwrap();
        let direct = m.discount(0, 5.0).unwrap();
        for (a, b) in rolled.values().iter().zip(direct.values()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-14);
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let discount = Function::from_lower(|_| 1.0, 0.0);
        let cfg = DeterministicRateConfig {
            states: 0,
            shift: 0.001,
        };
        assert!(DeterministicRateModel::new(discount.clone(), 0.0, cfg).is_err());
        assert!(DeterministicRateModel::new(discount, -1.0, Default::default()).is_err());
    }
}
