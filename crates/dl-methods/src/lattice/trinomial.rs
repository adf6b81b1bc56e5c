//! Recombining trinomial lattice on a uniform state grid.
//!
//! The state `x` lives on the grid `x_k = k·dx`, `k = -K..=K`, identical at
//! every event time.  Between consecutive event times the interval is cut
//! into sub-steps of length `h <= max_step`; on each sub-step a node moves
//! to `k-1`, `k`, `k+1` with probabilities
//!
//! $$ p_d = p_u = \frac{\sigma^2 h}{2\,dx^2}, \qquad p_m = 1 - 2p_u, $$
//!
//! so that the increment has mean 0 and variance `σ² h`.  The spacing is
//! `dx = σ √(3·max_step)`, which keeps `p_u <= 1/6`.  Nodes at the edge of the
//! grid reflect onto themselves; the grid is wide enough (`std_devs`
//! standard deviations beyond the initial band at the last event time) for
//! this to be immaterial.
//!
//! Discounting is deterministic: a rollback over `(t_l, t_{l+1}]` multiplies
//! by `P(t_{l+1}) / P(t_l)`.

use dl_core::{ensure, errors::Result, Real, Time};
use dl_math::{Function, Interp, MultiFunction};

use super::StateLattice;
use crate::grid::EventGrid;

/// Shape of a [`TrinomialLattice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrinomialParams {
    /// Variance of the state per unit of time (`σ²`).
    pub variance: Real,
    /// Upper bound on the sub-step length.
    pub max_step: Time,
    /// Half-width `m` of the band of initial states (`2m + 1` nodes).
    pub band: usize,
    /// Standard deviations covered beyond the band at the last event time.
    pub std_devs: Real,
}

/// Symmetric trinomial lattice with deterministic discounting.
#[derive(Debug, Clone)]
pub struct TrinomialLattice {
    grid: EventGrid,
    dx: Real,
    half_width: usize,
    band: usize,
    /// number of sub-steps on each event interval
    substeps: Vec<usize>,
    /// up (= down) probability on each event interval
    probs: Vec<Real>,
    /// `P(t_{l+1}) / P(t_l)` on each event interval
    discounts: Vec<Real>,
    /// model state of the band nodes, strictly increasing
    initial_states: Vec<Real>,
}

impl TrinomialLattice {
    /// Build the lattice for `grid`.
    ///
    /// `discount` is the deterministic discount curve `P(t)`; `state` maps a
    /// grid offset `x` at the initial time to the model's state variable and
    /// must be strictly increasing.
    ///
    /// # Errors
    /// Precondition failure on non-positive variance, step or band, on event
    /// times outside the domain of `discount`, or on a non-increasing
    /// `state`.
    pub fn new<S>(
        grid: EventGrid,
        params: &TrinomialParams,
        discount: &Function,
        state: S,
    ) -> Result<Self>
    where
        S: Fn(Real) -> Real,
    {
        let TrinomialParams {
            variance,
            max_step,
            band,
            std_devs,
        } = *params;
        ensure!(variance > 0.0, "lattice variance must be positive, got {variance}");
        ensure!(max_step > 0.0, "lattice step must be positive, got {max_step}");
        ensure!(band > 0, "the band of initial states needs at least 3 nodes");
        ensure!(std_devs >= 0.0, "negative lattice width {std_devs}");

        let dx = (3.0 * variance * max_step).sqrt();
        let horizon = grid.time(grid.last_index()) - grid.time(0);
        let spread = (std_devs * (variance * horizon).sqrt() / dx).ceil() as usize;
        let half_width = band + spread + 1;

        let mut substeps = Vec::with_capacity(grid.len() - 1);
        let mut probs = Vec::with_capacity(grid.len() - 1);
        let mut discounts = Vec::with_capacity(grid.len() - 1);
        let mut p_prev = discount.value(grid.time(0))?;
        for w in grid.times().windows(2) {
            let interval = w[1] - w[0];
            let n = (interval / max_step).ceil().max(1.0) as usize;
            let h = interval / n as Real;
            substeps.push(n);
            probs.push(variance * h / (2.0 * dx * dx));
            let p_next = discount.value(w[1])?;
            discounts.push(p_next / p_prev);
            p_prev = p_next;
        }

        let initial_states: Vec<Real> = (-(band as i64)..=band as i64)
            .map(|k| state(k as Real * dx))
            .collect();
        ensure!(
            initial_states.windows(2).all(|w| w[0] < w[1]),
            "initial states must be strictly increasing"
        );

        tracing::debug!(
            events = grid.len(),
            nodes = 2 * half_width + 1,
            dx,
            substeps = substeps.iter().sum::<usize>(),
            "built trinomial lattice"
        );

        Ok(Self {
            grid,
            dx,
            half_width,
            band,
            substeps,
            probs,
            discounts,
            initial_states,
        })
    }

    /// Spacing of the state grid.
    pub fn dx(&self) -> Real {
        self.dx
    }

    /// Number of nodes (`2K + 1`), the same at every event time.
    pub fn nodes(&self) -> usize {
        2 * self.half_width + 1
    }

    /// Grid value `x` of node `n`.
    pub fn x(&self, n: usize) -> Real {
        (n as Real - self.half_width as Real) * self.dx
    }

    /// `ln E[e^{X(t_i) - X(t_0)}]` for the lattice walk, summed over the
    /// sub-steps up to event index `i`.
    ///
    /// Subtracting it from `x` turns `e^x` into a lattice martingale.
    pub fn log_growth(&self, i: usize) -> Real {
        let cosh = self.dx.cosh();
        (0..i)
            .map(|l| self.substeps[l] as Real * (1.0 + 2.0 * self.probs[l] * (cosh - 1.0)).ln())
            .sum()
    }

    fn expectation_step(&self, values: &[Real], out: &mut [Real], p: Real) {
        let last = values.len() - 1;
        for n in 0..=last {
            let down = values[n.saturating_sub(1)];
            let up = values[(n + 1).min(last)];
            out[n] = p * (down + up) + (1.0 - 2.0 * p) * values[n];
        }
    }
}

impl StateLattice for TrinomialLattice {
    fn grid(&self) -> &EventGrid {
        &self.grid
    }

    fn size(&self, _i: usize) -> usize {
        self.nodes()
    }

    fn origin(&self) -> usize {
        self.half_width
    }

    fn initial_state(&self) -> Vec<Real> {
        vec![self.initial_states[self.band]]
    }

    fn rollback(&self, mut values: Vec<Real>, from: usize, to: usize) -> Vec<Real> {
        let mut scratch = vec![0.0; values.len()];
        for l in (to..from).rev() {
            for _ in 0..self.substeps[l] {
                self.expectation_step(&values, &mut scratch, self.probs[l]);
                std::mem::swap(&mut values, &mut scratch);
            }
            let d = self.discounts[l];
            values.iter_mut().for_each(|v| *v *= d);
        }
        values
    }

    fn interpolate(&self, values: &[Real]) -> Result<MultiFunction> {
        let lo = self.half_width - self.band;
        let hi = self.half_width + self.band;
        let mut interp = Interp::cubic();
        interp.assign(&self.initial_states, &values[lo..=hi])?;
        Ok(MultiFunction::from_function(interp.interp()?))
    }
}
