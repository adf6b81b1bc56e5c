//! The contract a stochastic model offers to valuation routines.
//!
//! A model owns one event-time assignment at a time (a *session*).  Every
//! call to [`Model::assign_event_times`] starts a new session; slices created
//! before it keep referring to the old one and cannot be mixed with slices of
//! the new one.

use dl_core::{errors::Result, Real, Time};

use crate::lattice::Slice;

/// Operations shared by asset and interest-rate models.
pub trait Model {
    /// The valuation time `t_0`.
    fn initial_time(&self) -> Time;

    /// Fix the event-time grid of the next valuation.
    ///
    /// # Errors
    /// Precondition failure if `times` is empty, does not start at
    /// [`initial_time`](Self::initial_time), or is not strictly increasing.
    fn assign_event_times(&mut self, times: &[Time]) -> Result<()>;

    /// The currently assigned event times.
    ///
    /// # Errors
    /// Precondition failure if no event times have been assigned.
    fn event_times(&self) -> Result<&[Time]>;

    /// Deterministic amount `amount` at event index `i`.
    ///
    /// # Errors
    /// Precondition failure if no grid is assigned or `i` is out of range.
    fn cash(&self, i: usize, amount: Real) -> Result<Slice>;

    /// Price at event index `i` of a zero-coupon bond maturing at
    /// `maturity >= t_i`.
    ///
    /// # Errors
    /// Precondition failure if no grid is assigned, `i` is out of range, or
    /// `maturity < t_i`.
    fn discount(&self, i: usize, maturity: Time) -> Result<Slice>;
}

/// A model with a traded underlying asset.
pub trait AssetModel: Model {
    /// Spot price at event index `i`.
    ///
    /// # Errors
    /// Precondition failure if no grid is assigned or `i` is out of range.
    fn spot(&self, i: usize) -> Result<Slice>;

    /// Forward price at event index `i` for delivery at `maturity >= t_i`.
    ///
    /// # Errors
    /// Precondition failure if no grid is assigned, `i` is out of range, or
    /// `maturity < t_i`.
    fn forward(&self, i: usize, maturity: Time) -> Result<Slice>;
}

/// A model of the term structure of interest rates.
pub trait InterestRateModel: Model {
    /// Simple (float) rate at event index `i` for the period
    /// `[t_i, t_i + period]`: `(1 / P(t_i, t_i + period) - 1) / period`.
    ///
    /// # Errors
    /// Precondition failure if no grid is assigned, `i` is out of range, or
    /// `period <= 0`.
    fn rate(&self, i: usize, period: Time) -> Result<Slice> {
        dl_core::ensure!(period > 0.0, "rate period must be positive, got {period}");
        let times = self.event_times()?;
        dl_core::ensure!(i < times.len(), "event index {i} is out of range");
        let start = times[i];
        let bond = self.discount(i, start + period)?;
        Ok((1.0 / bond - 1.0) / period)
    }
}
