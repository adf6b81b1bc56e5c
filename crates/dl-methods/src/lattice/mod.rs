//! Lattice methods for backward induction.
//!
//! # Overview
//!
//! * [`StateLattice`]: the discretisation a model supplies (node counts,
//!   conditional-expectation rollback, interpolation of initial values)
//! * [`Slice`]: a payoff at one event time, tagged with its grid index and
//!   the lattice it lives on
//! * [`TrinomialLattice`]: a recombining trinomial lattice on a uniform state
//!   grid with deterministic discounting
//! * [`indicator`] / [`interpolate`]: barrier indicators and the conversion of
//!   a rolled-back slice into a price function
//!
//! Every valuation follows the same loop: fix an event grid, build a terminal
//! slice, then alternate payoff adjustments with [`Slice::rollback`] until the
//! slice reaches index 0.

pub mod slice;
pub mod trinomial;

use std::fmt;

use dl_core::{errors::Result, Real};
use dl_math::MultiFunction;

use crate::grid::EventGrid;

pub use slice::{indicator, interpolate, Indicator, Slice};
pub use trinomial::{TrinomialLattice, TrinomialParams};

/// The state-space discretisation behind a model session.
///
/// A lattice is bound to one [`EventGrid`]; assigning new event times to a
/// model produces a new lattice, so slices of different assignments can be
/// told apart.
pub trait StateLattice: fmt::Debug {
    /// The event-time grid this lattice was built on.
    fn grid(&self) -> &EventGrid;

    /// Number of state nodes at event index `i`.
    fn size(&self, i: usize) -> usize;

    /// Node index, at event index 0, of the model's recorded initial state.
    fn origin(&self) -> usize;

    /// The model's recorded initial state vector.
    fn initial_state(&self) -> Vec<Real>;

    /// Conditional expectation of `values` (given at event index `from`)
    /// at event index `to < from`, discounted from `t_from` to `t_to`.
    ///
    /// Callers guarantee `to < from` and `values.len() == self.size(from)`.
    fn rollback(&self, values: Vec<Real>, from: usize, to: usize) -> Vec<Real>;

    /// Price as a function of the initial state, from the node values at
    /// event index 0.
    ///
    /// # Errors
    /// Propagates failures of the interpolation backend.
    fn interpolate(&self, values: &[Real]) -> Result<MultiFunction>;
}
