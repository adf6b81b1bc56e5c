//! # dl-methods
//!
//! The backward-induction core: event-time grids, payoff slices, the
//! lattice abstraction behind a model, and the model contracts consumed by
//! valuation routines.
//!
//! # Modules
//!
//! * [`grid`]: validated event-time grids
//! * [`lattice`]: [`Slice`], [`StateLattice`], [`TrinomialLattice`]
//! * [`model`]: [`Model`], [`AssetModel`], [`InterestRateModel`]

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Event-time grids.
pub mod grid;

/// Slices and lattices.
pub mod lattice;

/// Model contracts.
pub mod model;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use grid::EventGrid;
pub use lattice::{
    indicator, interpolate, Indicator, Slice, StateLattice, TrinomialLattice, TrinomialParams,
};
pub use model::{AssetModel, InterestRateModel, Model};
