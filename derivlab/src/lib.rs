//! # derivlab
//!
//! Backward-induction valuation of derivatives on event-time lattices.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `dl-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use derivlab::math::Function;
//! use derivlab::models::{BlackConfig, BlackModel};
//! use derivlab::pricing::american_put;
//!
//! let discount = Function::from_lower(|t| (-0.05 * t).exp(), 0.0);
//! let forward = Function::from_lower(|t| 100.0 * (0.05 * t).exp(), 0.0);
//! let mut model =
//!     BlackModel::new(100.0, discount, forward, 0.2, 0.0, BlackConfig::default()).unwrap();
//! let price = american_put(100.0, &[0.25, 0.5, 0.75, 1.0], &mut model).unwrap();
//! assert!(price.value(&[100.0]).unwrap() > 0.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, errors and numeric settings.
pub use dl_core as core;

/// Functions with domains, interpolation, fitting, root finding.
pub use dl_math as math;

/// Event grids, slices, lattices and the model contracts.
pub use dl_methods as methods;

/// Black and deterministic-rate models.
pub use dl_models as models;

/// Black formulas, curve construction and lattice valuation routines.
pub use dl_pricing as pricing;
