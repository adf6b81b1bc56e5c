//! # dl-math
//!
//! Real functions with explicit domains and the numerical backends that
//! produce them: interpolation, least-squares fitting, root finding, the
//! standard normal distribution and the exponential shape functions.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Linear least-squares fitting.
pub mod fit;

/// Scalar functions with a domain.
pub mod function;

/// 1D interpolation schemes.
pub mod interpolations;

/// Functions of a vector state.
pub mod multi_function;

/// Exponential shape functions.
pub mod shapes;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_pdf};
pub use fit::{Fit, FitParam};
pub use function::{Function, ScalarFn};
pub use interpolations::{Interp, InterpScheme};
pub use multi_function::MultiFunction;
pub use shapes::{shape1, shape2};
pub use solvers1d::{Root, RootConfig, RootD, StopRule};
