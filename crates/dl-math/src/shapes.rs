//! Shape functions of exponential-decay yield curves.
//!
//! Both functions have a removable 0/0 singularity at `x = 0`.  Below the
//! global [`Settings`] epsilon they switch to their Taylor expansions, so the
//! branch is the same for every caller.

use dl_core::{ensure, errors::Result, Real, Settings};

/// `(1 - e^{-x}) / x`, with value 1 at `x = 0`.
///
/// # Errors
/// Precondition failure if `x < 0`.
pub fn shape1(x: Real) -> Result<Real> {
    ensure!(x >= 0.0, "shape1 requires a non-negative argument, got {x}");
    let y = if x > Settings::instance().epsilon() {
        -(-x).exp_m1() / x
    } else {
        1.0 - x / 2.0 + x * x / 6.0 - x * x * x / 24.0
    };
    Ok(y)
}

/// `(1 - e^{-x}(1 + x)) / x`, with value 0 at `x = 0`.
///
/// # Errors
/// Precondition failure if `x < 0`.
pub fn shape2(x: Real) -> Result<Real> {
    ensure!(x >= 0.0, "shape2 requires a non-negative argument, got {x}");
    // shape2 = shape1 - e^{-x}; both terms are accurate, unlike 1 - e^{-x}(1 + x)
    let y = if x > Settings::instance().epsilon() {
        -(-x).exp_m1() / x - (-x).exp()
    } else {
        x / 2.0 - x * x / 3.0 + x * x * x / 8.0
    };
    Ok(y)
}
