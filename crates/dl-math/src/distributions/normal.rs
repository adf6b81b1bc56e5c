//! Standard normal distribution, backed by `statrs`.

use dl_core::Real;
use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution function Φ(x).
///
/// Computed as `erfc(-x/√2)/2`, accurate to machine precision in both tails.
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x / SQRT_2)
}
