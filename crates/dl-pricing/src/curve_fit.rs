//! Discount curves fitted by least squares in yield space.
//!
//! Every routine regresses the market yields `-ln P_i / (t_i - t0)` on a
//! basis of yield shapes and returns the discount curve
//! `exp(-γ(t) (t - t0))` of the fitted yield `γ`, together with the
//! standard error of the discount curve and the fit record.

use dl_core::{ensure, errors::Result, Real, Time};
use dl_math::{shape1, Fit, FitParam, Function};

use crate::curve_interp::check_quotes;
use crate::term_structure::{yield_shape1, yield_shape2};

/// Output of a discount curve fit.
#[derive(Debug, Clone)]
pub struct FittedDiscount {
    /// Fitted discount curve on `[t0, ∞)`.
    pub discount: Function,
    /// Standard error of the fitted discount factor.
    pub err: Function,
    /// Coefficients, covariance and residual of the yield fit.
    pub param: FitParam,
}

/// Fit the yields of the quotes with the engine `fit`.
///
/// # Errors
/// Precondition failure on invalid quotes or non-positive discount
/// factors; failures of the fitting engine.
pub fn discount_yield_fit(
    times: &[Time],
    discount_factors: &[Real],
    initial_time: Time,
    fit: &mut Fit,
) -> Result<FittedDiscount> {
    check_quotes(times, discount_factors, initial_time)?;
    ensure!(
        discount_factors.iter().all(|&d| d > 0.0),
        "discount factors must be positive"
    );
    let yields: Vec<Real> = times
        .iter()
        .zip(discount_factors)
        .map(|(&t, &d)| -d.ln() / (t - initial_time))
        .collect();
    fit.assign(times, &yields)?;

    let elapsed = Function::from_lower(move |t| t - initial_time, initial_time);
    let discount = (-(fit.fit()? * &elapsed)).exp();
    let err = fit.err()? * &discount * &elapsed;
    let param = fit.param()?;
    tracing::debug!(
        quotes = times.len(),
        basis = fit.dim(),
        chi2 = param.chi2,
        "fitted discount curve"
    );
    Ok(FittedDiscount {
        discount,
        err,
        param,
    })
}

/// Fit with a constant yield.
///
/// # Errors
/// As [`discount_yield_fit`].
pub fn discount_const_yield_fit(
    times: &[Time],
    discount_factors: &[Real],
    initial_time: Time,
) -> Result<FittedDiscount> {
    let mut fit = Fit::linear(vec![Function::constant(1.0, initial_time)]);
    discount_yield_fit(times, discount_factors, initial_time, &mut fit)
}

/// Nelson–Siegel fit: yield `c0 + c1 shape1(λ(t - t0)) + c2 shape2(λ(t - t0))`.
///
/// # Errors
/// Precondition failure if `lambda <= 0` or there are fewer than three
/// quotes; otherwise as [`discount_yield_fit`].
pub fn discount_nelson_siegel_fit(
    times: &[Time],
    discount_factors: &[Real],
    lambda: Real,
    initial_time: Time,
) -> Result<FittedDiscount> {
    ensure!(lambda > 0.0, "Nelson-Siegel lambda must be positive, got {lambda}");
    let basis = vec![
        Function::constant(1.0, initial_time),
        yield_shape1(lambda, initial_time)?,
        yield_shape2(lambda, initial_time)?,
    ];
    discount_yield_fit(times, discount_factors, initial_time, &mut Fit::linear(basis))
}

/// Convexity term of the Vasicek yield at horizon `z`:
/// `-½ (σ/λ)² (1 - 2 shape1(λz) + shape1(2λz))`.
fn vasicek_h(lambda: Real, sigma: Real, z: Time) -> Result<Real> {
    let x = lambda * z;
    let r = sigma / lambda;
    Ok(-0.5 * r * r * (1.0 - 2.0 * shape1(x)? + shape1(2.0 * x)?))
}

/// Vasicek fit: for known mean-reversion `λ` and short-rate volatility `σ`
/// the yield is `r0 shape1 + θ (1 - shape1)/λ + h(t)` with the convexity
/// term `h` fixed and `r0`, `θ` fitted.
///
/// # Errors
/// Precondition failure if `lambda <= 0`, `sigma < 0`, or there are fewer
/// than two quotes; otherwise as [`discount_yield_fit`].
pub fn discount_vasicek_fit(
    times: &[Time],
    discount_factors: &[Real],
    lambda: Real,
    sigma: Real,
    initial_time: Time,
) -> Result<FittedDiscount> {
    ensure!(lambda > 0.0, "Vasicek lambda must be positive, got {lambda}");
    ensure!(sigma >= 0.0, "Vasicek sigma must be non-negative, got {sigma}");
    let level = yield_shape1(lambda, initial_time)?;
    let drift = (1.0 - &level) / lambda;
    let free = Function::from_lower(
        move |t| vasicek_h(lambda, sigma, t - initial_time).unwrap_or(Real::NAN),
        initial_time,
    );
    let mut fit = Fit::linear_with_free(vec![level, drift], free);
    discount_yield_fit(times, discount_factors, initial_time, &mut fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TIMES: [Time; 6] = [0.5, 1.0, 2.0, 3.0, 5.0, 7.0];

    fn quotes(yield_fn: impl Fn(Real) -> Real) -> Vec<Real> {
        TIMES.iter().map(|&t| (-yield_fn(t) * t).exp()).collect()
    }

    #[test]
    fn constant_yield_is_recovered() {
        let dfs = quotes(|_| 0.035);
        let fitted = discount_const_yield_fit(&TIMES, &dfs, 0.0).unwrap();
        assert_abs_diff_eq!(fitted.param.fit[0], 0.035, epsilon = 1e-12);
        assert_abs_diff_eq!(fitted.discount.value(4.0).unwrap(), (-0.14_f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(fitted.discount.value(0.0).unwrap(), 1.0);
        assert_abs_diff_eq!(fitted.err.value(4.0).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn nelson_siegel_reproduces_its_own_curve() {
        let lambda = 0.6;
        let curve = |t: Real| {
            0.04 - 0.01 * shape1(lambda * t).unwrap()
                + 0.02 * dl_math::shape2(lambda * t).unwrap()
        };
        let dfs = quotes(curve);
        let fitted = discount_nelson_siegel_fit(&TIMES, &dfs, lambda, 0.0).unwrap();
        let c = &fitted.param.fit;
        assert_abs_diff_eq!(c[0], 0.04, epsilon = 1e-9);
        assert_abs_diff_eq!(c[1], -0.01, epsilon = 1e-9);
        assert_abs_diff_eq!(c[2], 0.02, epsilon = 1e-9);
        assert_abs_diff_eq!(
            fitted.discount.value(4.0).unwrap(),
            (-curve(4.0) * 4.0).exp(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn vasicek_fit_recovers_short_rate_and_theta() {
        let (lambda, sigma, r0, theta) = (0.3, 0.01, 0.02, 0.015);
        let curve = |t: Real| {
            let s = shape1(lambda * t).unwrap();
            r0 * s + theta * (1.0 - s) / lambda + vasicek_h(lambda, sigma, t).unwrap()
        };
        let dfs = quotes(curve);
        let fitted = discount_vasicek_fit(&TIMES, &dfs, lambda, sigma, 0.0).unwrap();
        assert_abs_diff_eq!(fitted.param.fit[0], r0, epsilon = 1e-9);
        assert_abs_diff_eq!(fitted.param.fit[1], theta, epsilon = 1e-9);
    }

    #[test]
    fn invalid_parameters_rejected() {
        let dfs = quotes(|_| 0.03);
        assert!(discount_nelson_siegel_fit(&TIMES, &dfs, 0.0, 0.0).is_err());
        assert!(discount_vasicek_fit(&TIMES, &dfs, 0.2, -0.1, 0.0).is_err());
        assert!(discount_const_yield_fit(&TIMES, &dfs[..3], 0.0).is_err());
    }
}
