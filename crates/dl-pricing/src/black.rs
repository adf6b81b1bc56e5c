//! Black formulas on forward prices and implied volatility.
//!
//! A European call with strike `K` and maturity `T` on an asset with
//! forward price `F` is worth
//!
//! $$C = DF\,\big(F N(d_1) - K N(d_2)\big), \qquad
//!   d_{1,2} = \frac{\ln(F/K)}{\sigma\sqrt T} \pm \frac{\sigma\sqrt T}{2}$$
//!
//! where `DF` is the discount factor for `T` and `σ` the Black volatility.

use dl_core::{ensure, errors::Result, Real, Time, Volatility};
use dl_math::{normal_cdf, normal_pdf, Function, Root, RootD};

use crate::data::OptionQuote;

fn d1(strike: Real, maturity: Time, forward: Real, sigma: Volatility) -> (Real, Real) {
    let std_dev = sigma * maturity.sqrt();
    let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
    (d1, d1 - std_dev)
}

fn raw_call(strike: Real, maturity: Time, discount: Real, forward: Real, sigma: Volatility) -> Real {
    let (d1, d2) = d1(strike, maturity, forward, sigma);
    discount * (forward * normal_cdf(d1) - strike * normal_cdf(d2))
}

fn raw_vega(strike: Real, maturity: Time, discount: Real, forward: Real, sigma: Volatility) -> Real {
    let (d1, _) = d1(strike, maturity, forward, sigma);
    discount * forward * maturity.sqrt() * normal_pdf(d1)
}

fn check_inputs(
    strike: Real,
    maturity: Time,
    discount: Real,
    forward: Real,
    sigma: Volatility,
) -> Result<()> {
    ensure!(
        strike > 0.0 && maturity > 0.0 && discount > 0.0 && forward > 0.0 && sigma > 0.0,
        "Black inputs must be positive: K = {strike}, T = {maturity}, DF = {discount}, F = {forward}, σ = {sigma}"
    );
    Ok(())
}

/// Black price of a European call.
///
/// # Errors
/// Precondition failure unless every argument is strictly positive.
pub fn call_black(
    strike: Real,
    maturity: Time,
    discount: Real,
    forward: Real,
    sigma: Volatility,
) -> Result<Real> {
    check_inputs(strike, maturity, discount, forward, sigma)?;
    Ok(raw_call(strike, maturity, discount, forward, sigma))
}

/// Black price of a European put, from put-call parity
/// `P = C - DF (F - K)`.
///
/// # Errors
/// Precondition failure unless every argument is strictly positive.
pub fn put_black(
    strike: Real,
    maturity: Time,
    discount: Real,
    forward: Real,
    sigma: Volatility,
) -> Result<Real> {
    let call = call_black(strike, maturity, discount, forward, sigma)?;
    Ok(call - discount * (forward - strike))
}

/// Derivative of [`call_black`] with respect to the volatility:
/// `DF · F · √T · φ(d1)`.
///
/// # Errors
/// Precondition failure unless every argument is strictly positive.
pub fn call_vega_black(
    strike: Real,
    maturity: Time,
    discount: Real,
    forward: Real,
    sigma: Volatility,
) -> Result<Real> {
    check_inputs(strike, maturity, discount, forward, sigma)?;
    Ok(raw_vega(strike, maturity, discount, forward, sigma))
}

/// Implied Black volatility of a call price, polished from `sigma0` with
/// the derivative solver `solver` (vega is the derivative).
///
/// # Errors
/// Precondition failure on non-positive inputs; the solver's convergence
/// and domain errors (the volatility must stay positive).
pub fn call_impl_vol_black(
    strike: Real,
    maturity: Time,
    discount: Real,
    forward: Real,
    price: Real,
    sigma0: Volatility,
    solver: &RootD,
) -> Result<Volatility> {
    check_inputs(strike, maturity, discount, forward, sigma0)?;
    ensure!(price > 0.0, "call price must be positive, got {price}");
    let positive = |s: Real| s > 0.0;
    let f = Function::with_domain(
        move |s| raw_call(strike, maturity, discount, forward, s) - price,
        positive,
    );
    let df = Function::with_domain(
        move |s| raw_vega(strike, maturity, discount, forward, s),
        positive,
    );
    let sigma = solver.find(&f, &df, sigma0)?;
    tracing::debug!(strike, maturity, price, sigma, "call implied volatility");
    Ok(sigma)
}

/// Common implied volatility of a portfolio of calls.
///
/// Finds `σ ∈ [sigma0, sigma1]` such that
/// `Σ number · call_black(K, T - t0, P(T), F(T), σ) = price`, where `P` is
/// the discount curve and `F` the forward curve.
///
/// # Errors
/// Precondition failure if a maturity is not after `initial_time`, if
/// `sigma0 >= sigma1` or `sigma0 <= 0`, if a curve is undefined at a
/// maturity, or if the bracket does not contain a root.
#[allow(clippy::too_many_arguments)]
pub fn calls_impl_vol(
    calls: &[OptionQuote],
    price: Real,
    discount: &Function,
    forward: &Function,
    initial_time: Time,
    sigma0: Volatility,
    sigma1: Volatility,
    root: &Root,
) -> Result<Volatility> {
    ensure!(!calls.is_empty(), "no calls in the portfolio");
    ensure!(
        calls.iter().all(|c| c.maturity > initial_time),
        "every maturity must be after the initial time {initial_time}"
    );
    ensure!(
        0.0 < sigma0 && sigma0 < sigma1,
        "invalid volatility bracket [{sigma0}, {sigma1}]"
    );

    // (number, strike, T - t0, P(T), F(T)) per call, fixed for the search
    let legs = calls
        .iter()
        .map(|c| {
            let (df, fwd) = (discount.value(c.maturity)?, forward.value(c.maturity)?);
            check_inputs(c.strike, c.maturity - initial_time, df, fwd, sigma0)?;
            Ok((c.number, c.strike, c.maturity - initial_time, df, fwd))
        })
        .collect::<Result<Vec<_>>>()?;

    let diff = Function::on(
        move |s| {
            legs.iter()
                .map(|&(n, k, t, df, fwd)| n * raw_call(k, t, df, fwd, s))
                .sum::<Real>()
                - price
        },
        sigma0,
        sigma1,
    );
    root.find(&diff, sigma0, sigma1)
}
