//! Curves derived from market data in closed form.

use std::rc::Rc;

use dl_core::{ensure, errors::Result, Real, Settings, Time};
use dl_math::{shape1, shape2, Function, RootD, ScalarFn};

/// Continuously compounded yield of a discount curve.
///
/// Close to the initial time the yield is the 0/0 limit, approximated by
/// the one-sided difference over the settings epsilon.
struct Yield {
    discount: Function,
    initial_time: Time,
}

impl ScalarFn for Yield {
    fn value(&self, t: Real) -> Real {
        let eps = Settings::instance().epsilon();
        let p = |x: Real| self.discount.value(x).unwrap_or(Real::NAN);
        if t < self.initial_time + eps {
            (1.0 - p(self.initial_time + eps)) / eps
        } else {
            -p(t).ln() / (t - self.initial_time)
        }
    }

    fn belongs(&self, t: Real) -> bool {
        self.discount.belongs(t)
    }
}

/// Yield curve `γ(t) = -ln P(t) / (t - t0)` of the discount curve `P`,
/// defined wherever `P` is.
pub fn yield_curve(discount: &Function, initial_time: Time) -> Function {
    Function::from_impl(Rc::new(Yield {
        discount: discount.clone(),
        initial_time,
    }))
}

fn shape_curve(shape: fn(Real) -> Result<Real>, lambda: Real, initial_time: Time) -> Result<Function> {
    ensure!(lambda >= 0.0, "mean-reversion rate must be non-negative, got {lambda}");
    Ok(Function::from_lower(
        move |t| shape(lambda * (t - initial_time)).unwrap_or(Real::NAN),
        initial_time,
    ))
}

/// `t ↦ shape1(λ (t - t0))` on `[t0, ∞)`: the yield of a Vasicek or
/// Nelson–Siegel level factor.
///
/// # Errors
/// Precondition failure if `lambda < 0`.
pub fn yield_shape1(lambda: Real, initial_time: Time) -> Result<Function> {
    shape_curve(shape1, lambda, initial_time)
}

/// `t ↦ shape2(λ (t - t0))` on `[t0, ∞)`: the Nelson–Siegel hump factor.
///
/// # Errors
/// Precondition failure if `lambda < 0`.
pub fn yield_shape2(lambda: Real, initial_time: Time) -> Result<Function> {
    shape_curve(shape2, lambda, initial_time)
}

/// Forward exchange rate `spot · P_for(t) / P_dom(t)` (price of one unit of
/// foreign currency in domestic currency).
pub fn forward_fx(spot: Real, domestic: &Function, foreign: &Function) -> Function {
    spot * foreign / domestic
}

/// Forward price of a coupon bond as a function of the delivery time
/// `t ∈ [t0, maturity]`.
///
/// The bond pays `rate · period` at `maturity, maturity - period, …` and
/// the notional 1 at maturity; coupons paid at or before `t` are excluded.
/// With `clean` the accrued interest `rate · (t - last coupon)` is
/// subtracted.
///
/// # Errors
/// Precondition failure unless `maturity > initial_time`, `period > 0` and
/// `rate >= 0`.
pub fn forward_coupon_bond(
    rate: Real,
    period: Time,
    maturity: Time,
    discount: &Function,
    initial_time: Time,
    clean: bool,
) -> Result<Function> {
    ensure!(maturity > initial_time, "bond maturity {maturity} must be after {initial_time}");
    ensure!(period > 0.0, "coupon period must be positive, got {period}");
    ensure!(rate >= 0.0, "coupon rate must be non-negative, got {rate}");
    let discount = discount.clone();
    Ok(Function::on(
        move |t| {
            let p = |x: Real| discount.value(x).unwrap_or(Real::NAN);
            let mut pay = maturity;
            let mut sum = 0.0;
            while pay > t {
                sum += p(pay);
                pay -= period;
            }
            let mut price = (rate * period * sum + p(maturity)) / p(t);
            if clean {
                price -= rate * (t - pay);
            }
            price
        },
        initial_time,
        maturity,
    ))
}

/// Price at `initial_time` of a coupon bond (notional 1) from a flat
/// continuously compounded yield to maturity `ytm`.
///
/// # Errors
/// Precondition failure unless `maturity >= initial_time` and `period > 0`.
pub fn coupon_bond(
    rate: Real,
    period: Time,
    maturity: Time,
    ytm: Real,
    initial_time: Time,
    clean: bool,
) -> Result<Real> {
    ensure!(maturity >= initial_time, "bond maturity {maturity} precedes {initial_time}");
    ensure!(period > 0.0, "coupon period must be positive, got {period}");
    let (price, _, accrued) = bond_terms(rate, period, maturity - initial_time, ytm);
    Ok(if clean { price - accrued } else { price })
}

/// `-∂/∂y` of the dirty [`coupon_bond`] price: the time-weighted present
/// value of the bond's payments.
///
/// # Errors
/// As [`coupon_bond`].
pub fn duration_coupon_bond(
    rate: Real,
    period: Time,
    maturity: Time,
    ytm: Real,
    initial_time: Time,
) -> Result<Real> {
    ensure!(maturity >= initial_time, "bond maturity {maturity} precedes {initial_time}");
    ensure!(period > 0.0, "coupon period must be positive, got {period}");
    Ok(bond_terms(rate, period, maturity - initial_time, ytm).1)
}

/// Yield to maturity: the flat continuously compounded yield at which the
/// dirty [`coupon_bond`] price equals `price`, polished from `ytm0` by
/// `solver`.
///
/// # Errors
/// Precondition failure on invalid bond terms or a non-positive price;
/// the solver's convergence errors.
pub fn yield_to_maturity(
    rate: Real,
    period: Time,
    maturity: Time,
    initial_time: Time,
    price: Real,
    ytm0: Real,
    solver: &RootD,
) -> Result<Real> {
    ensure!(maturity > initial_time, "bond maturity {maturity} must be after {initial_time}");
    ensure!(period > 0.0, "coupon period must be positive, got {period}");
    ensure!(price > 0.0, "bond price must be positive, got {price}");
    let horizon = maturity - initial_time;
    let f = Function::new(move |y| bond_terms(rate, period, horizon, y).0 - price);
    let df = Function::new(move |y| -bond_terms(rate, period, horizon, y).1);
    let ytm = solver.find(&f, &df, ytm0)?;
    tracing::debug!(rate, maturity, price, ytm, "yield to maturity");
    Ok(ytm)
}

// (dirty price, Σ τ·PV, accrued interest) for payments at τ = T, T - δ, …
fn bond_terms(rate: Real, period: Time, horizon: Time, ytm: Real) -> (Real, Real, Real) {
    let coupon = rate * period;
    let mut tau = horizon;
    let mut price = (-ytm * tau).exp();
    let mut duration = tau * price;
    while tau > 0.0 {
        let pv = coupon * (-ytm * tau).exp();
        price += pv;
        duration += tau * pv;
        tau -= period;
    }
    // tau is now the (non-positive) offset of the last coupon before t0
    (price, duration, -rate * tau)
}
