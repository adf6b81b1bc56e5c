//! Lattice valuation of interest-rate contracts.

use dl_core::{ensure, errors::Result, Rate, Time};
use dl_math::MultiFunction;
use dl_methods::{indicator, interpolate, InterestRateModel, Slice};

use crate::data::{CashFlow, Swap};

fn check_cash_flow(flow: &CashFlow) -> Result<()> {
    ensure!(flow.period > 0.0, "payment period must be positive, got {}", flow.period);
    ensure!(flow.number_of_payments > 0, "at least one payment is required");
    Ok(())
}

/// Value at event index `i` of the fixed leg of `flow` issued at `t_i`,
/// including the notional repaid with the last coupon.
fn coupon_bond<M: InterestRateModel + ?Sized>(i: usize, flow: &CashFlow, model: &M) -> Result<Slice> {
    let start = model.event_times()?[i];
    let mut annuity = model.cash(i, 0.0)?;
    let mut pay = start;
    for _ in 0..flow.number_of_payments {
        pay += flow.period;
        annuity += model.discount(i, pay)?;
    }
    let bond = annuity * (flow.rate * flow.period) + model.discount(i, pay)?;
    Ok(bond * flow.notional)
}

/// Value at event index `i` of `swap` issued at `t_i`.
///
/// Receiving fixed is worth the fixed-leg coupon bond minus the notional
/// (the value of the float leg at issue).
///
/// # Errors
/// Precondition failure on a non-positive period or no payments, or an
/// index outside the assigned event times.
pub fn swap_value<M: InterestRateModel + ?Sized>(i: usize, swap: &Swap, model: &M) -> Result<Slice> {
    check_cash_flow(&swap.cash_flow)?;
    ensure!(
        i < model.event_times()?.len(),
        "event index {i} is out of range"
    );
    let receive_fixed = coupon_bond(i, &swap.cash_flow, model)? - swap.cash_flow.notional;
    Ok(if swap.pay_float { receive_fixed } else { -receive_fixed })
}

/// Interest-rate swap issued at the initial time.
///
/// # Errors
/// As [`swap_value`].
pub fn swap<M: InterestRateModel + ?Sized>(swap: &Swap, model: &mut M) -> Result<MultiFunction> {
    model.assign_event_times(&[model.initial_time()])?;
    interpolate(&swap_value(0, swap, &*model)?)
}

/// European swaption: the right to enter `swap` at `maturity`.
///
/// # Errors
/// Precondition failure if `maturity` is not after the initial time, or as
/// [`swap_value`].
pub fn swaption<M: InterestRateModel + ?Sized>(
    swap: &Swap,
    maturity: Time,
    model: &mut M,
) -> Result<MultiFunction> {
    let t0 = model.initial_time();
    ensure!(maturity > t0, "swaption maturity {maturity} must be after {t0}");
    model.assign_event_times(&[t0, maturity])?;
    let mut option = swap_value(1, swap, &*model)?.max_scalar(0.0);
    option.rollback(0)?;
    interpolate(&option)
}

/// Futures price on the float rate.
///
/// The futures is marked to market at `M = futures_times` equally spaced
/// times `t0 + k(T - t0)/M` and settles at `maturity = T` for
/// `1 - L(T, T + rate_period)`, where `L` is the simple float rate.
///
/// # Errors
/// Precondition failure if `maturity` is not after the initial time,
/// `futures_times == 0` or `rate_period <= 0`.
pub fn futures_on_rate<M: InterestRateModel + ?Sized>(
    rate_period: Time,
    futures_times: usize,
    maturity: Time,
    model: &mut M,
) -> Result<MultiFunction> {
    let t0 = model.initial_time();
    ensure!(maturity > t0, "futures maturity {maturity} must be after {t0}");
    ensure!(futures_times > 0, "at least one futures time is required");
    let step = (maturity - t0) / futures_times as Time;
    let mut times: Vec<Time> = (0..=futures_times).map(|k| t0 + k as Time * step).collect();
    times[futures_times] = maturity;
    model.assign_event_times(&times)?;

    let mut i = futures_times;
    let mut futures = 1.0 - model.rate(i, rate_period)?;
    while i > 0 {
        i -= 1;
        futures.rollback(i)?;
        // marking to market undoes the discounting over one step
        futures /= model.discount(i, times[i] + step)?;
    }
    interpolate(&futures)
}

/// `t0 + k·period` for `k = 0..n`, the reset times of a cap.
fn reset_times(initial_time: Time, flow: &CashFlow) -> Vec<Time> {
    (0..flow.number_of_payments)
        .map(|k| initial_time + k as Time * flow.period)
        .collect()
}

/// Value at `t_i` of the next caplet's swaplet per unit of notional,
/// `1 - P(t_i, t_i + δ)(1 + Rδ)`.
fn swaplet<M: InterestRateModel + ?Sized>(i: usize, flow: &CashFlow, model: &M) -> Result<Slice> {
    let t = model.event_times()?[i];
    let bond = model.discount(i, t + flow.period)?;
    Ok(1.0 - bond * (1.0 + flow.rate * flow.period))
}

/// Interest-rate cap with caplets reset at `t0 + kδ` and paid at
/// `t0 + (k + 1)δ`, `k = 0..n`.
///
/// # Errors
/// Precondition failure on a non-positive period or no payments.
pub fn cap<M: InterestRateModel + ?Sized>(cap: &CashFlow, model: &mut M) -> Result<MultiFunction> {
    check_cash_flow(cap)?;
    let times = reset_times(model.initial_time(), cap);
    model.assign_event_times(&times)?;
    let mut i = times.len() - 1;
    let mut option = swaplet(i, cap, &*model)?.max_scalar(0.0);
    while i > 0 {
        i -= 1;
        option.rollback(i)?;
        option += swaplet(i, cap, &*model)?.max_scalar(0.0);
    }
    option *= cap.notional;
    interpolate(&option)
}

/// Down-and-out cap: a [`cap`] terminated at the first reset time after the
/// initial time where the float rate is below `barrier`; the caplet of that
/// period is lost too.
///
/// # Errors
/// Precondition failure on a non-positive period, no payments, or
/// `1 + barrier·δ <= 0`.
pub fn down_out_cap<M: InterestRateModel + ?Sized>(
    cap: &CashFlow,
    barrier: Rate,
    model: &mut M,
) -> Result<MultiFunction> {
    check_cash_flow(cap)?;
    ensure!(
        1.0 + barrier * cap.period > 0.0,
        "rate barrier {barrier} is below -1/period"
    );
    let times = reset_times(model.initial_time(), cap);
    model.assign_event_times(&times)?;
    // L(t, t + δ) >= barrier  <=>  P(t, t + δ) <= 1 / (1 + barrier·δ)
    let upper_discount = 1.0 / (1.0 + barrier * cap.period);

    let mut i = times.len() - 1;
    let mut option = swaplet(i, cap, &*model)?.max_scalar(0.0);
    while i > 0 {
        let discount = model.discount(i, times[i] + cap.period)?;
        option *= indicator(upper_discount, &discount);
        i -= 1;
        option.rollback(i)?;
        option += swaplet(i, cap, &*model)?.max_scalar(0.0);
    }
    option *= cap.notional;
    interpolate(&option)
}

/// Market swap rate at `t_i` of a swap with the period and number of
/// payments of `flow`: `(1 - P(t_i, t_n)) / (δ Σ P(t_i, t_i + kδ))`.
fn swap_rate<M: InterestRateModel + ?Sized>(i: usize, flow: &CashFlow, model: &M) -> Result<Slice> {
    let mut pay = model.event_times()?[i];
    let mut annuity = model.cash(i, 0.0)?;
    for _ in 0..flow.number_of_payments {
        pay += flow.period;
        annuity += model.discount(i, pay)?;
    }
    Ok((1.0 - model.discount(i, pay)?) / (annuity * flow.period))
}

/// Drop-lock swap: `swap` whose fixed rate is reset, at the first payment
/// time where the market swap rate is at or above `upper_rate` (at or below
/// `lower_rate`), to `upper_rate` (`lower_rate`) for the remaining payments.
/// The initial time is not a reset time.
///
/// # Errors
/// Precondition failure if `lower_rate >= upper_rate`, or as
/// [`swap_value`].
pub fn drop_lock_swap<M: InterestRateModel + ?Sized>(
    swap: &Swap,
    lower_rate: Rate,
    upper_rate: Rate,
    model: &mut M,
) -> Result<MultiFunction> {
    ensure!(
        lower_rate < upper_rate,
        "lower reset rate {lower_rate} must be below {upper_rate}"
    );
    check_cash_flow(&swap.cash_flow)?;
    let flow = swap.cash_flow;
    let times = reset_times(model.initial_time(), &flow);
    model.assign_event_times(&times)?;

    let one_period = Swap {
        cash_flow: CashFlow { number_of_payments: 1, ..flow },
        ..*swap
    };
    let reset = |rate: Rate, payments: usize| Swap {
        cash_flow: CashFlow { rate, number_of_payments: payments, ..flow },
        ..*swap
    };

    let n = times.len();
    let mut i = n - 1;
    // value of the payments after t_i if no reset has happened before t_i
    let mut option = swap_value(i, &one_period, &*model)?;
    while i > 0 {
        let market = swap_rate(i, &flow, &*model)?;
        let low = swap_value(i, &reset(lower_rate, n - i), &*model)? - &option;
        option += low * indicator(lower_rate, &market);
        let high = swap_value(i, &reset(upper_rate, n - i), &*model)? - &option;
        option += high * indicator(&market, upper_rate);
        i -= 1;
        option.rollback(i)?;
        option += swap_value(i, &one_period, &*model)?;
    }
    interpolate(&option)
}

/// Auto cap: a cap in which only the first `caplets` in-the-money caplets
/// are paid.
///
/// # Errors
/// Precondition failure on a non-positive period, no payments, or
/// `caplets` outside `1..=number_of_payments`.
pub fn auto_cap<M: InterestRateModel + ?Sized>(
    cap: &CashFlow,
    caplets: usize,
    model: &mut M,
) -> Result<MultiFunction> {
    check_cash_flow(cap)?;
    ensure!(
        0 < caplets && caplets <= cap.number_of_payments,
        "an auto cap pays between 1 and {} caplets, got {caplets}",
        cap.number_of_payments
    );
    let times = reset_times(model.initial_time(), cap);
    model.assign_event_times(&times)?;

    let mut i = times.len() - 1;
    // option[k]: value of future caplets per unit of notional after k
    // caplets have been paid up to and including t_i
    let mut option = vec![swaplet(i, cap, &*model)?.max_scalar(0.0); caplets];
    while i > 0 {
        i -= 1;
        for o in &mut option {
            o.rollback(i)?;
        }
        let next = swaplet(i, cap, &*model)?;
        let pays = indicator(&next, 0.0);
        for k in 0..caplets - 1 {
            let paid = &option[k + 1] + &next - &option[k];
            option[k] += &pays * &paid;
        }
        let last = &next - &option[caplets - 1];
        option[caplets - 1] += &pays * &last;
    }
    let mut value = option.swap_remove(0);
    value *= cap.notional;
    interpolate(&value)
}
