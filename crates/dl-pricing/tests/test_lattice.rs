//! Lattice valuation routines on the Black and deterministic-rate models.

use approx::assert_abs_diff_eq;

use dl_core::{Real, Time};
use dl_math::Function;
use dl_methods::Model;
use dl_models::{BlackConfig, BlackModel, DeterministicRateConfig, DeterministicRateModel};
use dl_pricing::{
    american_put, auto_cap, barrier_up_down_out, call_black, cap, down_out_american_call,
    down_out_call, down_out_cap, drop_lock_swap, forward_on_average_spot, futures_on_rate, put,
    put_black, swap, swaption, swing, CashFlow, Swap,
};

const SPOT: Real = 100.0;
const RATE: Real = 0.05;
const DIVIDEND: Real = 0.02;
const SIGMA: Real = 0.2;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn discount_curve(rate: Real) -> Function {
    Function::from_lower(move |t| (-rate * t).exp(), 0.0)
}

fn forward_price(t: Time) -> Real {
    SPOT * ((RATE - DIVIDEND) * t).exp()
}

fn black() -> BlackModel {
    let forward = Function::from_lower(forward_price, 0.0);
    let config = BlackConfig {
        step: 1.0 / 1000.0,
        ..BlackConfig::default()
    };
    BlackModel::new(SPOT, discount_curve(RATE), forward, SIGMA, 0.0, config).unwrap()
}

fn at_spot(price: &dl_math::MultiFunction) -> Real {
    price.value(&[SPOT]).unwrap()
}

#[test]
fn european_put_converges_to_black() {
    init_tracing();
    let mut model = black();
    for (strike, maturity) in [(100.0, 1.0), (90.0, 0.5), (115.0, 2.0)] {
        let lattice = at_spot(&put(strike, maturity, &mut model).unwrap());
        let df = (-RATE * maturity).exp();
        let exact = put_black(strike, maturity, df, forward_price(maturity), SIGMA).unwrap();
        assert_abs_diff_eq!(lattice, exact, epsilon = 0.02);
    }
}

#[test]
fn american_put_dominates_european() {
    let mut model = black();
    let european = put(100.0, 1.0, &mut model).unwrap();
    let times: Vec<Time> = (1..=12).map(|k| k as Time / 12.0).collect();
    let american = american_put(100.0, &times, &mut model).unwrap();
    // across the band of initial spots
    for spot in (41..=61).map(|k| 2.0 * k as Real) {
        let (a, e) = (american.value(&[spot]).unwrap(), european.value(&[spot]).unwrap());
        assert!(a >= e - 1e-9, "spot {spot}: american {a} < european {e}");
    }
    let (american, european) = (at_spot(&american), at_spot(&european));
    assert!(american > european + 1e-3);
    // early exercise right is worth less than the strike
    assert!(american < 100.0);
    assert!(american_put(100.0, &[0.5, 0.25], &mut model).is_err());
    assert!(american_put(100.0, &[0.0, 0.25], &mut model).is_err());
}

#[test]
fn down_out_call_decreases_with_the_barrier() {
    let mut model = black();
    let barrier_times = [0.25, 0.5, 0.75];
    let df = (-RATE).exp();
    let vanilla = call_black(100.0, 1.0, df, forward_price(1.0), SIGMA).unwrap();
    let mut previous = vanilla + 0.02;
    for barrier in [60.0, 75.0, 85.0, 92.0, 97.0] {
        let price = at_spot(&down_out_call(barrier, &barrier_times, 100.0, 1.0, &mut model).unwrap());
        assert!(price < previous, "barrier {barrier}: {price} >= {previous}");
        previous = price;
    }
    assert!(down_out_call(90.0, &barrier_times, 100.0, 0.75, &mut model).is_err());
}

#[test]
fn double_barrier_is_bounded_by_the_bond() {
    let mut model = black();
    let times = [0.25, 0.5, 0.75, 1.0];
    let wide = at_spot(&barrier_up_down_out(1.0, 1.0, 1e4, &times, &mut model).unwrap());
    assert_abs_diff_eq!(wide, (-RATE).exp(), epsilon = 1e-10);
    let narrow = at_spot(&barrier_up_down_out(1.0, 90.0, 110.0, &times, &mut model).unwrap());
    assert!(0.0 < narrow && narrow < wide);
    assert!(barrier_up_down_out(1.0, 110.0, 90.0, &times, &mut model).is_err());
}

#[test]
fn barrier_free_american_call_is_a_single_exercise_swing() {
    let mut model = black();
    let times = [0.2, 0.4, 0.6, 0.8, 1.0];
    let knock = at_spot(&down_out_american_call(1.0, &times, 100.0, &times, &mut model).unwrap());
    let bermudan = at_spot(&swing(100.0, &times, 1, &mut model).unwrap());
    assert_abs_diff_eq!(knock, bermudan, epsilon = 1e-12);
    let knocked = at_spot(&down_out_american_call(90.0, &[0.3, 0.7], 100.0, &times, &mut model).unwrap());
    assert!(knocked < bermudan);
    assert!(down_out_american_call(101.0, &times, 100.0, &times, &mut model).is_err());
}

#[test]
fn full_swing_is_a_strip_of_calls() {
    let mut model = black();
    let times = [0.25, 0.5, 0.75];
    let prices: Vec<Real> = (1..=3)
        .map(|n| at_spot(&swing(105.0, &times, n, &mut model).unwrap()))
        .collect();
    assert!(prices[0] < prices[1] && prices[1] < prices[2]);
    let strip: Real = times
        .iter()
        .map(|&t| call_black(105.0, t, (-RATE * t).exp(), forward_price(t), SIGMA).unwrap())
        .sum();
    assert_abs_diff_eq!(prices[2], strip, epsilon = 0.05);
    assert!(swing(105.0, &times, 0, &mut model).is_err());
}

#[test]
fn average_forward_is_the_mean_forward_price() {
    let mut model = black();
    let times = [0.5, 1.0, 1.5, 2.0];
    let price = at_spot(&forward_on_average_spot(&times, &mut model).unwrap());
    let expected = times.iter().map(|&t| forward_price(t)).sum::<Real>() / times.len() as Real;
    assert_abs_diff_eq!(price, expected, epsilon = 1e-6);
}

#[test]
fn routines_start_new_sessions() {
    let mut model = black();
    put(100.0, 1.0, &mut model).unwrap();
    assert_eq!(model.event_times().unwrap(), &[0.0, 1.0]);
    american_put(100.0, &[0.5, 1.0], &mut model).unwrap();
    assert_eq!(model.event_times().unwrap(), &[0.0, 0.5, 1.0]);
}

// ── Interest-rate routines ───────────────────────────────────────────────

const SHORT: Real = 0.04;

fn rates() -> DeterministicRateModel {
    DeterministicRateModel::new(discount_curve(SHORT), 0.0, DeterministicRateConfig::default())
        .unwrap()
}

fn at_zero_shift(price: &dl_math::MultiFunction) -> Real {
    price.value(&[0.0]).unwrap()
}

fn par_rate(period: Time, payments: usize) -> Real {
    let p = |t: Time| (-SHORT * t).exp();
    let annuity: Real = (1..=payments).map(|k| p(k as Time * period)).sum();
    (1.0 - p(payments as Time * period)) / (period * annuity)
}

#[test]
fn par_swap_is_worth_nothing() {
    let mut model = rates();
    let flow = CashFlow {
        notional: 1e6,
        rate: par_rate(0.5, 10),
        period: 0.5,
        number_of_payments: 10,
    };
    let receiver = Swap { cash_flow: flow, pay_float: true };
    let payer = Swap { cash_flow: flow, pay_float: false };
    assert_abs_diff_eq!(at_zero_shift(&swap(&receiver, &mut model).unwrap()), 0.0, epsilon = 1e-6);

    let rich = Swap { cash_flow: CashFlow { rate: flow.rate + 0.01, ..flow }, pay_float: true };
    let receive = at_zero_shift(&swap(&rich, &mut model).unwrap());
    let pay = at_zero_shift(&swap(&Swap { pay_float: false, ..rich }, &mut model).unwrap());
    assert!(receive > 0.0);
    assert_abs_diff_eq!(receive, -pay, epsilon = 1e-9);
    assert_abs_diff_eq!(at_zero_shift(&swap(&payer, &mut model).unwrap()), 0.0, epsilon = 1e-6);
}

#[test]
fn deterministic_swaption_is_discounted_intrinsic() {
    let mut model = rates();
    let maturity = 1.0;
    let flow = CashFlow { notional: 100.0, rate: 0.05, period: 0.25, number_of_payments: 8 };
    let receiver = Swap { cash_flow: flow, pay_float: true };
    let price = at_zero_shift(&swaption(&receiver, maturity, &mut model).unwrap());

    let p = |t: Time| (-SHORT * t).exp();
    let annuity: Real = (1..=8).map(|k| p(maturity + k as Time * 0.25)).sum();
    let bond = flow.notional * (flow.rate * flow.period * annuity + p(maturity + 2.0)) / p(maturity);
    let expected = p(maturity) * (bond - flow.notional).max(0.0);
    assert!(expected > 0.0);
    assert_abs_diff_eq!(price, expected, epsilon = 1e-10);

    let payer = Swap { pay_float: false, ..receiver };
    assert_abs_diff_eq!(at_zero_shift(&swaption(&payer, maturity, &mut model).unwrap()), 0.0);
    assert!(swaption(&receiver, 0.0, &mut model).is_err());
}

#[test]
fn cap_is_a_sum_of_caplets() {
    let mut model = rates();
    let flow = CashFlow { notional: 1000.0, rate: 0.03, period: 0.5, number_of_payments: 6 };
    let price = at_zero_shift(&cap(&flow, &mut model).unwrap());
    let caplet = 1.0 - (-SHORT * flow.period).exp() * (1.0 + flow.rate * flow.period);
    assert!(caplet > 0.0);
    let expected: Real = (0..6)
        .map(|k| flow.notional * (-SHORT * k as Time * flow.period).exp() * caplet)
        .sum();
    assert_abs_diff_eq!(price, expected, epsilon = 1e-10);

    let out_of_the_money = CashFlow { rate: 0.06, ..flow };
    assert_abs_diff_eq!(at_zero_shift(&cap(&out_of_the_money, &mut model).unwrap()), 0.0);
}

#[test]
fn auto_cap_pays_only_the_first_caplets() {
    let mut model = rates();
    let flow = CashFlow { notional: 1000.0, rate: 0.03, period: 0.5, number_of_payments: 6 };
    let full_cap = at_zero_shift(&cap(&flow, &mut model).unwrap());
    let unlimited = at_zero_shift(&auto_cap(&flow, 6, &mut model).unwrap());
    assert_abs_diff_eq!(unlimited, full_cap, epsilon = 1e-10);

    // every caplet is in the money, so only the first two are paid
    let caplet = 1.0 - (-SHORT * flow.period).exp() * (1.0 + flow.rate * flow.period);
    let two = at_zero_shift(&auto_cap(&flow, 2, &mut model).unwrap());
    let expected = flow.notional * caplet * (1.0 + (-SHORT * flow.period).exp());
    assert_abs_diff_eq!(two, expected, epsilon = 1e-10);

    assert!(auto_cap(&flow, 0, &mut model).is_err());
    assert!(auto_cap(&flow, 7, &mut model).is_err());
}

#[test]
fn deterministic_futures_is_one_minus_the_forward_rate() {
    let mut model = rates();
    let period = 0.25;
    let expected = 1.0 - ((SHORT * period).exp() - 1.0) / period;
    for steps in [1, 4, 9] {
        let price = at_zero_shift(&futures_on_rate(period, steps, 1.0, &mut model).unwrap());
        assert_abs_diff_eq!(price, expected, epsilon = 1e-12);
    }
    assert!(futures_on_rate(period, 0, 1.0, &mut model).is_err());
    assert!(futures_on_rate(period, 4, 0.0, &mut model).is_err());
    assert!(futures_on_rate(0.0, 4, 1.0, &mut model).is_err());
}

#[test]
fn down_out_cap_matches_cap_until_knocked_out() {
    let mut model = rates();
    let flow = CashFlow { notional: 1000.0, rate: 0.03, period: 0.5, number_of_payments: 6 };
    let full_cap = at_zero_shift(&cap(&flow, &mut model).unwrap());
    let alive = at_zero_shift(&down_out_cap(&flow, 0.03, &mut model).unwrap());
    assert_abs_diff_eq!(alive, full_cap, epsilon = 1e-10);

    // the float rate stays below 5%, so the cap is knocked out at the first reset
    let caplet = 1.0 - (-SHORT * flow.period).exp() * (1.0 + flow.rate * flow.period);
    let knocked = at_zero_shift(&down_out_cap(&flow, 0.05, &mut model).unwrap());
    assert_abs_diff_eq!(knocked, flow.notional * caplet, epsilon = 1e-10);

    assert!(down_out_cap(&flow, -2.0 / flow.period, &mut model).is_err());
}

#[test]
fn drop_lock_swap_locks_the_rate_at_the_first_reset() {
    let mut model = rates();
    let flow = CashFlow { notional: 1000.0, rate: 0.035, period: 0.5, number_of_payments: 6 };
    let receiver = Swap { cash_flow: flow, pay_float: true };
    let plain = at_zero_shift(&swap(&receiver, &mut model).unwrap());
    let inside = at_zero_shift(&drop_lock_swap(&receiver, 0.03, 0.05, &mut model).unwrap());
    assert_abs_diff_eq!(inside, plain, epsilon = 1e-9);

    // the swap rate is about 4.04% at every reset, so the lock happens at t_1
    let p = |t: Time| (-SHORT * t).exp();
    let delta = flow.period;
    let first = flow.notional * ((1.0 + flow.rate * delta) * p(delta) - 1.0);
    let locked = |rate: Real| {
        let annuity: Real = (1..6).map(|k| p(k as Time * delta)).sum();
        first + p(delta) * flow.notional * (rate * delta * annuity + p(5.0 * delta) - 1.0)
    };
    let upper = at_zero_shift(&drop_lock_swap(&receiver, 0.02, 0.04, &mut model).unwrap());
    assert_abs_diff_eq!(upper, locked(0.04), epsilon = 1e-9);
    let lower = at_zero_shift(&drop_lock_swap(&receiver, 0.045, 0.06, &mut model).unwrap());
    assert_abs_diff_eq!(lower, locked(0.045), epsilon = 1e-9);
    assert!(upper > plain && lower > upper);

    assert!(drop_lock_swap(&receiver, 0.05, 0.04, &mut model).is_err());
}
