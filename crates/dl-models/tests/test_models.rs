//! Integration tests for the Black and deterministic-rate models.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use dl_core::{Error, Real, Time};
use dl_math::Function;
use dl_methods::{interpolate, AssetModel, InterestRateModel, Model};
use dl_models::{BlackConfig, BlackModel, DeterministicRateConfig, DeterministicRateModel};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn flat(rate: Real) -> Function {
    Function::from_lower(move |t| (-rate * t).exp(), 0.0)
}

fn black() -> BlackModel {
    let forward = Function::from_lower(|t| 50.0 * (0.02 * t).exp(), 0.0);
    BlackModel::new(50.0, flat(0.04), forward, 0.25, 0.0, BlackConfig::default()).unwrap()
}

fn rates() -> DeterministicRateModel {
    DeterministicRateModel::new(flat(0.03), 0.0, DeterministicRateConfig::default()).unwrap()
}

#[test]
fn black_price_function_passes_through_origin() {
    init_tracing();
    let mut model = black();
    model.assign_event_times(&[0.0, 0.5, 1.0]).unwrap();
    let mut payoff = (50.0 - model.spot(2).unwrap()).max_scalar(0.0);
    payoff.rollback(0).unwrap();
    let price = interpolate(&payoff).unwrap();
    assert_abs_diff_eq!(
        price.value(&[50.0]).unwrap(),
        payoff.origin_value().unwrap(),
        epsilon = 1e-10
    );
    // a put gains value as the initial spot falls
    assert!(price.value(&[48.0]).unwrap() > price.value(&[52.0]).unwrap());
}

#[test]
fn rate_model_price_function_passes_through_origin() {
    let mut model = rates();
    model.assign_event_times(&[0.0, 2.0]).unwrap();
    let bond = model.discount(1, 5.0).unwrap().rolled_back(0).unwrap();
    let price = interpolate(&bond).unwrap();
    assert_abs_diff_eq!(price.value(&[0.0]).unwrap(), (-0.15_f64).exp(), epsilon = 1e-14);
    // a higher yield shift lowers the bond price
    assert!(price.value(&[0.005]).unwrap() < price.value(&[0.0]).unwrap());
}

#[test]
fn rollback_needs_an_earlier_index() {
    let mut model = black();
    model.assign_event_times(&[0.0, 1.0]).unwrap();
    let mut s = model.spot(1).unwrap();
    assert!(s.rollback(1).is_err());
    s.rollback(0).unwrap();
    assert!(s.rollback(0).is_err());

    let mut model = rates();
    model.assign_event_times(&[0.0, 1.0]).unwrap();
    assert!(model.cash(0, 1.0).unwrap().rollback(0).is_err());
}

#[test]
fn float_rate_of_deterministic_model() {
    let mut model = rates();
    model.assign_event_times(&[0.0, 1.0]).unwrap();
    let r = model.rate(1, 0.25).unwrap();
    let expected = ((0.03_f64 * 0.25).exp() - 1.0) / 0.25;
    assert!(r.origin_value().is_err());
    assert_abs_diff_eq!(r.values()[10], expected, epsilon = 1e-14);
}

#[test]
fn factories_reject_early_maturities() {
    let mut model = black();
    model.assign_event_times(&[0.0, 1.0]).unwrap();
    assert!(model.forward(1, 0.5).is_err());
    assert!(model.discount(2, 3.0).is_err());
}

#[test]
fn factories_need_an_assigned_session() {
    let black = black();
    assert!(matches!(black.spot(0), Err(Error::Precondition(_))));
    assert!(matches!(black.cash(0, 1.0), Err(Error::Precondition(_))));
    let mut rates = rates();
    assert!(matches!(rates.discount(0, 1.0), Err(Error::Precondition(_))));
    assert!(matches!(rates.event_times(), Err(Error::Precondition(_))));

    rates.assign_event_times(&[0.0, 1.0]).unwrap();
    assert!(matches!(rates.rate(2, 0.25), Err(Error::Precondition(_))));
    assert!(matches!(rates.rate(0, 0.0), Err(Error::Precondition(_))));
}

fn grid_strategy() -> impl Strategy<Value = Vec<Time>> {
    prop::collection::vec(0.05..1.0_f64, 1..8).prop_map(|gaps| {
        let mut t = 0.0;
        let mut times = vec![0.0];
        for g in gaps {
            t += g;
            times.push(t);
        }
        times
    })
}

proptest! {
    #[test]
    fn rolled_back_bond_is_the_earlier_bond(
        times in grid_strategy(),
        extra in 0.0..3.0_f64,
        a in 0usize..8,
        b in 0usize..8,
    ) {
        let n = times.len();
        let (i, j) = ((a % n).max(b % n), (a % n).min(b % n));
        prop_assume!(j < i);
        let mut model = rates();
        model.assign_event_times(&times).unwrap();
        let maturity = times[n - 1] + extra;
        let rolled = model.discount(i, maturity).unwrap().rolled_back(j).unwrap();
        let direct = model.discount(j, maturity).unwrap();
        for (x, y) in rolled.values().iter().zip(direct.values()) {
            prop_assert!((x - y).abs() < 1e-13);
        }
    }
}
