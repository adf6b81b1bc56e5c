//! Lattice valuation of options on a single asset.
//!
//! Each routine assigns its event times to the model, builds the payoff at
//! the last event time and rolls it back to the initial time, adjusting it
//! at every event time on the way.  The result is the price as a function
//! of the model's initial state.

use dl_core::{ensure, errors::Result, Real, Time};
use dl_math::MultiFunction;
use dl_methods::{indicator, interpolate, AssetModel, Slice};

/// `[t0, times...]`, after checking that `times` is non-empty and starts
/// after `t0`.  Strict monotonicity is enforced by the event grid.
pub(crate) fn event_times(initial_time: Time, times: &[Time]) -> Result<Vec<Time>> {
    ensure!(!times.is_empty(), "at least one event time after the initial time is required");
    ensure!(
        times[0] > initial_time,
        "the first event time {} must be after the initial time {initial_time}",
        times[0]
    );
    Ok(std::iter::once(initial_time)
        .chain(times.iter().copied())
        .collect())
}

/// European put with strike `strike` and maturity `maturity`.
///
/// # Errors
/// Precondition failure if `maturity` is not after the initial time.
pub fn put<M: AssetModel + ?Sized>(strike: Real, maturity: Time, model: &mut M) -> Result<MultiFunction> {
    model.assign_event_times(&event_times(model.initial_time(), &[maturity])?)?;
    let mut option = (strike - model.spot(1)?).max_scalar(0.0);
    option.rollback(0)?;
    interpolate(&option)
}

/// American put exercisable at `exercise_times`.
///
/// # Errors
/// Precondition failure unless the exercise times are strictly increasing
/// and after the initial time.
pub fn american_put<M: AssetModel + ?Sized>(
    strike: Real,
    exercise_times: &[Time],
    model: &mut M,
) -> Result<MultiFunction> {
    model.assign_event_times(&event_times(model.initial_time(), exercise_times)?)?;
    let mut i = exercise_times.len();
    let mut option = model.cash(i, 0.0)?;
    while i > 0 {
        // value to continue versus value to exercise now
        option = option.max(&(strike - model.spot(i)?));
        i -= 1;
        option.rollback(i)?;
    }
    interpolate(&option)
}

/// Double barrier knock-out paying `notional` at the last barrier time if
/// the spot stays within `[lower, upper]` at every barrier time.
///
/// # Errors
/// Precondition failure if `lower >= upper` or the barrier times are not
/// strictly increasing after the initial time.
pub fn barrier_up_down_out<M: AssetModel + ?Sized>(
    notional: Real,
    lower: Real,
    upper: Real,
    barrier_times: &[Time],
    model: &mut M,
) -> Result<MultiFunction> {
    ensure!(lower < upper, "lower barrier {lower} must be below upper barrier {upper}");
    model.assign_event_times(&event_times(model.initial_time(), barrier_times)?)?;
    let mut i = barrier_times.len();
    let mut option = model.cash(i, notional)?;
    while i > 0 {
        let spot = model.spot(i)?;
        option *= indicator(&spot, lower) * indicator(upper, &spot);
        i -= 1;
        option.rollback(i)?;
    }
    interpolate(&option)
}

/// Down-and-out call: a European call with strike `strike` and maturity
/// `maturity`, cancelled if the spot is below `barrier` at a barrier time
/// or at maturity.
///
/// # Errors
/// Precondition failure unless the barrier times are strictly increasing,
/// after the initial time and before `maturity`.
pub fn down_out_call<M: AssetModel + ?Sized>(
    barrier: Real,
    barrier_times: &[Time],
    strike: Real,
    maturity: Time,
    model: &mut M,
) -> Result<MultiFunction> {
    ensure!(
        barrier_times.last().is_some_and(|&t| t < maturity),
        "maturity {maturity} must follow the last barrier time"
    );
    let mut times = barrier_times.to_vec();
    times.push(maturity);
    model.assign_event_times(&event_times(model.initial_time(), &times)?)?;

    let mut i = times.len();
    let mut option = (model.spot(i)? - strike).max_scalar(0.0);
    while i > 0 {
        option *= indicator(&model.spot(i)?, barrier);
        i -= 1;
        option.rollback(i)?;
    }
    interpolate(&option)
}

/// Down-and-out American call: exercisable at `exercise_times` for
/// `strike`, cancelled at the first barrier time where the spot is below
/// `barrier`.
///
/// When an exercise time is also a barrier time the holder may exercise
/// before the barrier is checked.
///
/// # Errors
/// Precondition failure if `barrier >= strike` or either time vector is
/// empty or does not start after the initial time.
pub fn down_out_american_call<M: AssetModel + ?Sized>(
    barrier: Real,
    barrier_times: &[Time],
    strike: Real,
    exercise_times: &[Time],
    model: &mut M,
) -> Result<MultiFunction> {
    ensure!(barrier < strike, "barrier {barrier} must be below the strike {strike}");
    let t0 = model.initial_time();
    event_times(t0, barrier_times)?;
    event_times(t0, exercise_times)?;

    let mut times: Vec<Time> = barrier_times.iter().chain(exercise_times).copied().collect();
    times.sort_by(|a, b| a.total_cmp(b));
    times.dedup();
    model.assign_event_times(&event_times(t0, &times)?)?;

    let mut i = times.len();
    let mut option = model.cash(i, 0.0)?;
    while i > 0 {
        let t = times[i - 1];
        let spot = model.spot(i)?;
        if exercise_times.contains(&t) {
            option = option.max(&(&spot - strike));
        }
        if barrier_times.contains(&t) {
            option *= indicator(&spot, barrier);
        }
        i -= 1;
        option.rollback(i)?;
    }
    interpolate(&option)
}

/// Forward contract on the arithmetic average of the spot at `aver_times`,
/// settled at the last averaging time: the forward price
/// `E^T[Σ S(t_k)] / M` under the settlement-date forward measure.
///
/// # Errors
/// Precondition failure unless the averaging times are strictly increasing
/// and after the initial time.
pub fn forward_on_average_spot<M: AssetModel + ?Sized>(
    aver_times: &[Time],
    model: &mut M,
) -> Result<MultiFunction> {
    model.assign_event_times(&event_times(model.initial_time(), aver_times)?)?;
    let settlement = aver_times[aver_times.len() - 1];
    let mut i = aver_times.len();
    let mut option = model.cash(i, 0.0)?;
    while i > 0 {
        // discounted sum of the future spot prices
        option += model.spot(i)? * model.discount(i, settlement)?;
        i -= 1;
        option.rollback(i)?;
    }
    option /= model.discount(0, settlement)? * aver_times.len() as Real;
    interpolate(&option)
}

/// Swing option: at each exercise time the holder may buy one unit of the
/// asset for `strike`, at most `exercises` times in total.
///
/// # Errors
/// Precondition failure if `exercises == 0` or the exercise times are not
/// strictly increasing after the initial time.
pub fn swing<M: AssetModel + ?Sized>(
    strike: Real,
    exercise_times: &[Time],
    exercises: usize,
    model: &mut M,
) -> Result<MultiFunction> {
    ensure!(exercises > 0, "a swing option needs at least one exercise right");
    model.assign_event_times(&event_times(model.initial_time(), exercise_times)?)?;
    let mut i = exercise_times.len();
    // option[k]: value to continue after k exercises, before and at t_i
    let mut option: Vec<Slice> = vec![model.cash(i, 0.0)?; exercises];
    while i > 0 {
        let gain = model.spot(i)? - strike;
        for k in 0..exercises - 1 {
            option[k] = option[k].max(&(&option[k + 1] + &gain));
        }
        option[exercises - 1] = option[exercises - 1].max(&gain);
        i -= 1;
        for o in &mut option {
            o.rollback(i)?;
        }
    }
    interpolate(&option[0])
}
