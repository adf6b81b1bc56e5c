//! Curves interpolated through market quotes.

use dl_core::{ensure, errors::Result, Real, Settings, Time};
use dl_math::{Function, Interp};

/// Quotes must be non-empty, of equal length, strictly increasing in time
/// and strictly after `initial_time`.
pub(crate) fn check_quotes(times: &[Time], values: &[Real], initial_time: Time) -> Result<()> {
    ensure!(!times.is_empty(), "at least one quote is required");
    ensure!(
        times.len() == values.len(),
        "{} quote times but {} values",
        times.len(),
        values.len()
    );
    ensure!(
        times[0] > initial_time + Settings::instance().epsilon(),
        "the first quote time {} must be after the initial time {initial_time}",
        times[0]
    );
    ensure!(
        times.windows(2).all(|w| w[0] < w[1]),
        "quote times must be strictly increasing"
    );
    Ok(())
}

fn with_initial_time(initial_time: Time, times: &[Time]) -> Vec<Time> {
    std::iter::once(initial_time).chain(times.iter().copied()).collect()
}

/// Discount curve on `[t0, t_n]` by linear interpolation of `ln P`
/// through `(t0, 0)` and the quotes `(t_i, ln P_i)`.
///
/// # Errors
/// Precondition failure on invalid quotes or non-positive discount factors.
pub fn discount_log_lin_interp(
    times: &[Time],
    discount_factors: &[Real],
    initial_time: Time,
) -> Result<Function> {
    check_quotes(times, discount_factors, initial_time)?;
    ensure!(
        discount_factors.iter().all(|&d| d > 0.0),
        "discount factors must be positive"
    );
    let log_df: Vec<Real> = std::iter::once(0.0)
        .chain(discount_factors.iter().map(|d| d.ln()))
        .collect();
    let mut interp = Interp::linear();
    interp.assign(&with_initial_time(initial_time, times), &log_df)?;
    Ok(interp.interp()?.exp())
}

/// Forward curve `spot · exp(c(t) (t - t0))` where the cost-of-carry rate
/// `c` is interpolated by `interp` through `(t0, initial_carry)` and the
/// market carry rates `ln(F_i / spot) / (t_i - t0)`.
///
/// # Errors
/// Precondition failure on invalid quotes, a non-positive spot or forward,
/// or a node set the interpolation scheme rejects.
pub fn forward_carry_interp(
    spot: Real,
    times: &[Time],
    forwards: &[Real],
    initial_carry: Real,
    initial_time: Time,
    interp: &mut Interp,
) -> Result<Function> {
    check_quotes(times, forwards, initial_time)?;
    ensure!(spot > 0.0, "spot must be positive, got {spot}");
    ensure!(forwards.iter().all(|&f| f > 0.0), "forward prices must be positive");

    let carry: Vec<Real> = std::iter::once(initial_carry)
        .chain(
            times
                .iter()
                .zip(forwards)
                .map(|(&t, &f)| (f / spot).ln() / (t - initial_time)),
        )
        .collect();
    interp.assign(&with_initial_time(initial_time, times), &carry)?;
    let elapsed = Function::from_lower(move |t| t - initial_time, initial_time);
    Ok(spot * (interp.interp()? * elapsed).exp())
}

/// [`forward_carry_interp`] with the Steffen monotone scheme; the carry rate
/// at `t0` is taken equal to the carry rate of the first quote.
///
/// # Errors
/// As [`forward_carry_interp`].
pub fn forward_carry_steffen_interp(
    spot: Real,
    times: &[Time],
    forwards: &[Real],
    initial_time: Time,
) -> Result<Function> {
    check_quotes(times, forwards, initial_time)?;
    ensure!(spot > 0.0 && forwards[0] > 0.0, "spot and forward prices must be positive");
    let initial_carry = (forwards[0] / spot).ln() / (times[0] - initial_time);
    forward_carry_interp(
        spot,
        times,
        forwards,
        initial_carry,
        initial_time,
        &mut Interp::steffen(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn log_linear_discount_reproduces_quotes() {
        let times = [0.5, 1.0, 3.0];
        let dfs = [0.98, 0.95, 0.86];
        let d = discount_log_lin_interp(&times, &dfs, 0.0).unwrap();
        assert_abs_diff_eq!(d.value(0.0).unwrap(), 1.0, epsilon = 1e-15);
        for (t, df) in times.iter().zip(dfs) {
            assert_abs_diff_eq!(d.value(*t).unwrap(), df, epsilon = 1e-14);
        }
        // geometric mean between nodes
        assert_abs_diff_eq!(d.value(2.0).unwrap(), (0.95_f64 * 0.86).sqrt(), epsilon = 1e-14);
        assert!(d.value(3.5).is_err());
    }

    #[test]
    fn quotes_are_validated() {
        assert!(discount_log_lin_interp(&[], &[], 0.0).is_err());
        assert!(discount_log_lin_interp(&[1.0, 0.5], &[0.9, 0.95], 0.0).is_err());
        assert!(discount_log_lin_interp(&[0.0, 1.0], &[1.0, 0.95], 0.0).is_err());
        assert!(discount_log_lin_interp(&[1.0], &[0.9, 0.8], 0.0).is_err());
        assert!(discount_log_lin_interp(&[1.0], &[-0.9], 0.0).is_err());
    }

    #[test]
    fn carry_interpolation_reproduces_forwards() {
        let spot = 100.0;
        let times = [0.25, 0.5, 1.0, 2.0];
        let forwards = [100.5, 101.2, 102.0, 104.5];
        let linear = forward_carry_interp(spot, &times, &forwards, 0.02, 0.0, &mut Interp::linear())
            .unwrap();
        let steffen = forward_carry_steffen_interp(spot, &times, &forwards, 0.0).unwrap();
        for f in [&linear, &steffen] {
            assert_abs_diff_eq!(f.value(0.0).unwrap(), spot, epsilon = 1e-12);
            for (t, fwd) in times.iter().zip(forwards) {
                assert_abs_diff_eq!(f.value(*t).unwrap(), fwd, epsilon = 1e-10);
            }
        }
    }
}
