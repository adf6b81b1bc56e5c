//! One-dimensional root finding.
//!
//! [`Root`] brackets a root of a [`Function`] that changes sign on
//! `[lo, hi]` (bisection, false position, Brent).  It stops either when the
//! bracket is small enough or when the residual `|f(x)|` is small enough, and
//! gives up silently after `max_steps`, returning its best estimate.
//!
//! [`RootD`] polishes a starting guess with derivative information (Newton,
//! secant, Steffenson) and fails with [`Error::Convergence`] if the step
//! test is not met within `max_steps`.

use dl_core::{
    ensure,
    errors::{Error, Result},
    Real,
};

use crate::function::Function;

/// Tolerances and iteration cap shared by [`Root`] and [`RootD`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootConfig {
    /// Absolute error of the interval (or step) test.
    pub abs_err: Real,
    /// Relative error of the interval (or step) test.
    pub rel_err: Real,
    /// Residual bound `|f(x)| < residual_err` of the residual test.
    pub residual_err: Real,
    /// Maximum number of iterations.
    pub max_steps: u32,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            abs_err: 1.0e-10,
            rel_err: 1.0e-10,
            residual_err: 1.0e-12,
            max_steps: 100,
        }
    }
}

/// Stopping rule of a bracketing solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Stop when the bracket `[a, b]` satisfies
    /// `|a - b| < abs + rel * min(|a|, |b|)` (or `< abs` if it contains 0).
    Interval,
    /// Stop when `|f(x)| < residual_err`.
    Residual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracketing {
    Bisection,
    FalsePosition,
    Brent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Lower,
    Upper,
}

fn interval_converged(a: Real, b: Real, abs: Real, rel: Real) -> bool {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let width = hi - lo;
    if lo > 0.0 || hi < 0.0 {
        width < abs + rel * lo.abs().min(hi.abs())
    } else {
        width < abs
    }
}

/// Bracketing root finder.
///
/// ```
/// use dl_math::{Function, Root, RootConfig};
///
/// let f = Function::new(|x| x * x - 2.0);
/// let root = Root::brent(RootConfig::default()).find(&f, 0.0, 2.0).unwrap();
/// assert!((root - 2f64.sqrt()).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    method: Bracketing,
    rule: StopRule,
    config: RootConfig,
}

impl Root {
    fn new(method: Bracketing, config: RootConfig) -> Self {
        Self {
            method,
            rule: StopRule::Interval,
            config,
        }
    }

    /// Bisection.
    pub fn bisection(config: RootConfig) -> Self {
        Self::new(Bracketing::Bisection, config)
    }

    /// False position (regula falsi).
    pub fn false_position(config: RootConfig) -> Self {
        Self::new(Bracketing::FalsePosition, config)
    }

    /// Brent's method.
    pub fn brent(config: RootConfig) -> Self {
        Self::new(Bracketing::Brent, config)
    }

    /// Replace the stopping rule (the default is [`StopRule::Interval`]).
    pub fn with_rule(mut self, rule: StopRule) -> Self {
        self.rule = rule;
        self
    }

    /// The configured stopping rule.
    pub fn rule(&self) -> StopRule {
        self.rule
    }

    /// Find a root of `f` in `[lo, hi]`.
    ///
    /// # Errors
    /// Precondition failure if `lo >= hi`, an endpoint lies outside the
    /// domain of `f`, or `f(lo)` and `f(hi)` have the same strict sign.
    pub fn find(&self, f: &Function, lo: Real, hi: Real) -> Result<Real> {
        ensure!(lo < hi, "empty bracket [{lo}, {hi}]");
        ensure!(
            f.belongs(lo) && f.belongs(hi),
            "bracket [{lo}, {hi}] is not inside the domain of the function"
        );
        let (flo, fhi) = (f.value(lo)?, f.value(hi)?);
        ensure!(
            flo * fhi <= 0.0,
            "the function does not change sign on [{lo}, {hi}]: f(lo) = {flo}, f(hi) = {fhi}"
        );
        if flo == 0.0 {
            return Ok(lo);
        }
        if fhi == 0.0 {
            return Ok(hi);
        }
        match self.method {
            Bracketing::Bisection => self.bisection_loop(f, lo, hi, flo),
            Bracketing::FalsePosition => self.false_position_loop(f, lo, hi, flo, fhi),
            Bracketing::Brent => self.brent_loop(f, lo, hi, flo, fhi),
        }
    }

    fn converged(&self, a: Real, b: Real, fx: Real) -> bool {
        match self.rule {
            StopRule::Interval => {
                interval_converged(a, b, self.config.abs_err, self.config.rel_err)
            }
            StopRule::Residual => fx.abs() < self.config.residual_err,
        }
    }

    fn give_up(&self, estimate: Real) -> Result<Real> {
        tracing::warn!(
            method = ?self.method,
            steps = self.config.max_steps,
            estimate,
            "root search stopped at the iteration cap"
        );
        Ok(estimate)
    }

    fn bisection_loop(&self, f: &Function, mut a: Real, mut b: Real, mut fa: Real) -> Result<Real> {
        for _ in 0..self.config.max_steps {
            let mid = 0.5 * (a + b);
            let fm = f.value(mid)?;
            if fm == 0.0 {
                return Ok(mid);
            }
            if fa * fm < 0.0 {
                b = mid;
            } else {
                a = mid;
                fa = fm;
            }
            if self.converged(a, b, fm) {
                return Ok(0.5 * (a + b));
            }
        }
        self.give_up(0.5 * (a + b))
    }

    /// Illinois variant of regula falsi: when the same end of the bracket
    /// moves twice in a row, the function value kept at the other end is
    /// halved, so that both ends close in on the root.
    fn false_position_loop(
        &self,
        f: &Function,
        mut a: Real,
        mut b: Real,
        mut fa: Real,
        mut fb: Real,
    ) -> Result<Real> {
        let mut x = a;
        let mut moved = None;
        for _ in 0..self.config.max_steps {
            x = a - fa * (b - a) / (fb - fa);
            let fx = f.value(x)?;
            if fx == 0.0 {
                return Ok(x);
            }
            if fa * fx < 0.0 {
                b = x;
                fb = fx;
                if moved == Some(End::Upper) {
                    fa *= 0.5;
                }
                moved = Some(End::Upper);
            } else {
                a = x;
                fa = fx;
                if moved == Some(End::Lower) {
                    fb *= 0.5;
                }
                moved = Some(End::Lower);
            }
            if self.converged(a, b, fx) {
                return Ok(x);
            }
        }
        self.give_up(x)
    }

    fn brent_loop(
        &self,
        f: &Function,
        mut a: Real,
        mut b: Real,
        mut fa: Real,
        mut fb: Real,
    ) -> Result<Real> {
        let mut c = a;
        let mut fc = fa;
        let mut d = b - a;
        let mut e = d;

        for _ in 0..self.config.max_steps {
            if fb * fc > 0.0 {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
            if fb == 0.0 || self.converged(b, c, fb) {
                return Ok(b);
            }

            let tol = 0.5 * (f64::EPSILON * b.abs() + self.config.abs_err);
            let m = 0.5 * (c - b);
            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (p, q) = if a == c {
                    (2.0 * m * s, 1.0 - s)
                } else {
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
                if 2.0 * p < (3.0 * m * q - (tol * q).abs()).min((e * q).abs()) {
                    e = d;
                    d = p / q;
                } else {
                    d = m;
                    e = d;
                }
            } else {
                d = m;
                e = d;
            }
            a = b;
            fa = fb;
            b += if d.abs() > tol {
                d
            } else if m > 0.0 {
                tol
            } else {
                -tol
            };
            fb = f.value(b)?;
        }
        self.give_up(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polishing {
    Newton,
    Secant,
    Steffenson,
}

/// Derivative-based root polisher.
///
/// ```
/// use dl_math::{Function, RootConfig, RootD};
///
/// let f = Function::new(|x| x * x - 2.0);
/// let df = Function::new(|x| 2.0 * x);
/// let root = RootD::newton(RootConfig::default()).find(&f, &df, 1.0).unwrap();
/// assert!((root - 2f64.sqrt()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootD {
    method: Polishing,
    config: RootConfig,
}

impl RootD {
    /// Newton's method.
    pub fn newton(config: RootConfig) -> Self {
        Self {
            method: Polishing::Newton,
            config,
        }
    }

    /// Secant method: Newton on the first step, then the derivative is
    /// replaced by the slope through the last two iterates.
    pub fn secant(config: RootConfig) -> Self {
        Self {
            method: Polishing::Secant,
            config,
        }
    }

    /// Newton iteration with Aitken Δ² acceleration.
    pub fn steffenson(config: RootConfig) -> Self {
        Self {
            method: Polishing::Steffenson,
            config,
        }
    }

    /// Polish `x0` towards a root of `f`, given its derivative `df`.
    ///
    /// The iteration stops when `|x_{k+1} - x_k| < abs + rel * |x_{k+1}|`.
    ///
    /// # Errors
    /// [`Error::Domain`] if an iterate leaves the domain of `f` or `df`,
    /// [`Error::Convergence`] if the derivative vanishes or the step test is
    /// not met within `max_steps`.
    pub fn find(&self, f: &Function, df: &Function, x0: Real) -> Result<Real> {
        let RootConfig {
            abs_err,
            rel_err,
            max_steps,
            ..
        } = self.config;

        let mut x = x0;
        let mut fx = f.value(x)?;
        let mut slope = df.value(x)?;
        // previous Newton iterate, for Aitken acceleration
        let mut x_1 = Real::NAN;

        for step in 1..=max_steps {
            if slope == 0.0 || !slope.is_finite() {
                return Err(Error::Convergence {
                    iterations: step,
                    message: format!("{:?}: derivative vanished at x = {x}", self.method),
                });
            }
            let x_new = x - fx / slope;
            let f_new = f.value(x_new)?;
            slope = match self.method {
                Polishing::Newton | Polishing::Steffenson => df.value(x_new)?,
                Polishing::Secant => (f_new - fx) / (x_new - x),
            };
            let x_2 = x_1;
            x_1 = x;
            x = x_new;
            fx = f_new;

            if (x - x_1).abs() < abs_err + rel_err * x.abs() || fx == 0.0 {
                if self.method == Polishing::Steffenson && step >= 2 {
                    let denom = x - 2.0 * x_1 + x_2;
                    if denom != 0.0 {
                        let correction = (x - x_1) * (x - x_1) / denom;
                        if correction.abs() <= (x - x_1).abs() && f.belongs(x - correction) {
                            return Ok(x - correction);
                        }
                    }
                }
                return Ok(x);
            }
        }
        Err(Error::Convergence {
            iterations: max_steps,
            message: format!("{:?} root polishing from x0 = {x0}", self.method),
        })
    }
}
