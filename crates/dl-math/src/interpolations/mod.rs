//! 1D interpolation backends and the [`Interp`] front end.
//!
//! An [`Interp`] is configured with a scheme, fed with nodes through
//! [`Interp::assign`], and turned into a [`Function`] through
//! [`Interp::interp`].  The resulting function is defined on
//! `[xs[0], xs[n-1]]` and passes through every node.

pub mod akima;
pub mod cubic;
pub mod monotone_cubic;
pub mod steffen;

use std::rc::Rc;

use dl_core::{ensure, errors::Result, Real};

use crate::function::Function;

pub use akima::AkimaSpline;
pub use cubic::CubicNaturalSpline;
pub use monotone_cubic::MonotoneCubicSpline;
pub use steffen::SteffenSpline;

/// A 1D interpolant `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolant at `x`.
    fn value(&self, x: Real) -> Real;

    /// Lower bound of the interpolation range.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation range.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Binary search: find `i` such that `xs[i] <= x < xs[i+1]`, clamped to
/// `[0, n-2]`.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Cubic Hermite evaluation given node slopes `ts`.
pub(crate) fn hermite(xs: &[Real], ys: &[Real], ts: &[Real], x: Real) -> Real {
    let lo = locate(xs, x);
    let hi = lo + 1;
    let h = xs[hi] - xs[lo];
    let t = (x - xs[lo]) / h;
    let h00 = (1.0 + 2.0 * t) * (1.0 - t) * (1.0 - t);
    let h10 = t * (1.0 - t) * (1.0 - t);
    let h01 = t * t * (3.0 - 2.0 * t);
    let h11 = t * t * (t - 1.0);
    h00 * ys[lo] + h10 * h * ts[lo] + h01 * ys[hi] + h11 * h * ts[hi]
}

/// Validate interpolation nodes: matching lengths, at least `min_points`,
/// strictly increasing abscissae.
pub(crate) fn check_nodes(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    ensure!(
        xs.len() == ys.len(),
        "xs and ys must have the same length ({} vs {})",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.len() >= min_points,
        "need at least {min_points} points for interpolation, got {}",
        xs.len()
    );
    ensure!(
        xs.windows(2).all(|w| w[0] < w[1]),
        "interpolation nodes must be strictly increasing"
    );
    Ok(())
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and matching `ys`.
    ///
    /// # Errors
    /// Returns an error if the slices have different lengths, fewer than 2
    /// points, or `xs` is not strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = self.xs[i + 1] - self.xs[i];
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}

// ── Front end ─────────────────────────────────────────────────────────────────

/// Interpolation scheme selected by an [`Interp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpScheme {
    /// Piecewise linear.
    Linear,
    /// Natural cubic spline (zero second derivative at both ends).
    CubicNatural,
    /// Akima spline.
    Akima,
    /// Steffen's monotone cubic.
    Steffen,
    /// Fritsch–Carlson monotone cubic.
    MonotoneCubic,
}

/// Configurable interpolation engine: pick a scheme, assign nodes, and
/// obtain the interpolant as a [`Function`].
///
/// ```
/// use dl_math::Interp;
///
/// let mut interp = Interp::linear();
/// interp.assign(&[0.0, 1.0, 2.0], &[0.0, 2.0, 3.0]).unwrap();
/// let f = interp.interp().unwrap();
/// assert!((f.value(1.5).unwrap() - 2.5).abs() < 1e-12);
/// assert!(f.value(2.5).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Interp {
    scheme: InterpScheme,
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl Interp {
    /// Engine for the given scheme, with no nodes assigned yet.
    pub fn new(scheme: InterpScheme) -> Self {
        Self {
            scheme,
            xs: Vec::new(),
            ys: Vec::new(),
        }
    }

    /// Piecewise-linear engine.
    pub fn linear() -> Self {
        Self::new(InterpScheme::Linear)
    }

    /// Natural cubic spline engine.
    pub fn cubic() -> Self {
        Self::new(InterpScheme::CubicNatural)
    }

    /// Akima spline engine.
    pub fn akima() -> Self {
        Self::new(InterpScheme::Akima)
    }

    /// Steffen monotone engine.
    pub fn steffen() -> Self {
        Self::new(InterpScheme::Steffen)
    }

    /// Fritsch–Carlson monotone engine.
    pub fn monotone_cubic() -> Self {
        Self::new(InterpScheme::MonotoneCubic)
    }

    /// The configured scheme.
    pub fn scheme(&self) -> InterpScheme {
        self.scheme
    }

    /// Assign the interpolation nodes, replacing any previous assignment.
    ///
    /// # Errors
    /// Precondition failure if the lengths differ, fewer than two nodes are
    /// given, or `xs` is not strictly increasing.
    pub fn assign(&mut self, xs: &[Real], ys: &[Real]) -> Result<()> {
        check_nodes(xs, ys, 2)?;
        self.xs = xs.to_vec();
        self.ys = ys.to_vec();
        Ok(())
    }

    /// Build the interpolant of the assigned nodes.
    ///
    /// # Errors
    /// Precondition failure if [`assign`](Self::assign) has not been called.
    pub fn interp(&self) -> Result<Function> {
        ensure!(!self.xs.is_empty(), "no nodes assigned to the interpolation");
        let inner: Rc<dyn Interpolation1D> = match self.scheme {
            InterpScheme::Linear => Rc::new(LinearInterpolation::new(&self.xs, &self.ys)?),
            InterpScheme::CubicNatural => Rc::new(CubicNaturalSpline::new(&self.xs, &self.ys)?),
            InterpScheme::Akima => Rc::new(AkimaSpline::new(&self.xs, &self.ys)?),
            InterpScheme::Steffen => Rc::new(SteffenSpline::new(&self.xs, &self.ys)?),
            InterpScheme::MonotoneCubic => {
                Rc::new(MonotoneCubicSpline::new(&self.xs, &self.ys)?)
            }
        };
        tracing::debug!(
            scheme = ?self.scheme,
            nodes = self.xs.len(),
            "built interpolant"
        );
        let (lo, hi) = (inner.x_min(), inner.x_max());
        Ok(Function::on(move |x| inner.value(x), lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_interpolation() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 4.0];
        let interp = LinearInterpolation::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(interp.value(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.value(1.5), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn every_scheme_reproduces_nodes() {
        let xs = [0.0, 0.5, 1.0, 2.0, 3.5, 5.0];
        let ys = [1.0, 0.98, 0.95, 0.9, 0.82, 0.75];
        for scheme in [
            InterpScheme::Linear,
            InterpScheme::CubicNatural,
            InterpScheme::Akima,
            InterpScheme::Steffen,
            InterpScheme::MonotoneCubic,
        ] {
            let mut interp = Interp::new(scheme);
            interp.assign(&xs, &ys).unwrap();
            let f = interp.interp().unwrap();
            for (&x, &y) in xs.iter().zip(ys.iter()) {
                assert_abs_diff_eq!(f.value(x).unwrap(), y, epsilon = 1e-12);
            }
            assert!(!f.belongs(5.1), "{scheme:?} domain too wide");
            assert!(!f.belongs(-0.1), "{scheme:?} domain too wide");
        }
    }

    #[test]
    fn assign_validates_nodes() {
        let mut interp = Interp::cubic();
        assert!(interp.assign(&[0.0, 1.0], &[1.0]).is_err());
        assert!(interp.assign(&[0.0], &[1.0]).is_err());
        assert!(interp.assign(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(interp.interp().is_err());
    }

    #[test]
    fn reassign_replaces_nodes() {
        let mut interp = Interp::linear();
        interp.assign(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        let f = interp.interp().unwrap();
        interp.assign(&[0.0, 1.0], &[0.0, 3.0]).unwrap();
        let g = interp.interp().unwrap();
        assert_abs_diff_eq!(f.value(0.5).unwrap(), 0.5);
        assert_abs_diff_eq!(g.value(0.5).unwrap(), 1.5);
    }
}
