//! Steffen's monotone cubic interpolation.
//!
//! Slopes at interior knots are limited so that the interpolant has no
//! extrema other than at the data points.  End slopes are the adjacent
//! secants.

use dl_core::{errors::Result, Real};

use super::{check_nodes, hermite, Interpolation1D};

/// Steffen monotone cubic spline.
#[derive(Debug, Clone)]
pub struct SteffenSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    ts: Vec<Real>,
}

impl SteffenSpline {
    /// Build a Steffen spline through the given data.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let n = xs.len();
        let xs = xs.to_vec();
        let ys = ys.to_vec();

        let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s: Vec<Real> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

        let mut ts = vec![0.0; n];
        ts[0] = s[0];
        ts[n - 1] = s[n - 2];
        for i in 1..n - 1 {
            let p = (s[i - 1] * h[i] + s[i] * h[i - 1]) / (h[i - 1] + h[i]);
            let bound = s[i - 1].abs().min(s[i].abs()).min(0.5 * p.abs());
            ts[i] = (s[i - 1].signum() + s[i].signum()) * bound;
        }

        Ok(Self { xs, ys, ts })
    }
}

impl Interpolation1D for SteffenSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        hermite(&self.xs, &self.ys, &self.ts, x)
    }
}
