//! Natural cubic spline interpolation.
//!
//! The spline is C² with zero second derivative at both end points.  The
//! second derivatives at the knots solve a tridiagonal system (Thomas
//! algorithm).

use dl_core::{errors::Result, Real};

use super::{check_nodes, locate, Interpolation1D};

/// Natural cubic spline.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Second derivative at each knot
    ms: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Build a natural cubic spline through the given data.
    ///
    /// With two points the spline is the straight line through them.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let n = xs.len();
        let xs = xs.to_vec();
        let ys = ys.to_vec();
        let mut ms = vec![0.0; n];

        if n > 2 {
            let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
            // interior unknowns m[1..n-1]
            let k = n - 2;
            let mut diag = vec![0.0; k];
            let mut upper = vec![0.0; k];
            let mut rhs = vec![0.0; k];
            for j in 0..k {
                let i = j + 1;
                diag[j] = 2.0 * (h[i - 1] + h[i]);
                upper[j] = h[i];
                rhs[j] = 6.0
                    * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
            }
            // forward sweep; the sub-diagonal entry of row j is h[j]
            for j in 1..k {
                let w = h[j] / diag[j - 1];
                diag[j] -= w * upper[j - 1];
                rhs[j] -= w * rhs[j - 1];
            }
            ms[k] = rhs[k - 1] / diag[k - 1];
            for j in (0..k - 1).rev() {
                ms[j + 1] = (rhs[j] - upper[j] * ms[j + 2]) / diag[j];
            }
        }

        Ok(Self { xs, ys, ms })
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.ms[i] + (b * b * b - b) * self.ms[i + 1]) * h * h / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reproduces_linear_data() {
        let xs = [0.0, 1.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 7.0, 9.0];
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(s.value(2.0), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.value(3.5), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn approximates_smooth_function() {
        let xs: Vec<Real> = (0..=20).map(|i| i as Real * 0.1).collect();
        let ys: Vec<Real> = xs.iter().map(|x| x.sin()).collect();
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        // away from the natural end conditions the spline is O(h⁴) accurate
        assert_abs_diff_eq!(s.value(1.05), 1.05_f64.sin(), epsilon = 1e-5);
    }
}
