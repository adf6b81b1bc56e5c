//! Fritsch–Carlson monotone cubic Hermite interpolation.
//!
//! Three-point slopes are limited segment by segment so that the interpolant
//! is monotone wherever the node values are.

use dl_core::{errors::Result, Real};

use super::{check_nodes, hermite, Interpolation1D};

/// Cubic Hermite spline with Fritsch–Carlson slope limiting.
#[derive(Debug, Clone)]
pub struct MonotoneCubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    slopes: Vec<Real>,
}

/// Scale the end slopes of a segment with secant `secant` back into the
/// circle `α² + β² ≤ 9`, or flatten them on a flat segment.
fn limit(secant: Real, left: &mut Real, right: &mut Real) {
    if secant == 0.0 {
        *left = 0.0;
        *right = 0.0;
        return;
    }
    let (alpha, beta) = (*left / secant, *right / secant);
    let r2 = alpha * alpha + beta * beta;
    if r2 > 9.0 {
        let tau = 3.0 / r2.sqrt();
        *left = tau * alpha * secant;
        *right = tau * beta * secant;
    }
}

impl MonotoneCubicSpline {
    /// Spline through `(xs[k], ys[k])`.
    ///
    /// # Errors
    /// Precondition failure on fewer than two nodes, mismatched lengths or
    /// non-increasing `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let secants: Vec<Real> = xs
            .windows(2)
            .zip(ys.windows(2))
            .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
            .collect();

        let n = xs.len();
        let mut slopes = Vec::with_capacity(n);
        slopes.push(secants[0]);
        slopes.extend(secants.windows(2).map(|d| 0.5 * (d[0] + d[1])));
        slopes.push(secants[n - 2]);

        for (k, &secant) in secants.iter().enumerate() {
            let (head, tail) = slopes.split_at_mut(k + 1);
            limit(secant, &mut head[k], &mut tail[0]);
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes,
        })
    }
}

impl Interpolation1D for MonotoneCubicSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        hermite(&self.xs, &self.ys, &self.slopes, x)
    }
}
