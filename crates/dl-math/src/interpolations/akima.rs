//! Akima (1970) cubic Hermite interpolation.
//!
//! The slope at a node is a blend of the two adjacent secants, weighted by
//! how much the secants on the far side change.  Isolated outliers therefore
//! disturb only the nearby segments.

use dl_core::{errors::Result, Real};

use super::{check_nodes, hermite, Interpolation1D};

/// Akima spline.
#[derive(Debug, Clone)]
pub struct AkimaSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    slopes: Vec<Real>,
}

impl AkimaSpline {
    /// Spline through `(xs[k], ys[k])`.
    ///
    /// With fewer than 5 nodes the phantom boundary slopes degenerate and
    /// the spline falls back to simpler slope estimates.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let n = xs.len();
        let xs = xs.to_vec();
        let ys = ys.to_vec();

        let m: Vec<Real> = (0..n - 1)
            .map(|i| (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))
            .collect();
        let nm = m.len();

        // Phantom slopes by linear extrapolation of the secants
        let (m_neg2, m_neg1, m_np1, m_np2) = if nm >= 2 {
            (
                3.0 * m[0] - 2.0 * m[1],
                2.0 * m[0] - m[1],
                2.0 * m[nm - 1] - m[nm - 2],
                3.0 * m[nm - 1] - 2.0 * m[nm - 2],
            )
        } else {
            (m[0], m[0], m[0], m[0])
        };

        let mut ext = Vec::with_capacity(nm + 4);
        ext.push(m_neg2);
        ext.push(m_neg1);
        ext.extend_from_slice(&m);
        ext.push(m_np1);
        ext.push(m_np2);

        let slopes = (0..n)
            .map(|i| {
                let idx = i + 2;
                let w1 = (ext[idx + 1] - ext[idx]).abs();
                let w2 = (ext[idx - 1] - ext[idx - 2]).abs();
                if w1 + w2 < 1e-30 {
                    0.5 * (ext[idx - 1] + ext[idx])
                } else {
                    (w1 * ext[idx - 1] + w2 * ext[idx]) / (w1 + w2)
                }
            })
            .collect();

        Ok(Self { xs, ys, slopes })
    }
}

impl Interpolation1D for AkimaSpline {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn akima_linear_data_is_exact() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5];
        let s = AkimaSpline::new(&xs, &ys).unwrap();
        let v = s.value(2.5);
        assert!((v - 1.25).abs() < 1e-10, "expected 1.25, got {v}");
    }
}
