//! Linear least-squares fitting of curves.
//!
//! A [`Fit`] regresses data on a declared basis of [`Function`]s plus an
//! optional fixed ("free") term:
//!
//! $$ y(x) \approx f_0(x) + \sum_j c_j\,\varphi_j(x). $$
//!
//! The normal equations are never formed: the (weighted) design matrix is
//! decomposed by SVD and small singular values are thresholded away.

use nalgebra::{DMatrix, DVector};

use dl_core::{ensure, errors::Result, Real};

use crate::function::Function;

/// Result record of a least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitParam {
    /// Fitted coefficients, one per basis function.
    pub fit: Vec<Real>,
    /// Covariance matrix of the coefficients.
    pub cov: DMatrix<Real>,
    /// Total (weighted) squared residual.
    pub chi2: Real,
}

/// Linear least-squares engine over a fixed basis.
///
/// ```
/// use dl_math::{Fit, Function};
///
/// let basis = vec![Function::new(|_| 1.0), Function::new(|x| x)];
/// let mut fit = Fit::linear(basis);
/// fit.assign(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
/// let f = fit.fit().unwrap();
/// assert!((f.value(3.0).unwrap() - 7.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct Fit {
    basis: Vec<Function>,
    free: Option<Function>,
    param: Option<FitParam>,
}

impl Fit {
    /// Regression on `basis` with no fixed term.
    ///
    /// # Panics
    /// Panics if `basis` is empty.
    pub fn linear(basis: Vec<Function>) -> Self {
        assert!(!basis.is_empty(), "a fit needs at least one basis function");
        Self {
            basis,
            free: None,
            param: None,
        }
    }

    /// Regression on `basis` of the residual `y - free(x)`.
    ///
    /// # Panics
    /// Panics if `basis` is empty.
    pub fn linear_with_free(basis: Vec<Function>, free: Function) -> Self {
        Self {
            free: Some(free),
            ..Self::linear(basis)
        }
    }

    /// Number of basis functions.
    pub fn dim(&self) -> usize {
        self.basis.len()
    }

    /// Fit unweighted data.
    ///
    /// The coefficient covariance is scaled by the residual variance
    /// `chi2 / (n - p)`; with `n == p` it is zero.
    ///
    /// # Errors
    /// Precondition failure on mismatched lengths, fewer points than basis
    /// functions, or a point outside the domain of the basis.
    pub fn assign(&mut self, xs: &[Real], ys: &[Real]) -> Result<()> {
        let ws = vec![1.0; xs.len()];
        self.solve(xs, ys, &ws, true)
    }

    /// Fit data with per-point weights (inverse variances).
    ///
    /// The coefficient covariance is `(AᵀWA)⁻¹`.
    ///
    /// # Errors
    /// As [`assign`](Self::assign), plus non-positive weights.
    pub fn assign_weighted(&mut self, xs: &[Real], ys: &[Real], ws: &[Real]) -> Result<()> {
        ensure!(
            ws.len() == xs.len(),
            "weights must match the data length ({} vs {})",
            ws.len(),
            xs.len()
        );
        ensure!(ws.iter().all(|&w| w > 0.0), "weights must be positive");
        self.solve(xs, ys, ws, false)
    }

    fn solve(&mut self, xs: &[Real], ys: &[Real], ws: &[Real], scale: bool) -> Result<()> {
        let n = xs.len();
        let p = self.basis.len();
        ensure!(n == ys.len(), "xs and ys must have the same length");
        ensure!(n >= p, "{n} points cannot determine {p} coefficients");
        ensure!(
            xs.iter().all(|&x| self.in_domain(x)),
            "data points must lie in the domain of the basis"
        );

        let target: Vec<Real> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| y - self.free.as_ref().map_or(0.0, |f| f.raw(x)))
            .collect();

        // weighted design matrix: row i scaled by sqrt(w_i)
        let a = DMatrix::from_fn(n, p, |i, j| ws[i].sqrt() * self.basis[j].raw(xs[i]));
        let b = DVector::from_fn(n, |i, _| ws[i].sqrt() * target[i]);

        let svd = a.clone().svd(true, true);
        let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
            dl_core::fail!("singular value decomposition did not converge");
        };
        let sv = &svd.singular_values;
        let sv_max = sv.iter().copied().fold(0.0_f64, f64::max);
        let threshold = n.max(p) as Real * f64::EPSILON * sv_max;

        let ut_b = u.transpose() * &b;
        let mut coef = DVector::zeros(p);
        let mut cov = DMatrix::zeros(p, p);
        for k in 0..sv.len() {
            let s = sv[k];
            if s <= threshold {
                continue;
            }
            let v_k = v_t.row(k).transpose();
            coef += &v_k * (ut_b[k] / s);
            cov += &v_k * v_k.transpose() / (s * s);
        }

        let resid = &b - &a * &coef;
        let chi2 = resid.norm_squared();
        if scale {
            let factor = if n > p { chi2 / (n - p) as Real } else { 0.0 };
            cov *= factor;
        }

        tracing::debug!(points = n, basis = p, chi2, "least-squares fit");
        self.param = Some(FitParam {
            fit: coef.iter().copied().collect(),
            cov,
            chi2,
        });
        Ok(())
    }

    fn in_domain(&self, x: Real) -> bool {
        self.basis.iter().all(|f| f.belongs(x))
            && self.free.as_ref().map_or(true, |f| f.belongs(x))
    }

    fn fitted(&self) -> Result<&FitParam> {
        match &self.param {
            Some(p) => Ok(p),
            None => dl_core::fail!("no data assigned to the fit"),
        }
    }

    /// The fitted curve `free + Σ c_j φ_j`.
    ///
    /// # Errors
    /// Runtime error if no data has been assigned.
    pub fn fit(&self) -> Result<Function> {
        let param = self.fitted()?;
        let mut curve = self
            .free
            .clone()
            .unwrap_or_else(|| Function::new(|_| 0.0));
        for (c, phi) in param.fit.iter().zip(&self.basis) {
            curve = curve + *c * phi;
        }
        Ok(curve)
    }

    /// Standard error of the fitted value, `sqrt(φ(x)ᵀ Cov φ(x))`.
    ///
    /// # Errors
    /// Runtime error if no data has been assigned.
    pub fn err(&self) -> Result<Function> {
        let cov = self.fitted()?.cov.clone();
        let basis = self.basis.clone();
        let domain = basis.clone();
        Ok(Function::with_domain(
            move |x| {
                let phi = DVector::from_iterator(basis.len(), basis.iter().map(|f| f.raw(x)));
                phi.dot(&(&cov * &phi)).max(0.0).sqrt()
            },
            move |x| domain.iter().all(|f| f.belongs(x)),
        ))
    }

    /// Fitted coefficients, covariance, and total squared error.
    ///
    /// # Errors
    /// Runtime error if no data has been assigned.
    pub fn param(&self) -> Result<FitParam> {
        self.fitted().cloned()
    }
}
