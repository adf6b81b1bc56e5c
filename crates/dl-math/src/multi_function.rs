//! Real-valued functions of a fixed-dimension state vector.
//!
//! A [`MultiFunction`] is what a valuation routine hands back: the price as
//! a function of the model's initial state variables (spot, short-rate
//! shift, ...).  It follows the same lazy-composition rules as
//! [`Function`](crate::Function).

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use dl_core::{
    errors::{Error, Result},
    Real,
};

use crate::function::Function;

type Eval = Rc<dyn Fn(&[Real]) -> Real>;
type Domain = Rc<dyn Fn(&[Real]) -> bool>;

/// A shared, immutable function `R^dim → R` with a domain predicate.
#[derive(Clone)]
pub struct MultiFunction {
    dim: usize,
    eval: Eval,
    domain: Domain,
}

impl fmt::Debug for MultiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiFunction")
            .field("dim", &self.dim)
            .finish_non_exhaustive()
    }
}

impl MultiFunction {
    /// Build a function of `dim` variables with the given domain predicate.
    ///
    /// # Panics
    /// Panics if `dim == 0`.
    pub fn new<F, D>(dim: usize, f: F, domain: D) -> Self
    where
        F: Fn(&[Real]) -> Real + 'static,
        D: Fn(&[Real]) -> bool + 'static,
    {
        assert!(dim > 0, "a multi-function needs at least one variable");
        Self {
            dim,
            eval: Rc::new(f),
            domain: Rc::new(domain),
        }
    }

    /// Constant function on all of `R^dim`.
    pub fn constant(dim: usize, c: Real) -> Self {
        Self::new(dim, move |_| c, |_| true)
    }

    /// Lift a scalar function to a function of a one-dimensional state.
    pub fn from_function(f: Function) -> Self {
        let d = f.clone();
        Self::new(1, move |x: &[Real]| f.raw(x[0]), move |x: &[Real]| d.belongs(x[0]))
    }

    /// Number of state variables.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return `true` if `x` has the right dimension and lies in the domain.
    pub fn belongs(&self, x: &[Real]) -> bool {
        x.len() == self.dim && (self.domain)(x)
    }

    /// Evaluate at the state `x`.
    ///
    /// # Errors
    /// [`Error::Dimension`] if `x.len() != dim`, [`Error::Domain`] if `x` is
    /// outside the domain.
    pub fn value(&self, x: &[Real]) -> Result<Real> {
        if x.len() != self.dim {
            return Err(Error::Dimension {
                expected: self.dim,
                found: x.len(),
            });
        }
        if !(self.domain)(x) {
            return Err(Error::Domain { value: x[0] });
        }
        Ok((self.eval)(x))
    }

    /// Scalar function of component `index`, with the other components
    /// frozen at `state`.
    ///
    /// # Panics
    /// Panics if `state.len() != dim` or `index >= dim`.
    pub fn restrict(&self, index: usize, state: &[Real]) -> Function {
        assert_eq!(state.len(), self.dim, "state has the wrong dimension");
        assert!(index < self.dim, "component {index} out of range");
        let frozen: Rc<[Real]> = Rc::from(state);
        let frozen_d = Rc::clone(&frozen);
        let (eval, domain) = (Rc::clone(&self.eval), Rc::clone(&self.domain));
        Function::with_domain(
            move |x| {
                let mut s = frozen.to_vec();
                s[index] = x;
                eval(&s)
            },
            move |x| {
                let mut s = frozen_d.to_vec();
                s[index] = x;
                domain(&s)
            },
        )
    }

    /// Pointwise `op(self(x))`, same domain.
    pub fn map<O>(&self, op: O) -> MultiFunction
    where
        O: Fn(Real) -> Real + 'static,
    {
        let eval = Rc::clone(&self.eval);
        Self {
            dim: self.dim,
            eval: Rc::new(move |x: &[Real]| op(eval(x))),
            domain: Rc::clone(&self.domain),
        }
    }

    /// Pointwise `op(self(x), other(x))` on the intersection of the domains.
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn combine<O>(&self, other: &MultiFunction, op: O) -> MultiFunction
    where
        O: Fn(Real, Real) -> Real + 'static,
    {
        assert_eq!(
            self.dim, other.dim,
            "cannot combine multi-functions of different dimensions"
        );
        let (f, g) = (Rc::clone(&self.eval), Rc::clone(&other.eval));
        let (fd, gd) = (Rc::clone(&self.domain), Rc::clone(&other.domain));
        Self {
            dim: self.dim,
            eval: Rc::new(move |x: &[Real]| op(f(x), g(x))),
            domain: Rc::new(move |x: &[Real]| fd(x) && gd(x)),
        }
    }

    /// `exp(self)`.
    pub fn exp(&self) -> MultiFunction {
        self.map(Real::exp)
    }

    /// Natural logarithm of `self`.
    pub fn ln(&self) -> MultiFunction {
        self.map(Real::ln)
    }

    /// `|self|`.
    pub fn abs(&self) -> MultiFunction {
        self.map(Real::abs)
    }

    /// Pointwise maximum.
    pub fn max(&self, other: &MultiFunction) -> MultiFunction {
        self.combine(other, Real::max)
    }

    /// Pointwise minimum.
    pub fn min(&self, other: &MultiFunction) -> MultiFunction {
        self.combine(other, Real::min)
    }

    /// Pointwise maximum with a constant.
    pub fn max_scalar(&self, c: Real) -> MultiFunction {
        self.map(move |v| v.max(c))
    }

    /// Pointwise minimum with a constant.
    pub fn min_scalar(&self, c: Real) -> MultiFunction {
        self.map(move |v| v.min(c))
    }
}

macro_rules! multi_binary_op {
    ($Trait:ident, $method:ident, $op:tt) => {
        impl $Trait<&MultiFunction> for &MultiFunction {
            type Output = MultiFunction;
            fn $method(self, rhs: &MultiFunction) -> MultiFunction {
                self.combine(rhs, |a, b| a $op b)
            }
        }

        impl $Trait<MultiFunction> for MultiFunction {
            type Output = MultiFunction;
            fn $method(self, rhs: MultiFunction) -> MultiFunction {
                (&self).$method(&rhs)
            }
        }

        impl $Trait<Real> for &MultiFunction {
            type Output = MultiFunction;
            fn $method(self, rhs: Real) -> MultiFunction {
                self.map(move |a| a $op rhs)
            }
        }

        impl $Trait<Real> for MultiFunction {
            type Output = MultiFunction;
            fn $method(self, rhs: Real) -> MultiFunction {
                (&self).$method(rhs)
            }
        }

        impl $Trait<&MultiFunction> for Real {
            type Output = MultiFunction;
            fn $method(self, rhs: &MultiFunction) -> MultiFunction {
                rhs.map(move |b| self $op b)
            }
        }

        impl $Trait<MultiFunction> for Real {
            type Output = MultiFunction;
            fn $method(self, rhs: MultiFunction) -> MultiFunction {
                self.$method(&rhs)
            }
        }
    };
}

multi_binary_op!(Add, add, +);
multi_binary_op!(Sub, sub, -);
multi_binary_op!(Mul, mul, *);
multi_binary_op!(Div, div, /);

impl Neg for &MultiFunction {
    type Output = MultiFunction;
    fn neg(self) -> MultiFunction {
        self.map(|a| -a)
    }
}

impl Neg for MultiFunction {
    type Output = MultiFunction;
    fn neg(self) -> MultiFunction {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn positive_quadrant() -> MultiFunction {
        MultiFunction::new(2, |x| x[0] * x[1], |x| x[0] >= 0.0 && x[1] >= 0.0)
    }

    #[test]
    fn checks_dimension_then_domain() {
        let f = positive_quadrant();
        assert_abs_diff_eq!(f.value(&[2.0, 3.0]).unwrap(), 6.0);
        assert_eq!(
            f.value(&[1.0]),
            Err(Error::Dimension {
                expected: 2,
                found: 1
            })
        );
        assert!(matches!(f.value(&[-1.0, 1.0]), Err(Error::Domain { .. })));
    }

    #[test]
    fn composition_intersects_domains() {
        let f = positive_quadrant();
        let g = MultiFunction::new(2, |x| x[0] + x[1], |x| x[0] <= 1.0);
        let h = &f + &g;
        assert_abs_diff_eq!(h.value(&[1.0, 2.0]).unwrap(), 5.0);
        assert!(!h.belongs(&[2.0, 2.0]));
        assert!(!h.belongs(&[-0.5, 2.0]));
        let k = 2.0 * (&f - 1.0);
        assert_abs_diff_eq!(k.value(&[1.0, 2.0]).unwrap(), 2.0);
    }

    #[test]
    fn restrict_freezes_other_components() {
        let f = positive_quadrant();
        let g = f.restrict(1, &[3.0, 0.0]);
        assert_abs_diff_eq!(g.value(2.0).unwrap(), 6.0);
        assert!(!g.belongs(-1.0));
    }

    #[test]
    fn lifted_scalar_function_keeps_domain() {
        let f = MultiFunction::from_function(Function::on(|x| x * x, 0.0, 2.0));
        assert_eq!(f.dim(), 1);
        assert_abs_diff_eq!(f.value(&[1.5]).unwrap(), 2.25);
        assert!(matches!(f.value(&[2.5]), Err(Error::Domain { .. })));
    }
}
