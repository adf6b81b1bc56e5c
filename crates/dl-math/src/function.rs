//! Real-valued functions of one variable with an explicit domain.
//!
//! [`Function`] is the currency of the curve layer: discount, yield,
//! forward, volatility and carry curves are all `Function`s, and so are the
//! outputs of the interpolation and fitting backends.
//!
//! Composition is lazy.  `&f + &g` does not evaluate anything; it captures
//! both operands and evaluates them again on every call.  Composed functions
//! are therefore restartable and cheap to build, and nothing is cached.
//!
//! The domain of a composition is the intersection of the operand domains.
//! For `/` zero denominators are not excluded from the domain: they surface
//! at evaluation time as `inf`/`NaN`.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use dl_core::{
    errors::{Error, Result},
    Real,
};

/// A real function of one variable together with its domain.
///
/// Implement this trait for function objects whose domain is not an
/// interval; wrap them with [`Function::from_impl`].
pub trait ScalarFn {
    /// Evaluate at `x`.  Called only for `x` with `belongs(x) == true`.
    fn value(&self, x: Real) -> Real;

    /// Domain membership predicate.
    fn belongs(&self, x: Real) -> bool;
}

struct Closure<F, D> {
    f: F,
    domain: D,
}

impl<F, D> ScalarFn for Closure<F, D>
where
    F: Fn(Real) -> Real,
    D: Fn(Real) -> bool,
{
    fn value(&self, x: Real) -> Real {
        (self.f)(x)
    }

    fn belongs(&self, x: Real) -> bool {
        (self.domain)(x)
    }
}

/// A shared, immutable, lazily composable function `R → R`.
///
/// Cloning is cheap (reference counted).
#[derive(Clone)]
pub struct Function(Rc<dyn ScalarFn>);

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").finish_non_exhaustive()
    }
}

impl Function {
    /// Function defined on the whole real line.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Real) -> Real + 'static,
    {
        Self::with_domain(f, |_| true)
    }

    /// Function defined on the closed interval `[lower, upper]`.
    ///
    /// Either bound may be infinite.
    ///
    /// # Panics
    /// Panics if `lower > upper`.
    pub fn on<F>(f: F, lower: Real, upper: Real) -> Self
    where
        F: Fn(Real) -> Real + 'static,
    {
        assert!(lower <= upper, "empty domain [{lower}, {upper}]");
        Self::with_domain(f, move |x| lower <= x && x <= upper)
    }

    /// Function defined on `[lower, +inf)`.
    pub fn from_lower<F>(f: F, lower: Real) -> Self
    where
        F: Fn(Real) -> Real + 'static,
    {
        Self::on(f, lower, Real::INFINITY)
    }

    /// Constant function `c` on `[lower, +inf)`.
    pub fn constant(c: Real, lower: Real) -> Self {
        Self::from_lower(move |_| c, lower)
    }

    /// Function with an arbitrary domain predicate.
    pub fn with_domain<F, D>(f: F, domain: D) -> Self
    where
        F: Fn(Real) -> Real + 'static,
        D: Fn(Real) -> bool + 'static,
    {
        Self(Rc::new(Closure { f, domain }))
    }

    /// Wrap a user implementation of [`ScalarFn`].
    pub fn from_impl(inner: Rc<dyn ScalarFn>) -> Self {
        Self(inner)
    }

    /// Return `true` if `x` belongs to the domain.
    pub fn belongs(&self, x: Real) -> bool {
        self.0.belongs(x)
    }

    /// Evaluate at `x`.
    ///
    /// # Errors
    /// [`Error::Domain`] if `x` is outside the domain.
    pub fn value(&self, x: Real) -> Result<Real> {
        if !self.0.belongs(x) {
            return Err(Error::Domain { value: x });
        }
        Ok(self.0.value(x))
    }

    // Evaluation without the domain check, for compositions whose own
    // domain predicate already implies membership.
    pub(crate) fn raw(&self, x: Real) -> Real {
        self.0.value(x)
    }

    /// Pointwise `op(self(x))`, same domain.
    pub fn map<O>(&self, op: O) -> Function
    where
        O: Fn(Real) -> Real + 'static,
    {
        let f = self.clone();
        let d = self.clone();
        Function::with_domain(move |x| op(f.raw(x)), move |x| d.belongs(x))
    }

    /// Pointwise `op(self(x), other(x))` on the intersection of the domains.
    pub fn combine<O>(&self, other: &Function, op: O) -> Function
    where
        O: Fn(Real, Real) -> Real + 'static,
    {
        let (f, g) = (self.clone(), other.clone());
        let (fd, gd) = (self.clone(), other.clone());
        Function::with_domain(
            move |x| op(f.raw(x), g.raw(x)),
            move |x| fd.belongs(x) && gd.belongs(x),
        )
    }

    /// The composition `self ∘ inner`.
    ///
    /// Defined where `inner` is defined and `inner(x)` lies in the domain of
    /// `self`.
    pub fn compose(&self, inner: &Function) -> Function {
        let (f, g) = (self.clone(), inner.clone());
        let (fd, gd) = (self.clone(), inner.clone());
        Function::with_domain(
            move |x| f.raw(g.raw(x)),
            move |x| gd.belongs(x) && fd.belongs(gd.raw(x)),
        )
    }

    /// `exp(self)`.
    pub fn exp(&self) -> Function {
        self.map(Real::exp)
    }

    /// Natural logarithm of `self`.
    pub fn ln(&self) -> Function {
        self.map(Real::ln)
    }

    /// Square root of `self`.
    pub fn sqrt(&self) -> Function {
        self.map(Real::sqrt)
    }

    /// `|self|`.
    pub fn abs(&self) -> Function {
        self.map(Real::abs)
    }

    /// Pointwise maximum with another function.
    pub fn max(&self, other: &Function) -> Function {
        self.combine(other, Real::max)
    }

    /// Pointwise minimum with another function.
    pub fn min(&self, other: &Function) -> Function {
        self.combine(other, Real::min)
    }

    /// Pointwise maximum with a constant.
    pub fn max_scalar(&self, c: Real) -> Function {
        self.map(move |v| v.max(c))
    }

    /// Pointwise minimum with a constant.
    pub fn min_scalar(&self, c: Real) -> Function {
        self.map(move |v| v.min(c))
    }
}

macro_rules! function_binary_op {
    ($Trait:ident, $method:ident, $op:tt) => {
        impl $Trait<&Function> for &Function {
            type Output = Function;
            fn $method(self, rhs: &Function) -> Function {
                self.combine(rhs, |a, b| a $op b)
            }
        }

        impl $Trait<Function> for Function {
            type Output = Function;
            fn $method(self, rhs: Function) -> Function {
                (&self).$method(&rhs)
            }
        }

        impl $Trait<&Function> for Function {
            type Output = Function;
            fn $method(self, rhs: &Function) -> Function {
                (&self).$method(rhs)
            }
        }

        impl $Trait<Function> for &Function {
            type Output = Function;
            fn $method(self, rhs: Function) -> Function {
                self.$method(&rhs)
            }
        }

        impl $Trait<Real> for &Function {
            type Output = Function;
            fn $method(self, rhs: Real) -> Function {
                self.map(move |a| a $op rhs)
            }
        }

        impl $Trait<Real> for Function {
            type Output = Function;
            fn $method(self, rhs: Real) -> Function {
                (&self).$method(rhs)
            }
        }

        impl $Trait<&Function> for Real {
            type Output = Function;
            fn $method(self, rhs: &Function) -> Function {
                rhs.map(move |b| self $op b)
            }
        }

        impl $Trait<Function> for Real {
            type Output = Function;
            fn $method(self, rhs: Function) -> Function {
                self.$method(&rhs)
            }
        }
    };
}

function_binary_op!(Add, add, +);
function_binary_op!(Sub, sub, -);
function_binary_op!(Mul, mul, *);
function_binary_op!(Div, div, /);

impl Neg for &Function {
    type Output = Function;
    fn neg(self) -> Function {
        self.map(|a| -a)
    }
}

impl Neg for Function {
    type Output = Function;
    fn neg(self) -> Function {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn evaluation_checks_domain() {
        let f = Function::on(|x| x * x, 0.0, 1.0);
        assert_abs_diff_eq!(f.value(0.5).unwrap(), 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(f.value(1.0).unwrap(), 1.0, epsilon = 1e-15);
        assert_eq!(f.value(1.5), Err(Error::Domain { value: 1.5 }));
        assert!(!f.belongs(-0.1));
    }

    #[test]
    fn arithmetic_with_scalars() {
        let f = Function::new(|x| x);
        let g = 2.0 * &f + 1.0;
        assert_abs_diff_eq!(g.value(3.0).unwrap(), 7.0, epsilon = 1e-15);
        let h = 1.0 - &f / 4.0;
        assert_abs_diff_eq!(h.value(2.0).unwrap(), 0.5, epsilon = 1e-15);
        let n = -f;
        assert_abs_diff_eq!(n.value(2.0).unwrap(), -2.0, epsilon = 1e-15);
    }

    #[test]
    fn unary_maps() {
        let f = Function::new(|x| x - 1.0);
        assert_abs_diff_eq!(f.exp().value(1.0).unwrap(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(f.abs().value(-1.0).unwrap(), 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(f.max_scalar(0.0).value(0.0).unwrap(), 0.0);
        assert_abs_diff_eq!(f.min_scalar(0.0).value(0.0).unwrap(), -1.0);
        let g = Function::from_lower(|x| x, 0.0);
        assert_abs_diff_eq!(g.ln().value(std::f64::consts::E).unwrap(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(g.sqrt().value(9.0).unwrap(), 3.0, epsilon = 1e-15);
    }

    #[test]
    fn composition_domain() {
        let outer = Function::from_lower(Real::ln, 0.0);
        let inner = Function::new(|x| x - 1.0);
        let h = outer.compose(&inner);
        assert!(h.belongs(2.0));
        assert!(!h.belongs(0.5));
        assert_abs_diff_eq!(h.value(1.0 + std::f64::consts::E).unwrap(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn division_by_zero_is_deferred() {
        let f = Function::new(|_| 1.0);
        let g = Function::new(|x| x);
        let h = &f / &g;
        assert!(h.belongs(0.0));
        assert!(h.value(0.0).unwrap().is_infinite());
    }

    #[test]
    fn composed_functions_are_restartable() {
        let f = Function::new(|x| x * x);
        let g = f.max(&Function::new(|x| 2.0 * x));
        for _ in 0..3 {
            assert_abs_diff_eq!(g.value(1.0).unwrap(), 2.0);
            assert_abs_diff_eq!(g.value(3.0).unwrap(), 9.0);
        }
    }

    proptest! {
        #[test]
        fn domain_is_intersection(
            a in -10.0..10.0_f64,
            b in -10.0..10.0_f64,
            c in -10.0..10.0_f64,
            d in -10.0..10.0_f64,
            x in -12.0..12.0_f64,
        ) {
            let f = Function::on(|x| x, a.min(b), a.max(b));
            let g = Function::on(|x| 2.0 * x, c.min(d), c.max(d));
            let expected = f.belongs(x) && g.belongs(x);
            prop_assert_eq!((&f + &g).belongs(x), expected);
            prop_assert_eq!((&f - &g).belongs(x), expected);
            prop_assert_eq!((&f * &g).belongs(x), expected);
            prop_assert_eq!(f.max(&g).belongs(x), expected);
            prop_assert_eq!(f.min(&g).belongs(x), expected);
            prop_assert_eq!((&f / &g).belongs(x), expected);
        }
    }
}
