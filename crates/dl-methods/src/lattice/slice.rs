//! Payoff slices on an event-time lattice.
//!
//! A [`Slice`] is a random variable measurable at one event time `t_i`,
//! stored as one value per lattice node.  Pointwise operators build new
//! slices at the same index; [`Slice::rollback`] is the only operation that
//! moves a slice to another index, and only backwards.
//!
//! Mixing slices of different event indices, or of different event-time
//! assignments, in one pointwise operation is a contract violation and
//! panics.

use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign,
};
use std::rc::Rc;

use dl_core::{ensure, errors::Result, Real, Time};
use dl_math::MultiFunction;

use super::StateLattice;

/// A payoff at a single event time.
#[derive(Clone)]
pub struct Slice {
    index: usize,
    values: Vec<Real>,
    lattice: Rc<dyn StateLattice>,
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slice")
            .field("index", &self.index)
            .field("time", &self.time())
            .field("nodes", &self.values.len())
            .finish()
    }
}

impl Slice {
    /// Slice with the given node values at event index `index`.
    ///
    /// # Errors
    /// Precondition failure if `index` is outside the grid or `values` does
    /// not have one entry per node.
    pub fn new(lattice: Rc<dyn StateLattice>, index: usize, values: Vec<Real>) -> Result<Self> {
        lattice.grid().check_index(index)?;
        let nodes = lattice.size(index);
        ensure!(
            values.len() == nodes,
            "a slice at index {index} needs {nodes} values, got {}",
            values.len()
        );
        Ok(Self {
            index,
            values,
            lattice,
        })
    }

    /// Deterministic slice equal to `c` on every node.
    ///
    /// # Errors
    /// Precondition failure if `index` is outside the grid.
    pub fn constant(lattice: Rc<dyn StateLattice>, index: usize, c: Real) -> Result<Self> {
        lattice.grid().check_index(index)?;
        let values = vec![c; lattice.size(index)];
        Ok(Self {
            index,
            values,
            lattice,
        })
    }

    /// Event index of the slice.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Event time of the slice.
    pub fn time(&self) -> Time {
        self.lattice.grid().time(self.index)
    }

    /// Node values.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// The lattice (model session) the slice lives on.
    pub fn lattice(&self) -> &Rc<dyn StateLattice> {
        &self.lattice
    }

    /// Replace the slice by its discounted conditional expectation at event
    /// index `to`.
    ///
    /// # Errors
    /// Precondition failure unless `to < self.index()`.
    pub fn rollback(&mut self, to: usize) -> Result<()> {
        ensure!(
            to < self.index,
            "cannot roll back a slice at index {} to index {to}",
            self.index
        );
        tracing::trace!(from = self.index, to, "rollback");
        let values = std::mem::take(&mut self.values);
        self.values = self.lattice.rollback(values, self.index, to);
        self.index = to;
        Ok(())
    }

    /// By-value form of [`rollback`](Self::rollback).
    ///
    /// # Errors
    /// Precondition failure unless `to < self.index()`.
    pub fn rolled_back(mut self, to: usize) -> Result<Self> {
        self.rollback(to)?;
        Ok(self)
    }

    /// Value at the node of the model's recorded initial state.
    ///
    /// # Errors
    /// Precondition failure unless the slice is at index 0.
    pub fn origin_value(&self) -> Result<Real> {
        ensure!(
            self.index == 0,
            "the slice is at index {}, roll it back to 0 first",
            self.index
        );
        Ok(self.values[self.lattice.origin()])
    }

    fn assert_compatible(&self, other: &Slice) {
        assert!(
            Rc::ptr_eq(&self.lattice, &other.lattice),
            "slices belong to different event-time assignments"
        );
        assert_eq!(
            self.index, other.index,
            "slices live at different event indices"
        );
    }

    /// Pointwise `op(self)`.
    pub fn map<O>(&self, op: O) -> Slice
    where
        O: Fn(Real) -> Real,
    {
        let mut out = self.clone();
        out.apply(op);
        out
    }

    /// Pointwise `op(self, other)`.
    ///
    /// # Panics
    /// Panics if the slices are at different indices or on different
    /// lattices.
    pub fn combine<O>(&self, other: &Slice, op: O) -> Slice
    where
        O: Fn(Real, Real) -> Real,
    {
        let mut out = self.clone();
        out.apply_with(other, op);
        out
    }

    fn apply<O: Fn(Real) -> Real>(&mut self, op: O) {
        self.values.iter_mut().for_each(|v| *v = op(*v));
    }

    fn apply_with<O: Fn(Real, Real) -> Real>(&mut self, other: &Slice, op: O) {
        self.assert_compatible(other);
        self.values
            .iter_mut()
            .zip(&other.values)
            .for_each(|(v, &w)| *v = op(*v, w));
    }

    /// `exp(self)`.
    pub fn exp(&self) -> Slice {
        self.map(Real::exp)
    }

    /// Natural logarithm.
    pub fn ln(&self) -> Slice {
        self.map(Real::ln)
    }

    /// Square root.
    pub fn sqrt(&self) -> Slice {
        self.map(Real::sqrt)
    }

    /// `|self|`.
    pub fn abs(&self) -> Slice {
        self.map(Real::abs)
    }

    /// Pointwise maximum.
    pub fn max(&self, other: &Slice) -> Slice {
        self.combine(other, Real::max)
    }

    /// Pointwise minimum.
    pub fn min(&self, other: &Slice) -> Slice {
        self.combine(other, Real::min)
    }

    /// Pointwise maximum with a constant.
    pub fn max_scalar(&self, c: Real) -> Slice {
        self.map(|v| v.max(c))
    }

    /// Pointwise minimum with a constant.
    pub fn min_scalar(&self, c: Real) -> Slice {
        self.map(|v| v.min(c))
    }
}

macro_rules! slice_binary_op {
    ($Trait:ident, $method:ident, $AssignTrait:ident, $assign:ident, $op:tt) => {
        impl $AssignTrait<&Slice> for Slice {
            fn $assign(&mut self, rhs: &Slice) {
                self.apply_with(rhs, |a, b| a $op b);
            }
        }

        impl $AssignTrait<Slice> for Slice {
            fn $assign(&mut self, rhs: Slice) {
                self.apply_with(&rhs, |a, b| a $op b);
            }
        }

        impl $AssignTrait<Real> for Slice {
            fn $assign(&mut self, rhs: Real) {
                self.apply(|a| a $op rhs);
            }
        }

        impl $Trait<&Slice> for &Slice {
            type Output = Slice;
            fn $method(self, rhs: &Slice) -> Slice {
                self.combine(rhs, |a, b| a $op b)
            }
        }

        impl $Trait<Slice> for &Slice {
            type Output = Slice;
            fn $method(self, rhs: Slice) -> Slice {
                self.combine(&rhs, |a, b| a $op b)
            }
        }

        impl $Trait<&Slice> for Slice {
            type Output = Slice;
            fn $method(mut self, rhs: &Slice) -> Slice {
                self.apply_with(rhs, |a, b| a $op b);
                self
            }
        }

        impl $Trait<Slice> for Slice {
            type Output = Slice;
            fn $method(mut self, rhs: Slice) -> Slice {
                self.apply_with(&rhs, |a, b| a $op b);
                self
            }
        }

        impl $Trait<Real> for &Slice {
            type Output = Slice;
            fn $method(self, rhs: Real) -> Slice {
                self.map(|a| a $op rhs)
            }
        }

        impl $Trait<Real> for Slice {
            type Output = Slice;
            fn $method(mut self, rhs: Real) -> Slice {
                self.apply(|a| a $op rhs);
                self
            }
        }

        impl $Trait<&Slice> for Real {
            type Output = Slice;
            fn $method(self, rhs: &Slice) -> Slice {
                rhs.map(|b| self $op b)
            }
        }

        impl $Trait<Slice> for Real {
            type Output = Slice;
            fn $method(self, mut rhs: Slice) -> Slice {
                rhs.apply(|b| self $op b);
                rhs
            }
        }
    };
}

slice_binary_op!(Add, add, AddAssign, add_assign, +);
slice_binary_op!(Sub, sub, SubAssign, sub_assign, -);
slice_binary_op!(Mul, mul, MulAssign, mul_assign, *);
slice_binary_op!(Div, div, DivAssign, div_assign, /);

impl Neg for &Slice {
    type Output = Slice;
    fn neg(self) -> Slice {
        self.map(|a| -a)
    }
}

impl Neg for Slice {
    type Output = Slice;
    fn neg(mut self) -> Slice {
        self.apply(|a| -a);
        self
    }
}

/// Heaviside indicator `1{a >= b}` between slices and scalars.
///
/// Implemented for the three combinations that involve at least one slice.
pub trait Indicator<Rhs> {
    /// `1` on the nodes where `self >= rhs`, `0` elsewhere.
    fn indicator(self, rhs: Rhs) -> Slice;
}

impl Indicator<&Slice> for &Slice {
    fn indicator(self, rhs: &Slice) -> Slice {
        self.combine(rhs, step)
    }
}

impl Indicator<Real> for &Slice {
    fn indicator(self, rhs: Real) -> Slice {
        self.map(|a| step(a, rhs))
    }
}

impl Indicator<&Slice> for Real {
    fn indicator(self, rhs: &Slice) -> Slice {
        rhs.map(|b| step(self, b))
    }
}

fn step(a: Real, b: Real) -> Real {
    if a >= b {
        1.0
    } else {
        0.0
    }
}

/// `1{a >= b}` as a slice.
///
/// `indicator(&spot, barrier)` is the survival indicator of a lower barrier,
/// `indicator(barrier, &spot)` that of an upper barrier.
///
/// # Panics
/// Panics if two slices are at different indices or on different lattices.
pub fn indicator<A, B>(a: A, b: B) -> Slice
where
    A: Indicator<B>,
{
    a.indicator(b)
}

/// Price as a function of the model's initial state.
///
/// # Errors
/// Precondition failure unless the slice has been rolled back to index 0.
pub fn interpolate(slice: &Slice) -> Result<MultiFunction> {
    ensure!(
        slice.index == 0,
        "only a slice at the initial time can be interpolated, got index {}",
        slice.index
    );
    slice.lattice.interpolate(&slice.values)
}
