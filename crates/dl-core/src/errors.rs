//! Error types for derivlab.
//!
//! Every contract violation in the library is reported through a single
//! `thiserror`-derived enum.  Preconditions are checked with [`ensure!`],
//! postconditions with [`ensure_post!`], and unconditional failures are
//! raised with [`fail!`].

use thiserror::Error;

/// The top-level error type used throughout derivlab.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated by the caller.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated by the callee.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// A function was evaluated outside its domain.
    #[error("argument {value} does not belong to the domain of the function")]
    Domain {
        /// The offending argument (first component for vector arguments).
        value: f64,
    },

    /// A vector argument had the wrong number of components.
    #[error("expected an argument of dimension {expected}, found {found}")]
    Dimension {
        /// Dimension of the function's domain.
        expected: usize,
        /// Dimension of the argument actually passed.
        found: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An iterative algorithm stopped without meeting its tolerance.
    #[error("no convergence after {iterations} iterations: {message}")]
    Convergence {
        /// Number of iterations performed.
        iterations: u32,
        /// Description of the algorithm that failed.
        message: String,
    },
}

/// Shorthand `Result` type used throughout derivlab.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use dl_core::{ensure, errors::Error};
/// fn positive(x: f64) -> dl_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use dl_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> dl_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use dl_core::{fail, errors::Error};
/// fn always_err() -> dl_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
