//! Process-wide numeric settings.
//!
//! [`Settings`] holds the **epsilon** used wherever a formula has a 0/0
//! limit (yield-curve shape functions, yields close to the initial time).
//! Below the epsilon the closed form is replaced by its Taylor expansion.
//! It is a process-wide singleton accessed via a `std::sync::OnceLock`.
//!
//! Thread safety: the epsilon is stored behind a `Mutex` so that it can be
//! changed from any thread.  Tests that change it should use
//! [`ScopedEpsilon`], which restores the previous value on drop.

use std::sync::{Mutex, OnceLock};

use crate::Real;

/// Default value of the epsilon threshold.
pub const DEFAULT_EPSILON: Real = 1.0e-6;

/// Process-wide settings used by the derivlab library.
pub struct Settings {
    epsilon: Mutex<Real>,
}

static INSTANCE: OnceLock<Settings> = OnceLock::new();

impl Settings {
    /// Return a reference to the global singleton.
    pub fn instance() -> &'static Settings {
        INSTANCE.get_or_init(|| Settings {
            epsilon: Mutex::new(DEFAULT_EPSILON),
        })
    }

    /// Threshold below which 0/0 limits switch to their expansions.
    pub fn epsilon(&self) -> Real {
        *self.epsilon.lock().expect("Settings mutex poisoned")
    }

    /// Set the epsilon threshold.
    ///
    /// # Panics
    /// Panics if `eps` is not strictly positive.
    pub fn set_epsilon(&self, eps: Real) {
        assert!(eps > 0.0, "epsilon must be positive, got {eps}");
        *self.epsilon.lock().expect("Settings mutex poisoned") = eps;
    }
}

/// RAII guard that sets the global epsilon and restores the old value on drop.
pub struct ScopedEpsilon {
    previous: Real,
}

impl ScopedEpsilon {
    /// Set `eps` as the global epsilon until the guard is dropped.
    pub fn new(eps: Real) -> Self {
        let settings = Settings::instance();
        let previous = settings.epsilon();
        settings.set_epsilon(eps);
        Self { previous }
    }
}

impl Drop for ScopedEpsilon {
    fn drop(&mut self) {
        Settings::instance().set_epsilon(self.previous);
    }
}
