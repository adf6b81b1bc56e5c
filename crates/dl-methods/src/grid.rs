//! Event-time grids.

use dl_core::{ensure, errors::Result, Time};

/// A strictly increasing sequence of event times `t_0 < t_1 < ... < t_N`
/// whose first element is the valuation (initial) time.
///
/// A grid is validated once, on construction, and is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EventGrid {
    times: Vec<Time>,
}

impl EventGrid {
    /// Validate `times` against the model's initial time.
    ///
    /// # Errors
    /// Precondition failure if `times` is empty, does not start at
    /// `initial_time`, or is not strictly increasing.
    pub fn new(initial_time: Time, times: &[Time]) -> Result<Self> {
        ensure!(!times.is_empty(), "the event-time grid is empty");
        ensure!(
            times[0] == initial_time,
            "the first event time {} must equal the initial time {initial_time}",
            times[0]
        );
        ensure!(
            times.windows(2).all(|w| w[0] < w[1]),
            "event times must be strictly increasing"
        );
        Ok(Self {
            times: times.to_vec(),
        })
    }

    /// All event times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Event time at index `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn time(&self, i: usize) -> Time {
        self.times[i]
    }

    /// Number of event times (`N + 1`).
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`: a grid holds at least the initial time.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Index of the last event time.
    pub fn last_index(&self) -> usize {
        self.times.len() - 1
    }

    /// Check that `i` is a valid index.
    ///
    /// # Errors
    /// Precondition failure if `i > N`.
    pub fn check_index(&self, i: usize) -> Result<()> {
        ensure!(
            i < self.times.len(),
            "event index {i} is out of range for a grid of {} times",
            self.times.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_grid() {
        let grid = EventGrid::new(0.5, &[0.5, 1.0, 2.0]).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.last_index(), 2);
        assert_eq!(grid.time(1), 1.0);
        assert!(grid.check_index(2).is_ok());
        assert!(grid.check_index(3).is_err());
    }

    #[test]
    fn invalid_grids() {
        assert!(EventGrid::new(0.0, &[]).is_err());
        assert!(EventGrid::new(0.0, &[0.1, 1.0]).is_err());
        assert!(EventGrid::new(0.0, &[0.0, 1.0, 1.0]).is_err());
        assert!(EventGrid::new(0.0, &[0.0, 2.0, 1.0]).is_err());
    }
}
