//! Virtual time for the simulation
//!
//! The simulation clock is a continuous, non-negative timestamp that only
//! advances when the scheduler pops an event. It has no relation to wall-clock
//! time.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors raised when constructing a [`SimTime`] from a raw value
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TimeError {
    #[error("Virtual time must be a finite number, got {0}")]
    NotFinite(f64),

    #[error("Virtual time must be non-negative, got {0}")]
    Negative(f64),
}

/// A validated point in virtual time
///
/// Always finite and non-negative, so unlike a bare `f64` it is totally
/// ordered and can key a priority queue.
///
/// # Example
/// ```
/// use event_sim_core_rs::SimTime;
///
/// let t = SimTime::new(2.5).unwrap();
/// assert_eq!(t.as_f64(), 2.5);
/// assert!(SimTime::ZERO.is_before(t));
/// assert!(SimTime::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SimTime(f64);

impl SimTime {
    /// The start of every simulation
    pub const ZERO: SimTime = SimTime(0.0);

    /// Create a new SimTime
    ///
    /// # Errors
    /// * `TimeError::NotFinite` for NaN or infinite values
    /// * `TimeError::Negative` for values below zero
    pub fn new(value: f64) -> Result<Self, TimeError> {
        if !value.is_finite() {
            return Err(TimeError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(TimeError::Negative(value));
        }
        // Normalize -0.0 so equal times compare and print the same
        Ok(Self(value + 0.0))
    }

    /// Raw timestamp
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Returns `true` if `self` is strictly earlier than `other`
    pub fn is_before(self, other: SimTime) -> bool {
        self < other
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for SimTime {
    type Error = TimeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        SimTime::new(value)
    }
}

impl From<SimTime> for f64 {
    fn from(time: SimTime) -> Self {
        time.0
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}", self.0)
    }
}
