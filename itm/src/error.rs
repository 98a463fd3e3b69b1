//! Input errors.
//!
//! The model itself never fails on numbers: questionable inputs are reported
//! through [`Warning`](crate::Warning) instead. These errors are for inputs
//! that cannot be represented at all.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum InputError {
    #[error("unknown radio climate code {0} (expected 1 to 7)")]
    UnknownClimate(i32),

    #[error("unknown mode of variability code {0} (expected 0 to 3, plus 10 and/or 20)")]
    UnknownVariability(i32),

    #[error("unknown siting criterion code {0} (expected 0, 1 or 2)")]
    UnknownSiting(i32),

    #[error("elevation profile needs at least 2 points, got {0}")]
    ShortProfile(usize),

    #[error("profile interval must be positive, got {0}")]
    Interval(f64),
}
