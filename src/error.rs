//! Errors returned by the sleep functions.
//!
//! A minimum-delay sleep has no recoverable failure modes: the only errors are
//! platform faults from the clock or the sleep primitive, which are handed back
//! to the caller untouched, and bad input.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SleepError {
    /// Reading the monotonic clock failed.
    #[error("monotonic clock unavailable: {0}")]
    Clock(#[source] io::Error),

    /// The platform sleep primitive failed.
    #[error("sleep primitive failed: {0}")]
    Sleep(#[source] io::Error),

    /// The millisecond delay cannot be represented as a `Duration`.
    #[error("invalid delay: {0} ms")]
    InvalidDelay(f64),

    /// A sleeper was configured with no padding, so the deadline loop could never advance.
    #[error("padding must be greater than zero")]
    ZeroPadding,
}
