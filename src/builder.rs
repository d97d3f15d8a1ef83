//! Fluent builder for Sleeper construction.

use crate::clock::{Clock, MonotonicClock};
use crate::error::SleepError;
use crate::timer::{DEFAULT_PADDING, Sleeper};

use std::time::Duration;

/// Builder for [`Sleeper`] instances.
///
/// # Example
/// ```
/// use padsleep::SleeperBuilder;
/// use std::time::Duration;
///
/// let sleeper = SleeperBuilder::new()
///     .padding(Duration::from_millis(5))
///     .build()
///     .unwrap();
/// assert_eq!(sleeper.padding(), Duration::from_millis(5));
/// ```
#[derive(Debug, Clone)]
pub struct SleeperBuilder<C = MonotonicClock> {
    clock: C,
    padding: Duration,
}

impl Default for SleeperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SleeperBuilder {
    /// Starts from the host monotonic clock and [`DEFAULT_PADDING`].
    pub fn new() -> Self {
        Self {
            clock: MonotonicClock,
            padding: DEFAULT_PADDING,
        }
    }
}

impl<C: Clock> SleeperBuilder<C> {
    /// Sets the extra time added to every primitive sleep, and the step used when
    /// re-sleeping after an early wake-up.
    pub fn padding(mut self, padding: Duration) -> Self {
        self.padding = padding;
        self
    }

    /// Replaces the clock the sleeper reads and sleeps on.
    pub fn clock<D: Clock>(self, clock: D) -> SleeperBuilder<D> {
        SleeperBuilder {
            clock,
            padding: self.padding,
        }
    }

    /// Consumes the builder.
    ///
    /// # Errors
    /// [`SleepError::ZeroPadding`] if the padding is zero.
    pub fn build(self) -> Result<Sleeper<C>, SleepError> {
        if self.padding.is_zero() {
            return Err(SleepError::ZeroPadding);
        }

        Ok(Sleeper::from_parts(self.clock, self.padding))
    }
}
