//! Minimum-delay sleeping on top of an imprecise sleep primitive.
//!
//! Some platforms wake a sleeping thread slightly before the requested duration has
//! passed. A [`Sleeper`] guards against that in two ways: every call to the primitive is
//! padded by a fixed amount, and after waking the monotonic clock is compared against a
//! deadline fixed at entry. While the deadline has not been reached, the sleeper sleeps
//! one more padding interval and checks again.
//!
//! # Example
//!
//! ```no_run
//! use padsleep::sleep_at_least;
//!
//! // Returns no earlier than 100ms after the call, usually around 115ms.
//! sleep_at_least(100.0).unwrap();
//! ```

use crate::builder::SleeperBuilder;
use crate::clock::{Clock, MonotonicClock};
use crate::error::SleepError;

use std::time::Duration;
use tracing::{debug, trace, warn};

/// Extra time added to every primitive sleep call.
pub const DEFAULT_PADDING: Duration = Duration::from_millis(15);

/// What a completed wait actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepReport {
    /// Minimum time the caller asked to wait.
    pub requested: Duration,
    /// Monotonic time between entry and return. Never less than `requested`.
    pub elapsed: Duration,
    /// Number of calls made to the sleep primitive.
    pub sleeps: u32,
}

impl SleepReport {
    /// Returns `true` when the first padded sleep was not enough and the loop had to
    /// sleep again.
    pub fn retried(&self) -> bool {
        self.sleeps > 1
    }
}

/// Blocks the calling thread for at least a requested duration.
///
/// Holds no mutable state, so one sleeper can be shared between threads. Each call
/// blocks only its own caller.
#[derive(Debug, Clone)]
pub struct Sleeper<C = MonotonicClock> {
    clock: C,
    padding: Duration,
}

impl Default for Sleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper {
    /// Creates a sleeper using the host monotonic clock and [`DEFAULT_PADDING`].
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }

    /// Starts configuring a sleeper.
    pub fn builder() -> SleeperBuilder {
        SleeperBuilder::new()
    }
}

impl<C: Clock> Sleeper<C> {
    /// Creates a sleeper on top of the given clock with [`DEFAULT_PADDING`].
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            padding: DEFAULT_PADDING,
        }
    }

    /// Padding must already be validated as non-zero.
    pub(crate) fn from_parts(clock: C, padding: Duration) -> Self {
        Self { clock, padding }
    }

    pub fn padding(&self) -> Duration {
        self.padding
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Sleeps until at least `requested` has elapsed on the monotonic clock.
    ///
    /// The deadline is taken once, on entry. The primitive is then asked for
    /// `requested + padding`, and for one more `padding` each time it is found to have
    /// woken before the deadline. At least one padded sleep is always made, so even a zero
    /// request blocks for about one padding interval.
    ///
    /// # Errors
    /// Clock and sleep primitive failures are returned as-is. Nothing is retried.
    pub fn sleep_at_least(&self, requested: Duration) -> Result<SleepReport, SleepError> {
        let start = self.now()?;
        let deadline = start.saturating_add(requested);

        self.sleep_once(requested.saturating_add(self.padding))?;
        let mut sleeps = 1;

        let end = self.wait_out(deadline, &mut sleeps)?;

        Ok(SleepReport {
            requested,
            elapsed: end.saturating_sub(start),
            sleeps,
        })
    }

    /// Sleeps until the clock reads at least `deadline`.
    ///
    /// `deadline` is an absolute reading of this sleeper's clock, as returned by
    /// [`Clock::now`]. A deadline that has already passed returns immediately without
    /// sleeping.
    pub fn sleep_until(&self, deadline: Duration) -> Result<SleepReport, SleepError> {
        let start = self.now()?;
        let mut sleeps = 0;

        if start < deadline {
            self.sleep_once((deadline - start).saturating_add(self.padding))?;
            sleeps += 1;
        }

        let end = self.wait_out(deadline, &mut sleeps)?;

        Ok(SleepReport {
            requested: deadline.saturating_sub(start),
            elapsed: end.saturating_sub(start),
            sleeps,
        })
    }

    /// Re-sleeps one padding interval at a time until the deadline has passed.
    /// Returns the clock reading that satisfied the deadline.
    fn wait_out(&self, deadline: Duration, sleeps: &mut u32) -> Result<Duration, SleepError> {
        loop {
            let now = self.now()?;
            if now >= deadline {
                return Ok(now);
            }

            debug!(
                short_by = ?(deadline - now),
                padding = ?self.padding,
                "woke before deadline, sleeping again"
            );

            self.sleep_once(self.padding)?;
            *sleeps = sleeps.saturating_add(1);
        }
    }

    fn now(&self) -> Result<Duration, SleepError> {
        self.clock.now().map_err(|err| {
            warn!(error = %err, "monotonic clock read failed");
            SleepError::Clock(err)
        })
    }

    fn sleep_once(&self, duration: Duration) -> Result<(), SleepError> {
        trace!(?duration, "sleeping");

        self.clock.sleep(duration).map_err(|err| {
            warn!(error = %err, ?duration, "sleep primitive failed");
            SleepError::Sleep(err)
        })
    }
}

/// Blocks the calling thread for at least `requested_ms` milliseconds.
///
/// Negative values and NaN are treated as zero, which still costs one padding interval.
///
/// # Errors
/// [`SleepError::InvalidDelay`] if the delay is infinite or too large for a [`Duration`].
/// Otherwise only platform clock or sleep failures.
pub fn sleep_at_least(requested_ms: f64) -> Result<(), SleepError> {
    let requested = millis_to_duration(requested_ms)?;
    sleep_for(requested)
}

/// [`sleep_at_least`] for a [`Duration`].
pub fn sleep_for(requested: Duration) -> Result<(), SleepError> {
    Sleeper::new().sleep_at_least(requested).map(|_| ())
}

pub(crate) fn millis_to_duration(ms: f64) -> Result<Duration, SleepError> {
    if ms.is_nan() || ms <= 0.0 {
        return Ok(Duration::ZERO);
    }

    Duration::try_from_secs_f64(ms / 1e3).map_err(|_| SleepError::InvalidDelay(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_milliseconds_convert_exactly() {
        assert_eq!(millis_to_duration(100.0).unwrap(), Duration::from_millis(100));
        assert_eq!(millis_to_duration(15.0).unwrap(), Duration::from_millis(15));
    }

    #[test]
    fn fractional_milliseconds_keep_sub_millisecond_part() {
        assert_eq!(millis_to_duration(0.5).unwrap(), Duration::from_micros(500));
    }

    #[test]
    fn negative_and_nan_clamp_to_zero() {
        assert_eq!(millis_to_duration(-1.0).unwrap(), Duration::ZERO);
        assert_eq!(millis_to_duration(f64::NEG_INFINITY).unwrap(), Duration::ZERO);
        assert_eq!(millis_to_duration(f64::NAN).unwrap(), Duration::ZERO);
        assert_eq!(millis_to_duration(-0.0).unwrap(), Duration::ZERO);
    }

    #[test]
    fn unrepresentable_delays_are_rejected() {
        assert!(matches!(
            millis_to_duration(f64::INFINITY),
            Err(SleepError::InvalidDelay(_))
        ));
        assert!(matches!(
            millis_to_duration(f64::MAX),
            Err(SleepError::InvalidDelay(_))
        ));
    }

    #[test]
    fn report_marks_retries() {
        let report = SleepReport {
            requested: Duration::from_millis(10),
            elapsed: Duration::from_millis(40),
            sleeps: 2,
        };
        assert!(report.retried());
        assert!(!SleepReport { sleeps: 1, ..report }.retried());
    }

    #[test]
    fn default_sleeper_uses_default_padding() {
        assert_eq!(Sleeper::new().padding(), DEFAULT_PADDING);
        assert_eq!(DEFAULT_PADDING, Duration::from_millis(15));
    }
}
