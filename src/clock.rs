//! Monotonic clock and blocking sleep primitive.
//!
//! The [`Clock`] trait is the seam between the deadline loop and the platform. It exposes
//! exactly the two things a minimum-delay sleep needs: a monotonic "now" and a blocking
//! sleep that is allowed to wake early.
//!
//! [`MonotonicClock`] is the real implementation. On unix it calls `clock_gettime` with
//! `CLOCK_MONOTONIC` and `nanosleep` directly; elsewhere it falls back to
//! [`std::time::Instant`] and [`std::thread::sleep`].

use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Source of monotonic time plus a blocking sleep primitive.
///
/// `now` returns an offset from an arbitrary, fixed epoch. Only differences between two
/// readings of the same clock are meaningful.
///
/// `sleep` may return before the requested duration has passed. Callers that need a lower
/// bound must check `now` afterwards.
pub trait Clock: Send + Sync {
    fn now(&self) -> io::Result<Duration>;
    fn sleep(&self, duration: Duration) -> io::Result<()>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> io::Result<Duration> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> io::Result<()> {
        (**self).sleep(duration)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> io::Result<Duration> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> io::Result<()> {
        (**self).sleep(duration)
    }
}

/// The host's monotonic clock and native sleep call.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> io::Result<Duration> {
        sys::now()
    }

    fn sleep(&self, duration: Duration) -> io::Result<()> {
        sys::sleep(duration)
    }
}

#[cfg(unix)]
mod sys {
    use libc::{CLOCK_MONOTONIC, clock_gettime, nanosleep, time_t, timespec};
    use std::io;
    use std::mem;
    use std::ptr;
    use std::time::Duration;

    pub(super) fn now() -> io::Result<Duration> {
        // Safety: timespec is plain old data; all-zero is a valid value.
        let mut ts: timespec = unsafe { mem::zeroed() };

        if unsafe { clock_gettime(CLOCK_MONOTONIC, &mut ts) } != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }

    pub(super) fn sleep(duration: Duration) -> io::Result<()> {
        let mut request: timespec = unsafe { mem::zeroed() };
        request.tv_sec = duration.as_secs().min(time_t::MAX as u64) as time_t;
        request.tv_nsec = duration.subsec_nanos() as _;

        if unsafe { nanosleep(&request, ptr::null_mut()) } == 0 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        // A signal cut the sleep short. That is just an early wake-up.
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(());
        }

        Err(err)
    }
}

#[cfg(not(unix))]
mod sys {
    use std::io;
    use std::sync::OnceLock;
    use std::time::{Duration, Instant};

    static EPOCH: OnceLock<Instant> = OnceLock::new();

    pub(super) fn now() -> io::Result<Duration> {
        Ok(EPOCH.get_or_init(Instant::now).elapsed())
    }

    pub(super) fn sleep(duration: Duration) -> io::Result<()> {
        std::thread::sleep(duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_never_goes_backwards() {
        let clock = MonotonicClock;
        let mut last = clock.now().unwrap();

        for _ in 0..1000 {
            let now = clock.now().unwrap();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn sleep_advances_the_clock() {
        let clock = MonotonicClock;
        let before = clock.now().unwrap();
        clock.sleep(Duration::from_millis(5)).unwrap();
        let after = clock.now().unwrap();

        assert!(after > before);
    }

    #[test]
    fn shared_clock_delegates() {
        let clock = Arc::new(MonotonicClock);
        let by_ref = &clock;

        assert!(by_ref.now().is_ok());
        assert!(clock.sleep(Duration::ZERO).is_ok());
    }
}
