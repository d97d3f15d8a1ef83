//! Blocking sleep with a guaranteed minimum duration.
//!
//! Platform sleep calls can return a little earlier than asked. This crate pads every
//! sleep and then checks a monotonic deadline, sleeping again in small steps until the
//! requested time really has passed.
//!
//! # Architecture
//!
//! - **Clock**: monotonic time source plus blocking sleep primitive
//! - **Sleeper**: the deadline loop, parameterised over a clock and a padding
//! - **SleeperBuilder**: fluent configuration for a `Sleeper`
//! - **sleep_at_least / sleep_for**: one-shot helpers on the default sleeper

mod builder;
mod clock;
mod error;
mod timer;

pub use builder::SleeperBuilder;
pub use clock::{Clock, MonotonicClock};
pub use error::SleepError;
pub use timer::{DEFAULT_PADDING, SleepReport, Sleeper, sleep_at_least, sleep_for};
