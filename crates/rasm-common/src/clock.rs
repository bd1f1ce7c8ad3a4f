//! Monotonic millisecond clocks.
//!
//! Every timing utility in the workspace reads time through
//! [`MonotonicClock`]. Readings are milliseconds since a clock-specific
//! reference point and never decrease for the lifetime of the clock.
//!
//! - [`SystemClock`]: backed by [`std::time::Instant`], immune to wall-clock
//!   adjustments.
//! - [`ManualClock`]: driven explicitly by the caller, for deterministic tests
//!   and simulation.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// Source of monotonically non-decreasing elapsed time.
pub trait MonotonicClock {
    /// Milliseconds elapsed since this clock's reference point.
    fn elapsed_millis(&self) -> u64;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn elapsed_millis(&self) -> u64 {
        (**self).elapsed_millis()
    }
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for Rc<T> {
    fn elapsed_millis(&self) -> u64 {
        (**self).elapsed_millis()
    }
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for Arc<T> {
    fn elapsed_millis(&self) -> u64 {
        (**self).elapsed_millis()
    }
}

/// Clock backed by the operating system's monotonic timer.
///
/// The reference point is the instant the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    reference: Instant,
}

impl SystemClock {
    /// Create a clock whose reference point is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reference: Instant::now(),
        }
    }

    /// The instant readings are measured from.
    #[must_use]
    pub fn reference(&self) -> Instant {
        self.reference
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.reference.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Caller-driven clock for deterministic timing.
///
/// Not `Sync`; share it with a stopwatch by reference or through an [`Rc`].
///
/// # Example
///
/// ```
/// use rasm_common::clock::{ManualClock, MonotonicClock};
///
/// let clock = ManualClock::new();
/// clock.advance(10);
/// assert_eq!(clock.elapsed_millis(), 10);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    /// Create a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a clock with the given initial reading.
    #[must_use]
    pub fn starting_at(millis: u64) -> Self {
        Self {
            now: Cell::new(millis),
        }
    }

    /// Current reading in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Move the clock to an absolute reading.
    ///
    /// # Panics
    ///
    /// Panics if `millis` is earlier than the current reading.
    pub fn set(&self, millis: u64) {
        let current = self.now.get();
        assert!(
            millis >= current,
            "ManualClock cannot move backwards (from {current}ms to {millis}ms)"
        );
        self.now.set(millis);
    }

    /// Move the clock forward by `millis`, saturating at `u64::MAX`.
    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get().saturating_add(millis));
    }
}

impl MonotonicClock for ManualClock {
    fn elapsed_millis(&self) -> u64 {
        self.now.get()
    }
}
