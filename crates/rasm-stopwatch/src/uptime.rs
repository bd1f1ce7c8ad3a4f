//! Process uptime readings.
//!
//! An [`UptimeTracker`] captures a reference point once and reports the time
//! elapsed since then. Code that wants a tracker passed around explicitly can
//! construct one at startup; code that just needs "time since the program
//! started" uses the process-wide instance via [`UptimeTracker::process`] or
//! the [`current_time_millis`] / [`current_time_seconds`] functions.

use rasm_common::clock::{MonotonicClock, SystemClock};
use rasm_common::config::{SecondsConversion, UptimeConfig};
use std::sync::OnceLock;
use tracing::{debug, warn};

static PROCESS_UPTIME: OnceLock<UptimeTracker> = OnceLock::new();

/// Elapsed time since a fixed reference point.
///
/// # Example
///
/// ```
/// use rasm_common::clock::ManualClock;
/// use rasm_stopwatch::UptimeTracker;
///
/// let clock = ManualClock::new();
/// let uptime = UptimeTracker::with_clock(&clock);
///
/// clock.set(2_750);
/// assert_eq!(uptime.current_time_millis(), 2_750);
/// assert_eq!(uptime.current_time_seconds(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UptimeTracker<C = SystemClock> {
    clock: C,
    seconds_conversion: SecondsConversion,
}

impl UptimeTracker {
    /// Create a tracker whose reference point is now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Create a tracker whose reference point is now, using `config`.
    #[must_use]
    pub fn from_config(config: &UptimeConfig) -> Self {
        Self::new().with_conversion(config.seconds_conversion)
    }

    /// The process-wide tracker.
    ///
    /// Its reference point is captured on first access, exactly once, even
    /// when several threads race to it.
    #[must_use]
    pub fn process() -> &'static Self {
        PROCESS_UPTIME.get_or_init(|| {
            debug!("Capturing process uptime reference");
            Self::new()
        })
    }

    /// Initialize the process-wide tracker from `config`.
    ///
    /// Call early during startup. If the tracker already exists, it is
    /// returned unchanged and a mismatching conversion is logged.
    #[must_use]
    pub fn init_process(config: &UptimeConfig) -> &'static Self {
        let tracker = PROCESS_UPTIME.get_or_init(|| {
            debug!(
                seconds_conversion = ?config.seconds_conversion,
                "Capturing process uptime reference"
            );
            Self::from_config(config)
        });
        if tracker.seconds_conversion != config.seconds_conversion {
            warn!(
                active = ?tracker.seconds_conversion,
                requested = ?config.seconds_conversion,
                "Process uptime tracker already initialized; ignoring new conversion"
            );
        }
        tracker
    }
}

impl Default for UptimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: MonotonicClock> UptimeTracker<C> {
    /// Create a tracker measuring from `clock`'s reference point.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            seconds_conversion: SecondsConversion::default(),
        }
    }

    /// Use `conversion` for [`current_time_seconds`](Self::current_time_seconds).
    #[must_use]
    pub fn with_conversion(mut self, conversion: SecondsConversion) -> Self {
        self.seconds_conversion = conversion;
        self
    }

    /// Milliseconds elapsed since the reference point.
    #[must_use]
    pub fn current_time_millis(&self) -> u64 {
        self.clock.elapsed_millis()
    }

    /// Elapsed time converted by the configured [`SecondsConversion`].
    ///
    /// Whole seconds by default.
    #[must_use]
    pub fn current_time_seconds(&self) -> u64 {
        self.seconds_conversion.apply(self.current_time_millis())
    }

    /// Active seconds conversion.
    #[must_use]
    pub fn seconds_conversion(&self) -> SecondsConversion {
        self.seconds_conversion
    }
}

/// Milliseconds since the process-wide reference point.
#[must_use]
pub fn current_time_millis() -> u64 {
    UptimeTracker::process().current_time_millis()
}

/// Seconds since the process-wide reference point.
#[must_use]
pub fn current_time_seconds() -> u64 {
    UptimeTracker::process().current_time_seconds()
}
