//! Layered stopwatch for timing nested code regions.
//!
//! A [`LayeredStopwatch`] keeps a bounded stack of open regions. Every
//! [`start`](LayeredStopwatch::start) opens a region, every
//! [`stop`](LayeredStopwatch::stop) closes the most recently opened one and
//! records its duration, which [`elapsed`](LayeredStopwatch::elapsed) returns
//! until the next successful stop.
//!
//! # Call Sequence
//!
//! ```text
//! start()    opens region #1           depth 1
//! start()    opens region #2           depth 2
//! stop()     closes region #2          depth 1
//! elapsed()  -> duration of #2
//! start()    opens region #2 again     depth 2
//! stop()     closes region #2          depth 1
//! elapsed()  -> duration of the second #2
//! stop()     closes region #1          depth 0
//! elapsed()  -> duration of #1
//! ```
//!
//! Timestamps and durations are whole milliseconds read from a
//! [`MonotonicClock`].

use rasm_common::clock::{MonotonicClock, SystemClock};
use rasm_common::config::{StopwatchConfig, DEFAULT_MAX_DEPTH, MAX_DEPTH};
use rasm_common::error::{TimingError, TimingResult};
use std::time::Duration;
use tracing::{trace, warn};

/// Stopwatch supporting up to `max_depth` nested timing regions.
///
/// # Example
///
/// ```
/// use rasm_common::clock::ManualClock;
/// use rasm_stopwatch::LayeredStopwatch;
///
/// let clock = ManualClock::new();
/// let mut sw = LayeredStopwatch::with_clock(&clock);
///
/// sw.start().unwrap();   // outer, at 0ms
/// clock.set(5);
/// sw.start().unwrap();   // inner, at 5ms
/// clock.set(12);
/// sw.stop().unwrap();    // closes inner
/// assert_eq!(sw.elapsed(), 7);
///
/// clock.set(20);
/// sw.stop().unwrap();    // closes outer
/// assert_eq!(sw.elapsed(), 20);
///
/// // Nothing left to stop.
/// assert!(sw.stop().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LayeredStopwatch<C = SystemClock> {
    /// Time source for region boundaries.
    clock: C,
    /// Start timestamps; `slots[..depth]` is the stack of open regions.
    slots: [u64; MAX_DEPTH],
    /// Nesting bound, at most `MAX_DEPTH`.
    max_depth: usize,
    /// Number of open regions.
    depth: usize,
    /// Duration of the most recently closed region in milliseconds.
    last_duration: u64,
    /// Closed regions longer than this are logged.
    slow_region_threshold: Option<Duration>,
}

impl LayeredStopwatch {
    /// Create a stopwatch on the system monotonic clock with the default depth.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Create a stopwatch on the system monotonic clock from configuration.
    #[must_use]
    pub fn from_config(config: &StopwatchConfig) -> Self {
        Self::with_config(SystemClock::new(), config)
    }
}

impl Default for LayeredStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: MonotonicClock> LayeredStopwatch<C> {
    /// Create a stopwatch reading from `clock` with the default depth of 5.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self::with_max_depth(clock, DEFAULT_MAX_DEPTH)
    }

    /// Create a stopwatch reading from `clock` allowing `max_depth` open regions.
    ///
    /// The depth is clamped to `1..=MAX_DEPTH`.
    #[must_use]
    pub fn with_max_depth(clock: C, max_depth: usize) -> Self {
        Self {
            clock,
            slots: [0; MAX_DEPTH],
            max_depth: max_depth.clamp(1, MAX_DEPTH),
            depth: 0,
            last_duration: 0,
            slow_region_threshold: None,
        }
    }

    /// Create a stopwatch reading from `clock` using `config`.
    #[must_use]
    pub fn with_config(clock: C, config: &StopwatchConfig) -> Self {
        let mut sw = Self::with_max_depth(clock, config.max_depth);
        sw.slow_region_threshold = config.slow_region_threshold;
        sw
    }

    /// Open a new region at the current clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::TimerOverflow`] if `max_depth` regions are
    /// already open. The stopwatch is not modified.
    pub fn start(&mut self) -> TimingResult<()> {
        let max_depth = self.max_depth;
        if self.depth == max_depth {
            warn!(max_depth, "start() called with every timer slot in use");
            return Err(TimingError::TimerOverflow { max_depth });
        }

        let now = self.clock.elapsed_millis();
        self.slots[self.depth] = now;
        self.depth += 1;
        trace!(depth = self.depth, start_ms = now, "Region opened");
        Ok(())
    }

    /// Close the most recently opened region and record its duration.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::TimerUnderflow`] if no region is open. The
    /// stopwatch, including the last recorded duration, is not modified.
    pub fn stop(&mut self) -> TimingResult<()> {
        let Some(top) = self.depth.checked_sub(1) else {
            warn!("stop() called with no active timer");
            return Err(TimingError::TimerUnderflow);
        };

        let now = self.clock.elapsed_millis();
        let started = self.slots[top];
        if now < started {
            warn!(
                start_ms = started,
                now_ms = now,
                "Clock went backwards; recording zero duration"
            );
        }

        self.last_duration = now.saturating_sub(started);
        self.depth = top;
        trace!(
            depth = self.depth,
            duration_ms = self.last_duration,
            "Region closed"
        );

        if let Some(threshold) = self.slow_region_threshold {
            if self.elapsed_duration() > threshold {
                warn!(
                    duration_ms = self.last_duration,
                    threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX),
                    depth = self.depth,
                    "Slow region"
                );
            }
        }
        Ok(())
    }

    /// Duration of the most recently closed region in milliseconds.
    ///
    /// Zero until the first successful [`stop`](Self::stop).
    #[must_use]
    pub fn elapsed(&self) -> u64 {
        self.last_duration
    }

    /// [`elapsed`](Self::elapsed) as a [`Duration`].
    #[must_use]
    pub fn elapsed_duration(&self) -> Duration {
        Duration::from_millis(self.last_duration)
    }

    /// Run `f` inside its own region and return its result.
    ///
    /// `f` may open and close further regions on the stopwatch it is given,
    /// but must leave them balanced. Afterwards [`elapsed`](Self::elapsed)
    /// holds the duration of the whole call.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::TimerOverflow`] without running `f` if no slot
    /// is free. Returns [`TimingError::UnbalancedRegion`] if `f` left a
    /// different number of regions open than it found; no region is closed
    /// in that case.
    pub fn time<F, R>(&mut self, f: F) -> TimingResult<R>
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.start()?;
        let expected_depth = self.depth;
        let result = f(self);
        if self.depth != expected_depth {
            warn!(
                expected_depth,
                actual_depth = self.depth,
                "time() closure left regions unbalanced"
            );
            return Err(TimingError::UnbalancedRegion {
                expected_depth,
                actual_depth: self.depth,
            });
        }
        self.stop()?;
        Ok(result)
    }

    /// Number of currently open regions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Maximum number of simultaneously open regions.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns true if no region is open.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.depth == 0
    }

    /// Start timestamps of the open regions, oldest first.
    #[must_use]
    pub fn open_regions(&self) -> &[u64] {
        &self.slots[..self.depth]
    }

    /// The clock this stopwatch reads from.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
