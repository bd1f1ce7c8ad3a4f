use thiserror::Error;

/// Misuse errors raised by the layered stopwatch.
///
/// Every variant describes a mismatched `start`/`stop` call sequence. A
/// rejected `start()` or `stop()` leaves the stopwatch exactly as it was, and
/// a rejected `time()` closes no region.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// `start()` was called while every timer slot was already in use.
    #[error("start() rejected: maximum of {max_depth} concurrent timers exceeded")]
    TimerOverflow {
        /// Configured nesting bound that would have been exceeded.
        max_depth: usize,
    },

    /// `stop()` was called while no timer was running.
    #[error("stop() rejected: stop called with no active timer (depth 0)")]
    TimerUnderflow,

    /// A closure timed with `time()` left a different number of regions open
    /// than it found.
    #[error(
        "time() rejected: closure left {actual_depth} regions open, expected {expected_depth}"
    )]
    UnbalancedRegion {
        /// Depth when the closure was entered.
        expected_depth: usize,
        /// Depth when the closure returned.
        actual_depth: usize,
    },
}

impl TimingError {
    /// Name of the stopwatch operation that was rejected.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::TimerOverflow { .. } => "start",
            Self::TimerUnderflow => "stop",
            Self::UnbalancedRegion { .. } => "time",
        }
    }
}

/// Convenience type alias for stopwatch operations.
pub type TimingResult<T> = Result<T, TimingError>;
