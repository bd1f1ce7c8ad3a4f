//! Timing utilities for measuring code regions.
//!
//! This crate provides:
//!
//! - **Layered stopwatch** ([`stopwatch`]): nested start/stop regions with a
//!   bounded depth, reporting the last closed region
//! - **Uptime** ([`uptime`]): elapsed time since a process-wide reference point
//!
//! # Example
//!
//! ```
//! use rasm_stopwatch::{uptime, LayeredStopwatch};
//!
//! let mut sw = LayeredStopwatch::new();
//! sw.start().unwrap();
//! sw.start().unwrap();
//! sw.stop().unwrap();       // inner region
//! let inner_ms = sw.elapsed();
//! sw.stop().unwrap();       // outer region
//! assert!(sw.elapsed() >= inner_ms);
//!
//! let since_start = uptime::current_time_millis();
//! assert!(uptime::current_time_millis() >= since_start);
//! ```

pub mod stopwatch;
pub mod uptime;

// Re-export main types for convenience
pub use rasm_common::{TimingError, TimingResult};
pub use stopwatch::LayeredStopwatch;
pub use uptime::UptimeTracker;
