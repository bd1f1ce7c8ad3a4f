//! Layered stopwatch acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Balanced sequences within the depth bound never fail
//! - Overflow and underflow are reported and leave the stopwatch untouched
//! - `stop()` always closes the most recently opened region
//! - `elapsed()` is stable between stops

use super::common::{all_sequences, check_against_model, init_tracing};
use rasm_common::clock::ManualClock;
use rasm_stopwatch::{LayeredStopwatch, TimingError};
use std::rc::Rc;
use std::time::Duration;

#[test]
fn test_every_short_sequence_matches_model() {
    init_tracing();
    for len in 0..=12 {
        for ops in all_sequences(len) {
            check_against_model(&ops, 5);
        }
    }
}

#[test]
fn test_every_short_sequence_matches_model_at_depth_two() {
    init_tracing();
    for ops in all_sequences(8) {
        check_against_model(&ops, 2);
    }
}

#[test]
fn test_depth_bound_never_exceeded_without_error() {
    init_tracing();
    let clock = ManualClock::new();
    let mut sw = LayeredStopwatch::with_clock(&clock);

    // Saw-tooth between idle and saturated several times.
    for _ in 0..4 {
        for _ in 0..5 {
            sw.start().unwrap();
            clock.advance(1);
        }
        assert_eq!(sw.depth(), sw.max_depth());
        for _ in 0..5 {
            sw.stop().unwrap();
        }
        assert!(sw.is_idle());
    }
}

#[test]
fn test_overflow_reports_bound() {
    init_tracing();
    let mut sw = LayeredStopwatch::new();
    for _ in 0..5 {
        sw.start().unwrap();
    }
    let err = sw.start().unwrap_err();
    assert_eq!(err, TimingError::TimerOverflow { max_depth: 5 });
    assert_eq!(err.operation(), "start");
    assert!(err.to_string().contains('5'));
    assert_eq!(sw.depth(), 5);
}

#[test]
fn test_underflow_reports_operation() {
    init_tracing();
    let mut sw = LayeredStopwatch::new();
    let err = sw.stop().unwrap_err();
    assert_eq!(err, TimingError::TimerUnderflow);
    assert_eq!(err.operation(), "stop");
    assert!(sw.is_idle());
    assert_eq!(sw.elapsed(), 0);
}

#[test]
fn test_documented_nested_scenario() {
    init_tracing();
    let clock = ManualClock::new();
    let mut sw = LayeredStopwatch::with_clock(&clock);

    sw.start().unwrap(); // clock = 0
    clock.set(5);
    sw.start().unwrap();
    clock.set(12);
    sw.stop().unwrap();
    assert_eq!(sw.elapsed(), 7);

    clock.set(20);
    sw.stop().unwrap();
    assert_eq!(sw.elapsed(), 20);
}

#[test]
fn test_reopened_inner_region() {
    init_tracing();
    let clock = ManualClock::new();
    let mut sw = LayeredStopwatch::with_clock(&clock);

    sw.start().unwrap(); // #1 at 0
    clock.set(10);
    sw.start().unwrap(); // #2 at 10
    clock.set(15);
    sw.stop().unwrap();
    assert_eq!(sw.elapsed(), 5);

    clock.set(30);
    sw.start().unwrap(); // #2 again at 30
    clock.set(33);
    sw.stop().unwrap();
    assert_eq!(sw.elapsed(), 3);

    clock.set(40);
    sw.stop().unwrap(); // #1
    assert_eq!(sw.elapsed(), 40);
}

#[test]
fn test_shared_clock_across_stopwatches() {
    init_tracing();
    let clock = Rc::new(ManualClock::new());
    let mut a = LayeredStopwatch::with_clock(Rc::clone(&clock));
    let mut b = LayeredStopwatch::with_clock(Rc::clone(&clock));

    a.start().unwrap();
    clock.advance(4);
    b.start().unwrap();
    clock.advance(6);
    a.stop().unwrap();
    b.stop().unwrap();

    assert_eq!(a.elapsed(), 10);
    assert_eq!(b.elapsed(), 6);
}

#[test]
fn test_real_clock_region() {
    init_tracing();
    let mut sw = LayeredStopwatch::new();
    let value = sw
        .time(|_| {
            std::thread::sleep(Duration::from_millis(10));
            42
        })
        .unwrap();
    assert_eq!(value, 42);
    assert!(sw.elapsed_duration() >= Duration::from_millis(10));
}

#[test]
fn test_time_inside_open_region_never_closes_it() {
    init_tracing();
    let clock = ManualClock::new();
    let mut sw = LayeredStopwatch::with_clock(&clock);
    sw.start().unwrap(); // clock = 0
    clock.set(100);

    let result = sw.time(|inner| {
        clock.advance(5);
        inner.stop()
    });
    assert_eq!(
        result,
        Err(TimingError::UnbalancedRegion {
            expected_depth: 2,
            actual_depth: 1,
        })
    );
    assert_eq!(sw.open_regions(), &[0]);

    // A balanced closure inside the open region measures only itself.
    let value = sw
        .time(|_| {
            clock.advance(10);
            "ok"
        })
        .unwrap();
    assert_eq!(value, "ok");
    assert_eq!(sw.elapsed(), 10);
    assert_eq!(sw.depth(), 1);
}
