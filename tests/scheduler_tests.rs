//! Tests for the event scheduler
//!
//! These tests verify time ordering, submission-order ties, cancellation and
//! the strict horizon used by the run loop.

use call_center_sim::simulation::{Scheduler, SimTime};

fn drain(scheduler: &mut Scheduler<&'static str>, until: f64) -> Vec<(f64, &'static str)> {
    let mut fired = Vec::new();
    while let Some(event) = scheduler.pop_before(SimTime::new(until)) {
        fired.push((event.due.as_f64(), event.payload));
    }
    fired
}

/// Events fire in time order, ties in submission order
#[test]
fn test_time_order_with_submission_ties() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule_after(5.0, "late");
    scheduler.schedule_after(1.0, "first tie");
    scheduler.schedule_after(1.0, "second tie");
    scheduler.schedule_after(0.0, "now");
    scheduler.schedule_after(1.0, "third tie");

    let fired = drain(&mut scheduler, 100.0);
    assert_eq!(
        fired,
        vec![
            (0.0, "now"),
            (1.0, "first tie"),
            (1.0, "second tie"),
            (1.0, "third tie"),
            (5.0, "late"),
        ]
    );
    assert_eq!(scheduler.now(), SimTime::new(5.0));
}

/// Events due exactly at the horizon stay pending
#[test]
fn test_horizon_is_exclusive() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule_after(9.0, "before");
    scheduler.schedule_after(10.0, "at horizon");

    let fired = drain(&mut scheduler, 10.0);
    assert_eq!(fired, vec![(9.0, "before")]);
    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.peek_due(), Some(SimTime::new(10.0)));

    assert_eq!(scheduler.discard_pending(), 1);
    assert!(scheduler.is_empty());
}

/// Relative delays are measured from the time the event was scheduled
#[test]
fn test_delays_relative_to_current_time() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule_after(3.0, "a");
    drain(&mut scheduler, 100.0);
    scheduler.schedule_after(2.0, "b");
    assert_eq!(drain(&mut scheduler, 100.0), vec![(5.0, "b")]);
}

/// Cancelled events never fire
#[test]
fn test_cancelled_event_skipped() {
    let mut scheduler = Scheduler::new();
    let doomed = scheduler.schedule_after(1.0, "doomed");
    scheduler.schedule_after(2.0, "kept");
    assert!(scheduler.cancel(doomed));
    assert!(!scheduler.cancel(doomed));
    assert_eq!(drain(&mut scheduler, 100.0), vec![(2.0, "kept")]);
}

/// Scheduling at an absolute time in the past is a programming error
#[test]
#[should_panic(expected = "cannot schedule in the past")]
fn test_schedule_in_past_panics() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule_after(4.0, "a");
    drain(&mut scheduler, 100.0);
    scheduler.schedule_at(SimTime::new(1.0), "b");
}

/// Negative delays are rejected
#[test]
#[should_panic(expected = "invalid event delay")]
fn test_negative_delay_panics() {
    let mut scheduler: Scheduler<&'static str> = Scheduler::new();
    scheduler.schedule_after(-1.0, "bad");
}
