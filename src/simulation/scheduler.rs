//! Deterministic event scheduler
//!
//! Pending events live in a `BinaryHeap` with reversed `Ord`, so the heap acts
//! as a min-heap keyed by `(due, id)`. Event ids increase strictly with
//! submission order, which makes events due at the same instant fire in the
//! order they were scheduled. The scheduler also owns the run's clock and is
//! the only component that advances it.

use crate::simulation::{SimTime, SimulationClock};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

/// Strictly increasing identifier of a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

impl EventId {
    /// Return the raw value
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E#{}", self.0)
    }
}

/// A scheduled occurrence carrying a payload
#[derive(Debug, Clone)]
pub struct Event<P> {
    /// Submission-order identifier
    pub id: EventId,
    /// Virtual time at which the event fires
    pub due: SimTime,
    /// What the event does
    pub payload: P,
}

impl<P> PartialEq for Event<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for Event<P> {}

impl<P> PartialOrd for Event<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Event<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so that the max-heap pops the earliest event first.
        other.due.cmp(&self.due).then_with(|| other.id.cmp(&self.id))
    }
}

/// Time-ordered set of pending events plus the run clock
#[derive(Debug)]
pub struct Scheduler<P> {
    queue: BinaryHeap<Event<P>>,
    live: HashSet<EventId>,
    next_id: u64,
    clock: SimulationClock,
}

impl<P> Scheduler<P> {
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
            clock: SimulationClock::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Schedule `payload` to fire `delay` time units from now
    ///
    /// # Panics
    /// Panics if `delay` is negative or not finite.
    pub fn schedule_after(&mut self, delay: f64, payload: P) -> EventId {
        assert!(delay.is_finite() && delay >= 0.0, "invalid event delay: {}", delay);
        let due = self.now() + delay;
        self.schedule_at(due, payload)
    }

    /// Schedule `payload` to fire at `at`
    ///
    /// # Panics
    /// Panics if `at` lies in the past.
    pub fn schedule_at(&mut self, at: SimTime, payload: P) -> EventId {
        assert!(at >= self.now(), "cannot schedule in the past: now={}, at={}", self.now(), at);
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.queue.push(Event { id, due: at, payload });
        id
    }

    /// Withdraw a pending event; returns whether it was still pending
    pub fn cancel(&mut self, id: EventId) -> bool {
        self.live.remove(&id)
    }

    /// Pop the earliest pending event due strictly before `until`
    ///
    /// The clock advances to the event's due time.
    pub fn pop_before(&mut self, until: SimTime) -> Option<Event<P>> {
        loop {
            let head = self.queue.peek()?;
            if !self.live.contains(&head.id) {
                self.queue.pop();
                continue;
            }
            if head.due >= until {
                return None;
            }
            let event = self.queue.pop()?;
            self.live.remove(&event.id);
            self.clock.advance_to(event.due);
            return Some(event);
        }
    }

    /// Due time of the earliest pending event
    pub fn peek_due(&self) -> Option<SimTime> {
        self.queue.iter().filter(|e| self.live.contains(&e.id)).map(|e| e.due).min()
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, to: SimTime) {
        self.clock.advance_to(to);
    }

    /// Drop every pending event; returns how many were live
    pub fn discard_pending(&mut self) -> usize {
        let discarded = self.live.len();
        self.queue.clear();
        self.live.clear();
        discarded
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no event is pending
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl<P> Default for Scheduler<P> {
    fn default() -> Self {
        Self::new()
    }
}
