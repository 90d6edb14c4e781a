//! Capacity-bounded resource pools with FIFO waiting
//!
//! A pool hands out at most `capacity` units at a time. Requests that cannot be
//! served immediately join a FIFO wait list. A unit is returned by dropping its
//! [`PoolGuard`]; when somebody is waiting, the unit goes straight to the
//! longest waiter and the waiter is put on the pool's hand-off list, from which
//! the engine schedules its wake-up.
//!
//! Pools are shared by the processes of one single-threaded run, hence the
//! `Rc<RefCell<_>>` inside.

use serde::Serialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug)]
struct PoolInner<W> {
    name: String,
    capacity: usize,
    held: usize,
    waiters: VecDeque<W>,
    handoffs: VecDeque<W>,
    peak_held: usize,
    grants: u64,
}

/// Outcome of [`ResourcePool::request`]
#[derive(Debug)]
pub enum Acquisition<W> {
    /// A unit was free and is now held through the guard
    Granted(PoolGuard<W>),
    /// The requester was appended to the wait list
    Queued,
}

/// Usage counters of one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Pool name
    pub name: String,
    /// Fixed capacity
    pub capacity: usize,
    /// Highest number of units held at once
    pub peak_held: usize,
    /// Total number of grants, immediate or handed off
    pub grants: u64,
}

/// A FIFO resource pool shared by simulated processes
#[derive(Debug)]
pub struct ResourcePool<W> {
    inner: Rc<RefCell<PoolInner<W>>>,
}

impl<W> Clone for ResourcePool<W> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<W: fmt::Debug> ResourcePool<W> {
    /// Create a pool with `capacity` units
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        assert!(capacity > 0, "resource pool capacity must be positive");
        Self {
            inner: Rc::new(RefCell::new(PoolInner {
                name: name.into(),
                capacity,
                held: 0,
                waiters: VecDeque::new(),
                handoffs: VecDeque::new(),
                peak_held: 0,
                grants: 0,
            })),
        }
    }

    /// Ask for one unit on behalf of `waiter`
    pub fn request(&self, waiter: W) -> Acquisition<W> {
        let mut inner = self.inner.borrow_mut();
        if inner.held < inner.capacity {
            inner.held += 1;
            inner.grants += 1;
            inner.peak_held = inner.peak_held.max(inner.held);
            trace!(pool = %inner.name, held = inner.held, ?waiter, "Unit granted");
            drop(inner);
            Acquisition::Granted(PoolGuard { pool: Rc::clone(&self.inner) })
        } else {
            let queued = inner.waiters.len() + 1;
            trace!(pool = %inner.name, queued, ?waiter, "Requester queued");
            inner.waiters.push_back(waiter);
            Acquisition::Queued
        }
    }

    /// Take every waiter that received a unit since the last call, with its guard
    pub fn take_handoffs(&self) -> Vec<(W, PoolGuard<W>)> {
        let handoffs: Vec<W> = self.inner.borrow_mut().handoffs.drain(..).collect();
        handoffs
            .into_iter()
            .map(|waiter| (waiter, PoolGuard { pool: Rc::clone(&self.inner) }))
            .collect()
    }

    /// Pool name
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Fixed capacity
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Units currently held, including units handed off but not yet picked up
    pub fn held(&self) -> usize {
        self.inner.borrow().held
    }

    /// Requesters waiting for a unit
    pub fn queue_len(&self) -> usize {
        self.inner.borrow().waiters.len()
    }

    /// Usage counters
    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.borrow();
        PoolStats {
            name: inner.name.clone(),
            capacity: inner.capacity,
            peak_held: inner.peak_held,
            grants: inner.grants,
        }
    }
}

/// One held unit of a pool; dropping it releases the unit
pub struct PoolGuard<W> {
    pool: Rc<RefCell<PoolInner<W>>>,
}

impl<W> fmt::Debug for PoolGuard<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolGuard").field("pool", &self.pool.borrow().name).finish()
    }
}

impl<W> Drop for PoolGuard<W> {
    fn drop(&mut self) {
        let mut inner = self.pool.borrow_mut();
        match inner.waiters.pop_front() {
            Some(next) => {
                inner.grants += 1;
                inner.handoffs.push_back(next);
            }
            None => {
                assert!(inner.held > 0, "release of pool {} with no held unit", inner.name);
                inner.held -= 1;
            }
        }
    }
}
