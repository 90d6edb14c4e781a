//! Suspendable processes and the engine that drives them
//!
//! A process is an explicit state machine. Each call to [`Process::resume`]
//! runs it until it either finishes or has to wait, in which case it returns
//! the reason as a [`Yield`]: a timer, or a unit of a resource pool. The
//! [`Engine`] turns those yields into scheduled wake-ups and resumes the
//! process when the wait is over.
//!
//! Sub-flows (a database operation, the support flow) are state machines of
//! their own returning [`Step<T>`]; their parent forwards every wake-up to the
//! active sub-flow until it reports `Ready`.

use crate::simulation::{
    Acquisition, ActivityTracker, PoolGuard, PoolStats, ResourcePool, RunCounters, Scheduler,
    SimTime, TimeVariance,
};
use crate::types::{Activity, ProcessId};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info_span, trace};

/// Engine-internal handle of a live process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessKey(u64);

/// Handle of a resource pool registered with an [`Engine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(usize);

/// Resource pool whose waiters are engine processes
pub type Pool = ResourcePool<ProcessKey>;

/// Unit of an engine pool held by a process
pub type Guard = PoolGuard<ProcessKey>;

/// Why a process is being resumed
#[derive(Debug)]
pub enum Wake {
    /// First activation after spawning
    Start,
    /// The requested timeout elapsed
    Timer,
    /// The requested pool unit is now held by the process
    Granted(Guard),
}

/// What a suspended process waits for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Yield {
    /// Resume after this many time units
    Timeout(f64),
    /// Resume once a unit of this pool is granted
    Acquire(PoolId),
}

/// Result of advancing a process or sub-flow
#[derive(Debug)]
pub enum Step<T> {
    /// Suspended until the wait is satisfied
    Pending(Yield),
    /// Finished with a value
    Ready(T),
}

impl<T> Step<T> {
    /// Suspend for `delay` time units
    pub fn timeout(delay: f64) -> Self {
        Step::Pending(Yield::Timeout(delay))
    }

    /// Suspend until a unit of `pool` is granted
    pub fn acquire(pool: PoolId) -> Self {
        Step::Pending(Yield::Acquire(pool))
    }
}

/// A suspendable unit of simulated work
pub trait Process: fmt::Debug {
    /// Identity used in log output
    fn id(&self) -> ProcessId;

    /// Run until the next suspension point or completion
    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<()>;
}

/// Everything a process may touch while it runs
#[derive(Debug)]
pub struct ProcessContext<'a> {
    now: SimTime,
    id: ProcessId,
    rng: &'a mut StdRng,
    tracker: &'a ActivityTracker,
    variance: TimeVariance,
    counters: &'a mut RunCounters,
    spawned: &'a mut Vec<Box<dyn Process>>,
}

impl<'a> ProcessContext<'a> {
    /// Current virtual time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Identity of the running process
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Uniform draw in `[0, 1)` from the run's random stream
    pub fn draw(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Whether a uniform draw falls below `probability`
    pub fn chance(&mut self, probability: f64) -> bool {
        self.draw() < probability
    }

    /// Uniform integer in `low..=high`
    pub fn uniform_int(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..=high)
    }

    /// Randomized duration around `center`
    pub fn sample(&mut self, center: f64) -> f64 {
        self.variance.sample(center, &mut *self.rng)
    }

    /// The run's random stream, for policies that draw on their own
    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    /// Enter a tracked activity now
    pub fn enter(&mut self, activity: Activity) {
        self.tracker.enter(activity, self.now);
    }

    /// Exit a tracked activity now and record how long it ran since `started`
    pub fn exit(&mut self, activity: Activity, started: SimTime) {
        self.tracker.exit(activity, self.now);
        self.tracker.record_duration(activity, self.now - started);
    }

    /// Run-wide business counters
    pub fn counters(&mut self) -> &mut RunCounters {
        &mut *self.counters
    }

    /// Start another process at the current time
    pub fn spawn(&mut self, process: Box<dyn Process>) {
        self.spawned.push(process);
    }
}

#[derive(Debug)]
struct Dispatch {
    key: ProcessKey,
    wake: Wake,
}

/// Owner of the processes, pools, clock and random stream of one run
#[derive(Debug)]
pub struct Engine {
    scheduler: Scheduler<Dispatch>,
    processes: BTreeMap<ProcessKey, Box<dyn Process>>,
    pools: Vec<Pool>,
    rng: StdRng,
    tracker: Arc<ActivityTracker>,
    variance: TimeVariance,
    counters: RunCounters,
    next_key: u64,
    events_processed: u64,
}

impl Engine {
    /// Create an engine drawing from `rng` and reporting to `tracker`
    pub fn new(rng: StdRng, tracker: Arc<ActivityTracker>) -> Self {
        Self {
            scheduler: Scheduler::new(),
            processes: BTreeMap::new(),
            pools: Vec::new(),
            rng,
            tracker,
            variance: TimeVariance::new(),
            counters: RunCounters::default(),
            next_key: 0,
            events_processed: 0,
        }
    }

    /// Register a resource pool
    pub fn add_pool(&mut self, name: impl Into<String>, capacity: usize) -> PoolId {
        self.pools.push(ResourcePool::new(name, capacity));
        PoolId(self.pools.len() - 1)
    }

    /// Access a registered pool
    pub fn pool(&self, id: PoolId) -> &Pool {
        &self.pools[id.0]
    }

    /// Usage counters of every pool, in registration order
    pub fn pool_stats(&self) -> Vec<PoolStats> {
        self.pools.iter().map(ResourcePool::stats).collect()
    }

    /// Add a process; it starts at the current time, after events already due now
    pub fn spawn(&mut self, process: Box<dyn Process>) -> ProcessKey {
        let key = ProcessKey(self.next_key);
        self.next_key += 1;
        trace!(id = %process.id(), ?key, "Process spawned");
        self.processes.insert(key, process);
        self.scheduler.schedule_after(0.0, Dispatch { key, wake: Wake::Start });
        key
    }

    /// Current virtual time
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Shared activity tracker
    pub fn tracker(&self) -> &Arc<ActivityTracker> {
        &self.tracker
    }

    /// Business counters accumulated so far
    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Events fired so far
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Processes that have not finished
    pub fn live_processes(&self) -> usize {
        self.processes.len()
    }

    /// Events waiting to fire
    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    /// Fire the earliest event due strictly before `until`; returns whether one fired
    pub fn step_before(&mut self, until: SimTime) -> bool {
        match self.scheduler.pop_before(until) {
            Some(event) => {
                self.events_processed += 1;
                let Dispatch { key, wake } = event.payload;
                self.dispatch(key, wake);
                true
            }
            None => false,
        }
    }

    /// Stop at `horizon`: set the clock, drop pending events, leave processes suspended
    ///
    /// Returns the number of discarded events and of abandoned processes.
    /// Units held by abandoned processes stay held.
    pub fn truncate(&mut self, horizon: SimTime) -> (usize, usize) {
        if horizon > self.scheduler.now() {
            self.scheduler.advance_to(horizon);
        }
        let discarded = self.scheduler.discard_pending();
        let abandoned = self.processes.len();
        debug!(discarded, abandoned, "Run truncated at horizon");
        (discarded, abandoned)
    }

    fn dispatch(&mut self, key: ProcessKey, mut wake: Wake) {
        let Some(mut process) = self.processes.remove(&key) else {
            trace!(?key, "Wake-up for a finished process ignored");
            return;
        };

        let mut spawned = Vec::new();
        loop {
            let now = self.scheduler.now();
            let id = process.id();
            let step = {
                let span = info_span!("process", id = %id, t = %now);
                let _entered = span.enter();
                let mut cx = ProcessContext {
                    now,
                    id,
                    rng: &mut self.rng,
                    tracker: &self.tracker,
                    variance: self.variance,
                    counters: &mut self.counters,
                    spawned: &mut spawned,
                };
                process.resume(&mut cx, wake)
            };

            match step {
                Step::Ready(()) => {
                    trace!(%id, "Process finished");
                    drop(process);
                    break;
                }
                Step::Pending(Yield::Timeout(delay)) => {
                    self.scheduler.schedule_after(delay, Dispatch { key, wake: Wake::Timer });
                    self.processes.insert(key, process);
                    break;
                }
                Step::Pending(Yield::Acquire(pool)) => match self.pools[pool.0].request(key) {
                    Acquisition::Granted(guard) => wake = Wake::Granted(guard),
                    Acquisition::Queued => {
                        self.processes.insert(key, process);
                        break;
                    }
                },
            }
        }

        for child in spawned {
            self.spawn(child);
        }
        self.drain_handoffs();
    }

    fn drain_handoffs(&mut self) {
        for pool in &self.pools {
            for (key, guard) in pool.take_handoffs() {
                self.scheduler.schedule_after(0.0, Dispatch { key, wake: Wake::Granted(guard) });
            }
        }
    }
}
