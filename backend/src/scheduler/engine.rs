//! Event scheduler - main simulation loop
//!
//! Owns virtual time and the pending-event queue, and drives execution in
//! `(time, sequence)` order.
//!
//! # Run Loop
//!
//! ```text
//! while queue not empty && !stop(scheduler):
//!     pop earliest (time, sequence, event)
//!     current_time = time
//!     yield event.run()      <- may call scheduler.schedule(...)
//! ```
//!
//! # Critical Invariants
//!
//! - **Monotonic time**: `current_time` never decreases
//! - **Deterministic order**: equal timestamps execute in scheduling order
//! - **Single occupancy**: an event is queued at most once until popped
//! - **No nested runs**: `run` fails with `ReentrantRun` while a run is active
//!
//! # Sharing
//!
//! Every method takes `&self`, so actions may schedule continuations on the
//! scheduler that is executing them. Wrap the scheduler in an `Rc` and let
//! actions capture a clone (or a `Weak`, to avoid keeping the scheduler alive
//! through events still sitting in its queue).

use crate::core::time::{SimTime, TimeError};
use crate::models::event::{ActionError, Event, EventError};
use crate::models::trace::{Trace, TraceEntry};
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::queue::{EventQueue, Scheduled};
use crate::stop::{never, StopCondition};
use std::cell::{Cell, RefCell};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Errors surfaced by `schedule` and `run`
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid event time: {0}")]
    InvalidEventTime(#[from] TimeError),

    #[error("Cannot schedule event at t={requested} when current time is t={current}")]
    InvalidSchedule { requested: f64, current: f64 },

    #[error("Scheduler is already running")]
    ReentrantRun,

    #[error("Event at t={time} is already queued")]
    AlreadyQueued { time: f64 },

    #[error("Action failed at t={time}: {source}")]
    ActionFailed {
        time: f64,
        #[source]
        source: ActionError,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl From<EventError> for SchedulerError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::InvalidEventTime(time_err) => SchedulerError::InvalidEventTime(time_err),
        }
    }
}

/// Discrete-event scheduler
///
/// # Example
///
/// ```rust
/// use event_sim_core_rs::{max_time_stop, Context, Event, EventScheduler};
///
/// let scheduler = EventScheduler::new();
/// scheduler.schedule(Event::from_fn(1.0, Context::new(), |_| Ok("first"))?)?;
/// scheduler.schedule(Event::from_fn(2.0, Context::new(), |_| Ok("second"))?)?;
///
/// let trace = scheduler.run(max_time_stop(2.0))?.collect_trace()?;
/// assert_eq!(trace.len(), 2);
/// assert_eq!(scheduler.current_time(), 2.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EventScheduler<R> {
    config: SchedulerConfig,

    /// Virtual clock, advanced only by popping events
    current_time: Cell<SimTime>,

    queue: RefCell<EventQueue<R>>,

    /// Tie-breaker assigned on every `schedule` call
    next_sequence: Cell<u64>,

    /// Events popped so far, including deactivated ones
    events_processed: Cell<u64>,

    /// Queue length that triggers the next automatic compaction
    compaction_watermark: Cell<usize>,

    running: Cell<bool>,
}

impl<R> EventScheduler<R> {
    /// Create an idle scheduler at time 0 with an empty queue
    pub fn new() -> Self {
        Self::from_parts(SchedulerConfig::default())
    }

    /// Create a scheduler with explicit configuration
    ///
    /// # Errors
    /// `SchedulerError::InvalidConfig` if the configuration fails validation.
    pub fn with_config(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: SchedulerConfig) -> Self {
        let watermark = config.compaction_threshold.unwrap_or(usize::MAX);
        Self {
            config,
            current_time: Cell::new(SimTime::ZERO),
            queue: RefCell::new(EventQueue::new()),
            next_sequence: Cell::new(0),
            events_processed: Cell::new(0),
            compaction_watermark: Cell::new(watermark),
            running: Cell::new(false),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn current_time(&self) -> f64 {
        self.current_time.get().as_f64()
    }

    pub fn now(&self) -> SimTime {
        self.current_time.get()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Number of queued events, deactivated ones included
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Time of the next event to pop
    pub fn peek_time(&self) -> Option<f64> {
        self.queue.borrow().peek_min().map(|s| s.time.as_f64())
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed.get()
    }

    /// Sequence number the next `schedule` call will assign
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.get()
    }

    /// Queue an event and return the same handle
    ///
    /// Safe to call from inside an executing action. While idle, an event
    /// earlier than the current time is accepted; the next run fails with
    /// `InvalidSchedule` when it reaches it.
    ///
    /// # Errors
    /// * `InvalidSchedule` - a run is active and the event time is before
    ///   the current virtual time
    /// * `AlreadyQueued` - this event is still waiting in a queue
    pub fn schedule(&self, event: Event<R>) -> Result<Event<R>, SchedulerError> {
        let time = event.sim_time();
        let current = self.now();

        if self.is_running() && time < current {
            warn!(
                requested = time.as_f64(),
                current = current.as_f64(),
                "Rejected event scheduled in the past"
            );
            return Err(SchedulerError::InvalidSchedule {
                requested: time.as_f64(),
                current: current.as_f64(),
            });
        }

        if event.is_queued() {
            return Err(SchedulerError::AlreadyQueued {
                time: time.as_f64(),
            });
        }

        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        event.set_queued(true);

        let pending = {
            let mut queue = self.queue.borrow_mut();
            queue.push(time, sequence, event.clone());
            queue.len()
        };
        debug!(time = time.as_f64(), sequence, pending, "Event scheduled");

        if pending >= self.compaction_watermark.get() {
            self.compact();
            self.raise_compaction_watermark();
        }

        Ok(event)
    }

    /// Purge deactivated events from the queue
    ///
    /// Purged events will not run even if reactivated later, unless they are
    /// scheduled again. Returns the number of events removed.
    pub fn compact(&self) -> usize {
        let removed = self.queue.borrow_mut().remove_inactive();
        if removed > 0 {
            debug!(removed, pending = self.pending_count(), "Compacted event queue");
        }
        removed
    }

    /// Next automatic pass waits until the queue doubles again, so a queue of
    /// live events is scanned a logarithmic number of times
    fn raise_compaction_watermark(&self) {
        if let Some(threshold) = self.config.compaction_threshold {
            let next = self.pending_count().saturating_mul(2).max(threshold);
            self.compaction_watermark.set(next);
        }
    }

    /// Start a run that executes events until the queue drains or `stop` fires
    ///
    /// The returned iterator is lazy: nothing executes until it is polled.
    /// It stops for good after the first error; the failing event has
    /// already been consumed, so calling `run` again resumes with the rest
    /// of the queue.
    ///
    /// # Errors
    /// `ReentrantRun` if another run on this scheduler is still alive.
    pub fn run<S>(&self, stop: S) -> Result<Run<'_, R, S>, SchedulerError>
    where
        S: StopCondition<R>,
    {
        if self.running.replace(true) {
            warn!(current_time = self.current_time(), "Rejected nested run");
            return Err(SchedulerError::ReentrantRun);
        }

        info!(
            current_time = self.current_time(),
            pending = self.pending_count(),
            "Run started"
        );

        Ok(Run {
            scheduler: self,
            stop,
            finished: false,
        })
    }

    /// Run until the queue is empty and collect the trace
    pub fn run_to_completion(&self) -> Result<Trace<R>, SchedulerError> {
        self.run(never())?.collect_trace()
    }

    /// Pop and execute the earliest event
    fn step(&self) -> Option<Result<TraceEntry<R>, SchedulerError>> {
        let Scheduled {
            time,
            sequence,
            event,
        } = self.queue.borrow_mut().pop_min()?;
        event.set_queued(false);

        let current = self.now();
        if time < current {
            warn!(
                requested = time.as_f64(),
                current = current.as_f64(),
                sequence,
                "Popped event precedes current time"
            );
            return Some(Err(SchedulerError::InvalidSchedule {
                requested: time.as_f64(),
                current: current.as_f64(),
            }));
        }

        self.current_time.set(time);
        self.events_processed.set(self.events_processed.get() + 1);
        trace!(
            time = time.as_f64(),
            sequence,
            active = event.is_active(),
            "Executing event"
        );

        Some(
            event
                .run()
                .map_err(|source| surface_action_error(time, source)),
        )
    }
}

/// Kernel errors raised inside an action keep their identity
fn surface_action_error(time: SimTime, source: ActionError) -> SchedulerError {
    match source.downcast::<SchedulerError>() {
        Ok(err) => *err,
        Err(source) => SchedulerError::ActionFailed {
            time: time.as_f64(),
            source,
        },
    }
}

impl<R> Default for EventScheduler<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for EventScheduler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventScheduler")
            .field("current_time", &self.now())
            .field("pending", &self.pending_count())
            .field("next_sequence", &self.next_sequence())
            .field("events_processed", &self.events_processed())
            .field("running", &self.is_running())
            .finish()
    }
}

/// A single pass of the run loop, yielding one trace entry per popped event
#[must_use = "a run executes nothing until it is iterated"]
pub struct Run<'a, R, S> {
    scheduler: &'a EventScheduler<R>,
    stop: S,
    finished: bool,
}

impl<'a, R, S> Run<'a, R, S> {
    fn finish(&mut self, reason: &'static str) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.scheduler.running.set(false);
        info!(
            reason,
            current_time = self.scheduler.current_time(),
            events_processed = self.scheduler.events_processed(),
            pending = self.scheduler.pending_count(),
            "Run finished"
        );
    }
}

impl<'a, R, S: StopCondition<R>> Run<'a, R, S> {
    /// Drive the run to its end, collecting every entry
    pub fn collect_trace(self) -> Result<Trace<R>, SchedulerError> {
        self.collect()
    }
}

impl<'a, R, S: StopCondition<R>> Iterator for Run<'a, R, S> {
    type Item = Result<TraceEntry<R>, SchedulerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.scheduler.is_empty() {
            self.finish("queue drained");
            return None;
        }
        if self.stop.should_stop(self.scheduler) {
            self.finish("stop condition");
            return None;
        }

        match self.scheduler.step() {
            Some(Ok(entry)) => Some(Ok(entry)),
            Some(Err(err)) => {
                self.finish("error");
                Some(Err(err))
            }
            None => {
                self.finish("queue drained");
                None
            }
        }
    }
}

impl<'a, R, S> Drop for Run<'a, R, S> {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            self.scheduler.running.set(false);
            debug!(
                current_time = self.scheduler.current_time(),
                "Run dropped before completion"
            );
        }
    }
}
