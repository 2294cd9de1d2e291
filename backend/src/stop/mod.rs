//! Stop conditions for the run loop
//!
//! A stop condition is a predicate over the scheduler, evaluated before every
//! pop. Any `Fn(&EventScheduler<R>) -> bool` closure qualifies, so counters
//! or flags captured by the closure can end a run too.
//!
//! # Example
//!
//! ```rust
//! use event_sim_core_rs::stop::{max_events_stop, max_time_stop, or};
//! use event_sim_core_rs::{Event, EventScheduler};
//!
//! let scheduler: EventScheduler<()> = EventScheduler::new();
//! for t in [1.0, 2.0, 3.0, 4.0] {
//!     scheduler.schedule(Event::marker(t)?)?;
//! }
//!
//! let trace = scheduler
//!     .run(or(max_time_stop(10.0), max_events_stop(2)))?
//!     .collect_trace()?;
//! assert_eq!(trace.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::scheduler::EventScheduler;

/// Predicate deciding whether a run should end before the next pop
pub trait StopCondition<R> {
    fn should_stop(&self, scheduler: &EventScheduler<R>) -> bool;
}

impl<R, F> StopCondition<R> for F
where
    F: Fn(&EventScheduler<R>) -> bool,
{
    fn should_stop(&self, scheduler: &EventScheduler<R>) -> bool {
        self(scheduler)
    }
}

/// Stops once virtual time has reached `max_time`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxTimeStop {
    max_time: f64,
}

impl MaxTimeStop {
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Bind to one scheduler, giving a zero-argument predicate
    pub fn bind<R>(self, scheduler: &EventScheduler<R>) -> impl Fn() -> bool + '_ {
        move || scheduler.current_time() >= self.max_time
    }
}

impl<R> StopCondition<R> for MaxTimeStop {
    fn should_stop(&self, scheduler: &EventScheduler<R>) -> bool {
        scheduler.current_time() >= self.max_time
    }
}

/// `true` iff `scheduler.current_time() >= max_time`
pub fn max_time_stop(max_time: f64) -> MaxTimeStop {
    MaxTimeStop { max_time }
}

/// Never stops; the run ends when the queue drains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Never;

impl<R> StopCondition<R> for Never {
    fn should_stop(&self, _scheduler: &EventScheduler<R>) -> bool {
        false
    }
}

pub fn never() -> Never {
    Never
}

/// Stops once `max_events` events have been popped over the scheduler's lifetime
///
/// Deactivated events count, since they are popped like any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxEventsStop {
    max_events: u64,
}

impl<R> StopCondition<R> for MaxEventsStop {
    fn should_stop(&self, scheduler: &EventScheduler<R>) -> bool {
        scheduler.events_processed() >= self.max_events
    }
}

pub fn max_events_stop(max_events: u64) -> MaxEventsStop {
    MaxEventsStop { max_events }
}

#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

#[derive(Debug, Clone, Copy)]
pub struct Not<A>(A);

/// Stops when both conditions hold
pub fn and<A, B>(a: A, b: B) -> And<A, B> {
    And(a, b)
}

/// Stops when either condition holds
pub fn or<A, B>(a: A, b: B) -> Or<A, B> {
    Or(a, b)
}

/// Stops when the inner condition does not hold
pub fn not<A>(a: A) -> Not<A> {
    Not(a)
}

impl<R, A: StopCondition<R>, B: StopCondition<R>> StopCondition<R> for And<A, B> {
    fn should_stop(&self, scheduler: &EventScheduler<R>) -> bool {
        self.0.should_stop(scheduler) && self.1.should_stop(scheduler)
    }
}

impl<R, A: StopCondition<R>, B: StopCondition<R>> StopCondition<R> for Or<A, B> {
    fn should_stop(&self, scheduler: &EventScheduler<R>) -> bool {
        self.0.should_stop(scheduler) || self.1.should_stop(scheduler)
    }
}

impl<R, A: StopCondition<R>> StopCondition<R> for Not<A> {
    fn should_stop(&self, scheduler: &EventScheduler<R>) -> bool {
        !self.0.should_stop(scheduler)
    }
}
