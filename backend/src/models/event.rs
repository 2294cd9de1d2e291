//! Time-stamped units of deferred work.
//!
//! An [`Event`] pairs a virtual timestamp with an optional action and a shared
//! [`Context`]. Events are handles: cloning one yields another reference to the
//! same event, which is how a caller keeps the ability to cancel it after
//! handing it to the scheduler.
//!
//! # Lazy Cancellation
//!
//! The `active` flag is read exactly once, when the event is executed. A
//! deactivated event stays in the queue until its time comes and then runs
//! as a no-op, producing `(time, None, context)`.
//!
//! # Example
//!
//! ```rust
//! use event_sim_core_rs::{action, Context, Event};
//!
//! let ctx: Context = [("key", "value")].into_iter().collect();
//! let event = Event::new(5.0, Some(action(|_| Ok("log_entry".to_string()))), ctx).unwrap();
//!
//! let entry = event.run().unwrap();
//! assert_eq!(entry.time, 5.0);
//! assert_eq!(entry.result.as_deref(), Some("log_entry"));
//! ```

use crate::core::time::{SimTime, TimeError};
use crate::models::context::Context;
use crate::models::trace::TraceEntry;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

/// Error type returned by actions
///
/// Any error type can be propagated out of an action with `?`.
pub type ActionError = Box<dyn std::error::Error>;

/// The work attached to an event
pub type Action<R> = Box<dyn Fn(&Context) -> Result<R, ActionError>>;

/// Box a closure as an [`Action`]
///
/// Lets the compiler infer the closure's argument type.
pub fn action<R, F>(f: F) -> Action<R>
where
    F: Fn(&Context) -> Result<R, ActionError> + 'static,
{
    Box::new(f)
}

/// Errors that can occur when constructing an event
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EventError {
    #[error("Invalid event time: {0}")]
    InvalidEventTime(#[from] TimeError),
}

struct EventInner<R> {
    time: SimTime,
    action: Option<Action<R>>,
    context: Context,
    active: Cell<bool>,
    queued: Cell<bool>,
}

/// A scheduled (or schedulable) simulation event
pub struct Event<R> {
    inner: Rc<EventInner<R>>,
}

impl<R> Event<R> {
    /// Create a new event
    ///
    /// # Arguments
    /// * `time` - Virtual time at which the event fires
    /// * `action` - Work to perform, `None` for a pure time marker
    /// * `context` - State shared with the action
    ///
    /// # Errors
    /// `EventError::InvalidEventTime` if `time` is negative, NaN or infinite.
    pub fn new(time: f64, action: Option<Action<R>>, context: Context) -> Result<Self, EventError> {
        let time = SimTime::new(time)?;
        Ok(Self {
            inner: Rc::new(EventInner {
                time,
                action,
                context,
                active: Cell::new(true),
                queued: Cell::new(false),
            }),
        })
    }

    /// Event with no action and an empty context
    pub fn marker(time: f64) -> Result<Self, EventError> {
        Self::new(time, None, Context::new())
    }

    /// Event whose action is the given closure
    pub fn from_fn<F>(time: f64, context: Context, f: F) -> Result<Self, EventError>
    where
        F: Fn(&Context) -> Result<R, ActionError> + 'static,
    {
        Self::new(time, Some(action(f)), context)
    }

    pub fn time(&self) -> f64 {
        self.inner.time.as_f64()
    }

    pub fn sim_time(&self) -> SimTime {
        self.inner.time
    }

    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    pub fn has_action(&self) -> bool {
        self.inner.action.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Mark the event as runnable (idempotent)
    pub fn activate(&self) {
        self.inner.active.set(true);
    }

    /// Cancel the event (idempotent)
    ///
    /// Takes effect if called any time before the scheduler pops the event.
    pub fn deactivate(&self) {
        self.inner.active.set(false);
    }

    /// Returns `true` while the event sits in a scheduler queue
    pub fn is_queued(&self) -> bool {
        self.inner.queued.get()
    }

    pub(crate) fn set_queued(&self, queued: bool) {
        self.inner.queued.set(queued);
    }

    /// Returns `true` if both handles refer to the same event
    pub fn ptr_eq(&self, other: &Event<R>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Execute the event
    ///
    /// Calls the action with the event's context iff the event is active and
    /// has an action. Never changes `time` or `active`.
    ///
    /// # Errors
    /// Whatever the action returns; the kernel does not swallow action errors.
    pub fn run(&self) -> Result<TraceEntry<R>, ActionError> {
        let result = match &self.inner.action {
            Some(action) if self.is_active() => Some(action(&self.inner.context)?),
            _ => None,
        };

        Ok(TraceEntry {
            time: self.time(),
            result,
            context: self.inner.context.clone(),
        })
    }
}

impl<R> Clone for Event<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R> std::fmt::Debug for Event<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("time", &self.inner.time)
            .field("has_action", &self.has_action())
            .field("active", &self.is_active())
            .field("queued", &self.is_queued())
            .field("context", &self.inner.context)
            .finish()
    }
}
