//! Event Simulation Core - Discrete-Event Kernel
//!
//! Orders and executes time-stamped callbacks in virtual-time order.
//!
//! # Architecture
//!
//! - **core**: Virtual time (`SimTime`)
//! - **models**: Events, shared contexts, run traces
//! - **scheduler**: Priority queue and the run loop
//! - **stop**: Stop conditions evaluated before every pop
//!
//! # Critical Invariants
//!
//! 1. Events execute in ascending `(time, sequence)` order
//! 2. Equal timestamps execute in the order they were scheduled
//! 3. Virtual time never moves backwards
//! 4. Cancellation is lazy: `active` is read only when the event runs
//!
//! # Processes
//!
//! There are no coroutines. A sequential "process" is an action that, when
//! it finishes a step, schedules an event carrying the next step:
//!
//! ```rust
//! use std::rc::Rc;
//! use event_sim_core_rs::{ActionError, Context, Event, EventScheduler};
//!
//! fn tick(scheduler: &Rc<EventScheduler<u32>>, time: f64, left: u32) -> Result<(), ActionError> {
//!     let next = Rc::clone(scheduler);
//!     scheduler.schedule(Event::from_fn(time, Context::new(), move |_| {
//!         if left > 0 {
//!             tick(&next, time + 1.0, left - 1)?;
//!         }
//!         Ok(left)
//!     })?)?;
//!     Ok(())
//! }
//!
//! let scheduler = Rc::new(EventScheduler::new());
//! tick(&scheduler, 0.0, 3).unwrap();
//!
//! let trace = scheduler.run_to_completion().unwrap();
//! assert_eq!(trace.len(), 4);
//! assert_eq!(scheduler.current_time(), 3.0);
//! ```

// Module declarations
pub mod core;
pub mod models;
pub mod scheduler;
pub mod stop;

// Re-exports for convenience
pub use crate::core::time::{SimTime, TimeError};
pub use models::{
    context::Context,
    event::{action, Action, ActionError, Event, EventError},
    trace::{Trace, TraceEntry},
};
pub use scheduler::{EventQueue, EventScheduler, Run, SchedulerConfig, SchedulerError};
pub use stop::{max_time_stop, MaxTimeStop, StopCondition};
