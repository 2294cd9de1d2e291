//! Domain models for the event kernel

pub mod context;
pub mod event;
pub mod trace;

// Re-exports
pub use context::Context;
pub use event::{action, Action, ActionError, Event, EventError};
pub use trace::{Trace, TraceEntry};
