//! Scheduler - virtual clock, event queue and run loop
//!
//! See `engine.rs` for the run loop itself.

pub mod config;
pub mod engine;
pub mod queue;

// Re-export main types for convenience
pub use config::SchedulerConfig;
pub use engine::{EventScheduler, Run, SchedulerError};
pub use queue::{EventQueue, Scheduled};
