//! Topic-based event bus for runtime events.
//!
//! Scheduler notifications are forwarded here by the simulation worker so
//! front-ends, AI triggers and loggers can subscribe to only the topics they
//! need, without ever touching the scheduler.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::StepEvent;
