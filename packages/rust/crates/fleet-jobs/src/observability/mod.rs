//! Stable event ids attached to structured supervision logs.

mod supervisor_events;

pub use supervisor_events::SupervisorEvent;
