//! Broadcasting of registry changes to UI observers.

pub mod job_events;

pub use job_events::{JobEvent, JobEventBroadcaster, RemovalReason};
