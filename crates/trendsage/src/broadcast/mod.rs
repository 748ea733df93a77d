//! Broadcasting of session state changes.
//!
//! Consumers (the CLI, or any other front end) subscribe here instead of
//! polling session snapshots.

pub mod session_events;

pub use session_events::{SessionEvent, SessionEventBroadcaster, SessionEventKind};
