//! Job tracking: status polling, result fetch and history hydration.

pub mod error;
pub mod events;
pub mod machine;
pub mod poller;
pub mod session;
pub mod status;

pub use error::SessionError;
pub use events::{EventBus, SessionEvent};
pub use machine::{Effect, FailureKind, MergePath, SyncEvent, SyncMachine, SyncPhase};
pub use poller::StatusPoller;
pub use session::{MinutesSession, SyncOutcome};
pub use status::{display_progress, next_poll_delay, status_label, DEFAULT_POLL_INTERVAL};
