//! Progress and error notifications for whoever renders the session.

use tokio::sync::broadcast;

use super::machine::MergePath;
use crate::api::StatusRecord;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Uploaded { minutes_id: i64 },
    Progress(StatusRecord),
    /// A single status check failed; polling continues on schedule.
    TransientError { minutes_id: i64, message: String },
    /// The pipeline gave up on the video. It has to be uploaded again.
    JobFailed { minutes_id: i64, progress: u8 },
    Merged { minutes_id: i64, path: MergePath },
    MergeFailed { minutes_id: i64, message: String },
    /// A response arrived for a record that is no longer on view.
    Discarded { minutes_id: i64 },
}

/// Fan-out of [`SessionEvent`]s to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
