//! Shared handle around the current minutes record.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::model::{ChatMessage, Minutes};
use super::reducer::{reduce, MinutesAction};

/// Identifies the record a request was issued for.
///
/// A response may only be applied while its tag is still current; any reset
/// or load of another id in the meantime makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTag {
    pub minutes_id: i64,
    generation: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    minutes: Minutes,
    generation: u64,
}

/// Thread-safe handle passed to every component that reads or mutates minutes.
#[derive(Clone, Default)]
pub struct MinutesHandle {
    inner: Arc<Mutex<StoreState>>,
}

impl MinutesHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Minutes {
        self.inner.lock().await.minutes.clone()
    }

    /// Apply one action as a single snapshot and return the new record.
    pub async fn dispatch(&self, action: MinutesAction) -> Minutes {
        let mut state = self.inner.lock().await;
        if action.starts_new_record() {
            state.generation += 1;
        }
        state.minutes = reduce(&state.minutes, action);
        state.minutes.clone()
    }

    /// Apply `action` only if `tag` still names the current record.
    pub async fn dispatch_tagged(&self, tag: RequestTag, action: MinutesAction) -> Option<Minutes> {
        let mut state = self.inner.lock().await;
        if !Self::matches(&state, tag) {
            debug!(
                "Discarding response for minutes {} (generation {}, current {} / {})",
                tag.minutes_id, tag.generation, state.minutes.minutes_id, state.generation
            );
            return None;
        }
        if action.starts_new_record() {
            state.generation += 1;
        }
        state.minutes = reduce(&state.minutes, action);
        Some(state.minutes.clone())
    }

    pub async fn tag(&self) -> RequestTag {
        let state = self.inner.lock().await;
        RequestTag {
            minutes_id: state.minutes.minutes_id,
            generation: state.generation,
        }
    }

    pub async fn is_current(&self, tag: RequestTag) -> bool {
        let state = self.inner.lock().await;
        Self::matches(&state, tag)
    }

    pub async fn add_message(&self, msg: ChatMessage) -> Minutes {
        self.dispatch(MinutesAction::AddMessage(msg)).await
    }

    /// Replace the record with an empty one for `minutes_id`.
    pub async fn load(&self, minutes_id: i64) -> RequestTag {
        let mut state = self.inner.lock().await;
        state.generation += 1;
        state.minutes = reduce(&state.minutes, MinutesAction::Load(minutes_id));
        RequestTag {
            minutes_id,
            generation: state.generation,
        }
    }

    pub async fn reset(&self) {
        self.dispatch(MinutesAction::Reset).await;
    }

    fn matches(state: &StoreState, tag: RequestTag) -> bool {
        state.generation == tag.generation && state.minutes.minutes_id == tag.minutes_id
    }
}
