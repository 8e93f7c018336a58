//! Sync state machine for one minutes id.
//!
//! idle → polling → merged_success | merged_failure
//! idle → hydrating → merged_success | merged_failure
//!
//! The record is merged at most once per opened id. Whichever path first
//! claims the merge (result fetch after an observed `completed`, or history
//! hydration when no job is active) owns it, and the other path is never
//! started. The claim lasts until `Reset` or an open of another id, even when
//! the hydrated record had no transcript yet.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::JobStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Polling,
    Hydrating,
    MergedSuccess,
    MergedFailure,
}

impl SyncPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
            Self::Hydrating => "hydrating",
            Self::MergedSuccess => "merged_success",
            Self::MergedFailure => "merged_failure",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Polling | Self::Hydrating)
    }
}

/// Which code path wrote the transcript into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePath {
    ResultFetch,
    Hydration,
    /// The store already held the transcript when the id was opened.
    AlreadyLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The pipeline reported `failed`; the video has to be uploaded again.
    JobFailed,
    /// Fetching the result or history failed.
    FetchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    Open {
        minutes_id: i64,
        already_transcripted: bool,
        job_active: bool,
    },
    StatusObserved(JobStatus),
    TickFailed,
    MergeSucceeded,
    MergeFailed,
    Reset,
}

/// What the driver has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    PollNow,
    PollLater,
    FetchResult,
    Hydrate,
}

#[derive(Debug, Clone, Default)]
pub struct SyncMachine {
    minutes_id: Option<i64>,
    phase: SyncPhase,
    merge: Option<MergePath>,
    failure: Option<FailureKind>,
}

impl SyncMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn minutes_id(&self) -> Option<i64> {
        self.minutes_id
    }

    pub fn merge_path(&self) -> Option<MergePath> {
        self.merge
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn dispatch(&mut self, event: SyncEvent) -> Effect {
        let before = self.phase;
        let effect = self.transition(event);
        debug!(
            "Sync {:?}: {} -> {} ({:?})",
            event,
            before.as_str(),
            self.phase.as_str(),
            effect
        );
        effect
    }

    fn transition(&mut self, event: SyncEvent) -> Effect {
        match (self.phase, event) {
            (_, SyncEvent::Reset) => {
                *self = Self::default();
                Effect::None
            }

            (
                phase,
                SyncEvent::Open {
                    minutes_id,
                    already_transcripted,
                    job_active,
                },
            ) => {
                // A merged id keeps its claim until Reset; only a failed
                // attempt may be retried.
                let keeps_claim = phase.is_busy() || phase == SyncPhase::MergedSuccess;
                if keeps_claim && self.minutes_id == Some(minutes_id) {
                    return Effect::None;
                }
                *self = Self {
                    minutes_id: Some(minutes_id),
                    ..Self::default()
                };
                if already_transcripted {
                    self.phase = SyncPhase::MergedSuccess;
                    self.merge = Some(MergePath::AlreadyLoaded);
                    Effect::None
                } else if job_active {
                    self.phase = SyncPhase::Polling;
                    Effect::PollNow
                } else {
                    self.phase = SyncPhase::Hydrating;
                    self.claim(MergePath::Hydration)
                }
            }

            (SyncPhase::Polling, SyncEvent::StatusObserved(status)) => match status {
                JobStatus::Queued | JobStatus::Processing => Effect::PollLater,
                JobStatus::Completed => self.claim(MergePath::ResultFetch),
                JobStatus::Failed => {
                    self.phase = SyncPhase::MergedFailure;
                    self.failure = Some(FailureKind::JobFailed);
                    Effect::None
                }
            },

            (SyncPhase::Polling, SyncEvent::TickFailed) => {
                if self.merge.is_some() {
                    Effect::None
                } else {
                    Effect::PollLater
                }
            }

            (SyncPhase::Polling | SyncPhase::Hydrating, SyncEvent::MergeSucceeded)
                if self.merge.is_some() =>
            {
                self.phase = SyncPhase::MergedSuccess;
                Effect::None
            }

            (SyncPhase::Polling | SyncPhase::Hydrating, SyncEvent::MergeFailed)
                if self.merge.is_some() =>
            {
                self.phase = SyncPhase::MergedFailure;
                self.failure = Some(FailureKind::FetchFailed);
                Effect::None
            }

            _ => Effect::None,
        }
    }

    fn claim(&mut self, path: MergePath) -> Effect {
        if self.merge.is_some() {
            return Effect::None;
        }
        self.merge = Some(path);
        match path {
            MergePath::ResultFetch => Effect::FetchResult,
            MergePath::Hydration => Effect::Hydrate,
            MergePath::AlreadyLoaded => Effect::None,
        }
    }
}
