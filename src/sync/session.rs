//! Drives one minutes id from upload or revisit to a merged record.
//!
//! [`MinutesSession`] is the only component that decides whether to poll,
//! fetch the finished result, or hydrate from history. Each decision goes
//! through the [`SyncMachine`], and every response is applied against the
//! [`RequestTag`] it was issued for, so anything that lands after a reset or
//! a switch to another id is dropped.

use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::error::SessionError;
use super::events::{EventBus, SessionEvent};
use super::machine::{Effect, FailureKind, MergePath, SyncEvent, SyncMachine, SyncPhase};
use super::poller::StatusPoller;
use super::status::{display_progress, DEFAULT_POLL_INTERVAL};
use crate::api::validation::validate_video;
use crate::api::{ApiError, JobStatus, MinutesApi, ResultPayload};
use crate::history::{fetch_history, HistoryEntry, HistoryList};
use crate::store::{MinutesAction, MinutesHandle, RequestTag, TranscriptMerge};

/// How a call to [`MinutesSession::open`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Merged(MergePath),
    /// The pipeline reported `failed`. The video has to be uploaded again.
    JobFailed { progress: u8 },
    /// Another call is already driving this id.
    InProgress,
    /// The store moved on to another record before this one finished.
    Superseded,
}

#[derive(Clone)]
pub struct MinutesSession {
    api: Arc<dyn MinutesApi>,
    store: MinutesHandle,
    machine: Arc<Mutex<SyncMachine>>,
    jobs: Arc<Mutex<HashMap<i64, JobStatus>>>,
    history: Arc<Mutex<HistoryList>>,
    events: EventBus,
    poll_interval: Duration,
}

impl MinutesSession {
    pub fn new(api: Arc<dyn MinutesApi>, store: MinutesHandle) -> Self {
        Self {
            api,
            store,
            machine: Arc::new(Mutex::new(SyncMachine::new())),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            history: Arc::new(Mutex::new(HistoryList::new())),
            events: EventBus::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn store(&self) -> &MinutesHandle {
        &self.store
    }

    pub fn api(&self) -> Arc<dyn MinutesApi> {
        Arc::clone(&self.api)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn phase(&self) -> SyncPhase {
        self.machine.lock().await.phase()
    }

    /// Record the latest known job status for an id.
    ///
    /// Ids with a queued or processing job are polled when opened; all others
    /// are loaded from history.
    pub async fn track_job(&self, minutes_id: i64, status: JobStatus) {
        self.jobs.lock().await.insert(minutes_id, status);
    }

    /// Minutes known to this session, newest first.
    pub async fn history(&self) -> HistoryList {
        self.history.lock().await.clone()
    }

    /// Replace the known minutes with the backend's list.
    pub async fn refresh_history(&self) -> Result<HistoryList, SessionError> {
        let fetched = fetch_history(self.api.as_ref()).await?;
        let mut history = self.history.lock().await;
        history.replace(fetched.entries().to_vec());
        info!("History refreshed: {} minutes", history.len());
        Ok(history.clone())
    }

    /// Validate and upload a video, returning the new minutes id.
    ///
    /// The store is reset before the upload so nothing from the previous
    /// record survives.
    pub async fn upload(&self, path: &Path) -> Result<i64, SessionError> {
        let size = validate_video(path).map_err(ApiError::from)?;
        info!("Uploading {:?} ({:.1}MB)", path, size as f64 / 1_000_000.0);

        self.reset().await;
        let response = self.api.upload_video(path).await?;
        info!(
            "Upload accepted: minutes {} is {}",
            response.minutes_id,
            response.status.as_str()
        );

        self.track_job(response.minutes_id, response.status).await;
        self.record_upload(response.minutes_id, path).await;
        self.events.publish(SessionEvent::Uploaded {
            minutes_id: response.minutes_id,
        });
        Ok(response.minutes_id)
    }

    pub async fn upload_and_open(&self, path: &Path) -> Result<(i64, SyncOutcome), SessionError> {
        let minutes_id = self.upload(path).await?;
        let outcome = self.open(minutes_id).await?;
        Ok((minutes_id, outcome))
    }

    /// Bring the store up to date for `minutes_id`.
    ///
    /// Returns once the record is merged, the job has failed, or the store has
    /// moved on. Result and history fetch errors are returned after the
    /// machine records the failure; status check errors only delay the next
    /// check.
    pub async fn open(&self, minutes_id: i64) -> Result<SyncOutcome, SessionError> {
        let job_active = self
            .jobs
            .lock()
            .await
            .get(&minutes_id)
            .is_some_and(|status| status.is_active());

        let (tag, effect) = {
            let mut machine = self.machine.lock().await;
            let current = self.store.get().await;
            let already_transcripted = current.minutes_id == minutes_id && current.is_transcripted;

            let effect = machine.dispatch(SyncEvent::Open {
                minutes_id,
                already_transcripted,
                job_active,
            });
            if effect == Effect::None && machine.phase().is_busy() {
                info!("Minutes {} is already being loaded", minutes_id);
                return Ok(SyncOutcome::InProgress);
            }
            if already_transcripted {
                info!("Minutes {} already loaded, nothing to fetch", minutes_id);
                return Ok(SyncOutcome::Merged(MergePath::AlreadyLoaded));
            }
            if let (Effect::None, Some(path)) = (effect, machine.merge_path()) {
                info!("Minutes {} was already merged via {:?}", minutes_id, path);
                return Ok(SyncOutcome::Merged(path));
            }

            let tag = if current.minutes_id == minutes_id {
                self.store.tag().await
            } else {
                self.store.load(minutes_id).await
            };
            (tag, effect)
        };

        self.drive(tag, effect).await
    }

    /// Return the store to the empty record and the machine to idle.
    pub async fn reset(&self) {
        let mut machine = self.machine.lock().await;
        machine.dispatch(SyncEvent::Reset);
        self.store.reset().await;
    }

    async fn record_upload(&self, minutes_id: i64, path: &Path) {
        let mut history = self.history.lock().await;
        if history.get_by_id(minutes_id).is_some() {
            return;
        }
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("video")
            .to_string();
        history.add(HistoryEntry {
            minutes_id,
            title,
            image_url: None,
            created_at: Utc::now(),
        });
    }

    async fn drive(&self, tag: RequestTag, mut effect: Effect) -> Result<SyncOutcome, SessionError> {
        let mut poller = StatusPoller::new(Arc::clone(&self.api), tag.minutes_id, self.poll_interval);

        loop {
            let step = match effect {
                Effect::None => return Ok(self.outcome(tag, &poller).await),
                Effect::PollNow => self.poll_once(tag, &mut poller).await,
                Effect::PollLater => {
                    let delay = poller.next_delay();
                    if delay.is_zero() {
                        return Ok(self.outcome(tag, &poller).await);
                    }
                    sleep(delay).await;
                    self.poll_once(tag, &mut poller).await
                }
                Effect::FetchResult => self.fetch_result(tag).await?,
                Effect::Hydrate => self.hydrate(tag).await?,
            };

            match step {
                Some(next) => effect = next,
                None => {
                    info!("Minutes {} was replaced, dropping its responses", tag.minutes_id);
                    self.events.publish(SessionEvent::Discarded {
                        minutes_id: tag.minutes_id,
                    });
                    return Ok(SyncOutcome::Superseded);
                }
            }
        }
    }

    async fn poll_once(&self, tag: RequestTag, poller: &mut StatusPoller) -> Option<Effect> {
        if !self.store.is_current(tag).await {
            return None;
        }

        match poller.tick().await {
            Ok(record) => {
                let effect = self
                    .advance(tag, SyncEvent::StatusObserved(record.status))
                    .await?;
                self.track_job(tag.minutes_id, record.status).await;
                self.events.publish(SessionEvent::Progress(record));

                if record.status == JobStatus::Failed {
                    error!("Processing failed for minutes {}", tag.minutes_id);
                    self.events.publish(SessionEvent::JobFailed {
                        minutes_id: tag.minutes_id,
                        progress: display_progress(&record),
                    });
                }
                Some(effect)
            }
            Err(err) => {
                let effect = self.advance(tag, SyncEvent::TickFailed).await?;
                warn!("Status check for minutes {} failed: {}", tag.minutes_id, err);
                self.events.publish(SessionEvent::TransientError {
                    minutes_id: tag.minutes_id,
                    message: err.to_string(),
                });
                Some(effect)
            }
        }
    }

    async fn fetch_result(&self, tag: RequestTag) -> Result<Option<Effect>, SessionError> {
        info!("Minutes {} completed, fetching result", tag.minutes_id);

        let fetched = match self.api.get_result(tag.minutes_id).await {
            Ok(payload) => transcript_merge(tag.minutes_id, payload),
            Err(err) => Err(err.into()),
        };

        match fetched {
            Ok(merge) => Ok(self
                .commit_merge(tag, MinutesAction::ApplyResult(merge), MergePath::ResultFetch)
                .await),
            Err(err) => self.fail_merge(tag, err).await,
        }
    }

    async fn hydrate(&self, tag: RequestTag) -> Result<Option<Effect>, SessionError> {
        info!("Loading minutes {} from history", tag.minutes_id);

        match self.api.get_history(tag.minutes_id).await {
            Ok(payload) => Ok(self
                .commit_merge(tag, MinutesAction::ApplyHistory(payload), MergePath::Hydration)
                .await),
            Err(err) => self.fail_merge(tag, err.into()).await,
        }
    }

    /// Dispatch `event` if the machine and store still belong to `tag`.
    async fn advance(&self, tag: RequestTag, event: SyncEvent) -> Option<Effect> {
        let mut machine = self.machine.lock().await;
        if machine.minutes_id() != Some(tag.minutes_id) || !self.store.is_current(tag).await {
            return None;
        }
        Some(machine.dispatch(event))
    }

    /// Write the merge into the store, provided `path` holds the claim.
    async fn commit_merge(
        &self,
        tag: RequestTag,
        action: MinutesAction,
        path: MergePath,
    ) -> Option<Effect> {
        let mut machine = self.machine.lock().await;
        if machine.minutes_id() != Some(tag.minutes_id) || machine.merge_path() != Some(path) {
            return None;
        }
        let merged = self.store.dispatch_tagged(tag, action).await?;
        let effect = machine.dispatch(SyncEvent::MergeSucceeded);
        drop(machine);

        info!(
            "Minutes {} merged via {:?} (transcript: {}, summary: {}, chat: {})",
            tag.minutes_id, path, merged.is_transcripted, merged.is_summarized, merged.is_chatting
        );
        self.events.publish(SessionEvent::Merged {
            minutes_id: tag.minutes_id,
            path,
        });
        Some(effect)
    }

    async fn fail_merge(
        &self,
        tag: RequestTag,
        err: SessionError,
    ) -> Result<Option<Effect>, SessionError> {
        if self.advance(tag, SyncEvent::MergeFailed).await.is_none() {
            return Ok(None);
        }
        error!("Loading minutes {} failed: {}", tag.minutes_id, err);
        self.events.publish(SessionEvent::MergeFailed {
            minutes_id: tag.minutes_id,
            message: err.to_string(),
        });
        Err(err)
    }

    async fn outcome(&self, tag: RequestTag, poller: &StatusPoller) -> SyncOutcome {
        let machine = self.machine.lock().await;
        if machine.minutes_id() != Some(tag.minutes_id) {
            return SyncOutcome::Superseded;
        }
        match (machine.phase(), machine.failure()) {
            (SyncPhase::MergedSuccess, _) => {
                SyncOutcome::Merged(machine.merge_path().unwrap_or(MergePath::AlreadyLoaded))
            }
            (SyncPhase::MergedFailure, Some(FailureKind::JobFailed)) => SyncOutcome::JobFailed {
                progress: poller.latest().map(display_progress).unwrap_or(0),
            },
            (SyncPhase::Polling | SyncPhase::Hydrating, _) => SyncOutcome::InProgress,
            _ => SyncOutcome::Superseded,
        }
    }
}

/// Only the first transcript segment is used.
fn transcript_merge(minutes_id: i64, payload: ResultPayload) -> Result<TranscriptMerge, SessionError> {
    if payload.minutes_id != minutes_id {
        return Err(ApiError::Decode(format!(
            "result for minutes {} requested, got minutes {}",
            minutes_id, payload.minutes_id
        ))
        .into());
    }

    let segment = payload
        .transcript
        .into_iter()
        .next()
        .filter(|segment| !segment.transcript_content.is_empty())
        .ok_or(SessionError::EmptyTranscript(minutes_id))?;

    Ok(TranscriptMerge {
        minutes_id,
        title: payload.title,
        video_url: payload.video_url,
        transcript_id: segment.transcript_id,
        transcription: segment.transcript_content,
    })
}
