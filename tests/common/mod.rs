//! Scripted backend shared by the orchestration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use minutes_client::api::{
    ApiError, ChatReply, HistoryPayload, JobStatus, MinutesApi, MinutesListItem, ResultPayload,
    StatusRecord, TranscriptSegment, UploadResponse,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Default)]
pub struct Calls {
    pub upload: AtomicUsize,
    pub status: AtomicUsize,
    pub result: AtomicUsize,
    pub history: AtomicUsize,
    pub list: AtomicUsize,
    pub summary: AtomicUsize,
    pub start_chat: AtomicUsize,
    pub send_chat: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub calls: Calls,
    pub upload: Mutex<Option<UploadResponse>>,
    pub statuses: Mutex<VecDeque<Result<StatusRecord, ApiError>>>,
    pub result: Mutex<Option<ResultPayload>>,
    pub result_gate: Mutex<Option<Arc<Notify>>>,
    pub history: Mutex<Option<HistoryPayload>>,
    pub list: Mutex<Vec<MinutesListItem>>,
    pub summary: Mutex<Option<String>>,
    pub session_id: Mutex<Option<i64>>,
    pub replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_upload(self: Arc<Self>, minutes_id: i64) -> Arc<Self> {
        *self.upload.lock().unwrap() = Some(UploadResponse {
            status: JobStatus::Queued,
            minutes_id,
        });
        self
    }

    pub fn with_statuses(self: Arc<Self>, minutes_id: i64, script: &[(JobStatus, u8)]) -> Arc<Self> {
        let mut statuses = self.statuses.lock().unwrap();
        for (status, progress) in script {
            statuses.push_back(Ok(StatusRecord {
                minutes_id,
                status: *status,
                progress: *progress,
            }));
        }
        drop(statuses);
        self
    }

    pub fn push_status_error(&self, err: ApiError) {
        self.statuses.lock().unwrap().push_back(Err(err));
    }

    pub fn with_result(self: Arc<Self>, minutes_id: i64, transcript_id: i64, content: &str) -> Arc<Self> {
        *self.result.lock().unwrap() = Some(ResultPayload {
            minutes_id,
            title: "clip".to_string(),
            video_url: format!("https://videos.example/{}.mp4", minutes_id),
            transcript: vec![TranscriptSegment {
                transcript_id,
                transcript_content: content.to_string(),
            }],
        });
        self
    }

    pub fn with_history(self: Arc<Self>, payload: HistoryPayload) -> Arc<Self> {
        *self.history.lock().unwrap() = Some(payload);
        self
    }

    pub fn with_summary(self: Arc<Self>, summary: &str) -> Arc<Self> {
        *self.summary.lock().unwrap() = Some(summary.to_string());
        self
    }

    pub fn with_chat_session(self: Arc<Self>, session_id: i64) -> Arc<Self> {
        *self.session_id.lock().unwrap() = Some(session_id);
        self
    }

    pub fn push_reply(&self, message_id: i64, message: &str) {
        self.replies.lock().unwrap().push_back(Ok(ChatReply {
            message_id,
            message: message.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap(),
        }));
    }

    pub fn push_reply_error(&self, err: ApiError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub fn gate_result(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.result_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }
}

fn server_error() -> ApiError {
    ApiError::Upstream {
        status: 500,
        body: r#"{"detail":"internal error"}"#.to_string(),
    }
}

#[async_trait]
impl MinutesApi for FakeApi {
    async fn upload_video(&self, _path: &Path) -> Result<UploadResponse, ApiError> {
        self.calls.upload.fetch_add(1, Ordering::SeqCst);
        self.upload.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn get_status(&self, _minutes_id: i64) -> Result<StatusRecord, ApiError> {
        self.calls.status.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .expect("status script exhausted")
    }

    async fn get_result(&self, _minutes_id: i64) -> Result<ResultPayload, ApiError> {
        self.calls.result.fetch_add(1, Ordering::SeqCst);
        let gate = self.result_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.result.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn get_history(&self, _minutes_id: i64) -> Result<HistoryPayload, ApiError> {
        self.calls.history.fetch_add(1, Ordering::SeqCst);
        self.history.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn list_minutes(&self) -> Result<Vec<MinutesListItem>, ApiError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        Ok(self.list.lock().unwrap().clone())
    }

    async fn generate_summary(&self, _transcript_id: i64) -> Result<String, ApiError> {
        self.calls.summary.fetch_add(1, Ordering::SeqCst);
        self.summary.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn start_chat(&self, _minutes_id: i64) -> Result<i64, ApiError> {
        self.calls.start_chat.fetch_add(1, Ordering::SeqCst);
        self.session_id.lock().unwrap().ok_or_else(server_error)
    }

    async fn send_chat(&self, session_id: i64, message: &str) -> Result<ChatReply, ApiError> {
        self.calls.send_chat.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((session_id, message.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(server_error()))
    }
}

/// A small file with a supported extension.
pub fn video_file(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"not really a video").unwrap();
    path
}
