//! Request and response bodies of the minutes backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::store::model::{deserialize_timestamp, ChatMessage};

/// Processing state of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub status: JobStatus,
    pub minutes_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub minutes_id: i64,
    pub status: JobStatus,
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscriptSegment {
    pub transcript_id: i64,
    pub transcript_content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultPayload {
    pub minutes_id: i64,
    pub title: String,
    pub video_url: String,
    #[serde(default)]
    pub transcript: Vec<TranscriptSegment>,
}

/// Persisted minutes detail. Every field may be missing or null.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct HistoryPayload {
    pub title: Option<String>,
    pub video_url: Option<String>,
    pub transcript_id: Option<i64>,
    pub transcript_content: Option<String>,
    pub summary: Option<String>,
    pub session_id: Option<i64>,
    pub messages: Option<Vec<ChatMessage>>,
    pub is_embedded: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryRequest {
    pub transcript_id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatStartRequest {
    pub minutes_id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatStartResponse {
    pub session_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatSendRequest<'a> {
    pub session_id: i64,
    pub message: &'a str,
}

/// Assistant answer to a chat message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub message_id: i64,
    pub message: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One row of the user's minutes list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinutesListItem {
    pub minutes_id: i64,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MinutesListResponse {
    #[serde(default)]
    pub minutes: Vec<MinutesListItem>,
}

// Progress is nullable until the worker first reports it.
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.unwrap_or(0).clamp(0, 100) as u8)
}
