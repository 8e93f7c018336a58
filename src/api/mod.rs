//! Client side of the minutes backend.
//!
//! [`MinutesApi`] is the seam the orchestration code talks to; the HTTP
//! implementation lives in [`http`]. Operations:
//! - Upload a video and receive its minutes id
//! - Poll job status, fetch the finished result
//! - Load persisted minutes and the minutes list
//! - Generate a summary, start a chat session, send chat messages

pub mod error;
pub mod http;
pub mod types;
pub mod validation;

use async_trait::async_trait;
use std::path::Path;

pub use error::{ApiError, ValidationError};
pub use http::{CredentialSource, HttpMinutesApi, StaticToken};
pub use types::{
    ChatReply, HistoryPayload, JobStatus, MinutesListItem, ResultPayload, StatusRecord,
    TranscriptSegment, UploadResponse,
};

#[async_trait]
pub trait MinutesApi: Send + Sync {
    async fn upload_video(&self, path: &Path) -> Result<UploadResponse, ApiError>;

    async fn get_status(&self, minutes_id: i64) -> Result<StatusRecord, ApiError>;

    async fn get_result(&self, minutes_id: i64) -> Result<ResultPayload, ApiError>;

    async fn get_history(&self, minutes_id: i64) -> Result<HistoryPayload, ApiError>;

    async fn list_minutes(&self) -> Result<Vec<MinutesListItem>, ApiError>;

    async fn generate_summary(&self, transcript_id: i64) -> Result<String, ApiError>;

    async fn start_chat(&self, minutes_id: i64) -> Result<i64, ApiError>;

    async fn send_chat(&self, session_id: i64, message: &str) -> Result<ChatReply, ApiError>;
}
