//! HTTP implementation of [`MinutesApi`] against the minutes backend.
//!
//! Every request carries the bearer token from a [`CredentialSource`]. When
//! no token is available the call fails with [`ApiError::Unauthorized`]
//! without touching the network. Non-success responses are returned as
//! [`ApiError::Upstream`] with the body exactly as received.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info};

use super::error::{ApiError, ValidationError};
use super::types::{
    ChatReply, ChatSendRequest, ChatStartRequest, ChatStartResponse, HistoryPayload,
    MinutesListItem, MinutesListResponse, ResultPayload, StatusRecord, SummaryRequest,
    SummaryResponse, UploadResponse,
};
use super::validation::{extension_of, mime_type_for_extension};
use super::MinutesApi;

/// Supplies the bearer credential for backend calls.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A token fixed at startup, typically from config or the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

impl CredentialSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

pub struct HttpMinutesApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Box<dyn CredentialSource>,
}

impl HttpMinutesApi {
    pub fn new(base_url: &str, credentials: Box<dyn CredentialSource>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Using minutes backend at {}", base_url);
        Self {
            client: reqwest::Client::new(),
            base_url,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<String, ApiError> {
        self.credentials
            .bearer_token()
            .ok_or(ApiError::Unauthorized)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, i64)],
    ) -> Result<T, ApiError> {
        let token = self.token()?;
        debug!("GET {} {:?}", path, query);

        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        read_json(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let token = self.token()?;
        debug!("POST {}", path);

        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        read_json(path, response).await
    }
}

async fn read_json<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        error!("{} failed with status {}: {}", path, status, body);
        return Err(ApiError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ApiError::Decode(format!("{} returned invalid JSON: {}", path, e)))
}

#[async_trait]
impl MinutesApi for HttpMinutesApi {
    async fn upload_video(&self, path: &Path) -> Result<UploadResponse, ApiError> {
        let token = self.token()?;

        let mime_type = mime_type_for_extension(&extension_of(path))
            .ok_or_else(|| ValidationError::UnsupportedFormat(extension_of(path)))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|_| ValidationError::NotFound(path.to_path_buf()))?;
        let size = file
            .metadata()
            .await
            .map_err(|_| ValidationError::NotFound(path.to_path_buf()))?
            .len();

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(ReaderStream::new(file)), size)
            .file_name(filename)
            .mime_str(mime_type)?;
        let form = Form::new().part("file", part);

        info!("Uploading {:?} ({} bytes)", path, size);
        let response = self
            .client
            .post(self.url("/api/upload_video"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        read_json("/api/upload_video", response).await
    }

    async fn get_status(&self, minutes_id: i64) -> Result<StatusRecord, ApiError> {
        self.get_json("/api/upload_status", &[("minutes_id", minutes_id)])
            .await
    }

    async fn get_result(&self, minutes_id: i64) -> Result<ResultPayload, ApiError> {
        self.get_json("/api/upload_result", &[("minutes_id", minutes_id)])
            .await
    }

    async fn get_history(&self, minutes_id: i64) -> Result<HistoryPayload, ApiError> {
        self.get_json("/api/get_minutes_list", &[("minutes_id", minutes_id)])
            .await
    }

    async fn list_minutes(&self) -> Result<Vec<MinutesListItem>, ApiError> {
        let response: MinutesListResponse = self.get_json("/api/get_all_minutes", &[]).await?;
        Ok(response.minutes)
    }

    async fn generate_summary(&self, transcript_id: i64) -> Result<String, ApiError> {
        let response: SummaryResponse = self
            .post_json("/api/generate_summary", &SummaryRequest { transcript_id })
            .await?;
        Ok(response.summary)
    }

    async fn start_chat(&self, minutes_id: i64) -> Result<i64, ApiError> {
        let response: ChatStartResponse = self
            .post_json("/api/start_chat", &ChatStartRequest { minutes_id })
            .await?;
        Ok(response.session_id)
    }

    async fn send_chat(&self, session_id: i64, message: &str) -> Result<ChatReply, ApiError> {
        self.post_json("/api/send_chat", &ChatSendRequest { session_id, message })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token_ignores_blank() {
        assert!(StaticToken::new(Some("   ".to_string())).bearer_token().is_none());
        assert!(StaticToken::new(None).bearer_token().is_none());
        assert_eq!(
            StaticToken::new(Some("abc".to_string())).bearer_token(),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpMinutesApi::new("http://localhost:8000/", Box::new(StaticToken::default()));
        assert_eq!(api.url("/api/upload_status"), "http://localhost:8000/api/upload_status");
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        // Port 9 is discard; an attempted request would fail as a network error instead.
        let api = HttpMinutesApi::new("http://127.0.0.1:9", Box::new(StaticToken::default()));
        let err = api.get_status(1).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
