//! Summary generation for the minutes on view.

use std::sync::Arc;
use tracing::info;

use crate::api::MinutesApi;
use crate::store::{MinutesAction, MinutesHandle};
use crate::sync::SessionError;

pub struct SummaryGenerator {
    api: Arc<dyn MinutesApi>,
    store: MinutesHandle,
}

impl SummaryGenerator {
    pub fn new(api: Arc<dyn MinutesApi>, store: MinutesHandle) -> Self {
        Self { api, store }
    }

    /// Ask the backend for a markdown summary of the current transcript.
    ///
    /// Failures are returned as-is; nothing is retried.
    pub async fn generate(&self) -> Result<String, SessionError> {
        let minutes = self.store.get().await;
        let transcript_id = match minutes.transcript_id {
            Some(id) if minutes.is_transcripted => id,
            _ => return Err(SessionError::NotTranscripted(minutes.minutes_id)),
        };

        let tag = self.store.tag().await;
        info!(
            "Generating summary for minutes {} (transcript {})",
            minutes.minutes_id, transcript_id
        );
        let summary = self.api.generate_summary(transcript_id).await?;

        self.store
            .dispatch_tagged(tag, MinutesAction::ApplySummary(summary.clone()))
            .await
            .ok_or(SessionError::Superseded(tag.minutes_id))?;

        info!("Summary ready for minutes {} ({} chars)", tag.minutes_id, summary.len());
        Ok(summary)
    }
}
