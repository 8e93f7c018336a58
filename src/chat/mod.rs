//! Chat about the minutes on view.
//!
//! A record has no session until [`ChatController::start`] succeeds, and
//! keeps it until the store is reset. Sent messages appear immediately with
//! a pending delivery status; the server's answer confirms them, a failure
//! marks them failed but leaves them in the thread.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::MinutesApi;
use crate::store::{ChatMessage, MinutesAction, MinutesHandle, Role};
use crate::sync::SessionError;

pub struct ChatController {
    api: Arc<dyn MinutesApi>,
    store: MinutesHandle,
}

impl ChatController {
    pub fn new(api: Arc<dyn MinutesApi>, store: MinutesHandle) -> Self {
        Self { api, store }
    }

    /// Open a chat session for `minutes_id`, or return the one already open.
    pub async fn start(&self, minutes_id: i64) -> Result<i64, SessionError> {
        let minutes = self.store.get().await;
        if minutes.minutes_id != minutes_id {
            return Err(SessionError::Superseded(minutes_id));
        }
        if !minutes.is_transcripted {
            return Err(SessionError::NotTranscripted(minutes_id));
        }
        if let Some(session_id) = minutes.session_id {
            return Ok(session_id);
        }

        let tag = self.store.tag().await;
        let session_id = self.api.start_chat(minutes_id).await?;
        self.store
            .dispatch_tagged(tag, MinutesAction::OpenChat(session_id))
            .await
            .ok_or(SessionError::Superseded(minutes_id))?;

        info!("Chat session {} started for minutes {}", session_id, minutes_id);
        Ok(session_id)
    }

    /// Send `text` and return the assistant's reply.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let minutes = self.store.get().await;
        let session_id = minutes
            .session_id
            .ok_or(SessionError::NoSession(minutes.minutes_id))?;

        let tag = self.store.tag().await;
        let pending = self
            .store
            .dispatch_tagged(
                tag,
                MinutesAction::SendPending {
                    text: text.to_string(),
                    sent_at: Utc::now(),
                },
            )
            .await
            .ok_or(SessionError::Superseded(tag.minutes_id))?;
        let local_id = pending
            .messages
            .last()
            .map(|m| m.message_id)
            .ok_or(SessionError::Superseded(tag.minutes_id))?;

        match self.api.send_chat(session_id, text).await {
            Ok(reply) => {
                let reply = ChatMessage {
                    message_id: reply.message_id,
                    role: Role::Assistant,
                    message: reply.message,
                    created_at: reply.created_at,
                };
                self.store
                    .dispatch_tagged(
                        tag,
                        MinutesAction::ConfirmDelivery {
                            message_id: local_id,
                            reply: reply.clone(),
                        },
                    )
                    .await
                    .ok_or(SessionError::Superseded(tag.minutes_id))?;
                Ok(reply)
            }
            Err(err) => {
                warn!("Chat message in session {} failed: {}", session_id, err);
                self.store
                    .dispatch_tagged(tag, MinutesAction::FailDelivery(local_id))
                    .await;
                Err(err.into())
            }
        }
    }
}
