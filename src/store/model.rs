//! Minutes record and chat message types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Delivery state of a locally sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: i64,
    pub role: Role,
    pub message: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(message_id: i64, message: impl Into<String>) -> Self {
        Self {
            message_id,
            role: Role::User,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// The processed-video record currently on view.
///
/// `Minutes::default()` is the empty sentinel: id 0, no transcript, no
/// summary, no chat session and no messages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Minutes {
    pub minutes_id: i64,
    pub title: String,
    pub video_url: String,
    pub transcript_id: Option<i64>,
    pub is_transcripted: bool,
    pub transcription: String,
    pub is_summarized: bool,
    pub summary: String,
    pub is_embedded: bool,
    pub session_id: Option<i64>,
    pub is_chatting: bool,
    pub messages: Vec<ChatMessage>,
    /// Delivery state of messages sent from this client, keyed by message id.
    /// Messages without an entry came from the server and count as confirmed.
    #[serde(skip)]
    pub delivery: BTreeMap<i64, DeliveryStatus>,
}

impl Minutes {
    pub fn is_sentinel(&self) -> bool {
        *self == Self::default()
    }

    pub fn delivery_of(&self, message_id: i64) -> DeliveryStatus {
        self.delivery
            .get(&message_id)
            .copied()
            .unwrap_or(DeliveryStatus::Confirmed)
    }

    /// Whether the derived flags agree with the fields they summarize.
    pub fn is_consistent(&self) -> bool {
        let transcripted = self.transcript_id.is_some() && !self.transcription.is_empty();
        self.is_transcripted == transcripted
            && self.is_summarized == !self.summary.is_empty()
            && self.is_chatting == self.session_id.is_some()
    }

    /// Next id for a message created on this client.
    ///
    /// Millisecond clock, bumped past every id already in the thread so two
    /// sends within the same millisecond stay distinct.
    pub fn next_local_message_id(&self, now_ms: i64) -> i64 {
        let highest = self.messages.iter().map(|m| m.message_id).max();
        match highest {
            Some(id) if id >= now_ms => id + 1,
            _ => now_ms,
        }
    }
}

/// Accepts RFC 3339 as well as offset-less ISO timestamps, read as UTC.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {:?}: {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_defaults() {
        let minutes = Minutes::default();
        assert!(minutes.is_sentinel());
        assert_eq!(minutes.minutes_id, 0);
        assert!(minutes.transcript_id.is_none());
        assert!(minutes.session_id.is_none());
        assert!(minutes.messages.is_empty());
        assert!(minutes.is_consistent());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
        assert_eq!(parsed.as_str(), "user");
    }

    #[test]
    fn test_message_accepts_naive_timestamp() {
        let json = r#"{"message_id": 3, "role": "assistant", "message": "hi", "created_at": "2025-06-01T09:30:00.123456"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.created_at.to_rfc3339(), "2025-06-01T09:30:00.123456+00:00");
    }

    #[test]
    fn test_message_accepts_rfc3339_timestamp() {
        let json = r#"{"message_id": 3, "role": "user", "message": "hi", "created_at": "2025-06-01T09:30:00+09:00"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.created_at.to_rfc3339(), "2025-06-01T00:30:00+00:00");
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_delivery_defaults_to_confirmed() {
        let mut minutes = Minutes::default();
        assert_eq!(minutes.delivery_of(9), DeliveryStatus::Confirmed);
        minutes.delivery.insert(9, DeliveryStatus::Failed);
        assert_eq!(minutes.delivery_of(9), DeliveryStatus::Failed);
    }

    #[test]
    fn test_next_local_message_id() {
        let mut minutes = Minutes::default();
        assert_eq!(minutes.next_local_message_id(1_000), 1_000);

        minutes.messages.push(ChatMessage::user(1_000, "first"));
        assert_eq!(minutes.next_local_message_id(1_000), 1_001);
        assert_eq!(minutes.next_local_message_id(5_000), 5_000);
    }
}
