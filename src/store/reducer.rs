//! Pure state transitions over a [`Minutes`] snapshot.

use chrono::{DateTime, Utc};

use super::model::{ChatMessage, DeliveryStatus, Minutes, Role};
use crate::api::types::HistoryPayload;

/// Transcript fields written by a completed job.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptMerge {
    pub minutes_id: i64,
    pub title: String,
    pub video_url: String,
    pub transcript_id: i64,
    pub transcription: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MinutesAction {
    SetMinutesId(i64),
    SetTitle(String),
    SetVideoUrl(String),
    SetTranscriptId(Option<i64>),
    SetIsTranscripted(bool),
    SetTranscription(String),
    SetIsSummarized(bool),
    SetSummary(String),
    SetIsEmbedded(bool),
    SetSessionId(Option<i64>),
    SetIsChatting(bool),
    AddMessage(ChatMessage),
    /// Terminal merge from the result endpoint. Clears summary and chat state.
    ApplyResult(TranscriptMerge),
    /// Terminal merge from persisted history. Keeps fields the payload omits.
    ApplyHistory(HistoryPayload),
    ApplySummary(String),
    OpenChat(i64),
    /// Optimistic user message awaiting the server's answer. Its id is
    /// assigned here, against the thread it is appended to.
    SendPending { text: String, sent_at: DateTime<Utc> },
    ConfirmDelivery { message_id: i64, reply: ChatMessage },
    FailDelivery(i64),
    /// Empty record for a new id.
    Load(i64),
    Reset,
}

impl MinutesAction {
    /// Actions that start a new record and invalidate requests in flight.
    pub fn starts_new_record(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Reset)
    }
}

pub fn reduce(prev: &Minutes, action: MinutesAction) -> Minutes {
    let mut next = prev.clone();
    match action {
        MinutesAction::SetMinutesId(id) => next.minutes_id = id,
        MinutesAction::SetTitle(title) => next.title = title,
        MinutesAction::SetVideoUrl(url) => next.video_url = url,
        MinutesAction::SetTranscriptId(id) => next.transcript_id = id,
        MinutesAction::SetIsTranscripted(v) => next.is_transcripted = v,
        MinutesAction::SetTranscription(text) => next.transcription = text,
        MinutesAction::SetIsSummarized(v) => next.is_summarized = v,
        MinutesAction::SetSummary(summary) => next.summary = summary,
        MinutesAction::SetIsEmbedded(v) => next.is_embedded = v,
        MinutesAction::SetSessionId(id) => next.session_id = id,
        MinutesAction::SetIsChatting(v) => next.is_chatting = v,
        MinutesAction::AddMessage(msg) => next.messages.push(msg),
        MinutesAction::ApplyResult(merge) => {
            next = Minutes {
                minutes_id: merge.minutes_id,
                title: merge.title,
                video_url: merge.video_url,
                transcript_id: Some(merge.transcript_id),
                is_transcripted: true,
                transcription: merge.transcription,
                ..Minutes::default()
            };
        }
        MinutesAction::ApplyHistory(payload) => apply_history(&mut next, payload),
        MinutesAction::ApplySummary(summary) => {
            next.is_summarized = !summary.is_empty();
            next.summary = summary;
        }
        MinutesAction::OpenChat(session_id) => {
            next.session_id = Some(session_id);
            next.is_chatting = true;
        }
        MinutesAction::SendPending { text, sent_at } => {
            let message_id = next.next_local_message_id(sent_at.timestamp_millis());
            next.delivery.insert(message_id, DeliveryStatus::Pending);
            next.messages.push(ChatMessage {
                message_id,
                role: Role::User,
                message: text,
                created_at: sent_at,
            });
        }
        MinutesAction::ConfirmDelivery { message_id, reply } => {
            next.delivery.insert(message_id, DeliveryStatus::Confirmed);
            next.messages.push(reply);
        }
        MinutesAction::FailDelivery(message_id) => {
            next.delivery.insert(message_id, DeliveryStatus::Failed);
        }
        MinutesAction::Load(minutes_id) => {
            next = Minutes {
                minutes_id,
                ..Minutes::default()
            };
        }
        MinutesAction::Reset => next = Minutes::default(),
    }
    next
}

fn apply_history(next: &mut Minutes, payload: HistoryPayload) {
    if let Some(title) = payload.title {
        next.title = title;
    }
    if let Some(url) = payload.video_url {
        next.video_url = url;
    }
    if payload.transcript_id.is_some() {
        next.transcript_id = payload.transcript_id;
    }
    if let Some(content) = payload.transcript_content {
        next.transcription = content;
    }
    if let Some(summary) = payload.summary {
        next.summary = summary;
    }
    if payload.session_id.is_some() {
        next.session_id = payload.session_id;
    }
    if let Some(embedded) = payload.is_embedded {
        next.is_embedded = embedded;
    }
    if let Some(messages) = payload.messages {
        next.messages.extend(messages);
    }

    next.is_transcripted = next.transcript_id.is_some() && !next.transcription.is_empty();
    next.is_summarized = !next.summary.is_empty();
    next.is_chatting = next.session_id.is_some();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn populated() -> Minutes {
        let mut minutes = reduce(
            &Minutes::default(),
            MinutesAction::ApplyResult(TranscriptMerge {
                minutes_id: 5,
                title: "Weekly sync".to_string(),
                video_url: "https://videos.example/5.mp4".to_string(),
                transcript_id: 11,
                transcription: "good morning".to_string(),
            }),
        );
        minutes = reduce(&minutes, MinutesAction::ApplySummary("# Notes".to_string()));
        minutes = reduce(&minutes, MinutesAction::OpenChat(3));
        reduce(&minutes, MinutesAction::AddMessage(ChatMessage::user(1, "hello")))
    }

    #[test]
    fn test_setter_changes_one_field() {
        let before = populated();
        let after = reduce(&before, MinutesAction::SetTitle("Retro".to_string()));

        assert_eq!(after.title, "Retro");
        let mut restored = after.clone();
        restored.title = before.title.clone();
        assert_eq!(restored, before);
    }

    #[test]
    fn test_add_message_is_append_only() {
        let mut minutes = Minutes::default();
        let mut sent = Vec::new();
        for i in 0..5 {
            let msg = ChatMessage::user(i, format!("message {}", i));
            sent.push(msg.clone());
            let before = minutes.messages.clone();
            minutes = reduce(&minutes, MinutesAction::AddMessage(msg));
            assert_eq!(&minutes.messages[..before.len()], before.as_slice());
        }
        assert_eq!(minutes.messages, sent);
    }

    #[test]
    fn test_reset_then_setter_matches_sentinel() {
        let after_reset = reduce(&populated(), MinutesAction::Reset);
        let via_reset = reduce(&after_reset, MinutesAction::SetVideoUrl("u".to_string()));
        let via_sentinel = reduce(&Minutes::default(), MinutesAction::SetVideoUrl("u".to_string()));

        assert_eq!(via_reset, via_sentinel);
        assert!(via_reset.summary.is_empty());
        assert!(via_reset.session_id.is_none());
        assert!(via_reset.messages.is_empty());
    }

    #[test]
    fn test_apply_result_clears_dependent_state() {
        let merged = reduce(
            &populated(),
            MinutesAction::ApplyResult(TranscriptMerge {
                minutes_id: 6,
                title: "Other".to_string(),
                video_url: "https://videos.example/6.mp4".to_string(),
                transcript_id: 12,
                transcription: "new text".to_string(),
            }),
        );

        assert_eq!(merged.minutes_id, 6);
        assert_eq!(merged.transcript_id, Some(12));
        assert!(merged.is_transcripted);
        assert!(!merged.is_summarized);
        assert!(merged.summary.is_empty());
        assert!(merged.session_id.is_none());
        assert!(!merged.is_chatting);
        assert!(merged.messages.is_empty());
        assert!(merged.is_consistent());
    }

    #[test]
    fn test_apply_history_derives_flags() {
        let loaded = reduce(&Minutes::default(), MinutesAction::Load(8));
        let payload = HistoryPayload {
            title: Some("Kickoff".to_string()),
            video_url: Some("https://videos.example/8.mp4".to_string()),
            transcript_id: Some(21),
            transcript_content: Some("we begin".to_string()),
            summary: Some("## Summary".to_string()),
            session_id: Some(4),
            messages: Some(vec![ChatMessage::user(1, "earlier question")]),
            is_embedded: None,
        };
        let hydrated = reduce(&loaded, MinutesAction::ApplyHistory(payload));

        assert_eq!(hydrated.minutes_id, 8);
        assert!(hydrated.is_transcripted);
        assert!(hydrated.is_summarized);
        assert!(hydrated.is_chatting);
        assert_eq!(hydrated.messages.len(), 1);
        assert!(hydrated.is_consistent());
    }

    #[test]
    fn test_apply_history_keeps_omitted_fields() {
        let mut base = reduce(&Minutes::default(), MinutesAction::Load(8));
        base = reduce(&base, MinutesAction::SetTitle("Local title".to_string()));

        let hydrated = reduce(
            &base,
            MinutesAction::ApplyHistory(HistoryPayload {
                transcript_id: Some(2),
                transcript_content: Some("text".to_string()),
                ..HistoryPayload::default()
            }),
        );

        assert_eq!(hydrated.title, "Local title");
        assert!(hydrated.is_transcripted);
        assert!(!hydrated.is_summarized);
        assert!(!hydrated.is_chatting);
    }

    #[test]
    fn test_delivery_lifecycle_never_touches_messages() {
        let mut minutes = reduce(&Minutes::default(), MinutesAction::OpenChat(1));
        let sent_at = Utc.timestamp_millis_opt(100).unwrap();
        minutes = reduce(
            &minutes,
            MinutesAction::SendPending {
                text: "question".to_string(),
                sent_at,
            },
        );
        let outgoing = minutes.messages[0].clone();
        assert_eq!(outgoing.message_id, 100);
        assert_eq!(outgoing.role, Role::User);
        assert_eq!(minutes.delivery_of(100), DeliveryStatus::Pending);

        minutes = reduce(&minutes, MinutesAction::FailDelivery(100));
        assert_eq!(minutes.delivery_of(100), DeliveryStatus::Failed);
        assert_eq!(minutes.messages, vec![outgoing.clone()]);

        let reply = ChatMessage {
            message_id: 7,
            role: Role::Assistant,
            message: "answer".to_string(),
            created_at: outgoing.created_at,
        };
        minutes = reduce(
            &minutes,
            MinutesAction::ConfirmDelivery {
                message_id: 100,
                reply: reply.clone(),
            },
        );
        assert_eq!(minutes.delivery_of(100), DeliveryStatus::Confirmed);
        assert_eq!(minutes.messages, vec![outgoing, reply]);
    }

    #[test]
    fn test_pending_sends_in_same_millisecond_get_distinct_ids() {
        let sent_at = Utc.timestamp_millis_opt(5_000).unwrap();
        let mut minutes = reduce(&Minutes::default(), MinutesAction::OpenChat(1));
        for text in ["first", "second"] {
            minutes = reduce(
                &minutes,
                MinutesAction::SendPending {
                    text: text.to_string(),
                    sent_at,
                },
            );
        }

        let ids: Vec<i64> = minutes.messages.iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec![5_000, 5_001]);
        assert_eq!(minutes.delivery.len(), 2);
        assert!(ids.iter().all(|id| minutes.delivery_of(*id) == DeliveryStatus::Pending));
    }

    #[test]
    fn test_empty_summary_is_not_summarized() {
        let minutes = reduce(&populated(), MinutesAction::ApplySummary(String::new()));
        assert!(!minutes.is_summarized);
    }
}
