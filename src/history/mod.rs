//! The user's list of processed minutes.
//!
//! Entries are loaded from the backend and kept newest first. Used by the
//! CLI `list` command and by anything that shows previously processed videos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiError, MinutesApi, MinutesListItem};

/// Parameters for searching the minutes list.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive match against the title
    pub query: Option<String>,
    /// Maximum number of results
    pub limit: usize,
}

impl SearchParams {
    pub fn new() -> Self {
        Self {
            limit: 20,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub minutes_id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MinutesListItem> for HistoryEntry {
    fn from(item: MinutesListItem) -> Self {
        Self {
            minutes_id: item.minutes_id,
            title: item.title,
            image_url: item.image_url,
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryList {
    entries: Vec<HistoryEntry>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest entries go first.
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    pub fn replace(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_by_id(&self, minutes_id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.minutes_id == minutes_id)
    }

    pub fn search(&self, params: &SearchParams) -> Vec<HistoryEntry> {
        let query = params.query.as_ref().map(|q| q.to_lowercase());
        self.entries
            .iter()
            .filter(|e| match &query {
                Some(q) => e.title.to_lowercase().contains(q),
                None => true,
            })
            .take(params.limit)
            .cloned()
            .collect()
    }
}

/// Load the minutes list from the backend, newest first.
pub async fn fetch_history(api: &dyn MinutesApi) -> Result<HistoryList, ApiError> {
    let mut entries: Vec<HistoryEntry> = api
        .list_minutes()
        .await?
        .into_iter()
        .map(HistoryEntry::from)
        .collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    info!("Loaded {} minutes from history", entries.len());
    let mut list = HistoryList::new();
    list.replace(entries);
    Ok(list)
}
