//! Status checks for one minutes id.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::status::next_poll_delay;
use crate::api::{ApiError, MinutesApi, StatusRecord};

pub struct StatusPoller {
    api: Arc<dyn MinutesApi>,
    minutes_id: i64,
    interval: Duration,
    latest: Option<StatusRecord>,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn MinutesApi>, minutes_id: i64, interval: Duration) -> Self {
        Self {
            api,
            minutes_id,
            interval,
            latest: None,
        }
    }

    pub fn latest(&self) -> Option<&StatusRecord> {
        self.latest.as_ref()
    }

    /// Zero once a terminal status has been observed.
    pub fn next_delay(&self) -> Duration {
        next_poll_delay(self.latest.as_ref(), self.interval)
    }

    pub fn is_stopped(&self) -> bool {
        self.next_delay().is_zero()
    }

    /// One status request. A failed tick leaves the last observation untouched.
    pub async fn tick(&mut self) -> Result<StatusRecord, ApiError> {
        let record = self.api.get_status(self.minutes_id).await?;

        let changed = self.latest.map(|prev| prev.status) != Some(record.status);
        if changed {
            info!(
                "Minutes {} status: {} ({}%)",
                self.minutes_id,
                record.status.as_str(),
                record.progress
            );
        } else {
            debug!(
                "Minutes {} still {} ({}%)",
                self.minutes_id,
                record.status.as_str(),
                record.progress
            );
        }

        self.latest = Some(record);
        Ok(record)
    }
}
