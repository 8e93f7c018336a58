//! Polling schedule and progress display for a processing job.

use std::time::Duration;

use crate::api::types::{JobStatus, StatusRecord};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Delay before the next status check; zero means polling is over.
///
/// No data yet counts as still processing.
pub fn next_poll_delay(latest: Option<&StatusRecord>, interval: Duration) -> Duration {
    match latest {
        None => interval,
        Some(record) if record.status.is_active() => interval,
        Some(_) => Duration::ZERO,
    }
}

/// Progress as shown to the user. A failed job never reads as 100%.
pub fn display_progress(record: &StatusRecord) -> u8 {
    let progress = record.progress.min(100);
    match record.status {
        JobStatus::Failed => progress.min(99),
        _ => progress,
    }
}

/// Short label for a job status.
pub fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "Waiting...",
        JobStatus::Processing => "Processing video...",
        JobStatus::Completed => "Complete",
        JobStatus::Failed => "Processing failed",
    }
}
