//! Progress bar fed by session events.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::sync::{display_progress, status_label, SessionEvent};

/// Create a styled progress bar.
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸━"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Mirror session events onto `pb` until the session stops publishing.
pub fn follow_events(
    mut rx: broadcast::Receiver<SessionEvent>,
    pb: ProgressBar,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => apply_event(&pb, &event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Clear the bar on success; on failure leave it where it stopped.
pub fn finish_progress(pb: &ProgressBar, succeeded: bool) {
    if succeeded {
        pb.finish_and_clear();
    } else if !pb.is_finished() {
        pb.abandon();
    }
}

fn apply_event(pb: &ProgressBar, event: &SessionEvent) {
    match event {
        SessionEvent::Uploaded { minutes_id } => {
            pb.set_message(format!("Uploaded as minutes {}", minutes_id));
        }
        SessionEvent::Progress(record) => {
            pb.set_position(display_progress(record) as u64);
            pb.set_message(status_label(record.status));
        }
        SessionEvent::TransientError { message, .. } => {
            pb.set_message(format!("Status check failed, retrying: {}", message));
        }
        SessionEvent::JobFailed { progress, .. } => {
            pb.set_position(*progress as u64);
            pb.abandon_with_message("Processing failed");
        }
        SessionEvent::Merged { .. } => {
            pb.set_position(100);
            pb.set_message("Loading minutes...");
        }
        SessionEvent::MergeFailed { message, .. } => {
            pb.abandon_with_message(format!("Failed to load minutes: {}", message));
        }
        SessionEvent::Discarded { .. } => {}
    }
}
