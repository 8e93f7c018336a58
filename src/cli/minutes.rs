//! CLI handlers for uploading and working with a single minutes record.

use anyhow::{bail, Context, Result};

use super::args::{ChatCliArgs, OpenCliArgs, SummaryCliArgs, UploadCliArgs};
use super::progress::{create_progress_bar, finish_progress, follow_events};
use crate::api::JobStatus;
use crate::chat::ChatController;
use crate::store::{DeliveryStatus, Minutes, Role};
use crate::summary::SummaryGenerator;
use crate::sync::{MinutesSession, SyncOutcome};

const PREVIEW_CHARS: usize = 400;

/// Handle the upload CLI command.
pub async fn handle_upload_command(args: UploadCliArgs, session: &MinutesSession) -> Result<()> {
    let pb = (!args.no_progress).then(create_progress_bar);
    let follower = pb
        .clone()
        .map(|pb| follow_events(session.subscribe(), pb));
    if let Some(pb) = &pb {
        pb.set_message("Uploading...");
    }

    let result = session.upload_and_open(&args.file).await;

    if let Some(follower) = follower {
        follower.abort();
    }
    if let Some(pb) = &pb {
        finish_progress(pb, result.is_ok());
    }
    let (minutes_id, outcome) = result.context("Failed to process video")?;

    report_outcome(minutes_id, outcome)?;
    print_minutes(&session.store().get().await);
    Ok(())
}

/// Handle the open CLI command.
pub async fn handle_open_command(args: OpenCliArgs, session: &MinutesSession) -> Result<()> {
    if args.watch {
        session.track_job(args.id, JobStatus::Processing).await;
    }

    let pb = (args.watch && !args.no_progress).then(create_progress_bar);
    let follower = pb
        .clone()
        .map(|pb| follow_events(session.subscribe(), pb));

    let result = session.open(args.id).await;

    if let Some(follower) = follower {
        follower.abort();
    }
    if let Some(pb) = &pb {
        finish_progress(pb, result.is_ok());
    }
    let outcome = result.with_context(|| format!("Failed to load minutes {}", args.id))?;

    report_outcome(args.id, outcome)?;
    print_minutes(&session.store().get().await);
    Ok(())
}

/// Handle the summary CLI command.
pub async fn handle_summary_command(args: SummaryCliArgs, session: &MinutesSession) -> Result<()> {
    let outcome = session
        .open(args.id)
        .await
        .with_context(|| format!("Failed to load minutes {}", args.id))?;
    report_outcome(args.id, outcome)?;

    let minutes = session.store().get().await;
    if minutes.is_summarized && !args.regenerate {
        println!("{}", minutes.summary);
        return Ok(());
    }

    let generator = SummaryGenerator::new(session.api(), session.store().clone());
    let summary = generator
        .generate()
        .await
        .context("Failed to generate summary")?;
    println!("{}", summary);
    Ok(())
}

/// Handle the chat CLI command.
pub async fn handle_chat_command(args: ChatCliArgs, session: &MinutesSession) -> Result<()> {
    let outcome = session
        .open(args.id)
        .await
        .with_context(|| format!("Failed to load minutes {}", args.id))?;
    report_outcome(args.id, outcome)?;

    let chat = ChatController::new(session.api(), session.store().clone());
    chat.start(args.id)
        .await
        .context("Failed to start chat session")?;

    let reply = chat.send(&args.message).await;
    if args.thread {
        print_thread(&session.store().get().await);
    }
    let reply = reply.context("Failed to send message")?;
    if !args.thread {
        println!("{}", reply.message);
    }
    Ok(())
}

fn report_outcome(minutes_id: i64, outcome: SyncOutcome) -> Result<()> {
    match outcome {
        SyncOutcome::Merged(_) => Ok(()),
        SyncOutcome::JobFailed { progress } => bail!(
            "Processing of minutes {} failed at {}%. Please upload the video again.",
            minutes_id,
            progress
        ),
        SyncOutcome::InProgress => bail!("Minutes {} is still being loaded", minutes_id),
        SyncOutcome::Superseded => bail!("Minutes {} was replaced before it finished loading", minutes_id),
    }
}

fn print_minutes(minutes: &Minutes) {
    println!("Minutes #{}: {}", minutes.minutes_id, minutes.title);
    if !minutes.video_url.is_empty() {
        println!("Video: {}", minutes.video_url);
    }
    println!("---");

    if minutes.is_transcripted {
        println!("Transcript:\n{}", preview(&minutes.transcription));
    } else {
        println!("Transcript: not available yet");
    }

    if minutes.is_summarized {
        println!("---\nSummary:\n{}", minutes.summary);
    }

    if minutes.is_chatting {
        println!("---\nChat: {} message(s)", minutes.messages.len());
    }
}

fn print_thread(minutes: &Minutes) {
    for msg in &minutes.messages {
        let marker = match minutes.delivery_of(msg.message_id) {
            DeliveryStatus::Pending => " (sending)",
            DeliveryStatus::Failed => " (not delivered)",
            DeliveryStatus::Confirmed => "",
        };
        let who = match msg.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{}] {}{}: {}", msg.created_at.format("%Y-%m-%d %H:%M"), who, marker, msg.message);
    }
}

/// Truncate long text for display.
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
