use anyhow::{Context, Result};

use super::args::ListCliArgs;
use crate::history::SearchParams;
use crate::sync::MinutesSession;

pub async fn handle_list_command(args: ListCliArgs, session: &MinutesSession) -> Result<()> {
    let history = session
        .refresh_history()
        .await
        .context("Failed to load minutes list")?;

    if history.is_empty() {
        println!("No minutes yet. Upload a video with: minutes upload <FILE>");
        return Ok(());
    }

    let mut params = SearchParams::new().with_limit(args.limit);
    if let Some(query) = args.query {
        params = params.with_query(query);
    }
    let entries = history.search(&params);

    if entries.is_empty() {
        println!("No minutes found matching your criteria.");
        return Ok(());
    }

    println!("Found {} minutes:\n", entries.len());

    for entry in entries {
        println!("ID: {}", entry.minutes_id);
        println!("Date: {}", entry.created_at.format("%Y-%m-%d %H:%M"));
        println!("Title: {}", entry.title);
        println!("---");
    }

    println!("\nTo view one, use: minutes open <ID>");

    Ok(())
}
