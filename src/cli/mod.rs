use std::sync::Arc;

use crate::api::{HttpMinutesApi, StaticToken};
use crate::config::Config;
use crate::store::MinutesHandle;
use crate::sync::MinutesSession;

pub mod args;
pub mod history;
pub mod minutes;
pub mod progress;

pub use args::{Cli, CliCommand};
pub use history::handle_list_command;
pub use minutes::{
    handle_chat_command, handle_open_command, handle_summary_command, handle_upload_command,
};

/// Build a session against the configured backend.
///
/// `api_url` takes precedence over the config file.
pub fn build_session(config: &Config, api_url: Option<&str>) -> MinutesSession {
    let base_url = api_url.unwrap_or(&config.api.base_url);
    let credentials = StaticToken::new(config.api.resolve_token());
    let api = HttpMinutesApi::new(base_url, Box::new(credentials));

    MinutesSession::new(Arc::new(api), MinutesHandle::new())
        .with_poll_interval(config.sync.poll_interval())
}
