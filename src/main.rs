use anyhow::Result;
use clap::Parser;
use minutes_client::{
    cli::{
        build_session, handle_chat_command, handle_list_command, handle_open_command,
        handle_summary_command, handle_upload_command, Cli, CliCommand,
    },
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let CliCommand::Version = cli.command {
        println!("minutes {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load()?;
    let session = build_session(&config, cli.api_url.as_deref());

    match cli.command {
        CliCommand::Upload(args) => handle_upload_command(args, &session).await,
        CliCommand::Open(args) => handle_open_command(args, &session).await,
        CliCommand::Summary(args) => handle_summary_command(args, &session).await,
        CliCommand::Chat(args) => handle_chat_command(args, &session).await,
        CliCommand::List(args) => handle_list_command(args, &session).await,
        CliCommand::Version => Ok(()),
    }
}
