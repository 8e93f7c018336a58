use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "minutes")]
#[command(about = "Turn videos into minutes: transcript, summary and chat", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the backend URL from the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Upload a video and wait for its transcript
    Upload(UploadCliArgs),
    /// Show the minutes for an id
    Open(OpenCliArgs),
    /// Generate (or show) the summary for an id
    Summary(SummaryCliArgs),
    /// Ask a question about a video
    Chat(ChatCliArgs),
    /// List processed videos
    List(ListCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct UploadCliArgs {
    /// Video file to upload (mp4 or mov, at most 200MB)
    pub file: PathBuf,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(ClapArgs, Debug)]
pub struct OpenCliArgs {
    /// Minutes id
    pub id: i64,

    /// Poll the job status until it finishes instead of loading history
    #[arg(long)]
    pub watch: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(ClapArgs, Debug)]
pub struct SummaryCliArgs {
    /// Minutes id
    pub id: i64,

    /// Generate a new summary even if one exists
    #[arg(long)]
    pub regenerate: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ChatCliArgs {
    /// Minutes id
    pub id: i64,

    /// Question to ask
    pub message: String,

    /// Print the whole conversation instead of only the answer
    #[arg(long)]
    pub thread: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ListCliArgs {
    /// Filter by title
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of entries to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}
