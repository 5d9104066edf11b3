use clap::{Args, Parser, Subcommand};

use crate::config::Layer;

#[derive(Parser)]
#[command(name = "pivo")]
#[command(
    author,
    version,
    about = "Pivotal Tracker CLI tool for quickly adding stories"
)]
pub struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add stories to your Pivotal Tracker project
    #[command(long_about = "Add stories to your Pivotal Tracker project.

New stories are features unless flagged as a bug (-b) or chore (-c).

By default a story is added to the icebox. With -i (important/immediate)
it is added to the top of the backlog instead.

Labels can be added with -l. Add multiple by separating them with \",\"
(no spaces).")]
    Story(StoryArgs),

    /// Configure pivo settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct StoryArgs {
    /// Story title
    #[arg(value_name = "TITLE")]
    pub title: Vec<String>,

    /// Set story estimate points
    #[arg(short, long, default_value_t = 0)]
    pub estimate: u32,

    /// Set story type as bug
    #[arg(short, long)]
    pub bug: bool,

    /// Set story type as chore
    #[arg(short, long)]
    pub chore: bool,

    /// Set the labels (comma-separated)
    #[arg(short, long, default_value = "")]
    pub labels: String,

    /// Add immediately (important) to top of backlog
    #[arg(short, long)]
    pub important: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Flags that take precedence over `PIVOTAL_*` variables and the config file
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Set Pivotal token [default: $PIVOTAL_TOKEN]
    #[arg(short, long)]
    pub token: Option<String>,

    /// Set Pivotal project [default: $PIVOTAL_PROJECT]
    #[arg(short, long)]
    pub project: Option<String>,
}

impl ConnectionArgs {
    pub fn layer(&self) -> Layer {
        Layer {
            api_url: None,
            token: self.token.clone(),
            project: self.project.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a config file (asks before overwriting)
    Init {
        /// Project id to store in the new file
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Show the config file and where each setting resolves from
    Show(ConnectionArgs),
    /// Verify Pivotal Tracker project and token access
    Verify(ConnectionArgs),
}
