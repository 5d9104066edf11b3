mod cli;
mod commands;
mod config;
mod pipeline;
mod tracker;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use std::io::IsTerminal;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    match cli.command {
        Commands::Story(args) => commands::story(args).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init { project } => commands::config_init(project)?,
            ConfigAction::Show(connection) => commands::config_show(&connection)?,
            ConfigAction::Verify(connection) => commands::config_verify(&connection).await?,
        },
    }

    Ok(())
}
