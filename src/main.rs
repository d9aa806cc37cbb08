//! Prompetize CLI - encrypted prompt templates synced to GitHub.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::commands::{self, App};
use cli::{Cli, Commands};
use prompetize::config::{default_config_path, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Cannot load config: {}", config_path.display()))?;

    let app = App::build(config)?;

    match cli.command {
        Commands::Login { token } => commands::login(&app, token).await?,
        Commands::Logout => commands::logout(&app).await?,
        Commands::New { content, id } => commands::new_record(&app, content, id).await?,
        Commands::Edit { id, content } => commands::edit(&app, &id, content).await?,
        Commands::Show { id } => commands::show(&app, &id).await?,
        Commands::Delete { id } => commands::delete(&app, &id).await?,
        Commands::Push { id, target } => commands::push(&app, &id, &target).await?,
        Commands::Pull { id, target } => commands::pull(&app, &id, &target).await?,
        Commands::Status { id, target } => commands::status(&app, &id, &target).await?,
        Commands::Contribute { name, file } => commands::contribute(&app, &name, &file).await?,
    }

    Ok(())
}
