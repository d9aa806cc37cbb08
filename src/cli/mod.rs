//! CLI definitions and command implementations for Prompetize.

pub mod browser;
pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prompetize - encrypted prompt templates synced to GitHub
#[derive(Parser)]
#[command(name = "prompetize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/prompetize/prompetize.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Explicit sync target; falls back to `[github] owner/repo` in the config
#[derive(clap::Args, Clone, Default)]
pub struct Target {
    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authenticate with GitHub and store the token encrypted
    Login {
        /// Store this token directly instead of running the OAuth flow
        #[arg(long)]
        token: Option<String>,
    },

    /// Remove the stored GitHub token
    Logout,

    /// Create a new prompt record
    New {
        /// Prompt text
        content: String,

        /// Record id (default: random UUID)
        #[arg(long)]
        id: Option<String>,
    },

    /// Replace the content of an existing record
    Edit { id: String, content: String },

    /// Print a record
    Show { id: String },

    /// Delete a record from local storage
    Delete { id: String },

    /// Push a local record to GitHub (overwrites the remote copy)
    Push {
        id: String,
        #[command(flatten)]
        target: Target,
    },

    /// Pull a record from GitHub (overwrites the local copy)
    Pull {
        id: String,
        #[command(flatten)]
        target: Target,
    },

    /// Compare the local and remote copies of a record
    Status {
        id: String,
        #[command(flatten)]
        target: Target,
    },

    /// Open a pull request adding a template to the community repository
    Contribute {
        /// Template name (stored as templates/<name>.json)
        name: String,

        /// File with the template content
        file: PathBuf,
    },
}
