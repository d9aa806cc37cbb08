//! Command implementations for the Prompetize CLI.
//!
//! [`App`] is the composition root: every service is constructed once here
//! and handed to the commands by reference.

use super::browser;
use super::Target;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use prompetize::config::{passphrase_from_env, PASSPHRASE_ENV};
use prompetize::storage::validate_identifier;
use prompetize::sync::oauth::TOKEN_STORAGE_KEY;
use prompetize::sync::{AuthToken, GitHubAuth, GitHubClient, RepositoryService, SyncManager};
use prompetize::{Config, FileStore, KeyValueStore, LocalCache, Record, SyncStatus};
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct App {
    config: Config,
    cache: Arc<LocalCache>,
    auth: Arc<GitHubAuth>,
    sync: SyncManager,
    repositories: RepositoryService,
}

impl App {
    pub fn build(config: Config) -> Result<Self> {
        let passphrase = resolve_passphrase()?;
        let material = config.encryption.key_material(passphrase);

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.store_path()));
        let cache = Arc::new(LocalCache::new(store, &material));
        let auth = Arc::new(GitHubAuth::new(
            Arc::clone(&cache),
            config.github.auth_config(),
        ));
        let client = Arc::new(
            GitHubClient::new(config.github.api_config(), Arc::clone(&auth))
                .context("Cannot build GitHub client")?,
        );

        Ok(Self {
            sync: SyncManager::new(Arc::clone(&cache), Arc::clone(&client)),
            repositories: RepositoryService::new(client, config.community.clone()),
            config,
            cache,
            auth,
        })
    }

    fn target(&self, target: &Target) -> Result<(String, String)> {
        let configured = self.config.sync_target();
        let owner = target
            .owner
            .clone()
            .or_else(|| configured.map(|(o, _)| o.to_string()));
        let repo = target
            .repo
            .clone()
            .or_else(|| configured.map(|(_, r)| r.to_string()));

        match (owner, repo) {
            (Some(owner), Some(repo)) => Ok((owner, repo)),
            _ => bail!("No sync target: pass --owner/--repo or set [github] owner/repo in the config"),
        }
    }

    async fn load_record(&self, id: &str) -> Result<Record> {
        ensure_record_id(id)?;
        self.cache
            .load(id)
            .await
            .with_context(|| format!("Cannot read record {}", id))?
            .with_context(|| format!("Record {} not found", id))
    }
}

/// Read the storage passphrase from the environment or prompt for it.
fn resolve_passphrase() -> Result<String> {
    if let Some(passphrase) = passphrase_from_env() {
        return Ok(passphrase);
    }

    print!("Passphrase (or set {}): ", PASSPHRASE_ENV);
    io::stdout().flush()?;
    let passphrase = rpassword::read_password().context("Cannot read passphrase")?;

    if passphrase.is_empty() {
        bail!("Passphrase cannot be empty");
    }
    Ok(passphrase)
}

/// Record ids share the namespace with the stored token.
fn ensure_record_id(id: &str) -> Result<()> {
    validate_identifier(id)?;
    if id == TOKEN_STORAGE_KEY {
        bail!("\"{}\" is reserved and cannot be used as a record id", id);
    }
    Ok(())
}

/// Run a network operation behind a spinner.
async fn with_spinner<T, F>(message: String, operation: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = operation.await;
    spinner.finish_and_clear();
    result
}

pub async fn login(app: &App, token: Option<String>) -> Result<()> {
    if let Some(token) = token {
        app.auth.save_token(&AuthToken::new(token)).await?;
        println!("{} Token stored", "✓".green());
        return Ok(());
    }

    let auth_config = app.auth.config();
    if auth_config.client_id.is_empty() || auth_config.redirect_uri.is_empty() {
        bail!("Set [github] client_id and redirect_uri in the config, or use `login --token`");
    }

    let url = app.auth.authorize_url()?;
    println!("\n{}", "GitHub OAuth".cyan().bold());
    if !browser::open_authorize_url(url.as_str()) {
        println!("Open this URL in your browser:");
    }
    println!("  {}", url.as_str().cyan());
    print!("\nPaste the URL you were redirected to: ");
    io::stdout().flush()?;

    let mut redirect = String::new();
    io::stdin().lock().read_line(&mut redirect)?;
    app.auth
        .complete(redirect.trim())
        .await
        .context("Authentication failed")?;

    println!("{} Authenticated", "✓".green());
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.auth.logout().await?;
    println!("{} Logged out", "✓".green());
    Ok(())
}

pub async fn new_record(app: &App, content: String, id: Option<String>) -> Result<()> {
    let record = match id {
        Some(id) => {
            ensure_record_id(&id)?;
            if app.cache.load::<Record>(&id).await?.is_some() {
                bail!("Record {} already exists (use `edit`)", id);
            }
            Record::with_id(id, content)
        }
        None => Record::new(content),
    };

    app.cache.save(&record.id, &record).await?;
    println!("{} Created {}", "✓".green(), record.id.bold());
    Ok(())
}

pub async fn edit(app: &App, id: &str, content: String) -> Result<()> {
    let mut record = app.load_record(id).await?;
    record.touch(content);
    app.cache.save(id, &record).await?;
    println!("{} Updated {}", "✓".green(), id.bold());
    Ok(())
}

pub async fn show(app: &App, id: &str) -> Result<()> {
    let record = app.load_record(id).await?;

    println!("{} {}", "id:".dimmed(), record.id.bold());
    println!("{} {}", "created:".dimmed(), record.created_at);
    println!("{} {}", "updated:".dimmed(), record.updated_at);
    match record.synced_at {
        Some(synced) => println!("{} {}", "synced:".dimmed(), synced),
        None => println!("{} {}", "synced:".dimmed(), "never".yellow()),
    }
    println!("\n{}", record.content);
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<()> {
    ensure_record_id(id)?;
    app.cache.remove(id).await?;
    println!("{} Deleted {}", "✓".green(), id.bold());
    Ok(())
}

pub async fn push(app: &App, id: &str, target: &Target) -> Result<()> {
    ensure_record_id(id)?;
    let (owner, repo) = app.target(target)?;

    let record = with_spinner(
        format!("Pushing {} to {}/{}...", id, owner, repo),
        app.sync.push(id, &owner, &repo),
    )
    .await?;

    println!(
        "{} Pushed {} → {}/{}/{}",
        "✓".green(),
        id.bold(),
        owner,
        repo,
        record.remote_path()
    );
    Ok(())
}

pub async fn pull(app: &App, id: &str, target: &Target) -> Result<()> {
    ensure_record_id(id)?;
    let (owner, repo) = app.target(target)?;

    with_spinner(
        format!("Pulling {} from {}/{}...", id, owner, repo),
        app.sync.pull(id, &owner, &repo),
    )
    .await?;

    println!("{} Pulled {} from {}/{}", "✓".green(), id.bold(), owner, repo);
    Ok(())
}

pub async fn status(app: &App, id: &str, target: &Target) -> Result<()> {
    ensure_record_id(id)?;
    let (owner, repo) = app.target(target)?;

    let status = with_spinner(
        format!("Comparing {} with {}/{}...", id, owner, repo),
        app.sync.status(id, &owner, &repo),
    )
    .await?;

    let label = match status {
        None => "not found locally or remotely".red(),
        Some(SyncStatus::LocalOnly) => "local only (never pushed)".yellow(),
        Some(SyncStatus::RemoteOnly) => "remote only (pull to fetch)".yellow(),
        Some(SyncStatus::Synced) => "synced".green(),
        Some(SyncStatus::Diverged) => "diverged (choose push or pull)".red(),
    };
    println!("{}: {}", id.bold(), label);
    Ok(())
}

pub async fn contribute(app: &App, name: &str, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Cannot read template file: {}", file.display()))?;
    let community = app.repositories.community();

    let pr = with_spinner(
        format!(
            "Contributing {} to {}/{}...",
            name, community.owner, community.name
        ),
        app.repositories
            .contribute_to_default_repository(name, &content),
    )
    .await?;

    println!(
        "{} Opened pull request #{}: {}",
        "✓".green(),
        pr.number,
        pr.html_url.cyan()
    );
    Ok(())
}
