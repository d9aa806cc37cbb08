//! SyncManager - push/pull of single records between LocalCache and GitHub.
//!
//! Both directions overwrite unconditionally (last-writer-wins). There is no
//! merge or conflict detection; the caller chooses push vs. pull, optionally
//! guided by [`SyncManager::status`]. Concurrent push and pull of the same id
//! race, and whichever finishes last wins.

use super::github::GitHubClient;
use crate::error::{Error, Result};
use crate::storage::{
    remote_path, timestamp_now, validate_identifier, LocalCache, Record, SyncStatus,
};
use chrono::SecondsFormat;
use std::sync::Arc;

pub struct SyncManager {
    cache: Arc<LocalCache>,
    remote: Arc<GitHubClient>,
}

impl SyncManager {
    pub fn new(cache: Arc<LocalCache>, remote: Arc<GitHubClient>) -> Self {
        Self { cache, remote }
    }

    /// Local → remote. Returns the record as written, with `syncedAt` stamped.
    /// The local copy is left untouched.
    pub async fn push(&self, id: &str, owner: &str, repo: &str) -> Result<Record> {
        validate_identifier(id)?;
        let mut record: Record = self
            .cache
            .load(id)
            .await?
            .ok_or_else(|| Error::RecordNotFoundLocally(id.to_string()))?;

        let now = timestamp_now();
        record.synced_at = Some(now);

        let content = serde_json::to_string_pretty(&record)?;
        let message = format!(
            "Sync prompt {} at {}",
            id,
            now.to_rfc3339_opts(SecondsFormat::Millis, true)
        );

        self.remote
            .create_or_update_file(owner, repo, &remote_path(id), &content, &message, None)
            .await?;

        tracing::info!("Pushed record {} to {}/{}", id, owner, repo);
        Ok(record)
    }

    /// Remote → local. Overwrites whatever is stored under `id`.
    pub async fn pull(&self, id: &str, owner: &str, repo: &str) -> Result<Record> {
        let record = self
            .fetch_remote(id, owner, repo)
            .await?
            .ok_or_else(|| Error::RecordNotFoundRemotely(id.to_string()))?;

        self.cache.save(id, &record).await?;

        tracing::info!("Pulled record {} from {}/{}", id, owner, repo);
        Ok(record)
    }

    /// Compare both sides without modifying either.
    pub async fn status(&self, id: &str, owner: &str, repo: &str) -> Result<Option<SyncStatus>> {
        validate_identifier(id)?;
        let local: Option<Record> = self.cache.load(id).await?;
        let remote = self.fetch_remote(id, owner, repo).await?;
        Ok(SyncStatus::infer(local.as_ref(), remote.as_ref()))
    }

    async fn fetch_remote(&self, id: &str, owner: &str, repo: &str) -> Result<Option<Record>> {
        validate_identifier(id)?;
        let file = match self.remote.get_file(owner, repo, &remote_path(id)).await {
            Ok(file) => file,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let record: Record = serde_json::from_str(&file.content)?;
        if record.id != id {
            tracing::warn!("Remote file for {} carries id {}", id, record.id);
            return Err(Error::RecordIdMismatch {
                expected: id.to_string(),
                found: record.id,
            });
        }
        Ok(Some(record))
    }
}
