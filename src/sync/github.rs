//! GitHub REST client - repository, file, branch and pull-request primitives.
//!
//! Every call reads the bearer token from [`GitHubAuth`] at request time and
//! fails with `NotAuthenticated` when none is stored. HTTP 404 maps to
//! `NotFound`; every other non-success status maps to `RemoteApi` carrying
//! the upstream status text and error message. Nothing is retried here.

use super::oauth::GitHubAuth;
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use url::Url;

/// GitHub REST API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

pub const DEFAULT_USER_AGENT: &str = "Prompetize-Extension";

const API_VERSION: &str = "2022-11-28";

/// Remaining-request budget below which a warning is logged
const LOW_RATE_LIMIT_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub private: bool,
    pub description: Option<String>,
    pub default_branch: String,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Decoded file content plus the blob sha needed for conditional updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: String,
    pub sha: String,
}

/// Snapshot of the `x-ratelimit-*` headers from the latest response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimit {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let number = |name: &str| -> Option<i64> {
            headers.get(name)?.to_str().ok()?.trim().parse().ok()
        };

        Some(Self {
            limit: u32::try_from(number("x-ratelimit-limit")?).ok()?,
            remaining: u32::try_from(number("x-ratelimit-remaining")?).ok()?,
            reset_at: DateTime::from_timestamp(number("x-ratelimit-reset")?, 0)?,
        })
    }
}

#[derive(Deserialize)]
struct ContentResponse {
    content: String,
    sha: String,
}

#[derive(Serialize)]
struct PutFileRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct GitHubClient {
    http: reqwest::Client,
    config: ApiConfig,
    auth: Arc<GitHubAuth>,
    rate_limit: Mutex<Option<RateLimit>>,
}

impl GitHubClient {
    pub fn new(config: ApiConfig, auth: Arc<GitHubAuth>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            auth,
            rate_limit: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Rate-limit budget as of the last response, if GitHub reported one.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        *self.rate_limit.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Repository management ---

    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<GitHubRepository> {
        let response = self
            .send(Method::GET, &["repos", owner, repo], |req| req)
            .await?;
        Ok(response.json().await?)
    }

    pub async fn list_user_repositories(&self) -> Result<Vec<GitHubRepository>> {
        let response = self
            .send(Method::GET, &["user", "repos"], |req| {
                req.query(&[("type", "owner")])
            })
            .await?;
        Ok(response.json().await?)
    }

    pub async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        private: bool,
    ) -> Result<GitHubRepository> {
        let body = serde_json::json!({
            "name": name,
            "description": description,
            "private": private,
            "auto_init": true,
        });
        let response = self
            .send(Method::POST, &["user", "repos"], |req| req.json(&body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn fork_repository(&self, owner: &str, repo: &str) -> Result<GitHubRepository> {
        let response = self
            .send(Method::POST, &["repos", owner, repo, "forks"], |req| req)
            .await?;
        Ok(response.json().await?)
    }

    // --- File operations ---

    pub async fn get_file(&self, owner: &str, repo: &str, path: &str) -> Result<RemoteFile> {
        self.get_file_at(owner, repo, path, None).await
    }

    /// Fetch a file at a branch, tag or commit (`None` = default branch).
    pub async fn get_file_at(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<RemoteFile> {
        let segments = contents_segments(owner, repo, path)?;
        let response = self
            .send(Method::GET, &segments, |req| match git_ref {
                Some(r) => req.query(&[("ref", r)]),
                None => req,
            })
            .await?;

        let body: ContentResponse = response.json().await?;
        // GitHub wraps base64 content at 60 columns
        let packed: String = body
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = BASE64
            .decode(packed)
            .map_err(|_| Error::InvalidRemoteContent(path.to_string()))?;
        let content =
            String::from_utf8(bytes).map_err(|_| Error::InvalidRemoteContent(path.to_string()))?;

        Ok(RemoteFile {
            content,
            sha: body.sha,
        })
    }

    /// Create `path`, or overwrite it if it already exists.
    ///
    /// The existing sha is looked up first and sent with the write. The two
    /// calls are not atomic: if the file changes in between, GitHub rejects
    /// the stale sha and the rejection surfaces as `RemoteApi`.
    pub async fn create_or_update_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
        branch: Option<&str>,
    ) -> Result<()> {
        let segments = contents_segments(owner, repo, path)?;
        let existing_sha = match self.get_file_at(owner, repo, path, branch).await {
            Ok(file) => Some(file.sha),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        let request = PutFileRequest {
            message,
            content: BASE64.encode(content.as_bytes()),
            sha: existing_sha.as_deref(),
            branch,
        };

        self.send(Method::PUT, &segments, |req| req.json(&request))
            .await?;

        tracing::debug!(
            "{} {}/{}:{}",
            if existing_sha.is_some() { "Updated" } else { "Created" },
            owner,
            repo,
            path
        );
        Ok(())
    }

    // --- Branches & pull requests ---

    /// Create `branch_name` pointing at the tip of `from_branch`.
    pub async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch_name: &str,
        from_branch: &str,
    ) -> Result<()> {
        let mut segments = vec!["repos", owner, repo, "git", "ref", "heads"];
        segments.extend(split_path(from_branch)?);
        let response = self.send(Method::GET, &segments, |req| req).await?;
        let tip: RefResponse = response.json().await?;

        let body = serde_json::json!({
            "ref": format!("refs/heads/{}", branch_name),
            "sha": tip.object.sha,
        });
        self.send(Method::POST, &["repos", owner, repo, "git", "refs"], |req| {
            req.json(&body)
        })
        .await?;
        Ok(())
    }

    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: Option<&str>,
    ) -> Result<PullRequest> {
        let payload = serde_json::json!({
            "title": title,
            "head": head,
            "base": base,
            "body": body,
        });
        let response = self
            .send(Method::POST, &["repos", owner, repo, "pulls"], |req| {
                req.json(&payload)
            })
            .await?;
        Ok(response.json().await?)
    }

    // --- Transport ---

    /// Base URL plus `segments`, each percent-encoded as a single path
    /// segment: `#`, `?`, `%` and `/` inside a segment never change the
    /// resource addressed.
    fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let invalid_base = || {
            Error::Config(format!(
                "invalid GitHub API base URL: {}",
                self.config.base_url
            ))
        };

        let mut url = Url::parse(&self.config.base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|_| invalid_base())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<F>(&self, method: Method, segments: &[&str], build: F) -> Result<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let token = self
            .auth
            .stored_token()
            .await?
            .ok_or(Error::NotAuthenticated)?;

        let url = self.endpoint_url(segments)?;
        let endpoint = url.path().to_string();
        tracing::debug!("GitHub {} {}", method, endpoint);

        let request = self
            .http
            .request(method, url)
            .bearer_auth(token.as_str())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        let response = build(request).send().await?;
        let rate_limit = self.record_rate_limit(response.headers());

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(endpoint));
        }
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            tracing::debug!("GitHub {} failed: {} {:?}", endpoint, status, message);
            return Err(Error::RemoteApi {
                status: status.as_u16(),
                status_text,
                message,
                rate_limit_remaining: rate_limit.map(|limit| limit.remaining),
            });
        }

        Ok(response)
    }

    fn record_rate_limit(&self, headers: &HeaderMap) -> Option<RateLimit> {
        let limit = RateLimit::from_headers(headers)?;

        if limit.remaining <= LOW_RATE_LIMIT_THRESHOLD {
            tracing::warn!(
                "GitHub rate limit low: {}/{} requests left, resets at {}",
                limit.remaining,
                limit.limit,
                limit.reset_at
            );
        }

        *self.rate_limit.lock().unwrap_or_else(|e| e.into_inner()) = Some(limit);
        Some(limit)
    }
}

/// Split a repository-relative path (`prompts/p1.json`, `feature/x`) on
/// `/`. Empty, `.` and `..` segments are rejected rather than normalised.
fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments
        .iter()
        .any(|segment| segment.is_empty() || *segment == "." || *segment == "..")
    {
        return Err(Error::InvalidRemotePath(path.to_string()));
    }
    Ok(segments)
}

fn contents_segments<'a>(owner: &'a str, repo: &'a str, path: &'a str) -> Result<Vec<&'a str>> {
    let mut segments = vec!["repos", owner, repo, "contents"];
    segments.extend(split_path(path)?);
    Ok(segments)
}
