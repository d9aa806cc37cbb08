//! Sync module - record synchronization with GitHub over the REST API.
//!
//! - OAuth implicit flow token handling
//! - GitHub REST client (files, branches, pull requests, forks)
//! - SyncManager for single-record push/pull
//! - Repository management (community repo, templates, contributions)

pub mod github;
pub mod manager;
pub mod oauth;
pub mod repository;

pub use github::{ApiConfig, GitHubClient, GitHubRepository, PullRequest, RateLimit, RemoteFile};
pub use manager::SyncManager;
pub use oauth::{authorize_url, extract_token, AuthConfig, AuthToken, GitHubAuth};
pub use repository::RepositoryService;
