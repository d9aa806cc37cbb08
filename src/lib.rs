//! Prompetize Core Library
//!
//! Encrypted local storage for prompt templates and single-record
//! synchronization with a GitHub repository:
//! - PBKDF2 → AES-256-GCM encryption of every stored value
//! - LocalCache: encrypted key-value store keyed by record id
//! - GitHubClient: authenticated REST primitives (files, branches, PRs, forks)
//! - SyncManager: push/pull of `prompts/{id}.json`
//!
//! Services are plain objects built once at start-up and shared via `Arc`.

pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod sync;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use storage::{FileStore, KeyValueStore, LocalCache, MemoryStore, Record, SyncStatus};
pub use sync::{GitHubAuth, GitHubClient, RepositoryService, SyncManager};
