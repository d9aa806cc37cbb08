//! Error taxonomy for the storage, crypto and sync layers.

use thiserror::Error;

/// All errors that can occur in Prompetize.
#[derive(Debug, Error)]
pub enum Error {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: blob is malformed, truncated or sealed with a different key")]
    Decryption,

    // --- Remote errors ---
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not authenticated with GitHub (run `prompetize login` first)")]
    NotAuthenticated,

    #[error("GitHub API error: {}", describe_remote(.status_text, .message))]
    RemoteApi {
        status: u16,
        status_text: String,
        message: Option<String>,
        /// `x-ratelimit-remaining` of the failed response, when reported
        rate_limit_remaining: Option<u32>,
    },

    #[error("Invalid repository path: {0}")]
    InvalidRemotePath(String),

    #[error("Remote file {0} is not valid base64-encoded UTF-8")]
    InvalidRemoteContent(String),

    // --- Sync errors ---
    #[error("Record \"{0}\" not found in local storage")]
    RecordNotFoundLocally(String),

    #[error("Record \"{0}\" not found in the remote repository")]
    RecordNotFoundRemotely(String),

    #[error("Remote record id \"{found}\" does not match requested id \"{expected}\"")]
    RecordIdMismatch { expected: String, found: String },

    #[error("\"{0}\" cannot be used as a record id or template name (empty, path separator or control character)")]
    InvalidIdentifier(String),

    // --- Auth errors ---
    #[error("No access token found in redirect URL")]
    MissingAccessToken,

    #[error("Invalid redirect URL: {0}")]
    InvalidRedirectUrl(#[from] url::ParseError),

    // --- Config errors ---
    #[error("Config error: {0}")]
    Config(String),

    // --- Plumbing ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

fn describe_remote(status_text: &str, message: &Option<String>) -> String {
    match message.as_deref() {
        Some(msg) if !msg.is_empty() => format!("{}: {}", status_text, msg),
        _ => status_text.to_string(),
    }
}

impl Error {
    /// True for remote absence (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when GitHub rejected the call because the rate-limit budget is
    /// spent: any 429, or a 403 with zero remaining budget or a rate-limit
    /// message.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::RemoteApi {
                status,
                message,
                rate_limit_remaining,
                ..
            } => {
                *status == 429
                    || (*status == 403
                        && (*rate_limit_remaining == Some(0)
                            || message
                                .as_deref()
                                .is_some_and(|m| m.to_ascii_lowercase().contains("rate limit"))))
            }
            _ => false,
        }
    }
}

/// Convenience type alias for Prompetize results.
pub type Result<T> = std::result::Result<T, Error>;
