//! GitHub OAuth implicit flow.
//!
//! Flow:
//! 1. Build the authorize URL (`response_type=token`)
//! 2. An external launcher (browser identity API, or the CLI prompt) opens it
//!    and hands back the redirect URL
//! 3. The access token is read from the redirect URL fragment
//! 4. The token is persisted encrypted in LocalCache under [`TOKEN_STORAGE_KEY`]
//!
//! The token is shared by every GitHubClient call and is not locked: a
//! logout racing an in-flight request does not cancel that request.

use crate::error::{Error, Result};
use crate::storage::LocalCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// GitHub OAuth authorize endpoint
pub const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Well-known LocalCache key for the access token
pub const TOKEN_STORAGE_KEY: &str = "githubToken";

/// Scopes requested by default
pub const DEFAULT_SCOPES: &[&str] = &["repo", "user", "delete_repo"];

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// Authorize URL for the implicit flow.
pub fn authorize_url(config: &AuthConfig) -> Result<Url> {
    let scope = config.scopes.join(" ");
    let url = Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("response_type", "token"),
        ],
    )?;
    Ok(url)
}

/// Pull `access_token` out of a redirect URL fragment
/// (`https://…/cb#access_token=…&token_type=bearer`).
pub fn extract_token(redirect_url: &str) -> Result<AuthToken> {
    let url = Url::parse(redirect_url.trim())?;
    let fragment = url.fragment().ok_or(Error::MissingAccessToken)?;

    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
        .map(AuthToken)
        .ok_or(Error::MissingAccessToken)
}

/// Token lifecycle: created by authentication, destroyed by logout.
pub struct GitHubAuth {
    cache: Arc<LocalCache>,
    config: AuthConfig,
}

impl GitHubAuth {
    pub fn new(cache: Arc<LocalCache>, config: AuthConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn authorize_url(&self) -> Result<Url> {
        authorize_url(&self.config)
    }

    /// Finish the flow with the launcher's redirect URL.
    pub async fn complete(&self, redirect_url: &str) -> Result<AuthToken> {
        let token = extract_token(redirect_url)?;
        self.save_token(&token).await?;
        tracing::info!("GitHub authentication completed");
        Ok(token)
    }

    pub async fn save_token(&self, token: &AuthToken) -> Result<()> {
        self.cache.save(TOKEN_STORAGE_KEY, token).await
    }

    pub async fn stored_token(&self) -> Result<Option<AuthToken>> {
        self.cache.load(TOKEN_STORAGE_KEY).await
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.stored_token().await?.is_some())
    }

    pub async fn logout(&self) -> Result<()> {
        self.cache.remove(TOKEN_STORAGE_KEY).await?;
        tracing::info!("Removed stored GitHub token");
        Ok(())
    }
}
