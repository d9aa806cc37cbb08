//! Config module - Prompetize configuration (prompetize.toml).
//!
//! The file holds:
//! - Data directory for the encrypted local store
//! - GitHub API / OAuth settings and the default sync target
//! - The community repository used for template contributions
//! - Key-derivation salt and iteration count
//!
//! The passphrase is never written to the file; it comes from
//! [`PASSPHRASE_ENV`] or an interactive prompt.

use crate::crypto::key_derivation::{KeyMaterial, DEFAULT_ITERATIONS, DEFAULT_SALT};
use crate::error::{Error, Result};
use crate::sync::github::{ApiConfig, DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT};
use crate::sync::oauth::{AuthConfig, DEFAULT_SCOPES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable carrying the storage passphrase
pub const PASSPHRASE_ENV: &str = "PROMPETIZE_PASSPHRASE";

/// File name of the encrypted key-value store inside the data directory
pub const STORE_FILE_NAME: &str = "storage.json";

/// GitHub API and OAuth settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// OAuth app client id
    #[serde(default)]
    pub client_id: String,

    /// Redirect URI registered for the OAuth app
    #[serde(default)]
    pub redirect_uri: String,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Default owner for push/pull
    pub owner: Option<String>,

    /// Default repository for push/pull
    pub repo: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            client_id: String::new(),
            redirect_uri: String::new(),
            scopes: default_scopes(),
            owner: None,
            repo: None,
        }
    }
}

impl GitHubConfig {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

/// Shared community repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityConfig {
    #[serde(default = "default_community_owner")]
    pub owner: String,

    #[serde(default = "default_community_name")]
    pub name: String,

    #[serde(default = "default_base_branch")]
    pub base_branch: String,
}

fn default_community_owner() -> String {
    "prompetize-community".to_string()
}

fn default_community_name() -> String {
    "prompts".to_string()
}

fn default_base_branch() -> String {
    "main".to_string()
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            owner: default_community_owner(),
            name: default_community_name(),
            base_branch: default_base_branch(),
        }
    }
}

/// Key-derivation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionConfig {
    #[serde(default = "default_salt")]
    pub salt: String,

    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_salt() -> String {
    DEFAULT_SALT.to_string()
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            salt: default_salt(),
            iterations: default_iterations(),
        }
    }
}

impl EncryptionConfig {
    pub fn key_material(&self, passphrase: impl Into<String>) -> KeyMaterial {
        KeyMaterial::new(passphrase)
            .with_salt(self.salt.clone())
            .with_iterations(self.iterations)
    }
}

/// Main Prompetize configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Config version (for future migrations)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the encrypted local store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub community: CommunityConfig,

    #[serde(default)]
    pub encryption: EncryptionConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_dir: default_data_dir(),
            github: GitHubConfig::default(),
            community: CommunityConfig::default(),
            encryption: EncryptionConfig::default(),
        }
    }
}

/// Default data directory (~/.local/share/prompetize on Linux)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("prompetize"))
        .unwrap_or_else(|| PathBuf::from("./prompetize-data"))
}

/// Default config directory (~/.config/prompetize on Linux)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("prompetize"))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("prompetize.toml")
}

/// Passphrase from the environment, if set and non-empty
pub fn passphrase_from_env() -> Option<String> {
    std::env::var(PASSPHRASE_ENV)
        .ok()
        .filter(|p| !p.is_empty())
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_default() -> Result<Self> {
        Self::load_or_default(&default_config_path())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("cannot serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path of the encrypted key-value store
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    /// Default push/pull target, if configured
    pub fn sync_target(&self) -> Option<(&str, &str)> {
        match (&self.github.owner, &self.github.repo) {
            (Some(owner), Some(repo)) => Some((owner.as_str(), repo.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.github.api_base_url, "https://api.github.com");
        assert_eq!(config.github.scopes, vec!["repo", "user", "delete_repo"]);
        assert_eq!(config.community.owner, "prompetize-community");
        assert_eq!(config.encryption.iterations, 100_000);
        assert!(config.sync_target().is_none());
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("prompetize.toml");

        let mut config = Config::with_data_dir(temp_dir.path().join("data"));
        config.github.owner = Some("octocat".to_string());
        config.github.repo = Some("prompts".to_string());
        config.save(&config_path)?;

        let loaded = Config::load(&config_path)?;
        assert_eq!(loaded.sync_target(), Some(("octocat", "prompts")));
        assert_eq!(loaded.store_path(), temp_dir.path().join("data").join("storage.json"));
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("prompetize.toml");
        std::fs::write(
            &config_path,
            "[github]\nclient_id = \"abc\"\n\n[encryption]\niterations = 5000\n",
        )?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.github.client_id, "abc");
        assert_eq!(config.github.user_agent, "Prompetize-Extension");
        assert_eq!(config.encryption.iterations, 5000);
        assert_eq!(config.encryption.salt, "unique-salt");
        assert_eq!(config.community.base_branch, "main");
        Ok(())
    }

    #[test]
    fn test_invalid_toml_is_config_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("prompetize.toml");
        std::fs::write(&config_path, "version = \"not a number\"")?;

        assert!(matches!(Config::load(&config_path), Err(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load_or_default(&temp_dir.path().join("absent.toml"))?;
        assert_eq!(config.version, 1);
        Ok(())
    }

    #[test]
    fn test_key_material_from_config() {
        let encryption = EncryptionConfig {
            salt: "pepper".to_string(),
            iterations: 42,
        };
        let material = encryption.key_material("pw");
        assert_eq!(material.passphrase, "pw");
        assert_eq!(material.salt, "pepper");
        assert_eq!(material.iterations, 42);
    }
}
