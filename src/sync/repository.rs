//! Repository management on top of [`GitHubClient`]: community repository
//! access (with fork fallback), personal repositories, prompt templates and
//! template contribution via pull request.

use super::github::{GitHubClient, GitHubRepository, PullRequest};
use crate::config::CommunityConfig;
use crate::error::{Error, Result};
use crate::storage::validate_identifier;
use chrono::Utc;
use std::sync::Arc;

/// Directory of shared templates in a repository
pub const TEMPLATES_DIR: &str = "templates";

const PERSONAL_REPO_DESCRIPTION: &str =
    "Personal prompt template repository created with Prompetize";

const CONTRIBUTION_PR_BODY: &str = "Contributed via Prompetize extension";

/// `templates/{name}.json`
pub fn template_path(name: &str) -> String {
    format!("{}/{}.json", TEMPLATES_DIR, name)
}

pub struct RepositoryService {
    client: Arc<GitHubClient>,
    community: CommunityConfig,
}

impl RepositoryService {
    pub fn new(client: Arc<GitHubClient>, community: CommunityConfig) -> Self {
        Self { client, community }
    }

    pub fn community(&self) -> &CommunityConfig {
        &self.community
    }

    /// The community repository, or a fork of it when the user cannot see
    /// it directly (404 or 403).
    pub async fn ensure_default_repository_access(&self) -> Result<GitHubRepository> {
        let CommunityConfig { owner, name, .. } = &self.community;

        match self.client.get_repository(owner, name).await {
            Ok(repo) => Ok(repo),
            Err(e) if e.is_not_found() || matches!(e, Error::RemoteApi { status: 403, .. }) => {
                tracing::info!("No direct access to {}/{}, forking", owner, name);
                self.client.fork_repository(owner, name).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create_personal_repository(
        &self,
        name: &str,
        private: bool,
    ) -> Result<GitHubRepository> {
        self.client
            .create_repository(name, Some(PERSONAL_REPO_DESCRIPTION), private)
            .await
    }

    /// The user's repositories, with the community repository first when
    /// it is reachable.
    pub async fn list_available_repositories(&self) -> Result<Vec<GitHubRepository>> {
        let mut repositories = self.client.list_user_repositories().await?;
        let CommunityConfig { owner, name, .. } = &self.community;

        match self.client.get_repository(owner, name).await {
            Ok(community) => {
                repositories.retain(|r| r.full_name != community.full_name);
                repositories.insert(0, community);
            }
            Err(e) => tracing::debug!("Community repository not accessible: {}", e),
        }

        Ok(repositories)
    }

    pub async fn save_prompt_template(
        &self,
        owner: &str,
        repo: &str,
        template_name: &str,
        content: &str,
        is_update: bool,
    ) -> Result<()> {
        self.write_template(owner, repo, template_name, content, is_update, None)
            .await
    }

    pub async fn get_prompt_template(
        &self,
        owner: &str,
        repo: &str,
        template_name: &str,
    ) -> Result<String> {
        validate_identifier(template_name)?;
        let file = self
            .client
            .get_file(owner, repo, &template_path(template_name))
            .await?;
        Ok(file.content)
    }

    /// Branch off the community base branch, commit the template there and
    /// open a pull request back into the base branch.
    pub async fn contribute_to_default_repository(
        &self,
        template_name: &str,
        content: &str,
    ) -> Result<PullRequest> {
        validate_identifier(template_name)?;
        let CommunityConfig {
            owner,
            name,
            base_branch,
        } = &self.community;
        let branch = format!(
            "template-{}-{}",
            template_name,
            Utc::now().timestamp_millis()
        );

        self.client
            .create_branch(owner, name, &branch, base_branch)
            .await?;

        self.write_template(owner, name, template_name, content, false, Some(&branch))
            .await?;

        let pr = self
            .client
            .create_pull_request(
                owner,
                name,
                &format!("Add prompt template: {}", template_name),
                &branch,
                base_branch,
                Some(CONTRIBUTION_PR_BODY),
            )
            .await?;

        tracing::info!("Opened pull request #{} for {}", pr.number, template_name);
        Ok(pr)
    }

    async fn write_template(
        &self,
        owner: &str,
        repo: &str,
        template_name: &str,
        content: &str,
        is_update: bool,
        branch: Option<&str>,
    ) -> Result<()> {
        validate_identifier(template_name)?;
        let message = if is_update {
            format!("Update prompt template: {}", template_name)
        } else {
            format!("Add prompt template: {}", template_name)
        };

        self.client
            .create_or_update_file(
                owner,
                repo,
                &template_path(template_name),
                content,
                &message,
                branch,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_path() {
        assert_eq!(template_path("summarize"), "templates/summarize.json");
    }
}
