pub mod query;
pub mod types;

pub use types::{Commit, CommitPage, PrRef, PullRequest, Release, RepoRef};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use query::{
    GraphQlResponse, HistoryRepository, LabelsRepository, ReleasesRepository, RepositoryData,
    HISTORY_PAGE_SIZE, HISTORY_QUERY, LABELS_QUERY, RELEASES_QUERY,
};

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned errors: {0}")]
    GraphQl(String),

    #[error("GitHub API response contained no data")]
    MissingData,

    #[error("Repository {0} not found")]
    RepositoryNotFound(RepoRef),

    #[error("Branch {branch} not found in {repo}")]
    BranchNotFound { repo: RepoRef, branch: String },

    #[error("Pull request #{number} not found in {repo}")]
    PullRequestNotFound { repo: RepoRef, number: u64 },

    #[error("Invalid pull request reference: {0}")]
    InvalidReference(String),

    #[error("GitHub token not found in config or environment")]
    MissingToken,
}

/// The capabilities release-note generation needs from a hosting provider.
/// Must be Send + Sync so one client can be shared across the pipeline.
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Most recent releases, newest first, at most `limit` of them.
    async fn list_releases(&self, repo: &RepoRef, limit: usize) -> Result<Vec<Release>, GitHubError>;

    /// One page of `branch` history starting after `cursor` (from the tip when `None`).
    async fn fetch_commit_page(
        &self,
        repo: &RepoRef,
        branch: &str,
        cursor: Option<&str>,
    ) -> Result<CommitPage, GitHubError>;

    async fn fetch_pull_request_labels(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<String>, GitHubError>;
}

/// Parse a pull request reference given on the command line.
///
/// Accepts `42`, `#42`, or `https://github.com/{owner}/{repo}/pull/{number}`.
/// Return GitHubError::InvalidReference for anything else.
pub fn parse_pr_ref(input: &str) -> Result<PrRef, GitHubError> {
    let invalid = || GitHubError::InvalidReference(input.to_string());
    let trimmed = input.trim();

    if let Ok(number) = trimmed.trim_start_matches('#').parse::<u64>() {
        return Ok(PrRef { repo: None, number });
    }

    let parsed = reqwest::Url::parse(trimmed).map_err(|_| invalid())?;
    if parsed.host_str() != Some("github.com") {
        return Err(invalid());
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(invalid());
    }

    let number = segments[3].parse::<u64>().map_err(|_| invalid())?;

    Ok(PrRef {
        repo: Some(RepoRef {
            owner: segments[0].to_string(),
            name: segments[1].to_string(),
        }),
        number,
    })
}

/// GitHub GraphQL (v4) client.
pub struct GitHub {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GitHub {
    /// Build a client. `timeout` bounds every request; an expired request
    /// aborts whatever walk is in progress.
    pub fn new(
        token: String,
        endpoint: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GitHubError> {
        let mut builder = reqwest::Client::builder().user_agent("release-me");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            token,
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T, GitHubError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<GraphQlResponse<T>>().await?;
        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(GitHubError::GraphQl(messages.join("; ")));
        }
        body.data.ok_or(GitHubError::MissingData)
    }
}

#[async_trait]
impl HostingClient for GitHub {
    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn list_releases(&self, repo: &RepoRef, limit: usize) -> Result<Vec<Release>, GitHubError> {
        let data: RepositoryData<ReleasesRepository> = self
            .query(
                RELEASES_QUERY,
                json!({ "owner": repo.owner, "name": repo.name, "limit": limit }),
            )
            .await?;
        let repository = data
            .repository
            .ok_or_else(|| GitHubError::RepositoryNotFound(repo.clone()))?;

        let releases = query::releases_from_nodes(repository.releases.nodes);
        debug!(releases = releases.len(), "received releases");
        Ok(releases)
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn fetch_commit_page(
        &self,
        repo: &RepoRef,
        branch: &str,
        cursor: Option<&str>,
    ) -> Result<CommitPage, GitHubError> {
        let data: RepositoryData<HistoryRepository> = self
            .query(
                HISTORY_QUERY,
                json!({
                    "owner": repo.owner,
                    "name": repo.name,
                    "branch": branch,
                    "cursor": cursor,
                    "pageSize": HISTORY_PAGE_SIZE,
                }),
            )
            .await?;
        let branch_not_found = || GitHubError::BranchNotFound {
            repo: repo.clone(),
            branch: branch.to_string(),
        };

        let history = data
            .repository
            .ok_or_else(|| GitHubError::RepositoryNotFound(repo.clone()))?
            .git_ref
            .ok_or_else(branch_not_found)?
            .target
            .history
            .ok_or_else(branch_not_found)?;

        let page = CommitPage::from(history);
        debug!(commits = page.commits.len(), has_more = page.has_more, "received commit page");
        Ok(page)
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn fetch_pull_request_labels(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<String>, GitHubError> {
        let data: RepositoryData<LabelsRepository> = self
            .query(
                LABELS_QUERY,
                json!({ "owner": repo.owner, "name": repo.name, "number": number }),
            )
            .await?;
        let pull_request = data
            .repository
            .ok_or_else(|| GitHubError::RepositoryNotFound(repo.clone()))?
            .pull_request
            .ok_or_else(|| GitHubError::PullRequestNotFound {
                repo: repo.clone(),
                number,
            })?;

        Ok(pull_request
            .labels
            .map(|l| l.nodes.into_iter().map(|n| n.name).collect())
            .unwrap_or_default())
    }
}
