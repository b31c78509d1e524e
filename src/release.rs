//! One `generate` or `validate` run against a hosting provider.

use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, instrument};

use crate::classify::{validate_labels, Classifier, PullRequestsNotLabelled, LABEL_PRECEDENCE};
use crate::config::ConfigError;
use crate::github::{GitHubError, HostingClient, RepoRef};
use crate::history::{self, BoundarySearch, HistoryError, Window};
use crate::report::{ReportError, Section};

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("failed to generate release note: {0}")]
    NotLabelled(#[from] PullRequestsNotLabelled),

    #[error("invalid pull request {0}")]
    InvalidPullRequest(PullRequestsNotLabelled),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("invalid ignore-release regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("repository owner and name are required (--owner/--repo or [github] in config)")]
    MissingRepo,
}

/// Everything one release-note generation needs to know.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub repo: RepoRef,
    pub branch: String,
    /// Newest commit to include; the branch tip when `None`
    pub end_commit: Option<String>,
    /// Display label of the release being prepared
    pub release_version: String,
    pub ignore_authors: HashSet<String>,
    pub ignore_release: Option<Regex>,
    pub release_limit: usize,
}

/// Resolve the previous release, fetch what merged since, and classify it.
#[instrument(skip(client, request), fields(repo = %request.repo, branch = %request.branch, version = %request.release_version))]
pub async fn build_sections(
    client: &dyn HostingClient,
    request: &GenerateRequest,
) -> Result<Vec<Section>, ReleaseError> {
    let search = BoundarySearch {
        release_limit: request.release_limit,
        ignore: request.ignore_release.as_ref(),
        end_sha: request.end_commit.as_deref(),
        current_release: Some(request.release_version.as_str()),
    };
    let boundary =
        history::find_release_boundary(client, &request.repo, &request.branch, &search).await?;
    info!(boundary = ?boundary, "resolved release boundary");

    let window = Window {
        start_sha: boundary.sha().to_string(),
        end_sha: request.end_commit.clone(),
        excluded_authors: request.ignore_authors.clone(),
    };
    let prs =
        history::collect_merged_pull_requests(client, &request.repo, &request.branch, &window).await?;

    let sections = Classifier::default().classify(prs)?;
    Ok(sections)
}

/// Check that a pull request carries at least one recognized label.
#[instrument(skip(client, repo), fields(repo = %repo))]
pub async fn validate(client: &dyn HostingClient, repo: &RepoRef, number: u64) -> Result<(), ReleaseError> {
    let labels = client.fetch_pull_request_labels(repo, number).await?;
    info!(labels = labels.len(), "fetched pull request labels");

    if validate_labels(&labels) {
        Ok(())
    } else {
        Err(ReleaseError::InvalidPullRequest(PullRequestsNotLabelled::new(
            vec![format!("{repo}#{number}")],
            LABEL_PRECEDENCE,
        )))
    }
}
