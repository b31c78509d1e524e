pub mod release;

use release::ReleaseTargets;

use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::github::{Commit, GitHubError, HostingClient, PullRequest, RepoRef};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Api(#[from] GitHubError),

    #[error("Branch {0} has no commits")]
    EmptyHistory(String),

    #[error("End commit {0} not found between the branch tip and the previous release")]
    EndCommitNotFound(String),

    #[error("Commit history cursor did not advance past {0}")]
    CursorStalled(String),

    #[error("Commit history page {0} reported more commits without a cursor")]
    CursorMissing(usize),
}

/// Sequential walk over a branch's history, one page per request, newest
/// commit first. Each request's cursor comes from the previous response.
pub struct CommitPages<'a> {
    client: &'a dyn HostingClient,
    repo: &'a RepoRef,
    branch: &'a str,
    cursor: Option<String>,
    pages: usize,
    done: bool,
}

impl<'a> CommitPages<'a> {
    pub fn new(client: &'a dyn HostingClient, repo: &'a RepoRef, branch: &'a str) -> Self {
        Self {
            client,
            repo,
            branch,
            cursor: None,
            pages: 0,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once history is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Commit>>, HistoryError> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .client
            .fetch_commit_page(self.repo, self.branch, self.cursor.as_deref())
            .await?;
        self.pages += 1;
        debug!(page = self.pages, commits = page.commits.len(), "walked commit page");

        match (page.has_more, page.next_cursor) {
            (true, Some(next)) => {
                if self.cursor.as_deref() == Some(next.as_str()) {
                    return Err(HistoryError::CursorStalled(next));
                }
                self.cursor = Some(next);
            }
            (true, None) => return Err(HistoryError::CursorMissing(self.pages)),
            (false, _) => self.done = true,
        }

        Ok(Some(page.commits))
    }
}

/// Where the new release's window starts (exclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary {
    /// Target commit of the most recent non-patch release on the branch.
    Release(String),
    /// No prior non-patch release exists; the oldest commit of the branch.
    HistoryRoot(String),
}

impl Boundary {
    pub fn sha(&self) -> &str {
        match self {
            Boundary::Release(sha) | Boundary::HistoryRoot(sha) => sha,
        }
    }
}

/// Parameters of a boundary search.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundarySearch<'a> {
    /// How many of the newest releases are candidates
    pub release_limit: usize,
    /// Releases whose name matches are never boundaries
    pub ignore: Option<&'a Regex>,
    /// Commit the new release ends at; the walk starts below it
    pub end_sha: Option<&'a str>,
    /// Name of the release being prepared, which is never its own boundary
    pub current_release: Option<&'a str>,
}

/// Find the commit the previous non-patch release points at.
///
/// Fetches the newest releases, drops those matching `ignore` or named like
/// the release being prepared, then walks `branch` from `end_sha` (the tip when
/// unset) and stops at the first older commit targeted by a non-patch release.
/// Patch releases met on the way are walked past.
#[instrument(skip(client, repo, search), fields(repo = %repo, end = ?search.end_sha))]
pub async fn find_release_boundary(
    client: &dyn HostingClient,
    repo: &RepoRef,
    branch: &str,
    search: &BoundarySearch<'_>,
) -> Result<Boundary, HistoryError> {
    let mut releases = client.list_releases(repo, search.release_limit).await?;
    if let Some(current) = search.current_release {
        releases.retain(|release| release.name != current);
    }
    let targets = ReleaseTargets::partition(&releases, search.ignore);
    debug!(
        patch = targets.patch.len(),
        non_patch = targets.non_patch.len(),
        "partitioned release targets"
    );

    let mut pages = CommitPages::new(client, repo, branch);
    let mut last_seen: Option<String> = None;
    let mut reached_end = search.end_sha.is_none();
    while let Some(commits) = pages.next_page().await? {
        for commit in commits {
            if !reached_end {
                // the end commit belongs to the new release
                if search.end_sha == Some(commit.sha.as_str()) {
                    reached_end = true;
                    last_seen = Some(commit.sha);
                }
                continue;
            }
            if targets.is_boundary(&commit.sha) {
                info!(sha = %commit.sha, "found previous release commit");
                return Ok(Boundary::Release(commit.sha));
            }
            if targets.patch.contains(&commit.sha) {
                debug!(sha = %commit.sha, "walking past patch release");
            }
            last_seen = Some(commit.sha);
        }
    }

    if let (false, Some(end)) = (reached_end, search.end_sha) {
        return Err(HistoryError::EndCommitNotFound(end.to_string()));
    }

    match last_seen {
        Some(root) => {
            info!(sha = %root, "no previous non-patch release found, using full history");
            Ok(Boundary::HistoryRoot(root))
        }
        None => Err(HistoryError::EmptyHistory(branch.to_string())),
    }
}

/// Which commits and authors a collection walk considers.
#[derive(Debug, Clone, Default)]
pub struct Window {
    /// Boundary commit; it and everything older belong to the previous release.
    pub start_sha: String,
    /// Newest commit to include. `None` means the branch tip.
    pub end_sha: Option<String>,
    /// Logins whose pull requests are dropped while fetching.
    pub excluded_authors: HashSet<String>,
}

/// Collect merged pull requests associated with commits in
/// `(start_sha, end_sha]`, deduplicated by pull request id, in walk order.
#[instrument(skip(client, repo, window), fields(repo = %repo, start = %window.start_sha))]
pub async fn collect_merged_pull_requests(
    client: &dyn HostingClient,
    repo: &RepoRef,
    branch: &str,
    window: &Window,
) -> Result<Vec<PullRequest>, HistoryError> {
    let mut pages = CommitPages::new(client, repo, branch);
    let mut seen: HashSet<String> = HashSet::new();
    let mut pull_requests = Vec::new();
    let mut in_window = window.end_sha.is_none();

    'walk: while let Some(commits) = pages.next_page().await? {
        for commit in commits {
            if commit.sha == window.start_sha {
                break 'walk;
            }
            if !in_window {
                if window.end_sha.as_deref() != Some(commit.sha.as_str()) {
                    continue;
                }
                debug!(sha = %commit.sha, "reached end commit");
                in_window = true;
            }

            for pr in commit.associated_pull_requests {
                if !pr.merged {
                    continue;
                }
                if window.excluded_authors.contains(&pr.author) {
                    debug!(pr = pr.number, author = %pr.author, "skipping excluded author");
                    continue;
                }
                if seen.insert(pr.id.clone()) {
                    pull_requests.push(pr);
                }
            }
        }
    }

    if !in_window {
        if let Some(end) = &window.end_sha {
            warn!(end = %end, "end commit was not reached before the release boundary");
            return Err(HistoryError::EndCommitNotFound(end.clone()));
        }
    }

    info!(prs = pull_requests.len(), "collected merged pull requests");
    Ok(pull_requests)
}
