use std::collections::BTreeSet;

/// A pull request as fetched from GitHub, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Opaque node id, stable across pagination pages
    pub id: String,
    /// PR number (e.g., 42)
    pub number: u64,
    pub title: String,
    /// Free-text description, possibly empty
    pub body: String,
    /// Author's GitHub login
    pub author: String,
    pub labels: BTreeSet<String>,
    pub merged: bool,
    pub url: String,
}

impl PullRequest {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Stable reference used in diagnostics. Falls back to `#number` when the
    /// URL is unknown.
    pub fn reference(&self) -> String {
        if self.url.is_empty() {
            format!("#{}", self.number)
        } else {
            self.url.clone()
        }
    }
}

/// A commit visited while walking a branch's history, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub associated_pull_requests: Vec<PullRequest>,
}

/// One batch of history plus its continuation cursor.
#[derive(Debug, Clone, Default)]
pub struct CommitPage {
    pub commits: Vec<Commit>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// A release tag and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub sha: String,
    pub name: String,
}

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A pull request named on the command line, optionally with the repository
/// it lives in when given as a full URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRef {
    pub repo: Option<RepoRef>,
    pub number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_prefers_url() {
        let mut pr = PullRequest {
            id: "PR_1".to_string(),
            number: 7,
            title: "t".to_string(),
            body: String::new(),
            author: "alice".to_string(),
            labels: BTreeSet::new(),
            merged: true,
            url: "https://github.com/org/repo/pull/7".to_string(),
        };
        assert_eq!(pr.reference(), "https://github.com/org/repo/pull/7");
        pr.url.clear();
        assert_eq!(pr.reference(), "#7");
    }

    #[test]
    fn test_repo_ref_display() {
        let repo = RepoRef {
            owner: "org".to_string(),
            name: "repo".to_string(),
        };
        assert_eq!(repo.to_string(), "org/repo");
    }
}
