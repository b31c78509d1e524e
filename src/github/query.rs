//! GraphQL documents sent to GitHub and the response shapes they decode into.

use serde::Deserialize;

use super::types::{Commit, CommitPage, PullRequest, Release};

/// Commits fetched per history page.
pub const HISTORY_PAGE_SIZE: u32 = 100;

pub const RELEASES_QUERY: &str = r#"
query($owner: String!, $name: String!, $limit: Int!) {
  repository(owner: $owner, name: $name) {
    releases(first: $limit, orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes {
        name
        tagName
        tagCommit { oid }
      }
    }
  }
}
"#;

pub const HISTORY_QUERY: &str = r#"
query($owner: String!, $name: String!, $branch: String!, $cursor: String, $pageSize: Int!) {
  repository(owner: $owner, name: $name) {
    ref(qualifiedName: $branch) {
      target {
        ... on Commit {
          history(first: $pageSize, after: $cursor) {
            nodes {
              oid
              associatedPullRequests(first: 5) {
                nodes {
                  id
                  number
                  title
                  body
                  url
                  merged
                  author { login }
                  labels(first: 10) { nodes { name } }
                }
              }
            }
            pageInfo { endCursor hasNextPage }
          }
        }
      }
    }
  }
}
"#;

pub const LABELS_QUERY: &str = r#"
query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      labels(first: 100) { nodes { name } }
    }
  }
}
"#;

/// Envelope of every GraphQL response.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Nodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData<T> {
    pub repository: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ReleasesRepository {
    pub releases: Nodes<ReleaseNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNode {
    pub name: Option<String>,
    pub tag_name: String,
    pub tag_commit: Option<Oid>,
}

#[derive(Debug, Deserialize)]
pub struct Oid {
    pub oid: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryRepository {
    #[serde(rename = "ref")]
    pub git_ref: Option<RefNode>,
}

#[derive(Debug, Deserialize)]
pub struct RefNode {
    pub target: TargetNode,
}

/// `history` is absent when the ref points at something other than a commit.
#[derive(Debug, Deserialize)]
pub struct TargetNode {
    pub history: Option<HistoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryNode {
    pub nodes: Vec<CommitNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub oid: String,
    pub associated_pull_requests: Nodes<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestNode {
    pub id: String,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub url: String,
    pub merged: bool,
    pub author: Option<Login>,
    pub labels: Option<Nodes<LabelNode>>,
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct LabelNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsRepository {
    pub pull_request: Option<LabelsPullRequest>,
}

#[derive(Debug, Deserialize)]
pub struct LabelsPullRequest {
    pub labels: Option<Nodes<LabelNode>>,
}

/// Login shown for pull requests whose author account was deleted.
const GHOST_AUTHOR: &str = "ghost";

impl From<PullRequestNode> for PullRequest {
    fn from(node: PullRequestNode) -> Self {
        PullRequest {
            id: node.id,
            number: node.number,
            title: node.title,
            body: node.body.unwrap_or_default(),
            author: node
                .author
                .map(|a| a.login)
                .unwrap_or_else(|| GHOST_AUTHOR.to_string()),
            labels: node
                .labels
                .map(|l| l.nodes.into_iter().map(|n| n.name).collect())
                .unwrap_or_default(),
            merged: node.merged,
            url: node.url,
        }
    }
}

impl From<HistoryNode> for CommitPage {
    fn from(history: HistoryNode) -> Self {
        CommitPage {
            commits: history
                .nodes
                .into_iter()
                .map(|c| Commit {
                    sha: c.oid,
                    associated_pull_requests: c
                        .associated_pull_requests
                        .nodes
                        .into_iter()
                        .map(PullRequest::from)
                        .collect(),
                })
                .collect(),
            next_cursor: history.page_info.end_cursor,
            has_more: history.page_info.has_next_page,
        }
    }
}

/// Convert release nodes, dropping releases whose tag no longer resolves to a
/// commit. Untitled releases are named after their tag.
pub fn releases_from_nodes(nodes: Vec<ReleaseNode>) -> Vec<Release> {
    nodes
        .into_iter()
        .filter_map(|node| {
            let commit = node.tag_commit?;
            let name = node
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(node.tag_name);
            Some(Release {
                sha: commit.oid,
                name,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_history_page() {
        let raw = include_str!("../../tests/fixtures/history_page.json");
        let response: GraphQlResponse<RepositoryData<HistoryRepository>> =
            serde_json::from_str(raw).unwrap();
        assert!(response.errors.is_empty());

        let history = response
            .data
            .unwrap()
            .repository
            .unwrap()
            .git_ref
            .unwrap()
            .target
            .history
            .unwrap();
        let page = CommitPage::from(history);

        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("c2hhOjI="));
        assert_eq!(page.commits.len(), 2);
        assert_eq!(page.commits[0].sha, "aaa111");

        let pr = &page.commits[0].associated_pull_requests[0];
        assert_eq!(pr.number, 6);
        assert_eq!(pr.author, "alice");
        assert!(pr.merged);
        assert!(pr.has_label("enhancement"));
        assert!(pr.has_label("priority"));
        assert!(pr.body.contains("## Release Note"));

        // deleted account and null body
        let ghost = &page.commits[1].associated_pull_requests[0];
        assert_eq!(ghost.author, "ghost");
        assert_eq!(ghost.body, "");
        assert!(!ghost.merged);
    }

    #[test]
    fn test_decode_releases() {
        let raw = include_str!("../../tests/fixtures/releases.json");
        let response: GraphQlResponse<RepositoryData<ReleasesRepository>> =
            serde_json::from_str(raw).unwrap();
        let nodes = response.data.unwrap().repository.unwrap().releases.nodes;
        let releases = releases_from_nodes(nodes);

        assert_eq!(
            releases,
            vec![
                Release {
                    sha: "bbb222".to_string(),
                    name: "v7.1.1".to_string(),
                },
                Release {
                    sha: "ccc333".to_string(),
                    name: "v7.1.0".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_decode_graphql_errors() {
        let raw = r#"{"data": null, "errors": [{"message": "Could not resolve to a Repository"}]}"#;
        let response: GraphQlResponse<RepositoryData<LabelsRepository>> =
            serde_json::from_str(raw).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "Could not resolve to a Repository");
    }
}
