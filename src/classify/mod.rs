pub mod labels;
pub mod release_note;

pub use labels::{SectionLayout, LABEL_PRECEDENCE, PRIORITY_LABEL, SECTION_LAYOUT};

use std::cmp::Reverse;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::github::PullRequest;
use crate::report::types::{ReleaseNoteEntry, Section, SubSection};

/// Every pull request that carries none of the recognized labels, found in a
/// single pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "the following pull request(s):\n{}\n\nmust be labelled with at least one of:\n{}",
    bullet_list(.identifiers),
    bullet_list(.valid_labels)
)]
pub struct PullRequestsNotLabelled {
    pub identifiers: Vec<String>,
    pub valid_labels: Vec<String>,
}

impl PullRequestsNotLabelled {
    pub fn new(identifiers: Vec<String>, valid_labels: &[&str]) -> Self {
        Self {
            identifiers,
            valid_labels: valid_labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

fn bullet_list<T: AsRef<str>>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Order pull requests for display: priority-labelled first, then by
/// ascending number. Stable, so equal keys keep their input order.
pub fn sort_by_priority(prs: &mut [PullRequest]) {
    prs.sort_by_key(|pr| (Reverse(pr.has_label(PRIORITY_LABEL)), pr.number));
}

/// True when at least one label is recognized.
pub fn validate_labels<S: AsRef<str>>(labels: &[S]) -> bool {
    labels
        .iter()
        .any(|label| LABEL_PRECEDENCE.contains(&label.as_ref()))
}

/// Groups pull requests into the presentation tree using a fixed label
/// precedence and section layout.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    precedence: &'static [&'static str],
    layout: &'static [SectionLayout],
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(LABEL_PRECEDENCE, SECTION_LAYOUT)
    }
}

impl Classifier {
    pub fn new(precedence: &'static [&'static str], layout: &'static [SectionLayout]) -> Self {
        Self { precedence, layout }
    }

    /// The bucket a pull request lands in: its first label in precedence order.
    pub fn bucket_for(&self, pr: &PullRequest) -> Option<&'static str> {
        self.precedence.iter().copied().find(|label| pr.has_label(label))
    }

    /// Sort, bucket, and lay out `prs` as sections.
    ///
    /// Fails without producing any sections if one or more pull requests
    /// carry no recognized label; the error names all of them.
    #[instrument(skip(self, prs), fields(prs = prs.len()))]
    pub fn classify(&self, mut prs: Vec<PullRequest>) -> Result<Vec<Section>, PullRequestsNotLabelled> {
        sort_by_priority(&mut prs);

        let mut buckets: HashMap<&'static str, Vec<ReleaseNoteEntry>> = HashMap::new();
        let mut unlabelled = Vec::new();
        for pr in &prs {
            match self.bucket_for(pr) {
                Some(label) => buckets
                    .entry(label)
                    .or_default()
                    .push(ReleaseNoteEntry::from(pr)),
                None => unlabelled.push(pr.reference()),
            }
        }

        if !unlabelled.is_empty() {
            debug!(unlabelled = unlabelled.len(), "found unlabelled pull requests");
            return Err(PullRequestsNotLabelled::new(unlabelled, self.precedence));
        }

        let mut take = |label: &str| buckets.remove(label).unwrap_or_default();
        let sections = self
            .layout
            .iter()
            .map(|layout| Section {
                title: layout.title.to_string(),
                icon: layout.icon.to_string(),
                prs: take(layout.label),
                subsections: layout
                    .subsections
                    .iter()
                    .map(|sub| SubSection {
                        title: sub.title.to_string(),
                        prs: take(sub.label),
                    })
                    .collect(),
            })
            .collect();
        Ok(sections)
    }
}
