use crate::classify::release_note;
use crate::github::PullRequest;

/// A pull request as it appears in the release notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNoteEntry {
    pub title: String,
    pub number: u64,
    /// Author's GitHub login
    pub author: String,
    /// Text under the body's "Release Note" header, empty when absent
    pub release_note: String,
}

impl From<&PullRequest> for ReleaseNoteEntry {
    fn from(pr: &PullRequest) -> Self {
        Self {
            title: pr.title.clone(),
            number: pr.number,
            author: pr.author.clone(),
            release_note: release_note::extract(&pr.body),
        }
    }
}

/// A top-level section of the release notes.
///
/// Sections keep every subsection, empty or not; the renderer decides what
/// is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    /// Glyph shown before the title
    pub icon: String,
    pub prs: Vec<ReleaseNoteEntry>,
    pub subsections: Vec<SubSection>,
}

impl Section {
    /// True when neither the section nor any subsection holds a pull request.
    pub fn is_empty(&self) -> bool {
        self.prs.is_empty() && self.subsections.iter().all(SubSection::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSection {
    pub title: String,
    pub prs: Vec<ReleaseNoteEntry>,
}

impl SubSection {
    pub fn is_empty(&self) -> bool {
        self.prs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: u64) -> ReleaseNoteEntry {
        ReleaseNoteEntry {
            title: "PR Title".to_string(),
            number,
            author: "alice".to_string(),
            release_note: String::new(),
        }
    }

    #[test]
    fn test_section_with_only_empty_subsections_is_empty() {
        let section = Section {
            title: "No Impact".to_string(),
            icon: "🤷".to_string(),
            prs: vec![],
            subsections: vec![SubSection {
                title: "Refactors".to_string(),
                prs: vec![],
            }],
        };
        assert!(section.is_empty());
    }

    #[test]
    fn test_section_with_populated_subsection_is_not_empty() {
        let section = Section {
            title: "No Impact".to_string(),
            icon: "🤷".to_string(),
            prs: vec![],
            subsections: vec![SubSection {
                title: "Refactors".to_string(),
                prs: vec![entry(1)],
            }],
        };
        assert!(!section.is_empty());
    }

    #[test]
    fn test_entry_from_pull_request() {
        let pr = PullRequest {
            id: "PR_5".to_string(),
            number: 5,
            title: "Fix flaky worker".to_string(),
            body: "## Release Note\n\nWorkers no longer hang.".to_string(),
            author: "bob".to_string(),
            labels: ["bug".to_string()].into_iter().collect(),
            merged: true,
            url: String::new(),
        };
        let entry = ReleaseNoteEntry::from(&pr);
        assert_eq!(entry.number, 5);
        assert_eq!(entry.author, "bob");
        assert_eq!(entry.release_note, "Workers no longer hang.");
    }
}
