use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::github::Release;

/// First `major.minor.patch` triple found anywhere in a release name, so
/// `v7.1.0` and `release-7.1.0` both parse.
static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("semver pattern is valid"));

/// A release is a patch release when its patch component is non-zero.
///
/// Names without a version triple are treated as non-patch releases, which
/// makes them valid boundary candidates.
pub fn is_patch_release(name: &str) -> bool {
    SEMVER
        .captures(name)
        .and_then(|caps| caps.get(3))
        .and_then(|patch| patch.as_str().parse::<u64>().ok())
        .is_some_and(|patch| patch != 0)
}

/// Release target commits split by release kind.
#[derive(Debug, Default)]
pub struct ReleaseTargets {
    pub patch: HashSet<String>,
    pub non_patch: HashSet<String>,
}

impl ReleaseTargets {
    /// Partition releases by target commit, dropping any whose name matches
    /// `ignore`.
    pub fn partition(releases: &[Release], ignore: Option<&Regex>) -> Self {
        let mut targets = Self::default();
        for release in releases {
            if ignore.is_some_and(|re| re.is_match(&release.name)) {
                continue;
            }
            if is_patch_release(&release.name) {
                targets.patch.insert(release.sha.clone());
            } else {
                targets.non_patch.insert(release.sha.clone());
            }
        }
        targets
    }

    pub fn is_boundary(&self, sha: &str) -> bool {
        self.non_patch.contains(sha)
    }
}
