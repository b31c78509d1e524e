use regex::Regex;
use std::sync::LazyLock;

/// `#`/`##` header reading "Release Note(s)" (keyword case-insensitive), then
/// the shortest run of text up to the next `#`/`##` header or end of body.
static RELEASE_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^#{1,2}[ \t]+(?i:release notes?)\s*[\r\n]+((?s:.*?))\s*(?:\z|^#{1,2}[ \t]+)",
    )
    .expect("release note pattern is valid")
});

/// Extract the author-written release note from a pull request body.
/// Returns an empty string when the body has no release note header.
pub fn extract(body: &str) -> String {
    RELEASE_NOTE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|note| note.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_between_headers() {
        let body = "# Description\nblah\n\n## Release Note\n\nomai wa mo shindeiru\n\n## End of Pull request\n\nits over";
        assert_eq!(extract(body), "omai wa mo shindeiru");
    }

    #[test]
    fn test_extract_plural_header_at_end() {
        assert_eq!(extract("## Release Notes\n\nomai wa mo shindeiru"), "omai wa mo shindeiru");
    }

    #[test]
    fn test_extract_case_insensitive_header() {
        assert_eq!(extract("## release note\n\nAdds caching."), "Adds caching.");
        assert_eq!(extract("# RELEASE NOTES\nAdds caching."), "Adds caching.");
    }

    #[test]
    fn test_extract_keeps_content_case() {
        assert_eq!(extract("## Release Note\n\nAdds CACHING."), "Adds CACHING.");
    }

    #[test]
    fn test_extract_multiline_note() {
        let body = "## Release Note\n\n* first\n* second\n\n## Checklist\n- [x] tests";
        assert_eq!(extract(body), "* first\n* second");
    }

    #[test]
    fn test_extract_keeps_deeper_headers() {
        let body = "## Release Note\n\nIntro\n### Details\nMore\n## Next";
        assert_eq!(extract(body), "Intro\n### Details\nMore");
    }

    #[test]
    fn test_extract_crlf_body() {
        let body = "## Release Note\r\n\r\nAdds caching.\r\n\r\n## Other\r\n";
        assert_eq!(extract(body), "Adds caching.");
    }

    #[test]
    fn test_extract_missing_header() {
        assert_eq!(extract(""), "");
        assert_eq!(extract("# Description\n\nNothing to see"), "");
        assert_eq!(extract("### Release Note\n\nToo deep"), "");
    }

    #[test]
    fn test_extract_empty_section() {
        assert_eq!(extract("## Release Note\n\n## Other\nstuff"), "");
    }
}
