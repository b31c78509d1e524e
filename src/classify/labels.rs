/// Label that moves a pull request to the top of its section.
pub const PRIORITY_LABEL: &str = "priority";

/// Recognized labels in precedence order. A pull request carrying several of
/// them is classified under the first one listed.
pub const LABEL_PRECEDENCE: &[&str] = &[
    "breaking",
    "bug",
    "enhancement",
    "refactor",
    "testing",
    "dependencies",
    "internal",
    "release/no-impact",
];

/// Presentation of one top-level section and the label bucket feeding it.
#[derive(Debug, Clone, Copy)]
pub struct SectionLayout {
    pub title: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub subsections: &'static [SubSectionLayout],
}

#[derive(Debug, Clone, Copy)]
pub struct SubSectionLayout {
    pub title: &'static str,
    pub label: &'static str,
}

/// Section order of the rendered document.
pub const SECTION_LAYOUT: &[SectionLayout] = &[
    SectionLayout {
        title: "Breaking",
        icon: "🚨",
        label: "breaking",
        subsections: &[],
    },
    SectionLayout {
        title: "Features",
        icon: "✈️",
        label: "enhancement",
        subsections: &[],
    },
    SectionLayout {
        title: "Bug Fixes",
        icon: "🐞",
        label: "bug",
        subsections: &[],
    },
    SectionLayout {
        title: "No Impact",
        icon: "🤷",
        label: "release/no-impact",
        subsections: &[
            SubSectionLayout {
                title: "Refactors",
                label: "refactor",
            },
            SubSectionLayout {
                title: "Tests",
                label: "testing",
            },
            SubSectionLayout {
                title: "Dependencies",
                label: "dependencies",
            },
            SubSectionLayout {
                title: "Internal Changes",
                label: "internal",
            },
        ],
    },
];
