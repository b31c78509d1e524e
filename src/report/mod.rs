pub mod types;

pub use types::{ReleaseNoteEntry, Section};

use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write release notes: {0}")]
    Write(#[from] std::io::Error),
}

/// Render sections as markdown into `w`.
///
/// Sections render in the given order. Empty sections and subsections write
/// nothing at all. Each pull request becomes a bullet with its title, number,
/// author, and a self-link anchor; a release note, when present, is indented
/// beneath it.
///
/// ```text
/// <br />
///
/// # 🐞 Bug Fixes
///
/// * **Fix flaky worker (#5)** @bob <sub><sup><a name="5" href="#5">:link:</a></sup></sub>
///   Workers no longer hang.
/// ```
pub fn render<W: Write>(sections: &[Section], w: &mut W) -> Result<(), ReportError> {
    for section in sections {
        if section.is_empty() {
            debug!(section = %section.title, "skipping empty section");
            continue;
        }

        write!(w, "\n<br />\n\n# {} {}\n\n", section.icon, section.title)?;
        write_entries(&section.prs, w)?;

        for sub in section.subsections.iter().filter(|s| !s.is_empty()) {
            write!(w, "\n## {}\n\n", sub.title)?;
            write_entries(&sub.prs, w)?;
        }
    }
    Ok(())
}

fn write_entries<W: Write>(entries: &[ReleaseNoteEntry], w: &mut W) -> Result<(), ReportError> {
    for pr in entries {
        writeln!(
            w,
            "* **{} (#{})** @{} <sub><sup><a name=\"{}\" href=\"#{}\">:link:</a></sup></sub>  ",
            pr.title, pr.number, pr.author, pr.number, pr.number
        )?;
        if !pr.release_note.is_empty() {
            writeln!(w, "{}", indent(2, &pr.release_note))?;
        }
    }
    Ok(())
}

/// Prefix every line of `text` with `spaces` spaces; blank lines stay blank.
fn indent(spaces: usize, text: &str) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the release notes to stdout (default) or to a markdown file.
///
/// `version` labels the document with an HTML comment, which markdown
/// renderers hide.
#[instrument(skip(sections), fields(sections = sections.len()))]
pub fn output(sections: &[Section], version: &str, output_path: Option<&Path>) -> Result<(), ReportError> {
    let mut md = Vec::new();
    writeln!(md, "<!-- release-me: {version} -->")?;
    render(sections, &mut md)?;

    match output_path {
        None => {
            debug!("writing release notes to stdout");
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&md)?;
            handle.flush()?;
        }
        Some(path) => {
            debug!(path = %path.display(), "writing release notes to file");
            std::fs::write(path, md)?;
        }
    }
    Ok(())
}
