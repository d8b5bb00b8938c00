//! CLI output formatting for every command.
//!
//! Output leads with what was produced (counts, the selected release, the
//! version) and shows filesystem paths as indented `Source:` context lines.
//!
//! # Output Format
//!
//! ## Page
//!
//! ```text
//! Ants
//!     8 ants
//! Release
//!     February 04, 2024 (2 new ants)
//!         Source: static_site/releases/2024-02-04.json
//! Version
//!     v412
//! Markers
//!     version, ant-count, ant-filler, banner-caption, scroll-container
//! Generated index.html
//! ```
//!
//! ## Readme
//!
//! ```text
//! Generated README.md (8 ants)
//! ```
//!
//! ## Add
//!
//! ```text
//! Added 2 ants
//!     sugar ant
//!     ghost ant
//! Release
//!     static_site/releases/2024-03-09.json
//! ants.txt now lists 10 ants
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::ants::Added;
use crate::generate::{PageReport, ReadmeReport};
use crate::template::Marker;
use std::path::Path;

/// Display `path` relative to `root` when it lies inside it.
fn relative<'a>(path: &'a Path, root: &Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Markers in the order they were expanded.
fn marker_list(markers: &[Marker]) -> String {
    if markers.is_empty() {
        return "(none)".to_string();
    }
    markers
        .iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Page
// ============================================================================

pub fn format_page_report(report: &PageReport, root: &Path) -> Vec<String> {
    let mut lines = vec![
        "Ants".to_string(),
        format!("    {}", plural(report.ant_count, "ant")),
        "Release".to_string(),
        format!(
            "    {} ({})",
            report.release_date,
            plural(report.changelist_count, "new ant")
        ),
        format!("        Source: {}", relative(&report.release.path, root)),
        "Version".to_string(),
        format!("    v{}", report.version),
        "Markers".to_string(),
        format!("    {}", marker_list(&report.markers)),
    ];

    let missing: Vec<&str> = Marker::ALL
        .into_iter()
        .filter(|m| !report.markers.contains(m))
        .map(|m| m.name())
        .collect();
    if !missing.is_empty() {
        lines.push(format!("    Not in template: {}", missing.join(", ")));
    }

    match &report.output {
        Some(path) => lines.push(format!("Generated {}", relative(path, root))),
        None => lines.push("Page is valid".to_string()),
    }
    lines
}

pub fn print_page_report(report: &PageReport, root: &Path) {
    for line in format_page_report(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Readme
// ============================================================================

pub fn format_readme_report(report: &ReadmeReport) -> Vec<String> {
    vec![format!(
        "Generated {} ({})",
        report.output.display(),
        plural(report.ant_count, "ant")
    )]
}

pub fn print_readme_report(report: &ReadmeReport) {
    for line in format_readme_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Add
// ============================================================================

pub fn format_add_report(new_ants: &[String], added: &Added, root: &Path) -> Vec<String> {
    let mut lines = vec![format!("Added {}", plural(new_ants.len(), "ant"))];
    for ant in new_ants {
        lines.push(format!("    {ant}"));
    }
    lines.push("Release".to_string());
    lines.push(format!("    {}", relative(&added.release.path, root)));
    lines.push(format!(
        "{} now lists {}",
        relative(&added.list, root),
        plural(added.ants.len(), "ant")
    ));
    lines
}

pub fn print_add_report(new_ants: &[String], added: &Added, root: &Path) {
    for line in format_add_report(new_ants, added, root) {
        println!("{}", line);
    }
}
