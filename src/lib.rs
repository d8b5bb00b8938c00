//! # ants-site
//!
//! Generates the "types of ants" static page and README from a plain-text
//! list of ants. The repository is the data source: `ants.txt` holds the
//! list, `static_site/releases/` holds one dated JSON file per release, and
//! an HTML template marks where generated content goes.
//!
//! # Pipeline
//!
//! ```text
//! ants.txt + releases/ + template + commit count  →  index.html
//! ants.txt                                        →  README.md
//! ```
//!
//! Every run reads its inputs to completion, renders in memory, and only then
//! writes the output atomically. Any missing or malformed input aborts the
//! run before anything is written.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`rules`] | Ordered display rules turning an ant name into markup |
//! | [`release`] | Release file discovery, nearest-to-now selection, loading, publishing |
//! | [`template`] | Marker lines and their substitution |
//! | [`version`] | Version number source (git commit count, or fixed) |
//! | [`ants`] | Reading, writing, and extending `ants.txt`; cutting the day's release |
//! | [`generate`] | Page and README pipelines, atomic writes |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Markers Are Whole Lines
//!
//! A marker is a template line that, trimmed, exactly equals a known literal.
//! Nothing else in the template is touched. The template stays valid HTML
//! that can be opened in a browser as-is, and there is no escaping syntax to
//! learn. See [`template::Marker`].
//!
//! ## Rules Are Data
//!
//! Special renderings for individual ants live in a table, not in branches.
//! The table is append-only so an ant published once keeps its rendering.
//! Extra rules in `config.toml` are appended after the built-in ones.
//!
//! ## Nearest Release, Not Latest
//!
//! The banner shows the release whose date is closest to now. With releases
//! dated in the past this is the latest one; a release dated in the future
//! only wins once it is nearer than the most recent past one.

pub mod ants;
pub mod config;
pub mod generate;
pub mod output;
pub mod release;
pub mod rules;
pub mod template;
pub mod version;

#[cfg(test)]
pub(crate) mod test_helpers;
