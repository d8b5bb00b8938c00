//! Dated release files: discovery, selection, and loading.
//!
//! Every release is a JSON file in the releases directory named after the
//! day it was published:
//!
//! ```text
//! static_site/releases/
//! ├── 2024-01-20.json
//! ├── 2024-02-03.json      {"Ants": ["x", "y", "z"]}
//! └── 2024-02-04.json
//! ```
//!
//! The banner on the page shows the ants from the release whose date is
//! nearest to the current moment. Selection measures distance, not order:
//! the nearest date wins even if a later one exists further away. Ties go to
//! the file seen first.
//!
//! A file whose name does not parse under the configured date format is an
//! error, never skipped. Skipping it could silently show the wrong changelist.
//!
//! `ants-site add` publishes releases with [`write_release`]. The body also
//! carries the day it was cut, which readers ignore:
//!
//! ```json
//! {"Date": {"Year": 2024, "Month": "Feb", "Day": 4}, "Ants": ["sugar ant"]}
//! ```

use crate::config::DatesConfig;
use crate::generate::write_atomic;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Release file name {name:?} does not match date format {format:?}")]
    ParseError { name: String, format: String },
    #[error("No release files found")]
    NotFound,
    #[error("Malformed release {}: {reason}", .path.display())]
    MalformedRelease { path: PathBuf, reason: String },
}

/// Body of a release file. Fields other than `Ants` are ignored.
#[derive(Debug, Deserialize)]
struct Release {
    #[serde(rename = "Ants")]
    ants: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ReleaseDate {
    year: i32,
    month: String,
    day: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NewRelease<'a> {
    date: ReleaseDate,
    ants: &'a [String],
}

/// A release file on disk, identified by the date in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFile {
    /// File name up to the first `.`, e.g. `2024-02-03`.
    pub date_filename: String,
    pub path: PathBuf,
}

impl ReleaseFile {
    pub fn new(date_filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            date_filename: date_filename.into(),
            path: path.into(),
        }
    }

    /// Build from a path, taking the file name up to its first `.` as the date.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let date_filename = name.split('.').next().unwrap_or_default().to_string();
        Self::new(date_filename, path)
    }

    /// Parse the filename date under `format`.
    pub fn date(&self, format: &str) -> Result<NaiveDate, ReleaseError> {
        NaiveDate::parse_from_str(&self.date_filename, format).map_err(|_| {
            ReleaseError::ParseError {
                name: self.date_filename.clone(),
                format: format.to_string(),
            }
        })
    }

    /// Reformat the filename date for display.
    ///
    /// `2024-02-03` → `February 03, 2024` with the default formats.
    pub fn pretty_format(&self, dates: &DatesConfig) -> Result<String, ReleaseError> {
        let date = self.date(&dates.filename_format)?;
        let mut pretty = String::new();
        write!(pretty, "{}", date.format(&dates.display_format)).map_err(|_| {
            ReleaseError::ParseError {
                name: self.date_filename.clone(),
                format: dates.display_format.clone(),
            }
        })?;
        Ok(pretty)
    }

    /// Load the ants listed in this release, in file order, each trimmed.
    pub fn load_items(&self) -> Result<Vec<String>, ReleaseError> {
        let content = fs::read_to_string(&self.path)?;
        parse_release(&content).map_err(|e| ReleaseError::MalformedRelease {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_release(content: &str) -> Result<Vec<String>, serde_json::Error> {
    let release: Release = serde_json::from_str(content)?;
    Ok(release
        .ants
        .iter()
        .map(|ant| ant.trim().to_string())
        .collect())
}

/// Publish `ants` as the release for `date` in `dir`.
///
/// The file is named `date` under the filename format plus `.json`. A release
/// already cut that day keeps its ants and gets the new ones appended.
pub fn write_release(
    dir: &Path,
    date: NaiveDate,
    ants: &[String],
    dates: &DatesConfig,
) -> Result<ReleaseFile, ReleaseError> {
    let date_filename = date.format(&dates.filename_format).to_string();
    let file = ReleaseFile::new(date_filename.as_str(), dir.join(format!("{date_filename}.json")));

    let mut all = if file.path.is_file() {
        file.load_items()?
    } else {
        Vec::new()
    };
    all.extend(ants.iter().cloned());

    let body = NewRelease {
        date: ReleaseDate {
            year: date.year(),
            month: date.format("%b").to_string(),
            day: date.day(),
        },
        ants: &all,
    };
    let mut content = serde_json::to_string_pretty(&body).map_err(|e| {
        ReleaseError::MalformedRelease {
            path: file.path.clone(),
            reason: e.to_string(),
        }
    })?;
    content.push('\n');
    write_atomic(&file.path, &content)?;

    tracing::info!(release = %file.date_filename, ants = all.len(), "wrote release");
    Ok(file)
}

/// List the release files in `dir`, sorted by file name.
///
/// Subdirectories and hidden files are not release candidates.
pub fn discover_release_files(dir: &Path) -> Result<Vec<ReleaseFile>, ReleaseError> {
    let entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    let mut paths: Vec<PathBuf> = entries
        .iter()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    tracing::debug!(dir = %dir.display(), count = paths.len(), "discovered release files");
    Ok(paths.iter().map(|p| ReleaseFile::from_path(p)).collect())
}

/// Pick the release whose date is nearest to `now`.
///
/// Every file name must parse under `format`; the first that doesn't fails
/// the whole selection. Equal distances keep the earlier file.
pub fn select_most_recent<'a>(
    files: &'a [ReleaseFile],
    format: &str,
    now: NaiveDateTime,
) -> Result<&'a ReleaseFile, ReleaseError> {
    let mut nearest: Option<(&ReleaseFile, i64)> = None;

    for file in files {
        let released = file.date(format)?.and_time(NaiveTime::MIN);
        let distance = (now - released).num_seconds().abs();

        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((file, distance)),
        }
    }

    let (file, distance) = nearest.ok_or(ReleaseError::NotFound)?;
    tracing::debug!(release = %file.date_filename, distance_secs = distance, "selected release");
    Ok(file)
}
