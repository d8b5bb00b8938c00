//! The ant list: `ants.txt`, one ant per line.
//!
//! Order in the file is the order on the page. Reading trims surrounding
//! whitespace from every line; blank lines in the middle of the file are kept
//! as (empty) ants so the count on the page matches the line count.
//!
//! New ants are not appended. They are dropped into the existing list at
//! random positions, so fresh discoveries are scattered through the page
//! instead of piling up at the bottom. The same ants, shuffled, are published
//! as the day's release so the banner can announce them.

use crate::config::DatesConfig;
use crate::generate::write_atomic;
use crate::release::{self, ReleaseError, ReleaseFile};
use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AntsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Ant list has no ants to insert among: {0}")]
    Empty(PathBuf),
    #[error("Release error: {0}")]
    Release(#[from] ReleaseError),
}

/// Outcome of [`add_ants`].
#[derive(Debug, Clone)]
pub struct Added {
    /// Where the list was written.
    pub list: PathBuf,
    /// The full list as written.
    pub ants: Vec<String>,
    /// The release the new ants were published in.
    pub release: ReleaseFile,
}

/// Split ant list content into trimmed ants.
pub fn parse_ant_list(content: &str) -> Vec<String> {
    content.lines().map(|l| l.trim().to_string()).collect()
}

pub fn read_ant_list(path: &Path) -> Result<Vec<String>, AntsError> {
    let content = fs::read_to_string(path)?;
    let ants = parse_ant_list(&content);
    tracing::debug!(path = %path.display(), count = ants.len(), "read ant list");
    Ok(ants)
}

/// Write the list back, one ant per line with a trailing newline.
pub fn write_ant_list(path: &Path, ants: &[String]) -> Result<(), AntsError> {
    let mut content = ants.join("\n");
    content.push('\n');
    write_atomic(path, &content)?;
    Ok(())
}

/// Insert each new ant at a random index in `[0, len)` of the growing list.
///
/// The index range excludes `len`, so a new ant never lands after the last
/// existing one. Returns the index each ant was inserted at.
///
/// `ants` must not be empty; [`add_ants`] checks this first.
pub(crate) fn insert_at_random<R: Rng + ?Sized>(
    ants: &mut Vec<String>,
    new_ants: &[String],
    rng: &mut R,
) -> Vec<usize> {
    let mut positions = Vec::with_capacity(new_ants.len());
    for ant in new_ants {
        let index = rng.random_range(0..ants.len());
        ants.insert(index, ant.clone());
        positions.push(index);
    }
    positions
}

/// Scatter `new_ants` through the list at `ants_path` and publish them as the
/// release for `today` in `releases_dir`.
///
/// The release is written first, then the list. Nothing is written if the
/// list is empty.
pub fn add_ants<R: Rng + ?Sized>(
    ants_path: &Path,
    releases_dir: &Path,
    dates: &DatesConfig,
    new_ants: &[String],
    today: NaiveDate,
    rng: &mut R,
) -> Result<Added, AntsError> {
    let new_ants: Vec<String> = new_ants.iter().map(|a| a.trim().to_string()).collect();
    let mut ants = read_ant_list(ants_path)?;
    if ants.is_empty() {
        return Err(AntsError::Empty(ants_path.to_path_buf()));
    }
    insert_at_random(&mut ants, &new_ants, rng);

    let mut shuffled = new_ants.clone();
    shuffled.shuffle(rng);
    let release = release::write_release(releases_dir, today, &shuffled, dates)?;

    write_ant_list(ants_path, &ants)?;
    tracing::info!(
        path = %ants_path.display(),
        added = new_ants.len(),
        total = ants.len(),
        release = %release.date_filename,
        "added ants"
    );
    Ok(Added {
        list: ants_path.to_path_buf(),
        ants,
        release,
    })
}
