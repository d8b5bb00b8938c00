//! Page and README generation.
//!
//! Both outputs are built from `ants.txt`. The page additionally needs the
//! release directory, the template, and a version number:
//!
//! ```text
//! ants.txt ──────────────┬──► display rules ──► ant list ──────┐
//!                        │                                     │
//! static_site/releases/ ─┼──► nearest release ──► changelist ──┼──► template ──► index.html
//!                        │                                     │
//! git rev-list --count ──┼─────────────────────► version ──────┘
//!                        │
//!                        └──► display rules ──► README.md
//! ```
//!
//! ## Output Files
//!
//! Outputs are written atomically: content goes to a temp file next to the
//! destination, which is renamed over it once fully written. A failed run
//! leaves the previous output (or nothing) in place, never a partial file.
//!
//! ## README Layout
//!
//! ```text
//! # types of ants
//!
//! > For real documentation, see the [docs](./docs)
//!
//! <div>
//!   <div>fire ant</div>
//!   ...
//! </div>
//! ```

use crate::ants::{self, AntsError};
use crate::config::{ConfigError, LayoutConfig, PathsConfig, SiteConfig};
use crate::release::{self, ReleaseError, ReleaseFile};
use crate::rules::RuleTable;
use crate::template::{self, Marker, PageContext};
use crate::version::{VersionError, VersionSource};
use chrono::NaiveDateTime;
use maud::{PreEscaped, html};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("Release error: {0}")]
    Release(#[from] ReleaseError),
    #[error("Version error: {0}")]
    Version(#[from] VersionError),
    #[error("Ant list error: {0}")]
    Ants(#[from] AntsError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Absolute locations of every input and output, resolved against the root.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub root: PathBuf,
    pub ants: PathBuf,
    pub releases: PathBuf,
    pub template: PathBuf,
    pub page: PathBuf,
    pub readme: PathBuf,
}

impl SitePaths {
    pub fn resolve(root: &Path, paths: &PathsConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            ants: root.join(&paths.ants),
            releases: root.join(&paths.releases),
            template: root.join(&paths.template),
            page: root.join(&paths.page),
            readme: root.join(&paths.readme),
        }
    }

    /// Check that the root and every page input exist.
    pub fn validate_page_inputs(&self) -> Result<(), GenerateError> {
        require_dir(&self.root)?;
        require_file(&self.ants)?;
        require_dir(&self.releases)?;
        require_file(&self.template)?;
        Ok(())
    }
}

pub fn require_file(path: &Path) -> Result<(), GenerateError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(GenerateError::PathNotFound(path.to_path_buf()))
    }
}

pub fn require_dir(path: &Path) -> Result<(), GenerateError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(GenerateError::PathNotFound(path.to_path_buf()))
    }
}

/// Everything gathered for a page render, before touching the output.
#[derive(Debug, Clone)]
pub struct PagePlan {
    pub context: PageContext,
    pub release: ReleaseFile,
    pub template: String,
}

/// Result of rendering the page, for reporting.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub ant_count: usize,
    pub release: ReleaseFile,
    pub release_date: String,
    pub changelist_count: usize,
    pub version: u64,
    pub markers: Vec<Marker>,
    /// Where the page was written; `None` for a dry run.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ReadmeReport {
    pub ant_count: usize,
    pub output: PathBuf,
}

/// Read every page input and resolve the release and version.
///
/// Fails before anything is written if any input is missing or malformed.
pub fn prepare_page(
    paths: &SitePaths,
    config: &SiteConfig,
    versions: &dyn VersionSource,
    now: NaiveDateTime,
) -> Result<PagePlan, GenerateError> {
    paths.validate_page_inputs()?;
    let rules = config.rule_table()?;

    let ant_list = ants::read_ant_list(&paths.ants)?;
    let shown = rules.apply_all(&ant_list);

    let release_files = release::discover_release_files(&paths.releases)?;
    let release =
        release::select_most_recent(&release_files, &config.dates.filename_format, now)?.clone();
    let changelist = rules.apply_all(&release.load_items()?);
    let release_date = release.pretty_format(&config.dates)?;

    let version = versions.version_number()?;
    let template = fs::read_to_string(&paths.template)?;

    tracing::info!(
        ants = shown.len(),
        release = %release.date_filename,
        changelist = changelist.len(),
        version,
        "prepared page"
    );

    Ok(PagePlan {
        context: PageContext {
            ants: shown,
            changelist,
            version,
            release_date,
        },
        release,
        template,
    })
}

fn report(plan: &PagePlan, markers: Vec<Marker>, output: Option<PathBuf>) -> PageReport {
    PageReport {
        ant_count: plan.context.ants.len(),
        release: plan.release.clone(),
        release_date: plan.context.release_date.clone(),
        changelist_count: plan.context.changelist.len(),
        version: plan.context.version,
        markers,
        output,
    }
}

/// Render the page and write it to `paths.page`.
pub fn generate_page(
    paths: &SitePaths,
    config: &SiteConfig,
    versions: &dyn VersionSource,
    now: NaiveDateTime,
) -> Result<PageReport, GenerateError> {
    let plan = prepare_page(paths, config, versions, now)?;
    let rendered = template::render(&plan.template, &plan.context, &config.layout);
    write_atomic(&paths.page, &rendered.document)?;
    tracing::info!(output = %paths.page.display(), "wrote page");
    Ok(report(&plan, rendered.markers, Some(paths.page.clone())))
}

/// Render the page without writing it.
pub fn check_page(
    paths: &SitePaths,
    config: &SiteConfig,
    versions: &dyn VersionSource,
    now: NaiveDateTime,
) -> Result<PageReport, GenerateError> {
    let plan = prepare_page(paths, config, versions, now)?;
    let rendered = template::render(&plan.template, &plan.context, &config.layout);
    Ok(report(&plan, rendered.markers, None))
}

/// README body for already-ruled display ants.
pub fn render_readme(shown: &[String], layout: &LayoutConfig) -> String {
    let mut readme = String::new();
    readme.push_str("# types of ants\n\n");
    readme.push_str("> For real documentation, see the [docs](./docs)\n\n");
    readme.push_str("<div>\n");
    for ant in shown {
        let block = html! { div { (PreEscaped(ant)) } };
        readme.push_str(&format!("{}{}\n", layout.indent(1), block.into_string()));
    }
    readme.push_str("</div>\n");
    readme
}

pub fn generate_readme(
    ants_path: &Path,
    readme_path: &Path,
    rules: &RuleTable,
    layout: &LayoutConfig,
) -> Result<ReadmeReport, GenerateError> {
    require_file(ants_path)?;
    let shown = rules.apply_all(&ants::read_ant_list(ants_path)?);
    write_atomic(readme_path, &render_readme(&shown, layout))?;
    tracing::info!(output = %readme_path.display(), ants = shown.len(), "wrote readme");
    Ok(ReadmeReport {
        ant_count: shown.len(),
        output: readme_path.to_path_buf(),
    })
}

/// Write `contents` to `path` via a temp file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    // Temp files are created owner-only; keep the destination readable.
    match fs::metadata(path) {
        Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
        Err(_) => set_default_permissions(tmp.as_file())?,
    }
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
