//! Site configuration module.
//!
//! Handles loading, validating, and merging the repository's `config.toml`.
//! Stock defaults are the base layer; a `config.toml` in the repository root
//! overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! ants = "ants.txt"
//! releases = "static_site/releases"
//! template = "static_site/generate/index_template.html"
//! page = "index.html"
//! readme = "README.md"
//!
//! [layout]
//! tab_width = 2             # Spaces per indentation level in generated markup
//!
//! [dates]
//! filename_format = "%Y-%m-%d"   # Date embedded in release file names
//! display_format = "%B %d, %Y"   # Date shown in the banner caption
//!
//! [[rules]]                 # Extra display rules, evaluated after the built-in ones
//! match = { contains = "queen" }
//! link = "https://example.com/queens"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::rules::{AntRule, Matcher, RuleTable};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Input and output locations, relative to the repository root.
    pub paths: PathsConfig,
    /// Indentation of generated markup.
    pub layout: LayoutConfig,
    /// Release filename and display date formats.
    pub dates: DatesConfig,
    /// Extra display rules appended after the built-in table.
    pub rules: Vec<RuleConfig>,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=8).contains(&self.layout.tab_width) {
            return Err(ConfigError::Validation(
                "layout.tab_width must be 1-8".into(),
            ));
        }
        check_date_format("dates.filename_format", &self.dates.filename_format)?;
        check_date_format("dates.display_format", &self.dates.display_format)?;
        for (i, rule) in self.rules.iter().enumerate() {
            rule.to_rule().map_err(|msg| {
                ConfigError::Validation(format!("rules[{i}]: {msg}"))
            })?;
        }
        Ok(())
    }

    /// The built-in rule table extended with this config's `[[rules]]`.
    pub fn rule_table(&self) -> Result<RuleTable, ConfigError> {
        let extra = self
            .rules
            .iter()
            .map(|rule| rule.to_rule().map_err(ConfigError::Validation))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleTable::with_extra(extra))
    }
}

fn check_date_format(key: &str, format: &str) -> Result<(), ConfigError> {
    if format.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Validation(format!(
            "{key} is not a valid strftime format: {format:?}"
        )));
    }
    Ok(())
}

/// Input and output paths, relative to the repository root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Plain-text ant list, one ant per line.
    pub ants: String,
    /// Directory of dated release files (`YYYY-MM-DD.json`).
    pub releases: String,
    /// HTML template containing marker lines.
    pub template: String,
    /// Generated page.
    pub page: String,
    /// Generated README.
    pub readme: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ants: "ants.txt".to_string(),
            releases: "static_site/releases".to_string(),
            template: "static_site/generate/index_template.html".to_string(),
            page: "index.html".to_string(),
            readme: "README.md".to_string(),
        }
    }
}

/// Indentation of generated markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Spaces per indentation level.
    pub tab_width: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { tab_width: 2 }
    }
}

impl LayoutConfig {
    /// Indentation for `depth` levels.
    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(self.tab_width * depth)
    }
}

/// Date formats, in chrono `strftime` syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatesConfig {
    /// Format of the date embedded in each release file name.
    pub filename_format: String,
    /// Long human-readable format used in the banner caption.
    pub display_format: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            filename_format: "%Y-%m-%d".to_string(),
            display_format: "%B %d, %Y".to_string(),
        }
    }
}

/// One extra display rule. Exactly one of `link` or `replace` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(rename = "match")]
    pub matcher: Matcher,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
}

impl RuleConfig {
    fn to_rule(&self) -> Result<AntRule, String> {
        match (&self.link, &self.replace) {
            (Some(href), None) => Ok(AntRule::link(self.matcher.clone(), href)),
            (None, Some(markup)) => Ok(AntRule::replace(self.matcher.clone(), markup)),
            (Some(_), Some(_)) => Err("set either `link` or `replace`, not both".into()),
            (None, None) => Err("one of `link` or `replace` is required".into()),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// [`SiteConfig::default`] as a TOML table, the layer every `config.toml`
/// is laid over.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Lay `overlay` over `base`.
///
/// Sections such as `[paths]` merge per key, so a repository that only moves
/// its template keeps the stock `ants`, `releases` and output paths. Anything
/// that is not a table is taken whole from `overlay`: a repository's
/// `[[rules]]` array stands in for the stock one, which is empty because the
/// built-in rules live in code.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let value = match merged.remove(&key) {
                    Some(stock) => merge_toml(stock, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Parse `<root>/config.toml` without interpreting it.
///
/// A repository with no `config.toml` runs on stock settings, so a missing
/// file is `Ok(None)`. A file that is not TOML is an error.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = root.join("config.toml");
    if !path.is_file() {
        return Ok(None);
    }
    let raw: toml::Value = toml::from_str(&fs::read_to_string(&path)?)?;
    Ok(Some(raw))
}

/// Build a checked [`SiteConfig`] from the stock table and an optional
/// repository table.
///
/// Unknown keys, a tab width outside 1..=8, bad date formats and rules
/// without exactly one rendering all fail here.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(repo) => merge_toml(base, repo),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// The settings for the repository at `root`.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config = resolve_config(stock_defaults_value()?, load_raw_config(root)?)?;
    tracing::debug!(root = %root.display(), rules = config.rules.len(), "loaded config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ants-site configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the repository root as config.toml.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths (relative to the repository root)
# ---------------------------------------------------------------------------
[paths]
# Plain-text ant list, one ant per line.
ants = "ants.txt"

# Directory of dated release files, each named <date>.json.
releases = "static_site/releases"

# HTML template containing marker lines.
template = "static_site/generate/index_template.html"

# Generated outputs.
page = "index.html"
readme = "README.md"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Spaces per indentation level in generated markup (1-8).
tab_width = 2

# ---------------------------------------------------------------------------
# Dates (chrono strftime syntax)
# ---------------------------------------------------------------------------
[dates]
# Date embedded in release file names, e.g. 2024-02-03.json.
filename_format = "%Y-%m-%d"

# Date shown in the banner caption, e.g. "February 03, 2024".
display_format = "%B %d, %Y"

# ---------------------------------------------------------------------------
# Extra display rules
# ---------------------------------------------------------------------------
# Evaluated after the built-in rules; the first matching rule wins.
# `match` is either { exact = "..." } or { contains = "..." }.
# Each rule sets exactly one of `link` (wrap the ant in a hyperlink)
# or `replace` (emit this markup instead of the ant).
#
# [[rules]]
# match = { contains = "queen" }
# link = "https://example.com/queens"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_paths() {
        let config = SiteConfig::default();
        assert_eq!(config.paths.ants, "ants.txt");
        assert_eq!(config.paths.releases, "static_site/releases");
        assert_eq!(config.paths.page, "index.html");
    }

    #[test]
    fn default_config_layout_and_dates() {
        let config = SiteConfig::default();
        assert_eq!(config.layout.tab_width, 2);
        assert_eq!(config.layout.indent(3), "      ");
        assert_eq!(config.dates.filename_format, "%Y-%m-%d");
        assert_eq!(config.dates.display_format, "%B %d, %Y");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[layout]
tab_width = 4
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.layout.tab_width, 4);
        // Default values preserved
        assert_eq!(config.paths.template, "static_site/generate/index_template.html");
        assert_eq!(config.dates.filename_format, "%Y-%m-%d");
    }

    #[test]
    fn parse_extra_rules() {
        let toml = r#"
[[rules]]
match = { contains = "queen" }
link = "https://example.com/queens"

[[rules]]
match = { exact = "ant (c)" }
replace = "ant&copy;"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].matcher, Matcher::Contains("queen".into()));
        config.validate().unwrap();

        let table = config.rule_table().unwrap();
        assert_eq!(
            table.apply("queen ant"),
            r#"<a href="https://example.com/queens">queen ant</a>"#
        );
        assert_eq!(table.apply("ant (c)"), "ant&copy;");
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[layout]\ntabs = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_tab_width_out_of_range() {
        let mut config = SiteConfig::default();
        config.layout.tab_width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.layout.tab_width = 9;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_bad_date_format() {
        let mut config = SiteConfig::default();
        config.dates.display_format = "%Q nonsense".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = SiteConfig::default();
        config.dates.filename_format = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_rule_without_rendering() {
        let toml = r#"
[[rules]]
match = { exact = "lonely ant" }
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rules[0]"));
    }

    #[test]
    fn validate_rejects_rule_with_both_renderings() {
        let toml = r#"
[[rules]]
match = { exact = "greedy ant" }
link = "https://example.com"
replace = "greedy"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml / load_config tests
    // =========================================================================

    #[test]
    fn merge_overlay_wins_and_base_preserved() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.paths.ants, "ants.txt");
        assert_eq!(config.layout.tab_width, 2);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[paths]
ants = "data/ants.txt"

[dates]
display_format = "%d %B %Y"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.paths.ants, "data/ants.txt");
        assert_eq!(config.dates.display_format, "%d %B %Y");
        // Unspecified values should be defaults
        assert_eq!(config.paths.readme, "README.md");
        assert_eq!(config.dates.filename_format, "%Y-%m-%d");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_runs_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[layout]\ntab_width = 42\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.layout.tab_width, 2);
        assert_eq!(config.paths.template, "static_site/generate/index_template.html");
        assert!(config.rules.is_empty());
    }
}
