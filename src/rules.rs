//! Display rules for individual ants.
//!
//! Most ants render as their plain name. A handful get special treatment:
//! a link to a friend's site, a trademark glyph, a handle turned into a link.
//! These are expressed as an ordered table of [`AntRule`]s, each pairing a
//! [`Matcher`] with a [`Rendering`]. The first rule whose matcher accepts the
//! ant decides the output; ants matching no rule pass through unchanged.
//!
//! ## Append-Only
//!
//! The built-in table only ever grows. Rules from `config.toml` are appended
//! after the built-in ones, so a config can add renderings but never change
//! how an already-published ant looks.
//!
//! ```text
//! "6krill ant"  →  <a href="http://6krill.com">6krill ant</a>
//! "ant tm"      →  ant&trade;
//! "fire ant"    →  fire ant
//! ```

use maud::{PreEscaped, html};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Predicate deciding whether a rule applies to an ant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// The trimmed ant name equals the literal.
    Exact(String),
    /// The literal appears anywhere in the ant name.
    Contains(String),
}

impl Matcher {
    pub fn matches(&self, ant: &str) -> bool {
        match self {
            Matcher::Exact(literal) => ant == literal,
            Matcher::Contains(literal) => ant.contains(literal.as_str()),
        }
    }
}

/// How a matched ant is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    /// Wrap the whole ant name in a hyperlink. The name is already markup,
    /// only `href` is escaped.
    Link { href: String },
    /// Emit fixed markup instead of the ant name.
    Replace(String),
}

impl Rendering {
    fn render(&self, ant: &str) -> String {
        match self {
            Rendering::Link { href } => {
                html! { a href=(href) { (PreEscaped(ant)) } }.into_string()
            }
            Rendering::Replace(markup) => markup.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntRule {
    pub matcher: Matcher,
    pub rendering: Rendering,
}

impl AntRule {
    pub fn link(matcher: Matcher, href: &str) -> Self {
        Self {
            matcher,
            rendering: Rendering::Link {
                href: href.to_string(),
            },
        }
    }

    pub fn replace(matcher: Matcher, markup: &str) -> Self {
        Self {
            matcher,
            rendering: Rendering::Replace(markup.to_string()),
        }
    }
}

fn exact(literal: &str) -> Matcher {
    Matcher::Exact(literal.to_string())
}

fn contains(literal: &str) -> Matcher {
    Matcher::Contains(literal.to_string())
}

/// The historical rule set, in evaluation order. New rules go at the end.
fn builtin_rules() -> Vec<AntRule> {
    vec![
        AntRule::link(contains("6krill"), "http://6krill.com"),
        AntRule::replace(exact("ant tm"), "ant&trade;"),
        AntRule::replace(
            exact("ant on twitter! @typesofants"),
            r#"ant on twitter! <a href="https://twitter.com/typesofants">@typesofants</a>"#,
        ),
        AntRule::link(exact("mouco ant"), "https://www.mouco.com"),
        AntRule::link(
            exact("ant that would love to work at amazon but now they actually work at amazon :)"),
            "https://www.linkedin.com/in/kaspar-p",
        ),
    ]
}

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(RuleTable::builtin);

/// Ordered rule table. First match wins.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<AntRule>,
}

impl RuleTable {
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Built-in rules followed by `extra`, which can only add renderings for
    /// ants the built-in table leaves alone.
    pub fn with_extra(extra: impl IntoIterator<Item = AntRule>) -> Self {
        let mut table = Self::builtin();
        table.rules.extend(extra);
        table
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Render one ant. Total: unmatched ants come back unchanged.
    pub fn apply(&self, ant: &str) -> String {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(ant))
            .map(|rule| rule.rendering.render(ant))
            .unwrap_or_else(|| ant.to_string())
    }

    pub fn apply_all(&self, ants: &[String]) -> Vec<String> {
        ants.iter().map(|ant| self.apply(ant)).collect()
    }
}

/// Render one ant with the built-in rules only.
pub fn apply_rule(ant: &str) -> String {
    BUILTIN.apply(ant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_ant_passes_through() {
        assert_eq!(apply_rule("fire ant"), "fire ant");
        assert_eq!(apply_rule(""), "");
    }

    #[test]
    fn krill_substring_becomes_link() {
        assert_eq!(
            apply_rule("6krill ant"),
            r#"<a href="http://6krill.com">6krill ant</a>"#
        );
        assert_eq!(
            apply_rule("[6krill] ant"),
            r#"<a href="http://6krill.com">[6krill] ant</a>"#
        );
    }

    #[test]
    fn linked_ant_keeps_its_entities() {
        assert_eq!(
            apply_rule("6krill ant&trade;"),
            r#"<a href="http://6krill.com">6krill ant&trade;</a>"#
        );
    }

    #[test]
    fn link_href_is_escaped() {
        let table = RuleTable::with_extra([AntRule::link(
            exact("quote ant"),
            r#"https://x.test/?a="b"&c"#,
        )]);
        assert_eq!(
            table.apply("quote ant"),
            r#"<a href="https://x.test/?a=&quot;b&quot;&amp;c">quote ant</a>"#
        );
    }

    #[test]
    fn trademark_is_exact_match_only() {
        assert_eq!(apply_rule("ant tm"), "ant&trade;");
        assert_eq!(apply_rule("ant tm and more"), "ant tm and more");
    }

    #[test]
    fn twitter_handle_linked() {
        assert_eq!(
            apply_rule("ant on twitter! @typesofants"),
            r#"ant on twitter! <a href="https://twitter.com/typesofants">@typesofants</a>"#
        );
    }

    #[test]
    fn mouco_and_amazon_linked() {
        assert_eq!(
            apply_rule("mouco ant"),
            r#"<a href="https://www.mouco.com">mouco ant</a>"#
        );
        let amazon = "ant that would love to work at amazon but now they actually work at amazon :)";
        assert_eq!(
            apply_rule(amazon),
            format!(r#"<a href="https://www.linkedin.com/in/kaspar-p">{amazon}</a>"#)
        );
    }

    #[test]
    fn apply_is_deterministic() {
        for ant in ["6krill ant", "ant tm", "carpenter ant"] {
            assert_eq!(apply_rule(ant), apply_rule(ant));
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        // "mouco 6krill" would match a mouco contains-rule too, but 6krill comes first
        let table = RuleTable::with_extra([AntRule::replace(contains("mouco"), "MOUCO")]);
        assert_eq!(
            table.apply("mouco 6krill"),
            r#"<a href="http://6krill.com">mouco 6krill</a>"#
        );
        assert_eq!(table.apply("big mouco"), "MOUCO");
    }

    #[test]
    fn extra_rules_cannot_override_builtin() {
        let table = RuleTable::with_extra([AntRule::replace(exact("ant tm"), "nope")]);
        assert_eq!(table.apply("ant tm"), "ant&trade;");
        assert_eq!(table.len(), RuleTable::builtin().len() + 1);
    }

    #[test]
    fn apply_all_preserves_order() {
        let ants = vec!["ant a".to_string(), "6krill ant".to_string()];
        let shown = RuleTable::builtin().apply_all(&ants);
        assert_eq!(shown[0], "ant a");
        assert!(shown[1].contains(">6krill ant</a>"));
    }
}
