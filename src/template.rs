//! Marker substitution in the page template.
//!
//! The template is plain HTML. A few lines in it are markers: placeholders
//! that, once trimmed, exactly equal one of five known literals. Each marker
//! line is replaced by generated markup; every other line is copied through
//! untouched, line terminator included.
//!
//! ```text
//! <div id="ant-filler"></div>                       → the full ant list
//! <div id="scroll-container"></div>                 → banner of newly added ants
//! <h1>types of ants <span ...>v{amt}</span></h1>    → title with version number
//! <h2>ants discovered to date: {amount}</h2>        → ant count
//! <div>discovered {amt} new ants on {date}:</div>   → banner caption
//! ```
//!
//! There is no nesting and no partial-line substitution. A line that merely
//! contains a marker, or a marker with different spacing inside it, is not
//! a marker.
//!
//! Ants are inserted as pre-escaped markup since display rules produce HTML.
//! Wrappers and marker lines are rendered with maud.

use crate::config::LayoutConfig;
use maud::{Markup, PreEscaped, html};

/// The closed set of marker lines recognised in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    AntFiller,
    ScrollContainer,
    VersionTitle,
    AntCount,
    BannerCaption,
}

impl Marker {
    pub const ALL: [Marker; 5] = [
        Marker::AntFiller,
        Marker::ScrollContainer,
        Marker::VersionTitle,
        Marker::AntCount,
        Marker::BannerCaption,
    ];

    /// The exact (trimmed) template text of this marker.
    pub fn literal(self) -> &'static str {
        match self {
            Marker::AntFiller => r#"<div id="ant-filler"></div>"#,
            Marker::ScrollContainer => r#"<div id="scroll-container"></div>"#,
            Marker::VersionTitle => {
                r#"<h1>types of ants <span style="font-size: 12pt;">v{amt}</span></h1>"#
            }
            Marker::AntCount => "<h2>ants discovered to date: {amount}</h2>",
            Marker::BannerCaption => "<div>discovered {amt} new ants on {date}:</div>",
        }
    }

    /// Short name for reporting.
    pub fn name(self) -> &'static str {
        match self {
            Marker::AntFiller => "ant-filler",
            Marker::ScrollContainer => "scroll-container",
            Marker::VersionTitle => "version",
            Marker::AntCount => "ant-count",
            Marker::BannerCaption => "banner-caption",
        }
    }

    pub fn from_line(line: &str) -> Option<Marker> {
        let trimmed = line.trim();
        Self::ALL.into_iter().find(|m| m.literal() == trimmed)
    }
}

/// Everything substituted into the template.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Display form of every ant in the list, in list order.
    pub ants: Vec<String>,
    /// Display form of the ants in the selected release.
    pub changelist: Vec<String>,
    pub version: u64,
    /// Long-form date of the selected release, e.g. `February 03, 2024`.
    pub release_date: String,
}

/// A rendered document and the markers that were expanded, in order.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub document: String,
    pub markers: Vec<Marker>,
}

/// Expand every marker line in `template`.
pub fn render(template: &str, ctx: &PageContext, layout: &LayoutConfig) -> Rendered {
    let mut document = String::with_capacity(template.len());
    let mut markers = Vec::new();

    for line in template.split_inclusive('\n') {
        match Marker::from_line(line) {
            Some(marker) => {
                for generated in expand(marker, ctx, layout) {
                    document.push_str(&generated);
                    document.push('\n');
                }
                markers.push(marker);
            }
            None => document.push_str(line),
        }
    }

    tracing::debug!(
        markers = markers.len(),
        ants = ctx.ants.len(),
        changelist = ctx.changelist.len(),
        "rendered template"
    );
    Rendered { document, markers }
}

/// Generated lines for one marker, without terminators.
fn expand(marker: Marker, ctx: &PageContext, layout: &LayoutConfig) -> Vec<String> {
    let tab = |depth| layout.indent(depth);
    match marker {
        Marker::AntFiller => wrapped(
            format!(r#"{}<div id="ant-filler">"#, tab(2)),
            ctx.ants.iter().map(|ant| indented(&tab(3), ant_block(ant))),
            format!("{}</div>", tab(2)),
        ),
        Marker::ScrollContainer => wrapped(
            format!(r#"{}<div id="scroll-container">"#, tab(3)),
            ctx.changelist
                .iter()
                .map(|ant| indented(&tab(4), banner_block(ant))),
            format!("{}</div>", tab(3)),
        ),
        Marker::VersionTitle => vec![indented(
            &tab(2),
            html! { h1 { "types of ants " span style="font-size: 12pt;" { "v" (ctx.version) } } },
        )],
        Marker::AntCount => vec![indented(
            &tab(2),
            html! { h2 { "ants discovered to date: " (ctx.ants.len()) } },
        )],
        Marker::BannerCaption => vec![indented(
            &tab(3),
            html! { div { "discovered " (ctx.changelist.len()) " new ants on " (ctx.release_date) ":" } },
        )],
    }
}

fn ant_block(ant: &str) -> Markup {
    html! { div { (PreEscaped(ant)) } }
}

fn banner_block(ant: &str) -> Markup {
    html! { div.banner-ant { (PreEscaped(ant)) } }
}

fn indented(indent: &str, markup: Markup) -> String {
    format!("{indent}{}", markup.into_string())
}

fn wrapped(open: String, blocks: impl Iterator<Item = String>, close: String) -> Vec<String> {
    let mut lines = vec![open];
    lines.extend(blocks);
    lines.push(close);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::apply_rule;

    fn ctx() -> PageContext {
        PageContext {
            ants: vec!["ant a".to_string(), apply_rule("6krill ant")],
            changelist: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            version: 412,
            release_date: "February 03, 2024".to_string(),
        }
    }

    fn layout() -> LayoutConfig {
        LayoutConfig::default()
    }

    #[test]
    fn template_without_markers_is_verbatim() {
        let template = "<html>\n  <body>\n\t<p>hi</p>\n  </body>\n</html>";
        let rendered = render(template, &ctx(), &layout());
        assert_eq!(rendered.document, template);
        assert!(rendered.markers.is_empty());
    }

    #[test]
    fn crlf_lines_pass_through_untouched() {
        let template = "<p>one</p>\r\n<p>two</p>\r\n";
        assert_eq!(render(template, &ctx(), &layout()).document, template);
    }

    #[test]
    fn marker_lookup_roundtrips() {
        for marker in Marker::ALL {
            assert_eq!(Marker::from_line(marker.literal()), Some(marker));
            assert_eq!(Marker::from_line(&format!("    {}  \n", marker.literal())), Some(marker));
        }
    }

    #[test]
    fn near_miss_is_not_a_marker() {
        assert_eq!(Marker::from_line(r#"<div id="ant-filler"> </div>"#), None);
        assert_eq!(Marker::from_line(r#"<p><div id="ant-filler"></div></p>"#), None);
        assert_eq!(Marker::from_line(""), None);
    }

    #[test]
    fn ant_filler_expands_in_order() {
        let rendered = render("    <div id=\"ant-filler\"></div>\n", &ctx(), &layout());
        assert_eq!(
            rendered.document,
            concat!(
                "    <div id=\"ant-filler\">\n",
                "      <div>ant a</div>\n",
                "      <div><a href=\"http://6krill.com\">6krill ant</a></div>\n",
                "    </div>\n",
            )
        );
        assert_eq!(rendered.markers, vec![Marker::AntFiller]);
    }

    #[test]
    fn scroll_container_expands_changelist() {
        let rendered = render("<div id=\"scroll-container\"></div>\n", &ctx(), &layout());
        assert_eq!(
            rendered.document,
            concat!(
                "      <div id=\"scroll-container\">\n",
                "        <div class=\"banner-ant\">x</div>\n",
                "        <div class=\"banner-ant\">y</div>\n",
                "        <div class=\"banner-ant\">z</div>\n",
                "      </div>\n",
            )
        );
    }

    #[test]
    fn version_title_embeds_number() {
        let rendered = render(Marker::VersionTitle.literal(), &ctx(), &layout());
        assert_eq!(
            rendered.document,
            "    <h1>types of ants <span style=\"font-size: 12pt;\">v412</span></h1>\n"
        );
    }

    #[test]
    fn ant_count_embeds_list_length() {
        let rendered = render(Marker::AntCount.literal(), &ctx(), &layout());
        assert_eq!(rendered.document, "    <h2>ants discovered to date: 2</h2>\n");
    }

    #[test]
    fn banner_caption_embeds_count_and_date() {
        let rendered = render(Marker::BannerCaption.literal(), &ctx(), &layout());
        assert_eq!(
            rendered.document,
            "      <div>discovered 3 new ants on February 03, 2024:</div>\n"
        );
    }

    #[test]
    fn empty_lists_still_emit_wrappers() {
        let rendered = render(
            "<div id=\"ant-filler\"></div>\n",
            &PageContext::default(),
            &layout(),
        );
        assert_eq!(rendered.document, "    <div id=\"ant-filler\">\n    </div>\n");
    }

    #[test]
    fn tab_width_controls_indentation() {
        let wide = LayoutConfig { tab_width: 4 };
        let rendered = render(Marker::AntCount.literal(), &ctx(), &wide);
        assert_eq!(rendered.document, "        <h2>ants discovered to date: 2</h2>\n");
    }

    #[test]
    fn full_template_mixes_markers_and_passthrough() {
        let template = concat!(
            "<body>\n",
            "  <h1>types of ants <span style=\"font-size: 12pt;\">v{amt}</span></h1>\n",
            "  <h2>ants discovered to date: {amount}</h2>\n",
            "  <div id=\"ant-filler\"></div>\n",
            "</body>\n",
        );
        let rendered = render(template, &ctx(), &layout());
        assert!(rendered.document.starts_with("<body>\n    <h1>"));
        assert!(rendered.document.ends_with("    </div>\n</body>\n"));
        assert_eq!(
            rendered.markers,
            vec![Marker::VersionTitle, Marker::AntCount, Marker::AntFiller]
        );
    }
}
