//! Rendering item collections back into readable text.
//!
//! Three closed styles selected by a factory, each a pure function of the
//! collection and the color flag. With color disabled the output contains no
//! escape bytes at all, so piping and tests see plain text.

use std::fmt::Write as _;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::model::ItemCollection;

/// Supported display styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum FormatStyle {
    /// One line per item, numbered by global position.
    Flat,
    /// Indented tree with per-depth glyphs and section header rules.
    #[default]
    Hierarchy,
    /// Numbered top-level items with bulleted children.
    Mixed,
}

impl FormatStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatStyle::Flat => "flat",
            FormatStyle::Hierarchy => "hierarchy",
            FormatStyle::Mixed => "mixed",
        }
    }
}

impl FromStr for FormatStyle {
    type Err = StyleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(FormatStyle::Flat),
            "hierarchy" | "hier" | "tree" => Ok(FormatStyle::Hierarchy),
            "mixed" => Ok(FormatStyle::Mixed),
            other => Err(StyleParseError::UnknownStyle(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`FormatStyle`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StyleParseError {
    #[error("unknown display style '{0}'")]
    UnknownStyle(String),
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const MAGENTA: &str = "\x1b[35m";
const YELLOW: &str = "\x1b[33m";

/// Glyph and color per nesting level; depths past the palette reuse the last
/// entry.
const DEPTH_PALETTE: [(&str, &str); 5] = [
    ("•", CYAN),
    ("◦", BLUE),
    ("‣", GREEN),
    ("▪", MAGENTA),
    ("▫", YELLOW),
];

const INDENT: &str = "  ";

/// Renderer for one style/color combination.
///
/// `format` is idempotent: the same collection and settings always produce
/// byte-identical output.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    style: FormatStyle,
    use_color: bool,
}

impl Formatter {
    pub fn new(style: FormatStyle, use_color: bool) -> Self {
        Self { style, use_color }
    }

    pub fn style(&self) -> FormatStyle {
        self.style
    }

    pub fn format(&self, collection: &ItemCollection) -> String {
        match self.style {
            FormatStyle::Flat => self.format_flat(collection),
            FormatStyle::Hierarchy => self.format_hierarchy(collection),
            FormatStyle::Mixed => self.format_mixed(collection),
        }
    }

    fn paint(&self, text: &str, codes: &str) -> String {
        if self.use_color {
            format!("{codes}{text}{RESET}")
        } else {
            text.to_owned()
        }
    }

    fn format_flat(&self, collection: &ItemCollection) -> String {
        let mut lines = Vec::with_capacity(collection.len());
        let mut previous_section: Option<&str> = None;

        for (position, item) in collection.items().iter().enumerate() {
            let mut line = String::new();
            let section = item.section.as_deref();
            if section != previous_section
                && let Some(name) = section
            {
                let annotation = self.paint(&format!("[Section: {name}]"), BLUE);
                let _ = write!(line, "{annotation} ");
            }
            previous_section = section;

            let number = self.paint(&format!("{}.", position + 1), CYAN);
            let _ = write!(line, "{number} {}", item.content);
            lines.push(line);
        }

        lines.join("\n")
    }

    fn format_hierarchy(&self, collection: &ItemCollection) -> String {
        let mut lines = Vec::new();

        self.hierarchy_section(collection, None, &mut lines);
        for section in collection.sections() {
            lines.push(self.section_header(section));
            self.hierarchy_section(collection, Some(section), &mut lines);
        }

        lines.join("\n")
    }

    fn hierarchy_section(
        &self,
        collection: &ItemCollection,
        section: Option<&str>,
        lines: &mut Vec<String>,
    ) {
        for item in collection.in_section(section) {
            let (glyph, color) = DEPTH_PALETTE[item.depth.min(DEPTH_PALETTE.len() - 1)];
            let bullet = self.paint(glyph, color);
            lines.push(format!(
                "{}{bullet} {}",
                INDENT.repeat(item.depth),
                item.content
            ));
        }
    }

    fn format_mixed(&self, collection: &ItemCollection) -> String {
        let mut lines = Vec::new();

        self.mixed_section(collection, None, &mut lines);
        for section in collection.sections() {
            lines.push(self.section_header(section));
            self.mixed_section(collection, Some(section), &mut lines);
        }

        lines.join("\n")
    }

    fn mixed_section(
        &self,
        collection: &ItemCollection,
        section: Option<&str>,
        lines: &mut Vec<String>,
    ) {
        // Numbering restarts per section and counts only top-level items.
        let mut counter = 0usize;
        for item in collection.in_section(section) {
            if item.depth == 0 {
                counter += 1;
                let number = self.paint(&format!("{counter}."), GREEN);
                lines.push(format!("{number} {}", item.content));
            } else {
                let color = if item.depth % 2 == 1 { CYAN } else { BLUE };
                let bullet = self.paint("•", color);
                lines.push(format!(
                    "{}{bullet} {}",
                    INDENT.repeat(item.depth),
                    item.content
                ));
            }
        }
    }

    fn section_header(&self, name: &str) -> String {
        if self.use_color {
            format!("{BOLD}{BLUE}━━━ {name} ━━━{RESET}")
        } else {
            format!("━━━ {name} ━━━")
        }
    }
}

/// Pick a renderer for the requested style and color mode.
pub fn create_formatter(style: FormatStyle, use_color: bool) -> Formatter {
    Formatter::new(style, use_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::classify::{Classification, ExtractOptions, classify};
    use crate::app::extract::extract;
    use crate::domain::model::MarkerKind;

    const SAMPLE: &str = "\
# Tasks
1. Research
   a. Sub one
   b. Sub two
2. Build
# Notes
- remember the docs";

    #[test]
    fn flat_numbers_by_global_position_and_annotates_section_changes() {
        let collection = extract(SAMPLE, true);
        let rendered = Formatter::new(FormatStyle::Flat, false).format(&collection);
        assert_eq!(
            rendered,
            "[Section: Tasks] 1. Research\n\
             2. Sub one\n\
             3. Sub two\n\
             4. Build\n\
             [Section: Notes] 5. remember the docs"
        );
    }

    #[test]
    fn hierarchy_indents_by_depth_with_section_headers() {
        let collection = extract(SAMPLE, true);
        let rendered = Formatter::new(FormatStyle::Hierarchy, false).format(&collection);
        let expected = [
            "━━━ Tasks ━━━",
            "• Research",
            "  ◦ Sub one",
            "  ◦ Sub two",
            "• Build",
            "━━━ Notes ━━━",
            "• remember the docs",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn mixed_restarts_numbering_per_section() {
        let collection = extract(SAMPLE, true);
        let rendered = Formatter::new(FormatStyle::Mixed, false).format(&collection);
        let expected = [
            "━━━ Tasks ━━━",
            "1. Research",
            "  • Sub one",
            "  • Sub two",
            "2. Build",
            "━━━ Notes ━━━",
            "1. remember the docs",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn disabled_color_emits_no_escape_bytes() {
        let collection = extract(SAMPLE, true);
        for style in [FormatStyle::Flat, FormatStyle::Hierarchy, FormatStyle::Mixed] {
            let plain = Formatter::new(style, false).format(&collection);
            assert!(!plain.contains('\x1b'), "{style:?} leaked escapes");

            let colored = Formatter::new(style, true).format(&collection);
            assert!(colored.contains('\x1b'));
            assert!(colored.ends_with(RESET) || colored.contains(RESET));
        }
    }

    #[test]
    fn formatting_is_idempotent() {
        let collection = extract(SAMPLE, true);
        for style in [FormatStyle::Flat, FormatStyle::Hierarchy, FormatStyle::Mixed] {
            let formatter = Formatter::new(style, true);
            assert_eq!(formatter.format(&collection), formatter.format(&collection));
        }
    }

    #[test]
    fn flat_output_reclassifies_as_numbered() {
        // Round-trip property for a flat, unsectioned list.
        let collection = extract("1. Alpha item\n2. Beta item\n3. Gamma item", true);
        let rendered = Formatter::new(FormatStyle::Flat, false).format(&collection);
        for line in rendered.lines() {
            match classify(line, &ExtractOptions::default()) {
                Classification::Item(item) => assert_eq!(item.kind, MarkerKind::Numbered),
                other => panic!("expected numbered item, got {other:?}"),
            }
        }
    }

    #[test]
    fn style_parsing_accepts_aliases() {
        assert_eq!("tree".parse::<FormatStyle>().unwrap(), FormatStyle::Hierarchy);
        assert_eq!("FLAT".parse::<FormatStyle>().unwrap(), FormatStyle::Flat);
        assert!("fancy".parse::<FormatStyle>().is_err());
    }

    #[test]
    fn ungrouped_items_render_before_sections() {
        let collection = extract("- loose one\n# Later\n- grouped", true);
        let rendered = Formatter::new(FormatStyle::Hierarchy, false).format(&collection);
        assert_eq!(rendered, "• loose one\n━━━ Later ━━━\n• grouped");
    }
}
