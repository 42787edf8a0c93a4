//! Single-line classification of response text.
//!
//! The classifier is deterministic and context-free: it looks at exactly one
//! line and reports what it found. Rules are ordered, first match wins:
//! header, numbered, lettered, roman, bulleted, key-value, plain paragraph.
//! Anything longer than the paragraph threshold is narrative and produces no
//! item.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::MarkerKind;

/// Thresholds and indentation settings fixed for one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Whitespace columns per nesting level.
    pub indent_step: usize,
    /// Columns a tab expands to before depth is measured.
    pub tab_width: usize,
    /// Shortest trimmed line accepted as a plain paragraph item.
    pub min_paragraph_len: usize,
    /// Longest trimmed line accepted as a plain paragraph item; longer lines
    /// are narrative and excluded from the selectable stream.
    pub max_paragraph_len: usize,
    /// Longest key accepted for a key-value item.
    pub max_key_len: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            indent_step: 2,
            tab_width: 4,
            min_paragraph_len: 10,
            max_paragraph_len: 200,
            max_key_len: 40,
        }
    }
}

/// A Markdown `#` header outranks every heuristic header; heuristic headers
/// (ALL-CAPS or bare `Key:` lines) all share this rank.
pub const FALLBACK_HEADER_RANK: u8 = 7;

/// What one line of input turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Whitespace-only line.
    Blank,
    /// Section header with its rank (number of `#`, or
    /// [`FALLBACK_HEADER_RANK`] for heuristic headers).
    Header { rank: u8, title: String },
    /// A selectable item candidate.
    Item(ClassifiedLine),
    /// Prose too long to be a selectable option; contributes no item and does
    /// not disturb hierarchy state.
    Narrative,
}

/// Marker, depth, and residual content of a classified item line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub kind: MarkerKind,
    pub depth: usize,
    pub content: String,
    /// Set for single-letter markers that also parse as roman numerals
    /// (`i.`, `v)`, ...). The hierarchy builder promotes these to
    /// [`MarkerKind::Roman`] when they continue an established roman run.
    pub roman_candidate: bool,
}

static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#{1,6})\s+(\S.*)$").unwrap());
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(?:\d+[-.):]|\(\d+\))\s+(\S.*)$").unwrap());
static LETTERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([A-Za-z])[-.):]\s+(\S.*)$").unwrap());
static ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([ivxlcdmIVXLCDM]{2,})[-.):]\s+(\S.*)$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)([•*+-])\s+(\S.*)$").unwrap());
static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([^:\s][^:]*?):\s+(\S.*)$").unwrap());
static ROMAN_VALID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^m{0,3}(cm|cd|d?c{0,3})(xc|xl|l?x{0,3})(ix|iv|v?i{0,3})$").unwrap());

/// Decide what a single line is. Depends only on the line itself plus the
/// pass-wide options.
pub fn classify(line: &str, opts: &ExtractOptions) -> Classification {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Classification::Blank;
    }

    if let Some(caps) = HEADER.captures(line) {
        return Classification::Header {
            rank: caps[1].len() as u8,
            title: caps[2].trim().to_owned(),
        };
    }
    if let Some(header) = bare_key_header(line, trimmed) {
        return header;
    }

    let depth = depth_of(line, opts);

    if let Some(caps) = NUMBERED.captures(line) {
        return item(MarkerKind::Numbered, depth, &caps[2]);
    }
    if let Some(caps) = LETTERED.captures(line) {
        let marker = &caps[2];
        let mut classified = match item(MarkerKind::Lettered, depth, &caps[3]) {
            Classification::Item(classified) => classified,
            other => return other,
        };
        classified.roman_candidate = is_roman_numeral(marker);
        return Classification::Item(classified);
    }
    if let Some(caps) = ROMAN.captures(line)
        && is_roman_numeral(&caps[2])
    {
        return item(MarkerKind::Roman, depth, &caps[3]);
    }
    if let Some(caps) = BULLET.captures(line) {
        return item(MarkerKind::Bullet, depth, &caps[3]);
    }
    // Checked only after the marker patterns so "A. THING DONE" stays a
    // lettered item rather than becoming a header.
    if let Some(header) = caps_header(line, trimmed) {
        return header;
    }
    if let Some(caps) = KEY_VALUE.captures(line) {
        let key = caps[2].trim();
        if key.len() <= opts.max_key_len {
            return item(MarkerKind::KeyValue, depth, &format!("{key}: {}", &caps[3]));
        }
    }

    let len = trimmed.chars().count();
    if len >= opts.min_paragraph_len && len <= opts.max_paragraph_len {
        return item(MarkerKind::Paragraph, depth, trimmed);
    }

    Classification::Narrative
}

/// Validate a token against the strict roman-numeral grammar,
/// case-insensitively.
pub fn is_roman_numeral(token: &str) -> bool {
    !token.is_empty() && ROMAN_VALID.is_match(&token.to_ascii_lowercase())
}

/// Nesting depth from leading whitespace, tabs expanded first.
pub fn depth_of(line: &str, opts: &ExtractOptions) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += opts.tab_width,
            _ => break,
        }
    }
    width / opts.indent_step.max(1)
}

fn item(kind: MarkerKind, depth: usize, content: &str) -> Classification {
    Classification::Item(ClassifiedLine {
        kind,
        depth,
        content: content.trim().to_owned(),
        roman_candidate: false,
    })
}

/// Bare `Key:` lines (nothing after the colon) act as section headers without
/// any lookahead, ranked below real `#` headers. Only short label-like keys
/// qualify; a full sentence ending in a colon stays a paragraph.
fn bare_key_header(line: &str, trimmed: &str) -> Option<Classification> {
    const MAX_KEY_WORDS: usize = 3;

    if line.starts_with([' ', '\t']) {
        return None;
    }

    if let Some(key) = trimmed.strip_suffix(':')
        && !key.is_empty()
        && !key.contains(':')
        && key.chars().next().is_some_and(char::is_alphabetic)
        && key.split_whitespace().count() <= MAX_KEY_WORDS
        && key.chars().count() <= 40
    {
        return Some(Classification::Header {
            rank: FALLBACK_HEADER_RANK,
            title: key.trim().to_owned(),
        });
    }

    None
}

/// ALL-CAPS short standalone lines are treated as section headers, again at
/// the fallback rank.
fn caps_header(line: &str, trimmed: &str) -> Option<Classification> {
    if line.starts_with([' ', '\t']) {
        return None;
    }

    let len = trimmed.chars().count();
    let has_alpha = trimmed.chars().any(char::is_alphabetic);
    let all_caps = trimmed
        .chars()
        .filter(|ch| ch.is_alphabetic())
        .all(char::is_uppercase);
    if (3..=60).contains(&len)
        && has_alpha
        && all_caps
        && trimmed.chars().next().is_some_and(char::is_uppercase)
        && !trimmed.contains(':')
        && !trimmed.ends_with('.')
    {
        return Some(Classification::Header {
            rank: FALLBACK_HEADER_RANK,
            title: trimmed.to_owned(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_default(line: &str) -> Classification {
        classify(line, &ExtractOptions::default())
    }

    fn expect_item(line: &str) -> ClassifiedLine {
        match classify_default(line) {
            Classification::Item(item) => item,
            other => panic!("expected item for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines() {
        assert_eq!(classify_default(""), Classification::Blank);
        assert_eq!(classify_default("   \t "), Classification::Blank);
    }

    #[test]
    fn markdown_headers_carry_rank() {
        assert_eq!(
            classify_default("# Tasks"),
            Classification::Header {
                rank: 1,
                title: "Tasks".into()
            }
        );
        assert_eq!(
            classify_default("### Later "),
            Classification::Header {
                rank: 3,
                title: "Later".into()
            }
        );
    }

    #[test]
    fn caps_and_bare_key_headers_use_fallback_rank() {
        assert_eq!(
            classify_default("NEXT STEPS"),
            Classification::Header {
                rank: FALLBACK_HEADER_RANK,
                title: "NEXT STEPS".into()
            }
        );
        assert_eq!(
            classify_default("Options:"),
            Classification::Header {
                rank: FALLBACK_HEADER_RANK,
                title: "Options".into()
            }
        );
        // Indented caps are not headers.
        let item = expect_item("  SHORT CAPS LINE HERE");
        assert_eq!(item.kind, MarkerKind::Paragraph);

        // Marker patterns win over the caps heuristic.
        let lettered = expect_item("A. THING DONE");
        assert_eq!(lettered.kind, MarkerKind::Lettered);

        // A sentence ending in a colon is a paragraph, not a header.
        let sentence = expect_item("Here is what I would suggest doing next:");
        assert_eq!(sentence.kind, MarkerKind::Paragraph);
    }

    #[test]
    fn numbered_marker_variants() {
        for line in [
            "1. Alpha beta",
            "2) Alpha beta",
            "10: Alpha beta",
            "3- Alpha beta",
            "(4) Alpha beta",
        ] {
            let item = expect_item(line);
            assert_eq!(item.kind, MarkerKind::Numbered, "{line:?}");
            assert_eq!(item.content, "Alpha beta");
            assert_eq!(item.depth, 0);
        }
    }

    #[test]
    fn lettered_flags_roman_candidates() {
        let plain = expect_item("a. First option");
        assert_eq!(plain.kind, MarkerKind::Lettered);
        assert!(!plain.roman_candidate);

        let candidate = expect_item("i. Ambiguous option");
        assert_eq!(candidate.kind, MarkerKind::Lettered);
        assert!(candidate.roman_candidate);

        let upper = expect_item("V) Fifth option");
        assert_eq!(upper.kind, MarkerKind::Lettered);
        assert!(upper.roman_candidate);
    }

    #[test]
    fn multi_letter_romans_are_roman() {
        let item = expect_item("ii. Second point");
        assert_eq!(item.kind, MarkerKind::Roman);
        assert_eq!(item.content, "Second point");

        let upper = expect_item("IV) Fourth point");
        assert_eq!(upper.kind, MarkerKind::Roman);
    }

    #[test]
    fn invalid_roman_strings_fall_through() {
        // "iixx" is letters from the roman alphabet but not a valid numeral.
        let classified = classify_default("iixx. Strange marker here");
        assert!(
            !matches!(
                &classified,
                Classification::Item(item) if item.kind == MarkerKind::Roman
            ),
            "got {classified:?}"
        );
    }

    #[test]
    fn bullets_accept_common_glyphs() {
        for line in ["- task one", "* task one", "+ task one", "• task one"] {
            let item = expect_item(line);
            assert_eq!(item.kind, MarkerKind::Bullet, "{line:?}");
            assert_eq!(item.content, "task one");
        }
    }

    #[test]
    fn key_value_keeps_key_in_content() {
        let item = expect_item("Priority: high for the release");
        assert_eq!(item.kind, MarkerKind::KeyValue);
        assert_eq!(item.content, "Priority: high for the release");
    }

    #[test]
    fn overlong_key_is_not_key_value() {
        let key = "k".repeat(50);
        let classified = classify_default(&format!("{key}: value text"));
        assert!(
            !matches!(
                &classified,
                Classification::Item(item) if item.kind == MarkerKind::KeyValue
            ),
            "got {classified:?}"
        );
    }

    #[test]
    fn short_prose_is_paragraph_and_long_prose_is_narrative() {
        let item = expect_item("Consider caching the results");
        assert_eq!(item.kind, MarkerKind::Paragraph);

        let long = "word ".repeat(60);
        assert_eq!(classify_default(&long), Classification::Narrative);

        // Too short to plausibly be an option.
        assert_eq!(classify_default("ok so"), Classification::Narrative);
    }

    #[test]
    fn depth_counts_indent_steps_and_expands_tabs() {
        let opts = ExtractOptions::default();
        assert_eq!(depth_of("1. top", &opts), 0);
        assert_eq!(depth_of("  a. nested", &opts), 1);
        assert_eq!(depth_of("    - deeper", &opts), 2);
        assert_eq!(depth_of("\t- tabbed", &opts), 2);

        let wide = ExtractOptions {
            indent_step: 4,
            ..ExtractOptions::default()
        };
        assert_eq!(depth_of("    - one in", &wide), 1);
    }
}
