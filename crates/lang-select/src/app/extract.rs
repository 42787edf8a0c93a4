//! Turning classified lines into an addressable item hierarchy.
//!
//! One left-to-right pass over the input keeps a stack of open ancestors (one
//! per depth level) and a stack of open sections. Headers reset the list
//! context; depth transitions decide parent edges; marker kinds never gate
//! parenting.

use crate::app::classify::{self, Classification, ClassifiedLine, ExtractOptions};
use crate::domain::model::{ItemCollection, ItemId, MarkerKind, SelectableItem};

/// Extraction engine. Pure given its options: identical text always yields an
/// identical collection.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    opts: ExtractOptions,
}

impl Extractor {
    pub fn new(opts: ExtractOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.opts
    }

    /// Full extraction: hierarchy, sections, and every marker kind.
    pub fn extract(&self, text: &str) -> ItemCollection {
        let mut builder = HierarchyBuilder::new();
        for line in text.lines() {
            match classify::classify(line, &self.opts) {
                Classification::Header { rank, title } => builder.enter_header(rank, title),
                Classification::Item(item) => builder.push_item(item),
                Classification::Blank | Classification::Narrative => {}
            }
        }
        ItemCollection::new(builder.into_items())
    }

    /// Backward-compatible minimal extraction: numbered and bulleted items
    /// only, flat, no sections. Falls back to short plain paragraphs when the
    /// text has no explicit list markers at all.
    pub fn extract_basic(&self, text: &str) -> ItemCollection {
        let mut items = Vec::new();
        let mut paragraphs = Vec::new();

        for line in text.lines() {
            if let Classification::Item(classified) = classify::classify(line, &self.opts) {
                match classified.kind {
                    MarkerKind::Numbered | MarkerKind::Bullet => {
                        items.push(flat_item(items.len(), classified))
                    }
                    MarkerKind::Paragraph => {
                        paragraphs.push(classified);
                    }
                    _ => {}
                }
            }
        }

        if items.is_empty() {
            items = paragraphs
                .into_iter()
                .enumerate()
                .map(|(index, classified)| flat_item(index, classified))
                .collect();
        }

        ItemCollection::new(items)
    }
}

/// Convenience wrapper around [`Extractor`] with default options.
///
/// `enhanced=false` restricts classification to the minimal numbered/bulleted
/// behavior; `enhanced=true` runs the full pipeline.
pub fn extract(text: &str, enhanced: bool) -> ItemCollection {
    let extractor = Extractor::default();
    if enhanced {
        extractor.extract(text)
    } else {
        extractor.extract_basic(text)
    }
}

fn flat_item(index: usize, classified: ClassifiedLine) -> SelectableItem {
    SelectableItem {
        id: ItemId(index as u32 + 1),
        content: classified.content,
        kind: classified.kind,
        depth: 0,
        parent_id: None,
        section: None,
    }
}

/// Open ancestor slot: the most recent item seen at a given depth.
struct OpenAncestor {
    depth: usize,
    id: ItemId,
    kind: MarkerKind,
}

struct HierarchyBuilder {
    items: Vec<SelectableItem>,
    /// Open ancestors, strictly increasing in depth.
    stack: Vec<OpenAncestor>,
    /// Open sections, strictly increasing in rank; the last entry is the
    /// deepest and is the one reported on items.
    sections: Vec<(u8, String)>,
    next_id: u32,
}

impl HierarchyBuilder {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            stack: Vec::new(),
            sections: Vec::new(),
            next_id: 1,
        }
    }

    /// A header closes equal-or-deeper sections and every open list ancestor:
    /// a header always starts a fresh hierarchy context.
    fn enter_header(&mut self, rank: u8, title: String) {
        while self
            .sections
            .last()
            .is_some_and(|(open_rank, _)| *open_rank >= rank)
        {
            self.sections.pop();
        }
        self.sections.push((rank, title));
        self.stack.clear();
    }

    fn push_item(&mut self, classified: ClassifiedLine) {
        let ClassifiedLine {
            mut kind,
            depth,
            content,
            roman_candidate,
        } = classified;

        // Close siblings and deeper descendants, remembering the sibling this
        // item replaces at its own depth for the roman promotion rule.
        let mut closed_sibling_kind = None;
        while let Some(top) = self.stack.last() {
            if top.depth < depth {
                break;
            }
            if top.depth == depth {
                closed_sibling_kind = Some(top.kind);
            }
            self.stack.pop();
        }

        // "i." alone is lettered; it continues as roman only when it follows a
        // roman sibling in the same list.
        if roman_candidate && closed_sibling_kind == Some(MarkerKind::Roman) {
            kind = MarkerKind::Roman;
        }

        let parent_id = self.stack.last().map(|ancestor| ancestor.id);
        let id = ItemId(self.next_id);
        self.next_id += 1;

        self.items.push(SelectableItem {
            id,
            content,
            kind,
            depth,
            parent_id,
            section: self.sections.last().map(|(_, title)| title.clone()),
        });
        self.stack.push(OpenAncestor { depth, id, kind });
    }

    fn into_items(self) -> Vec<SelectableItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(collection: &ItemCollection) -> Vec<u32> {
        collection.items().iter().map(|item| item.id.0).collect()
    }

    #[test]
    fn flat_numbered_list() {
        let collection = extract("1. Alpha\n2. Beta\n3. Gamma", true);
        assert_eq!(collection.len(), 3);
        for (index, item) in collection.items().iter().enumerate() {
            assert_eq!(item.id.0 as usize, index + 1);
            assert_eq!(item.kind, MarkerKind::Numbered);
            assert_eq!(item.depth, 0);
            assert_eq!(item.parent_id, None);
            assert_eq!(item.section, None);
        }
    }

    #[test]
    fn section_and_nesting() {
        let text = "# Tasks\n1. Research\n   a. Sub one\n   b. Sub two\n2. Build";
        let collection = extract(text, true);
        assert_eq!(collection.len(), 4);

        let research = &collection.items()[0];
        assert_eq!(research.content, "Research");
        assert_eq!(research.depth, 0);
        assert_eq!(research.parent_id, None);
        assert_eq!(research.section.as_deref(), Some("Tasks"));

        let sub_one = &collection.items()[1];
        let sub_two = &collection.items()[2];
        assert_eq!(sub_one.depth, 1);
        assert_eq!(sub_one.parent_id, Some(research.id));
        assert_eq!(sub_two.parent_id, Some(research.id));

        let build = &collection.items()[3];
        assert_eq!(build.content, "Build");
        assert_eq!(build.depth, 0);
        assert_eq!(build.parent_id, None);
        assert_eq!(build.section.as_deref(), Some("Tasks"));
    }

    #[test]
    fn narrative_only_text_yields_empty_collection() {
        let paragraph = "This sentence keeps going well past the point where anyone would \
                         mistake it for a selectable option, and then goes on even further \
                         just to be certain that it is narrative and nothing else at all, \
                         rambling on without a single break.";
        let text = format!("{paragraph}\n\n{paragraph}");
        let collection = extract(&text, true);
        assert!(collection.is_empty());
    }

    #[test]
    fn depth_skip_attaches_to_nearest_open_ancestor() {
        // Depth jumps several levels at once; no synthetic intermediates.
        let text = "1. Top level item\n        - way deeper\n2. Next top";
        let collection = extract(text, true);
        assert_eq!(collection.len(), 3);
        let deep = &collection.items()[1];
        assert_eq!(deep.depth, 4);
        assert_eq!(deep.parent_id, Some(collection.items()[0].id));
        assert_eq!(collection.items()[2].parent_id, None);
    }

    #[test]
    fn header_closes_open_lists() {
        let text = "1. Before header\n# Break\n  - after header";
        let collection = extract(text, true);
        let after = &collection.items()[1];
        // The indented bullet has no parent because the header reset the stack.
        assert_eq!(after.parent_id, None);
        assert_eq!(after.section.as_deref(), Some("Break"));
    }

    #[test]
    fn deeper_headers_nest_and_shallower_headers_close() {
        let text = "# One\n## Inner\n- in inner\n# Two\n- in two";
        let collection = extract(text, true);
        assert_eq!(collection.items()[0].section.as_deref(), Some("Inner"));
        assert_eq!(collection.items()[1].section.as_deref(), Some("Two"));
    }

    #[test]
    fn mixed_kinds_parent_by_depth_only() {
        let text = "1. Parent entry\n  - bullet child\n  Key: value child";
        let collection = extract(text, true);
        assert_eq!(collection.len(), 3);
        let parent = collection.items()[0].id;
        assert_eq!(collection.items()[1].parent_id, Some(parent));
        assert_eq!(collection.items()[1].kind, MarkerKind::Bullet);
        assert_eq!(collection.items()[2].parent_id, Some(parent));
        assert_eq!(collection.items()[2].kind, MarkerKind::KeyValue);
    }

    #[test]
    fn roman_run_promotes_ambiguous_single_letters() {
        let text = "  ii. second\n  i. looks lettered alone";
        let collection = extract(text, true);
        assert_eq!(collection.items()[0].kind, MarkerKind::Roman);
        // Follows a roman sibling at the same depth, so it continues the run.
        assert_eq!(collection.items()[1].kind, MarkerKind::Roman);

        let alone = extract("  i. looks lettered alone", true);
        assert_eq!(alone.items()[0].kind, MarkerKind::Lettered);
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "# Plan\n1. First step\n  a. Detail\n- Loose bullet\nNotes:\nKey: value";
        let first = extract(text, true);
        let second = extract(text, true);
        assert_eq!(first.items(), second.items());
    }

    #[test]
    fn basic_mode_sees_only_numbers_and_bullets() {
        let text = "# Header\n1. One item\n  a. lettered sub\n- bullet item\nKey: value here";
        let collection = extract(text, false);
        let kinds: Vec<_> = collection.items().iter().map(|item| item.kind).collect();
        assert_eq!(kinds, [MarkerKind::Numbered, MarkerKind::Bullet]);
        assert!(collection.items().iter().all(|item| {
            item.depth == 0 && item.parent_id.is_none() && item.section.is_none()
        }));
    }

    #[test]
    fn basic_mode_falls_back_to_paragraphs() {
        let text = "Refactor the parser module\nAdd more tests later\n";
        let collection = extract(text, false);
        assert_eq!(collection.len(), 2);
        assert!(collection
            .items()
            .iter()
            .all(|item| item.kind == MarkerKind::Paragraph));
        assert_eq!(ids(&collection), [1, 2]);
    }
}
