//! Domain models for extracted items and item collections.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an extracted item, unique within one extraction pass.
///
/// Ids are assigned in first-seen order starting at 1. They are stable for the
/// lifetime of one [`ItemCollection`] but not across re-extraction of edited
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Syntactic category of an item's leading token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    Numbered,
    Bullet,
    Lettered,
    Roman,
    KeyValue,
    Paragraph,
}

impl MarkerKind {
    /// Stable identifier used in debug output and the JSON export contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Numbered => "numbered",
            MarkerKind::Bullet => "bullet",
            MarkerKind::Lettered => "lettered",
            MarkerKind::Roman => "roman",
            MarkerKind::KeyValue => "key-value",
            MarkerKind::Paragraph => "paragraph",
        }
    }
}

/// One selectable unit of text extracted from a response.
///
/// Items are immutable once constructed; corrections require re-extracting the
/// edited text into a fresh collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableItem {
    pub id: ItemId,
    /// Line text with marker and leading whitespace stripped.
    pub content: String,
    pub kind: MarkerKind,
    /// Zero-based nesting level derived from indentation.
    pub depth: usize,
    /// Nearest shallower open ancestor, if any.
    pub parent_id: Option<ItemId>,
    /// Deepest enclosing section header preceding this item.
    pub section: Option<String>,
}

/// Ordered result of one extraction pass, plus cached lookup indexes.
///
/// Built once per extraction call and never mutated in place. A new extraction
/// produces a new collection.
#[derive(Debug, Clone, Default)]
pub struct ItemCollection {
    items: Vec<SelectableItem>,
    by_id: HashMap<ItemId, usize>,
    /// Section names in first-seen order; unsectioned items are tracked under
    /// the `None` key so they always render first.
    section_order: Vec<String>,
    by_section: HashMap<Option<String>, Vec<ItemId>>,
    children: HashMap<ItemId, Vec<ItemId>>,
}

impl ItemCollection {
    /// Build the collection and its derived indexes from items in source order.
    pub fn new(items: Vec<SelectableItem>) -> Self {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut section_order: Vec<String> = Vec::new();
        let mut by_section: HashMap<Option<String>, Vec<ItemId>> = HashMap::new();
        let mut children: HashMap<ItemId, Vec<ItemId>> = HashMap::new();

        for (index, item) in items.iter().enumerate() {
            by_id.insert(item.id, index);

            if let Some(section) = &item.section
                && !section_order.iter().any(|seen| seen == section)
            {
                section_order.push(section.clone());
            }
            by_section
                .entry(item.section.clone())
                .or_default()
                .push(item.id);

            if let Some(parent) = item.parent_id {
                children.entry(parent).or_default().push(item.id);
            }
        }

        Self {
            items,
            by_id,
            section_order,
            by_section,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in source order.
    pub fn items(&self) -> &[SelectableItem] {
        &self.items
    }

    /// O(1) lookup by id.
    pub fn get(&self, id: ItemId) -> Option<&SelectableItem> {
        self.by_id.get(&id).map(|&index| &self.items[index])
    }

    /// Section names in first-seen order, excluding the unsectioned group.
    pub fn sections(&self) -> &[String] {
        &self.section_order
    }

    /// Items belonging to `section` (`None` = before any header), source order.
    pub fn in_section(&self, section: Option<&str>) -> Vec<&SelectableItem> {
        self.by_section
            .get(&section.map(str::to_owned))
            .map(|ids| ids.iter().filter_map(|&id| self.get(id)).collect())
            .unwrap_or_default()
    }

    /// Items at or above the given nesting level, source order.
    pub fn with_max_depth(&self, max_depth: usize) -> Vec<&SelectableItem> {
        self.items
            .iter()
            .filter(|item| item.depth <= max_depth)
            .collect()
    }

    /// Direct children of `id` in source order.
    pub fn children_of(&self, id: ItemId) -> Vec<&SelectableItem> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|&child| self.get(child)).collect())
            .unwrap_or_default()
    }

    /// Items with no parent, source order.
    pub fn roots(&self) -> Vec<&SelectableItem> {
        self.items
            .iter()
            .filter(|item| item.parent_id.is_none())
            .collect()
    }
}
