//! Managing the most recent stored response and its extraction.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::extract::Extractor;
use crate::app::select::{self, SelectionOutcome, ToolChoice};
use crate::domain::model::{ItemCollection, ItemId};
use crate::infra::config::Config;

/// Outcome of the most recent selection, kept for consumers that want the raw
/// ids after the interactive step finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    pub ids: Vec<ItemId>,
}

/// Single-owner holder of the most recent stored response.
///
/// Lifecycle: construct, then `store` and `select` any number of times, then
/// discard. `store` replaces the text in one assignment, so readers always see
/// the most recently stored value. An optional backing file persists the raw
/// text between processes; all file IO is best-effort and degrades to "no
/// stored response".
#[derive(Debug, Default)]
pub struct ResponseManager {
    extractor: Extractor,
    enhanced: bool,
    recent_path: Option<PathBuf>,
    recent: Option<String>,
    items: ItemCollection,
    last_selection: Option<SelectionResult>,
}

impl ResponseManager {
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: Extractor::new(config.extract.options()),
            enhanced: config.extract.enhanced,
            recent_path: None,
            recent: None,
            items: ItemCollection::default(),
            last_selection: None,
        }
    }

    /// Attach a backing file and load any previously stored response from it.
    /// Unreadable files are logged and treated as absent.
    pub fn with_recent_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(text) => {
                self.items = self.extract(&text);
                self.recent = Some(text);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read stored response, treating as absent"
                );
            }
        }
        self.recent_path = Some(path);
        self
    }

    /// Attach a backing file without reading it; the next `store` overwrites
    /// whatever the file held.
    pub fn with_recent_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.recent_path = Some(path.into());
        self
    }

    /// Enable or disable the full extraction pipeline.
    pub fn set_enhanced(&mut self, enhanced: bool) {
        self.enhanced = enhanced;
        if let Some(text) = self.recent.clone() {
            self.items = self.extract(&text);
        }
    }

    pub fn recent_path(&self) -> Option<&Path> {
        self.recent_path.as_deref()
    }

    pub fn recent_text(&self) -> Option<&str> {
        self.recent.as_deref()
    }

    /// Store a new response, re-extract, and persist to the backing file if
    /// one is configured. Write failures are logged, never fatal.
    pub fn store(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.items = self.extract(&text);
        self.last_selection = None;

        if let Some(path) = &self.recent_path
            && let Err(err) = fs::write(path, &text)
        {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to persist stored response"
            );
        }

        self.recent = Some(text);
    }

    /// Items extracted from the current stored response.
    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    /// Run the selection protocol over the current items and remember the
    /// result.
    pub fn select(&mut self, tool: ToolChoice, prompt: &str, multi: bool) -> SelectionOutcome {
        let outcome = select::select(&self.items, tool, prompt, multi);
        if let SelectionOutcome::Completed(ids) = &outcome {
            self.last_selection = Some(SelectionResult { ids: ids.clone() });
        }
        outcome
    }

    pub fn last_selection(&self) -> Option<&SelectionResult> {
        self.last_selection.as_ref()
    }

    fn extract(&self, text: &str) -> ItemCollection {
        if self.enhanced {
            self.extractor.extract(text)
        } else {
            self.extractor.extract_basic(text)
        }
    }
}
