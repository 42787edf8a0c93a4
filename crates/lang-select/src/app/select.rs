//! Selection protocol: presenting items to a picker and mapping the choice
//! back.
//!
//! One attempt walks `Idle -> ToolInvoked -> {Completed | Empty | Cancelled |
//! ToolFailed}`. On `ToolFailed` the protocol retries exactly once with the
//! first tool from a fixed fallback order that differs from the primary; a
//! second failure is terminal and retains both reasons. No error escapes the
//! protocol — callers only ever observe a [`SelectionOutcome`].

use std::collections::HashMap;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::errors::SelectError;
use crate::domain::model::{ItemCollection, ItemId, SelectableItem};
use crate::infra::tools::{self, ExternalTool, ToolOutput};
use crate::ui::picker::{self, PickResult};

/// Picker requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ToolChoice {
    /// First available external tool, else the internal picker.
    #[default]
    Auto,
    /// Built-in terminal picker.
    Internal,
    Fzf,
    Gum,
    Peco,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::Internal => "internal",
            ToolChoice::Fzf => "fzf",
            ToolChoice::Gum => "gum",
            ToolChoice::Peco => "peco",
        }
    }
}

impl FromStr for ToolChoice {
    type Err = ToolParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ToolChoice::Auto),
            "internal" => Ok(ToolChoice::Internal),
            "fzf" => Ok(ToolChoice::Fzf),
            "gum" => Ok(ToolChoice::Gum),
            "peco" => Ok(ToolChoice::Peco),
            other => Err(ToolParseError::UnknownTool(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`ToolChoice`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ToolParseError {
    #[error("unknown selection tool '{0}'")]
    UnknownTool(String),
}

/// Concrete picker resolved from a [`ToolChoice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTool {
    Internal,
    External(ExternalTool),
}

impl ResolvedTool {
    pub fn name(&self) -> &'static str {
        match self {
            ResolvedTool::Internal => "internal",
            ResolvedTool::External(tool) => tool.as_str(),
        }
    }
}

/// Fixed fallback order; the retry picks the first entry that differs from
/// the failed primary.
const FALLBACK_ORDER: [ResolvedTool; 4] = [
    ResolvedTool::External(ExternalTool::Fzf),
    ResolvedTool::External(ExternalTool::Gum),
    ResolvedTool::External(ExternalTool::Peco),
    ResolvedTool::Internal,
];

/// Terminal result of one selection attempt. `Empty` (tool ran, nothing
/// chosen) and `Cancelled` (explicit user abort) are deliberately distinct.
#[derive(Debug)]
pub enum SelectionOutcome {
    /// Chosen ids in the user's selection order, not source order.
    Completed(Vec<ItemId>),
    Empty,
    Cancelled,
    Failed {
        primary: SelectError,
        fallback: Option<SelectError>,
    },
}

/// Result of a single tool invocation, before any fallback handling.
enum Attempt {
    Completed(Vec<ItemId>),
    Empty,
    Cancelled,
    ToolFailed(SelectError),
}

/// Present `collection` through the requested tool and map the raw choice
/// back to item ids. Blocks the calling thread while the picker runs.
pub fn select(
    collection: &ItemCollection,
    tool: ToolChoice,
    prompt: &str,
    multi: bool,
) -> SelectionOutcome {
    select_with(collection, tool, prompt, multi, run_attempt)
}

/// Protocol body with the tool invocation injected, so the retry logic can be
/// exercised without spawning anything.
fn select_with(
    collection: &ItemCollection,
    tool: ToolChoice,
    prompt: &str,
    multi: bool,
    mut attempt: impl FnMut(ResolvedTool, &PromptMapping, &str, bool) -> Attempt,
) -> SelectionOutcome {
    if collection.is_empty() {
        return SelectionOutcome::Empty;
    }

    let mapping = PromptMapping::new(collection.items());
    let primary = resolve(tool);

    match attempt(primary, &mapping, prompt, multi) {
        Attempt::Completed(ids) => SelectionOutcome::Completed(ids),
        Attempt::Empty => SelectionOutcome::Empty,
        Attempt::Cancelled => SelectionOutcome::Cancelled,
        Attempt::ToolFailed(primary_err) => {
            let Some(fallback) = fallback_for(primary) else {
                return SelectionOutcome::Failed {
                    primary: primary_err,
                    fallback: None,
                };
            };
            tracing::warn!(
                tool = primary.name(),
                fallback = fallback.name(),
                error = %primary_err,
                "picker failed, retrying with fallback"
            );
            match attempt(fallback, &mapping, prompt, multi) {
                Attempt::Completed(ids) => SelectionOutcome::Completed(ids),
                Attempt::Empty => SelectionOutcome::Empty,
                Attempt::Cancelled => SelectionOutcome::Cancelled,
                Attempt::ToolFailed(fallback_err) => SelectionOutcome::Failed {
                    primary: primary_err,
                    fallback: Some(fallback_err),
                },
            }
        }
    }
}

fn resolve(choice: ToolChoice) -> ResolvedTool {
    match choice {
        ToolChoice::Internal => ResolvedTool::Internal,
        ToolChoice::Fzf => ResolvedTool::External(ExternalTool::Fzf),
        ToolChoice::Gum => ResolvedTool::External(ExternalTool::Gum),
        ToolChoice::Peco => ResolvedTool::External(ExternalTool::Peco),
        ToolChoice::Auto => ExternalTool::ALL
            .iter()
            .copied()
            .find(|tool| tools::is_available(*tool))
            .map(ResolvedTool::External)
            .unwrap_or(ResolvedTool::Internal),
    }
}

fn fallback_for(primary: ResolvedTool) -> Option<ResolvedTool> {
    FALLBACK_ORDER.iter().copied().find(|tool| *tool != primary)
}

fn run_attempt(tool: ResolvedTool, mapping: &PromptMapping, prompt: &str, multi: bool) -> Attempt {
    match tool {
        ResolvedTool::Internal => match picker::pick(mapping.entries(), prompt, multi) {
            Ok(PickResult::Chosen(ids)) if ids.is_empty() => Attempt::Empty,
            Ok(PickResult::Chosen(ids)) => Attempt::Completed(ids),
            Ok(PickResult::Cancelled) => Attempt::Cancelled,
            Err(err) => Attempt::ToolFailed(SelectError::ToolExecution {
                tool: "internal".into(),
                reason: format!("{err:#}"),
            }),
        },
        ResolvedTool::External(external) => {
            match tools::run(external, prompt, &mapping.input(), multi) {
                Ok(output) => mapping.interpret(external, output),
                Err(err) => Attempt::ToolFailed(err),
            }
        }
    }
}

/// Prompt-line to item-id mapping for one attempt. Lines carry the id so raw
/// tool output maps back unambiguously even when two items share content.
struct PromptMapping {
    entries: Vec<(ItemId, String)>,
    by_line: HashMap<String, ItemId>,
}

impl PromptMapping {
    fn new(items: &[SelectableItem]) -> Self {
        let entries: Vec<(ItemId, String)> = items
            .iter()
            .map(|item| (item.id, format!("{}. {}", item.id, item.content)))
            .collect();
        let by_line = entries
            .iter()
            .map(|(id, line)| (line.clone(), *id))
            .collect();
        Self { entries, by_line }
    }

    fn entries(&self) -> &[(ItemId, String)] {
        &self.entries
    }

    /// Newline-joined prompt lines fed to the external tool's stdin.
    fn input(&self) -> String {
        self.entries
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Map one tool invocation's exit status and stdout to an attempt result.
    /// Output order is preserved so multi-select keeps the user's choice
    /// order.
    fn interpret(&self, tool: ExternalTool, output: ToolOutput) -> Attempt {
        // Interactive pickers conventionally exit 130 on interrupt/escape.
        if output.status == Some(130) {
            return Attempt::Cancelled;
        }

        let chosen: Vec<&str> = output
            .stdout
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();

        match output.status {
            Some(0) if chosen.is_empty() => Attempt::Empty,
            // Exit 1 with nothing chosen is tool-specific: fzf reports an
            // empty match set, peco reports a user abort.
            Some(1) if chosen.is_empty() && tool == ExternalTool::Fzf => Attempt::Empty,
            Some(1) if chosen.is_empty() && tool == ExternalTool::Peco => Attempt::Cancelled,
            Some(0) => {
                let mut ids = Vec::with_capacity(chosen.len());
                for line in chosen {
                    match self.by_line.get(line) {
                        Some(id) => ids.push(*id),
                        None => {
                            return Attempt::ToolFailed(SelectError::ToolExecution {
                                tool: tool.as_str().into(),
                                reason: format!("unrecognized output line: {line:?}"),
                            });
                        }
                    }
                }
                Attempt::Completed(ids)
            }
            status => Attempt::ToolFailed(SelectError::ToolExecution {
                tool: tool.as_str().into(),
                reason: match status {
                    Some(code) => format!("exited with status {code}"),
                    None => "terminated by signal".into(),
                },
            }),
        }
    }
}

/// JSON-serializable form of a selection outcome; the only wire-format
/// contract external consumers depend on.
#[derive(Debug, Serialize)]
pub struct SelectionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<SelectedItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Single item for single-select, array for multi-select.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SelectedItems {
    One(SelectableItem),
    Many(Vec<SelectableItem>),
}

impl SelectionReport {
    /// Build the report for an outcome, resolving ids against `collection`.
    pub fn from_outcome(
        outcome: &SelectionOutcome,
        collection: &ItemCollection,
        multi: bool,
    ) -> Self {
        match outcome {
            SelectionOutcome::Completed(ids) => {
                let items: Vec<SelectableItem> = ids
                    .iter()
                    .filter_map(|&id| collection.get(id).cloned())
                    .collect();
                let selected = if multi {
                    SelectedItems::Many(items)
                } else {
                    items.into_iter().next().map(SelectedItems::One).unwrap_or(
                        SelectedItems::Many(Vec::new()),
                    )
                };
                Self {
                    success: true,
                    selected: Some(selected),
                    error: None,
                }
            }
            SelectionOutcome::Empty => Self::failure("No selection made"),
            SelectionOutcome::Cancelled => Self::failure("Selection cancelled"),
            SelectionOutcome::Failed { primary, fallback } => {
                let error = match fallback {
                    Some(fallback) => format!("{primary}; fallback: {fallback}"),
                    None => primary.to_string(),
                };
                Self::failure(&error)
            }
        }
    }

    fn failure(error: &str) -> Self {
        Self {
            success: false,
            selected: None,
            error: Some(error.to_owned()),
        }
    }
}
