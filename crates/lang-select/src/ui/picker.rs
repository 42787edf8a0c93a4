//! Built-in terminal picker used when no external chooser is available.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::domain::model::ItemId;

const TICK_RATE: Duration = Duration::from_millis(120);

/// Result of one internal picker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    /// Chosen ids in toggle order (multi) or the highlighted id (single).
    /// Empty when the user confirmed without toggling anything in multi mode.
    Chosen(Vec<ItemId>),
    Cancelled,
}

/// Run the picker over the prepared prompt entries. Blocks until the user
/// confirms, aborts, or the terminal fails.
///
/// The picker draws on stderr so stdout stays clean for piped consumers.
pub fn pick(entries: &[(ItemId, String)], prompt: &str, multi: bool) -> Result<PickResult> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;

    let result = run_loop(&mut terminal, entries, prompt, multi);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

struct PickerState {
    cursor: usize,
    /// Toggled ids in toggle order; selection order is part of the contract.
    toggled: Vec<ItemId>,
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    entries: &[(ItemId, String)],
    prompt: &str,
    multi: bool,
) -> Result<PickResult> {
    let mut state = PickerState {
        cursor: 0,
        toggled: Vec::new(),
    };

    loop {
        terminal.draw(|frame| draw(frame, entries, prompt, multi, &state))?;

        if !event::poll(TICK_RATE)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key(key, entries, multi, &mut state) {
            Some(result) => return Ok(result),
            None => {}
        }
    }
}

fn handle_key(
    key: KeyEvent,
    entries: &[(ItemId, String)],
    multi: bool,
    state: &mut PickerState,
) -> Option<PickResult> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return Some(PickResult::Cancelled),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(PickResult::Cancelled);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.cursor = state.cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.cursor + 1 < entries.len() {
                state.cursor += 1;
            }
        }
        KeyCode::Char(' ') if multi => {
            if let Some((id, _)) = entries.get(state.cursor) {
                match state.toggled.iter().position(|toggled| toggled == id) {
                    Some(index) => {
                        state.toggled.remove(index);
                    }
                    None => state.toggled.push(*id),
                }
            }
        }
        KeyCode::Enter => {
            let chosen = if multi {
                state.toggled.clone()
            } else {
                entries
                    .get(state.cursor)
                    .map(|(id, _)| vec![*id])
                    .unwrap_or_default()
            };
            return Some(PickResult::Chosen(chosen));
        }
        _ => {}
    }
    None
}

fn draw(
    frame: &mut ratatui::Frame,
    entries: &[(ItemId, String)],
    prompt: &str,
    multi: bool,
    state: &PickerState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.size());

    let items: Vec<ListItem> = entries
        .iter()
        .map(|(id, line)| {
            let marker = if multi {
                if state.toggled.contains(id) { "[x] " } else { "[ ] " }
            } else {
                ""
            };
            ListItem::new(Line::from(format!("{marker}{line}")))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(prompt.to_owned()))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.cursor));
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    let hint = if multi {
        "space: toggle  enter: confirm  esc: cancel"
    } else {
        "enter: select  esc: cancel"
    };
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
}
