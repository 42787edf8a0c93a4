//! Command line interface for the lang-select binary.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::format::{FormatStyle, Formatter};
use crate::app::manager::ResponseManager;
use crate::app::select::{SelectionOutcome, SelectionReport, ToolChoice};
use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "lang-select")]
#[command(author, version)]
#[command(about = "Extract and select numbered or bulleted items from language model responses")]
pub struct Cli {
    /// File containing the response, or - for stdin
    #[arg(default_value = "-")]
    pub file: String,

    /// Selection tool to use
    #[arg(long, value_enum)]
    pub tool: Option<ToolChoice>,

    /// Only print the extracted items without selection
    #[arg(long)]
    pub print_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to a file that stores the most recent response; read instead of
    /// FILE when it exists
    #[arg(long)]
    pub recent: Option<PathBuf>,

    /// Save the current input to the specified file for future use
    #[arg(long)]
    pub save_recent: Option<PathBuf>,

    /// Enable multi-selection mode
    #[arg(long)]
    pub multi: bool,

    /// Use enhanced extraction with support for hierarchies and sections
    #[arg(long)]
    pub enhanced: bool,

    /// Display style for extracted items (hierarchy and mixed imply
    /// --enhanced)
    #[arg(long, value_enum)]
    pub view: Option<FormatStyle>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Prompt text shown by the picker
    #[arg(long)]
    pub prompt: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse arguments and run the requested action.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "lang-select", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load().context("failed to load configuration")?;

    let view = match cli.view {
        Some(view) => view,
        None => config
            .display
            .style
            .parse()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "invalid configured style, using hierarchy");
                FormatStyle::default()
            }),
    };
    // hierarchy and mixed views only make sense with the full pipeline.
    let enhanced = cli.enhanced
        || config.extract.enhanced
        || (cli.view.is_some_and(|view| view != FormatStyle::Flat));
    config.extract.enhanced = enhanced;

    let tool = match cli.tool {
        Some(tool) => tool,
        None => config.select.tool.parse().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid configured tool, using auto");
            ToolChoice::Auto
        }),
    };
    let use_color = !cli.no_color && config.display.color;
    let prompt = cli
        .prompt
        .clone()
        .unwrap_or_else(|| config.select.prompt.clone());

    let text = read_input(&cli)?;

    let mut manager = ResponseManager::new(&config);
    // The path is write-only here; the input text is already in hand.
    if let Some(path) = &cli.save_recent {
        manager = manager.with_recent_path(path);
    }
    manager.store(text);

    if manager.items().is_empty() {
        return Ok(report_failure(cli.json, "No selectable items found in the text"));
    }

    if cli.print_only {
        let rendered = Formatter::new(view, use_color).format(manager.items());
        println!("{rendered}");
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = manager.select(tool, &prompt, cli.multi);
    let report = SelectionReport::from_outcome(&outcome, manager.items(), cli.multi);

    match &outcome {
        SelectionOutcome::Completed(ids) => {
            if cli.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                for id in ids {
                    if let Some(item) = manager.items().get(*id) {
                        println!("{}", item.content);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        SelectionOutcome::Empty => Ok(report_failure(cli.json, "No selection made")),
        SelectionOutcome::Cancelled => Ok(report_failure(cli.json, "Selection cancelled")),
        SelectionOutcome::Failed { .. } => {
            let error = report.error.clone().unwrap_or_else(|| "selection failed".into());
            if cli.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                eprintln!("{error}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(recent) = &cli.recent
        && recent.exists()
    {
        return std::fs::read_to_string(recent)
            .with_context(|| format!("failed to read recent file {}", recent.display()));
    }

    if cli.file == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read file {}", cli.file))
}

fn report_failure(json: bool, message: &str) -> ExitCode {
    if json {
        println!(
            "{}",
            serde_json::json!({ "success": false, "error": message })
        );
    } else {
        eprintln!("{message}");
    }
    ExitCode::FAILURE
}
