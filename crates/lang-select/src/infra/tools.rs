//! External picker integration.
//!
//! Each tool reads candidate lines on stdin and writes the chosen line(s) to
//! stdout. Invocation blocks the calling thread until the subprocess exits;
//! exit-status interpretation lives with the selection protocol.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::domain::errors::SelectError;

/// Supported external interactive choosers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTool {
    Fzf,
    Gum,
    Peco,
}

impl ExternalTool {
    /// Probe order for `auto` resolution.
    pub const ALL: [ExternalTool; 3] = [ExternalTool::Fzf, ExternalTool::Gum, ExternalTool::Peco];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalTool::Fzf => "fzf",
            ExternalTool::Gum => "gum",
            ExternalTool::Peco => "peco",
        }
    }

    fn command(&self, prompt: &str, multi: bool) -> Command {
        let mut cmd = Command::new(self.as_str());
        match self {
            ExternalTool::Fzf => {
                cmd.arg("--height=40%").arg(format!("--prompt={prompt}: "));
                if multi {
                    cmd.arg("--multi");
                }
            }
            ExternalTool::Gum => {
                cmd.arg("choose").arg(format!("--header={prompt}"));
                if multi {
                    cmd.arg("--no-limit");
                } else {
                    cmd.arg("--limit=1");
                }
            }
            ExternalTool::Peco => {
                cmd.arg(format!("--prompt={prompt}:"));
            }
        }
        cmd
    }
}

/// Exit status and captured stdout of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
}

/// Check whether a tool can be spawned at all.
pub fn is_available(tool: ExternalTool) -> bool {
    Command::new(tool.as_str())
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Run `tool`, feeding `input` (one candidate per line) to its stdin and
/// capturing stdout. The tool inherits stderr so its interactive UI can draw.
pub fn run(
    tool: ExternalTool,
    prompt: &str,
    input: &str,
    multi: bool,
) -> Result<ToolOutput, SelectError> {
    invoke(tool.command(prompt, multi), tool.as_str(), input)
}

fn invoke(mut cmd: Command, name: &str, input: &str) -> Result<ToolOutput, SelectError> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SelectError::ToolUnavailable {
                    tool: name.to_owned(),
                    reason: "not found on PATH".into(),
                }
            } else {
                SelectError::ToolUnavailable {
                    tool: name.to_owned(),
                    reason: err.to_string(),
                }
            }
        })?;

    if let Some(stdin) = child.stdin.as_mut() {
        // The picker may exit before consuming all candidates; a broken pipe
        // here is not a failure.
        let _ = stdin.write_all(input.as_bytes());
        let _ = stdin.write_all(b"\n");
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().map_err(|err| SelectError::ToolExecution {
        tool: name.to_owned(),
        reason: err.to_string(),
    })?;

    Ok(ToolOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}
