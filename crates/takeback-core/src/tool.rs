//! External tool invocation
//!
//! All network fetching is delegated to command-line tools (`yt-dlp`,
//! `gallery-dl`, `exiftool`). Output is captured so a failure's stderr can
//! be classified; a missing binary is surfaced distinctly from a bad exit.

use std::process::Command;

use crate::error::FetchError;

/// Render a command for the debug log.
pub fn command_line(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run a tool to completion, discarding stdout.
pub fn run(tool: &'static str, cmd: &mut Command) -> Result<(), FetchError> {
    capture(tool, cmd).map(|_| ())
}

/// Run a tool and parse its stdout as JSON (e.g. `yt-dlp --dump-json`).
pub fn probe_json(tool: &'static str, cmd: &mut Command) -> Result<serde_json::Value, FetchError> {
    let stdout = capture(tool, cmd)?;
    serde_json::from_str(&stdout)
        .map_err(|e| FetchError::Metadata(format!("{tool} produced invalid JSON: {e}")))
}

fn capture(tool: &'static str, cmd: &mut Command) -> Result<String, FetchError> {
    log::debug!("running: {}", command_line(cmd));
    let output = match cmd.output() {
        Ok(out) => out,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FetchError::ToolMissing { tool });
        }
        Err(e) => return Err(FetchError::Io(e)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FetchError::from_tool_failure(
            tool,
            output.status.code(),
            &stderr,
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
