//! Common error types for export parsing, progress stores, and fetching

use std::path::{Path, PathBuf};

/// Error from parsing a vendor takeout export file.
///
/// `Malformed` means the export's structural invariant is broken — the
/// vendor changed its schema and the id/timestamp pairing can no longer be
/// trusted, so the whole parse of that file fails. Non-structural problems
/// (an unparseable date in one record) are handled by skipping the record,
/// not by this error.
#[derive(Debug)]
pub enum ExportError {
    Malformed { path: PathBuf, detail: String },
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Csv { path: PathBuf, source: csv::Error },
}

impl ExportError {
    pub fn malformed(path: &Path, detail: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { path, detail } => {
                write!(f, "malformed export {}: {detail}", path.display())
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Csv { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed { .. } => None,
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
        }
    }
}

/// Error from the blacklist/done/ledger stores.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::Json(e) => write!(f, "JSON: {e}"),
            Self::Csv(e) => write!(f, "CSV: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Csv(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

/// Error from fetching a single remote item via an external tool.
///
/// One item's failure never aborts the batch; the loop logs it and moves
/// on, leaving the item for the next run. `Unavailable` flags responses
/// that will not improve with retries (gone/private/removed) so the
/// operator can promote the id into the blacklist by hand.
#[derive(Debug)]
pub enum FetchError {
    /// External tool exited non-zero.
    Tool {
        tool: &'static str,
        status: Option<i32>,
        detail: String,
    },
    /// Tool binary is not installed / not on PATH.
    ToolMissing { tool: &'static str },
    /// The remote item is permanently gone — a blacklist candidate.
    Unavailable { tool: &'static str, detail: String },
    /// Probe/sidecar output could not be interpreted.
    Metadata(String),
    Io(std::io::Error),
}

/// Stderr markers that indicate a permanently unfetchable item rather
/// than a transient failure. Matched case-insensitively.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "410",
    "gone",
    "private",
    "unavailable",
    "does not exist",
    "has been removed",
    "account has been terminated",
];

impl FetchError {
    /// Classify a non-zero tool exit from its stderr.
    pub fn from_tool_failure(tool: &'static str, status: Option<i32>, stderr: &str) -> Self {
        let detail = condense(stderr);
        let lower = detail.to_lowercase();
        if UNAVAILABLE_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::Unavailable { tool, detail }
        } else {
            Self::Tool {
                tool,
                status,
                detail,
            }
        }
    }

    /// Whether retrying on a later run is pointless.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::ToolMissing { .. })
    }
}

/// Keep only the last non-empty stderr line — the tools print multi-line
/// progress noise before the actual error.
fn condense(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("(no output)")
        .to_string()
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tool {
                tool,
                status,
                detail,
            } => match status {
                Some(code) => write!(f, "{tool} exited {code}: {detail}"),
                None => write!(f, "{tool} killed by signal: {detail}"),
            },
            Self::ToolMissing { tool } => write!(f, "{tool} is not installed"),
            Self::Unavailable { tool, detail } => {
                write!(f, "permanently unavailable ({tool}): {detail}")
            }
            Self::Metadata(detail) => write!(f, "metadata: {detail}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
