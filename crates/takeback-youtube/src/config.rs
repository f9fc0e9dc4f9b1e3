//! Run configuration for the YouTube pipeline

use std::path::PathBuf;

use takeback_core::Pacing;

use crate::state::Transfer;

/// Everything one `run` needs, assembled by the caller from the global
/// config and CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output root, e.g. `<target_dir>/youtube-playlists`.
    pub output_dir: PathBuf,
    /// Takeout roots to glob for playlist CSVs (read-only).
    pub takeout_roots: Vec<PathBuf>,
    pub transfers: Vec<Transfer>,
    /// CSV ledger shared by all transfers.
    pub ledger_file: PathBuf,
    pub blacklist_file: PathBuf,
    pub pacing: Pacing,
    /// Plan and report only; no downloads, no ledger writes.
    pub dry_run: bool,
    /// Cap on videos fetched per transfer this run.
    pub limit: Option<usize>,
}
