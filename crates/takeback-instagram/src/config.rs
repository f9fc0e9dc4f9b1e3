//! Run configuration for the Instagram pipeline

use std::path::{Path, PathBuf};

use takeback_core::Pacing;

/// Everything one `run` needs, assembled by the caller from the global
/// config and CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the extracted Instagram takeout (read-only).
    pub base_dir: PathBuf,
    /// Output root for this target, e.g. `<target_dir>/instagram-saved`.
    pub output_dir: PathBuf,
    pub cookies_file: PathBuf,
    /// JSON done list, shared by the saved and liked runs.
    pub done_file: PathBuf,
    pub blacklist_file: PathBuf,
    /// gallery-dl's own sqlite archive, passed through as an extractor
    /// option so it can skip already-downloaded media internally.
    pub archive_file: PathBuf,
    pub pacing: Pacing,
    /// Plan and report only; no downloads, no store writes.
    pub dry_run: bool,
}

impl Config {
    pub fn video_dir(&self) -> PathBuf {
        self.output_dir.join("video")
    }

    pub fn video_metadata_dir(&self) -> PathBuf {
        self.output_dir.join("video").join("metadata")
    }

    pub fn post_dir(&self) -> PathBuf {
        self.output_dir.join("post")
    }

    pub fn post_metadata_dir(&self) -> PathBuf {
        self.output_dir.join("post").join("metadata")
    }

    pub(crate) fn ensure_output_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.video_metadata_dir(),
            self.post_metadata_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Convenience constructor used by the CLI.
pub fn for_target(
    base_dir: &Path,
    target_root: &Path,
    cache_dir: &Path,
    dir_name: &str,
    cookies_file: PathBuf,
    pacing: Pacing,
    dry_run: bool,
) -> Config {
    Config {
        base_dir: base_dir.to_path_buf(),
        output_dir: target_root.join(dir_name),
        cookies_file,
        done_file: cache_dir.join("instagram-done.json"),
        blacklist_file: cache_dir.join("instagram-blacklist.json"),
        archive_file: cache_dir.join("gallery-dl-done.sqlite3"),
        pacing,
        dry_run,
    }
}
