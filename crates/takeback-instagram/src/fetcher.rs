//! yt-dlp and gallery-dl invocations for Instagram links
//!
//! Both tools are trusted to handle partial leftovers from an interrupted
//! run: yt-dlp gets `--no-overwrites` and gallery-dl keeps its own sqlite
//! archive, so re-fetching an id is cheap and safe.

use std::path::Path;
use std::process::Command;

use takeback_core::error::FetchError;
use takeback_core::{fsutil, tool};

use crate::config::Config;
use crate::state::SavedLink;

/// Download a reel/TV via yt-dlp. The info JSON lands directly in the
/// metadata directory via yt-dlp's per-type output template.
pub fn fetch_video(cfg: &Config, link: &SavedLink) -> Result<(), FetchError> {
    tool::run("yt-dlp", &mut video_command(cfg, link))
}

fn video_command(cfg: &Config, link: &SavedLink) -> Command {
    let prefix = link.date_prefix();
    let media_tmpl = cfg
        .video_dir()
        .join(format!(
            "{prefix}%(id)s-%(upload_date>%Y-%m-%d-|)s%(title).80s-%(timestamp)s.%(ext)s"
        ));
    // Sidecars are named after the URL so they can be found again without
    // knowing what yt-dlp resolved the title to.
    let info_name = format!("{prefix}{}", fsutil::safe_filename(&link.url, ""));
    let info_tmpl = cfg.video_metadata_dir().join(info_name);

    let mut cmd = Command::new("yt-dlp");
    cmd.arg("--no-overwrites")
        .arg("--cookies")
        .arg(&cfg.cookies_file)
        .arg("--write-info-json")
        .arg("-o")
        .arg(media_tmpl)
        .arg("-o")
        .arg(format!("infojson:{}", info_tmpl.display()))
        .arg(&link.url);
    cmd
}

/// Download a post's media via gallery-dl.
pub fn fetch_post(cfg: &Config, link: &SavedLink) -> Result<(), FetchError> {
    tool::run("gallery-dl", &mut post_command(cfg, link))
}

fn post_command(cfg: &Config, link: &SavedLink) -> Command {
    let prefix = link.date_prefix();
    let mut cmd = Command::new("gallery-dl");
    cmd.arg("--cookies")
        .arg(&cfg.cookies_file)
        .arg(&link.url)
        .arg("--range")
        .arg("1-")
        .arg("-d")
        .arg(cfg.post_dir())
        .arg("-f")
        .arg(format!(
            "{prefix}{{num}}-{{shortcode}}-{{media_id}}-{{date:%Y-%m-%d_%H:%M:%S}}-{{username}}.{{extension}}"
        ))
        .arg("-o")
        .arg(format!(
            "extractor.instagram.archive={}",
            cfg.archive_file.display()
        ))
        .arg("-o")
        .arg("extractor.instagram.metadata=true")
        .arg("--mtime")
        .arg("date")
        .arg("--sleep")
        .arg(cfg.pacing.range_arg())
        .arg("--write-metadata");
    cmd
}

/// Clear gallery-dl's login/session cache before a post batch. Best
/// effort: a failure here only means stale sessions, not lost media.
pub fn clear_gallery_cache() {
    let mut cmd = Command::new("gallery-dl");
    cmd.args(["--clear-cache", "ALL"]);
    if let Err(e) = tool::run("gallery-dl", &mut cmd) {
        log::warn!("could not clear gallery-dl cache: {e}");
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FlattenStats {
    pub moved: usize,
    pub skipped: usize,
}

/// gallery-dl nests its output under `<post_dir>/instagram/<user>/…`;
/// flatten everything back into `post_dir`. Name collisions are skipped
/// with a warning — this runs unattended.
pub fn flatten_post_dir(post_dir: &Path) -> std::io::Result<FlattenStats> {
    let nested = post_dir.join("instagram");
    let mut stats = FlattenStats::default();
    if !nested.is_dir() {
        return Ok(stats);
    }
    move_files(&nested, post_dir, &mut stats)?;
    if stats.skipped == 0 {
        std::fs::remove_dir_all(&nested)?;
    } else {
        log::warn!(
            "leaving {} in place, {} collisions need manual review",
            nested.display(),
            stats.skipped
        );
    }
    log::info!(
        "flattened post directory: {} moved, {} skipped",
        stats.moved,
        stats.skipped
    );
    Ok(stats)
}

fn move_files(dir: &Path, dest: &Path, stats: &mut FlattenStats) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            move_files(&path, dest, stats)?;
        } else {
            let target = dest.join(entry.file_name());
            if target.exists() {
                log::warn!("{} already exists, leaving source in place", target.display());
                stats.skipped += 1;
            } else {
                std::fs::rename(&path, &target)?;
                stats.moved += 1;
            }
        }
    }
    Ok(())
}
