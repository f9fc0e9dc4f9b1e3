//! yt-dlp probe + download for playlist videos
//!
//! Each video costs two invocations: a `--dump-json` probe to learn the
//! title/channel (they name the output files), then the actual download in
//! the transfer's mode. The probe going first means an unavailable video
//! fails before anything touches the disk.

use std::path::Path;
use std::process::Command;

use takeback_core::error::FetchError;
use takeback_core::ledger::LedgerRow;
use takeback_core::{fsutil, tool};

use crate::config::Config;
use crate::state::{PlaylistVideo, Transfer, TransferKind};

/// Extensions a download may produce, probed when stamping file times.
const ARTIFACT_EXTS: &[&str] = &["mp4", "mp3", "webm", "m4a"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMeta {
    pub title: String,
    pub channel: String,
    /// Dashed `YYYY-MM-DD`, or `0000-00-00` when yt-dlp has no date.
    pub upload_date: String,
}

/// Ask yt-dlp for a video's metadata without downloading.
pub fn probe(video: &PlaylistVideo) -> Result<VideoMeta, FetchError> {
    let mut cmd = Command::new("yt-dlp");
    cmd.arg("--dump-json").arg(video.url());
    let info = tool::probe_json("yt-dlp", &mut cmd)?;

    let title = info
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let channel = info
        .get("channel")
        .or_else(|| info.get("uploader"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let upload_date = dash_upload_date(
        info.get("upload_date")
            .and_then(|v| v.as_str())
            .unwrap_or_default(),
    );
    Ok(VideoMeta {
        title,
        channel,
        upload_date,
    })
}

/// `20210304` → `2021-03-04`; anything else → `0000-00-00`.
fn dash_upload_date(raw: &str) -> String {
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..])
    } else {
        "0000-00-00".to_string()
    }
}

/// Download one video and return its ledger row. The info JSON moves to
/// the transfer's metadata directory and, when the playlist carried an
/// added-timestamp, every produced file gets it as mtime/atime.
pub fn fetch(
    cfg: &Config,
    transfer: &Transfer,
    video: &PlaylistVideo,
) -> Result<LedgerRow, FetchError> {
    let meta = probe(video)?;
    let base = format!(
        "{}_{}",
        fsutil::slugify(&meta.title),
        fsutil::slugify(&meta.channel)
    );
    let folder_dir = cfg.output_dir.join(&transfer.folder);

    tool::run(
        "yt-dlp",
        &mut download_command(transfer.kind, &folder_dir, &base, &video.url()),
    )?;

    relocate_info_json(&folder_dir, &base)?;

    if let Some(added) = video.added_at {
        stamp_artifacts(&folder_dir, &base, added.timestamp());
    }

    Ok(LedgerRow {
        transfer: transfer.name.clone(),
        video_id: video.video_id.clone(),
        title: meta.title,
        channel: meta.channel,
        upload_date: meta.upload_date,
        added_at: video
            .added_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        file: format!("{}/{}", transfer.folder, base),
    })
}

fn download_command(kind: TransferKind, folder_dir: &Path, base: &str, url: &str) -> Command {
    let outtmpl = folder_dir.join(format!("{base}.%(ext)s"));
    let mut cmd = Command::new("yt-dlp");
    cmd.arg("-o").arg(outtmpl);
    match kind {
        TransferKind::Audio => {
            cmd.args([
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--embed-thumbnail",
                "--add-metadata",
                "--write-info-json",
            ]);
        }
        TransferKind::Video => {
            cmd.args([
                "-f",
                "bestvideo+bestaudio/best",
                "--merge-output-format",
                "mp4",
                "--write-info-json",
            ]);
        }
        TransferKind::Metadata => {
            cmd.args(["--skip-download", "--write-info-json", "--write-thumbnail"]);
        }
    }
    cmd.arg(url);
    cmd
}

fn relocate_info_json(folder_dir: &Path, base: &str) -> Result<(), FetchError> {
    let src = folder_dir.join(format!("{base}.info.json"));
    if !src.is_file() {
        return Ok(());
    }
    let metadata_dir = folder_dir.join("metadata");
    std::fs::create_dir_all(&metadata_dir)?;
    std::fs::rename(&src, metadata_dir.join(format!("{base}.info.json")))?;
    Ok(())
}

/// Best-effort mtime/atime stamping of whatever the download produced.
fn stamp_artifacts(folder_dir: &Path, base: &str, timestamp: i64) {
    let mut candidates: Vec<std::path::PathBuf> = ARTIFACT_EXTS
        .iter()
        .map(|ext| folder_dir.join(format!("{base}.{ext}")))
        .collect();
    candidates.push(folder_dir.join("metadata").join(format!("{base}.info.json")));

    for path in candidates.into_iter().filter(|p| p.is_file()) {
        match fsutil::set_file_times(&path, timestamp) {
            Ok(()) => log::debug!("stamped {}", path.display()),
            Err(e) => log::warn!("could not set times on {}: {e}", path.display()),
        }
    }
}
