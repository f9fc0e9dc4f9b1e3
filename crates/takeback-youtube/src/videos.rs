//! Copy the Takeout-provided uploaded-video files into the archive
//!
//! Takeout ships the account's own uploads as plain files under
//! `**/ *YouTube*/video/`. No downloading involved — just a copy into one
//! flat directory, suffixing name collisions and preserving mtimes.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use takeback_core::fsutil;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub found: usize,
    pub copied: usize,
    pub failed: usize,
}

impl CopySummary {
    pub fn log(&self) {
        log::info!(
            "uploaded videos: {} found, {} copied, {} failed",
            self.found,
            self.copied,
            self.failed
        );
    }
}

pub fn copy_uploaded_videos(roots: &[PathBuf], output_dir: &Path) -> anyhow::Result<CopySummary> {
    if roots.is_empty() {
        bail!("no takeout roots configured");
    }
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut summary = CopySummary::default();
    for root in roots {
        let pattern = root.join("**/*YouTube*/video/*");
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern)
            .with_context(|| format!("bad glob pattern {pattern}"))?
            .flatten()
            .filter(|p| p.is_file());

        for src in paths {
            summary.found += 1;
            if let Err(e) = copy_one(&src, output_dir) {
                log::warn!("failed to copy {}: {e}", src.display());
                summary.failed += 1;
            } else {
                summary.copied += 1;
            }
        }
    }
    summary.log();
    Ok(summary)
}

fn copy_one(src: &Path, output_dir: &Path) -> std::io::Result<()> {
    let filename = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());
    let dst = fsutil::unique_destination(output_dir, &filename);
    log::debug!("{} -> {}", src.display(), dst.display());
    std::fs::copy(src, &dst)?;

    // Preserve the source's mtime on the copy.
    let modified = std::fs::metadata(src)?.modified()?;
    if let Ok(elapsed) = modified.duration_since(std::time::UNIX_EPOCH) {
        fsutil::set_file_times(&dst, elapsed.as_secs() as i64)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_and_suffixes_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("takeout-a/Takeout/YouTube e YouTube Music/video");
        let b = dir.path().join("takeout-b/Takeout/My YouTube/video");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("holiday.mp4"), b"first").unwrap();
        std::fs::write(b.join("holiday.mp4"), b"second").unwrap();
        std::fs::write(b.join("concert.mp4"), b"third").unwrap();

        let out = dir.path().join("out");
        let summary = copy_uploaded_videos(
            &[dir.path().join("takeout-a"), dir.path().join("takeout-b")],
            &out,
        )
        .unwrap();

        assert_eq!(
            summary,
            CopySummary {
                found: 3,
                copied: 3,
                failed: 0
            }
        );
        assert!(out.join("holiday.mp4").is_file());
        assert!(out.join("holiday_1.mp4").is_file());
        assert!(out.join("concert.mp4").is_file());
    }

    #[test]
    fn skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let video_dir = dir.path().join("takeout/Takeout/YouTube/video");
        std::fs::create_dir_all(video_dir.join("nested-dir")).unwrap();
        std::fs::write(video_dir.join("clip.mp4"), b"x").unwrap();

        let out = dir.path().join("out");
        let summary = copy_uploaded_videos(&[dir.path().join("takeout")], &out).unwrap();
        assert_eq!(summary.found, 1);
        assert_eq!(summary.copied, 1);
    }

    #[test]
    fn no_roots_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(copy_uploaded_videos(&[], &dir.path().join("out")).is_err());
    }
}
