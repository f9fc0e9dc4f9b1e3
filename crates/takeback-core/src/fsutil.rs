//! Filename derivation and filesystem stamping helpers

use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use chrono::{Local, TimeZone};

/// Reduce free-form text (titles, channel names) to a safe filename part:
/// alphanumerics and ` ._-` survive, everything else becomes `_`, and the
/// trimmed result has spaces collapsed to underscores.
pub fn slugify(value: &str) -> String {
    let kept: String = value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || " ._-".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    kept.trim().replace(' ', "_")
}

/// Convert a URL to a safe filename: keep host + path, drop scheme, query
/// and fragment, replace forbidden characters with underscores, append an
/// extension.
pub fn safe_filename(url: &str, ext: &str) -> String {
    let core = url.split_once("://").map_or(url, |(_, rest)| rest);
    let core = core.split(['?', '#']).next().unwrap_or(core);
    let core = core.trim_end_matches('/');
    let safe: String = core
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "._-".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}{ext}")
}

/// Pick a destination path in `dir` for `filename`, suffixing `_1`, `_2`, …
/// before the extension until the name is free.
pub fn unique_destination(dir: &Path, filename: &str) -> PathBuf {
    let mut dst = dir.join(filename);
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((s, e)) => (s.to_string(), format!(".{e}")),
        None => (filename.to_string(), String::new()),
    };
    let mut i = 1;
    while dst.exists() {
        dst = dir.join(format!("{stem}_{i}{ext}"));
        i += 1;
    }
    dst
}

/// Set a file's modification and access times to a Unix timestamp.
/// Pre-epoch timestamps clamp to the epoch.
pub fn set_file_times(path: &Path, timestamp: i64) -> std::io::Result<()> {
    let time = if timestamp >= 0 {
        UNIX_EPOCH + Duration::from_secs(timestamp as u64)
    } else {
        UNIX_EPOCH
    };
    let times = std::fs::FileTimes::new()
        .set_modified(time)
        .set_accessed(time);
    let file = std::fs::File::options().write(true).open(path)?;
    file.set_times(times)
}

/// Local-time filename prefix for an epoch timestamp: `2024-03-01_18:30:05`.
pub fn date_prefix(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d_%H:%M:%S").to_string(),
        None => "unknown-date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_keeps_safe_chars() {
        assert_eq!(slugify("My Video - part.2"), "My_Video_-_part.2");
        assert_eq!(slugify("caffè & co?"), "caffè___co_");
        assert_eq!(slugify("  padded  "), "padded");
    }

    #[test]
    fn safe_filename_strips_scheme_and_query() {
        assert_eq!(
            safe_filename("https://www.instagram.com/reel/DE_gK8Fp_WS/", ".json"),
            "www.instagram.com_reel_DE_gK8Fp_WS.json"
        );
        assert_eq!(
            safe_filename("https://example.com/a/b?q=1", ".txt"),
            "example.com_a_b.txt"
        );
    }

    #[test]
    fn unique_destination_suffixes_collisions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("clip_1.mp4"), b"x").unwrap();

        let dst = unique_destination(dir.path(), "clip.mp4");
        assert_eq!(dst, dir.path().join("clip_2.mp4"));

        let free = unique_destination(dir.path(), "other.mp4");
        assert_eq!(free, dir.path().join("other.mp4"));
    }

    #[test]
    fn unique_destination_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"x").unwrap();
        assert_eq!(
            unique_destination(dir.path(), "README"),
            dir.path().join("README_1")
        );
    }

    #[test]
    fn set_file_times_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"x").unwrap();

        let ts = 1_600_000_000i64;
        set_file_times(&path, ts).unwrap();

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        let secs = modified.duration_since(UNIX_EPOCH).unwrap().as_secs();
        assert_eq!(secs, ts as u64);
    }

    #[test]
    fn date_prefix_shape() {
        let prefix = date_prefix(1_600_000_000);
        // Exact value depends on the local timezone; check the shape.
        assert_eq!(prefix.len(), 19);
        assert_eq!(&prefix[4..5], "-");
        assert_eq!(&prefix[10..11], "_");
        assert_eq!(&prefix[13..14], ":");
    }
}
