//! Takeout playlist CSV parsing
//!
//! Takeout localizes CSV headers, so columns are found by an alias list
//! rather than position. The video-id column is mandatory — its absence
//! means the export schema changed and the parse fails; the
//! added-timestamp column is optional. Ids are whitespace-trimmed (the
//! exports occasionally pad them) and duplicates keep their first
//! occurrence.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;

use takeback_core::error::ExportError;

use crate::state::PlaylistVideo;

/// Known header spellings for the video-id column.
const ID_HEADERS: &[&str] = &["Video ID", "ID video"];

/// Known header spellings for the playlist-added timestamp column.
const ADDED_HEADERS: &[&str] = &[
    "Playlist Video Creation Timestamp",
    "Timestamp della creazione del video della playlist",
];

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
}

/// Parse one playlist CSV into rows, in file order.
pub fn parse_playlist_csv(path: &Path) -> Result<Vec<PlaylistVideo>, ExportError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let headers = reader
        .headers()
        .map_err(|source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let id_idx = find_column(&headers, ID_HEADERS).ok_or_else(|| {
        ExportError::malformed(path, format!("no video-id column in headers {headers:?}"))
    })?;
    let added_idx = find_column(&headers, ADDED_HEADERS);

    let mut videos = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(video_id) = record.get(id_idx).map(str::trim).filter(|id| !id.is_empty())
        else {
            continue;
        };

        let added_at = match added_idx.and_then(|i| record.get(i)).map(str::trim) {
            None | Some("") => None,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    log::warn!("{video_id}: unparseable timestamp {raw:?} ({e}), skipping row");
                    continue;
                }
            },
        };

        videos.push(PlaylistVideo {
            video_id: video_id.to_string(),
            added_at,
        });
    }
    log::debug!("{}: {} rows", path.display(), videos.len());
    Ok(videos)
}

/// Merge rows from several CSVs, dropping duplicate ids (first wins).
pub fn dedup(videos: Vec<PlaylistVideo>) -> Vec<PlaylistVideo> {
    let mut seen = FxHashSet::default();
    videos
        .into_iter()
        .filter(|v| seen.insert(v.video_id.clone()))
        .collect()
}

/// Find every CSV matching the transfer's globs under any takeout root.
pub fn discover(roots: &[PathBuf], globs: &[String]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in roots {
        for pattern in globs {
            let full = root.join(pattern);
            let full = full.to_string_lossy();
            match glob::glob(&full) {
                Ok(paths) => {
                    for path in paths.flatten() {
                        log::debug!("matched {}", path.display());
                        found.push(path);
                    }
                }
                Err(e) => log::warn!("bad glob pattern {full}: {e}"),
            }
        }
    }
    found.sort();
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn write_csv(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist - video.csv");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_english_headers() {
        let (_dir, path) = write_csv(
            "Video ID,Playlist Video Creation Timestamp\n\
             abc123,2021-05-06T07:08:09+00:00\n\
             def456,2021-05-07T00:00:00Z\n",
        );
        let videos = parse_playlist_csv(&path).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].video_id, "abc123");
        assert_eq!(
            videos[0].added_at,
            Some(Utc.with_ymd_and_hms(2021, 5, 6, 7, 8, 9).unwrap())
        );
    }

    #[test]
    fn parses_italian_headers() {
        let (_dir, path) = write_csv(
            "ID video,Timestamp della creazione del video della playlist\n\
             ghi789,2020-01-02T03:04:05+00:00\n",
        );
        let videos = parse_playlist_csv(&path).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "ghi789");
    }

    #[test]
    fn missing_id_column_is_malformed() {
        let (_dir, path) = write_csv("Some Column,Another\nfoo,bar\n");
        let err = parse_playlist_csv(&path).unwrap_err();
        assert!(matches!(err, ExportError::Malformed { .. }));
    }

    #[test]
    fn ids_are_trimmed_and_blank_rows_dropped() {
        let (_dir, path) = write_csv("Video ID\n  abc123  \n\n   \n");
        let videos = parse_playlist_csv(&path).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "abc123");
    }

    #[test]
    fn unparseable_timestamp_skips_row_only() {
        let (_dir, path) = write_csv(
            "Video ID,Playlist Video Creation Timestamp\n\
             good1,2021-05-06T07:08:09+00:00\n\
             bad99,yesterday afternoon\n\
             good2,2021-05-08T07:08:09+00:00\n",
        );
        let videos = parse_playlist_csv(&path).unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["good1", "good2"]);
    }

    #[test]
    fn missing_timestamp_column_keeps_rows() {
        let (_dir, path) = write_csv("Video ID\nabc123\n");
        let videos = parse_playlist_csv(&path).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].added_at, None);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let videos = vec![
            PlaylistVideo {
                video_id: "a".into(),
                added_at: Some(early),
            },
            PlaylistVideo {
                video_id: "b".into(),
                added_at: None,
            },
            PlaylistVideo {
                video_id: "a".into(),
                added_at: Some(late),
            },
        ];
        let unique = dedup(videos);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].added_at, Some(early));
    }

    #[test]
    fn discover_finds_csvs_across_roots() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("takeout-a/Takeout/YouTube e YouTube Music/playlist");
        let b = dir.path().join("takeout-b/Takeout/My YouTube/playlist");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("mix - video.csv"), "Video ID\n").unwrap();
        std::fs::write(b.join("mix - video.csv"), "Video ID\n").unwrap();
        std::fs::write(b.join("other.txt"), "").unwrap();

        let roots = vec![
            dir.path().join("takeout-a"),
            dir.path().join("takeout-b"),
        ];
        let globs = vec!["Takeout/*YouTube*/playlist/*mix* - video.csv".to_string()];
        let files = discover(&roots, &globs);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn discover_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        let files = discover(
            &[dir.path().to_path_buf()],
            &["Takeout/*YouTube*/playlist/*.csv".to_string()],
        );
        assert!(files.is_empty());
    }
}
