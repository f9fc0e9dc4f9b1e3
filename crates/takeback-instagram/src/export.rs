//! Instagram activity-export parsing
//!
//! The export wraps every entry in a `string_map_data` / `string_list_data`
//! structure that, for these collections, must hold exactly one record (the
//! save/like event with its `href` and `timestamp`). More than one would
//! mean the vendor changed the schema and the link↔timestamp pairing can
//! no longer be trusted, so that case fails the whole parse. Records that
//! are merely incomplete (no href, no usable timestamp) are skipped.

use std::collections::HashMap;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Deserialize;

use takeback_core::error::ExportError;

use crate::state::{LinkKind, SavedLink, Target};

#[derive(Debug, Deserialize)]
struct SavedExport {
    saved_saved_media: Option<Vec<SavedEntry>>,
}

#[derive(Debug, Deserialize)]
struct SavedEntry {
    #[serde(default)]
    string_map_data: HashMap<String, LinkRecord>,
}

#[derive(Debug, Deserialize)]
struct LikedExport {
    likes_media_likes: Option<Vec<LikedEntry>>,
}

#[derive(Debug, Deserialize)]
struct LikedEntry {
    #[serde(default)]
    string_list_data: Vec<LinkRecord>,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    href: Option<String>,
    timestamp: Option<i64>,
}

/// Parse one collection out of the takeout rooted at `base_dir`.
///
/// Returns links sorted ascending by timestamp (oldest first).
pub fn parse(base_dir: &Path, target: Target) -> Result<Vec<SavedLink>, ExportError> {
    let path = base_dir.join(target.source_path());
    let content = std::fs::read_to_string(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    let records = match target {
        Target::Saved => {
            let export: SavedExport =
                serde_json::from_str(&content).map_err(|source| ExportError::Json {
                    path: path.clone(),
                    source,
                })?;
            let entries = export.saved_saved_media.ok_or_else(|| {
                ExportError::malformed(&path, format!("missing key {:?}", target.source_key()))
            })?;
            entries
                .into_iter()
                .map(|entry| {
                    let count = entry.string_map_data.len();
                    let mut values = entry.string_map_data.into_values();
                    match (values.next(), values.next()) {
                        (Some(record), None) => Ok(record),
                        _ => Err(ExportError::malformed(
                            &path,
                            format!("entry has {count} string_map_data records, expected exactly 1"),
                        )),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        }
        Target::Liked => {
            let export: LikedExport =
                serde_json::from_str(&content).map_err(|source| ExportError::Json {
                    path: path.clone(),
                    source,
                })?;
            let entries = export.likes_media_likes.ok_or_else(|| {
                ExportError::malformed(&path, format!("missing key {:?}", target.source_key()))
            })?;
            entries
                .into_iter()
                .map(|entry| {
                    let count = entry.string_list_data.len();
                    let mut values = entry.string_list_data.into_iter();
                    match (values.next(), values.next()) {
                        (Some(record), None) => Ok(record),
                        _ => Err(ExportError::malformed(
                            &path,
                            format!("entry has {count} string_list_data records, expected exactly 1"),
                        )),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let total = records.len();
    let mut links = Vec::with_capacity(total);
    for record in records {
        let Some(url) = record.href else {
            log::warn!("{target}: entry without href, skipping");
            continue;
        };
        let Some(timestamp) = record.timestamp.filter(|ts| *ts > 0) else {
            log::warn!("{target}: {url} has no usable timestamp, skipping");
            continue;
        };
        let Some(kind) = LinkKind::from_url(&url) else {
            // An unclassifiable URL means the /p/-/reel/-/tv/ taxonomy no
            // longer covers the export.
            return Err(ExportError::malformed(
                &path,
                format!("unrecognized link shape: {url}"),
            ));
        };
        links.push(SavedLink {
            url,
            saved_at: timestamp,
            kind,
        });
    }

    links.sort_by_key(|l| l.saved_at);
    log::info!(
        "{target}: {} links parsed ({} entries skipped)",
        links.len(),
        total - links.len()
    );
    Ok(links)
}

/// Drop links whose URL is in `ignore` — the ephemeral liked∖saved
/// cross-filter, recomputed from the two exports every run.
pub fn exclude(links: Vec<SavedLink>, ignore: &FxHashSet<String>) -> Vec<SavedLink> {
    let before = links.len();
    let kept: Vec<SavedLink> = links
        .into_iter()
        .filter(|l| !ignore.contains(&l.url))
        .collect();
    log::info!("excluded {} overlapping links", before - kept.len());
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_export(target: Target, body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(target.source_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, body).unwrap();
        dir
    }

    fn saved_entry(url: &str, ts: i64) -> String {
        format!(
            r#"{{"string_map_data": {{"Saved on": {{"href": "{url}", "timestamp": {ts}}}}}}}"#
        )
    }

    #[test]
    fn parses_saved_ascending_by_timestamp() {
        let body = format!(
            r#"{{"saved_saved_media": [{}, {}]}}"#,
            saved_entry("https://www.instagram.com/reel/BBB/", 200),
            saved_entry("https://www.instagram.com/p/AAA/", 100),
        );
        let dir = write_export(Target::Saved, &body);

        let links = parse(dir.path(), Target::Saved).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://www.instagram.com/p/AAA/");
        assert_eq!(links[0].kind, LinkKind::Post);
        assert_eq!(links[1].saved_at, 200);
        assert_eq!(links[1].kind, LinkKind::Reel);
    }

    #[test]
    fn two_map_records_is_malformed() {
        let body = r#"{"saved_saved_media": [
            {"string_map_data": {
                "Saved on": {"href": "https://www.instagram.com/p/AAA/", "timestamp": 100},
                "Also on": {"href": "https://www.instagram.com/p/AAA/", "timestamp": 200}
            }}
        ]}"#;
        let dir = write_export(Target::Saved, body);
        let err = parse(dir.path(), Target::Saved).unwrap_err();
        assert!(matches!(err, ExportError::Malformed { .. }));
    }

    #[test]
    fn two_list_records_is_malformed() {
        let body = r#"{"likes_media_likes": [
            {"string_list_data": [
                {"href": "https://www.instagram.com/p/AAA/", "timestamp": 100},
                {"href": "https://www.instagram.com/p/AAA/", "timestamp": 200}
            ]}
        ]}"#;
        let dir = write_export(Target::Liked, body);
        let err = parse(dir.path(), Target::Liked).unwrap_err();
        assert!(matches!(err, ExportError::Malformed { .. }));
    }

    #[test]
    fn missing_top_level_key_is_malformed() {
        let dir = write_export(Target::Saved, r#"{"something_else": []}"#);
        let err = parse(dir.path(), Target::Saved).unwrap_err();
        assert!(matches!(err, ExportError::Malformed { .. }));
    }

    #[test]
    fn incomplete_records_are_skipped_not_fatal() {
        // 4 entries, 2 unusable: missing timestamp, missing href.
        let body = format!(
            r#"{{"saved_saved_media": [
                {},
                {{"string_map_data": {{"Saved on": {{"href": "https://www.instagram.com/p/NOTS/"}}}}}},
                {{"string_map_data": {{"Saved on": {{"timestamp": 300}}}}}},
                {}
            ]}}"#,
            saved_entry("https://www.instagram.com/p/ONE/", 100),
            saved_entry("https://www.instagram.com/tv/TWO/", 400),
        );
        let dir = write_export(Target::Saved, &body);
        let links = parse(dir.path(), Target::Saved).unwrap();
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn unknown_link_shape_is_malformed() {
        let body = format!(
            r#"{{"saved_saved_media": [{}]}}"#,
            saved_entry("https://www.instagram.com/stories/whoever/123/", 100)
        );
        let dir = write_export(Target::Saved, &body);
        let err = parse(dir.path(), Target::Saved).unwrap_err();
        assert!(matches!(err, ExportError::Malformed { .. }));
    }

    #[test]
    fn parses_liked() {
        let body = r#"{"likes_media_likes": [
            {"string_list_data": [{"href": "https://www.instagram.com/reel/XYZ/", "timestamp": 42}]}
        ]}"#;
        let dir = write_export(Target::Liked, body);
        let links = parse(dir.path(), Target::Liked).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].saved_at, 42);
    }

    #[test]
    fn exclude_filters_overlap() {
        let links = vec![
            SavedLink {
                url: "a".into(),
                saved_at: 1,
                kind: LinkKind::Post,
            },
            SavedLink {
                url: "b".into(),
                saved_at: 2,
                kind: LinkKind::Reel,
            },
        ];
        let ignore: FxHashSet<String> = std::iter::once("a".to_string()).collect();
        let kept = exclude(links, &ignore);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "b");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse(dir.path(), Target::Saved).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
