//! End-to-end planning tests for the Instagram pipeline (dry-run, no
//! external tools touched).

use std::path::Path;

use takeback_core::{Pacing, ProgressContext};
use takeback_instagram::{runner, Config, Target};

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn saved_json(entries: &[(&str, i64)]) -> String {
    let entries: Vec<String> = entries
        .iter()
        .map(|(url, ts)| {
            format!(
                r#"{{"string_map_data": {{"Saved on": {{"href": "{url}", "timestamp": {ts}}}}}}}"#
            )
        })
        .collect();
    format!(r#"{{"saved_saved_media": [{}]}}"#, entries.join(","))
}

fn liked_json(entries: &[(&str, i64)]) -> String {
    let entries: Vec<String> = entries
        .iter()
        .map(|(url, ts)| {
            format!(r#"{{"string_list_data": [{{"href": "{url}", "timestamp": {ts}}}]}}"#)
        })
        .collect();
    format!(r#"{{"likes_media_likes": [{}]}}"#, entries.join(","))
}

fn config(root: &Path) -> Config {
    Config {
        base_dir: root.join("export"),
        output_dir: root.join("out"),
        cookies_file: root.join("cookies.txt"),
        done_file: root.join("cache/instagram-done.json"),
        blacklist_file: root.join("cache/instagram-blacklist.json"),
        archive_file: root.join("cache/gallery-dl-done.sqlite3"),
        pacing: Pacing::new(0, 0).unwrap(),
        dry_run: true,
    }
}

#[test]
fn plan_excludes_blacklisted_and_done() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());

    write(
        &cfg.base_dir.join(Target::Saved.source_path()),
        &saved_json(&[
            ("https://www.instagram.com/p/AAA/", 100),
            ("https://www.instagram.com/reel/BBB/", 200),
            ("https://www.instagram.com/tv/CCC/", 300),
        ]),
    );
    write(
        &cfg.blacklist_file,
        r#"["https://www.instagram.com/reel/BBB/"]"#,
    );
    write(&cfg.done_file, r#"["https://www.instagram.com/p/AAA/"]"#);

    let progress = ProgressContext::new();
    let summary = runner::run(&cfg, Target::Saved, &progress).unwrap();

    assert_eq!(summary.counts.total, 3);
    assert_eq!(summary.counts.blacklisted, 1);
    assert_eq!(summary.counts.done, 1);
    assert_eq!(summary.counts.remaining, 1);
    // Dry run: no batches, no store writes.
    assert!(summary.videos.is_none());
    assert!(summary.posts.is_none());
}

#[test]
fn liked_run_subtracts_saved_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());

    write(
        &cfg.base_dir.join(Target::Saved.source_path()),
        &saved_json(&[("https://www.instagram.com/p/SHARED/", 100)]),
    );
    write(
        &cfg.base_dir.join(Target::Liked.source_path()),
        &liked_json(&[
            ("https://www.instagram.com/p/SHARED/", 150),
            ("https://www.instagram.com/reel/ONLYLIKED/", 250),
        ]),
    );

    let progress = ProgressContext::new();
    let summary = runner::run(&cfg, Target::Liked, &progress).unwrap();

    assert_eq!(summary.counts.total, 1);
    assert_eq!(summary.counts.remaining, 1);
}

#[test]
fn missing_export_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let progress = ProgressContext::new();
    assert!(runner::run(&cfg, Target::Saved, &progress).is_err());
}
