//! Message-thread media export
//!
//! Walks the takeout's message inbox, copies photo/video/audio attachments
//! into a flat media tree with thread/sender/timestamp names and correct
//! file times, and writes the normalized messages as chunked JSONL plus a
//! thread index. Copy failures are per-item warnings; the export never
//! stops for one broken attachment.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use takeback_core::fsutil;

/// Messages per JSONL chunk file.
const CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Deserialize)]
struct ThreadFile {
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    messages: Vec<RawMessage>,
    title: Option<String>,
    thread_path: Option<String>,
    is_still_participant: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Participant {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    sender_name: Option<String>,
    timestamp_ms: Option<i64>,
    content: Option<String>,
    #[serde(default)]
    photos: Vec<MediaRef>,
    #[serde(default)]
    videos: Vec<MediaRef>,
    #[serde(default)]
    audio_files: Vec<MediaRef>,
    share: Option<Share>,
    #[serde(default)]
    reactions: Vec<RawReaction>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Share {
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReaction {
    reaction: Option<String>,
    actor: Option<String>,
}

#[derive(Debug, Serialize)]
struct Reaction {
    actor: String,
    reaction: String,
}

/// Normalized message record written to the JSONL chunks.
#[derive(Debug, Serialize)]
struct MessageRecord {
    thread_id: String,
    index_in_thread: usize,
    global_index: usize,
    timestamp: String,
    sender: Option<String>,
    text: Option<String>,
    audio: Vec<String>,
    photos: Vec<String>,
    videos: Vec<String>,
    shared_link: Option<String>,
    reactions: Vec<Reaction>,
}

#[derive(Debug, Serialize)]
struct ThreadRecord {
    thread_id: String,
    title: String,
    participants: Vec<String>,
    is_still_participant: bool,
    message_count: usize,
}

#[derive(Debug, Default)]
pub struct MessagesSummary {
    pub threads: usize,
    pub messages: usize,
    pub media_copied: usize,
    pub media_failed: usize,
}

impl MessagesSummary {
    pub fn log(&self) {
        log::info!(
            "messages: {} threads, {} messages, {} media copied ({} failed)",
            self.threads,
            self.messages,
            self.media_copied,
            self.media_failed
        );
    }
}

/// Export the whole inbox under `base_dir` into `output_dir`.
pub fn export(base_dir: &Path, output_dir: &Path) -> anyhow::Result<MessagesSummary> {
    let inbox = base_dir.join("your_instagram_activity/messages/inbox");
    if !inbox.is_dir() {
        bail!("message inbox not found: {}", inbox.display());
    }

    for sub in ["messages", "media/audio", "media/photos", "media/videos"] {
        std::fs::create_dir_all(output_dir.join(sub))
            .with_context(|| format!("creating {}", output_dir.join(sub).display()))?;
    }

    let mut thread_dirs: Vec<PathBuf> = std::fs::read_dir(&inbox)
        .with_context(|| format!("reading {}", inbox.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    thread_dirs.sort();
    log::info!("found {} threads", thread_dirs.len());

    let mut summary = MessagesSummary::default();
    let mut all_messages: Vec<MessageRecord> = Vec::new();
    let mut threads: Vec<ThreadRecord> = Vec::new();

    for thread_dir in &thread_dirs {
        match export_thread(base_dir, output_dir, thread_dir, &mut all_messages, &mut summary) {
            Ok(record) => threads.push(record),
            Err(e) => log::warn!("skipping thread {}: {e:#}", thread_dir.display()),
        }
    }

    summary.threads = threads.len();
    summary.messages = all_messages.len();

    write_chunks(output_dir, &all_messages)?;
    write_jsonl(&output_dir.join("threads.jsonl"), &threads)?;

    let metadata = serde_json::json!({
        "export_date": Utc::now().to_rfc3339(),
        "generator": "takeback",
        "total_threads": summary.threads,
        "total_messages": summary.messages,
    });
    std::fs::write(
        output_dir.join("metadata.json"),
        serde_json::to_vec_pretty(&metadata)?,
    )?;

    summary.log();
    Ok(summary)
}

fn export_thread(
    base_dir: &Path,
    output_dir: &Path,
    thread_dir: &Path,
    all_messages: &mut Vec<MessageRecord>,
    summary: &mut MessagesSummary,
) -> anyhow::Result<ThreadRecord> {
    let thread_name = thread_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut message_files: Vec<PathBuf> = std::fs::read_dir(thread_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("message_") && n.ends_with(".json"))
        })
        .collect();
    message_files.sort();
    if message_files.is_empty() {
        bail!("no message_*.json files");
    }

    let first: ThreadFile = read_thread_file(&message_files[0])?;
    let thread_id = first.thread_path.clone().unwrap_or_else(|| thread_name.clone());
    let title = first.title.clone().unwrap_or_else(|| "Untitled".into());
    let participants: Vec<String> = first
        .participants
        .iter()
        .filter_map(|p| p.name.clone())
        .collect();
    let is_still_participant = first.is_still_participant.unwrap_or(false);

    let mut count = 0usize;
    for file in &message_files {
        let data = read_thread_file(file)?;
        for message in &data.messages {
            let Some(ts_ms) = message.timestamp_ms else {
                log::warn!("{thread_name}: message without timestamp, skipping");
                continue;
            };
            let timestamp = iso_utc(ts_ms);
            let record = MessageRecord {
                thread_id: thread_id.clone(),
                index_in_thread: count,
                global_index: all_messages.len(),
                timestamp: timestamp.clone(),
                sender: message.sender_name.clone(),
                text: message.content.clone(),
                audio: copy_all(
                    base_dir,
                    &output_dir.join("media/audio"),
                    output_dir,
                    &message.audio_files,
                    &thread_name,
                    message.sender_name.as_deref(),
                    &timestamp,
                    ts_ms,
                    summary,
                ),
                photos: copy_all(
                    base_dir,
                    &output_dir.join("media/photos"),
                    output_dir,
                    &message.photos,
                    &thread_name,
                    message.sender_name.as_deref(),
                    &timestamp,
                    ts_ms,
                    summary,
                ),
                videos: copy_all(
                    base_dir,
                    &output_dir.join("media/videos"),
                    output_dir,
                    &message.videos,
                    &thread_name,
                    message.sender_name.as_deref(),
                    &timestamp,
                    ts_ms,
                    summary,
                ),
                shared_link: message.share.as_ref().and_then(|s| s.link.clone()),
                reactions: message
                    .reactions
                    .iter()
                    .filter_map(|r| {
                        Some(Reaction {
                            actor: r.actor.clone()?,
                            reaction: r.reaction.clone()?,
                        })
                    })
                    .collect(),
            };
            all_messages.push(record);
            count += 1;
        }
    }

    Ok(ThreadRecord {
        thread_id,
        title,
        participants,
        is_still_participant,
        message_count: count,
    })
}

fn read_thread_file(path: &Path) -> anyhow::Result<ThreadFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Copy one message's attachments of a kind; returns the relative paths of
/// the copies that succeeded.
#[allow(clippy::too_many_arguments)]
fn copy_all(
    base_dir: &Path,
    dst_dir: &Path,
    output_dir: &Path,
    refs: &[MediaRef],
    thread_name: &str,
    sender: Option<&str>,
    timestamp_iso: &str,
    ts_ms: i64,
    summary: &mut MessagesSummary,
) -> Vec<String> {
    let mut copied = Vec::new();
    for media in refs {
        let Some(uri) = &media.uri else { continue };
        let src = base_dir.join(uri);
        if !src.is_file() {
            log::warn!("attachment missing: {}", src.display());
            summary.media_failed += 1;
            continue;
        }
        let original = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let new_name = format!(
            "{thread_name}__{}__{timestamp_iso}__{original}",
            sender.unwrap_or("unknown")
        );
        let dst = dst_dir.join(&new_name);
        match std::fs::copy(&src, &dst) {
            Ok(_) => {
                if let Err(e) = fsutil::set_file_times(&dst, ts_ms / 1000) {
                    log::warn!("could not set times on {}: {e}", dst.display());
                }
                if let Ok(rel) = dst.strip_prefix(output_dir) {
                    copied.push(rel.to_string_lossy().into_owned());
                }
                summary.media_copied += 1;
            }
            Err(e) => {
                log::warn!("failed to copy {} -> {}: {e}", src.display(), dst.display());
                summary.media_failed += 1;
            }
        }
    }
    copied
}

fn iso_utc(ts_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ts_ms) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => "1970-01-01T00:00:00Z".to_string(),
    }
}

fn write_chunks(output_dir: &Path, messages: &[MessageRecord]) -> anyhow::Result<usize> {
    let mut chunk_index = 0;
    for chunk in messages.chunks(CHUNK_SIZE) {
        let path = output_dir
            .join("messages")
            .join(format!("messages_part_{chunk_index:04}.jsonl"));
        write_jsonl(&path, chunk)?;
        chunk_index += 1;
    }
    log::info!("wrote {chunk_index} message chunk files");
    Ok(chunk_index)
}

fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> anyhow::Result<()> {
    use std::io::Write;

    let mut out = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(thread_json: &str) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("export");
        let thread = base.join("your_instagram_activity/messages/inbox/friend_123");
        std::fs::create_dir_all(&thread).unwrap();
        std::fs::write(thread.join("message_1.json"), thread_json).unwrap();
        let out = dir.path().join("out");
        (dir, base, out)
    }

    #[test]
    fn exports_messages_and_media() {
        let thread_json = r#"{
            "participants": [{"name": "Me"}, {"name": "Friend"}],
            "title": "Friend",
            "thread_path": "inbox/friend_123",
            "is_still_participant": true,
            "messages": [
                {
                    "sender_name": "Friend",
                    "timestamp_ms": 1600000000000,
                    "content": "look at this",
                    "photos": [{"uri": "media/pic.jpg"}]
                },
                {
                    "sender_name": "Me",
                    "timestamp_ms": 1600000060000,
                    "content": "nice"
                }
            ]
        }"#;
        let (_dir, base, out) = setup(thread_json);
        std::fs::create_dir_all(base.join("media")).unwrap();
        std::fs::write(base.join("media/pic.jpg"), b"jpeg").unwrap();

        let summary = export(&base, &out).unwrap();
        assert_eq!(summary.threads, 1);
        assert_eq!(summary.messages, 2);
        assert_eq!(summary.media_copied, 1);
        assert_eq!(summary.media_failed, 0);

        let chunk = std::fs::read_to_string(out.join("messages/messages_part_0000.jsonl")).unwrap();
        assert_eq!(chunk.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(chunk.lines().next().unwrap()).unwrap();
        assert_eq!(first["sender"], "Friend");
        assert_eq!(first["timestamp"], "2020-09-13T12:26:40Z");
        assert_eq!(first["photos"].as_array().unwrap().len(), 1);

        let threads = std::fs::read_to_string(out.join("threads.jsonl")).unwrap();
        let thread: serde_json::Value = serde_json::from_str(threads.trim()).unwrap();
        assert_eq!(thread["message_count"], 2);
        assert_eq!(thread["participants"].as_array().unwrap().len(), 2);

        // Copied media is renamed and timestamped.
        let media: Vec<_> = std::fs::read_dir(out.join("media/photos"))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(media.len(), 1);
        let name = media[0].file_name().to_string_lossy().into_owned();
        assert!(name.starts_with("friend_123__Friend__2020-09-13T12:26:40Z__pic.jpg"));
    }

    #[test]
    fn missing_attachment_counts_failed() {
        let thread_json = r#"{
            "title": "T",
            "messages": [
                {"sender_name": "A", "timestamp_ms": 1600000000000,
                 "photos": [{"uri": "media/not-there.jpg"}]}
            ]
        }"#;
        let (_dir, base, out) = setup(thread_json);
        let summary = export(&base, &out).unwrap();
        assert_eq!(summary.messages, 1);
        assert_eq!(summary.media_failed, 1);
    }

    #[test]
    fn message_without_timestamp_is_skipped() {
        let thread_json = r#"{
            "title": "T",
            "messages": [
                {"sender_name": "A", "content": "no ts"},
                {"sender_name": "A", "timestamp_ms": 1600000000000, "content": "ok"}
            ]
        }"#;
        let (_dir, base, out) = setup(thread_json);
        let summary = export(&base, &out).unwrap();
        assert_eq!(summary.messages, 1);
    }

    #[test]
    fn missing_inbox_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export(&dir.path().join("nope"), &dir.path().join("out")).is_err());
    }
}
