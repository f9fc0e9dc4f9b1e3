//! Pipeline state types for the YouTube Takeout pipeline

use std::fmt;

use chrono::{DateTime, Utc};

/// How a transfer's videos are materialized on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Extract audio to mp3 with embedded thumbnail and metadata.
    Audio,
    /// Best available mux to mp4.
    Video,
    /// Info JSON + thumbnail only, no media download.
    Metadata,
}

impl TransferKind {
    /// Parse CLI/config string into enum.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "metadata" => Some(Self::Metadata),
            _ => None,
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
            Self::Metadata => f.write_str("metadata"),
        }
    }
}

/// A named playlist transfer: which CSVs feed it and how to download.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub name: String,
    /// Output folder under the pipeline's output root.
    pub folder: String,
    pub kind: TransferKind,
    /// Glob patterns relative to each takeout root.
    pub globs: Vec<String>,
}

/// One row from a playlist CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistVideo {
    pub video_id: String,
    /// When the video was added to the playlist; `None` when the export
    /// carried no timestamp column.
    pub added_at: Option<DateTime<Utc>>,
}

impl PlaylistVideo {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_name() {
        assert_eq!(TransferKind::from_name("audio"), Some(TransferKind::Audio));
        assert_eq!(TransferKind::from_name("video"), Some(TransferKind::Video));
        assert_eq!(
            TransferKind::from_name("metadata"),
            Some(TransferKind::Metadata)
        );
        assert_eq!(TransferKind::from_name("Audio"), None);
        assert_eq!(TransferKind::from_name(""), None);
    }

    #[test]
    fn watch_url() {
        let video = PlaylistVideo {
            video_id: "dQw4w9WgXcQ".into(),
            added_at: None,
        };
        assert_eq!(video.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
