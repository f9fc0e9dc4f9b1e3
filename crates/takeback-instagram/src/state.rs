//! Pipeline state types for the Instagram activity export

use std::fmt;

use takeback_core::fsutil;

/// Which activity collection to archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Posts the account saved.
    Saved,
    /// Posts the account liked.
    Liked,
}

impl Target {
    /// Parse CLI/config string into enum.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "saved" => Some(Self::Saved),
            "liked" => Some(Self::Liked),
            _ => None,
        }
    }

    /// Export file path relative to the takeout root.
    pub fn source_path(&self) -> &'static str {
        match self {
            Self::Saved => "your_instagram_activity/saved/saved_posts.json",
            Self::Liked => "your_instagram_activity/likes/liked_posts.json",
        }
    }

    /// Top-level key holding the entry array in the export JSON.
    pub fn source_key(&self) -> &'static str {
        match self {
            Self::Saved => "saved_saved_media",
            Self::Liked => "likes_media_likes",
        }
    }

    /// Output directory name under the target root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Saved => "instagram-saved",
            Self::Liked => "instagram-liked",
        }
    }

    /// Overlapping collection to subtract. Liked posts that were also
    /// saved are archived by the saved run, so the liked run skips them.
    pub fn excludes(&self) -> Option<Target> {
        match self {
            Self::Saved => None,
            Self::Liked => Some(Self::Saved),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved => f.write_str("saved"),
            Self::Liked => f.write_str("liked"),
        }
    }
}

/// Shape of an Instagram link, derived from its URL path.
///
/// Reels and TVs go through yt-dlp; plain posts go through gallery-dl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Post,
    Reel,
    Tv,
}

impl LinkKind {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.contains("/p/") {
            Some(Self::Post)
        } else if url.contains("/reel/") {
            Some(Self::Reel)
        } else if url.contains("/tv/") {
            Some(Self::Tv)
        } else {
            None
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Reel | Self::Tv)
    }
}

/// One link from the export: the identifier plus when it was saved/liked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedLink {
    pub url: String,
    /// Unix timestamp of the save/like action; used for the filename
    /// prefix and the artifact's filesystem times.
    pub saved_at: i64,
    pub kind: LinkKind,
}

impl SavedLink {
    /// Filename prefix embedding the saved-at time, e.g.
    /// `2024-03-01_18:30:05-`.
    pub fn date_prefix(&self) -> String {
        format!("{}-", fsutil::date_prefix(self.saved_at))
    }
}
