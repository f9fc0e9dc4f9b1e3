//! Tolerant sidecar-metadata extraction
//!
//! yt-dlp and gallery-dl sidecars share no schema, and both formats have
//! drifted over the years — fields are looked up by alias and anything
//! missing or junk ("null", empty, unparseable date) becomes `None`.

use chrono::NaiveDateTime;
use serde_json::Value;

/// The descriptive fields a stamper can use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sidecar {
    pub title: Option<String>,
    pub author: Option<String>,
    /// When the item was posted/uploaded (UTC, naive).
    pub taken_at: Option<NaiveDateTime>,
    pub keywords: Vec<String>,
}

impl Sidecar {
    /// `CreateDate`-style string for exiftool: `YYYY:MM:DD HH:MM:SS`.
    pub fn exif_datetime(&self) -> Option<String> {
        self.taken_at
            .map(|dt| dt.format("%Y:%m:%d %H:%M:%S").to_string())
    }

    /// Unix timestamp for filesystem stamping.
    pub fn unix_timestamp(&self) -> Option<i64> {
        self.taken_at.map(|dt| dt.and_utc().timestamp())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.taken_at.is_none()
            && self.keywords.is_empty()
    }
}

/// Extract the stampable fields from a sidecar document.
pub fn parse(info: &Value) -> Sidecar {
    let title = text(info, &["description", "title"]);
    let author = text(info, &["uploader", "fullname", "channel"]);

    let taken_at = info
        .get("timestamp")
        .and_then(Value::as_i64)
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.naive_utc())
        .or_else(|| {
            // Older gallery-dl sidecars carry a preformatted string.
            info.get("post_date")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
        });

    let keywords = info
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Sidecar {
        title,
        author,
        taken_at,
        keywords,
    }
}

/// First non-junk string among the aliases.
fn text(info: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| info.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty() && *s != "null")
        .map(str::to_string)
}
