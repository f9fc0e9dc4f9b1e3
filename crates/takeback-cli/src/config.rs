//! Configuration loading from TOML files and the environment
//!
//! One explicit `Config` is built at process start and handed into each
//! pipeline — no import-time globals. Environment variables fill defaults
//! for anything the file omits, so bare `TARGET_DIR=... takeback ...`
//! invocations keep working without a config file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use takeback_core::Pacing;

/// Global configuration for takeback.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub dirs: DirsConfig,
    pub pacing: PacingConfig,
    pub instagram: InstagramConfig,
    pub youtube: YoutubeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirsConfig {
    /// Root for everything this tool writes.
    pub target_dir: PathBuf,
    /// Bookkeeping files: done lists, blacklists, cookies, archives.
    pub cache_dir: PathBuf,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            target_dir: std::env::var("TARGET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("takeout-downloaded")),
            cache_dir: PathBuf::from("cache"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: env_u64("SLEEP_MIN", 10),
            max_secs: env_u64("SLEEP_MAX", 20),
        }
    }
}

impl PacingConfig {
    pub fn to_pacing(self) -> Result<Pacing> {
        Pacing::new(self.min_secs, self.max_secs).with_context(|| {
            format!(
                "invalid pacing range: min_secs={} > max_secs={}",
                self.min_secs, self.max_secs
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstagramConfig {
    /// Root of the extracted Instagram takeout archive.
    #[serde(deserialize_with = "de_opt_path")]
    pub base_dir: Option<PathBuf>,
    /// Netscape cookies file for yt-dlp / gallery-dl. Defaults to
    /// `<cache_dir>/cookies.Facebook.txt`.
    pub cookies_file: Option<PathBuf>,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::var("INSTAGRAM_BASE_DIR").ok().map(PathBuf::from),
            cookies_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Roots of extracted Google Takeout archives. The `GOOGLE_BASE_DIRS`
    /// environment variable is a `:`-delimited path list.
    pub takeout_dirs: Vec<PathBuf>,
    /// Extra manually-assembled root searched alongside the takeouts.
    #[serde(deserialize_with = "de_opt_path")]
    pub manual_dir: Option<PathBuf>,
    pub transfers: Vec<TransferSpec>,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            takeout_dirs: std::env::var("GOOGLE_BASE_DIRS")
                .map(|v| split_path_list(&v))
                .unwrap_or_default(),
            manual_dir: std::env::var("MANUAL_BASE_DIR").ok().map(PathBuf::from),
            transfers: default_transfers(),
        }
    }
}

impl YoutubeConfig {
    /// All roots to glob for playlist CSVs, takeouts first.
    pub fn all_roots(&self) -> Vec<PathBuf> {
        let mut roots = self.takeout_dirs.clone();
        if let Some(manual) = &self.manual_dir {
            roots.push(manual.clone());
        }
        roots
    }
}

/// One named playlist transfer as configured in TOML.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TransferSpec {
    pub name: String,
    /// Output folder under `<target_dir>/youtube-playlists/`.
    pub folder: String,
    /// `audio`, `video`, or `metadata`.
    pub kind: String,
    pub globs: Vec<String>,
}

fn default_transfers() -> Vec<TransferSpec> {
    vec![
        TransferSpec {
            name: "liked".into(),
            folder: "playlist-liked".into(),
            kind: "metadata".into(),
            globs: vec!["my_youtube_playlist_likes/my_youtube_playlist_likes.csv".into()],
        },
        TransferSpec {
            name: "favorites".into(),
            folder: "playlist-favorites".into(),
            kind: "metadata".into(),
            globs: vec!["Takeout/*YouTube*/playlist/*Favorites* - video.csv".into()],
        },
    ]
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            log::warn!("ignoring non-numeric {name}={v}");
            default
        }),
        Err(_) => default,
    }
}

/// Split a `:`-delimited path list — the explicit replacement for the
/// original scripts' habit of eval-ing a Python list out of the
/// environment. Config text is never interpreted as code.
pub fn split_path_list(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Expand `${VAR}` to the environment value; literal strings pass through.
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(name).ok()
    } else {
        Some(s.to_string())
    }
}

fn de_opt_path<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)).map(PathBuf::from))
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Search order:
    /// 1. `./takeback.toml`
    /// 2. `~/.config/takeback/config.toml`
    ///
    /// Falls back to environment-seeded defaults when neither exists.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("takeback.toml");
        if local.exists() {
            return Self::from_file(&local);
        }
        if let Some(dirs) = directories::ProjectDirs::from("", "", "takeback") {
            let user = dirs.config_dir().join("config.toml");
            if user.exists() {
                return Self::from_file(&user);
            }
        }
        log::debug!("no config file found, using env/default configuration");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn cookies_file(&self) -> PathBuf {
        self.instagram
            .cookies_file
            .clone()
            .unwrap_or_else(|| self.dirs.cache_dir.join("cookies.Facebook.txt"))
    }
}
