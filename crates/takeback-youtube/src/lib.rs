//! YouTube Takeout pipeline
//!
//! Parses playlist CSVs out of Google Takeout archives, plans the
//! still-missing videos against the ledger and blacklist, downloads them
//! through yt-dlp in the transfer's mode (audio/video/metadata-only), and
//! records each success in the CSV ledger. Also copies the
//! Takeout-provided uploaded-video files into the archive.

pub mod config;
pub mod export;
pub mod fetcher;
pub mod runner;
pub mod state;
pub mod videos;

pub use config::Config;
pub use runner::{run, Summary, TransferOutcome};
pub use state::{PlaylistVideo, Transfer, TransferKind};
