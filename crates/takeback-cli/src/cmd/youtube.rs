//! YouTube subcommands - fetch playlist transfers, copy uploaded videos

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use takeback_core::SharedProgress;
use takeback_youtube::{runner, videos, Config as YtConfig, Transfer, TransferKind};

use crate::config::{Config, TransferSpec};

#[derive(Args, Debug)]
pub struct YoutubeArgs {
    #[command(subcommand)]
    pub action: YoutubeAction,
}

#[derive(Subcommand, Debug)]
pub enum YoutubeAction {
    /// Download configured playlist transfers
    Fetch(FetchArgs),
    /// Copy the Takeout-provided uploaded-video files into the archive
    Videos,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Transfer names to run (default: all configured)
    #[arg(short, long)]
    pub transfer: Vec<String>,

    /// Plan and report only; download nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum videos to fetch per transfer this run
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

fn to_transfer(spec: &TransferSpec) -> Result<Transfer> {
    let kind = TransferKind::from_name(&spec.kind).with_context(|| {
        format!(
            "transfer {:?} has unknown kind {:?} (expected audio, video, or metadata)",
            spec.name, spec.kind
        )
    })?;
    Ok(Transfer {
        name: spec.name.clone(),
        folder: spec.folder.clone(),
        kind,
        globs: spec.globs.clone(),
    })
}

pub fn run(args: YoutubeArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let roots = config.youtube.all_roots();

    match args.action {
        YoutubeAction::Fetch(fetch) => {
            let mut transfers = config
                .youtube
                .transfers
                .iter()
                .map(to_transfer)
                .collect::<Result<Vec<_>>>()?;

            if !fetch.transfer.is_empty() {
                let known: Vec<String> = transfers.iter().map(|t| t.name.clone()).collect();
                for requested in &fetch.transfer {
                    if !known.contains(requested) {
                        bail!("unknown transfer {requested:?}, configured: {known:?}");
                    }
                }
                transfers.retain(|t| fetch.transfer.contains(&t.name));
            }

            let cfg = YtConfig {
                output_dir: config.dirs.target_dir.join("youtube-playlists"),
                takeout_roots: roots,
                transfers,
                ledger_file: config.dirs.cache_dir.join("youtube-playlist-done.csv"),
                blacklist_file: config.dirs.cache_dir.join("youtube-blacklist.json"),
                pacing: config.pacing.to_pacing()?,
                dry_run: fetch.dry_run,
                limit: fetch.limit,
            };

            log::info!("Fetching youtube playlists");
            log::info!("  Output: {}", cfg.output_dir.display());

            crate::setup_signal_handler();
            let summary = runner::run(&cfg, progress)?;

            let mut rows = Vec::new();
            for outcome in &summary.outcomes {
                let value = match (&outcome.counts, &outcome.report) {
                    (None, _) => "no playlist files found".to_string(),
                    (Some(counts), None) => format!(
                        "{} total, {} done, {} blacklisted, {} remaining",
                        counts.total, counts.done, counts.blacklisted, counts.remaining
                    ),
                    (Some(_), Some(report)) => super::report_row(report),
                };
                rows.push((outcome.name.as_str(), value));
            }
            super::print_summary("YouTube playlists", &rows);

            if summary.interrupted() {
                log::warn!("interrupted; the next run resumes from the ledger");
            }
            Ok(())
        }
        YoutubeAction::Videos => {
            let output_dir = config.dirs.target_dir.join("youtube-videos");
            let summary = videos::copy_uploaded_videos(&roots, &output_dir)?;
            super::print_summary(
                "YouTube videos",
                &[
                    ("Found", format!("{}", summary.found)),
                    ("Copied", format!("{}", summary.copied)),
                    ("Failed", format!("{}", summary.failed)),
                ],
            );
            Ok(())
        }
    }
}
