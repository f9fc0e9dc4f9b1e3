//! Main execution logic for the YouTube playlist pipeline

use anyhow::{bail, Context};

use takeback_core::{
    interrupt_requested, planner, run_batch, BatchReport, Blacklist, Ledger, PlanCounts,
    ProgressContext,
};

use crate::config::Config;
use crate::state::PlaylistVideo;
use crate::{export, fetcher};

/// Outcome for one transfer within a run.
#[derive(Debug)]
pub struct TransferOutcome {
    pub name: String,
    pub counts: Option<PlanCounts>,
    pub report: Option<BatchReport>,
}

/// Pipeline execution summary.
#[derive(Debug, Default)]
pub struct Summary {
    pub outcomes: Vec<TransferOutcome>,
}

impl Summary {
    pub fn interrupted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.report.as_ref().is_some_and(|r| r.interrupted))
    }
}

/// Run every configured transfer: discover CSVs, plan, fetch, record.
pub fn run(cfg: &Config, progress: &ProgressContext) -> anyhow::Result<Summary> {
    if cfg.takeout_roots.is_empty() {
        bail!("no takeout roots configured (set GOOGLE_BASE_DIRS or [youtube].takeout_dirs)");
    }
    if !cfg.takeout_roots.iter().any(|r| r.is_dir()) {
        bail!(
            "none of the takeout roots exist: {:?} — nothing to do",
            cfg.takeout_roots
        );
    }

    let blacklist = Blacklist::load(&cfg.blacklist_file)
        .with_context(|| format!("loading {}", cfg.blacklist_file.display()))?;
    let mut ledger = Ledger::load(&cfg.ledger_file)
        .with_context(|| format!("loading {}", cfg.ledger_file.display()))?;
    log::info!(
        "{} videos already in the ledger, {} blacklisted",
        ledger.len(),
        blacklist.len()
    );

    let mut summary = Summary::default();

    for transfer in &cfg.transfers {
        let files = export::discover(&cfg.takeout_roots, &transfer.globs);
        if files.is_empty() {
            log::warn!("{}: no playlist files found", transfer.name);
            summary.outcomes.push(TransferOutcome {
                name: transfer.name.clone(),
                counts: None,
                report: None,
            });
            continue;
        }
        log::info!("{}: {} playlist file(s)", transfer.name, files.len());

        let mut videos: Vec<PlaylistVideo> = Vec::new();
        for file in &files {
            videos.extend(export::parse_playlist_csv(file)?);
        }
        let videos = export::dedup(videos);

        let plan = planner::plan(videos, |v| v.video_id.as_str(), &blacklist, ledger.ids());
        let mut queue = plan.queue;
        if let Some(limit) = cfg.limit {
            queue.truncate(limit);
        }

        if cfg.dry_run {
            log::info!("{}: dry run, skipping downloads", transfer.name);
            summary.outcomes.push(TransferOutcome {
                name: transfer.name.clone(),
                counts: Some(plan.counts),
                report: None,
            });
            continue;
        }

        std::fs::create_dir_all(cfg.output_dir.join(&transfer.folder).join("metadata"))
            .with_context(|| format!("creating output dirs for {}", transfer.name))?;

        let pb = progress.batch_bar(&transfer.name, queue.len());
        let report = run_batch(
            &format!("youtube {}", transfer.name),
            &queue,
            |v| v.video_id.as_str(),
            &cfg.pacing,
            &pb,
            interrupt_requested,
            |video| fetcher::fetch(cfg, transfer, video),
            |_, row| ledger.append(row),
        )?;
        let interrupted = report.interrupted;
        summary.outcomes.push(TransferOutcome {
            name: transfer.name.clone(),
            counts: Some(plan.counts),
            report: Some(report),
        });
        if interrupted {
            break;
        }
    }

    Ok(summary)
}
