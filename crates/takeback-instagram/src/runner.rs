//! Main execution logic for the Instagram pipeline

use anyhow::{bail, Context};
use rustc_hash::FxHashSet;

use takeback_core::{
    interrupt_requested, planner, run_batch, BatchReport, Blacklist, DoneList, PlanCounts,
    ProgressContext,
};

use crate::config::Config;
use crate::state::{SavedLink, Target};
use crate::{export, fetcher};

/// Pipeline execution summary.
#[derive(Debug)]
pub struct Summary {
    pub target: Target,
    pub counts: PlanCounts,
    pub videos: Option<BatchReport>,
    pub posts: Option<BatchReport>,
}

impl Summary {
    pub fn interrupted(&self) -> bool {
        self.videos.as_ref().is_some_and(|r| r.interrupted)
            || self.posts.as_ref().is_some_and(|r| r.interrupted)
    }
}

/// Run one target's archive pass: parse, plan, fetch, record.
pub fn run(cfg: &Config, target: Target, progress: &ProgressContext) -> anyhow::Result<Summary> {
    if !cfg.base_dir.is_dir() {
        bail!(
            "Instagram export root not found: {} — nothing to do",
            cfg.base_dir.display()
        );
    }

    log::info!("instagram {target}: parsing export under {}", cfg.base_dir.display());
    let links = export::parse(&cfg.base_dir, target)?;

    // Liked posts that are also saved get archived by the saved run; the
    // overlap is recomputed from the two exports, never persisted.
    let links = match target.excludes() {
        Some(other) => {
            let ignore: FxHashSet<String> = export::parse(&cfg.base_dir, other)?
                .into_iter()
                .map(|l| l.url)
                .collect();
            export::exclude(links, &ignore)
        }
        None => links,
    };

    let blacklist = Blacklist::load(&cfg.blacklist_file)
        .with_context(|| format!("loading {}", cfg.blacklist_file.display()))?;
    let mut done = DoneList::load(&cfg.done_file)
        .with_context(|| format!("loading {}", cfg.done_file.display()))?;

    let plan = planner::plan(links, |l| l.url.as_str(), &blacklist, done.ids());

    let (videos, posts): (Vec<SavedLink>, Vec<SavedLink>) =
        plan.queue.into_iter().partition(|l| l.kind.is_video());
    log::info!(
        "instagram {target}: {} videos and {} posts to download",
        videos.len(),
        posts.len()
    );

    let mut summary = Summary {
        target,
        counts: plan.counts,
        videos: None,
        posts: None,
    };
    if cfg.dry_run {
        log::info!("dry run, stopping before downloads");
        return Ok(summary);
    }

    cfg.ensure_output_dirs()
        .with_context(|| format!("creating output dirs under {}", cfg.output_dir.display()))?;

    if !videos.is_empty() {
        let pb = progress.batch_bar(&format!("{target} videos"), videos.len());
        let report = run_batch(
            &format!("instagram {target} videos"),
            &videos,
            |l| l.url.as_str(),
            &cfg.pacing,
            &pb,
            interrupt_requested,
            |link| fetcher::fetch_video(cfg, link),
            |link, ()| done.record(&link.url),
        )?;
        summary.videos = Some(report);
    }

    if summary.interrupted() {
        return Ok(summary);
    }

    if !posts.is_empty() {
        fetcher::clear_gallery_cache();
        let pb = progress.batch_bar(&format!("{target} posts"), posts.len());
        let report = run_batch(
            &format!("instagram {target} posts"),
            &posts,
            |l| l.url.as_str(),
            &cfg.pacing,
            &pb,
            interrupt_requested,
            |link| fetcher::fetch_post(cfg, link),
            |link, ()| done.record(&link.url),
        )?;
        summary.posts = Some(report);

        fetcher::flatten_post_dir(&cfg.post_dir())
            .with_context(|| format!("flattening {}", cfg.post_dir().display()))?;
    }

    Ok(summary)
}
