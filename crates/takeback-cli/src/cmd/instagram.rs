//! Instagram subcommands - fetch saved/liked media, export messages

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use takeback_core::SharedProgress;
use takeback_instagram::{config as ig_config, messages, runner, Target};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct InstagramArgs {
    #[command(subcommand)]
    pub action: InstagramAction,
}

#[derive(Subcommand, Debug)]
pub enum InstagramAction {
    /// Download the media referenced by a saved/liked collection
    Fetch(FetchArgs),
    /// Export message-thread media and normalized message chunks
    Messages,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Which collection to archive
    #[arg(short, long, value_enum, default_value = "saved")]
    pub target: TargetArg,

    /// Plan and report only; download nothing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum TargetArg {
    Saved,
    Liked,
}

impl From<TargetArg> for Target {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::Saved => Target::Saved,
            TargetArg::Liked => Target::Liked,
        }
    }
}

pub fn run(args: InstagramArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let base_dir = config.instagram.base_dir.clone().context(
        "Instagram export root not configured (set INSTAGRAM_BASE_DIR or [instagram].base_dir)",
    )?;

    match args.action {
        InstagramAction::Fetch(fetch) => {
            let target: Target = fetch.target.into();
            let cfg = ig_config::for_target(
                &base_dir,
                &config.dirs.target_dir,
                &config.dirs.cache_dir,
                target.dir_name(),
                config.cookies_file(),
                config.pacing.to_pacing()?,
                fetch.dry_run,
            );

            log::info!("Fetching instagram {target}");
            log::info!("  Export: {}", base_dir.display());
            log::info!("  Output: {}", cfg.output_dir.display());

            crate::setup_signal_handler();
            let summary = runner::run(&cfg, target, progress)?;

            let mut rows = vec![
                ("Links", format!("{}", summary.counts.total)),
                ("Already done", format!("{}", summary.counts.done)),
                ("Blacklisted", format!("{}", summary.counts.blacklisted)),
                ("Remaining", format!("{}", summary.counts.remaining)),
            ];
            if let Some(report) = &summary.videos {
                rows.push(("Videos", super::report_row(report)));
            }
            if let Some(report) = &summary.posts {
                rows.push(("Posts", super::report_row(report)));
            }
            super::print_summary(&format!("Instagram {target}"), &rows);

            if summary.interrupted() {
                log::warn!("interrupted; the next run resumes from the done list");
            }
            Ok(())
        }
        InstagramAction::Messages => {
            let output_dir = config.dirs.target_dir.join("instagram-messages");
            log::info!("Exporting messages to {}", output_dir.display());
            let summary = messages::export(&base_dir, &output_dir)?;
            super::print_summary(
                "Instagram messages",
                &[
                    ("Threads", format!("{}", summary.threads)),
                    ("Messages", format!("{}", summary.messages)),
                    ("Media copied", format!("{}", summary.media_copied)),
                    ("Media failed", format!("{}", summary.media_failed)),
                ],
            );
            Ok(())
        }
    }
}
