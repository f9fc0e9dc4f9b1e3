//! Stamp subcommand - apply sidecar metadata to downloaded artifacts

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct StampArgs {
    /// Directory of artifacts with a `metadata/` sidecar subdirectory
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Match artifacts by only the first N characters of the sidecar name
    /// (19 pairs the Instagram video tree's date prefix)
    #[arg(long)]
    pub prefix_len: Option<usize>,

    /// Report the sidecar/artifact matching without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: StampArgs) -> Result<()> {
    log::info!("Stamping artifacts in {}", args.dir.display());
    let summary = takeback_stamp::run(&args.dir, args.prefix_len, args.dry_run)?;
    super::print_summary(
        "Stamp",
        &[
            ("Sidecars", format!("{}", summary.sidecars)),
            ("Stamped", format!("{}", summary.stamped)),
            ("No artifact", format!("{}", summary.missing)),
            ("Failed", format!("{}", summary.failed)),
        ],
    );
    Ok(())
}
