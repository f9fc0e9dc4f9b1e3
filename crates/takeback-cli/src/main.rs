//! takeback - Unified CLI for personal takeout archival
//!
//! Parses Instagram and YouTube takeout exports, downloads the referenced
//! media through external tools with resumable done-list bookkeeping, and
//! stamps artifacts with their original metadata and timestamps.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use takeback_core::{init_logging, interrupt_flag, ProgressContext, Verbosity};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "takeback")]
#[command(about = "Archive takeout exports: parse, plan, download, stamp")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./takeback.toml or ~/.config/takeback/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Archive an Instagram activity export
    Instagram(cmd::instagram::InstagramArgs),
    /// Archive YouTube Takeout playlists and uploads
    Youtube(cmd::youtube::YoutubeArgs),
    /// Stamp downloaded artifacts from their sidecar metadata
    Stamp(cmd::stamp::StampArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug — progress bars show activity
    //   non-TTY: info unless --debug         — logs are the only output
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let verbosity = match (cli.debug, is_tty) {
        (true, _) => Verbosity::Debug,
        (false, true) => Verbosity::Quiet,
        (false, false) => Verbosity::Normal,
    };
    init_logging(verbosity, multi);

    let config = match cli.config {
        Some(path) => Config::from_file(&path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Instagram(args) => cmd::instagram::run(args, &config, &progress),
        Command::Youtube(args) => cmd::youtube::run(args, &config, &progress),
        Command::Stamp(args) => cmd::stamp::run(args),
        Command::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

fn print_config(config: &Config) {
    use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Target directory",
        &config.dirs.target_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Cache directory",
        &config.dirs.cache_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Pacing",
        &format!("{}-{}s", config.pacing.min_secs, config.pacing.max_secs),
    ]);
    table.add_row(vec![
        "Instagram export",
        &config
            .instagram
            .base_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not set".into()),
    ]);
    table.add_row(vec![
        "Cookies file",
        &config.cookies_file().display().to_string(),
    ]);
    let roots = config.youtube.all_roots();
    table.add_row(vec!["Takeout roots", &format!("{}", roots.len())]);
    for root in &roots {
        table.add_row(vec!["", &root.display().to_string()]);
    }
    for transfer in &config.youtube.transfers {
        table.add_row(vec![
            "Transfer",
            &format!("{} ({}, {})", transfer.name, transfer.kind, transfer.folder),
        ]);
    }

    eprintln!("\n{table}");
}

/// Register interrupt handlers around a fetch loop. First signal sets the
/// stop flag so the loop finishes its in-flight item; second signal
/// force-exits.
pub(crate) fn setup_signal_handler() {
    // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, || {
            if interrupt_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGTERM handler");
        signal_hook::low_level::register(signal_hook::consts::SIGINT, || {
            if interrupt_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGINT handler");
    }
}
