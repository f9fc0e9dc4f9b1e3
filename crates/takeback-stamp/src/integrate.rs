//! Directory integration pass: match sidecars to artifacts and stamp them
//!
//! Layout convention shared by both pipelines: artifacts live in `<dir>`,
//! their sidecars in `<dir>/metadata/`, and a sidecar belongs to every
//! artifact sharing its filename prefix. For the Instagram video tree the
//! prefix is the 19-character date prefix; elsewhere the whole stem.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::exif;
use crate::sidecar;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IntegrateSummary {
    /// Sidecar JSON files inspected.
    pub sidecars: usize,
    /// Artifacts successfully stamped.
    pub stamped: usize,
    /// Sidecars with no matching artifact.
    pub missing: usize,
    /// Stamp attempts that failed.
    pub failed: usize,
}

impl IntegrateSummary {
    pub fn log(&self) {
        log::info!(
            "stamp: {} sidecars, {} stamped, {} without artifact, {} failed",
            self.sidecars,
            self.stamped,
            self.missing,
            self.failed
        );
    }
}

/// Stamp every artifact in `dir` from the sidecars in `dir/metadata`.
///
/// Failures are per-item: a sidecar that does not parse or an artifact
/// that will not stamp is counted and logged, never fatal. With `dry_run`
/// the matching is reported but nothing is written.
pub fn run(dir: &Path, prefix_len: Option<usize>, dry_run: bool) -> anyhow::Result<IntegrateSummary> {
    if !dir.is_dir() {
        bail!("directory not found: {}", dir.display());
    }
    let metadata_dir = dir.join("metadata");
    if !metadata_dir.is_dir() {
        bail!("metadata directory not found: {}", metadata_dir.display());
    }

    let mut sidecars: Vec<PathBuf> = std::fs::read_dir(&metadata_dir)
        .with_context(|| format!("reading {}", metadata_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    sidecars.sort();
    log::info!("found {} sidecars in {}", sidecars.len(), metadata_dir.display());

    let artifacts = list_artifacts(dir)?;

    let mut summary = IntegrateSummary::default();
    for sidecar_path in &sidecars {
        summary.sidecars += 1;
        let prefix = match_prefix(sidecar_path, prefix_len);

        let matches: Vec<&PathBuf> = artifacts
            .iter()
            .filter(|a| {
                a.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        if matches.is_empty() {
            log::warn!("no artifact for sidecar {}", sidecar_path.display());
            summary.missing += 1;
            continue;
        }
        if dry_run {
            summary.stamped += matches.len();
            continue;
        }

        let parsed = std::fs::read_to_string(sidecar_path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from));
        let info: serde_json::Value = match parsed {
            Ok(v) => v,
            Err(e) => {
                log::warn!("unreadable sidecar {}: {e}", sidecar_path.display());
                summary.failed += 1;
                continue;
            }
        };
        let fields = sidecar::parse(&info);

        for artifact in matches {
            match exif::write_tags(artifact, &fields) {
                Ok(()) => {
                    log::debug!("stamped {}", artifact.display());
                    summary.stamped += 1;
                }
                Err(e) => {
                    log::warn!("could not stamp {}: {e:#}", artifact.display());
                    summary.failed += 1;
                }
            }
        }
    }

    summary.log();
    Ok(summary)
}

/// Non-JSON files directly in `dir` (the metadata subdir is separate).
fn list_artifacts(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut artifacts: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && !p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    artifacts.sort();
    Ok(artifacts)
}

/// The filename prefix an artifact must share with this sidecar:
/// the stem without `.json`/`.info.json`, optionally truncated.
fn match_prefix(sidecar_path: &Path, prefix_len: Option<usize>) -> String {
    let name = sidecar_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(".json").unwrap_or(&name);
    let stem = stem.strip_suffix(".info").unwrap_or(stem);
    match prefix_len {
        Some(n) => stem.chars().take(n).collect(),
        None => stem.to_string(),
    }
}
