//! Done list — the durable record of already-fetched identifiers
//!
//! JSON array of identifier strings, ordered by completion. The fetch loop
//! records each identifier immediately after a successful fetch and before
//! moving on, so a crash at any point loses at most the in-flight item
//! (which is then retried on the next run — at-least-once, never lost).

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::error::StoreError;

/// Append-only list of successfully processed identifiers.
///
/// An identifier appears at most once: `record` is a no-op for ids already
/// present, and `load` dedups defensively in case an older writer ever
/// produced duplicates — membership is set-semantics either way.
#[derive(Debug)]
pub struct DoneList {
    path: PathBuf,
    order: Vec<String>,
    seen: FxHashSet<String>,
}

impl DoneList {
    /// Load from a JSON array file; a missing file means nothing is done yet.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let mut list = Self {
            path: path.to_path_buf(),
            order: Vec::new(),
            seen: FxHashSet::default(),
        };
        if !path.is_file() {
            log::debug!("no done list at {}, starting empty", path.display());
            return Ok(list);
        }
        let content = std::fs::read_to_string(path)?;
        let ids: Vec<String> = serde_json::from_str(&content)?;
        for id in ids {
            if list.seen.insert(id.clone()) {
                list.order.push(id);
            }
        }
        log::debug!("loaded {} done ids from {}", list.order.len(), path.display());
        Ok(list)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn ids(&self) -> &FxHashSet<String> {
        &self.seen
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Durably record one more identifier.
    ///
    /// The JSON array format cannot be appended in place, so the whole
    /// list is rewritten to a temp file, fsynced, and renamed over the
    /// old one — a crash mid-write leaves the previous list intact, and a
    /// subsequent `load` in a new process observes the id.
    pub fn record(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.seen.insert(id.to_string()) {
            log::debug!("{id} already recorded, skipping");
            return Ok(());
        }
        self.order.push(id.to_string());
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        use std::io::Write;

        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(&serde_json::to_vec_pretty(&self.order)?)?;
        file.sync_all()?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
