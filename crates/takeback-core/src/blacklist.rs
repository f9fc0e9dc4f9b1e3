//! Manually curated blacklist of permanently unfetchable identifiers
//!
//! Some links return errors like "410 Gone" or "Private video" forever.
//! Keeping them in a blacklist file stops every future run from re-trying
//! them. The file is a plain JSON array of identifier strings and is only
//! ever edited by hand — this core reads it, never writes it.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::StoreError;

/// Set of identifiers excluded from every work queue.
#[derive(Debug, Default)]
pub struct Blacklist {
    set: FxHashSet<String>,
}

impl Blacklist {
    /// Load from a JSON array file. A missing file is not an error:
    /// absence means nothing is blacklisted yet. A file that exists but
    /// does not parse IS an error — silently ignoring a corrupt blacklist
    /// would un-block items the operator meant to exclude.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            log::debug!("no blacklist at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let ids: Vec<String> = serde_json::from_str(&content)?;
        log::debug!("loaded {} blacklisted ids from {}", ids.len(), path.display());
        Ok(Self {
            set: ids.into_iter().collect(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
