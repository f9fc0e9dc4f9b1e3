//! Tabular progress store for the playlist pipeline
//!
//! Richer sibling of [`DoneList`](crate::done::DoneList): a CSV table
//! recording, per fetched video, the transfer it belonged to and the
//! metadata needed to find the artifact again. CSV supports true appends,
//! so each success adds one row without rewriting the file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One fetched-video record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub transfer: String,
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub upload_date: String,
    /// When the video was added to the playlist (ISO 8601), empty if the
    /// export carried no timestamp.
    pub added_at: String,
    /// Destination path relative to the output root.
    pub file: String,
}

/// CSV-backed progress table. Single-writer by convention.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    rows: Vec<LedgerRow>,
    ids: FxHashSet<String>,
}

impl Ledger {
    /// Load all rows; a missing file means nothing has been fetched yet.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let mut ledger = Self {
            path: path.to_path_buf(),
            rows: Vec::new(),
            ids: FxHashSet::default(),
        };
        if !path.is_file() {
            log::debug!("no ledger at {}, starting empty", path.display());
            return Ok(ledger);
        }
        let mut reader = csv::Reader::from_path(path)?;
        for row in reader.deserialize::<LedgerRow>() {
            let row = row?;
            if !row.video_id.is_empty() {
                ledger.ids.insert(row.video_id.clone());
            }
            ledger.rows.push(row);
        }
        log::debug!("loaded {} ledger rows from {}", ledger.rows.len(), path.display());
        Ok(ledger)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &FxHashSet<String> {
        &self.ids
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Durably append one row. The header is written only when the file is
    /// created; the row is flushed and fsynced before returning, because
    /// the fetch loop uses this call as its "done" commit point.
    pub fn append(&mut self, row: LedgerRow) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let fresh = !self.path.is_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(fresh)
            .from_writer(file);
        writer.serialize(&row)?;
        writer.flush().map_err(StoreError::Io)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        self.ids.insert(row.video_id.clone());
        self.rows.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> LedgerRow {
        LedgerRow {
            transfer: "favorites".into(),
            video_id: id.into(),
            title: "A Title".into(),
            channel: "A Channel".into(),
            upload_date: "2021-03-04".into(),
            added_at: "2021-05-06T07:08:09+00:00".into(),
            file: format!("playlist-favorites/{id}.mp4"),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(&dir.path().join("state.csv")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn append_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.csv");

        let mut ledger = Ledger::load(&path).unwrap();
        ledger.append(row("vid1")).unwrap();
        ledger.append(row("vid2")).unwrap();

        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("vid1"));
        assert!(reloaded.contains("vid2"));
        assert_eq!(reloaded.rows()[0], row("vid1"));
    }

    #[test]
    fn header_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.csv");

        let mut ledger = Ledger::load(&path).unwrap();
        ledger.append(row("vid1")).unwrap();
        drop(ledger);

        // New process appends to the existing file.
        let mut ledger = Ledger::load(&path).unwrap();
        ledger.append(row("vid2")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header_lines = content
            .lines()
            .filter(|l| l.starts_with("transfer,video_id"))
            .count();
        assert_eq!(header_lines, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn blank_ids_ignored_for_membership() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.csv");
        let mut ledger = Ledger::load(&path).unwrap();
        let mut blank = row("vid1");
        blank.video_id = String::new();
        ledger.append(blank).unwrap();

        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(!reloaded.contains(""));
    }

    #[test]
    fn fields_with_commas_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.csv");
        let mut ledger = Ledger::load(&path).unwrap();
        let mut tricky = row("vid1");
        tricky.title = "one, two, \"three\"".into();
        ledger.append(tricky.clone()).unwrap();

        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(reloaded.rows()[0], tricky);
    }
}
