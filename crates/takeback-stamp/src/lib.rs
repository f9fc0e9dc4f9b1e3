//! Metadata stamper
//!
//! Reads the sidecar JSON a download left next to an artifact and writes
//! its descriptive fields back into the artifact: EXIF-style tags via
//! exiftool and filesystem mtime/atime from the item's timestamp. Stamping
//! is always per-item best effort — a missing tag never invalidates the
//! artifact itself.

pub mod exif;
pub mod integrate;
pub mod sidecar;

pub use integrate::{run, IntegrateSummary};
pub use sidecar::Sidecar;
