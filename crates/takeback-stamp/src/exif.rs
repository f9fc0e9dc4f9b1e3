//! exiftool invocation and filesystem time stamping

use std::path::Path;
use std::process::Command;

use anyhow::Context;

use takeback_core::{fsutil, tool};

use crate::sidecar::Sidecar;

/// Build the exiftool tag arguments for a sidecar. Empty when the sidecar
/// has nothing worth writing.
pub fn tag_args(sidecar: &Sidecar) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(title) = &sidecar.title {
        args.push(format!("-Title={title}"));
    }
    if let Some(author) = &sidecar.author {
        args.push(format!("-Author={author}"));
    }
    if let Some(dt) = sidecar.exif_datetime() {
        args.push(format!("-CreateDate={dt}"));
        args.push(format!("-ModifyDate={dt}"));
        args.push(format!("-DateTimeOriginal={dt}"));
    }
    if !sidecar.keywords.is_empty() {
        args.push(format!("-Keywords={}", sidecar.keywords.join(", ")));
    }
    args
}

/// Write the sidecar's fields into one artifact: tags via exiftool, then
/// mtime/atime from the item's timestamp. `-P` keeps exiftool from
/// touching file times itself; the timestamp we set is the item's, not
/// the stamping run's.
pub fn write_tags(path: &Path, sidecar: &Sidecar) -> anyhow::Result<()> {
    let args = tag_args(sidecar);
    if !args.is_empty() {
        let mut cmd = Command::new("exiftool");
        cmd.args(["-P", "-overwrite_original"]).args(&args).arg(path);
        tool::run("exiftool", &mut cmd)
            .with_context(|| format!("tagging {}", path.display()))?;
    }
    if let Some(ts) = sidecar.unix_timestamp() {
        fsutil::set_file_times(path, ts)
            .with_context(|| format!("setting times on {}", path.display()))?;
    }
    Ok(())
}
