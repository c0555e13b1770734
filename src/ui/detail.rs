//! ui::detail
//!
//! Per-revision field dumps for inspecting raw history.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::report::LONG_TEXT_PLACEHOLDER;
use crate::core::types::{Snapshot, WorkItemId};

/// Values longer than this many characters are truncated.
pub const DETAIL_VALUE_LIMIT: usize = 100;

/// File name of the dump for one revision.
pub fn detail_file_name(item: WorkItemId, rev: u32) -> String {
    format!("{}-{}_Details.txt", item, rev)
}

/// Render every field of a snapshot, one `name: value` line each.
pub fn render_revision_detail(item: WorkItemId, snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Detail output for work item ID {}, revision {}",
        item, snapshot.rev
    );
    let _ = writeln!(out, "{}", "=".repeat(80));

    for (name, value) in &snapshot.fields {
        let value = value.to_string();
        match value.char_indices().nth(DETAIL_VALUE_LIMIT) {
            Some((cut, _)) => {
                let _ = writeln!(out, "{}: {}{}", name, &value[..cut], LONG_TEXT_PLACEHOLDER);
            }
            None => {
                let _ = writeln!(out, "{}: {}", name, value);
            }
        }
    }

    out
}

/// Write the dump of one revision into `dir`.
pub fn write_revision_detail(
    dir: &Path,
    item: WorkItemId,
    snapshot: &Snapshot,
) -> io::Result<PathBuf> {
    let path = dir.join(detail_file_name(item, snapshot.rev));
    fs::write(&path, render_revision_detail(item, snapshot))?;
    Ok(path)
}
