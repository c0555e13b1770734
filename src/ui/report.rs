//! ui::report
//!
//! Plain-text change log rendering.
//!
//! # Layout
//!
//! ```text
//! History as of 2024-03-05 14:02:11 (UTC+01:00) for ID 3421
//! Values in [brackets] represent the value prior to this revision.
//! ::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::
//! Revision: 1 - New Record
//! Changed Date: 2024-03-01 09:15:00 UTC
//! ...
//! ```
//!
//! Free-text fields that tend to hold pages of HTML are never printed; their
//! line shows a placeholder instead. Suppression happens only here, so the
//! change computation still sees the real values.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};

use crate::core::types::{ChangeEntry, ScanResult, WorkItemId};

/// Fields whose values are replaced by [`LONG_TEXT_PLACEHOLDER`].
pub const LONG_TEXT_FIELDS: [&str; 6] = [
    "Custom.AssessmentOutcomeReason",
    "Custom.ModernizationStatusNotes",
    "System.History",
    "System.Description",
    "Custom.OptimizationStatusNotes",
    "Custom.ProgressNotes",
];

/// Text shown instead of a suppressed value.
pub const LONG_TEXT_PLACEHOLDER: &str = "...long text skipped...";

/// Second line of every report.
pub const LEGEND: &str = "Values in [brackets] represent the value prior to this revision.";

const RULE_WIDTH: usize = 80;

/// Check whether a field's values are suppressed in reports.
pub fn is_long_text_field(label: &str) -> bool {
    LONG_TEXT_FIELDS.contains(&label)
}

/// Render one entry as a report line (without line terminator).
pub fn render_entry(entry: &ChangeEntry) -> String {
    if !entry.is_labeled() {
        entry.value.clone()
    } else if is_long_text_field(&entry.label) {
        format!("{}: {}", entry.label, LONG_TEXT_PLACEHOLDER)
    } else {
        format!("{}: {}", entry.label, entry.value)
    }
}

/// Render a complete report.
///
/// `generated_at` is the local time of the run; its offset is printed next
/// to it.
pub fn render_report(
    result: &ScanResult,
    item: WorkItemId,
    generated_at: DateTime<FixedOffset>,
) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "History as of {} (UTC{}) for ID {}",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        generated_at.format("%:z"),
        item
    );
    let _ = writeln!(out, "{}", LEGEND);
    let _ = writeln!(out, "{}", ":".repeat(RULE_WIDTH));

    for entry in &result.entries {
        let _ = writeln!(out, "{}", render_entry(entry));
    }

    out
}

/// File name of the report for a work item.
pub fn report_file_name(item: WorkItemId) -> String {
    format!("{}-Changes.txt", item)
}

/// Write a rendered report into `dir`, replacing any previous one.
///
/// Returns the path written.
pub fn write_report(dir: &Path, item: WorkItemId, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(report_file_name(item));
    fs::write(&path, contents)?;
    Ok(path)
}
