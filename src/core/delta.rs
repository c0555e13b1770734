//! core::delta
//!
//! Turns an ordered sequence of full-state snapshots into a change log.
//!
//! # Algorithm
//!
//! A [`DeltaEngine`] keeps a [`MasterState`]: the last observed value of
//! every field seen so far in the scan. For each snapshot, in order:
//!
//! 1. Every field present in the snapshot is compared (by string
//!    projection) against the master state; differing fields produce an
//!    entry and the master state is updated.
//! 2. Every known field absent from the snapshot is treated as cleared: the
//!    tracker omits removed fields instead of nulling them, so the first
//!    omission moves the field to [`EMPTY_MARKER`].
//! 3. In full mode, a heading block (revision, date, author) is placed in
//!    front of the snapshot's entries when there are any.
//!
//! Administrative fields listed in [`SKIP_FIELDS`] are tracked in the master
//! state like any other field but never reported.
//!
//! # Modes
//!
//! - [`ScanMode::Full`]: per-revision headings and every changed field.
//! - [`ScanMode::Tracking`]: nothing per revision; a single
//!   `(first value, last value)` entry for one field once the scan finishes.
//!
//! # Example
//!
//! ```
//! use ado_history::core::delta::{compute_changes, ScanMode};
//! use ado_history::core::types::Snapshot;
//!
//! let snapshots = vec![
//!     Snapshot::new(1).with_field("System.State", "New"),
//!     Snapshot::new(2).with_field("System.State", "Active"),
//! ];
//!
//! let result = compute_changes(&snapshots, ScanMode::Full);
//! let states: Vec<_> = result.entries_for("System.State").map(|e| e.value.clone()).collect();
//! assert_eq!(states, vec!["New", "Active [New]"]);
//! ```

use std::collections::BTreeMap;

use log::debug;

use super::types::{ChangeEntry, FieldValue, ScanResult, Snapshot};

/// Sentinel for "this field currently has no value".
///
/// Distinct from the empty string so that a cleared field reads differently
/// from a suppressed long-text field in the report.
pub const EMPTY_MARKER: &str = "*empty*";

/// Field holding the revision counter.
pub const REV_FIELD: &str = "System.Rev";

/// Field holding the tracker's internal watermark.
pub const WATERMARK_FIELD: &str = "System.Watermark";

/// Field holding the identity that made the revision.
pub const CHANGED_BY_FIELD: &str = "System.ChangedBy";

/// Field holding the revision timestamp.
pub const CHANGED_DATE_FIELD: &str = "System.ChangedDate";

/// Administrative fields that change on every revision and are never
/// reported as changes.
pub const SKIP_FIELDS: [&str; 4] = [
    REV_FIELD,
    WATERMARK_FIELD,
    CHANGED_BY_FIELD,
    CHANGED_DATE_FIELD,
];

/// Width of the rule placed before every revision after the first.
const SECTION_SEPARATOR_WIDTH: usize = 60;

/// Width of the rule closing a revision heading.
const HEADING_SEPARATOR_WIDTH: usize = 30;

/// What a scan reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Headings plus every changed field for every revision.
    #[default]
    Full,
    /// Only the first and last value of the named field.
    Tracking(String),
}

impl ScanMode {
    /// Build a mode from an optional field name.
    ///
    /// `None` and blank names select [`ScanMode::Full`].
    pub fn from_track_field(field: Option<&str>) -> Self {
        match field.map(str::trim) {
            Some(name) if !name.is_empty() => ScanMode::Tracking(name.to_string()),
            _ => ScanMode::Full,
        }
    }

    /// The tracked field, if any.
    pub fn tracked_field(&self) -> Option<&str> {
        match self {
            ScanMode::Full => None,
            ScanMode::Tracking(name) => Some(name),
        }
    }
}

/// Last observed value of every field seen during a scan.
///
/// Keys are only ever added; a removed field keeps its key with the
/// [`EMPTY_MARKER`] value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterState {
    values: BTreeMap<String, String>,
}

impl MasterState {
    /// Last observed value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Check whether a field has been seen.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over every known field name.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of known fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether no field has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Slot for a field, created with an empty value on first sight.
    fn slot(&mut self, name: &str) -> &mut String {
        self.values.entry(name.to_string()).or_default()
    }
}

/// Stateful single-pass change computation for one work item.
///
/// One engine is created per scan and consumed by [`DeltaEngine::finish`],
/// so repeated scans never share state.
#[derive(Debug, Clone)]
pub struct DeltaEngine {
    mode: ScanMode,
    skip_fields: Vec<String>,
    master: MasterState,
    first_value: String,
    last_value: String,
    entries: Vec<ChangeEntry>,
    revisions: usize,
}

impl DeltaEngine {
    /// Create an engine using the default [`SKIP_FIELDS`].
    pub fn new(mode: ScanMode) -> Self {
        Self::with_skip_fields(mode, SKIP_FIELDS)
    }

    /// Create an engine with a custom skip-list.
    pub fn with_skip_fields<I, S>(mode: ScanMode, skip_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            skip_fields: skip_fields.into_iter().map(Into::into).collect(),
            master: MasterState::default(),
            first_value: String::new(),
            last_value: String::new(),
            entries: Vec::new(),
            revisions: 0,
        }
    }

    /// Current master state.
    pub fn master_state(&self) -> &MasterState {
        &self.master
    }

    /// Process the next snapshot.
    ///
    /// Returns the entries this snapshot added to the change log, heading
    /// included. Always empty in tracking mode.
    pub fn process(&mut self, snapshot: &Snapshot) -> &[ChangeEntry] {
        let start = self.entries.len();
        let include_old = snapshot.rev > 1;
        let tracked = self.mode.tracked_field().map(str::to_string);
        let full = tracked.is_none();
        let mut delta = Vec::new();

        for (name, value) in &snapshot.fields {
            let new_value = value.to_string();

            if tracked.as_deref() == Some(name.as_str()) {
                if self.first_value.is_empty() {
                    self.first_value = new_value.clone();
                }
                self.last_value = new_value.clone();
            }

            let skipped = is_skipped(&self.skip_fields, name);
            let old_value = self.master.slot(name);

            if skipped {
                *old_value = new_value;
                continue;
            }

            if *old_value != new_value {
                if full {
                    let rendered = if include_old {
                        format!("{} [{}]", or_marker(&new_value), or_marker(old_value))
                    } else {
                        or_marker(&new_value).to_string()
                    };
                    delta.push(ChangeEntry::new(name.as_str(), rendered));
                }
                *old_value = new_value;
            }
        }

        for (name, value) in self.master.values.iter_mut() {
            if snapshot.has_field(name) || *value == EMPTY_MARKER {
                continue;
            }

            let previous = std::mem::replace(value, EMPTY_MARKER.to_string());

            if tracked.as_deref() == Some(name.as_str()) {
                self.last_value = EMPTY_MARKER.to_string();
            }

            if full && !is_skipped(&self.skip_fields, name) {
                delta.push(ChangeEntry::new(
                    name.as_str(),
                    format!("{} [{}]", EMPTY_MARKER, or_marker(&previous)),
                ));
            }
        }

        if full && !delta.is_empty() {
            self.entries.extend(revision_heading(snapshot));
            self.entries.extend(delta);
        }

        self.revisions += 1;
        debug!(
            "revision {}: {} entries, {} known fields",
            snapshot.rev,
            self.entries.len() - start,
            self.master.len()
        );

        &self.entries[start..]
    }

    /// Finish the scan and return the change log.
    ///
    /// In tracking mode this appends the single `(first, last)` entry.
    pub fn finish(mut self) -> ScanResult {
        if self.mode.tracked_field().is_some() {
            self.entries
                .push(ChangeEntry::new(self.first_value, self.last_value));
        }

        ScanResult {
            entries: self.entries,
            revisions_evaluated: self.revisions,
        }
    }
}

/// Run a complete scan over `snapshots` (oldest first).
pub fn compute_changes(snapshots: &[Snapshot], mode: ScanMode) -> ScanResult {
    let mut engine = DeltaEngine::new(mode);
    for snapshot in snapshots {
        engine.process(snapshot);
    }
    engine.finish()
}

fn is_skipped(skip_fields: &[String], name: &str) -> bool {
    skip_fields.iter().any(|f| f == name)
}

fn or_marker(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_MARKER
    } else {
        value
    }
}

/// Heading block placed in front of a revision's changes.
fn revision_heading(snapshot: &Snapshot) -> Vec<ChangeEntry> {
    let mut heading = Vec::with_capacity(5);

    if snapshot.rev > 1 {
        heading.push(ChangeEntry::unlabeled("=".repeat(SECTION_SEPARATOR_WIDTH)));
    }

    let revision = if snapshot.rev == 1 {
        format!("{} - New Record", snapshot.rev)
    } else {
        snapshot.rev.to_string()
    };

    let changed_date = snapshot
        .field(CHANGED_DATE_FIELD)
        .map(FieldValue::to_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| EMPTY_MARKER.to_string());

    let changed_by = snapshot
        .field(CHANGED_BY_FIELD)
        .map(FieldValue::to_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| EMPTY_MARKER.to_string());

    heading.push(ChangeEntry::new("Revision", revision));
    heading.push(ChangeEntry::new("Changed Date", format!("{} UTC", changed_date)));
    heading.push(ChangeEntry::new("Changed By", changed_by));
    heading.push(ChangeEntry::unlabeled("-".repeat(HEADING_SEPARATOR_WIDTH)));
    heading
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Identity;
    use chrono::{TimeZone, Utc};

    fn field_entries(entries: &[ChangeEntry]) -> Vec<(String, String)> {
        entries
            .iter()
            .filter(|e| e.is_labeled() && !HEADING_LABELS.contains(&e.label.as_str()))
            .map(|e| (e.label.clone(), e.value.clone()))
            .collect()
    }

    const HEADING_LABELS: [&str; 3] = ["Revision", "Changed Date", "Changed By"];

    fn pair(label: &str, value: &str) -> (String, String) {
        (label.to_string(), value.to_string())
    }

    fn example_snapshots() -> Vec<Snapshot> {
        vec![
            Snapshot::new(1).with_field("A", "1"),
            Snapshot::new(2).with_field("A", "1").with_field("B", "x"),
            Snapshot::new(3).with_field("B", "y"),
        ]
    }

    mod full_mode {
        use super::*;

        #[test]
        fn example_sequence() {
            let mut engine = DeltaEngine::with_skip_fields(ScanMode::Full, Vec::<String>::new());
            let snapshots = example_snapshots();

            let rev1 = field_entries(engine.process(&snapshots[0]));
            assert_eq!(rev1, vec![pair("A", "1")]);

            let rev2 = field_entries(engine.process(&snapshots[1]));
            assert_eq!(rev2, vec![pair("B", "x [*empty*]")]);

            let rev3 = field_entries(engine.process(&snapshots[2]));
            assert_eq!(rev3, vec![pair("B", "y [x]"), pair("A", "*empty* [1]")]);
        }

        #[test]
        fn unchanged_revision_emits_nothing() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            engine.process(&Snapshot::new(1).with_field("A", "1"));
            let second = engine.process(&Snapshot::new(2).with_field("A", "1"));
            assert!(second.is_empty());
        }

        #[test]
        fn first_revision_heading() {
            let date = Utc.with_ymd_and_hms(2023, 5, 1, 8, 30, 0).unwrap();
            let snapshot = Snapshot::new(1)
                .with_field(CHANGED_DATE_FIELD, date)
                .with_field(CHANGED_BY_FIELD, Identity::new("Ada", "ada@example.com"))
                .with_field("System.Title", "Login fails");

            let mut engine = DeltaEngine::new(ScanMode::Full);
            let entries = engine.process(&snapshot).to_vec();

            assert_eq!(
                entries,
                vec![
                    ChangeEntry::new("Revision", "1 - New Record"),
                    ChangeEntry::new("Changed Date", "2023-05-01 08:30:00 UTC"),
                    ChangeEntry::new("Changed By", "Ada (ada@example.com)"),
                    ChangeEntry::unlabeled("-".repeat(30)),
                    ChangeEntry::new("System.Title", "Login fails"),
                ]
            );
        }

        #[test]
        fn later_revision_heading_has_section_separator() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            engine.process(&Snapshot::new(1).with_field("A", "1"));
            let entries = engine
                .process(&Snapshot::new(2).with_field("A", "2"))
                .to_vec();

            assert_eq!(entries[0], ChangeEntry::unlabeled("=".repeat(60)));
            assert_eq!(entries[1], ChangeEntry::new("Revision", "2"));
            assert_eq!(entries[2], ChangeEntry::new("Changed Date", "*empty* UTC"));
            assert_eq!(entries[3], ChangeEntry::new("Changed By", "*empty*"));
            assert_eq!(entries.last(), Some(&ChangeEntry::new("A", "2 [1]")));
        }

        #[test]
        fn skip_listed_fields_are_never_reported() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            let first = engine
                .process(&Snapshot::new(1).with_field(REV_FIELD, 1_i64))
                .to_vec();
            assert!(first.is_empty());

            let second = engine
                .process(&Snapshot::new(2).with_field(REV_FIELD, 2_i64))
                .to_vec();
            assert!(second.is_empty());

            // Removal of a skip-listed field is silent too.
            let third = engine.process(&Snapshot::new(3)).to_vec();
            assert!(third.is_empty());
        }

        #[test]
        fn skip_listed_fields_still_update_master_state() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            engine.process(&Snapshot::new(1).with_field(WATERMARK_FIELD, 17_i64));
            assert_eq!(engine.master_state().get(WATERMARK_FIELD), Some("17"));

            engine.process(&Snapshot::new(2).with_field(WATERMARK_FIELD, 18_i64));
            assert_eq!(engine.master_state().get(WATERMARK_FIELD), Some("18"));
        }

        #[test]
        fn cleared_value_uses_marker() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            engine.process(&Snapshot::new(1).with_field("A", "x"));
            let entries = field_entries(engine.process(&Snapshot::new(2).with_field("A", "")));
            assert_eq!(entries, vec![pair("A", "*empty* [x]")]);
        }

        #[test]
        fn reappearing_field_reports_marker_as_old_value() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            engine.process(&Snapshot::new(1).with_field("A", "x"));
            engine.process(&Snapshot::new(2));
            let entries = field_entries(engine.process(&Snapshot::new(3).with_field("A", "z")));
            assert_eq!(entries, vec![pair("A", "z [*empty*]")]);
        }

        #[test]
        fn removal_reported_once() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            engine.process(&Snapshot::new(1).with_field("A", "x"));
            let removed = field_entries(engine.process(&Snapshot::new(2)));
            assert_eq!(removed, vec![pair("A", "*empty* [x]")]);

            let again = engine.process(&Snapshot::new(3));
            assert!(again.is_empty());
            assert_eq!(engine.master_state().get("A"), Some(EMPTY_MARKER));
        }

        #[test]
        fn identities_compare_by_projection() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            let who = Identity::new("Ada", "ada@example.com");
            engine.process(&Snapshot::new(1).with_field("System.AssignedTo", who.clone()));
            let same = engine.process(&Snapshot::new(2).with_field("System.AssignedTo", who));
            assert!(same.is_empty());
        }

        #[test]
        fn first_revision_omits_old_value_even_when_empty() {
            let mut engine = DeltaEngine::new(ScanMode::Full);
            let entries = field_entries(engine.process(&Snapshot::new(1).with_field("A", "v")));
            assert_eq!(entries, vec![pair("A", "v")]);
        }
    }

    mod tracking_mode {
        use super::*;

        #[test]
        fn example_sequence() {
            let result = {
                let mut engine = DeltaEngine::with_skip_fields(
                    ScanMode::Tracking("B".into()),
                    Vec::<String>::new(),
                );
                for snapshot in &example_snapshots() {
                    assert!(engine.process(snapshot).is_empty());
                }
                engine.finish()
            };

            assert_eq!(result.entries, vec![ChangeEntry::new("x", "y")]);
            assert_eq!(result.revisions_evaluated, 3);
        }

        #[test]
        fn tracked_field_removed_at_end() {
            let snapshots = vec![
                Snapshot::new(1).with_field("B", "x"),
                Snapshot::new(2).with_field("B", "y"),
                Snapshot::new(3).with_field("A", "other"),
            ];
            let result = compute_changes(&snapshots, ScanMode::Tracking("B".into()));
            assert_eq!(result.entries, vec![ChangeEntry::new("x", EMPTY_MARKER)]);
        }

        #[test]
        fn skip_listed_tracked_field_removal_is_seen() {
            let snapshots = vec![
                Snapshot::new(1).with_field(WATERMARK_FIELD, "10"),
                Snapshot::new(2).with_field(WATERMARK_FIELD, "11"),
                Snapshot::new(3),
            ];
            let result = compute_changes(
                &snapshots,
                ScanMode::Tracking(WATERMARK_FIELD.into()),
            );
            assert_eq!(result.entries, vec![ChangeEntry::new("10", EMPTY_MARKER)]);
        }

        #[test]
        fn first_value_waits_for_non_empty() {
            let snapshots = vec![
                Snapshot::new(1).with_field("B", ""),
                Snapshot::new(2).with_field("B", "a"),
                Snapshot::new(3).with_field("B", "b"),
            ];
            let result = compute_changes(&snapshots, ScanMode::Tracking("B".into()));
            assert_eq!(result.entries, vec![ChangeEntry::new("a", "b")]);
        }

        #[test]
        fn never_seen_field_yields_empty_pair() {
            let snapshots = vec![Snapshot::new(1).with_field("A", "1")];
            let result = compute_changes(&snapshots, ScanMode::Tracking("B".into()));
            assert_eq!(result.entries, vec![ChangeEntry::new("", "")]);
        }

        #[test]
        fn master_state_still_grows() {
            let mut engine = DeltaEngine::new(ScanMode::Tracking("B".into()));
            engine.process(&Snapshot::new(1).with_field("A", "1").with_field("B", "x"));
            assert!(engine.master_state().contains("A"));
            assert!(engine.master_state().contains("B"));
        }
    }

    #[test]
    fn scan_mode_from_track_field() {
        assert_eq!(ScanMode::from_track_field(None), ScanMode::Full);
        assert_eq!(ScanMode::from_track_field(Some("  ")), ScanMode::Full);
        assert_eq!(
            ScanMode::from_track_field(Some("System.State")),
            ScanMode::Tracking("System.State".into())
        );
    }

    #[test]
    fn separate_engines_share_nothing() {
        let snapshots = example_snapshots();
        let first = compute_changes(&snapshots, ScanMode::Full);
        let second = compute_changes(&snapshots, ScanMode::Full);
        assert_eq!(first, second);
    }
}
