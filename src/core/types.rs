//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`WorkItemId`] - Validated work item identifier
//! - [`FieldValue`] - Value of one work item field at one revision
//! - [`Identity`] - A person as reported by the tracker
//! - [`Snapshot`] - Full field state of a work item at one revision
//! - [`ChangeEntry`] - One `(label, value)` line of a change log
//! - [`ScanResult`] - Ordered change log produced by one scan
//!
//! # Validation
//!
//! [`WorkItemId`] enforces validity at construction time, so an invalid
//! identifier never reaches the tracker.
//!
//! # Examples
//!
//! ```
//! use ado_history::core::types::{FieldValue, Identity, WorkItemId};
//!
//! let id = WorkItemId::parse("3421").unwrap();
//! assert_eq!(id.get(), 3421);
//! assert!(WorkItemId::parse("abc").is_err());
//!
//! let who = FieldValue::Identity(Identity::new("Ada Lovelace", "ada@example.com"));
//! assert_eq!(who.to_string(), "Ada Lovelace (ada@example.com)");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid work item id: {0}")]
    InvalidWorkItemId(String),
}

/// A validated work item identifier.
///
/// Work item IDs are positive integers. Zero, negative numbers and
/// non-numeric input are rejected.
///
/// # Example
///
/// ```
/// use ado_history::core::types::WorkItemId;
///
/// let id: WorkItemId = " 42 ".parse().unwrap();
/// assert_eq!(id.to_string(), "42");
///
/// assert!(WorkItemId::parse("0").is_err());
/// assert!(WorkItemId::parse("-7").is_err());
/// assert!(WorkItemId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WorkItemId(u32);

impl WorkItemId {
    /// Create a new validated work item id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidWorkItemId` if `id` is zero.
    pub fn new(id: u32) -> Result<Self, TypeError> {
        if id == 0 {
            return Err(TypeError::InvalidWorkItemId(
                "work item id must be greater than zero".into(),
            ));
        }
        Ok(Self(id))
    }

    /// Parse a work item id from user input.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidWorkItemId` if the input is empty, not a
    /// number, or not a positive integer.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidWorkItemId(
                "work item id cannot be empty".into(),
            ));
        }
        let id = trimmed.parse::<u32>().map_err(|_| {
            TypeError::InvalidWorkItemId(format!("'{}' is not a positive whole number", trimmed))
        })?;
        Self::new(id)
    }

    /// Get the numeric value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl FromStr for WorkItemId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u32> for WorkItemId {
    type Error = TypeError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<WorkItemId> for u32 {
    fn from(id: WorkItemId) -> Self {
        id.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person as reported by the tracker (e.g. `System.ChangedBy`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Human-friendly name
    pub display_name: String,
    /// Account name, usually an email address
    pub unique_name: String,
}

impl Identity {
    /// Create a new identity.
    pub fn new(display_name: impl Into<String>, unique_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            unique_name: unique_name.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.unique_name)
    }
}

/// Value of a single work item field at one revision.
///
/// Values are compared through their string projection ([`fmt::Display`]),
/// never structurally, so two identities with the same display and unique
/// names are the same value.
///
/// # Example
///
/// ```
/// use ado_history::core::types::FieldValue;
///
/// assert_eq!(FieldValue::Empty.to_string(), "");
/// assert_eq!(FieldValue::from("Active").to_string(), "Active");
/// assert_eq!(FieldValue::Integer(5).to_string(), "5");
/// assert_eq!(FieldValue::Float(2.5).to_string(), "2.5");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// The field is present but carries no value
    Empty,
    /// Plain or rich text
    Text(String),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// Timestamp, normalized to UTC
    Date(DateTime<Utc>),
    /// A person
    Identity(Identity),
}

impl FieldValue {
    /// Format used for [`FieldValue::Date`] projections.
    pub const DATE_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d.format(Self::DATE_FORMAT)),
            FieldValue::Identity(identity) => write!(f, "{}", identity),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<Identity> for FieldValue {
    fn from(identity: Identity) -> Self {
        FieldValue::Identity(identity)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(date: DateTime<Utc>) -> Self {
        FieldValue::Date(date)
    }
}

/// Full field state of a work item at one revision.
///
/// Fields the tracker omits are simply absent from `fields`; a field that
/// disappears between two snapshots has been cleared or removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Revision number (1 for the creating revision)
    pub rev: u32,
    /// Field name to value
    pub fields: BTreeMap<String, FieldValue>,
}

impl Snapshot {
    /// Create an empty snapshot for the given revision.
    pub fn new(rev: u32) -> Self {
        Self {
            rev,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style helper to add a field.
    ///
    /// # Example
    ///
    /// ```
    /// use ado_history::core::types::Snapshot;
    ///
    /// let snapshot = Snapshot::new(1)
    ///     .with_field("System.Title", "Fix login")
    ///     .with_field("System.State", "New");
    /// assert_eq!(snapshot.fields.len(), 2);
    /// ```
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check whether the snapshot carries a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

/// One line of a change log.
///
/// `label` is a field name for real changes and empty for separator lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    /// Field name or heading label; empty for separators
    pub label: String,
    /// Rendered value
    pub value: String,
}

impl ChangeEntry {
    /// Create a labeled entry.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Create an entry without a label (separator lines).
    pub fn unlabeled(value: impl Into<String>) -> Self {
        Self::new(String::new(), value)
    }

    /// Check whether this entry has a label.
    pub fn is_labeled(&self) -> bool {
        !self.label.is_empty()
    }
}

/// Ordered change log produced by one scan of one work item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanResult {
    /// Change entries in output order
    pub entries: Vec<ChangeEntry>,
    /// Number of snapshots the scan evaluated
    pub revisions_evaluated: usize,
}

impl ScanResult {
    /// Iterate over entries with the given label.
    pub fn entries_for<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ChangeEntry> {
        self.entries.iter().filter(move |e| e.label == label)
    }
}
