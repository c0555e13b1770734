//! ado-history - readable change logs from Azure DevOps work item revisions
//!
//! Azure DevOps keeps every revision of a work item as a full snapshot of its
//! fields. This crate pages through those snapshots, works out what actually
//! changed from one revision to the next, and writes the result as a plain
//! text change log.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, resolves inputs)
//! - [`core`] - Domain types, the change computation, configuration
//! - [`tracker`] - Revision retrieval from the work item tracking service
//! - [`secrets`] - Storage for the remembered access token
//! - [`ui`] - Prompts, console output, and report rendering
//!
//! # Example
//!
//! ```
//! use ado_history::core::delta::{compute_changes, ScanMode};
//! use ado_history::core::types::Snapshot;
//!
//! let revisions = vec![
//!     Snapshot::new(1).with_field("System.State", "New"),
//!     Snapshot::new(2).with_field("System.State", "Active"),
//! ];
//!
//! let result = compute_changes(&revisions, ScanMode::Tracking("System.State".into()));
//! assert_eq!(result.entries[0].label, "New");
//! assert_eq!(result.entries[0].value, "Active");
//! ```

pub mod cli;
pub mod core;
pub mod secrets;
pub mod tracker;
pub mod ui;
