//! core
//!
//! Core domain types and the change computation.
//!
//! # Modules
//!
//! - [`types`] - Strong types: WorkItemId, FieldValue, Snapshot, ChangeEntry
//! - [`delta`] - Snapshot-to-change-log computation
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for persisted state
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - The change computation is deterministic and free of I/O

pub mod config;
pub mod delta;
pub mod paths;
pub mod types;
