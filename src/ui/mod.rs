//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive prompts
//! - [`output`] - Console messages
//! - [`report`] - Change log rendering
//! - [`detail`] - Per-revision field dumps

pub mod detail;
pub mod output;
pub mod prompts;
pub mod report;
