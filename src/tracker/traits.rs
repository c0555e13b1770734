//! tracker::traits
//!
//! Trait definition for work item tracking services.
//!
//! # Design
//!
//! The `RevisionSource` trait is async because every call involves network
//! I/O. It exposes exactly one page of revisions per call; paging policy
//! lives in [`crate::tracker::fetch`], not in implementations.
//!
//! # Example
//!
//! ```ignore
//! use ado_history::tracker::{RevisionSource, TrackerError};
//! use ado_history::core::types::WorkItemId;
//!
//! async fn first_page(source: &dyn RevisionSource, id: WorkItemId) -> Result<(), TrackerError> {
//!     let page = source.get_revisions(id, 0, None).await?;
//!     println!("{} revisions in the first page", page.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Snapshot, WorkItemId};

/// Errors from tracker operations.
///
/// These map to the common failure modes of a hosted tracking service.
/// Messages never include the access token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// No access token is available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested work item was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// A service that can list the revisions of a work item.
///
/// # Contract
///
/// - `get_revisions(id, skip, top)` returns the revisions of `id` starting
///   at offset `skip`, oldest first, with all fields expanded.
/// - With `top`, a page holds at most `top` revisions and fewer only at the
///   end of the history. Without it the service picks its own page size.
/// - An empty page means there is nothing at or after `skip`.
///
/// Implementations must be `Send + Sync`.
#[async_trait]
pub trait RevisionSource: Send + Sync {
    /// Get the service name (for logging).
    fn name(&self) -> &'static str;

    /// Fetch one page of revisions starting at offset `skip`, at most `top`
    /// of them when given.
    async fn get_revisions(
        &self,
        id: WorkItemId,
        skip: usize,
        top: Option<usize>,
    ) -> Result<Vec<Snapshot>, TrackerError>;
}
