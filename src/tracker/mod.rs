//! tracker
//!
//! Work item tracker integration.
//!
//! # Architecture
//!
//! - [`RevisionSource`] is the single seam to the tracking service
//! - [`azure::AzureDevOpsClient`] talks to the Azure DevOps REST API
//! - [`mock::MockTracker`] serves canned revisions for tests
//! - [`fetch::fetch_all_revisions`] pages through a work item's history
//!
//! # Example
//!
//! ```ignore
//! use ado_history::tracker::{azure::AzureDevOpsClient, fetch};
//!
//! let client = AzureDevOpsClient::new("contoso", pat);
//! let outcome = fetch::fetch_all_revisions(&client, id, &Default::default()).await;
//! ```

pub mod azure;
pub mod fetch;
pub mod mock;
pub mod traits;

pub use azure::AzureDevOpsClient;
pub use fetch::{fetch_all_revisions, FetchOptions, FetchOutcome};
pub use traits::{RevisionSource, TrackerError};
