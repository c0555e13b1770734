//! tracker::mock
//!
//! Mock tracker implementation for deterministic testing.
//!
//! # Design
//!
//! The mock tracker serves a fixed list of revisions, records every call,
//! and can be told to fail on the N-th call. Pages hold the requested `top`
//! revisions, or the mock's own default page size when none is requested.
//!
//! # Example
//!
//! ```
//! use ado_history::core::types::{Snapshot, WorkItemId};
//! use ado_history::tracker::mock::MockTracker;
//! use ado_history::tracker::RevisionSource;
//!
//! # tokio_test::block_on(async {
//! let tracker = MockTracker::new((1..=3).map(Snapshot::new).collect(), 2);
//! let id = WorkItemId::new(1).unwrap();
//!
//! assert_eq!(tracker.get_revisions(id, 0, None).await.unwrap().len(), 2);
//! assert_eq!(tracker.get_revisions(id, 2, None).await.unwrap().len(), 1);
//! assert_eq!(tracker.get_revisions(id, 0, Some(3)).await.unwrap().len(), 3);
//! assert_eq!(tracker.calls().len(), 3);
//! # });
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::traits::{RevisionSource, TrackerError};
use crate::core::types::{Snapshot, WorkItemId};

/// Mock tracker for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockTracker {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockTrackerInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockTrackerInner {
    /// All revisions, oldest first.
    revisions: Vec<Snapshot>,
    /// Revisions per page when the caller does not ask for a size.
    page_size: usize,
    /// Call (1-based) to fail on, with the error to return.
    fail_on: Option<(usize, TrackerError)>,
    /// Recorded calls for verification.
    calls: Vec<MockCall>,
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub id: WorkItemId,
    pub skip: usize,
    pub top: Option<usize>,
}

impl MockTracker {
    /// Create a mock serving `revisions` in pages of `page_size` by default.
    pub fn new(revisions: Vec<Snapshot>, page_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTrackerInner {
                revisions,
                page_size,
                fail_on: None,
                calls: Vec::new(),
            })),
        }
    }

    /// Configure the mock to fail on the given (1-based) call.
    pub fn fail_on_call(self, call: usize, error: TrackerError) -> Self {
        self.inner.lock().unwrap().fail_on = Some((call, error));
        self
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl RevisionSource for MockTracker {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_revisions(
        &self,
        id: WorkItemId,
        skip: usize,
        top: Option<usize>,
    ) -> Result<Vec<Snapshot>, TrackerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(MockCall { id, skip, top });

        if let Some((call, error)) = &inner.fail_on {
            if *call == inner.calls.len() {
                return Err(error.clone());
            }
        }

        Ok(inner
            .revisions
            .iter()
            .skip(skip)
            .take(top.unwrap_or(inner.page_size))
            .cloned()
            .collect())
    }
}
