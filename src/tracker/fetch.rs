//! tracker::fetch
//!
//! Paged retrieval of a work item's complete revision history.
//!
//! # Paging
//!
//! The tracker caps the number of revisions a single call returns and does
//! not document the cap. Unless an explicit page size is configured, the
//! size of the first page is taken as the cap. A configured size is sent
//! with every request (`$top`) so the service pages by the same amount.
//!
//! Following calls advance the offset by the page size. Paging continues
//! only while a page is exactly full: an empty page, or one whose length
//! differs from the page size, is the last one. With an inferred size a
//! history that fits in the first page therefore costs one extra, empty
//! request.
//!
//! # Failure policy
//!
//! Fetching is best effort: the first error stops paging, is logged, and
//! is returned in [`FetchOutcome::aborted`] alongside whatever revisions
//! were already received. Nothing is retried.
//!
//! # Example
//!
//! ```
//! use ado_history::core::types::{Snapshot, WorkItemId};
//! use ado_history::tracker::fetch::{fetch_all_revisions, FetchOptions};
//! use ado_history::tracker::mock::MockTracker;
//!
//! # tokio_test::block_on(async {
//! let revisions: Vec<_> = (1..=5).map(Snapshot::new).collect();
//! let tracker = MockTracker::new(revisions, 2);
//! let id = WorkItemId::new(7).unwrap();
//!
//! let outcome = fetch_all_revisions(&tracker, id, &FetchOptions::default()).await;
//! assert_eq!(outcome.revisions.len(), 5);
//! assert_eq!(outcome.requests, 3);
//! assert!(outcome.is_complete());
//! # });
//! ```

use log::{debug, error, info, warn};

use super::traits::{RevisionSource, TrackerError};
use crate::core::types::{Snapshot, WorkItemId};

/// Options controlling the paged fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Page size to request instead of inferring it from the first page.
    /// Zero is treated as unset.
    pub page_size: Option<usize>,
}

/// Result of a paged fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Revisions received, oldest first
    pub revisions: Vec<Snapshot>,
    /// Number of page requests issued
    pub requests: usize,
    /// Error that stopped the fetch early, if any
    pub aborted: Option<TrackerError>,
}

impl FetchOutcome {
    /// Check whether every page was received.
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

/// Fetch every revision of `id`, oldest first.
///
/// Never fails; see the module docs for the failure policy.
pub async fn fetch_all_revisions(
    source: &dyn RevisionSource,
    id: WorkItemId,
    options: &FetchOptions,
) -> FetchOutcome {
    let mut revisions = Vec::new();
    let requested = options.page_size.filter(|n| *n > 0);
    let mut page_size = requested;
    let mut skip = 0usize;
    let mut requests = 0usize;
    let mut aborted = None;

    loop {
        requests += 1;
        debug!(
            "{}: requesting revision batch {} for item {} (skip {})",
            source.name(),
            requests,
            id,
            skip
        );

        let page = match source.get_revisions(id, skip, requested).await {
            Ok(page) => page,
            Err(e) => {
                error!(
                    "{}: fetching revisions of item {} failed after {} revisions: {}",
                    source.name(),
                    id,
                    revisions.len(),
                    e
                );
                aborted = Some(e);
                break;
            }
        };

        let count = page.len();
        revisions.extend(page);

        let size = *page_size.get_or_insert(count);
        if count > size {
            warn!(
                "{}: page at offset {} held {} revisions, more than the page size of {}; stopping",
                source.name(),
                skip,
                count,
                size
            );
        }
        if count == 0 || count != size {
            break;
        }

        skip += size;
    }

    info!(
        "retrieved {} revisions of item {} in {} requests",
        revisions.len(),
        id,
        requests
    );

    FetchOutcome {
        revisions,
        requests,
        aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::mock::{MockCall, MockTracker};

    fn revisions(count: u32) -> Vec<Snapshot> {
        (1..=count).map(Snapshot::new).collect()
    }

    fn id() -> WorkItemId {
        WorkItemId::new(42).unwrap()
    }

    fn revs(outcome: &FetchOutcome) -> Vec<u32> {
        outcome.revisions.iter().map(|s| s.rev).collect()
    }

    fn call(skip: usize, top: Option<usize>) -> MockCall {
        MockCall { id: id(), skip, top }
    }

    #[tokio::test]
    async fn inferred_size_confirms_end_with_empty_page() {
        // The first page sets the size, so a short history looks full
        let tracker = MockTracker::new(revisions(3), 200);
        let outcome = fetch_all_revisions(&tracker, id(), &FetchOptions::default()).await;

        assert_eq!(revs(&outcome), vec![1, 2, 3]);
        assert_eq!(tracker.calls(), vec![call(0, None), call(3, None)]);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn explicit_size_short_page_stops_after_one_call() {
        let tracker = MockTracker::new(revisions(3), 200);
        let options = FetchOptions { page_size: Some(50) };
        let outcome = fetch_all_revisions(&tracker, id(), &options).await;

        assert_eq!(revs(&outcome), vec![1, 2, 3]);
        assert_eq!(tracker.calls(), vec![call(0, Some(50))]);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn empty_first_page_stops_after_one_call() {
        let tracker = MockTracker::new(Vec::new(), 200);
        let outcome = fetch_all_revisions(&tracker, id(), &FetchOptions::default()).await;

        assert!(outcome.revisions.is_empty());
        assert_eq!(outcome.requests, 1);
    }

    #[tokio::test]
    async fn infers_page_size_from_first_page() {
        let tracker = MockTracker::new(revisions(7), 3);
        let outcome = fetch_all_revisions(&tracker, id(), &FetchOptions::default()).await;

        assert_eq!(revs(&outcome), (1..=7).collect::<Vec<_>>());
        assert_eq!(
            tracker.calls(),
            vec![call(0, None), call(3, None), call(6, None)]
        );
    }

    #[tokio::test]
    async fn exact_multiple_needs_one_empty_page() {
        let tracker = MockTracker::new(revisions(6), 3);
        let outcome = fetch_all_revisions(&tracker, id(), &FetchOptions::default()).await;

        assert_eq!(outcome.revisions.len(), 6);
        assert_eq!(outcome.requests, 3);
    }

    #[tokio::test]
    async fn smaller_explicit_size_is_requested() {
        let tracker = MockTracker::new(revisions(5), 5);
        let options = FetchOptions { page_size: Some(2) };
        let outcome = fetch_all_revisions(&tracker, id(), &options).await;

        assert_eq!(revs(&outcome), vec![1, 2, 3, 4, 5]);
        assert_eq!(
            tracker.calls(),
            vec![call(0, Some(2)), call(2, Some(2)), call(4, Some(2))]
        );
    }

    #[tokio::test]
    async fn larger_explicit_size_is_requested() {
        let tracker = MockTracker::new(revisions(5), 2);
        let options = FetchOptions { page_size: Some(200) };
        let outcome = fetch_all_revisions(&tracker, id(), &options).await;

        assert_eq!(revs(&outcome), vec![1, 2, 3, 4, 5]);
        assert_eq!(outcome.requests, 1);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn oversized_page_ends_paging() {
        struct Oversized;

        #[async_trait::async_trait]
        impl RevisionSource for Oversized {
            fn name(&self) -> &'static str {
                "oversized"
            }

            async fn get_revisions(
                &self,
                _id: WorkItemId,
                skip: usize,
                _top: Option<usize>,
            ) -> Result<Vec<Snapshot>, TrackerError> {
                Ok((1..=4).map(|n| Snapshot::new(skip as u32 + n)).collect())
            }
        }

        let options = FetchOptions { page_size: Some(2) };
        let outcome = fetch_all_revisions(&Oversized, id(), &options).await;

        assert_eq!(revs(&outcome), vec![1, 2, 3, 4]);
        assert_eq!(outcome.requests, 1);
    }

    #[tokio::test]
    async fn zero_page_size_is_inferred() {
        let tracker = MockTracker::new(revisions(5), 2);
        let options = FetchOptions { page_size: Some(0) };
        let outcome = fetch_all_revisions(&tracker, id(), &options).await;

        assert_eq!(outcome.revisions.len(), 5);
        assert!(tracker.calls().iter().all(|c| c.top.is_none()));
    }

    #[tokio::test]
    async fn failure_keeps_partial_results() {
        let tracker = MockTracker::new(revisions(7), 3)
            .fail_on_call(2, TrackerError::NetworkError("connection reset".into()));
        let outcome = fetch_all_revisions(&tracker, id(), &FetchOptions::default()).await;

        assert_eq!(revs(&outcome), vec![1, 2, 3]);
        assert_eq!(outcome.requests, 2);
        assert_eq!(
            outcome.aborted,
            Some(TrackerError::NetworkError("connection reset".into()))
        );
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn failure_on_first_call_returns_nothing() {
        let tracker = MockTracker::new(revisions(3), 3)
            .fail_on_call(1, TrackerError::AuthFailed("bad token".into()));
        let outcome = fetch_all_revisions(&tracker, id(), &FetchOptions::default()).await;

        assert!(outcome.revisions.is_empty());
        assert!(matches!(outcome.aborted, Some(TrackerError::AuthFailed(_))));
    }
}
