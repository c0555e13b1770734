//! Integration tests for revision retrieval.
//!
//! The Azure DevOps client is exercised against a local wiremock server.
//! Live API tests are behind the `live_ado_tests` feature flag.

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ado_history::core::types::{FieldValue, Identity, WorkItemId};
use ado_history::tracker::{
    fetch_all_revisions, AzureDevOpsClient, FetchOptions, RevisionSource, TrackerError,
};

const ORG: &str = "contoso";
const PAT: &str = "pat";
/// base64(":pat")
const AUTH_HEADER: &str = "Basic OnBhdA==";
const REVISIONS_PATH: &str = "/contoso/_apis/wit/workItems/42/revisions";

fn id() -> WorkItemId {
    WorkItemId::new(42).unwrap()
}

fn revision(rev: u32) -> Value {
    json!({
        "id": 42,
        "rev": rev,
        "fields": {
            "System.Rev": rev,
            "System.Title": format!("Title {}", rev),
            "System.ChangedDate": "2024-03-01T09:15:00.123Z",
            "System.ChangedBy": {
                "displayName": "Jane Doe",
                "uniqueName": "jane@contoso.com"
            }
        }
    })
}

fn page(revs: std::ops::RangeInclusive<u32>) -> ResponseTemplate {
    let value: Vec<Value> = revs.map(revision).collect();
    ResponseTemplate::new(200).set_body_json(json!({ "count": value.len(), "value": value }))
}

async fn mount_page(server: &MockServer, skip: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(REVISIONS_PATH))
        .and(query_param("$skip", skip))
        .and(query_param_is_missing("$top"))
        .and(query_param("$expand", "all"))
        .and(query_param("api-version", "7.1"))
        .and(header("authorization", AUTH_HEADER))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> AzureDevOpsClient {
    AzureDevOpsClient::with_api_base(ORG, PAT, server.uri())
}

// =============================================================================
// Single page requests
// =============================================================================

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn converts_fields() {
        let server = MockServer::start().await;
        mount_page(&server, "0", page(1..=1)).await;

        let revisions = client(&server).get_revisions(id(), 0, None).await.unwrap();

        assert_eq!(revisions.len(), 1);
        let snapshot = &revisions[0];
        assert_eq!(snapshot.rev, 1);
        assert_eq!(snapshot.field("System.Rev"), Some(&FieldValue::Integer(1)));
        assert_eq!(
            snapshot.field("System.ChangedBy"),
            Some(&FieldValue::Identity(Identity::new("Jane Doe", "jane@contoso.com")))
        );
        assert_eq!(
            snapshot.field("System.ChangedDate").map(ToString::to_string),
            Some("2024-03-01 09:15:00".to_string())
        );
    }

    async fn error_for(status: u16, body: Value) -> TrackerError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REVISIONS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        client(&server).get_revisions(id(), 0, None).await.unwrap_err()
    }

    #[tokio::test]
    async fn unauthorized_is_auth_failed() {
        let err = error_for(401, json!({})).await;
        assert!(matches!(err, TrackerError::AuthFailed(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn sign_in_page_is_auth_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(203).set_body_raw("<html>Sign In</html>", "text/html"),
            )
            .mount(&server)
            .await;

        let err = client(&server).get_revisions(id(), 0, None).await.unwrap_err();
        assert!(matches!(err, TrackerError::AuthFailed(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let err = error_for(
            404,
            json!({ "message": "TF401232: Work item 42 does not exist" }),
        )
        .await;
        assert_eq!(
            err,
            TrackerError::NotFound("TF401232: Work item 42 does not exist".into())
        );
    }

    #[tokio::test]
    async fn throttling_is_rate_limited() {
        assert_eq!(error_for(429, json!({})).await, TrackerError::RateLimited);
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let err = error_for(503, json!({ "message": "down" })).await;
        assert!(
            matches!(err, TrackerError::ApiError { status: 503, .. }),
            "{:?}",
            err
        );
    }

    #[tokio::test]
    async fn malformed_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let err = client(&server).get_revisions(id(), 0, None).await.unwrap_err();
        assert!(matches!(err, TrackerError::ApiError { status: 200, .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let client = AzureDevOpsClient::with_api_base(ORG, PAT, "http://127.0.0.1:9");
        let err = client.get_revisions(id(), 0, None).await.unwrap_err();
        assert!(matches!(err, TrackerError::NetworkError(_)), "{:?}", err);
    }
}

// =============================================================================
// Paged retrieval
// =============================================================================

mod paging_tests {
    use super::*;

    #[tokio::test]
    async fn pages_until_short_page() {
        let server = MockServer::start().await;
        mount_page(&server, "0", page(1..=2)).await;
        mount_page(&server, "2", page(3..=4)).await;
        mount_page(&server, "4", page(5..=5)).await;

        let outcome = fetch_all_revisions(&client(&server), id(), &FetchOptions::default()).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.requests, 3);
        assert_eq!(
            outcome.revisions.iter().map(|s| s.rev).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[tokio::test]
    async fn empty_history_is_one_request() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "0",
            ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "value": [] })),
        )
        .await;

        let outcome = fetch_all_revisions(&client(&server), id(), &FetchOptions::default()).await;

        assert!(outcome.revisions.is_empty());
        assert_eq!(outcome.requests, 1);
    }

    async fn mount_sized_page(
        server: &MockServer,
        skip: &str,
        top: &str,
        response: ResponseTemplate,
    ) {
        Mock::given(method("GET"))
            .and(path(REVISIONS_PATH))
            .and(query_param("$skip", skip))
            .and(query_param("$top", top))
            .and(header("authorization", AUTH_HEADER))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn explicit_page_size_is_sent() {
        let server = MockServer::start().await;
        mount_sized_page(&server, "0", "3", page(1..=3)).await;
        mount_sized_page(&server, "3", "3", page(4..=4)).await;

        let options = FetchOptions { page_size: Some(3) };
        let outcome = fetch_all_revisions(&client(&server), id(), &options).await;

        assert!(outcome.is_complete());
        assert_eq!(
            outcome.revisions.iter().map(|s| s.rev).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[tokio::test]
    async fn explicit_page_size_covering_history_is_one_request() {
        let server = MockServer::start().await;
        mount_sized_page(&server, "0", "200", page(1..=5)).await;

        let options = FetchOptions { page_size: Some(200) };
        let outcome = fetch_all_revisions(&client(&server), id(), &options).await;

        assert_eq!(outcome.revisions.len(), 5);
        assert_eq!(outcome.requests, 1);
    }

    #[tokio::test]
    async fn error_mid_way_keeps_earlier_pages() {
        let server = MockServer::start().await;
        mount_page(&server, "0", page(1..=2)).await;
        mount_page(&server, "2", ResponseTemplate::new(401)).await;

        let outcome = fetch_all_revisions(&client(&server), id(), &FetchOptions::default()).await;

        assert_eq!(outcome.revisions.len(), 2);
        assert!(matches!(outcome.aborted, Some(TrackerError::AuthFailed(_))));
    }
}

// =============================================================================
// Live API tests (require credentials)
// =============================================================================

#[cfg(feature = "live_ado_tests")]
mod live_tests {
    use super::*;

    fn live_settings() -> Option<(String, String, WorkItemId)> {
        let org = std::env::var("ADO_HISTORY_TEST_ORG").ok()?;
        let pat = std::env::var("ADO_HISTORY_PAT").ok()?;
        let item = std::env::var("ADO_HISTORY_TEST_ITEM").ok()?;
        Some((org, pat, WorkItemId::parse(&item).ok()?))
    }

    #[tokio::test]
    async fn live_fetch_full_history() {
        let Some((org, pat, item)) = live_settings() else {
            eprintln!("skipping: ADO_HISTORY_TEST_ORG/ADO_HISTORY_PAT/ADO_HISTORY_TEST_ITEM not set");
            return;
        };

        let client = AzureDevOpsClient::new(org, pat);
        let outcome = fetch_all_revisions(&client, item, &FetchOptions::default()).await;

        assert!(outcome.is_complete(), "{:?}", outcome.aborted);
        assert!(!outcome.revisions.is_empty());
        assert_eq!(outcome.revisions[0].rev, 1);
    }
}
