//! tracker::azure
//!
//! Azure DevOps implementation of [`RevisionSource`] over the REST API.
//!
//! # Authentication
//!
//! Personal access tokens are sent with HTTP Basic auth: an empty user name
//! and the token as password. A rejected token is sometimes answered with
//! `203 Non-Authoritative Information` and an HTML sign-in page instead of a
//! 401; both are reported as [`TrackerError::AuthFailed`].
//!
//! # Rate Limiting
//!
//! A 429 response yields [`TrackerError::RateLimited`]. Retrying is left to
//! the caller.
//!
//! # Example
//!
//! ```ignore
//! use ado_history::tracker::azure::AzureDevOpsClient;
//! use ado_history::tracker::RevisionSource;
//!
//! let client = AzureDevOpsClient::new("contoso", pat);
//! let page = client.get_revisions(id, 0, None).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, trace};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::traits::{RevisionSource, TrackerError};
use crate::core::config::DEFAULT_API_BASE;
use crate::core::types::{FieldValue, Identity, Snapshot, WorkItemId};

/// REST API version requested.
pub const API_VERSION: &str = "7.1";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("ado-history/", env!("CARGO_PKG_VERSION"));

/// Azure DevOps work item tracking client.
pub struct AzureDevOpsClient {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token
    token: String,
    /// Organization that owns the work items
    organization: String,
    /// API base URL (configurable for on-premises servers)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for AzureDevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDevOpsClient")
            .field("has_token", &!self.token.is_empty())
            .field("organization", &self.organization)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AzureDevOpsClient {
    /// Create a client for `organization` on `https://dev.azure.com`.
    pub fn new(organization: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_api_base(organization, token, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base URL.
    ///
    /// Use this for Azure DevOps Server installations and tests.
    pub fn with_api_base(
        organization: impl Into<String>,
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token: token.into(),
            organization: organization.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Get the organization.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build the revisions URL for a work item (without query string).
    pub fn revisions_url(&self, id: WorkItemId) -> String {
        format!(
            "{}/{}/_apis/wit/workItems/{}/revisions",
            self.api_base, self.organization, id
        )
    }

    /// Handle API response, converting errors appropriately.
    async fn handle_response(&self, response: Response) -> Result<RevisionList, TrackerError> {
        let status = response.status();

        if status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            return Err(TrackerError::AuthFailed(
                "server answered with a sign-in page".into(),
            ));
        }

        if status.is_success() {
            response.json().await.map_err(|e| TrackerError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(self.handle_error_response(response, status).await)
        }
    }

    async fn handle_error_response(&self, response: Response, status: StatusCode) -> TrackerError {
        // Try to get error message from body
        let message = match response.json::<AzureErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => TrackerError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => TrackerError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => TrackerError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => TrackerError::RateLimited,
            _ if status.is_server_error() => TrackerError::ApiError {
                status: status.as_u16(),
                message: format!("Azure DevOps server error: {}", message),
            },
            _ => TrackerError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl RevisionSource for AzureDevOpsClient {
    fn name(&self) -> &'static str {
        "azure-devops"
    }

    async fn get_revisions(
        &self,
        id: WorkItemId,
        skip: usize,
        top: Option<usize>,
    ) -> Result<Vec<Snapshot>, TrackerError> {
        if self.token.is_empty() {
            return Err(TrackerError::AuthRequired);
        }

        let url = self.revisions_url(id);
        debug!("GET {} (skip {}, top {:?})", url, skip, top);

        let mut query = vec![
            ("$skip", skip.to_string()),
            ("$expand", "all".to_string()),
            ("api-version", API_VERSION.to_string()),
        ];
        if let Some(top) = top {
            query.push(("$top", top.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .basic_auth("", Some(&self.token))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await
            .map_err(|e| TrackerError::NetworkError(e.to_string()))?;

        let list = self.handle_response(response).await?;
        trace!("received {} of {} revisions", list.value.len(), list.count);

        Ok(list.value.into_iter().map(WorkItemRevision::into_snapshot).collect())
    }
}

// =============================================================================
// Azure DevOps API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RevisionList {
    #[serde(default)]
    count: usize,
    #[serde(default)]
    value: Vec<WorkItemRevision>,
}

#[derive(Debug, Deserialize)]
struct WorkItemRevision {
    rev: u32,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

impl WorkItemRevision {
    fn into_snapshot(self) -> Snapshot {
        Snapshot {
            rev: self.rev,
            fields: self
                .fields
                .into_iter()
                .map(|(name, value)| (name, field_value_from_json(value)))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AzureErrorResponse {
    message: String,
}

/// Convert a JSON field value into a [`FieldValue`].
///
/// Strings holding a full RFC 3339 timestamp become dates. Objects carrying
/// a `displayName` are identity references; any other object or array is
/// kept as its compact JSON text.
pub fn field_value_from_json(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Empty,
        Value::Bool(b) => FieldValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
            Ok(date) => FieldValue::Date(date.with_timezone(&Utc)),
            Err(_) => FieldValue::Text(s),
        },
        Value::Object(map) => match map.get("displayName").and_then(Value::as_str) {
            Some(display) => {
                let unique = map
                    .get("uniqueName")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                FieldValue::Identity(Identity::new(display, unique))
            }
            None => FieldValue::Text(Value::Object(map).to_string()),
        },
        Value::Array(_) => FieldValue::Text(value.to_string()),
    }
}
