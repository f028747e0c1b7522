//! REST client for the billing free-resources usage query.
//!
//! Wraps the provider's pay-per-use billing endpoint using [`reqwest`].
//! Every request is signed with the SDK-HMAC-SHA256 scheme from
//! [`trafficwatch_core::signing`].

use std::time::Duration;

use serde::Deserialize;
use trafficwatch_core::signing::{self, Credentials, SigningRequest};
use trafficwatch_core::usage::UsageRecord;

/// Production endpoint for the free-resource usage query.
pub const DEFAULT_ENDPOINT: &str = "https://bss.myhuaweicloud.com";

const QUERY_PATH: &str = "/v2/payments/free-resources/usages/details/query";

/// HTTP request timeout for a single query.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the billing API layer.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("billing API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("malformed billing response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured endpoint is not an http(s) URL.
    #[error("invalid billing endpoint: {0}")]
    Endpoint(String),
}

/// Signed HTTP client for the billing API.
pub struct BillingClient {
    client: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    #[serde(default)]
    free_resources: Vec<UsageRecord>,
}

impl BillingClient {
    /// Create a client for the given endpoint (see [`DEFAULT_ENDPOINT`]).
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        }
    }

    /// Query remaining free-resource usage for the given resource ids.
    ///
    /// Returns one [`UsageRecord`] per resource the API reports on. The
    /// caller decides what an empty list means.
    pub async fn fetch_usage(
        &self,
        resource_ids: &[String],
    ) -> Result<Vec<UsageRecord>, BillingError> {
        let body = serde_json::json!({ "free_resource_ids": resource_ids }).to_string();
        let host = host_of(&self.endpoint)?;

        let headers = vec![
            ("host".to_string(), host),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        let request = SigningRequest {
            method: "POST",
            path: QUERY_PATH,
            query: &[],
            headers: &headers,
            body: body.as_bytes(),
        };
        let signature = signing::sign(&request, &self.credentials, chrono::Utc::now());

        tracing::debug!(endpoint = %self.endpoint, resources = resource_ids.len(), "Querying free-resource usage");

        let response = self
            .client
            .post(format!("{}{QUERY_PATH}", self.endpoint))
            .header("Content-Type", "application/json")
            .header(signing::DATE_HEADER, &signature.sdk_date)
            .header("Authorization", &signature.authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BillingError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: UsageResponse = serde_json::from_str(&text)?;
        Ok(parsed.free_resources)
    }
}

/// Extract the host component of an http(s) endpoint for the signed
/// `Host` header.
fn host_of(endpoint: &str) -> Result<String, BillingError> {
    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| BillingError::Endpoint(endpoint.to_string()))?;
    let host = rest.split('/').next().unwrap_or(rest);
    if host.is_empty() {
        return Err(BillingError::Endpoint(endpoint.to_string()));
    }
    Ok(host.to_string())
}
