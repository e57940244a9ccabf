//! Client for the profile data-fetch endpoint.
//!
//! GET with query parameters and an API-key header. The response is a
//! loosely-typed document; schema validation and the manual-extraction
//! fallback happen worker-side, so this client only guarantees "valid JSON
//! object arrived".

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clients::retry::{call_with_retry, CallError, RetryPolicy};

/// Fields we ask the data provider for.
const REQUESTED_FIELDS: &str = "headline,summary,skills,positions,education";

/// Seam for the profile fetch backend.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(
        &self,
        profile_url: &str,
        token: &CancellationToken,
    ) -> Result<Value, CallError>;
}

pub struct ProfileClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl ProfileClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            policy: RetryPolicy::new(3, std::time::Duration::from_secs(15)),
        }
    }

    async fn attempt(&self, profile_url: &str) -> Result<Value, CallError> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&[("url", profile_url), ("fields", REQUESTED_FIELDS)])
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CallError::status(status.as_u16(), message));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| CallError::Shape(format!("profile response is not valid JSON: {e}")))?;
        if !document.is_object() {
            return Err(CallError::Shape(
                "profile response is not a JSON object".to_string(),
            ));
        }

        debug!("Profile fetch succeeded for {profile_url}");
        Ok(document)
    }
}

#[async_trait]
impl ProfileSource for ProfileClient {
    async fn fetch(
        &self,
        profile_url: &str,
        token: &CancellationToken,
    ) -> Result<Value, CallError> {
        call_with_retry(&self.policy, token, "profile_fetch", || {
            self.attempt(profile_url)
        })
        .await
    }
}
