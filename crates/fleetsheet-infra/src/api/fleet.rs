//! Active-vehicle fetch from the fleet API

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use fleetsheet_domain::service::project;
use fleetsheet_types::{UpstreamError, VehicleRecord};

use super::TokenCache;

/// Fetches the authoritative vehicle list.
///
/// No retries, except one forced re-login when the cached token is
/// rejected with 401.
pub struct FleetFetcher {
    http: reqwest::Client,
    url: String,
    tokens: Arc<TokenCache>,
    timeout: Duration,
}

impl FleetFetcher {
    pub fn new(
        http: reqwest::Client,
        url: String,
        tokens: Arc<TokenCache>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            url,
            tokens,
            timeout,
        }
    }

    /// Fetch all active vehicles, projected onto the canonical columns
    pub async fn fetch_active(&self) -> Result<Vec<VehicleRecord>, UpstreamError> {
        let token = self.tokens.get_token().await?;

        let rows = match self.request(&token).await {
            Err(UpstreamError::Status { status: 401, .. }) => {
                warn!("Fleet endpoint rejected the cached token, logging in again");
                self.tokens.invalidate(&token).await;
                let fresh = self.tokens.get_token().await?;
                self.request(&fresh).await?
            }
            other => other?,
        };

        info!(count = rows.len(), "Fetched active vehicles");
        Ok(project(&rows))
    }

    async fn request(&self, token: &str) -> Result<Vec<Map<String, Value>>, UpstreamError> {
        debug!(url = %self.url, "Requesting active vehicles");

        let response = self
            .http
            .get(&self.url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Payload(e.to_string()))?;

        into_rows(payload)
    }
}

fn into_rows(payload: Value) -> Result<Vec<Map<String, Value>>, UpstreamError> {
    let Value::Array(items) = payload else {
        return Err(UpstreamError::Payload("expected a JSON array".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(UpstreamError::Payload(format!(
                "element {} is not an object: {}",
                idx, other
            ))),
        })
        .collect()
}
