//! Label color lookup with per-record failure isolation

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use fleetsheet_domain::service::first_label_id;
use fleetsheet_types::{value_to_string, ResolutionError, VehicleRecord};

use super::TokenCache;

/// What happened to one record during enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LabelOutcome {
    /// No usable label id, no request made
    Skipped,
    Resolved {
        label_id: String,
        color_code: String,
    },
    Failed {
        label_id: String,
        #[serde(serialize_with = "serialize_display")]
        error: ResolutionError,
    },
}

impl LabelOutcome {
    pub fn color_code(&self) -> Option<&str> {
        match self {
            LabelOutcome::Resolved { color_code, .. } => Some(color_code),
            _ => None,
        }
    }
}

fn serialize_display<S: serde::Serializer>(
    error: &ResolutionError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Enriched records plus the per-record outcome, index-aligned
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    pub records: Vec<VehicleRecord>,
    pub outcomes: Vec<LabelOutcome>,
}

impl EnrichmentReport {
    pub fn resolved(&self) -> usize {
        self.count(|o| matches!(o, LabelOutcome::Resolved { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, LabelOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, LabelOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&LabelOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Resolves each record's primary label id to a display color.
///
/// Lookups run with bounded concurrency; output order always matches input
/// order. A failed lookup leaves that record's `colorCode` unset and never
/// affects its siblings.
pub struct LabelColorResolver {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenCache>,
    timeout: Duration,
    concurrency: usize,
}

impl LabelColorResolver {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        tokens: Arc<TokenCache>,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            http,
            base_url,
            tokens,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve colors for a batch.
    ///
    /// One token is fetched for the whole batch. If it cannot be obtained,
    /// every record with a label id fails with `ResolutionError::Token`. A
    /// token rejected with 401 is invalidated once after the batch, so the
    /// next batch logs in again.
    pub async fn resolve(&self, records: Vec<VehicleRecord>) -> EnrichmentReport {
        let label_ids: Vec<Option<String>> = records
            .iter()
            .map(|record| first_label_id(record.label_ids.as_deref()))
            .collect();

        let token = if label_ids.iter().any(Option::is_some) {
            Some(self.tokens.get_token().await.map_err(|e| e.to_string()))
        } else {
            None
        };

        let outcomes: Vec<LabelOutcome> = match &token {
            Some(Ok(token)) => {
                stream::iter(label_ids)
                    .map(|label_id| self.resolve_one(token, label_id))
                    .buffered(self.concurrency)
                    .collect()
                    .await
            }
            Some(Err(reason)) => {
                warn!(error = %reason, "No access token, label colors unavailable");
                label_ids
                    .into_iter()
                    .map(|label_id| match label_id {
                        Some(label_id) => LabelOutcome::Failed {
                            label_id,
                            error: ResolutionError::Token(reason.clone()),
                        },
                        None => LabelOutcome::Skipped,
                    })
                    .collect()
            }
            None => label_ids.iter().map(|_| LabelOutcome::Skipped).collect(),
        };

        if let Some(Ok(token)) = &token {
            let rejected = outcomes.iter().any(|o| {
                matches!(
                    o,
                    LabelOutcome::Failed {
                        error: ResolutionError::Status(401),
                        ..
                    }
                )
            });
            if rejected {
                // next batch logs in again
                self.tokens.invalidate(token).await;
            }
        }

        let records: Vec<VehicleRecord> = records
            .into_iter()
            .zip(&outcomes)
            .map(|(mut record, outcome)| {
                record.color_code = outcome.color_code().map(str::to_string);
                record
            })
            .collect();

        let report = EnrichmentReport { records, outcomes };
        info!(
            resolved = report.resolved(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Label colors resolved"
        );
        report
    }

    async fn resolve_one(&self, token: &str, label_id: Option<String>) -> LabelOutcome {
        let Some(label_id) = label_id else {
            return LabelOutcome::Skipped;
        };

        match self.lookup(token, &label_id).await {
            Ok(color_code) => {
                debug!(label_id = %label_id, color_code = %color_code, "Resolved label color");
                LabelOutcome::Resolved {
                    label_id,
                    color_code,
                }
            }
            Err(error) => {
                warn!(label_id = %label_id, error = %error, "Label color lookup failed");
                LabelOutcome::Failed { label_id, error }
            }
        }
    }

    async fn lookup(&self, token: &str, label_id: &str) -> Result<String, ResolutionError> {
        let response = self
            .http
            .get(self.label_url(label_id)?)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ResolutionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Status(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ResolutionError::Malformed(e.to_string()))?;

        first_color(label_id, &payload)
    }

    fn label_url(&self, label_id: &str) -> Result<Url, ResolutionError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ResolutionError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ResolutionError::Request(format!("bad base url {}", self.base_url)))?
            .pop_if_empty()
            .push(label_id);
        Ok(url)
    }
}

fn first_color(label_id: &str, payload: &Value) -> Result<String, ResolutionError> {
    let items = payload
        .as_array()
        .ok_or_else(|| ResolutionError::Malformed("expected a JSON array".to_string()))?;
    let first = items
        .first()
        .ok_or_else(|| ResolutionError::Empty(label_id.to_string()))?;

    first
        .get("colorCode")
        .and_then(value_to_string)
        .ok_or_else(|| ResolutionError::MissingColor(label_id.to_string()))
}
