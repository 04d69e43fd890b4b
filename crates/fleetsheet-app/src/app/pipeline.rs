//! Pipeline Service - Core Use Case for Fleet Reconciliation
//!
//! Orchestrates one upload:
//! 1. Parse the client CSV (when given raw bytes)
//! 2. Fetch the active fleet (logging in on first use)
//! 3. Reconcile external and client records
//! 4. Resolve label colors per record
//! 5. Return the enriched records with the per-record report

use fleetsheet_domain::service::reconcile;
use fleetsheet_infra::api::{ApiSettings, EnrichmentReport, FleetApi, LabelOutcome};
use fleetsheet_infra::client_csv::load_client_records;
use fleetsheet_types::{Error, Result, UpstreamError, VehicleRecord};
use serde::Serialize;
use tracing::{debug, info};

/// Result of a pipeline run; `outcomes` is index-aligned with `records`
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub records: Vec<VehicleRecord>,
    #[serde(skip)]
    pub outcomes: Vec<LabelOutcome>,
}

impl From<EnrichmentReport> for PipelineOutput {
    fn from(report: EnrichmentReport) -> Self {
        Self {
            records: report.records,
            outcomes: report.outcomes,
        }
    }
}

impl PipelineOutput {
    /// Outcomes of records whose label lookup failed, with their record
    pub fn failures(&self) -> impl Iterator<Item = (&VehicleRecord, &LabelOutcome)> {
        self.records
            .iter()
            .zip(&self.outcomes)
            .filter(|(_, outcome)| matches!(outcome, LabelOutcome::Failed { .. }))
    }
}

/// Fetch, reconcile, and enrich against one fleet API
#[derive(Clone)]
pub struct Pipeline {
    api: FleetApi,
}

impl Pipeline {
    pub fn new(api: FleetApi) -> Self {
        Self { api }
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self> {
        Ok(Self::new(FleetApi::new(settings)?))
    }

    pub fn api(&self) -> &FleetApi {
        &self.api
    }

    /// Run the whole pipeline for already-parsed client records.
    ///
    /// Login and fleet failures abort the run. Label lookup failures are
    /// recorded in the report and leave `colorCode` unset.
    pub async fn run(&self, client: Vec<VehicleRecord>) -> Result<PipelineOutput> {
        info!(client = client.len(), "Starting reconciliation");

        let external = self.api.fleet.fetch_active().await.map_err(|e| match e {
            UpstreamError::Auth(auth) => Error::Auth(auth),
            other => Error::Upstream(other),
        })?;

        let reconciled = reconcile(external, client);
        debug!(records = reconciled.len(), "Reconciled record set");

        let report = self.api.labels.resolve(reconciled.into_records()).await;
        info!(
            records = report.records.len(),
            failed = report.failed(),
            "Pipeline finished"
        );

        Ok(report.into())
    }

    /// Parse an uploaded CSV, then run
    pub async fn run_csv(&self, bytes: &[u8]) -> Result<PipelineOutput> {
        let client = load_client_records(bytes)?;
        self.run(client).await
    }
}
