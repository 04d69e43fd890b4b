//! Client side of the upload server

use std::time::Duration;

use fleetsheet_types::{Error, Result, VehicleRecord};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

/// Posts a client CSV to a running upload server and reads back the records
pub struct UploadClient {
    http: reqwest::Client,
    server_url: String,
    timeout: Duration,
}

impl UploadClient {
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.into(),
            timeout,
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.server_url.trim_end_matches('/'))
    }

    /// Send the CSV as the `file` field of a multipart form
    pub async fn upload(&self, file_name: &str, csv: Vec<u8>) -> Result<Vec<VehicleRecord>> {
        let url = self.upload_url();
        debug!(url = %url, file_name = %file_name, bytes = csv.len(), "Uploading client CSV");

        let part = Part::bytes(csv)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| Error::Server(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Server(format!("upload to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Server(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Server(format!(
                "server returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        parse_records(&body)
    }
}

/// Accepts a bare array or an object wrapping it under `data`
fn parse_records(body: &str) -> Result<Vec<VehicleRecord>> {
    let payload: Value = serde_json::from_str(body)?;
    let items = match payload {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    if !items.is_array() {
        return Err(Error::Server("expected a JSON array of records".to_string()));
    }
    Ok(serde_json::from_value(items)?)
}
