//! Error types for fleetsheet

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Credential issuance failed. Fatal to a pipeline run.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login request failed: {0}")]
    Request(String),

    #[error("Login rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Login response has no access token: {0}")]
    MissingToken(String),
}

/// Fleet fetch failed. Fatal to a pipeline run.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Fleet request failed: {0}")]
    Request(String),

    #[error("Fleet endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed fleet payload: {0}")]
    Payload(String),
}

/// Label lookup failed for a single record. Logged and isolated, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("No access token: {0}")]
    Token(String),

    #[error("Label request failed: {0}")]
    Request(String),

    #[error("Label endpoint returned status {0}")]
    Status(u16),

    #[error("Label {0} not found")]
    Empty(String),

    #[error("Malformed label payload: {0}")]
    Malformed(String),

    #[error("Label {0} has no color code")]
    MissingColor(String),
}

/// Client CSV errors
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("Failed to parse CSV: {0}")]
    Parse(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV upload is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Excel export error: {0}")]
    Excel(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Invalid keys: {0}")]
    InvalidKeys(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
