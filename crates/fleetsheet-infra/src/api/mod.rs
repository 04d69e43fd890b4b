//! Clients for the remote fleet-management API
//!
//! All three endpoints share one `reqwest::Client` and one [`TokenCache`].

mod fleet;
mod labels;
mod token_cache;

pub use fleet::FleetFetcher;
pub use labels::{EnrichmentReport, LabelColorResolver, LabelOutcome};
pub use token_cache::{Credential, Login, TokenCache};

use std::sync::Arc;
use std::time::Duration;

use fleetsheet_types::{ConfigError, Error};

pub const LOGIN_PATH: &str = "/index.php/login";
pub const FLEET_PATH: &str = "/dev/index.php/v1/vehicles/select/active";
pub const LABELS_PATH: &str = "/dev/index.php/v1/labels";

const USER_AGENT: &str = concat!("fleetsheet/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the fleet API
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub login: Login,
    /// Pre-encoded value sent as `Authorization: Basic ...` on login
    pub basic_auth_token: String,
    pub auth_timeout: Duration,
    pub request_timeout: Duration,
    /// Maximum label lookups in flight
    pub label_concurrency: usize,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, login: Login) -> Self {
        Self {
            base_url: base_url.into(),
            login,
            basic_auth_token: String::new(),
            auth_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            label_concurrency: 4,
        }
    }

    pub fn with_basic_auth_token(mut self, token: impl Into<String>) -> Self {
        self.basic_auth_token = token.into();
        self
    }

    pub fn with_timeouts(mut self, auth: Duration, request: Duration) -> Self {
        self.auth_timeout = auth;
        self.request_timeout = request;
        self
    }

    pub fn with_label_concurrency(mut self, concurrency: usize) -> Self {
        self.label_concurrency = concurrency.max(1);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Fleet API handles wired to a shared token cache
#[derive(Clone)]
pub struct FleetApi {
    pub tokens: Arc<TokenCache>,
    pub fleet: Arc<FleetFetcher>,
    pub labels: Arc<LabelColorResolver>,
}

impl FleetApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        let tokens = Arc::new(TokenCache::new(
            http.clone(),
            settings.endpoint(LOGIN_PATH),
            settings.login.clone(),
            settings.basic_auth_token.clone(),
            settings.auth_timeout,
        ));
        let fleet = Arc::new(FleetFetcher::new(
            http.clone(),
            settings.endpoint(FLEET_PATH),
            Arc::clone(&tokens),
            settings.request_timeout,
        ));
        let labels = Arc::new(LabelColorResolver::new(
            http,
            settings.endpoint(LABELS_PATH),
            Arc::clone(&tokens),
            settings.request_timeout,
            settings.label_concurrency,
        ));

        Ok(Self {
            tokens,
            fleet,
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let settings = ApiSettings::new("https://api.example.test/", Login::new("u", "p"));
        assert_eq!(
            settings.endpoint(LOGIN_PATH),
            "https://api.example.test/index.php/login"
        );
    }

    #[test]
    fn test_concurrency_at_least_one() {
        let settings =
            ApiSettings::new("http://x", Login::new("u", "p")).with_label_concurrency(0);
        assert_eq!(settings.label_concurrency, 1);
    }
}
