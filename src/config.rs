//! Resolution of command-line inputs into an immutable [`QueryConfig`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::error::PromError;

/// Prometheus API used when no GCP project is given.
pub const DEFAULT_PROM_API: &str = "localhost:9090";
/// Query timeout used when none is given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Environment variable holding the bearer token.
pub const GCP_TOKEN_ENV: &str = "GCP_ACCESS_TOKEN";

const GCP_ENDPOINT_PREFIX: &str = "https://monitoring.googleapis.com/v1/projects/";
const GCP_ENDPOINT_SUFFIX: &str = "/location/global/prometheus";

/// Everything needed to run one instant query.
#[derive(Debug)]
pub struct QueryConfig {
    endpoint: String,
    token: Option<SecretString>,
    time: DateTime<Utc>,
    timeout: Duration,
}

impl QueryConfig {
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::new()
    }

    /// Base URL of the Prometheus HTTP API, without the `/api/v1` suffix.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Evaluation time of the instant query.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder collecting raw inputs before validation.
#[derive(Debug, Default)]
pub struct QueryConfigBuilder {
    prom_api: Option<String>,
    gcp_project: Option<String>,
    token: Option<SecretString>,
    now: Option<i64>,
    timeout_secs: Option<u64>,
}

impl QueryConfigBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Prometheus API address. Ignored when a GCP project is set.
    pub fn prom_api(mut self, url: impl Into<String>) -> Self {
        self.prom_api = Some(url.into());
        self
    }

    /// Sets the GCP project whose managed Prometheus endpoint is queried.
    pub fn gcp_project(mut self, project: impl Into<String>) -> Self {
        self.gcp_project = Some(project.into());
        self
    }

    /// Sets the bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::new(token.into()));
        self
    }

    /// Pins the evaluation time to a Unix timestamp. `0` means "now".
    pub fn now(mut self, unix_seconds: i64) -> Self {
        self.now = Some(unix_seconds);
        self
    }

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    /// Validates the inputs and produces the final configuration.
    pub fn build(self) -> Result<QueryConfig, PromError> {
        let project = self.gcp_project.filter(|p| !p.is_empty());
        let token = self.token.filter(|t| !t.expose_secret().is_empty());

        let endpoint = match project {
            Some(project) => {
                if token.is_none() {
                    return Err(PromError::ConfigurationError(
                        "token required when project is specified".to_string(),
                    ));
                }
                gcp_endpoint(&project)
            }
            None => normalize_endpoint(self.prom_api.as_deref().unwrap_or(DEFAULT_PROM_API)),
        };

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(PromError::ConfigurationError(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }

        let time = match self.now {
            None | Some(0) => Utc::now(),
            Some(secs) => DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                PromError::ConfigurationError(format!("evaluation time {secs} is out of range"))
            })?,
        };

        Ok(QueryConfig {
            endpoint,
            token,
            time,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Managed Prometheus endpoint of a GCP project.
pub fn gcp_endpoint(project: &str) -> String {
    format!("{GCP_ENDPOINT_PREFIX}{project}{GCP_ENDPOINT_SUFFIX}")
}

/// Prepends `http://` unless the address already names an HTTP(S) scheme.
pub fn normalize_endpoint(address: &str) -> String {
    if has_http_scheme(address) {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

fn has_http_scheme(address: &str) -> bool {
    let lower = address.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
