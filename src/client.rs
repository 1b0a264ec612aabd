//! Minimal client for the Prometheus HTTP query API.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};

use crate::config::QueryConfig;
use crate::error::{ErrorType, PromError};
use crate::model::{ApiResponse, QueryResult, ResponseStatus};

const QUERY_PATH: &str = "/api/v1/query";

/// Client bound to one Prometheus-compatible API base URL.
///
/// When a token is given it is installed as a default `Authorization: Bearer`
/// header, so every request made through this client is authenticated.
#[derive(Debug, Clone)]
pub struct PromClient {
    base_url: Url,
    client: Client,
}

impl PromClient {
    pub fn new(endpoint: &str, token: Option<&SecretString>) -> Result<Self, PromError> {
        let base_url = Url::parse(endpoint).map_err(|err| {
            PromError::ClientConstructionError(format!("invalid endpoint {endpoint:?}: {err}"))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(PromError::ClientConstructionError(format!(
                "unsupported scheme {:?} in endpoint {endpoint:?}",
                base_url.scheme()
            )));
        }

        let mut builder = Client::builder();
        if let Some(token) = token {
            builder = builder.default_headers(bearer_headers(token)?);
        }
        let client = builder
            .build()
            .map_err(|err| PromError::ClientConstructionError(err.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &QueryConfig) -> Result<Self, PromError> {
        Self::new(config.endpoint(), config.token())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Runs an instant query evaluated at `time`.
    ///
    /// The query is sent as a form-encoded POST. Servers that refuse POST
    /// (405 or 501) get the same parameters once more as a GET.
    pub async fn query(&self, query: &str, time: DateTime<Utc>) -> Result<QueryResult, PromError> {
        let url = self.api_url(QUERY_PATH);
        let params = [("query", query.to_string()), ("time", format_time(time))];

        log::debug!("POST {url} query={query:?} time={}", params[1].1);
        let mut response = self.client.post(&url).form(&params).send().await?;

        if matches!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            log::debug!("POST rejected with {}, falling back to GET", response.status());
            response = self.client.get(&url).query(&params).send().await?;
        }

        let status = response.status();
        log::debug!("Prometheus HTTP status: {status}");
        let body = response.text().await?;

        decode_response(status, &body)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

fn bearer_headers(token: &SecretString) -> Result<HeaderMap, PromError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|err| PromError::ClientConstructionError(format!("invalid bearer token: {err}")))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Prometheus reports query failures with these codes and a JSON error body.
fn is_api_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
    )
}

/// Turns an HTTP status and body into a query result or a protocol error.
pub(crate) fn decode_response(status: StatusCode, body: &str) -> Result<QueryResult, PromError> {
    if !status.is_success() && !is_api_error(status) {
        let (error_type, message) = ErrorType::for_status(status.as_u16());
        return Err(PromError::protocol(error_type, message, body));
    }

    let envelope: ApiResponse = serde_json::from_str(body)
        .map_err(|err| PromError::protocol(ErrorType::BadResponse, err.to_string(), ""))?;

    match envelope.status {
        ResponseStatus::Error => Err(PromError::protocol(
            envelope
                .error_type
                .as_deref()
                .map(ErrorType::from)
                .unwrap_or(ErrorType::BadResponse),
            envelope.error.unwrap_or_default(),
            "",
        )),
        ResponseStatus::Success if is_api_error(status) => Err(PromError::protocol(
            ErrorType::BadResponse,
            "inconsistent body for response code",
            "",
        )),
        ResponseStatus::Success => {
            let value = envelope.data.ok_or_else(|| {
                PromError::protocol(ErrorType::BadResponse, "missing data in response", "")
            })?;
            Ok(QueryResult {
                value,
                warnings: envelope.warnings,
                infos: envelope.infos,
            })
        }
    }
}

/// Unix seconds, with a fractional part only when the time has one.
pub(crate) fn format_time(time: DateTime<Utc>) -> String {
    let nanos = time.timestamp_subsec_nanos();
    if nanos == 0 {
        return time.timestamp().to_string();
    }
    let formatted = format!("{}.{nanos:09}", time.timestamp());
    formatted.trim_end_matches('0').to_string()
}

#[cfg(test)]
mod tests;
