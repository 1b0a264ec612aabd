use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::model::ResultType;

/// Error types that can occur while resolving configuration or querying a Prometheus API.
#[derive(Debug, Error)]
pub enum PromError {
    /// Invalid combination of inputs, detected before any network call
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// The API client could not be built (malformed endpoint, TLS backend failure)
    #[error("Could not create prometheus client: {0}")]
    ClientConstructionError(String),
    /// The remote API answered with a structured error
    #[error("Query error: {error_type}: msg='{message}', detail='{detail}'")]
    QueryProtocolError {
        error_type: ErrorType,
        message: String,
        detail: String,
    },
    /// Network or I/O failure while talking to the API
    #[error("Query error: {0}")]
    QueryTransportError(String),
    /// The query did not complete before the configured deadline
    #[error("Query error: timed out after {}s", .0.as_secs())]
    QueryTimeout(Duration),
    /// The API returned something other than an instant vector
    #[error("Unexpected non-vector result type {result_type} received for query: {query}")]
    UnexpectedResultShapeError {
        result_type: ResultType,
        query: String,
    },
}

impl PromError {
    /// Returns true for failures of the transport rather than of the query itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PromError::QueryTransportError(_) | PromError::QueryTimeout(_)
        )
    }

    pub(crate) fn protocol(
        error_type: ErrorType,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        PromError::QueryProtocolError {
            error_type,
            message: message.into(),
            detail: detail.into(),
        }
    }
}

/// Converts reqwest HTTP errors into PromErrors
impl From<reqwest::Error> for PromError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return PromError::ClientConstructionError(with_causes(&err));
        }
        PromError::QueryTransportError(with_causes(&err))
    }
}

/// Joins an error and its `source()` chain into one line.
fn with_causes(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Error categories reported by the Prometheus HTTP API in `errorType`,
/// plus the ones derived locally from the HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorType {
    Timeout,
    Canceled,
    Execution,
    BadData,
    Internal,
    Unavailable,
    NotFound,
    Client,
    Server,
    BadResponse,
    Other(String),
}

impl ErrorType {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorType::Timeout => "timeout",
            ErrorType::Canceled => "canceled",
            ErrorType::Execution => "execution",
            ErrorType::BadData => "bad_data",
            ErrorType::Internal => "internal",
            ErrorType::Unavailable => "unavailable",
            ErrorType::NotFound => "not_found",
            ErrorType::Client => "client_error",
            ErrorType::Server => "server_error",
            ErrorType::BadResponse => "bad_response",
            ErrorType::Other(raw) => raw,
        }
    }

    /// Classifies an HTTP status code that came without a usable JSON body.
    pub(crate) fn for_status(status: u16) -> (Self, String) {
        match status / 100 {
            4 => (ErrorType::Client, format!("client error: {status}")),
            5 => (ErrorType::Server, format!("server error: {status}")),
            _ => (ErrorType::BadResponse, format!("bad response code {status}")),
        }
    }
}

impl From<&str> for ErrorType {
    fn from(raw: &str) -> Self {
        match raw {
            "timeout" => ErrorType::Timeout,
            "canceled" => ErrorType::Canceled,
            "execution" => ErrorType::Execution,
            "bad_data" => ErrorType::BadData,
            "internal" => ErrorType::Internal,
            "unavailable" => ErrorType::Unavailable,
            "not_found" => ErrorType::NotFound,
            "client_error" => ErrorType::Client,
            "server_error" => ErrorType::Server,
            "bad_response" => ErrorType::BadResponse,
            other => ErrorType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
