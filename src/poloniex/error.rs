//! Poloniex public API error types

use std::fmt;

use thiserror::Error;

/// Which caller-supplied value was rejected before a request was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Candle interval or chart period outside the supported set
    BadPeriod,
    /// Date string not in `YYYY-MM-DD HH:MM:SS` form
    BadDate,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::BadPeriod => "bad_period",
            ParameterKind::BadDate => "bad_date",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ParameterKind::BadPeriod => "PUBLIC_API_ERROR:BAD_PERIOD",
            ParameterKind::BadDate => "PUBLIC_API_ERROR:BAD_DATE",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a failed request
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

/// Errors returned by every public client operation
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or an undecodable body
    #[error("PUBLIC_API_ERROR:REQUEST_ERROR. Command: {command}. Cause: {source}")]
    Request {
        command: String,
        #[source]
        source: RequestFailure,
    },

    /// The server answered with an error payload
    #[error("PUBLIC_API_ERROR:SERVER_ERROR. Command: {command}. Message: {message}. Response: {body}")]
    Server {
        command: String,
        code: Option<String>,
        message: String,
        body: serde_json::Value,
    },

    /// Rejected locally, no request was sent
    #[error("{}. Command: {command}. Value: {value}", .kind.code())]
    InvalidParameter {
        kind: ParameterKind,
        command: String,
        value: String,
    },
}

impl ApiError {
    pub(crate) fn request(command: impl fmt::Display, source: impl Into<RequestFailure>) -> Self {
        ApiError::Request {
            command: command.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid(
        kind: ParameterKind,
        command: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        ApiError::InvalidParameter {
            kind,
            command: command.into(),
            value: value.to_string(),
        }
    }

    /// Stable error code, e.g. `PUBLIC_API_ERROR:REQUEST_ERROR`
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Request { .. } => "PUBLIC_API_ERROR:REQUEST_ERROR",
            ApiError::Server { .. } => "PUBLIC_API_ERROR:SERVER_ERROR",
            ApiError::InvalidParameter { kind, .. } => kind.code(),
        }
    }

    /// The command that failed
    pub fn command(&self) -> &str {
        match self {
            ApiError::Request { command, .. }
            | ApiError::Server { command, .. }
            | ApiError::InvalidParameter { command, .. } => command,
        }
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, ApiError::InvalidParameter { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
