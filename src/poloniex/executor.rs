//! Single-request executor: URL building, JSON decoding, error classification

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use super::command::{ApiFlavor, Command};
use super::error::{ApiError, ApiResult};
use super::transport::{HttpTransport, Transport};
use crate::config::ClientConfig;

/// Issues one GET per command. No retries; every failure goes straight back
/// to the caller.
#[derive(Debug, Clone)]
pub struct Executor<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl Executor<HttpTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(HttpTransport::new(), config)
    }
}

impl<T: Transport> Executor<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full URL for a command
    pub fn url_for(&self, command: &Command) -> String {
        let base = match command.flavor() {
            ApiFlavor::Legacy => &self.config.legacy_url,
            ApiFlavor::Markets => &self.config.markets_url,
        };
        format!("{}{}", base, command)
    }

    /// Run a command and return the decoded JSON body
    pub fn execute(&self, command: &Command) -> ApiResult<Value> {
        let url = self.url_for(command);
        debug!("Execute command: {}", url);

        let body = self
            .transport
            .get(&url)
            .map_err(|e| ApiError::request(command, e))?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| ApiError::request(command, e))?;

        check_error_payload(command, value)
    }

    /// Run a command and decode the body into `R`
    pub fn execute_as<R: DeserializeOwned>(&self, command: &Command) -> ApiResult<R> {
        let value = self.execute(command)?;
        serde_json::from_value(value).map_err(|e| ApiError::request(command, e))
    }
}

/// Turn an error payload into [`ApiError::Server`]; pass anything else through
fn check_error_payload(command: &Command, value: Value) -> ApiResult<Value> {
    let marker = match command.flavor() {
        ApiFlavor::Legacy => "error",
        ApiFlavor::Markets => "code",
    };

    let Some(fields) = value.as_object() else {
        return Ok(value);
    };
    let Some(marker_value) = fields.get(marker) else {
        return Ok(value);
    };

    let (code, message) = match command.flavor() {
        ApiFlavor::Legacy => (None, text_of(marker_value)),
        ApiFlavor::Markets => (
            Some(text_of(marker_value)),
            fields
                .get("message")
                .map(text_of)
                .unwrap_or_else(|| "No message".to_string()),
        ),
    };

    error!("Server rejected {}: {}", command, value);
    Err(ApiError::Server {
        command: command.to_string(),
        code,
        message,
        body: value,
    })
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
