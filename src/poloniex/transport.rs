//! Blocking GET transport

use reqwest::blocking::Client;

use super::error::RequestFailure;

/// Performs a single GET and hands back the raw body.
///
/// Status codes are not inspected; the executor classifies the body.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String, RequestFailure>;
}

/// [`Transport`] over a `reqwest` blocking client with its default settings
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Reuse an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, RequestFailure> {
        let response = self.client.get(url).send()?;
        Ok(response.text()?)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<String, RequestFailure> {
        (**self).get(url)
    }
}
