//! The HTTP seam of the client: a blocking GET with basic auth.

use crate::error::TahmoError;
use crate::types::credentials::Credentials;
use reqwest::blocking::Client;

/// Status code and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Performs one authenticated GET request and returns the raw outcome.
///
/// Non-success statuses are not errors at this level; classifying them is left to
/// the requester. Only failures to talk to the server at all are returned as `Err`.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        credentials: &Credentials,
    ) -> Result<HttpResponse, TahmoError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client, e.g. one with a custom timeout or proxy.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        credentials: &Credentials,
    ) -> Result<HttpResponse, TahmoError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .basic_auth(credentials.key(), Some(credentials.secret()))
            .send()
            .map_err(|e| TahmoError::NetworkRequest(url.to_string(), e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TahmoError::NetworkRequest(url.to_string(), e))?;
        Ok(HttpResponse { status, body })
    }
}
