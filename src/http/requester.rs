use crate::error::TahmoError;
use crate::http::transport::{HttpResponse, Transport};
use crate::types::credentials::Credentials;
use log::{info, warn};
use serde_json::Value;

/// Issues authenticated requests against the API and classifies the outcome.
pub struct Requester<T> {
    transport: T,
    credentials: Credentials,
    base_url: String,
}

impl<T: Transport> Requester<T> {
    pub fn new(transport: T, credentials: Credentials, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            credentials,
            base_url,
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// GETs `endpoint` (relative to the base URL) and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// * [`TahmoError::ApiError`] for any status other than 200.
    /// * [`TahmoError::JsonParse`] if a 200 response does not contain JSON.
    /// * [`TahmoError::NetworkRequest`] if the transport fails.
    pub fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, TahmoError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        info!("API request: {}", endpoint);

        let response = self.transport.get(&url, params, &self.credentials)?;
        if response.status == 200 {
            Ok(serde_json::from_str(&response.body)?)
        } else {
            Err(Self::api_error(response))
        }
    }

    /// Prefers the message in an `{"error": {"message": ...}}` body over the bare status.
    fn api_error(response: HttpResponse) -> TahmoError {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|json| {
                json.get("error")?
                    .get("message")?
                    .as_str()
                    .map(str::to_string)
            });

        match message {
            Some(message) => {
                warn!("API returned status {}: {}", response.status, message);
                TahmoError::ApiError {
                    status: response.status,
                    message,
                }
            }
            None => TahmoError::ApiError {
                status: response.status,
                message: format!("API request failed with status code {}", response.status),
            },
        }
    }
}
