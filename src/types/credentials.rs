use crate::error::TahmoError;
use std::fmt;

pub const API_KEY_ENV: &str = "TAHMO_API_KEY";
pub const API_SECRET_ENV: &str = "TAHMO_API_SECRET";

/// Static key/secret pair sent as HTTP basic auth on every request.
///
/// The secret is never printed by the `Debug` implementation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Reads the key and secret from `TAHMO_API_KEY` and `TAHMO_API_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`TahmoError::MissingCredentials`] naming the first variable that is unset
    /// or not valid unicode.
    pub fn from_env() -> Result<Self, TahmoError> {
        let key =
            std::env::var(API_KEY_ENV).map_err(|_| TahmoError::MissingCredentials(API_KEY_ENV))?;
        let secret = std::env::var(API_SECRET_ENV)
            .map_err(|_| TahmoError::MissingCredentials(API_SECRET_ENV))?;
        Ok(Self::new(key, secret))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}
