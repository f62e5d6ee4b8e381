use chrono::Duration;

/// Root of the TAHMO data hub API.
pub const API_BASE_URL: &str = "https://datahub.tahmo.org";

/// Longest time window requested at once, in days.
pub const API_MAX_PERIOD_DAYS: i64 = 365;

/// Connection settings of a [`crate::Tahmo`] client.
///
/// The defaults target the public TAHMO data hub. Overriding the base URL is mostly
/// useful for staging servers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Maximum span of a single measurement request. Must be a whole number of days, at least one.
    pub max_period: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            max_period: Duration::days(API_MAX_PERIOD_DAYS),
        }
    }
}
