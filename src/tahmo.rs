//! This module provides the main entry point for interacting with the TAHMO API client.
//! It exposes the asset endpoints (stations, variables, sensors) and the measurement
//! endpoint, whose answers are reshaped into time-aligned tables.

use crate::config::ClientConfig;
use crate::error::TahmoError;
use crate::http::requester::Requester;
use crate::http::transport::{HttpTransport, Transport};
use crate::measurements::date_range::{split_date_range, validate_max_period};
use crate::measurements::fetcher::{rows_to_dataframe, MeasurementFetcher};
use crate::measurements::reshaper::reshape_measurements;
use crate::types::credentials::Credentials;
use crate::types::dataset::Dataset;
use crate::types::date_interval::DateInterval;
use crate::types::metadata::{Sensor, Station, Variable};
use crate::types::series_table::SeriesTable;
use crate::types::traits::any_datetime::AnyDateTime;
use bon::bon;
use chrono::Duration;
use log::warn;
use polars::prelude::DataFrame;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const STATIONS_ENDPOINT: &str = "services/assets/v2/stations";
const VARIABLES_ENDPOINT: &str = "services/assets/v2/variables";
const SENSORS_ENDPOINT: &str = "services/assets/v2/sensors";

#[derive(Deserialize)]
struct DataEnvelope<D> {
    data: D,
}

#[derive(Deserialize)]
struct SensorEnvelope<S> {
    sensor: S,
}

#[derive(Deserialize)]
struct VariableEnvelope {
    variable: Variable,
}

#[derive(Deserialize)]
struct SensorRef {
    id: u64,
}

fn decode<D: DeserializeOwned>(value: Value, what: &str) -> Result<D, TahmoError> {
    serde_json::from_value(value)
        .map_err(|e| TahmoError::PartialResponse(format!("unexpected {} payload: {}", what, e)))
}

/// Takes the `data` list out of an asset listing. A missing or non-list `data` means nothing
/// is listed.
fn data_list(mut response: Value, what: &str) -> Vec<Value> {
    match response.get_mut("data").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => {
            warn!("No {} data in API response", what);
            Vec::new()
        }
    }
}

/// The main client struct for accessing TAHMO station data.
///
/// All requests are blocking and issued one after the other. The client holds the
/// credentials and connection settings; everything else is built per call.
///
/// Create an instance with [`Tahmo::builder()`], [`Tahmo::from_env()`], or
/// [`Tahmo::with_transport()`] to plug in a different HTTP layer.
///
/// # Examples
///
/// ```no_run
/// # use tahmo::{Tahmo, TahmoError};
/// # fn run() -> Result<(), TahmoError> {
/// let client = Tahmo::builder().key("my-key").secret("my-secret").build()?;
///
/// let table = client
///     .measurements()
///     .station("TA00021")
///     .start("2021-01-01")
///     .end("2021-03-31")
///     .call()?;
/// println!("{} timestamps, columns {:?}", table.height(), table.column_names());
/// # Ok(())
/// # }
/// ```
pub struct Tahmo<T = HttpTransport> {
    requester: Requester<T>,
    max_period: Duration,
}

#[bon]
impl Tahmo {
    /// Creates a client talking to the API over HTTPS.
    ///
    /// # Arguments
    ///
    /// * `.key(..)` / `.secret(..)`: **Required.** API credentials.
    /// * `.base_url(..)`: Optional. Defaults to [`crate::API_BASE_URL`].
    /// * `.max_period_days(..)`: Optional. Longest window per measurement request,
    ///   defaults to [`crate::API_MAX_PERIOD_DAYS`].
    ///
    /// # Errors
    ///
    /// Returns [`TahmoError::InvalidInput`] if `max_period_days` is below one.
    #[builder]
    pub fn new(
        #[builder(into)] key: String,
        #[builder(into)] secret: String,
        #[builder(into)] base_url: Option<String>,
        max_period_days: Option<i64>,
    ) -> Result<Self, TahmoError> {
        let defaults = ClientConfig::default();
        let config = ClientConfig {
            base_url: base_url.unwrap_or(defaults.base_url),
            max_period: max_period_days
                .map(Duration::days)
                .unwrap_or(defaults.max_period),
        };
        Self::with_transport(
            HttpTransport::new(),
            Credentials::new(key, secret),
            config,
        )
    }

    /// Creates a client with default settings and credentials taken from the
    /// `TAHMO_API_KEY` and `TAHMO_API_SECRET` environment variables.
    pub fn from_env() -> Result<Self, TahmoError> {
        Self::with_transport(
            HttpTransport::new(),
            Credentials::from_env()?,
            ClientConfig::default(),
        )
    }
}

impl<T: Transport> Tahmo<T> {
    /// Creates a client on top of any [`Transport`].
    ///
    /// # Errors
    ///
    /// Returns [`TahmoError::InvalidInput`] if `config.max_period` is not a whole number
    /// of days (at least one).
    pub fn with_transport(
        transport: T,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Result<Self, TahmoError> {
        validate_max_period(config.max_period)?;
        Ok(Self {
            requester: Requester::new(transport, credentials, config.base_url),
            max_period: config.max_period,
        })
    }

    /// The request windows a measurement query over `start..=end` is split into.
    pub fn date_intervals(
        &self,
        start: impl AnyDateTime,
        end: impl AnyDateTime,
    ) -> Result<Vec<DateInterval>, TahmoError> {
        split_date_range(start, end, self.max_period)
    }

    /// All stations visible to the credentials, keyed by station code.
    pub fn stations(&self) -> Result<BTreeMap<String, Station>, TahmoError> {
        let response = self
            .requester
            .request(STATIONS_ENDPOINT, &[("sort", "code".to_string())])?;

        data_list(response, "station")
            .into_iter()
            .map(|item| {
                let station: Station = decode(item, "station")?;
                Ok((station.code.clone(), station))
            })
            .collect()
    }

    /// All measured variables, keyed by shortcode.
    pub fn variables(&self) -> Result<BTreeMap<String, Variable>, TahmoError> {
        let response = self.requester.request(VARIABLES_ENDPOINT, &[])?;

        data_list(response, "variable")
            .into_iter()
            .map(|item| {
                let envelope: VariableEnvelope = decode(item, "variable")?;
                Ok((envelope.variable.shortcode.clone(), envelope.variable))
            })
            .collect()
    }

    /// Looks up a sensor by its code.
    ///
    /// # Errors
    ///
    /// Returns [`TahmoError::SensorLookup`] unless exactly one sensor has this code.
    pub fn sensor_from_code(&self, code: &str) -> Result<Sensor, TahmoError> {
        let response = self
            .requester
            .request(SENSORS_ENDPOINT, &[("filter", format!("code!eq!{}", code))])?;
        let envelope: DataEnvelope<Vec<SensorEnvelope<SensorRef>>> =
            decode(response, "sensor list")?;

        match envelope.data.as_slice() {
            [only] => self.sensor_from_id(only.sensor.id),
            matches => Err(TahmoError::SensorLookup {
                code: code.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// Fetches a sensor by its numeric id.
    pub fn sensor_from_id(&self, id: u64) -> Result<Sensor, TahmoError> {
        let response = self
            .requester
            .request(&format!("{}/{}", SENSORS_ENDPOINT, id), &[])?;
        let envelope: DataEnvelope<SensorEnvelope<Sensor>> = decode(response, "sensor")?;
        Ok(envelope.data.sensor)
    }
}

#[bon]
impl<T: Transport> Tahmo<T> {
    /// Fetches measurements of a station and reshapes them into a [`SeriesTable`].
    ///
    /// The period is split into windows of at most the configured maximum period and
    /// requested window by window. Readings with a quality flag other than 1 become missing
    /// values. A variable measured by several sensors at the same instants is returned as one
    /// column per sensor, named `"{variable}_{sensor}"`.
    ///
    /// # Arguments
    ///
    /// * `.station(&str)`: **Required.** Station code, e.g. `"TA00021"`.
    /// * `.start(&str)` / `.end(&str)`: **Required.** Period bounds; most common date and
    ///   date-time notations are accepted and interpreted as UTC.
    /// * `.variables(&[&str])`: Optional. Only keep these shortcodes, in this order.
    /// * `.dataset(Dataset)`: Optional. Defaults to [`Dataset::Controlled`].
    ///
    /// # Errors
    ///
    /// * [`TahmoError::InvalidInput`] if a bound cannot be parsed or start is after end.
    /// * [`TahmoError::ApiError`] / [`TahmoError::NetworkRequest`] if any window fails; no
    ///   partial result is returned.
    /// * [`TahmoError::PartialResponse`] if a response does not have the expected layout.
    #[builder]
    pub fn measurements(
        &self,
        station: &str,
        start: &str,
        end: &str,
        variables: Option<&[&str]>,
        dataset: Option<Dataset>,
    ) -> Result<SeriesTable, TahmoError> {
        let intervals = self.date_intervals(start, end)?;
        let pages = MeasurementFetcher::new(&self.requester).fetch_pages(
            station,
            dataset.unwrap_or_default(),
            &intervals,
            variables,
        )?;
        Ok(reshape_measurements(&pages, variables))
    }

    /// Same as [`Tahmo::measurements`] on the unvalidated [`Dataset::Raw`] stream.
    #[builder]
    pub fn raw_measurements(
        &self,
        station: &str,
        start: &str,
        end: &str,
        variables: Option<&[&str]>,
    ) -> Result<SeriesTable, TahmoError> {
        self.measurements()
            .station(station)
            .start(start)
            .end(end)
            .maybe_variables(variables)
            .dataset(Dataset::Raw)
            .call()
    }

    /// Fetches observation rows without reshaping them.
    ///
    /// Returns a frame with the columns `time`, `value`, `quality`, `variable` and `sensor`,
    /// followed by any further columns the API sent (such as `station` and `duration`),
    /// rows in the order the API returned them. Values are not masked by quality. When
    /// `variables` is given, rows of other variables are dropped.
    ///
    /// `.dataset(Dataset)` defaults to [`Dataset::Raw`].
    #[builder]
    pub fn raw_data(
        &self,
        station: &str,
        start: &str,
        end: &str,
        variables: Option<&[&str]>,
        dataset: Option<Dataset>,
    ) -> Result<DataFrame, TahmoError> {
        let intervals = self.date_intervals(start, end)?;
        let mut rows = MeasurementFetcher::new(&self.requester).fetch_rows(
            station,
            dataset.unwrap_or(Dataset::Raw),
            &intervals,
            variables,
        )?;
        if let Some(variables) = variables.filter(|v| !v.is_empty()) {
            rows.retain(|row| variables.contains(&row.variable.as_str()));
        }
        rows_to_dataframe(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::mock::MockTransport;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn client(transport: MockTransport) -> Tahmo<MockTransport> {
        Tahmo::with_transport(
            transport,
            Credentials::new("key", "secret"),
            ClientConfig {
                base_url: "https://hub.example.org".to_string(),
                ..ClientConfig::default()
            },
        )
        .unwrap()
    }

    fn measurement_page(values: Value) -> Value {
        json!({"results": [{"statement_id": 0, "series": [{
            "name": "measurements",
            "columns": ["time", "duration", "quality", "sensor", "station", "value", "variable"],
            "values": values
        }]}]})
    }

    #[test]
    fn test_measurements_over_two_windows() -> Result<(), Box<dyn std::error::Error>> {
        let transport = MockTransport::new()
            .push_json(
                200,
                measurement_page(json!([
                    ["2020-06-01T00:00:00Z", 300, 1, "TH1", "TA00021", 22.0, "te"],
                    ["2020-06-01T00:00:00Z", 300, 1, "TH2", "TA00021", 19.0, "te"],
                    ["2020-06-01T00:00:00Z", 300, 0, "TH1", "TA00021", 55.0, "rh"]
                ])),
            )
            .push_json(
                200,
                measurement_page(json!([
                    ["2021-01-05T00:00:00Z", 300, 1, "TH1", "TA00021", 24.0, "te"],
                    ["2021-01-05T00:00:00Z", 300, 1, "TH1", "TA00021", 80.0, "rh"]
                ])),
            );
        let client = client(transport);

        let table = client
            .measurements()
            .station("TA00021")
            .start("2020-01-01")
            .end("2021-02-01")
            .call()?;

        let t1 = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2021, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(table.column_names(), vec!["rh", "te_TH1", "te_TH2"]);
        assert_eq!(table.index(), &[t1, t2]);
        assert_eq!(table.get("rh", t1), None);
        assert_eq!(table.get("rh", t2), Some(80.0));
        assert_eq!(table.get("te_TH1", t2), Some(24.0));
        assert_eq!(table.get("te_TH2", t1), Some(19.0));

        let requests = client.requester.transport().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.ends_with("/TA00021/measurements/controlled"));
        assert_eq!(requests[0].param("end"), Some("2020-12-30T23:59:59Z"));
        assert_eq!(requests[1].param("start"), Some("2020-12-31T00:00:00Z"));
        Ok(())
    }

    #[test]
    fn test_raw_measurements_single_variable() -> Result<(), Box<dyn std::error::Error>> {
        let transport = MockTransport::new().push_json(
            200,
            measurement_page(json!([
                ["2022-01-01T00:00:00Z", 300, 1, "TH1", "TA00021", 0.5, "pr"]
            ])),
        );
        let client = client(transport);

        let table = client
            .raw_measurements()
            .station("TA00021")
            .start("2022-01-01")
            .end("2022-01-02")
            .variables(&["pr"])
            .call()?;

        assert_eq!(table.column_names(), vec!["pr"]);
        let requests = client.requester.transport().requests();
        assert!(requests[0].url.ends_with("/measurements/raw"));
        assert_eq!(requests[0].param("variable"), Some("pr"));
        Ok(())
    }

    #[test]
    fn test_measurements_without_data_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let client = client(MockTransport::new().push_json(200, json!({"results": [{"statement_id": 0}]})));
        let table = client
            .measurements()
            .station("TA00021")
            .start("2022-01-01")
            .end("2022-01-02")
            .call()?;
        assert!(table.is_empty());
        assert_eq!(table.to_dataframe()?.shape(), (0, 0));
        Ok(())
    }

    #[test]
    fn test_invalid_dates_issue_no_request() {
        let client = client(MockTransport::new());
        let result = client
            .measurements()
            .station("TA00021")
            .start("the day before yesterday")
            .end("2022-01-02")
            .call();
        assert!(matches!(result, Err(TahmoError::InvalidInput(_))));
        assert!(client.requester.transport().requests().is_empty());
    }

    #[test]
    fn test_raw_data_frame_filters_variables() -> Result<(), Box<dyn std::error::Error>> {
        let transport = MockTransport::new().push_json(
            200,
            measurement_page(json!([
                ["2022-01-01T00:00:00Z", 300, 1, "TH1", "TA00021", 0.5, "pr"],
                ["2022-01-01T00:00:00Z", 300, 2, "TH1", "TA00021", 18.0, "te"],
                ["2022-01-01T00:05:00Z", 300, 1, "TH1", "TA00021", 71.0, "rh"]
            ])),
        );
        let client = client(transport);

        let df = client
            .raw_data()
            .station("TA00021")
            .start("2022-01-01")
            .end("2022-01-02")
            .variables(&["te", "rh"])
            .call()?;

        assert_eq!(df.shape(), (2, 7));
        assert_eq!(df.column("station")?.str()?.get(1), Some("TA00021"));
        assert_eq!(df.column("duration")?.i64()?.get(0), Some(300));
        // Raw rows keep their value whatever the quality flag.
        assert_eq!(df.column("value")?.f64()?.get(0), Some(18.0));
        assert_eq!(df.column("quality")?.i64()?.get(0), Some(2));
        Ok(())
    }

    #[test]
    fn test_stations_keyed_by_code() -> Result<(), TahmoError> {
        let client = client(MockTransport::new().push_json(
            200,
            json!({"data": [
                {"code": "TA00002", "status": 1},
                {"code": "TA00001", "status": 0}
            ]}),
        ));
        let stations = client.stations()?;
        assert_eq!(stations.keys().collect::<Vec<_>>(), vec!["TA00001", "TA00002"]);
        assert_eq!(stations["TA00002"].metadata["status"], json!(1));

        let requests = client.requester.transport().requests();
        assert!(requests[0].url.ends_with("services/assets/v2/stations"));
        assert_eq!(requests[0].param("sort"), Some("code"));
        Ok(())
    }

    #[test]
    fn test_listing_without_data_is_empty() -> Result<(), TahmoError> {
        let client = client(
            MockTransport::new()
                .push_json(200, json!({"message": "ok"}))
                .push_json(200, json!({"data": "unexpected"})),
        );
        assert!(client.stations()?.is_empty());
        assert!(client.variables()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_station_without_code_is_partial_response() {
        let client = client(MockTransport::new().push_json(200, json!({"data": [{"id": 1}]})));
        assert!(matches!(client.stations(), Err(TahmoError::PartialResponse(_))));
    }

    #[test]
    fn test_variables_keyed_by_shortcode() -> Result<(), TahmoError> {
        let client = client(MockTransport::new().push_json(
            200,
            json!({"data": [
                {"variable": {"shortcode": "te", "description": "Temperature", "units": "degrees Celsius"}},
                {"variable": {"shortcode": "rh", "description": "Relative humidity"}}
            ]}),
        ));
        let variables = client.variables()?;
        assert_eq!(variables.len(), 2);
        assert_eq!(variables["te"].metadata["units"], json!("degrees Celsius"));
        Ok(())
    }

    #[test]
    fn test_sensor_from_code_resolves_by_id() -> Result<(), TahmoError> {
        let client = client(
            MockTransport::new()
                .push_json(200, json!({"data": [{"sensor": {"id": 321, "code": "TH00321"}}]}))
                .push_json(
                    200,
                    json!({"data": {"sensor": {"id": 321, "code": "TH00321", "type": "ATMOS41"}}}),
                ),
        );
        let sensor = client.sensor_from_code("TH00321")?;
        assert_eq!(sensor.id, 321);
        assert_eq!(sensor.code.as_deref(), Some("TH00321"));

        let requests = client.requester.transport().requests();
        assert_eq!(requests[0].param("filter"), Some("code!eq!TH00321"));
        assert!(requests[1].url.ends_with("services/assets/v2/sensors/321"));
        Ok(())
    }

    #[test]
    fn test_sensor_from_code_requires_single_match() {
        let client = client(
            MockTransport::new()
                .push_json(200, json!({"data": []}))
                .push_json(
                    200,
                    json!({"data": [{"sensor": {"id": 1}}, {"sensor": {"id": 2}}]}),
                ),
        );
        assert!(matches!(
            client.sensor_from_code("TH1"),
            Err(TahmoError::SensorLookup { matches: 0, .. })
        ));
        assert!(matches!(
            client.sensor_from_code("TH1"),
            Err(TahmoError::SensorLookup { matches: 2, .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let result = Tahmo::with_transport(
            MockTransport::new(),
            Credentials::new("key", "secret"),
            ClientConfig {
                max_period: Duration::hours(12),
                ..ClientConfig::default()
            },
        );
        assert!(matches!(result, Err(TahmoError::InvalidInput(_))));

        let result = Tahmo::with_transport(
            MockTransport::new(),
            Credentials::new("key", "secret"),
            ClientConfig {
                max_period: Duration::hours(36),
                ..ClientConfig::default()
            },
        );
        assert!(matches!(result, Err(TahmoError::InvalidInput(_))));

        let result = Tahmo::builder()
            .key("key")
            .secret("secret")
            .max_period_days(0)
            .build();
        assert!(matches!(result, Err(TahmoError::InvalidInput(_))));
    }

    #[test]
    fn test_short_max_period_splits_more() -> Result<(), TahmoError> {
        let client = Tahmo::with_transport(
            MockTransport::new(),
            Credentials::new("key", "secret"),
            ClientConfig {
                max_period: Duration::days(30),
                ..ClientConfig::default()
            },
        )?;
        let intervals = client.date_intervals("2021-01-01", "2021-03-31")?;
        assert_eq!(intervals.len(), 3);
        assert!(intervals
            .iter()
            .all(|interval| interval.end - interval.start < Duration::days(30)));
        Ok(())
    }

    #[test]
    #[ignore = "requires TAHMO_API_KEY / TAHMO_API_SECRET and network access"]
    fn test_live_stations() -> Result<(), TahmoError> {
        let client = Tahmo::from_env()?;
        let stations = client.stations()?;
        assert!(!stations.is_empty());
        Ok(())
    }
}
