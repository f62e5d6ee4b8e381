mod config;
mod error;
mod http;
mod measurements;
mod tahmo;
mod types;

pub use config::{ClientConfig, API_BASE_URL, API_MAX_PERIOD_DAYS};
pub use error::TahmoError;
pub use tahmo::*;

pub use http::requester::Requester;
pub use http::transport::{HttpResponse, HttpTransport, Transport};

pub use measurements::date_range::split_date_range;
pub use measurements::fetcher::{rows_to_dataframe, MeasurementFetcher};
pub use measurements::reshaper::{reshape_measurements, SeriesAccumulator};

pub use types::credentials::{Credentials, API_KEY_ENV, API_SECRET_ENV};
pub use types::dataset::Dataset;
pub use types::date_interval::DateInterval;
pub use types::metadata::{Sensor, Station, Variable};
pub use types::observation::{ObservationRow, QUALITY_GOOD};
pub use types::series_table::{SeriesColumn, SeriesTable, TIME_COLUMN};
pub use types::traits::any_datetime::AnyDateTime;
