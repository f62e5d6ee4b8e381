use crate::error::TahmoError;
use crate::http::requester::Requester;
use crate::http::transport::Transport;
use crate::measurements::page::decode_page;
use crate::types::dataset::Dataset;
use crate::types::date_interval::DateInterval;
use crate::types::observation::ObservationRow;
use crate::types::series_table::TIME_COLUMN;
use log::debug;
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, Series, TimeUnit};
use serde_json::Value;
use std::collections::BTreeSet;

pub(crate) fn measurement_endpoint(station: &str, dataset: Dataset) -> String {
    format!(
        "services/measurements/v2/stations/{}/measurements/{}",
        station,
        dataset.path_segment()
    )
}

/// Retrieves observation rows for a station window by window.
pub struct MeasurementFetcher<'a, T> {
    requester: &'a Requester<T>,
}

impl<'a, T: Transport> MeasurementFetcher<'a, T> {
    pub fn new(requester: &'a Requester<T>) -> Self {
        Self { requester }
    }

    /// Requests every interval in order and returns one page of rows per interval.
    ///
    /// The `variable` query parameter is only sent when exactly one variable is requested;
    /// otherwise all variables are fetched and filtering is left to the caller.
    /// Requests are strictly sequential and the first failure aborts the whole fetch.
    pub fn fetch_pages(
        &self,
        station: &str,
        dataset: Dataset,
        intervals: &[DateInterval],
        variables: Option<&[&str]>,
    ) -> Result<Vec<Vec<ObservationRow>>, TahmoError> {
        let endpoint = measurement_endpoint(station, dataset);
        let single_variable = match variables {
            Some([variable]) => Some(*variable),
            _ => None,
        };

        let mut pages = Vec::with_capacity(intervals.len());
        for interval in intervals {
            let mut params = vec![("start", interval.query_start()), ("end", interval.query_end())];
            if let Some(variable) = single_variable {
                params.push(("variable", variable.to_string()));
            }

            let page = decode_page(self.requester.request(&endpoint, &params)?)?;
            debug!(
                "Station {} window {}: {} row(s)",
                station,
                interval,
                page.len()
            );
            pages.push(page);
        }
        Ok(pages)
    }

    /// All rows across `intervals`, concatenated in interval order without deduplication.
    pub fn fetch_rows(
        &self,
        station: &str,
        dataset: Dataset,
        intervals: &[DateInterval],
        variables: Option<&[&str]>,
    ) -> Result<Vec<ObservationRow>, TahmoError> {
        Ok(self
            .fetch_pages(station, dataset, intervals, variables)?
            .into_iter()
            .flatten()
            .collect())
    }
}

/// Lays out raw rows as a polars frame with the columns
/// `time`, `value`, `quality`, `variable` and `sensor`, in row order.
///
/// Further columns the API sent (see [`ObservationRow::extra`]) follow in name order.
/// Rows lacking one of them get a null there.
pub fn rows_to_dataframe(rows: &[ObservationRow]) -> Result<DataFrame, TahmoError> {
    let time = Series::new(
        TIME_COLUMN.into(),
        rows.iter()
            .map(|r| r.time.timestamp_millis())
            .collect::<Vec<i64>>(),
    )
    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    let value = Series::new(
        "value".into(),
        rows.iter().map(|r| r.value).collect::<Vec<Option<f64>>>(),
    );
    let quality = Series::new(
        "quality".into(),
        rows.iter().map(|r| r.quality).collect::<Vec<Option<i64>>>(),
    );
    let variable = Series::new(
        "variable".into(),
        rows.iter()
            .map(|r| r.variable.as_str())
            .collect::<Vec<&str>>(),
    );
    let sensor = Series::new(
        "sensor".into(),
        rows.iter().map(|r| r.sensor.as_str()).collect::<Vec<&str>>(),
    );

    let mut columns: Vec<Column> = vec![
        time.into(),
        value.into(),
        quality.into(),
        variable.into(),
        sensor.into(),
    ];
    let extra_names: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();
    columns.extend(
        extra_names
            .into_iter()
            .map(|name| extra_series(name, rows).into()),
    );
    Ok(DataFrame::new(columns)?)
}

/// One extra column, typed by the JSON cells it holds: integers, floats and booleans
/// keep their type, anything else is rendered as text.
fn extra_series(name: &str, rows: &[ObservationRow]) -> Series {
    let cells: Vec<Option<&Value>> = rows
        .iter()
        .map(|r| r.extra.get(name).filter(|v| !v.is_null()))
        .collect();
    let mut present = cells.iter().flatten();

    if present.clone().all(|v| v.is_i64()) {
        Series::new(
            name.into(),
            cells
                .iter()
                .map(|c| c.and_then(Value::as_i64))
                .collect::<Vec<Option<i64>>>(),
        )
    } else if present.clone().all(|v| v.is_number()) {
        Series::new(
            name.into(),
            cells
                .iter()
                .map(|c| c.and_then(Value::as_f64))
                .collect::<Vec<Option<f64>>>(),
        )
    } else if present.all(|v| v.is_boolean()) {
        Series::new(
            name.into(),
            cells
                .iter()
                .map(|c| c.and_then(Value::as_bool))
                .collect::<Vec<Option<bool>>>(),
        )
    } else {
        Series::new(
            name.into(),
            cells
                .iter()
                .map(|c| {
                    c.map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect::<Vec<Option<String>>>(),
        )
    }
}
