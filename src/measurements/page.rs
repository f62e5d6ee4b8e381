//! Decodes one measurement response into observation rows.
//!
//! The measurement endpoint answers in an InfluxDB-like layout:
//!
//! ```json
//! {"results": [{"series": [{"columns": ["time", "quality", ...], "values": [[...], ...]}]}]}
//! ```
//!
//! A result without `series` means the station reported nothing in the requested window.

use crate::error::TahmoError;
use crate::types::observation::ObservationRow;
use crate::types::traits::any_datetime::AnyDateTime;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct MeasurementResponse {
    results: Option<Vec<MeasurementResult>>,
}

#[derive(Debug, Deserialize)]
struct MeasurementResult {
    #[serde(default)]
    series: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

const REQUIRED_COLUMNS: [&str; 5] = ["time", "value", "quality", "variable", "sensor"];

/// Positions of the columns a row is built from.
struct ColumnLayout<'a> {
    time: usize,
    value: usize,
    quality: usize,
    variable: usize,
    sensor: usize,
    /// Every other column, kept verbatim on the row.
    extra: Vec<(usize, &'a str)>,
    width: usize,
}

impl<'a> ColumnLayout<'a> {
    fn from_columns(columns: &'a [String]) -> Result<Self, TahmoError> {
        let position = |name: &str| {
            columns.iter().position(|c| c == name).ok_or_else(|| {
                TahmoError::PartialResponse(format!("series is missing the '{}' column", name))
            })
        };
        Ok(Self {
            time: position("time")?,
            value: position("value")?,
            quality: position("quality")?,
            variable: position("variable")?,
            sensor: position("sensor")?,
            extra: columns
                .iter()
                .enumerate()
                .filter(|(_, name)| !REQUIRED_COLUMNS.contains(&name.as_str()))
                .map(|(i, name)| (i, name.as_str()))
                .collect(),
            width: columns.len(),
        })
    }

    fn row(&self, cells: &[Value]) -> Result<ObservationRow, TahmoError> {
        if cells.len() != self.width {
            return Err(TahmoError::PartialResponse(format!(
                "row has {} cells, expected {}",
                cells.len(),
                self.width
            )));
        }
        Ok(ObservationRow {
            time: time_cell(&cells[self.time])?,
            value: number_cell(&cells[self.value], "value")?,
            quality: quality_cell(&cells[self.quality])?,
            variable: text_cell(&cells[self.variable], "variable")?,
            sensor: text_cell(&cells[self.sensor], "sensor")?,
            extra: self
                .extra
                .iter()
                .map(|&(i, name)| (name.to_string(), cells[i].clone()))
                .collect(),
        })
    }
}

/// Returns every row of every series in the response, in response order.
///
/// # Errors
///
/// Returns [`TahmoError::PartialResponse`] when the body lacks the `results` list, or when a
/// series that carries rows is missing a required column or holds malformed cells.
pub(crate) fn decode_page(body: Value) -> Result<Vec<ObservationRow>, TahmoError> {
    let response: MeasurementResponse = serde_json::from_value(body)
        .map_err(|e| TahmoError::PartialResponse(format!("unexpected measurement body: {}", e)))?;

    let results = match response.results {
        Some(results) if !results.is_empty() => results,
        _ => {
            return Err(TahmoError::PartialResponse(
                "measurement body has no results".to_string(),
            ))
        }
    };

    let mut rows = Vec::new();
    for series in results.into_iter().flat_map(|r| r.series) {
        if series.values.is_empty() {
            continue;
        }
        let layout = ColumnLayout::from_columns(&series.columns)?;
        rows.reserve(series.values.len());
        for cells in &series.values {
            rows.push(layout.row(cells)?);
        }
    }
    Ok(rows)
}

fn time_cell(cell: &Value) -> Result<chrono::DateTime<chrono::Utc>, TahmoError> {
    cell.as_str()
        .and_then(AnyDateTime::to_utc_datetime)
        .ok_or_else(|| TahmoError::PartialResponse(format!("invalid time cell {}", cell)))
}

fn number_cell(cell: &Value, column: &str) -> Result<Option<f64>, TahmoError> {
    match cell {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => Err(TahmoError::PartialResponse(format!(
            "invalid {} cell {}",
            column, other
        ))),
    }
}

fn quality_cell(cell: &Value) -> Result<Option<i64>, TahmoError> {
    match number_cell(cell, "quality")? {
        None => Ok(None),
        Some(q) if q.fract() == 0.0 => Ok(Some(q as i64)),
        Some(_) => Err(TahmoError::PartialResponse(format!(
            "invalid quality cell {}",
            cell
        ))),
    }
}

fn text_cell(cell: &Value, column: &str) -> Result<String, TahmoError> {
    match cell {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(TahmoError::PartialResponse(format!(
            "invalid {} cell {}",
            column, other
        ))),
    }
}
