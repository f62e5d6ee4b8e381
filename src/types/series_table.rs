//! Contains the `SeriesTable`, the time-aligned result of reshaping measurement pages.

use crate::error::TahmoError;
use chrono::{DateTime, Utc};
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, Series, TimeUnit};
use std::collections::{BTreeMap, BTreeSet};

/// Name of the time index column in frames produced by [`SeriesTable::to_dataframe`].
pub const TIME_COLUMN: &str = "time";

/// One named series of a [`SeriesTable`], aligned to the table's index.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    /// Variable shortcode, or `"{variable}_{sensor}"` when the variable was split per sensor.
    pub name: String,
    /// One entry per index timestamp; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
}

/// Measurements for one station laid out as a table: a sorted time index shared by
/// every column, one column per variable (or per variable and sensor).
///
/// A column lacking a value at some index timestamp holds `None` there. The table is
/// empty (no columns, no rows) when no measurements were found.
///
/// Use [`SeriesTable::to_dataframe`] to continue working with the data in polars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesTable {
    index: Vec<DateTime<Utc>>,
    columns: Vec<SeriesColumn>,
}

impl SeriesTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aligns the given per-column series on the union of their timestamps.
    /// Column order is preserved.
    pub(crate) fn from_series(series: Vec<(String, BTreeMap<DateTime<Utc>, Option<f64>>)>) -> Self {
        let index: Vec<DateTime<Utc>> = series
            .iter()
            .flat_map(|(_, points)| points.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = series
            .into_iter()
            .map(|(name, points)| SeriesColumn {
                name,
                values: index
                    .iter()
                    .map(|time| points.get(time).copied().flatten())
                    .collect(),
            })
            .collect();

        Self { index, columns }
    }

    /// `true` when the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of rows, i.e. distinct timestamps.
    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// Number of series columns (the time index is not counted).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The value of column `name` at `time`, `None` if the column, the timestamp, or the
    /// value itself is missing.
    pub fn get(&self, name: &str, time: DateTime<Utc>) -> Option<f64> {
        let row = self.index.binary_search(&time).ok()?;
        self.column(name)?.values[row]
    }

    /// Converts the table into a polars `DataFrame`.
    ///
    /// The frame starts with a [`TIME_COLUMN`] of type `Datetime(Milliseconds, None)` holding
    /// timezone-naive UTC timestamps, followed by one `Float64` column per series. An empty
    /// table converts to an empty frame.
    ///
    /// # Errors
    ///
    /// Returns [`TahmoError::DataFrameProcessing`] if polars rejects the columns.
    pub fn to_dataframe(&self) -> Result<DataFrame, TahmoError> {
        if self.is_empty() {
            return Ok(DataFrame::empty());
        }

        let millis: Vec<i64> = self.index.iter().map(|t| t.timestamp_millis()).collect();
        let time = Series::new(TIME_COLUMN.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let mut frame_columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        frame_columns.push(time.into());
        for column in &self.columns {
            frame_columns.push(Series::new(column.name.as_str().into(), column.values.clone()).into());
        }

        Ok(DataFrame::new(frame_columns)?)
    }
}
