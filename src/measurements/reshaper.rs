//! Turns pages of observation rows into a [`SeriesTable`] with one column per variable.
//!
//! A variable normally becomes a single column named after its shortcode. When more than
//! one sensor reported the same variable at the same instant, the variable is split into
//! one column per sensor named `"{variable}_{sensor}"` instead, so no reading is lost.
//! Readings whose quality flag is not good are kept as missing values.

use crate::types::observation::ObservationRow;
use crate::types::series_table::SeriesTable;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
struct SeriesEntry {
    time: DateTime<Utc>,
    value: Option<f64>,
    sensor: String,
}

impl From<&ObservationRow> for SeriesEntry {
    fn from(row: &ObservationRow) -> Self {
        Self {
            time: row.time,
            value: row.checked_value(),
            sensor: row.sensor.clone(),
        }
    }
}

/// Collects entries per variable over any number of pages.
///
/// Entries of a variable are appended page after page, so a variable spread over several
/// request windows ends up as one list in page order. Nothing is decided about columns
/// until [`SeriesAccumulator::finish`].
#[derive(Debug, Default)]
pub struct SeriesAccumulator {
    selection: Option<Vec<String>>,
    series: BTreeMap<String, Vec<SeriesEntry>>,
}

impl SeriesAccumulator {
    /// `variables` restricts the output to the given shortcodes, in that order. `None` or an
    /// empty list keeps every variable found, ordered by shortcode.
    pub fn new(variables: Option<&[&str]>) -> Self {
        let selection = variables.filter(|v| !v.is_empty()).map(|v| {
            let mut seen = HashSet::new();
            v.iter()
                .filter(|name| seen.insert(**name))
                .map(|name| name.to_string())
                .collect()
        });
        Self {
            selection,
            series: BTreeMap::new(),
        }
    }

    fn is_selected(&self, variable: &str) -> bool {
        match &self.selection {
            Some(selection) => selection.iter().any(|v| v == variable),
            None => true,
        }
    }

    /// Appends the rows of one page.
    pub fn absorb(&mut self, page: &[ObservationRow]) {
        for row in page {
            if !self.is_selected(&row.variable) {
                continue;
            }
            self.series
                .entry(row.variable.clone())
                .or_default()
                .push(SeriesEntry::from(row));
        }
    }

    /// Builds the table. Each variable is split per sensor or kept whole independently.
    pub fn finish(mut self) -> SeriesTable {
        let order: Vec<String> = match self.selection.take() {
            Some(selection) => selection,
            None => self.series.keys().cloned().collect(),
        };

        let mut columns = Vec::new();
        for variable in order {
            let Some(entries) = self.series.remove(&variable) else {
                continue;
            };
            if entries.is_empty() {
                continue;
            }

            if has_duplicate_times(&entries) {
                info!("Split observations for {} per sensor", variable);
                columns.extend(split_by_sensor(&variable, entries));
            } else {
                let points = entries.into_iter().map(|e| (e.time, e.value)).collect();
                columns.push((variable, points));
            }
        }

        SeriesTable::from_series(columns)
    }
}

fn has_duplicate_times(entries: &[SeriesEntry]) -> bool {
    let mut seen = HashSet::with_capacity(entries.len());
    entries.iter().any(|e| !seen.insert(e.time))
}

/// One column per sensor, sensors in sorted order.
fn split_by_sensor(
    variable: &str,
    entries: Vec<SeriesEntry>,
) -> Vec<(String, BTreeMap<DateTime<Utc>, Option<f64>>)> {
    let mut per_sensor: BTreeMap<String, BTreeMap<DateTime<Utc>, Option<f64>>> = BTreeMap::new();
    for entry in entries {
        let points = per_sensor.entry(entry.sensor).or_default();
        if points.insert(entry.time, entry.value).is_some() {
            warn!(
                "Sensor reported {} twice at {}, keeping the later reading",
                variable, entry.time
            );
        }
    }

    per_sensor
        .into_iter()
        .map(|(sensor, points)| (format!("{}_{}", variable, sensor), points))
        .collect()
}

/// Merges measurement pages into a time-aligned table.
///
/// Pages are processed in order; empty pages are skipped. If `variables` is given and
/// non-empty, only those shortcodes are kept and columns follow that order.
///
/// # Examples
///
/// ```
/// use tahmo::{reshape_measurements, ObservationRow};
/// use chrono::{TimeZone, Utc};
///
/// let t1 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
/// let row = |value, sensor: &str| ObservationRow {
///     time: t1,
///     value: Some(value),
///     quality: Some(1),
///     variable: "TA".to_string(),
///     sensor: sensor.to_string(),
///     extra: Default::default(),
/// };
///
/// let table = reshape_measurements(&[vec![row(22.0, "S1"), row(19.0, "S2")]], None);
/// assert_eq!(table.column_names(), vec!["TA_S1", "TA_S2"]);
/// assert_eq!(table.get("TA_S2", t1), Some(19.0));
/// ```
pub fn reshape_measurements(
    pages: &[Vec<ObservationRow>],
    variables: Option<&[&str]>,
) -> SeriesTable {
    pages
        .iter()
        .filter(|page| !page.is_empty())
        .fold(SeriesAccumulator::new(variables), |mut acc, page| {
            acc.absorb(page);
            acc
        })
        .finish()
}
