use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Quality flag the API uses for a reading that passed all checks.
pub const QUALITY_GOOD: i64 = 1;

/// A single reading as returned by the measurement endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub time: DateTime<Utc>,
    /// Reported value. `None` when the API sent `null`.
    pub value: Option<f64>,
    /// Quality flag, `1` meaning good. `None` when the API sent `null`.
    pub quality: Option<i64>,
    /// Variable shortcode, e.g. `"te"` for temperature.
    pub variable: String,
    /// Identifier of the sensor that produced the reading.
    pub sensor: String,
    /// Any further columns the API sent along, such as `station` or `duration`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ObservationRow {
    pub fn is_good(&self) -> bool {
        self.quality == Some(QUALITY_GOOD)
    }

    /// The value if the reading is of good quality, otherwise missing.
    pub fn checked_value(&self) -> Option<f64> {
        if self.is_good() {
            self.value
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(value: Option<f64>, quality: Option<i64>) -> ObservationRow {
        ObservationRow {
            time: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            value,
            quality,
            variable: "te".to_string(),
            sensor: "TH0001".to_string(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_checked_value_masks_bad_quality() {
        assert_eq!(row(Some(21.5), Some(1)).checked_value(), Some(21.5));
        assert_eq!(row(Some(21.5), Some(0)).checked_value(), None);
        assert_eq!(row(Some(21.5), Some(4)).checked_value(), None);
        assert_eq!(row(Some(21.5), None).checked_value(), None);
        assert_eq!(row(None, Some(1)).checked_value(), None);
    }
}
