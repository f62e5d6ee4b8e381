//! Asset metadata returned by the TAHMO asset endpoints: stations, variables and sensors.
//!
//! Only the identifying field of each record is typed. The asset API returns many
//! more fields which differ between station generations, so everything else is
//! kept verbatim in a JSON map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A TAHMO weather station.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// The unique station code (e.g., "TA00021").
    pub code: String,
    /// All other fields reported for this station (location, status, installed sensors, ...).
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A measured quantity such as air temperature or relative humidity.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Variable {
    /// Short identifier used in measurement rows (e.g., "te").
    pub shortcode: String,
    /// Remaining fields such as the description and unit.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A physical sensor device installed at a station.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Sensor {
    /// Numeric sensor id, usable with [`crate::Tahmo::sensor_from_id`].
    pub id: u64,
    /// Human readable sensor code, if the API reports one.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_keeps_unknown_fields() -> Result<(), Box<dyn std::error::Error>> {
        let station: Station = serde_json::from_value(json!({
            "code": "TA00021",
            "status": 1,
            "location": {"latitude": 0.5, "longitude": 35.2}
        }))?;
        assert_eq!(station.code, "TA00021");
        assert_eq!(station.metadata["status"], json!(1));
        assert_eq!(station.metadata["location"]["longitude"], json!(35.2));
        Ok(())
    }

    #[test]
    fn test_sensor_without_code() -> Result<(), Box<dyn std::error::Error>> {
        let sensor: Sensor = serde_json::from_value(json!({"id": 42, "type": "ATMOS41"}))?;
        assert_eq!(sensor.id, 42);
        assert_eq!(sensor.code, None);
        assert_eq!(sensor.metadata["type"], json!("ATMOS41"));
        Ok(())
    }
}
