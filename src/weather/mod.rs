pub mod openweather;

use serde::{Deserialize, Serialize};

pub use openweather::WeatherClient;

/// Current conditions at a coordinate, in metric units.
///
/// Every field is always present: missing precipitation is reported as `0.0`
/// rather than omitted, so the report prompt never has a hole in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    /// Degrees Celsius.
    #[serde(rename = "temp")]
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    pub condition: String,
    /// Metres per second.
    pub wind_speed: f64,
    /// Millimetres over the last hour.
    pub rainfall: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let record = WeatherRecord {
            temperature: 32.0,
            humidity: 40.0,
            condition: "clear sky".to_string(),
            wind_speed: 2.1,
            rainfall: 0.0,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["temp"], 32.0);
        assert_eq!(value["humidity"], 40.0);
        assert_eq!(value["condition"], "clear sky");
        assert_eq!(value["windSpeed"], 2.1);
        assert_eq!(value["rainfall"], 0.0);
        assert_eq!(value.as_object().unwrap().len(), 5);
    }
}
