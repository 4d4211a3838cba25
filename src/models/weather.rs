//! Weather observation model

use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::store::{Criteria, Record};

/// Weather observed for a city at fetch time
///
/// There is no natural key: every fetch appends a new record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherRecord {
    /// Country code (ISO 3166-1 alpha-2)
    pub country: String,
    pub city: String,
    /// Temperature in Celsius
    pub temp: f64,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Human-readable description of weather conditions
    pub description: String,
}

impl Record for WeatherRecord {
    const KEYSPACE: &'static str = "weather";
}

/// Matches records whose country code OR city name contains the given text
#[derive(Debug, Clone)]
pub struct WeatherFilter {
    country: String,
    city: String,
}

impl WeatherFilter {
    #[must_use]
    pub fn new(alpha2code: &str, city: &str) -> Self {
        Self {
            country: alpha2code.to_lowercase(),
            city: city.to_lowercase(),
        }
    }
}

impl Criteria<WeatherRecord> for WeatherFilter {
    fn matches(&self, record: &WeatherRecord) -> bool {
        contains_ignore_case(&record.country, &self.country)
            || contains_ignore_case(&record.city, &self.city)
    }
}
