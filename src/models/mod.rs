//! Data models for the `GeoAPI` service
//!
//! This module contains the persisted records organized by resource:
//! - Country: ISO alpha-2 keyed country records
//! - City: cities referencing their owning country
//! - Weather: weather observations per city
//! - Currency: exchange rates relative to a base currency

pub mod city;
pub mod country;
pub mod currency;
pub mod weather;

// Re-export all public types for convenient access
pub use city::{City, CityFilter};
pub use country::{Country, CountryFilter};
pub use currency::{CurrencyFilter, CurrencyRate};
pub use weather::{WeatherFilter, WeatherRecord};

/// Case-insensitive substring match. `needle` must already be lowercase.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
