//! `GeoAPI` - read-through caching service for geographic, weather and
//! currency exchange data
//!
//! Every lookup is answered from the local store when possible. Otherwise
//! the matching upstream provider is queried once, the answer persisted,
//! and the store queried again.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod providers;
pub mod services;
pub mod store;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use cache::{PersistentCache, ResponseCache};
pub use config::GeoApiConfig;
pub use error::GeoApiError;
pub use models::{City, Country, CurrencyRate, WeatherRecord};
pub use services::{CityService, CountryService, CurrencyService, Lookup, WeatherService};
pub use store::Store;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, GeoApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
