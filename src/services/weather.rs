use std::sync::Arc;

use tracing::instrument;

use super::{Lookup, read_through};
use crate::models::{WeatherFilter, WeatherRecord};
use crate::providers::WeatherProvider;
use crate::store::Repository;
use crate::{GeoApiError, Result};

/// Weather observations, fetched once per country/city and kept
pub struct WeatherService {
    weather: Repository<WeatherRecord>,
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(weather: Repository<WeatherRecord>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { weather, provider }
    }

    /// Weather records whose country contains `alpha2code` or whose city
    /// contains `city`.
    #[instrument(skip(self))]
    pub async fn get_weather(&self, alpha2code: &str, city: &str) -> Result<Lookup<WeatherRecord>> {
        read_through(&self.weather, WeatherFilter::new(alpha2code, city), || async {
            let report = self.provider.current_weather(city, alpha2code).await?;
            Ok::<_, GeoApiError>(report.map(|report| vec![WeatherRecord::from(report)]))
        })
        .await
    }
}
