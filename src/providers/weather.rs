//! OpenWeatherMap-compatible current weather client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{ProviderClient, WeatherProvider};
use crate::config::ProviderConfig;
use crate::models::WeatherRecord;
use crate::{GeoApiError, Result};

/// Current conditions as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub country: String,
    pub city: String,
    pub temp: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
}

impl From<WeatherReport> for WeatherRecord {
    fn from(report: WeatherReport) -> Self {
        Self {
            country: report.country,
            city: report.city,
            temp: report.temp,
            pressure: report.pressure,
            humidity: report.humidity,
            wind_speed: report.wind_speed,
            description: report.description,
        }
    }
}

pub struct WeatherClient {
    client: ProviderClient,
}

impl WeatherClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new(config, timeout)?,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    #[tracing::instrument(name = "weather_provider", skip(self))]
    async fn current_weather(&self, city: &str, alpha2code: &str) -> Result<Option<WeatherReport>> {
        let url = format!(
            "{}?q={},{}&units=metric",
            self.client.base_url(),
            urlencoding::encode(city),
            urlencoding::encode(alpha2code)
        );

        let Some(response) = self.client.get_json::<CurrentWeatherResponse>(&url).await? else {
            return Ok(None);
        };

        response.into_report().map(Some)
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    sys: SysData,
    main: MainData,
    wind: WindData,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct SysData {
    country: String,
}

#[derive(Debug, Deserialize)]
struct MainData {
    temp: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WindData {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

impl CurrentWeatherResponse {
    fn into_report(self) -> Result<WeatherReport> {
        let description = self
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .ok_or_else(|| {
                GeoApiError::api(format!("Weather response for {} has no conditions", self.name))
            })?;

        Ok(WeatherReport {
            country: self.sys.country,
            city: self.name,
            temp: self.main.temp,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            description,
        })
    }
}
