//! Country and city lookups against an apilayer-compatible geo API

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{CityProvider, CountryProvider, ProviderClient};
use crate::Result;
use crate::config::ProviderConfig;
use crate::models::{City, Country};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryInfo {
    pub alpha2code: String,
    pub name: String,
    pub alpha3code: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<u64>,
}

impl From<CountryInfo> for Country {
    fn from(info: CountryInfo) -> Self {
        Self {
            alpha2code: info.alpha2code,
            name: info.name,
            alpha3code: info.alpha3code,
            capital: info.capital,
            region: info.region,
            subregion: info.subregion,
            population: info.population,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityInfo {
    pub name: String,
    pub country: CityCountry,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: Option<u64>,
}

/// Owning country as embedded in a city payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityCountry {
    pub alpha2code: String,
    pub name: String,
}

impl From<CityInfo> for City {
    fn from(info: CityInfo) -> Self {
        Self {
            name: info.name,
            country_code: info.country.alpha2code,
            country_name: info.country.name,
            latitude: info.latitude,
            longitude: info.longitude,
            population: info.population,
        }
    }
}

pub struct GeoClient {
    client: ProviderClient,
}

impl GeoClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new(config, timeout)?,
        })
    }
}

#[async_trait]
impl CountryProvider for GeoClient {
    #[tracing::instrument(name = "country_provider", skip(self))]
    async fn countries_by_name(&self, name: &str) -> Result<Option<Vec<CountryInfo>>> {
        let url = format!(
            "{}/country/name/{}",
            self.client.base_url(),
            urlencoding::encode(name)
        );
        self.client.get_json(&url).await
    }
}

#[async_trait]
impl CityProvider for GeoClient {
    #[tracing::instrument(name = "city_provider", skip(self))]
    async fn cities_by_name(&self, name: &str) -> Result<Option<Vec<CityInfo>>> {
        let url = format!(
            "{}/city/name/{}",
            self.client.base_url(),
            urlencoding::encode(name)
        );
        self.client.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeoClient {
        GeoClient::new(&ProviderConfig::new(server.uri()), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_countries_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/country/name/Germany"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "alpha2code": "DE",
                "alpha3code": "DEU",
                "name": "Germany",
                "capital": "Berlin",
                "region": "Europe",
                "subregion": "Western Europe",
                "population": 83_240_525u64,
                "calling_code": "+49"
            }])))
            .mount(&server)
            .await;

        let countries = client(&server).countries_by_name("Germany").await.unwrap().unwrap();
        assert_eq!(countries.len(), 1);
        let germany = Country::from(countries[0].clone());
        assert_eq!(germany.alpha2code, "DE");
        assert_eq!(germany.capital.as_deref(), Some("Berlin"));
    }

    #[tokio::test]
    async fn test_cities_by_name_with_space() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/city/name/New%20York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "name": "New York",
                "country": {"alpha2code": "US", "name": "United States of America"},
                "latitude": 40.71,
                "longitude": -74.0,
                "population": 8_804_190u64
            }])))
            .mount(&server)
            .await;

        let cities = client(&server).cities_by_name("New York").await.unwrap().unwrap();
        let city = City::from(cities[0].clone());
        assert_eq!(city.country_code, "US");
        assert_eq!(city.population, Some(8_804_190));
    }

    #[tokio::test]
    async fn test_unknown_country_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client(&server).countries_by_name("Atlantis").await.unwrap().is_none());
    }
}
