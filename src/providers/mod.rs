//! Upstream data providers
//!
//! Every provider issues a single GET per lookup. A `200 OK` is decoded into
//! a typed DTO; any other status, a timeout or a network failure is reported
//! as "no data" (`Ok(None)`). There is no retry. A `200 OK` whose body does
//! not decode is an error.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::{GeoApiError, Result};

pub mod currency;
pub mod geo;
pub mod weather;

pub use currency::{CurrencyClient, CurrencyRates};
pub use geo::{CityInfo, CountryInfo, GeoClient};
pub use weather::{WeatherClient, WeatherReport};

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions in `city`, located in country `alpha2code`
    async fn current_weather(&self, city: &str, alpha2code: &str) -> Result<Option<WeatherReport>>;
}

#[async_trait]
pub trait CurrencyProvider: Send + Sync {
    /// Latest rates of every known currency against `base`
    async fn latest_rates(&self, base: &str) -> Result<Option<CurrencyRates>>;
}

#[async_trait]
pub trait CountryProvider: Send + Sync {
    async fn countries_by_name(&self, name: &str) -> Result<Option<Vec<CountryInfo>>>;
}

#[async_trait]
pub trait CityProvider: Send + Sync {
    async fn cities_by_name(&self, name: &str) -> Result<Option<Vec<CityInfo>>>;
}

/// HTTP plumbing shared by all provider clients
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    api_key_header: String,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("GeoAPI/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeoApiError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_key_header: config.api_key_header.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `url` and decodes a `200 OK` body as `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        debug!("Provider request: {}", url);

        let mut request = self.http.get(url);
        if let Some(api_key) = &self.api_key {
            request = request.header(self.api_key_header.as_str(), api_key.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Provider request to {} failed: {}", url, e);
                return Ok(None);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Provider {} answered {}, treating as no data", url, status);
            return Ok(None);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Reading provider response from {} failed: {}", url, e);
                return Ok(None);
            }
        };

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| GeoApiError::api(format!("Malformed response from {url}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        ok: bool,
    }

    fn client(server: &MockServer, api_key: Option<&str>) -> ProviderClient {
        let mut config = ProviderConfig::new(server.uri());
        config.api_key = api_key.map(str::to_string);
        ProviderClient::new(&config, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_sends_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, Some("secret"));
        let url = format!("{}/ping", client.base_url());
        let payload: Option<Payload> = client.get_json(&url).await.unwrap();
        assert_eq!(payload, Some(Payload { ok: true }));
    }

    #[tokio::test]
    async fn test_no_api_key_header_without_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(|request: &Request| !request.headers.contains_key("apikey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, None);
        let url = format!("{}/ping", client.base_url());
        let payload: Option<Payload> = client.get_json(&url).await.unwrap();
        assert_eq!(payload, Some(Payload { ok: true }));
    }

    #[tokio::test]
    async fn test_non_ok_status_is_no_data() {
        let server = MockServer::start().await;
        for (route, status) in [("/missing", 404), ("/broken", 500), ("/created", 201)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({"ok": true})))
                .mount(&server)
                .await;
        }

        let client = client(&server, None);
        for route in ["/missing", "/broken", "/created"] {
            let url = format!("{}{}", client.base_url(), route);
            let payload: Option<Payload> = client.get_json(&url).await.unwrap();
            assert!(payload.is_none(), "{route} should yield no data");
        }
    }

    #[tokio::test]
    async fn test_timeout_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = ProviderConfig::new(server.uri());
        let client = ProviderClient::new(&config, Duration::from_millis(50)).unwrap();
        let payload: Option<Payload> = client.get_json(&server.uri()).await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_is_no_data() {
        let config = ProviderConfig::new("http://127.0.0.1:9");
        let client = ProviderClient::new(&config, Duration::from_secs(1)).unwrap();
        let payload: Option<Payload> = client.get_json("http://127.0.0.1:9/x").await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client(&server, None);
        let result: Result<Option<Payload>> = client.get_json(&server.uri()).await;
        assert!(matches!(result, Err(GeoApiError::Api { .. })));
    }
}
