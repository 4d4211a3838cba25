//! HTTP handlers
//!
//! City and country lookups by name answer `404` when nothing is found;
//! weather and currency lookups answer an empty list instead.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;

use crate::GeoApiError;
use crate::cache::{PersistentCache, ResponseCache};
use crate::config::GeoApiConfig;
use crate::models::{City, Country, CurrencyRate, WeatherRecord};
use crate::providers::{CurrencyClient, GeoClient, WeatherClient};
use crate::services::{CityService, CountryService, CurrencyService, WeatherService};
use crate::store::Store;

pub mod pagination;

use pagination::{PageParams, paginate};

/// Everything the handlers need, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub countries: Arc<CountryService>,
    pub cities: Arc<CityService>,
    pub weather: Arc<WeatherService>,
    pub currency: Arc<CurrencyService>,
    pub response_cache: ResponseCache,
    pub page_size: usize,
}

impl AppState {
    /// Opens the store and cache and wires the provider clients
    pub fn from_config(config: &GeoApiConfig) -> crate::Result<Self> {
        let store = Store::open(&config.storage.path)?;
        let cache = PersistentCache::open(&config.cache.location)
            .map_err(|e| GeoApiError::cache(format!("Failed to open cache: {e:#}")))?;

        let timeout = config.providers.timeout();
        let geo = Arc::new(GeoClient::new(&config.providers.geo, timeout)?);
        let weather = Arc::new(WeatherClient::new(&config.providers.weather, timeout)?);
        let currency = Arc::new(CurrencyClient::new(&config.providers.currency, timeout)?);

        Ok(Self {
            countries: Arc::new(CountryService::new(store.repository()?, geo.clone())),
            cities: Arc::new(CityService::new(
                store.repository()?,
                store.repository()?,
                geo,
            )),
            weather: Arc::new(WeatherService::new(store.repository()?, weather)),
            currency: Arc::new(CurrencyService::new(store.repository()?, currency)),
            response_cache: ResponseCache::new(Arc::new(cache), config.cache.ttl()),
            page_size: config.pagination.page_size,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/city/{name}", get(get_city))
        .route("/cities", get(get_cities))
        .route("/country/{name}", get(get_country))
        .route("/countries", get(get_countries))
        .route("/weather/{alpha2code}/{city}", get(get_weather))
        .route("/currency/{code}", get(get_currency))
        .with_state(state)
}

/// Error rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<GeoApiError> for ApiError {
    fn from(err: GeoApiError) -> Self {
        let status = match &err {
            GeoApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            GeoApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            GeoApiError::Api { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {err}");
        }
        Self {
            status,
            detail: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn get_city(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Vec<City>>> {
    let cities = state.cities.get_cities(&name).await?;
    if cities.is_empty() {
        return Err(GeoApiError::not_found("Not found.").into());
    }
    Ok(Json(cities.into_records()))
}

async fn get_cities(State(state): State<AppState>, Query(params): Query<PageParams>) -> ApiResult<Response> {
    let cities = state.cities.get_all_cities().await?;
    paginated(cities, &params, state.page_size, "/api/cities")
}

async fn get_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Country>>> {
    let countries = state.countries.get_countries(&name).await?;
    if countries.is_empty() {
        return Err(GeoApiError::not_found("Not found.").into());
    }
    Ok(Json(countries.into_records()))
}

async fn get_countries(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    let countries = state.countries.get_all_countries().await?;
    paginated(countries, &params, state.page_size, "/api/countries")
}

async fn get_weather(
    State(state): State<AppState>,
    Path((alpha2code, city)): Path<(String, String)>,
) -> ApiResult<Json<Vec<WeatherRecord>>> {
    validate_code(&alpha2code, 2, "Country code")?;

    let key = format!("weather:{}_{}", alpha2code.to_lowercase(), city.to_lowercase());
    let records = state
        .response_cache
        .get_or_load(&key, || async {
            Ok::<_, GeoApiError>(state.weather.get_weather(&alpha2code, &city).await?.into_records())
        })
        .await?;

    Ok(Json(records))
}

async fn get_currency(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Vec<CurrencyRate>>> {
    validate_code(&code, 3, "Currency code")?;

    let key = format!("currency:{}", code.to_lowercase());
    let records = state
        .response_cache
        .get_or_load(&key, || async {
            Ok::<_, GeoApiError>(state.currency.get_currency_rates(&code).await?.into_records())
        })
        .await?;

    Ok(Json(records))
}

/// An empty listing is a bare `[]`, anything else a page object
fn paginated<T: Serialize>(
    items: Vec<T>,
    params: &PageParams,
    page_size: usize,
    path: &str,
) -> ApiResult<Response> {
    if items.is_empty() {
        return Ok(Json(Vec::<T>::new()).into_response());
    }
    let page = paginate(items, params, page_size, path)?;
    Ok(Json(page).into_response())
}

fn validate_code(code: &str, len: usize, what: &str) -> Result<(), GeoApiError> {
    if code.len() == len && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(GeoApiError::validation(format!(
            "{what} must be {len} letters, got '{code}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DE", 2, true)]
    #[case("de", 2, true)]
    #[case("DEU", 2, false)]
    #[case("D1", 2, false)]
    #[case("USD", 3, true)]
    #[case("US", 3, false)]
    fn test_validate_code(#[case] code: &str, #[case] len: usize, #[case] ok: bool) {
        assert_eq!(validate_code(code, len, "Code").is_ok(), ok);
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (GeoApiError::validation("x"), StatusCode::BAD_REQUEST),
            (GeoApiError::not_found("x"), StatusCode::NOT_FOUND),
            (GeoApiError::api("x"), StatusCode::BAD_GATEWAY),
            (GeoApiError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }
}
