use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::{Lookup, read_through};
use crate::models::{City, CityFilter, Country, CountryFilter};
use crate::providers::{CityInfo, CityProvider};
use crate::store::Repository;
use crate::{GeoApiError, Result};

pub struct CityService {
    cities: Repository<City>,
    countries: Repository<Country>,
    provider: Arc<dyn CityProvider>,
}

impl CityService {
    pub fn new(
        cities: Repository<City>,
        countries: Repository<Country>,
        provider: Arc<dyn CityProvider>,
    ) -> Self {
        Self {
            cities,
            countries,
            provider,
        }
    }

    /// Cities whose name contains `name`
    #[instrument(skip(self))]
    pub async fn get_cities(&self, name: &str) -> Result<Lookup<City>> {
        read_through(&self.cities, CityFilter::by_name(name), || async {
            let Some(found) = self.provider.cities_by_name(name).await? else {
                return Ok::<_, GeoApiError>(None);
            };
            self.ensure_countries(&found).await?;
            Ok(Some(found.into_iter().map(City::from).collect::<Vec<_>>()))
        })
        .await
    }

    pub async fn get_all_cities(&self) -> Result<Vec<City>> {
        self.cities.all().await
    }

    /// Creates a minimal country for every owning country not stored yet.
    /// Known countries are left untouched.
    async fn ensure_countries(&self, cities: &[CityInfo]) -> Result<()> {
        let referenced: BTreeMap<String, &str> = cities
            .iter()
            .map(|city| (city.country.alpha2code.to_uppercase(), city.country.name.as_str()))
            .collect();

        let mut missing = Vec::new();
        for (code, name) in referenced {
            if self.countries.find(CountryFilter::by_alpha2code(&code)).await?.is_empty() {
                debug!("Adding referenced country {}", code);
                missing.push(Country::reference(code, name));
            }
        }

        self.countries.create_many(missing).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::geo::CityCountry;
    use crate::services::stubs::Canned;
    use crate::store::Store;
    use tempfile::TempDir;

    fn berlin() -> CityInfo {
        CityInfo {
            name: "Berlin".to_string(),
            country: CityCountry {
                alpha2code: "DE".to_string(),
                name: "Germany".to_string(),
            },
            latitude: Some(52.52),
            longitude: Some(13.405),
            population: Some(3_645_000),
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        countries: Repository<Country>,
        provider: Arc<Canned<Vec<CityInfo>>>,
        service: CityService,
    }

    fn fixture(provider: Canned<Vec<CityInfo>>) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        let countries = store.repository::<Country>().unwrap();
        let provider = Arc::new(provider);
        let service = CityService::new(
            store.repository().unwrap(),
            countries.clone(),
            provider.clone(),
        );
        Fixture {
            _temp_dir: temp_dir,
            countries,
            provider,
            service,
        }
    }

    #[tokio::test]
    async fn test_berlin_is_fetched_once() {
        let fx = fixture(Canned::returning(vec![berlin()]));

        let first = fx.service.get_cities("Berlin").await.unwrap();
        assert_eq!(first, Lookup::Fetched(vec![City::from(berlin())]));

        let second = fx.service.get_cities("Berlin").await.unwrap();
        assert_eq!(second, Lookup::Hit(vec![City::from(berlin())]));

        assert_eq!(fx.provider.calls(), 1);
        assert_eq!(fx.service.get_all_cities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_owning_country_is_created() {
        let fx = fixture(Canned::returning(vec![berlin()]));

        fx.service.get_cities("Berlin").await.unwrap();

        let countries = fx.countries.all().await.unwrap();
        assert_eq!(countries, vec![Country::reference("DE", "Germany")]);
    }

    #[tokio::test]
    async fn test_known_country_is_not_overwritten() {
        let fx = fixture(Canned::returning(vec![berlin()]));
        let mut germany = Country::reference("DE", "Germany");
        germany.capital = Some("Berlin".to_string());
        fx.countries.create(germany.clone()).await.unwrap();

        fx.service.get_cities("Berlin").await.unwrap();

        assert_eq!(fx.countries.all().await.unwrap(), vec![germany]);
    }

    #[tokio::test]
    async fn test_provider_failure_is_a_miss() {
        let fx = fixture(Canned::failing());

        assert_eq!(fx.service.get_cities("Nowhere").await.unwrap(), Lookup::Miss);
        assert!(fx.countries.all().await.unwrap().is_empty());
    }
}
