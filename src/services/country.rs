use std::sync::Arc;

use tracing::instrument;

use super::{Lookup, read_through};
use crate::models::{Country, CountryFilter};
use crate::providers::CountryProvider;
use crate::store::Repository;
use crate::{GeoApiError, Result};

pub struct CountryService {
    countries: Repository<Country>,
    provider: Arc<dyn CountryProvider>,
}

impl CountryService {
    pub fn new(countries: Repository<Country>, provider: Arc<dyn CountryProvider>) -> Self {
        Self {
            countries,
            provider,
        }
    }

    /// Countries whose name contains `name`
    #[instrument(skip(self))]
    pub async fn get_countries(&self, name: &str) -> Result<Lookup<Country>> {
        read_through(&self.countries, CountryFilter::by_name(name), || async {
            let found = self.provider.countries_by_name(name).await?;
            Ok::<_, GeoApiError>(found.map(|countries| countries.into_iter().map(Country::from).collect::<Vec<_>>()))
        })
        .await
    }

    /// Every stored country, ordered by alpha-2 code
    pub async fn get_all_countries(&self) -> Result<Vec<Country>> {
        self.countries.all().await
    }
}
