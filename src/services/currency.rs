use std::sync::Arc;

use tracing::instrument;

use super::{Lookup, read_through};
use crate::models::{CurrencyFilter, CurrencyRate};
use crate::providers::CurrencyProvider;
use crate::store::Repository;
use crate::{GeoApiError, Result};

/// Exchange rates relative to a base currency
pub struct CurrencyService {
    rates: Repository<CurrencyRate>,
    provider: Arc<dyn CurrencyProvider>,
}

impl CurrencyService {
    pub fn new(rates: Repository<CurrencyRate>, provider: Arc<dyn CurrencyProvider>) -> Self {
        Self { rates, provider }
    }

    /// Rates whose base currency matches `code`. A provider answer is stored
    /// as one record per target currency, all in a single write.
    #[instrument(skip(self))]
    pub async fn get_currency_rates(&self, code: &str) -> Result<Lookup<CurrencyRate>> {
        read_through(&self.rates, CurrencyFilter::by_base(code), || async {
            let rates = self.provider.latest_rates(code).await?;
            Ok::<_, GeoApiError>(rates.map(|rates| rates.into_records()))
        })
        .await
    }
}
