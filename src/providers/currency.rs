//! Fixer-compatible exchange rate client

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

use super::{CurrencyProvider, ProviderClient};
use crate::config::ProviderConfig;
use crate::models::CurrencyRate;
use crate::{GeoApiError, Result};

/// Rates of every target currency against `base` on `date`
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRates {
    pub base: String,
    pub date: NaiveDate,
    pub rates: BTreeMap<String, f64>,
}

impl CurrencyRates {
    /// One record per target currency
    #[must_use]
    pub fn into_records(self) -> Vec<CurrencyRate> {
        let CurrencyRates { base, date, rates } = self;
        rates
            .into_iter()
            .map(|(compared_to, value)| CurrencyRate {
                base: base.clone(),
                date,
                compared_to,
                value,
            })
            .collect()
    }
}

pub struct CurrencyClient {
    client: ProviderClient,
}

impl CurrencyClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ProviderClient::new(config, timeout)?,
        })
    }
}

#[async_trait]
impl CurrencyProvider for CurrencyClient {
    #[tracing::instrument(name = "currency_provider", skip(self))]
    async fn latest_rates(&self, base: &str) -> Result<Option<CurrencyRates>> {
        let url = format!("{}?base={}", self.client.base_url(), urlencoding::encode(base));

        let Some(response) = self.client.get_json::<LatestRatesResponse>(&url).await? else {
            return Ok(None);
        };

        response.into_rates()
    }
}

fn default_success() -> bool {
    true
}

/// Fixer reports some failures in-band with `200 OK` and `success: false`
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default = "default_success")]
    success: bool,
    base: Option<String>,
    date: Option<NaiveDate>,
    rates: Option<BTreeMap<String, f64>>,
    error: Option<serde_json::Value>,
}

impl LatestRatesResponse {
    fn into_rates(self) -> Result<Option<CurrencyRates>> {
        if !self.success {
            warn!("Currency provider reported failure: {:?}", self.error);
            return Ok(None);
        }

        match (self.base, self.date, self.rates) {
            (Some(base), Some(date), Some(rates)) => Ok(Some(CurrencyRates { base, date, rates })),
            _ => Err(GeoApiError::api(
                "Currency response is missing base, date or rates",
            )),
        }
    }
}
