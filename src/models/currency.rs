use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::store::{Criteria, Record};

/// Exchange rate of `base` against `compared_to` on `date`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrencyRate {
    /// Three letter currency code
    pub base: String,
    pub date: NaiveDate,
    pub compared_to: String,
    /// Units of `compared_to` per one unit of `base`
    pub value: f64,
}

impl Record for CurrencyRate {
    const KEYSPACE: &'static str = "currency_rates";
}

/// Substring of the base currency code
#[derive(Debug, Clone)]
pub struct CurrencyFilter {
    base: String,
}

impl CurrencyFilter {
    #[must_use]
    pub fn by_base(code: &str) -> Self {
        Self {
            base: code.to_lowercase(),
        }
    }
}

impl Criteria<CurrencyRate> for CurrencyFilter {
    fn matches(&self, rate: &CurrencyRate) -> bool {
        contains_ignore_case(&rate.base, &self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_filter_by_base() {
        let rate = CurrencyRate {
            base: "USD".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            compared_to: "EUR".to_string(),
            value: 0.9,
        };

        assert!(CurrencyFilter::by_base("usd").matches(&rate));
        // the compared currency is not part of the match
        assert!(!CurrencyFilter::by_base("EUR").matches(&rate));
    }
}
