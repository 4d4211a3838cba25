//! Read-through resource services
//!
//! Each service looks in the local store first, falls back to its provider on
//! an empty result, persists what the provider returned and answers with the
//! persisted records.

use std::future::Future;

use tracing::{debug, info};

use crate::Result;
use crate::store::{Criteria, Record, Repository};

pub mod city;
pub mod country;
pub mod currency;
pub mod weather;

pub use city::CityService;
pub use country::CountryService;
pub use currency::CurrencyService;
pub use weather::WeatherService;

/// Outcome of a read-through lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Served from the local store
    Hit(Vec<T>),
    /// Fetched from the provider, persisted and re-read. May be empty when
    /// the provider answered with nothing that matches.
    Fetched(Vec<T>),
    /// Provider had no data
    Miss,
}

impl<T> Lookup<T> {
    #[must_use]
    pub fn records(&self) -> &[T] {
        match self {
            Lookup::Hit(records) | Lookup::Fetched(records) => records,
            Lookup::Miss => &[],
        }
    }

    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        match self {
            Lookup::Hit(records) | Lookup::Fetched(records) => records,
            Lookup::Miss => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

/// Store lookup, then provider fetch + persist + re-query on an empty result.
pub(crate) async fn read_through<R, C, F, Fut>(
    repository: &Repository<R>,
    criteria: C,
    fetch: F,
) -> Result<Lookup<R>>
where
    R: Record,
    C: Criteria<R> + Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<Vec<R>>>>,
{
    let existing = repository.find(criteria.clone()).await?;
    if !existing.is_empty() {
        debug!("Store hit with {} {}", existing.len(), R::KEYSPACE);
        return Ok(Lookup::Hit(existing));
    }

    let Some(records) = fetch().await? else {
        debug!("Provider has no {}", R::KEYSPACE);
        return Ok(Lookup::Miss);
    };

    info!("Persisting {} {} from provider", records.len(), R::KEYSPACE);
    repository.create_many(records).await?;

    Ok(Lookup::Fetched(repository.find(criteria).await?))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_records() {
        assert_eq!(Lookup::Hit(vec![1, 2]).records(), &[1, 2]);
        assert!(Lookup::<u8>::Fetched(Vec::new()).is_empty());
        assert!(Lookup::<u8>::Miss.is_empty());
        assert_eq!(Lookup::Fetched(vec![3]).into_records(), vec![3]);
        assert!(Lookup::<u8>::Miss.into_records().is_empty());
    }
}
