use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::store::{Criteria, Record};

/// City and a reference to its owning country
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct City {
    pub name: String,
    /// Alpha-2 code of the owning country
    pub country_code: String,
    pub country_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: Option<u64>,
}

impl Record for City {
    const KEYSPACE: &'static str = "cities";
}

/// Substring of the city name
#[derive(Debug, Clone)]
pub struct CityFilter {
    name: String,
}

impl CityFilter {
    #[must_use]
    pub fn by_name(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
        }
    }
}

impl Criteria<City> for CityFilter {
    fn matches(&self, city: &City) -> bool {
        contains_ignore_case(&city.name, &self.name)
    }
}
