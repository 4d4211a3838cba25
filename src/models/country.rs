//! Country model

use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::store::{Criteria, Record};

/// Country keyed by its ISO 3166-1 alpha-2 code
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code
    pub alpha2code: String,
    /// Display name
    pub name: String,
    pub alpha3code: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<u64>,
}

impl Country {
    /// Country known only by code and name, as referenced from a city
    #[must_use]
    pub fn reference(alpha2code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alpha2code: alpha2code.into(),
            name: name.into(),
            alpha3code: None,
            capital: None,
            region: None,
            subregion: None,
            population: None,
        }
    }
}

impl Record for Country {
    const KEYSPACE: &'static str = "countries";

    fn natural_key(&self) -> Option<String> {
        Some(self.alpha2code.to_lowercase())
    }
}

/// Country lookups
#[derive(Debug, Clone)]
pub enum CountryFilter {
    /// Substring of the display name
    Name(String),
    /// Exact alpha-2 code
    Alpha2Code(String),
}

impl CountryFilter {
    #[must_use]
    pub fn by_name(name: &str) -> Self {
        Self::Name(name.to_lowercase())
    }

    #[must_use]
    pub fn by_alpha2code(code: &str) -> Self {
        Self::Alpha2Code(code.to_lowercase())
    }
}

impl Criteria<Country> for CountryFilter {
    fn matches(&self, country: &Country) -> bool {
        match self {
            CountryFilter::Name(name) => contains_ignore_case(&country.name, name),
            CountryFilter::Alpha2Code(code) => country.alpha2code.eq_ignore_ascii_case(code),
        }
    }
}
