//! Configuration management for the `GeoAPI` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::GeoApiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `GeoAPI` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoApiConfig {
    /// HTTP listener configuration
    pub server: ServerConfig,
    /// Persistent record store configuration
    pub storage: StorageConfig,
    /// Secondary response cache configuration
    pub cache: CacheConfig,
    /// Upstream data providers
    pub providers: ProvidersConfig,
    /// List endpoint pagination
    pub pagination: PaginationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the embedded record database
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Lifetime of weather and currency responses in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

/// Settings shared by every provider plus one block per provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_weather_provider")]
    pub weather: ProviderConfig,
    #[serde(default = "default_currency_provider")]
    pub currency: ProviderConfig,
    /// Country and city lookups
    #[serde(default = "default_geo_provider")]
    pub geo: ProviderConfig,
}

/// Connection settings for a single upstream provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Filled with the provider's public endpoint when left empty
    #[serde(default)]
    pub base_url: String,
    /// Sent in `api_key_header` when present
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_storage_path() -> String {
    "data/geoapi".to_string()
}

fn default_cache_location() -> String {
    "data/cache".to_string()
}

fn default_cache_ttl() -> u64 {
    15 * 60
}

fn default_provider_timeout() -> u32 {
    10
}

fn default_api_key_header() -> String {
    "apikey".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_currency_base_url() -> String {
    "https://api.apilayer.com/fixer/latest".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.apilayer.com/geo".to_string()
}

fn default_weather_provider() -> ProviderConfig {
    ProviderConfig::new(default_weather_base_url())
}

fn default_currency_provider() -> ProviderConfig {
    ProviderConfig::new(default_currency_base_url())
}

fn default_geo_provider() -> ProviderConfig {
    ProviderConfig::new(default_geo_base_url())
}

fn default_page_size() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_provider_timeout(),
            weather: default_weather_provider(),
            currency: default_currency_provider(),
            geo: default_geo_provider(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_key_header: default_api_key_header(),
        }
    }
}

impl ProvidersConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl GeoApiConfig {
    /// Load configuration from the default location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(std::env::var_os("GEOAPI_CONFIG").map(PathBuf::from))
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // GEOAPI__PROVIDERS__WEATHER__API_KEY=... style overrides
        builder = builder.add_source(
            Environment::with_prefix("GEOAPI")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: GeoApiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("geoapi").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl();
        }
        if self.providers.timeout_seconds == 0 {
            self.providers.timeout_seconds = default_provider_timeout();
        }
        for (provider, base_url) in [
            (&mut self.providers.weather, default_weather_base_url as fn() -> String),
            (&mut self.providers.currency, default_currency_base_url),
            (&mut self.providers.geo, default_geo_base_url),
        ] {
            if provider.base_url.is_empty() {
                provider.base_url = base_url();
            }
            if provider.api_key_header.is_empty() {
                provider.api_key_header = default_api_key_header();
            }
            if provider.api_key.as_deref().is_some_and(str::is_empty) {
                provider.api_key = None;
            }
        }
        if self.pagination.page_size == 0 {
            self.pagination.page_size = default_page_size();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_providers()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(GeoApiError::config("Server port cannot be 0").into());
        }

        if self.providers.timeout_seconds > 300 {
            return Err(
                GeoApiError::config("Provider timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.cache.ttl_seconds > 7 * 24 * 60 * 60 {
            return Err(GeoApiError::config("Cache TTL cannot exceed 1 week").into());
        }

        if self.pagination.page_size > 1000 {
            return Err(GeoApiError::config("Page size cannot exceed 1000").into());
        }

        Ok(())
    }

    fn validate_providers(&self) -> Result<()> {
        let providers = [
            ("weather", &self.providers.weather),
            ("currency", &self.providers.currency),
            ("geo", &self.providers.geo),
        ];

        for (name, provider) in providers {
            if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://")
            {
                return Err(GeoApiError::config(format!(
                    "The {name} provider base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }

            let header_ok = provider
                .api_key_header
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
            if !header_ok {
                return Err(GeoApiError::config(format!(
                    "Invalid API key header name '{}' for the {name} provider",
                    provider.api_key_header
                ))
                .into());
            }

            if let Some(api_key) = &provider.api_key {
                if api_key.len() > 200 || api_key.chars().any(char::is_control) {
                    return Err(GeoApiError::config(format!(
                        "The {name} provider API key appears to be invalid. Please check your API key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GeoApiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GeoApiError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
