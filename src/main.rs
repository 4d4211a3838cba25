use anyhow::{Context, Result};
use geoapi::{AppState, GeoApiConfig, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GeoApiConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;

    tracing::info!("Starting GeoAPI {}", geoapi::VERSION);
    let state = AppState::from_config(&config).context("Failed to initialise application state")?;

    web::run(&config.server, state).await
}
