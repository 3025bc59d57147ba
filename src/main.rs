use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use wattson::config::Config;
use wattson::ha::{HaBatterySource, HaClient, HaRateSource};
use wattson::web::{AppState, serve};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;

    wattson::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Wattson charging optimizer {} starting up", env!("APP_VERSION"));

    let client = Arc::new(
        HaClient::from_config(&config)
            .map_err(|e| anyhow::anyhow!("Failed to create Home Assistant client: {}", e))?,
    );
    let battery = Arc::new(HaBatterySource::new(client.clone(), &config.home_assistant));
    let rates = Arc::new(HaRateSource::new(client));

    let (host, port) = (config.web.host.clone(), config.web.port);
    let state = AppState {
        config: Arc::new(config),
        battery,
        rates,
    };

    serve(state, &host, port).await
}
