//! Weather Station Forecast Server - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Weather Station v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Station elevation {} m, forecast every {} s",
        config.engine.elevation_m, config.engine.interval_secs
    );

    run_server(config).await?;

    Ok(())
}
