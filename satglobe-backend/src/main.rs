use satglobe_backend::config;
use satglobe_backend::module::scheduled::{Tracker, TrackerConfig};

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard =
        satglobe_backend::logging::init_logging(&config.log_dir, "satglobe-backend", &config.log_level)?;

    tracing::info!("Satglobe backend starting...");
    tracing::info!("Catalog source: {}", config.catalog.source);
    if let Some(elements) = &config.catalog.element_source {
        tracing::info!("Element source: {}", elements);
    }

    let tracker_config = TrackerConfig::from_settings(&config.catalog, &config.tracker);
    let tracker = Tracker::start(config.catalog.clone(), tracker_config).await?;

    let report = tracker.catalog().report().clone();
    tracing::info!("Initial catalog ready: {}", report);

    match config.tracker.fixed_instant {
        Some(instant) => tracker.run_once(instant)?,
        None => tracker.run().await?,
    }

    tracing::info!("Satglobe backend stopped");

    Ok(())
}
