use anyhow::Result;
use chrono::Utc;

use daybrief::config::BriefConfig;
use daybrief::weather;

/// Fetch the forecast for the configured location and store it.
pub async fn weather(config: &BriefConfig) -> Result<()> {
    let resolved = config.resolve()?;
    let store = super::open_store(&resolved)?;

    let stored = weather::import_forecast(&store, &resolved, Utc::now()).await?;
    println!(
        "Stored {stored} forecast day(s) for {}",
        resolved.location.name
    );
    Ok(())
}
