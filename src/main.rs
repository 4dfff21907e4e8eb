use anyhow::Result;
use tracing::info;

use solewatch::campaign::CampaignRunner;
use solewatch::config::AppConfig;
use solewatch::driver::ChromeDriver;
use solewatch::notify::build_notifier;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("solewatch=debug".parse()?),
        )
        .init();

    info!("Starting SoleWatch campaign...");

    let config = AppConfig::from_env()?;
    let notifier = build_notifier(&config.notifications)?;
    let runner = CampaignRunner::from_config(&config)?;

    // Driver lifetime is the campaign lifetime; Chrome is released on drop
    // even when the run errors.
    let driver = ChromeDriver::launch(&config.scraper)?;
    let report = runner.run_and_notify(&driver, notifier.as_ref(), None).await;

    info!(queries = report.len(), "campaign finished");
    Ok(())
}
