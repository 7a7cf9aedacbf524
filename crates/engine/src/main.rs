use std::sync::Arc;
use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};

use shelfwise_engine::api::{self, AppState};
use shelfwise_engine::config::Config;
use shelfwise_engine::logger;

#[tokio::main]
async fn main() -> Result<()> {
    // Loads .env first so RUST_LOG from it applies.
    let config = Config::from_env()?;
    logger::init_logger("info")?;

    info!(
        model = %config.model.model,
        catalog = %config.catalog.base_url,
        notion = config.notion.is_some(),
        after_tools = %config.graph.after_tools,
        "Starting Shelfwise"
    );

    let state = Arc::new(AppState::from_config(config)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut api_handle = tokio::spawn(api::start_server(state, shutdown_rx));

    let served = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            None
        }
        served = &mut api_handle => Some(served),
    };

    match served {
        Some(served) => {
            if let Err(e) = served? {
                error!("API server crashed: {}", e);
                return Err(e);
            }
        }
        None => {
            info!("Received shutdown signal...");
            let _ = shutdown_tx.send(true);
            api_handle.await??;
        }
    }

    info!("Shelfwise shutdown complete.");
    Ok(())
}
